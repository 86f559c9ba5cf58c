//! Intersection queries over flattened polylines.
//!
//! Curves are intersected numerically: a cheap bounding-box rejection
//! first, then pairwise 3D segment tests over the flattened polylines.
//! Precision is therefore governed by the sampling accuracy and the
//! caller's tolerance, and hits lie on the polyline approximation, not
//! exactly on the curve.

use glam::Vec3;

use crate::errors::Result;
use crate::extrema::Bounds;
use crate::line::segment_segment_intersection;
use crate::spline::SplineCurve;

/// Intersections between one curve segment and the line `a..b`.
pub fn curve_line_intersections(
    spline: &mut SplineCurve,
    segment: usize,
    a: Vec3,
    b: Vec3,
    accuracy: usize,
    tolerance: f32,
) -> Result<Vec<Vec3>> {
    let line_bounds = Bounds::from_corners(a, b);
    if !spline
        .get_segment_bounds(segment)?
        .intersects(&line_bounds, tolerance)
    {
        return Ok(Vec::new());
    }
    let polyline = spline.get_flattened_segment(segment, accuracy)?;
    let mut hits = Vec::new();
    for edge in polyline.windows(2) {
        if let Some(hit) = segment_segment_intersection(edge[0], edge[1], a, b, tolerance) {
            push_hit(&mut hits, hit, tolerance);
        }
    }
    Ok(hits)
}

/// Intersections between the whole spline and the line `a..b`.
pub fn spline_line_intersections(
    spline: &mut SplineCurve,
    a: Vec3,
    b: Vec3,
    accuracy: usize,
    tolerance: f32,
) -> Result<Vec<Vec3>> {
    let line_bounds = Bounds::from_corners(a, b);
    if !spline.get_bounds()?.intersects(&line_bounds, tolerance) {
        return Ok(Vec::new());
    }
    let mut hits = Vec::new();
    for segment in 0..spline.segment_count() {
        for hit in curve_line_intersections(spline, segment, a, b, accuracy, tolerance)? {
            push_hit(&mut hits, hit, tolerance);
        }
    }
    Ok(hits)
}

/// Intersections between one segment of each of two splines.
pub fn curve_curve_intersections(
    first: &mut SplineCurve,
    first_segment: usize,
    second: &mut SplineCurve,
    second_segment: usize,
    accuracy: usize,
    tolerance: f32,
) -> Result<Vec<Vec3>> {
    let first_bounds = first.get_segment_bounds(first_segment)?;
    let second_bounds = second.get_segment_bounds(second_segment)?;
    if !first_bounds.intersects(&second_bounds, tolerance) {
        return Ok(Vec::new());
    }
    let first_polyline = first.get_flattened_segment(first_segment, accuracy)?;
    let second_polyline = second.get_flattened_segment(second_segment, accuracy)?;
    let mut hits = Vec::new();
    for edge in first_polyline.windows(2) {
        for other in second_polyline.windows(2) {
            if let Some(hit) =
                segment_segment_intersection(edge[0], edge[1], other[0], other[1], tolerance)
            {
                push_hit(&mut hits, hit, tolerance);
            }
        }
    }
    Ok(hits)
}

/// Intersections between two whole splines.
pub fn spline_spline_intersections(
    first: &mut SplineCurve,
    second: &mut SplineCurve,
    accuracy: usize,
    tolerance: f32,
) -> Result<Vec<Vec3>> {
    let first_bounds = first.get_bounds()?;
    let second_bounds = second.get_bounds()?;
    if !first_bounds.intersects(&second_bounds, tolerance) {
        return Ok(Vec::new());
    }
    let mut hits = Vec::new();
    for first_segment in 0..first.segment_count() {
        for second_segment in 0..second.segment_count() {
            for hit in curve_curve_intersections(
                first,
                first_segment,
                second,
                second_segment,
                accuracy,
                tolerance,
            )? {
                push_hit(&mut hits, hit, tolerance);
            }
        }
    }
    Ok(hits)
}

/// Adjacent polyline edges share a vertex, so one crossing near that
/// vertex reports twice; merge hits closer than a few tolerances.
fn push_hit(hits: &mut Vec<Vec3>, hit: Vec3, tolerance: f32) {
    let merge = tolerance.max(crate::EPSILON) * 4.0;
    if hits
        .iter()
        .all(|known| (*known - hit).length_squared() > merge * merge)
    {
        hits.push(hit);
    }
}
