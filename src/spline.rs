//! The spline aggregate.
//!
//! A [`SplineCurve`] owns one segmented collection of positions, one
//! of per-point normal-angle offsets and the active [`Generator`],
//! and answers every curve query by the same scheme: locate the
//! segment for a global parameter, evaluate locally through the
//! generator, and optionally memoize the result in the cache.
//!
//! The global parameter `t` covers `[0, segment_count]`; its integer
//! part selects the segment and its fraction the local parameter,
//! with exact integers `t > 0` mapping to the previous segment at
//! local 1 so `t = segment_count` lands on the true end of the curve.

use glam::{Quat, Vec3};
use log::debug;

use crate::cache::SplineCache;
use crate::errors::{Result, SplineError};
use crate::extrema::{Bounds, SplineExtrema};
use crate::frenet::FrenetFrame;
use crate::generator::Generator;
use crate::segmented::SegmentedCollection;

/// Construction input: a 3D position plus a normal-angle offset in
/// degrees. Storage inside the spline remains two parallel segmented
/// collections so positions and offsets can be queried independently.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlPoint {
    pub position: Vec3,
    pub normal_offset: f32,
}

impl ControlPoint {
    pub fn new(position: Vec3) -> Self {
        ControlPoint {
            position,
            normal_offset: 0.0,
        }
    }

    pub fn with_offset(position: Vec3, normal_offset: f32) -> Self {
        ControlPoint {
            position,
            normal_offset,
        }
    }
}

/// Coordinate-space constraint of a spline: full 3D or locked to one
/// of the two supported orthogonal planes. The constraint decides how
/// normals are derived from tangents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinateSpace {
    /// Locked to the x/y plane.
    Xy,
    /// Locked to the x/z plane.
    Xz,
    /// Full 3D.
    #[default]
    Xyz,
}

impl CoordinateSpace {
    /// Reference up/plane axis for normal and frame construction.
    fn up(&self) -> Vec3 {
        match self {
            CoordinateSpace::Xy => Vec3::Z,
            CoordinateSpace::Xz | CoordinateSpace::Xyz => Vec3::Y,
        }
    }
}

/// Default samples per segment for flattening-derived queries.
pub const DEFAULT_ACCURACY: usize = 16;

/// A piecewise parametric curve over an interchangeable curve family.
#[derive(Debug, Clone)]
pub struct SplineCurve {
    generator: Generator,
    positions: SegmentedCollection<Vec3>,
    normal_offsets: SegmentedCollection<f32>,
    accuracy: usize,
    space: CoordinateSpace,
    /// Global normal-angle offset in degrees, added on top of the
    /// per-point offsets.
    normal_angle_offset: f32,
    cache: Option<SplineCache>,
}

impl SplineCurve {
    /// Build a spline from an ordered sequence of control points and
    /// a generator. Fails if the point count is incompatible with the
    /// generator's `(segment_size, slide_size)` shape.
    pub fn new(generator: Generator, control_points: &[ControlPoint]) -> Result<Self> {
        let positions: Vec<Vec3> = control_points.iter().map(|c| c.position).collect();
        let offsets: Vec<f32> = control_points.iter().map(|c| c.normal_offset).collect();
        let segment_size = generator.segment_size();
        let slide_size = generator.slide_size();
        Ok(SplineCurve {
            generator,
            positions: SegmentedCollection::new(segment_size, slide_size, positions)?,
            normal_offsets: SegmentedCollection::new(segment_size, slide_size, offsets)?,
            accuracy: DEFAULT_ACCURACY,
            space: CoordinateSpace::default(),
            normal_angle_offset: 0.0,
            cache: Some(SplineCache::default()),
        })
    }

    pub fn generator(&self) -> Generator {
        self.generator
    }

    pub fn point_count(&self) -> usize {
        self.positions.len()
    }

    pub fn segment_count(&self) -> usize {
        self.positions.segment_count()
    }

    pub fn accuracy(&self) -> usize {
        self.accuracy
    }

    pub fn space(&self) -> CoordinateSpace {
        self.space
    }

    pub fn normal_angle_offset(&self) -> f32 {
        self.normal_angle_offset
    }

    pub fn positions(&self) -> &SegmentedCollection<Vec3> {
        &self.positions
    }

    pub fn normal_offsets(&self) -> &SegmentedCollection<f32> {
        &self.normal_offsets
    }

    // --- mutation surface -------------------------------------------------

    /// Change the sampling accuracy used by the convenience queries;
    /// invalidates everything memoized.
    pub fn set_accuracy(&mut self, accuracy: usize) -> Result<()> {
        if accuracy == 0 {
            return Err(SplineError::Accuracy(accuracy));
        }
        self.accuracy = accuracy;
        self.clear_cache();
        Ok(())
    }

    /// Enable or disable memoization.
    pub fn set_cache(&mut self, enabled: bool) {
        self.cache = if enabled {
            Some(SplineCache::default())
        } else {
            None
        };
    }

    pub fn set_normal_angle_offset(&mut self, degrees: f32) {
        // applied at query time, nothing memoized depends on it
        self.normal_angle_offset = degrees;
    }

    pub fn set_space(&mut self, space: CoordinateSpace) {
        self.space = space;
        // frame sequences derive their reference up from the space
        self.clear_cache();
    }

    /// Append whole slides of control points at the end.
    pub fn add_points(&mut self, points: &[ControlPoint]) -> Result<()> {
        let (positions, offsets) = unzip(points);
        self.positions.add_segment_range(&positions)?;
        self.normal_offsets.add_segment_range(&offsets)?;
        self.clear_cache();
        Ok(())
    }

    /// Insert whole slides of control points at segment position
    /// `segment`.
    pub fn insert_points(&mut self, segment: usize, points: &[ControlPoint]) -> Result<()> {
        let (positions, offsets) = unzip(points);
        self.positions.insert_segment_range(segment, &positions)?;
        self.normal_offsets.insert_segment_range(segment, &offsets)?;
        self.clear_cache();
        Ok(())
    }

    /// Remove one segment's slide-sized contribution; removing the
    /// last remaining segment fails and leaves the spline unchanged.
    pub fn remove_segment(&mut self, segment: usize) -> Result<()> {
        self.positions.remove_segment_at(segment)?;
        self.normal_offsets.remove_segment_at(segment)?;
        self.clear_cache();
        Ok(())
    }

    /// Move a single control point.
    pub fn set_position(&mut self, index: usize, position: Vec3) -> Result<()> {
        self.positions.set(index, position)?;
        self.clear_cache();
        Ok(())
    }

    /// Change a single per-point normal-angle offset (degrees).
    pub fn set_normal_offset(&mut self, index: usize, degrees: f32) -> Result<()> {
        self.normal_offsets.set(index, degrees)?;
        // offsets feed only query-time rotation
        Ok(())
    }

    /// Swap the curve family. The existing point count must be
    /// compatible with the new generator's window shape.
    pub fn set_generator(&mut self, generator: Generator) -> Result<()> {
        let count = self.positions.len();
        let segment_size = generator.segment_size();
        let slide_size = generator.slide_size();
        if count < segment_size || (count - segment_size) % slide_size != 0 {
            return Err(SplineError::PointCount {
                count,
                segment_size,
                slide_size,
            });
        }
        self.positions.set_segment_sizes(segment_size, slide_size)?;
        self.normal_offsets
            .set_segment_sizes(segment_size, slide_size)?;
        self.generator = generator;
        self.clear_cache();
        Ok(())
    }

    /// Swap the curve family, truncating trailing points that do not
    /// fit the new window shape.
    pub fn set_generator_truncating(&mut self, generator: Generator) -> Result<()> {
        let segment_size = generator.segment_size();
        let slide_size = generator.slide_size();
        self.positions.set_segment_sizes(segment_size, slide_size)?;
        self.normal_offsets
            .set_segment_sizes(segment_size, slide_size)?;
        self.generator = generator;
        self.clear_cache();
        Ok(())
    }

    /// Split the curve at a global parameter, replacing the segment
    /// containing `t` by two segments meeting at the split point.
    pub fn split_at(&mut self, t: f32) -> Result<()> {
        let (segment, local) = self.split_t(t);
        self.split_segment(local, segment)
    }

    /// Split `segment` at local parameter `local`. Delegates the
    /// curve-family-specific subdivision to the active generator and
    /// splices the returned replacement window over the original.
    pub fn split_segment(&mut self, local: f32, segment: usize) -> Result<()> {
        let run = self
            .generator
            .split_segment(local, self.positions.segment(segment)?)?;
        // blend replacement offsets through the family basis before
        // the position window is replaced
        let offsets_window = self.normal_offsets.segment(segment)?.to_vec();
        let mut new_offsets = Vec::with_capacity(run.len());
        let last = (run.len() - 1) as f32;
        for j in 0..run.len() {
            new_offsets.push(
                self.generator
                    .normals_modifier(j as f32 / last, &offsets_window)?,
            );
        }
        self.positions.replace_window(segment, &run)?;
        self.normal_offsets.replace_window(segment, &new_offsets)?;
        debug!(
            "split segment {segment} at local t={local}: {} replacement points",
            run.len()
        );
        self.clear_cache();
        Ok(())
    }

    // --- query surface ----------------------------------------------------

    /// Position on the curve at global parameter `t`.
    pub fn value_at(&self, t: f32) -> Result<Vec3> {
        let (segment, local) = self.split_t(t);
        self.generator
            .evaluate(local, self.positions.segment(segment)?)
    }

    /// Unit tangent at global parameter `t`.
    pub fn tangent_at(&self, t: f32) -> Result<Vec3> {
        Ok(self.derivative_at(t, 1)?.normalize_or_zero())
    }

    /// Raw `order`-th derivative (with respect to the local segment
    /// parameter) at global parameter `t`.
    pub fn derivative_at(&self, t: f32, order: usize) -> Result<Vec3> {
        let (segment, local) = self.split_t(t);
        self.generator
            .evaluate_derivative(local, order, self.positions.segment(segment)?)
    }

    /// Normal at global parameter `t`.
    ///
    /// In a plane-locked space this is the in-plane perpendicular of
    /// the tangent; in full 3D it is the cross of world up and the
    /// tangent. Either is then rotated by the sum of the global
    /// normal-angle offset and the generator's blend of the per-point
    /// offsets. For the orientation-aligned 3D mode see
    /// [`SplineCurve::oriented_normal_at`].
    pub fn normal_at(&self, t: f32) -> Result<Vec3> {
        let (segment, local) = self.split_t(t);
        let tangent = self
            .generator
            .evaluate_derivative(local, 1, self.positions.segment(segment)?)?
            .normalize_or_zero();
        let angle = self.normal_angle_at(segment, local)?;
        match self.space {
            CoordinateSpace::Xy => {
                let perp = Vec3::new(-tangent.y, tangent.x, 0.0);
                Ok(Quat::from_axis_angle(Vec3::Z, angle) * perp)
            }
            CoordinateSpace::Xz => {
                let perp = Vec3::new(-tangent.z, 0.0, tangent.x);
                Ok(Quat::from_axis_angle(Vec3::Y, angle) * perp)
            }
            CoordinateSpace::Xyz => {
                let mut base = Vec3::Y.cross(tangent);
                if base.length_squared() < crate::EPSILON {
                    base = Vec3::X.cross(tangent);
                }
                let base = base.normalize_or_zero();
                Ok(Quat::from_axis_angle(tangent, angle) * base)
            }
        }
    }

    /// Normal taken from the rotation-minimizing frame sequence at
    /// `t` (orientation-aligned mode), rotated by the same angle sum
    /// as [`SplineCurve::normal_at`].
    pub fn oriented_normal_at(&mut self, t: f32, accuracy: usize) -> Result<Vec3> {
        let (segment, local) = self.split_t(t);
        let frame = self.get_frenet_frame_at(t, accuracy)?;
        let angle = self.normal_angle_at(segment, local)?;
        Ok(Quat::from_axis_angle(frame.tangent, angle) * frame.normal)
    }

    /// Planar curvature at `t`: `(x'y'' - x''y') / (x'^2 + y'^2)^1.5`.
    ///
    /// The formula is 2D-only and ignores the z component; a zero
    /// numerator or denominator yields NaN. Both are documented
    /// behavior, callers must be prepared for NaN.
    pub fn curvature_at(&self, t: f32) -> Result<f32> {
        let d1 = self.derivative_at(t, 1)?;
        let d2 = self.derivative_at(t, 2)?;
        let numerator = d1.x * d2.y - d2.x * d1.y;
        let denominator = (d1.x * d1.x + d1.y * d1.y).powf(1.5);
        if numerator == 0.0 || denominator == 0.0 {
            Ok(f32::NAN)
        } else {
            Ok(numerator / denominator)
        }
    }

    /// Axis-aligned extrema of one segment: the generator's extrema
    /// parameters per axis (NaN and out-of-range roots discarded)
    /// plus both endpoints, folded into a running min/max.
    pub fn get_segment_extrema(&mut self, segment: usize) -> Result<SplineExtrema> {
        if let Some(cache) = self.cache.as_mut() {
            if let Some(extrema) = cache.segment_mut(segment).extrema {
                return Ok(extrema);
            }
        }
        let extrema = self.compute_segment_extrema(segment)?;
        if let Some(cache) = self.cache.as_mut() {
            cache.segment_mut(segment).extrema = Some(extrema);
        }
        Ok(extrema)
    }

    /// Whole-spline extrema: the union of every segment's extrema.
    pub fn get_extrema(&mut self) -> Result<SplineExtrema> {
        if let Some(cache) = self.cache.as_ref() {
            if let Some(extrema) = cache.extrema {
                return Ok(extrema);
            }
        }
        let mut combined = SplineExtrema::new();
        for segment in 0..self.segment_count() {
            let extrema = self.get_segment_extrema(segment)?;
            combined.combine(&extrema);
        }
        if let Some(cache) = self.cache.as_mut() {
            cache.extrema = Some(combined);
        }
        Ok(combined)
    }

    pub fn get_segment_bounds(&mut self, segment: usize) -> Result<Bounds> {
        Ok(self.get_segment_extrema(segment)?.bounds())
    }

    pub fn get_bounds(&mut self) -> Result<Bounds> {
        Ok(self.get_extrema()?.bounds())
    }

    /// Flatten one segment into `accuracy + 1` evenly `t`-spaced
    /// samples including both endpoints.
    pub fn get_flattened_segment(&mut self, segment: usize, accuracy: usize) -> Result<Vec<Vec3>> {
        check_accuracy(accuracy)?;
        if let Some(cache) = self.cache.as_mut() {
            if let Some(points) = cache.segment_mut(segment).flattened.get(accuracy) {
                return Ok(points.clone());
            }
        }
        let points = self.compute_flattened_segment(segment, accuracy)?;
        if let Some(cache) = self.cache.as_mut() {
            cache
                .segment_mut(segment)
                .flattened
                .store(accuracy, points.clone());
        }
        Ok(points)
    }

    /// Flatten the whole spline at the stored accuracy.
    pub fn get_flattened(&mut self) -> Result<Vec<Vec3>> {
        self.get_flattened_with(self.accuracy)
    }

    /// Flatten the whole spline: `accuracy` samples per segment with
    /// duplicated segment-boundary points dropped, plus the true
    /// final point. The flattened vertex `k` sits at global parameter
    /// `k / accuracy`.
    pub fn get_flattened_with(&mut self, accuracy: usize) -> Result<Vec<Vec3>> {
        check_accuracy(accuracy)?;
        if let Some(cache) = self.cache.as_ref() {
            if let Some(points) = cache.flattened.get(accuracy) {
                return Ok(points.clone());
            }
        }
        let segment_count = self.segment_count();
        let mut points = Vec::with_capacity(segment_count * accuracy + 1);
        for segment in 0..segment_count {
            let flattened = self.get_flattened_segment(segment, accuracy)?;
            // the last sample duplicates the next segment's first
            points.extend_from_slice(&flattened[..accuracy]);
        }
        points.push(self.value_at(segment_count as f32)?);
        if let Some(cache) = self.cache.as_mut() {
            cache.flattened.store(accuracy, points.clone());
        }
        Ok(points)
    }

    /// Arc length of one segment from its flattened polyline.
    pub fn get_segment_length(&mut self, segment: usize, accuracy: usize) -> Result<f32> {
        check_accuracy(accuracy)?;
        if let Some(cache) = self.cache.as_mut() {
            if let Some(length) = cache.segment_mut(segment).length.get(accuracy) {
                return Ok(*length);
            }
        }
        let length = polyline_length(&self.get_flattened_segment(segment, accuracy)?);
        if let Some(cache) = self.cache.as_mut() {
            cache.segment_mut(segment).length.store(accuracy, length);
        }
        Ok(length)
    }

    /// Arc length at the stored accuracy.
    pub fn get_length(&mut self) -> Result<f32> {
        self.get_length_with(self.accuracy)
    }

    /// Arc length of the whole spline: sum of the per-segment
    /// flattened polyline lengths.
    pub fn get_length_with(&mut self, accuracy: usize) -> Result<f32> {
        check_accuracy(accuracy)?;
        if let Some(cache) = self.cache.as_ref() {
            if let Some(length) = cache.length.get(accuracy) {
                return Ok(*length);
            }
        }
        let mut total = 0.0;
        for segment in 0..self.segment_count() {
            total += self.get_segment_length(segment, accuracy)?;
        }
        if let Some(cache) = self.cache.as_mut() {
            cache.length.store(accuracy, total);
        }
        Ok(total)
    }

    /// Invert arc length to a global parameter by interpolating the
    /// cumulative-distance table of the flattened polyline.
    /// Out-of-range distances clamp to `0` and `segment_count`.
    pub fn distance_to_t(&mut self, distance: f32, accuracy: usize) -> Result<f32> {
        check_accuracy(accuracy)?;
        let table = self.distance_table(accuracy)?;
        let total = *table.last().unwrap_or(&0.0);
        if distance <= 0.0 {
            return Ok(0.0);
        }
        if distance >= total {
            return Ok(self.segment_count() as f32);
        }
        // first vertex at or past the requested distance
        let next = table.partition_point(|&d| d < distance).max(1);
        let prev = next - 1;
        let edge = table[next] - table[prev];
        let fraction = if edge > 0.0 {
            (distance - table[prev]) / edge
        } else {
            0.0
        };
        Ok((prev as f32 + fraction) / accuracy as f32)
    }

    /// The rotation-minimizing frame at global parameter `t`, blended
    /// componentwise from the two bracketing frames of the segment's
    /// propagated frame sequence.
    pub fn get_frenet_frame_at(&mut self, t: f32, accuracy: usize) -> Result<FrenetFrame> {
        check_accuracy(accuracy)?;
        let (segment, local) = self.split_t(t);
        let frames = self.frenet_frames_segment(segment, accuracy)?;
        let position = local * accuracy as f32;
        let index = (position.floor() as usize).min(accuracy - 1);
        let fraction = position - index as f32;
        Ok(frames[index].lerp(&frames[index + 1], fraction))
    }

    /// The propagated frame sequence of one segment: `accuracy + 1`
    /// frames seeded from a cross-of-up frame at the segment start.
    pub fn frenet_frames_segment(
        &mut self,
        segment: usize,
        accuracy: usize,
    ) -> Result<Vec<FrenetFrame>> {
        check_accuracy(accuracy)?;
        if let Some(cache) = self.cache.as_mut() {
            if let Some(frames) = cache.segment_mut(segment).frames.get(accuracy) {
                return Ok(frames.clone());
            }
        }
        let frames = self.compute_frenet_frames(segment, accuracy)?;
        if let Some(cache) = self.cache.as_mut() {
            cache
                .segment_mut(segment)
                .frames
                .store(accuracy, frames.clone());
        }
        Ok(frames)
    }

    // --- internals --------------------------------------------------------

    /// Split a global parameter into `(segment, local)`; exact
    /// integers above zero map to the previous segment at local 1.
    fn split_t(&self, t: f32) -> (usize, f32) {
        let segment_count = self.segment_count();
        let t = t.clamp(0.0, segment_count as f32);
        let floor = t.floor();
        let index = floor as usize;
        if index > 0 && t == floor {
            (index - 1, 1.0)
        } else {
            (index.min(segment_count.saturating_sub(1)), t - floor)
        }
    }

    /// Global offset plus the generator's per-segment blend of the
    /// per-point offsets, in radians.
    fn normal_angle_at(&self, segment: usize, local: f32) -> Result<f32> {
        let blended = self
            .generator
            .normals_modifier(local, self.normal_offsets.segment(segment)?)?;
        Ok((self.normal_angle_offset + blended).to_radians())
    }

    fn compute_segment_extrema(&self, segment: usize) -> Result<SplineExtrema> {
        let window = self.positions.segment(segment)?;
        let mut extrema = SplineExtrema::new();
        for t in self.generator.extrema_ts(window)? {
            // degenerate roots come back NaN; roots outside the
            // segment interval do not bound it
            if t.is_finite() && (0.0..=1.0).contains(&t) {
                extrema.include(self.generator.evaluate(t, window)?);
            }
        }
        extrema.include(self.generator.evaluate(0.0, window)?);
        extrema.include(self.generator.evaluate(1.0, window)?);
        Ok(extrema)
    }

    fn compute_flattened_segment(&self, segment: usize, accuracy: usize) -> Result<Vec<Vec3>> {
        let window = self.positions.segment(segment)?;
        let mut points = Vec::with_capacity(accuracy + 1);
        for sample in 0..=accuracy {
            let t = sample as f32 / accuracy as f32;
            points.push(self.generator.evaluate(t, window)?);
        }
        Ok(points)
    }

    fn compute_frenet_frames(&self, segment: usize, accuracy: usize) -> Result<Vec<FrenetFrame>> {
        let window = self.positions.segment(segment)?;
        let origin = self.generator.evaluate(0.0, window)?;
        let tangent = self.generator.evaluate_derivative(0.0, 1, window)?;
        let mut frames = Vec::with_capacity(accuracy + 1);
        frames.push(FrenetFrame::from_up(origin, tangent, self.space.up()));
        for sample in 1..=accuracy {
            let t = sample as f32 / accuracy as f32;
            let origin = self.generator.evaluate(t, window)?;
            let tangent = self.generator.evaluate_derivative(t, 1, window)?;
            let previous = frames[sample - 1];
            frames.push(previous.propagate(origin, tangent));
        }
        Ok(frames)
    }

    fn distance_table(&mut self, accuracy: usize) -> Result<Vec<f32>> {
        if let Some(cache) = self.cache.as_ref() {
            if let Some(table) = cache.distances.get(accuracy) {
                return Ok(table.clone());
            }
        }
        let polyline = self.get_flattened_with(accuracy)?;
        let mut table = Vec::with_capacity(polyline.len());
        let mut running = 0.0;
        table.push(0.0);
        for pair in polyline.windows(2) {
            running += pair[0].distance(pair[1]);
            table.push(running);
        }
        if let Some(cache) = self.cache.as_mut() {
            cache.distances.store(accuracy, table.clone());
        }
        Ok(table)
    }

    fn clear_cache(&mut self) {
        if let Some(cache) = self.cache.as_mut() {
            cache.clear();
        }
    }
}

fn check_accuracy(accuracy: usize) -> Result<()> {
    if accuracy == 0 {
        return Err(SplineError::Accuracy(accuracy));
    }
    Ok(())
}

fn polyline_length(points: &[Vec3]) -> f32 {
    points.windows(2).map(|pair| pair[0].distance(pair[1])).sum()
}

fn unzip(points: &[ControlPoint]) -> (Vec<Vec3>, Vec<f32>) {
    (
        points.iter().map(|c| c.position).collect(),
        points.iter().map(|c| c.normal_offset).collect(),
    )
}
