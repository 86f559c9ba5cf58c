//! Line segment math in 3D.
//!
//! Closest-point and intersection helpers for straight segments,
//! used by the flattened-polyline intersection queries and available
//! to hosts for picking math. Two 3D segments rarely meet exactly, so
//! "intersection" means closest approach within a tolerance.

use glam::Vec3;

use crate::EPSILON;

/// Closest point to `p` on the segment `a..b` (clamped projection).
pub fn closest_point_on_segment(a: Vec3, b: Vec3, p: Vec3) -> Vec3 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    // degenerate segment: both ends coincide
    if len_sq < EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Distance from `p` to the segment `a..b`.
pub fn distance_to_segment(a: Vec3, b: Vec3, p: Vec3) -> f32 {
    (p - closest_point_on_segment(a, b, p)).length()
}

/// Closest pair of points between segments `p1..q1` and `p2..q2`.
///
/// Standard clamped two-segment closest-point computation; handles
/// parallel and degenerate segments.
pub fn closest_points_between_segments(p1: Vec3, q1: Vec3, p2: Vec3, q2: Vec3) -> (Vec3, Vec3) {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.length_squared();
    let e = d2.length_squared();
    let f = d2.dot(r);

    let (mut s, mut t);
    if a < EPSILON && e < EPSILON {
        return (p1, p2);
    }
    if a < EPSILON {
        s = 0.0;
        t = (f / e).clamp(0.0, 1.0);
    } else {
        let c = d1.dot(r);
        if e < EPSILON {
            t = 0.0;
            s = (-c / a).clamp(0.0, 1.0);
        } else {
            let b = d1.dot(d2);
            let denom = a * e - b * b;
            // parallel segments pick an arbitrary s
            s = if denom > EPSILON {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            t = (b * s + f) / e;
            // re-clamp t and recompute s from it
            if t < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            }
        }
    }
    (p1 + d1 * s, p2 + d2 * t)
}

/// Intersection of two 3D segments within `tolerance`: the midpoint
/// of the closest pair if they approach closer than the tolerance.
pub fn segment_segment_intersection(
    p1: Vec3,
    q1: Vec3,
    p2: Vec3,
    q2: Vec3,
    tolerance: f32,
) -> Option<Vec3> {
    let (c1, c2) = closest_points_between_segments(p1, q1, p2, q2);
    if (c1 - c2).length_squared() <= tolerance * tolerance {
        Some((c1 + c2) * 0.5)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Classic 3-4-5 check: the projection math must reproduce the
    /// pythagorean distances.
    #[test]
    fn distance_pythagorean() {
        let a = Vec3::new(0.0, 1.0, 0.0);
        let b = Vec3::new(3.0, 1.0, 0.0);
        let p = Vec3::new(0.0, 5.0, 0.0);
        assert_relative_eq!(distance_to_segment(a, b, p), 4.0, epsilon = 1e-6);
        // beyond the end the projection clamps to the endpoint
        let past = Vec3::new(6.0, 5.0, 0.0);
        assert_relative_eq!(distance_to_segment(a, b, past), 5.0, epsilon = 1e-6);
    }

    #[test]
    fn closest_point_clamps_to_endpoints() {
        let a = Vec3::ZERO;
        let b = Vec3::new(2.0, 0.0, 0.0);
        assert_eq!(closest_point_on_segment(a, b, Vec3::new(-3.0, 1.0, 0.0)), a);
        assert_eq!(closest_point_on_segment(a, b, Vec3::new(5.0, 1.0, 0.0)), b);
        assert_eq!(
            closest_point_on_segment(a, b, Vec3::new(1.0, 7.0, 0.0)),
            Vec3::new(1.0, 0.0, 0.0)
        );
        // degenerate segment
        assert_eq!(closest_point_on_segment(a, a, b), a);
    }

    #[test]
    fn crossing_segments_intersect() {
        let hit = segment_segment_intersection(
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            1e-4,
        )
        .unwrap();
        assert!(hit.length_squared() < 1e-8);
    }

    #[test]
    fn skew_segments_miss() {
        // crossing in projection but separated by 1 along z
        let hit = segment_segment_intersection(
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, -1.0, 1.0),
            Vec3::new(0.0, 1.0, 1.0),
            1e-4,
        );
        assert!(hit.is_none());
    }

    #[test]
    fn parallel_segments_report_gap() {
        let (c1, c2) = closest_points_between_segments(
            Vec3::ZERO,
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::new(4.0, 2.0, 0.0),
        );
        assert_relative_eq!((c1 - c2).length(), 2.0, epsilon = 1e-6);
    }
}
