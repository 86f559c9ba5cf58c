//! Rotation-minimizing moving frames.
//!
//! Frame sequences along a curve are built by propagating an initial
//! frame with the double-reflection method rather than computing a
//! normal independently at every sample; independent normals flip on
//! nearly straight stretches, propagated ones do not.

use glam::Vec3;

use crate::EPSILON;

/// A local frame on the curve: origin, unit tangent, rotation axis
/// (binormal) and normal.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrenetFrame {
    pub origin: Vec3,
    pub tangent: Vec3,
    pub axis: Vec3,
    pub normal: Vec3,
}

impl FrenetFrame {
    /// Initial frame from an origin, tangent and a reference up
    /// direction. Falls back to the other cardinal axes when the
    /// tangent is (anti)parallel to the reference.
    pub fn from_up(origin: Vec3, tangent: Vec3, up: Vec3) -> Self {
        let tangent = tangent.normalize_or_zero();
        let mut axis = tangent.cross(up);
        if axis.length_squared() < EPSILON {
            axis = tangent.cross(Vec3::X);
            if axis.length_squared() < EPSILON {
                axis = tangent.cross(Vec3::Z);
            }
        }
        let axis = axis.normalize_or_zero();
        let normal = axis.cross(tangent);
        FrenetFrame {
            origin,
            tangent,
            axis,
            normal,
        }
    }

    /// Componentwise blend between two frames. This is an
    /// approximation of the true frame interpolation; the blended
    /// vectors are re-normalized but not re-orthogonalized.
    pub fn lerp(&self, other: &FrenetFrame, t: f32) -> FrenetFrame {
        FrenetFrame {
            origin: self.origin.lerp(other.origin, t),
            tangent: self.tangent.lerp(other.tangent, t).normalize_or_zero(),
            axis: self.axis.lerp(other.axis, t).normalize_or_zero(),
            normal: self.normal.lerp(other.normal, t).normalize_or_zero(),
        }
    }

    /// Propagate this frame to the next sample with the
    /// double-reflection update (Wang et al., "Computation of
    /// rotation minimizing frames").
    pub fn propagate(&self, origin: Vec3, tangent: Vec3) -> FrenetFrame {
        let tangent = tangent.normalize_or_zero();
        let v1 = origin - self.origin;
        let c1 = v1.length_squared();
        if c1 < EPSILON {
            // stationary sample: keep the orientation
            return FrenetFrame { origin, ..*self };
        }
        // first reflection: across the plane between the two origins
        let r_l = self.normal - v1 * (2.0 / c1) * v1.dot(self.normal);
        let t_l = self.tangent - v1 * (2.0 / c1) * v1.dot(self.tangent);
        // second reflection: align the reflected tangent with the new one
        let v2 = tangent - t_l;
        let c2 = v2.length_squared();
        let normal = if c2 < EPSILON {
            r_l
        } else {
            r_l - v2 * (2.0 / c2) * v2.dot(r_l)
        };
        let normal = normal.normalize_or_zero();
        FrenetFrame {
            origin,
            tangent,
            axis: tangent.cross(normal),
            normal,
        }
    }
}
