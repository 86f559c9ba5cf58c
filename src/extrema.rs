//! Running axis-aligned extrema and the bounds derived from them.

use glam::Vec3;

/// A running min/max corner pair. Starts at +/- infinity until the
/// first insertion; folding two extrema yields their union.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplineExtrema {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for SplineExtrema {
    fn default() -> Self {
        SplineExtrema {
            min: Vec3::INFINITY,
            max: Vec3::NEG_INFINITY,
        }
    }
}

impl SplineExtrema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any point has been folded in yet.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    /// Fold a single point into the running min/max.
    pub fn include(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Fold another extrema pair in, producing the union in place.
    pub fn combine(&mut self, other: &SplineExtrema) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// The axis-aligned bounding box spanned by the extrema.
    pub fn bounds(&self) -> Bounds {
        Bounds {
            min: self.min,
            max: self.max,
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Overlap test used for bounding-box rejection, with a tolerance
    /// inflating both boxes.
    pub fn intersects(&self, other: &Bounds, tolerance: f32) -> bool {
        let pad = Vec3::splat(tolerance);
        (self.min - pad).cmple(other.max).all() && (other.min - pad).cmple(self.max).all()
    }

    /// The box spanned by two points (any corner order).
    pub fn from_corners(a: Vec3, b: Vec3) -> Bounds {
        Bounds {
            min: a.min(b),
            max: a.max(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_infinity_and_folds() {
        let mut e = SplineExtrema::new();
        assert!(e.is_empty());
        e.include(Vec3::new(1.0, -2.0, 3.0));
        e.include(Vec3::new(-1.0, 4.0, 0.0));
        assert!(!e.is_empty());
        assert_eq!(e.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(e.max, Vec3::new(1.0, 4.0, 3.0));
    }

    #[test]
    fn combine_is_union() {
        let mut a = SplineExtrema::new();
        a.include(Vec3::ZERO);
        let mut b = SplineExtrema::new();
        b.include(Vec3::new(5.0, 5.0, 5.0));
        a.combine(&b);
        assert_eq!(a.min, Vec3::ZERO);
        assert_eq!(a.max, Vec3::splat(5.0));
        // combining with an empty extrema changes nothing
        a.combine(&SplineExtrema::new());
        assert_eq!(a.max, Vec3::splat(5.0));
    }

    #[test]
    fn bounds_queries() {
        let b = Bounds::from_corners(Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 2.0));
        assert_eq!(b.center(), Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(b.size(), Vec3::splat(2.0));
        assert!(b.contains(Vec3::ONE));
        assert!(!b.contains(Vec3::splat(3.0)));

        let far = Bounds::from_corners(Vec3::splat(5.0), Vec3::splat(6.0));
        assert!(!b.intersects(&far, 0.0));
        assert!(b.intersects(&far, 3.1));
    }
}
