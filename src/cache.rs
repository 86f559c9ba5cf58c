//! Lazy per-segment and whole-spline memoization.
//!
//! Derived queries store their results here tagged with the sampling
//! accuracy they were computed at; a stored value is only served when
//! its tag matches the requested accuracy, otherwise the caller
//! recomputes and replaces it. Invalidation is all-or-nothing: any
//! structural mutation clears every per-segment entry and then the
//! spline-level entries. Partial invalidation would have to reason
//! about neighbor stitching at segment boundaries and is deliberately
//! not attempted.

use glam::Vec3;
use log::trace;

use crate::extrema::SplineExtrema;
use crate::frenet::FrenetFrame;

/// A value memoized together with the accuracy it was computed at.
#[derive(Debug, Clone, Default)]
pub(crate) struct Tagged<T> {
    value: Option<(usize, T)>,
}

impl<T: Clone> Tagged<T> {
    /// The stored value, only if it was computed at `accuracy`.
    pub(crate) fn get(&self, accuracy: usize) -> Option<&T> {
        match &self.value {
            Some((tag, v)) if *tag == accuracy => Some(v),
            _ => None,
        }
    }

    pub(crate) fn store(&mut self, accuracy: usize, value: T) {
        self.value = Some((accuracy, value));
    }

    pub(crate) fn clear(&mut self) {
        self.value = None;
    }
}

/// Memo record for one segment.
#[derive(Debug, Clone, Default)]
pub(crate) struct SegmentCache {
    /// Extrema do not depend on sampling accuracy.
    pub(crate) extrema: Option<SplineExtrema>,
    pub(crate) flattened: Tagged<Vec<Vec3>>,
    pub(crate) length: Tagged<f32>,
    pub(crate) frames: Tagged<Vec<FrenetFrame>>,
}

impl SegmentCache {
    fn clear(&mut self) {
        self.extrema = None;
        self.flattened.clear();
        self.length.clear();
        self.frames.clear();
    }
}

/// Memo record for the whole spline, aggregating the per-segment
/// records plus the spline-level combined values.
#[derive(Debug, Clone, Default)]
pub(crate) struct SplineCache {
    segments: Vec<SegmentCache>,
    pub(crate) extrema: Option<SplineExtrema>,
    pub(crate) flattened: Tagged<Vec<Vec3>>,
    pub(crate) length: Tagged<f32>,
    /// Cumulative distances over the flattened polyline.
    pub(crate) distances: Tagged<Vec<f32>>,
}

impl SplineCache {
    /// The memo record for `segment`, growing the table on demand.
    pub(crate) fn segment_mut(&mut self, segment: usize) -> &mut SegmentCache {
        if segment >= self.segments.len() {
            self.segments.resize_with(segment + 1, SegmentCache::default);
        }
        &mut self.segments[segment]
    }

    /// Drop everything: every per-segment record first, then the
    /// spline-level entries.
    pub(crate) fn clear(&mut self) {
        trace!("clearing spline cache ({} segment records)", self.segments.len());
        for segment in &mut self.segments {
            segment.clear();
        }
        self.segments.clear();
        self.extrema = None;
        self.flattened.clear();
        self.length.clear();
        self.distances.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_values_only_hit_on_matching_accuracy() {
        let mut t = Tagged::default();
        assert!(t.get(16).is_none());
        t.store(16, 42.0f32);
        assert_eq!(t.get(16), Some(&42.0));
        // a different requested accuracy is a miss
        assert!(t.get(32).is_none());
        t.store(32, 43.0);
        assert_eq!(t.get(32), Some(&43.0));
        assert!(t.get(16).is_none());
    }

    #[test]
    fn clear_drops_all_levels() {
        let mut c = SplineCache::default();
        c.segment_mut(2).length.store(8, 1.25);
        c.length.store(8, 5.0);
        c.extrema = Some(SplineExtrema::new());
        assert_eq!(c.segment_mut(2).length.get(8), Some(&1.25));
        c.clear();
        assert!(c.segment_mut(2).length.get(8).is_none());
        assert!(c.length.get(8).is_none());
        assert!(c.extrema.is_none());
    }
}
