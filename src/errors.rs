//! Crate error type.
//!
//! Every precondition violation in the library surfaces as a
//! [`SplineError`]; there are no panicking entry points. Undefined
//! numeric results (degenerate extrema roots, zero-curvature cases)
//! are represented as NaN values instead, so callers only ever handle
//! the structural failures listed here.

use thiserror::Error;

pub type Result<T> = core::result::Result<T, SplineError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SplineError {
    /// A generator method received a point window of the wrong length.
    #[error("{family} expects a window of {expected} control points, got {actual}")]
    WindowSize {
        family: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Derivative order outside 0..=3; a cubic basis has no higher derivative.
    #[error("derivative order {0} is out of range for a cubic basis (expected 0..=3)")]
    DerivativeOrder(usize),

    /// Sampling accuracy must be a positive number of samples per segment.
    #[error("accuracy must be at least 1, got {0}")]
    Accuracy(usize),

    /// Segment size and slide size must be positive with `slide <= segment`.
    #[error("invalid segment shape: segment size {segment_size}, slide size {slide_size}")]
    SegmentShape {
        segment_size: usize,
        slide_size: usize,
    },

    /// Item count does not satisfy `count = segment_size + n * slide_size`.
    #[error("{count} items do not satisfy count = {segment_size} + n * {slide_size}")]
    PointCount {
        count: usize,
        segment_size: usize,
        slide_size: usize,
    },

    /// Segment insertion needs a positive multiple of the slide size.
    #[error("chunk of {actual} items is not a positive multiple of slide size {slide_size}")]
    ChunkSize { slide_size: usize, actual: usize },

    /// Out-of-range segment index.
    #[error("segment index {index} out of range ({count} segments)")]
    SegmentIndex { index: usize, count: usize },

    /// Out-of-range point index.
    #[error("point index {index} out of range ({count} points)")]
    PointIndex { index: usize, count: usize },

    /// Removing the last remaining segment would leave the collection
    /// without its base segment.
    #[error("cannot remove the last remaining segment")]
    LastSegment,
}
