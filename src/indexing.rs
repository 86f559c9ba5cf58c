//! Point-index / segment-index arithmetic.
//!
//! A segmented store with window length `S` (`segment_size`) and
//! stride `K` (`slide_size`) places segment `i` over the items
//! `[i*K, i*K + S)`. These helpers convert between point and segment
//! indices for both linear and looped topologies; they have no other
//! dependencies and are shared by [`crate::segmented`] and the spline
//! aggregate.

use tinyvec::ArrayVec;

/// A point can be covered by at most `ceil(S / K) <= 4` windows for
/// the window shapes used in this crate.
pub type SegmentIndices = ArrayVec<[usize; 4]>;

/// First item index of segment `segment`.
pub fn first_point_of_segment(segment: usize, slide_size: usize) -> usize {
    segment * slide_size
}

/// Number of whole segments a store of `count` items holds; 0 until
/// the base segment is complete.
pub fn segment_count(count: usize, segment_size: usize, slide_size: usize) -> usize {
    if count < segment_size {
        0
    } else {
        (count - segment_size) / slide_size + 1
    }
}

/// Every segment index whose window contains `point`.
///
/// For a looped store the point index is first wrapped modulo `count`
/// and windows are allowed to wrap past the seam; the first covering
/// segment is found by walking backward from the naive (non-looped)
/// estimate until a window no longer reaches the point.
pub fn segment_indices_of(
    point: usize,
    count: usize,
    segment_size: usize,
    slide_size: usize,
    looped: bool,
) -> SegmentIndices {
    let mut indices = SegmentIndices::new();
    if looped {
        if count == 0 || count % slide_size != 0 {
            return indices;
        }
        let point = point % count;
        let n_segments = count / slide_size;
        let contains = |segment: usize| {
            let start = (segment * slide_size) % count;
            // offset of the point inside the (possibly wrapping) window
            (point + count - start) % count < segment_size
        };
        // walk backward across the seam from the naive estimate
        let mut first = point / slide_size;
        let max_cover = segment_size.div_ceil(slide_size);
        for _ in 0..max_cover {
            let prev = (first + n_segments - 1) % n_segments;
            if prev == first || !contains(prev) {
                break;
            }
            first = prev;
        }
        let mut segment = first;
        for _ in 0..n_segments {
            if !contains(segment) {
                break;
            }
            indices.push(segment);
            segment = (segment + 1) % n_segments;
        }
    } else {
        let n_segments = segment_count(count, segment_size, slide_size);
        if n_segments == 0 || point >= count {
            return indices;
        }
        // window i reaches point iff i*K <= point < i*K + S
        let lo = if point + 1 > segment_size {
            (point + 1 - segment_size).div_ceil(slide_size)
        } else {
            0
        };
        let hi = (point / slide_size).min(n_segments - 1);
        for segment in lo..=hi {
            indices.push(segment);
        }
    }
    indices
}
