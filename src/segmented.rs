//! Segment-granular storage for control point data.
//!
//! A [`SegmentedCollection`] is a flat ordered sequence of values that
//! only grows and shrinks in whole segments, governed by the window
//! shape `(segment_size, slide_size)` of the generator it is
//! configured for. The invariant `count = segment_size + n *
//! slide_size` holds at all times; failed mutations leave the
//! collection unchanged.
//!
//! Positions and per-point normal-angle offsets are stored as two
//! parallel collections rather than one struct collection so each can
//! be queried and resized independently.

use log::debug;

use crate::errors::{Result, SplineError};
use crate::indexing::{self, SegmentIndices};

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentedCollection<T> {
    items: Vec<T>,
    segment_size: usize,
    slide_size: usize,
}

impl<T: Clone> SegmentedCollection<T> {
    /// Build a collection over `items`, which must contain at least
    /// one whole segment and satisfy the count invariant.
    pub fn new(segment_size: usize, slide_size: usize, items: Vec<T>) -> Result<Self> {
        check_shape(segment_size, slide_size)?;
        if items.len() < segment_size || (items.len() - segment_size) % slide_size != 0 {
            return Err(SplineError::PointCount {
                count: items.len(),
                segment_size,
                slide_size,
            });
        }
        Ok(SegmentedCollection {
            items,
            segment_size,
            slide_size,
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn segment_size(&self) -> usize {
        self.segment_size
    }

    pub fn slide_size(&self) -> usize {
        self.slide_size
    }

    pub fn segment_count(&self) -> usize {
        indexing::segment_count(self.items.len(), self.segment_size, self.slide_size)
    }

    /// All items in order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Overwrite a single item in place; segment structure is not
    /// affected.
    pub fn set(&mut self, index: usize, value: T) -> Result<()> {
        match self.items.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(SplineError::PointIndex {
                index,
                count: self.items.len(),
            }),
        }
    }

    /// Borrowed view of exactly `segment_size` consecutive items for
    /// segment `index`. The view is a plain slice into the backing
    /// storage, never a copy.
    pub fn segment(&self, index: usize) -> Result<&[T]> {
        let count = self.segment_count();
        if index >= count {
            return Err(SplineError::SegmentIndex { index, count });
        }
        let start = indexing::first_point_of_segment(index, self.slide_size);
        Ok(&self.items[start..start + self.segment_size])
    }

    /// Append exactly one slide worth of items, creating one segment.
    pub fn add_segment(&mut self, items: &[T]) -> Result<()> {
        self.check_chunk(items, true)?;
        self.items.extend_from_slice(items);
        Ok(())
    }

    /// Append any positive multiple of the slide size.
    pub fn add_segment_range(&mut self, items: &[T]) -> Result<()> {
        self.check_chunk(items, false)?;
        self.items.extend_from_slice(items);
        Ok(())
    }

    /// Insert exactly one slide worth of items so that the new window
    /// appears at segment position `index`.
    pub fn insert_segment(&mut self, index: usize, items: &[T]) -> Result<()> {
        self.check_chunk(items, true)?;
        self.insert_at_segment(index, items)
    }

    /// Insert any positive multiple of the slide size at segment
    /// position `index`.
    pub fn insert_segment_range(&mut self, index: usize, items: &[T]) -> Result<()> {
        self.check_chunk(items, false)?;
        self.insert_at_segment(index, items)
    }

    /// Remove one segment's slide-sized contribution. Removing the
    /// base segment of a single-segment collection is illegal and
    /// leaves the collection unchanged.
    pub fn remove_segment_at(&mut self, index: usize) -> Result<()> {
        let count = self.segment_count();
        if index >= count {
            return Err(SplineError::SegmentIndex { index, count });
        }
        if count == 1 {
            return Err(SplineError::LastSegment);
        }
        // segment 0 surrenders its leading items so the follower
        // becomes the new base segment; any other segment surrenders
        // its trailing slide
        let start = if index == 0 {
            0
        } else {
            indexing::first_point_of_segment(index, self.slide_size) + self.segment_size
                - self.slide_size
        };
        self.items.drain(start..start + self.slide_size);
        Ok(())
    }

    /// Change the window shape, truncating trailing items that no
    /// longer satisfy the count invariant.
    pub fn set_segment_sizes(&mut self, segment_size: usize, slide_size: usize) -> Result<()> {
        check_shape(segment_size, slide_size)?;
        if self.items.len() >= segment_size {
            let excess = (self.items.len() - segment_size) % slide_size;
            if excess > 0 {
                debug!(
                    "reshaping collection to ({segment_size}, {slide_size}) truncates {excess} trailing items"
                );
                self.items.truncate(self.items.len() - excess);
            }
        }
        self.segment_size = segment_size;
        self.slide_size = slide_size;
        Ok(())
    }

    /// Every segment index whose window contains `point`.
    pub fn segment_indices_of(&self, point: usize, looped: bool) -> SegmentIndices {
        indexing::segment_indices_of(
            point,
            self.items.len(),
            self.segment_size,
            self.slide_size,
            looped,
        )
    }

    /// Replace the whole window of `segment` with `replacement`,
    /// used by segment splitting. The replacement length must keep
    /// the count invariant (i.e. differ from `segment_size` by a
    /// multiple of the slide size).
    pub(crate) fn replace_window(&mut self, segment: usize, replacement: &[T]) -> Result<()> {
        let count = self.segment_count();
        if segment >= count {
            return Err(SplineError::SegmentIndex {
                index: segment,
                count,
            });
        }
        if replacement.len() < self.segment_size
            || (replacement.len() - self.segment_size) % self.slide_size != 0
        {
            return Err(SplineError::ChunkSize {
                slide_size: self.slide_size,
                actual: replacement.len(),
            });
        }
        let start = indexing::first_point_of_segment(segment, self.slide_size);
        self.items
            .splice(start..start + self.segment_size, replacement.iter().cloned());
        Ok(())
    }

    fn check_chunk(&self, items: &[T], exact: bool) -> Result<()> {
        let ok = if exact {
            items.len() == self.slide_size
        } else {
            !items.is_empty() && items.len() % self.slide_size == 0
        };
        if !ok {
            return Err(SplineError::ChunkSize {
                slide_size: self.slide_size,
                actual: items.len(),
            });
        }
        Ok(())
    }

    fn insert_at_segment(&mut self, index: usize, items: &[T]) -> Result<()> {
        let count = self.segment_count();
        if index > count {
            return Err(SplineError::SegmentIndex { index, count });
        }
        let at = indexing::first_point_of_segment(index, self.slide_size).min(self.items.len());
        // splice with an empty removal is a positional multi-insert
        self.items.splice(at..at, items.iter().cloned());
        Ok(())
    }
}

fn check_shape(segment_size: usize, slide_size: usize) -> Result<()> {
    if segment_size == 0 || slide_size == 0 || slide_size > segment_size {
        return Err(SplineError::SegmentShape {
            segment_size,
            slide_size,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> Vec<i32> {
        (0..n as i32).collect()
    }

    /// `(7 - 4) mod 3 == 0` constructs with two segments;
    /// `(8 - 4) mod 3 != 0` must fail.
    #[test]
    fn construction_honors_count_invariant() {
        let c = SegmentedCollection::new(4, 3, numbered(7)).unwrap();
        assert_eq!(c.segment_count(), 2);
        let err = SegmentedCollection::new(4, 3, numbered(8)).unwrap_err();
        assert_eq!(
            err,
            SplineError::PointCount {
                count: 8,
                segment_size: 4,
                slide_size: 3
            }
        );
        assert!(SegmentedCollection::new(4, 3, numbered(2)).is_err());
        // degenerate shapes
        assert!(SegmentedCollection::new(0, 0, numbered(4)).is_err());
        assert!(SegmentedCollection::new(2, 3, numbered(5)).is_err());
    }

    #[test]
    fn segment_views_are_window_slices() {
        let c = SegmentedCollection::new(4, 3, numbered(10)).unwrap();
        assert_eq!(c.segment_count(), 3);
        assert_eq!(c.segment(0).unwrap(), &[0, 1, 2, 3]);
        assert_eq!(c.segment(1).unwrap(), &[3, 4, 5, 6]);
        assert_eq!(c.segment(2).unwrap(), &[6, 7, 8, 9]);
        assert!(c.segment(3).is_err());

        let sliding = SegmentedCollection::new(4, 1, numbered(6)).unwrap();
        assert_eq!(sliding.segment(1).unwrap(), &[1, 2, 3, 4]);
    }

    /// Each `add_segment` grows the collection by exactly one segment.
    #[test]
    fn add_segment_grows_by_one() {
        let mut c = SegmentedCollection::new(4, 3, numbered(4)).unwrap();
        assert_eq!(c.segment_count(), 1);
        c.add_segment(&[4, 5, 6]).unwrap();
        assert_eq!(c.segment_count(), 2);
        c.add_segment_range(&[7, 8, 9, 10, 11, 12]).unwrap();
        assert_eq!(c.segment_count(), 4);
        // wrong chunk sizes are rejected without mutating
        assert!(c.add_segment(&[1, 2]).is_err());
        assert!(c.add_segment_range(&[1, 2, 3, 4]).is_err());
        assert!(c.add_segment_range(&[]).is_err());
        assert_eq!(c.len(), 13);
    }

    #[test]
    fn insert_segment_shifts_followers() {
        let mut c = SegmentedCollection::new(2, 1, vec![0, 10, 20]).unwrap();
        c.insert_segment(1, &[5]).unwrap();
        assert_eq!(c.items(), &[0, 5, 10, 20]);
        c.insert_segment(0, &[-5]).unwrap();
        assert_eq!(c.items(), &[-5, 0, 5, 10, 20]);
        // appending via the one-past-the-end segment position
        c.insert_segment(c.segment_count(), &[30]).unwrap();
        assert_eq!(c.items(), &[-5, 0, 5, 10, 20, 30]);
        assert!(c.insert_segment(99, &[1]).is_err());
    }

    #[test]
    fn remove_segment_drops_one_slide() {
        let mut c = SegmentedCollection::new(4, 3, numbered(10)).unwrap();
        c.remove_segment_at(1).unwrap();
        // middle segment surrenders its trailing slide [4, 5, 6]
        assert_eq!(c.items(), &[0, 1, 2, 3, 7, 8, 9]);
        assert_eq!(c.segment_count(), 2);
        c.remove_segment_at(0).unwrap();
        // base segment surrenders its leading slide
        assert_eq!(c.items(), &[3, 7, 8, 9]);
    }

    /// Removing the last remaining segment fails and leaves the
    /// collection unchanged.
    #[test]
    fn last_segment_is_protected() {
        let mut c = SegmentedCollection::new(4, 3, numbered(4)).unwrap();
        assert_eq!(c.remove_segment_at(0).unwrap_err(), SplineError::LastSegment);
        assert_eq!(c.items(), &[0, 1, 2, 3]);
        assert_eq!(c.segment_count(), 1);
    }

    #[test]
    fn reshaping_truncates_trailing_items() {
        // 7 items valid for (4, 3); reshaping to (4, 2) leaves
        // (7 - 4) % 2 = 1 excess item
        let mut c = SegmentedCollection::new(4, 3, numbered(7)).unwrap();
        c.set_segment_sizes(4, 2).unwrap();
        assert_eq!(c.len(), 6);
        assert_eq!(c.segment_count(), 2);
        assert!(c.set_segment_sizes(4, 5).is_err());
    }

    /// A window view stays observably correct while unrelated later
    /// segments are mutated.
    #[test]
    fn views_unaffected_by_later_mutation() {
        let mut c = SegmentedCollection::new(4, 3, numbered(10)).unwrap();
        let before: Vec<i32> = c.segment(0).unwrap().to_vec();
        c.remove_segment_at(2).unwrap();
        assert_eq!(c.segment(0).unwrap(), before.as_slice());
    }

    #[test]
    fn replace_window_splices_split_run() {
        let mut c = SegmentedCollection::new(4, 3, numbered(7)).unwrap();
        // a split of segment 0 supplies S + K = 7 replacement items
        c.replace_window(0, &[0, 100, 101, 102, 103, 104, 3]).unwrap();
        assert_eq!(c.segment_count(), 3);
        assert_eq!(c.segment(0).unwrap(), &[0, 100, 101, 102]);
        assert_eq!(c.segment(1).unwrap(), &[102, 103, 104, 3]);
        assert_eq!(c.segment(2).unwrap(), &[3, 4, 5, 6]);
        // replacement must keep the invariant
        assert!(c.replace_window(0, &[1, 2, 3]).is_err());
    }
}
