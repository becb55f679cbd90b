//! Bulk-append paths for `SegmentedList`, dispatched by source shape.
//!
//! The engine cannot assume an arbitrary source is contiguous, but it must
//! not reallocate per element either, so each source shape gets the fastest
//! strategy it admits:
//!
//! - a slice: one reservation, then block-wise span copies;
//! - another `SegmentedList`: block-wise copies from the source's blocks;
//! - an iterator with an exact `size_hint`: one reservation, then the push
//!   fast path;
//! - an iterator of unknown length: grown one block at a time as it drains.

use std::ptr;

use crate::SegmentedList;

impl<T> SegmentedList<T> {
    /// Appends every element of `src`, cloning, using block-wise copies.
    ///
    /// Reserves the full required capacity up front; spans are written
    /// directly into destination blocks, crossing block boundaries without
    /// per-element cursor bookkeeping.
    pub fn push_slice(&mut self, src: &[T])
    where
        T: Clone,
    {
        self.reserve(src.len());
        let mut rest = src;
        while !rest.is_empty() {
            let space = self.block_size - self.next_item_index;
            let take = space.min(rest.len());
            unsafe {
                let block = self.blocks.get_unchecked(self.next_block_index);
                let base = block.ptr().add(self.next_item_index);
                for (slot, item) in rest[..take].iter().enumerate() {
                    ptr::write(base.add(slot), item.clone());
                    // Count each write immediately so a panicking Clone
                    // leaves len covering exactly the initialized elements.
                    self.len += 1;
                }
            }
            self.sync_cursor();
            rest = &rest[take..];
        }
    }

    /// Appends every element of another list, cloning block by block.
    pub fn push_list(&mut self, src: &SegmentedList<T>)
    where
        T: Clone,
    {
        self.reserve(src.len());
        let mut block_index = 0;
        let mut copied = 0;
        while copied < src.len() {
            let slice = src.block_slice(block_index);
            self.push_slice(slice);
            copied += slice.len();
            block_index += 1;
        }
    }

    /// Append path for iterators that do not reveal their length: grow by
    /// one block at a time instead of doubling, since there is no basis for
    /// predicting the total.
    pub(crate) fn extend_desugared<I: Iterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            if self.len == self.capacity() {
                let required = self.len.checked_add(1).expect("capacity overflow");
                self.grow_to(required);
                self.sync_cursor();
            }
            self.push(value);
        }
    }

    /// Append path for iterators with an exact size hint: reserve once, then
    /// every push takes the fast path.
    fn extend_exact<I: Iterator<Item = T>>(&mut self, iter: I, count: usize) {
        self.reserve(count);
        for value in iter {
            self.push(value);
        }
    }
}

impl<T> Extend<T> for SegmentedList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, upper) = iter.size_hint();
        if upper == Some(lower) && lower > 0 {
            self.extend_exact(iter, lower);
        } else {
            self.extend_desugared(iter);
        }
    }
}

impl<T> FromIterator<T> for SegmentedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<T: Clone> From<&[T]> for SegmentedList<T> {
    fn from(src: &[T]) -> Self {
        let mut list = Self::new();
        list.push_slice(src);
        list
    }
}
