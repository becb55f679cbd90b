//! Iterator implementations for `SegmentedList`.

use crate::SegmentedList;

/// An iterator over references to elements of a `SegmentedList`.
///
/// Walks the list block by block; within a block it is a plain slice
/// iterator.
pub struct Iter<'a, T> {
    list: &'a SegmentedList<T>,
    /// Iterator over the remainder of the current block.
    block: std::slice::Iter<'a, T>,
    /// Logical index of the next element to yield.
    index: usize,
}

impl<'a, T> Iter<'a, T> {
    #[inline]
    pub(crate) fn new(list: &'a SegmentedList<T>) -> Self {
        Self {
            list,
            block: Default::default(),
            index: 0,
        }
    }

    /// Moves to the next block. The current block iterator only runs dry on
    /// block boundaries, so `index` is always block-aligned here.
    #[cold]
    fn next_block(&mut self) -> Option<&'a T> {
        if self.index >= self.list.len() {
            return None;
        }
        let block_index = self.index >> self.list.block_shift();
        self.block = self.list.block_slice(block_index).iter();
        self.index += 1;
        self.block.next()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if let Some(item) = self.block.next() {
            self.index += 1;
            return Some(item);
        }
        self.next_block()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.list.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> std::iter::FusedIterator for Iter<'_, T> {}

// Safety: Iter only yields shared references.
unsafe impl<T: Sync> Sync for Iter<'_, T> {}
unsafe impl<T: Sync> Send for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a SegmentedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iter_order() {
        let mut list: SegmentedList<usize> = SegmentedList::with_block_size(4);
        for i in 0..19 {
            list.push(i);
        }
        let collected: Vec<usize> = list.iter().copied().collect();
        assert_eq!(collected, (0..19).collect::<Vec<_>>());
    }

    #[test]
    fn test_iter_restarts_at_zero() {
        let mut list: SegmentedList<i32> = SegmentedList::with_block_size(4);
        list.extend(0..10);
        assert_eq!(list.iter().next(), Some(&0));
        assert_eq!(list.iter().next(), Some(&0));
    }

    #[test]
    fn test_iter_empty() {
        let list: SegmentedList<i32> = SegmentedList::new();
        assert_eq!(list.iter().next(), None);
    }

    #[test]
    fn test_size_hint() {
        let mut list: SegmentedList<i32> = SegmentedList::with_block_size(4);
        list.extend(0..10);
        let mut iter = list.iter();
        assert_eq!(iter.len(), 10);
        iter.next();
        assert_eq!(iter.len(), 9);
    }

    #[test]
    fn test_for_loop_sugar() {
        let mut list: SegmentedList<i32> = SegmentedList::with_block_size(8);
        list.extend(0..50);
        let mut total = 0;
        for value in &list {
            total += *value;
        }
        assert_eq!(total, (0..50).sum::<i32>());
    }
}
