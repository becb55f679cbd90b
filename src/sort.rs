//! Sorting over any indexable sequence, including non-contiguous ones.
//!
//! An iterative quicksort (explicit range stack, no recursion) with
//! insertion-sort fallback for small ranges and randomized median-of-three
//! pivot selection. Works through the [`IndexedAccess`] trait so it is not
//! coupled to `SegmentedList`'s storage.

use std::cmp::Ordering;

use crate::SegmentedList;

/// Ranges at or below this length are insertion-sorted.
const INSERTION_SORT_THRESHOLD: usize = 31;

/// Index-based access to a sequence, the only capability sorting needs.
pub trait IndexedAccess<T> {
    /// Number of elements in the sequence.
    fn length(&self) -> usize;

    /// A reference to the element at `index`.
    fn get_ref(&self, index: usize) -> &T;

    /// Swaps the elements at `a` and `b`.
    fn swap(&mut self, a: usize, b: usize);
}

impl<T> IndexedAccess<T> for SegmentedList<T> {
    #[inline]
    fn length(&self) -> usize {
        self.len()
    }

    #[inline]
    fn get_ref(&self, index: usize) -> &T {
        debug_assert!(index < self.len());
        unsafe { &*self.item_ptr(index) }
    }

    #[inline]
    fn swap(&mut self, a: usize, b: usize) {
        SegmentedList::swap(self, a, b);
    }
}

impl<T> IndexedAccess<T> for [T] {
    #[inline]
    fn length(&self) -> usize {
        self.len()
    }

    #[inline]
    fn get_ref(&self, index: usize) -> &T {
        &self[index]
    }

    #[inline]
    fn swap(&mut self, a: usize, b: usize) {
        (*self).swap(a, b);
    }
}

/// Sorts `v[start..end]` with insertion sort.
pub fn insertion_sort<T, F>(v: &mut (impl IndexedAccess<T> + ?Sized), start: usize, end: usize, is_less: &mut F)
where
    F: FnMut(&T, &T) -> bool,
{
    for i in (start + 1)..end {
        let mut j = i;
        while j > start && is_less(v.get_ref(j), v.get_ref(j - 1)) {
            v.swap(j, j - 1);
            j -= 1;
        }
    }
}

/// Small xorshift generator for pivot sampling; no global RNG state.
struct XorShift(u64);

impl XorShift {
    fn new(seed: u64) -> Self {
        // Must be nonzero or the sequence collapses.
        Self(seed | 1)
    }

    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn below(&mut self, bound: usize) -> usize {
        (self.next() % bound as u64) as usize
    }
}

/// Sorts `v[start..end]` by `is_less`.
///
/// Iterative quicksort: subranges to sort are kept on an explicit stack, the
/// larger side pushed first so the stack stays logarithmic. Small ranges
/// fall through to insertion sort; pivots are the median of three randomly
/// sampled elements.
pub fn quicksort<T, F>(v: &mut (impl IndexedAccess<T> + ?Sized), start: usize, end: usize, is_less: &mut F)
where
    F: FnMut(&T, &T) -> bool,
{
    if end - start < 2 {
        return;
    }

    let mut rng = XorShift::new((end - start) as u64 ^ 0x9E37_79B9_7F4A_7C15);
    let mut stack: Vec<(usize, usize)> = Vec::with_capacity(64);
    stack.push((start, end));

    while let Some((lo, hi)) = stack.pop() {
        let len = hi - lo;
        if len <= INSERTION_SORT_THRESHOLD {
            insertion_sort(v, lo, hi, is_less);
            continue;
        }

        let pivot = median_of_three(v, lo, len, &mut rng, is_less);
        let mid = partition(v, lo, hi, pivot, is_less);

        // Larger side first; the smaller is processed next iteration.
        let left = (lo, mid);
        let right = (mid + 1, hi);
        if mid - lo >= hi - mid {
            stack.push(left);
            stack.push(right);
        } else {
            stack.push(right);
            stack.push(left);
        }
    }
}

/// Picks the median of three randomly sampled indices in `[lo, lo + len)`.
fn median_of_three<T, F>(
    v: &(impl IndexedAccess<T> + ?Sized),
    lo: usize,
    len: usize,
    rng: &mut XorShift,
    is_less: &mut F,
) -> usize
where
    F: FnMut(&T, &T) -> bool,
{
    let a = lo + rng.below(len);
    let b = lo + rng.below(len);
    let c = lo + rng.below(len);

    let (a, b) = if is_less(v.get_ref(b), v.get_ref(a)) {
        (b, a)
    } else {
        (a, b)
    };
    if is_less(v.get_ref(c), v.get_ref(a)) {
        a
    } else if is_less(v.get_ref(b), v.get_ref(c)) {
        b
    } else {
        c
    }
}

/// Lomuto partition around the element at `pivot`; returns its final index.
fn partition<T, F>(
    v: &mut (impl IndexedAccess<T> + ?Sized),
    lo: usize,
    hi: usize,
    pivot: usize,
    is_less: &mut F,
) -> usize
where
    F: FnMut(&T, &T) -> bool,
{
    v.swap(pivot, hi - 1);
    let mut store = lo;
    for i in lo..hi - 1 {
        if is_less(v.get_ref(i), v.get_ref(hi - 1)) {
            v.swap(i, store);
            store += 1;
        }
    }
    v.swap(store, hi - 1);
    store
}

impl<T> SegmentedList<T> {
    /// Sorts the list in ascending order. Unstable.
    pub fn sort(&mut self)
    where
        T: Ord,
    {
        self.sort_by(T::cmp);
    }

    /// Sorts the list by a comparator. Unstable.
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let len = self.len();
        quicksort(self, 0, len, &mut |a, b| compare(a, b) == Ordering::Less);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_small() {
        let mut list: SegmentedList<i32> = SegmentedList::with_block_size(4);
        list.extend([5, 3, 1, 4, 2]);
        list.sort();
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), [1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_sort_across_blocks() {
        let mut list: SegmentedList<i64> = SegmentedList::with_block_size(8);
        list.extend((0..1000).map(|i| (i * 7919) % 1000));
        list.sort();
        let sorted: Vec<i64> = list.iter().copied().collect();
        let mut expected = sorted.clone();
        expected.sort();
        assert_eq!(sorted, expected);
        assert!(sorted.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_sort_by_descending() {
        let mut list: SegmentedList<u32> = SegmentedList::with_block_size(4);
        list.extend([1, 5, 2, 4, 3]);
        list.sort_by(|a, b| b.cmp(a));
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), [5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_sort_already_sorted_and_reversed() {
        let mut list: SegmentedList<usize> = SegmentedList::with_block_size(16);
        list.extend(0..500);
        list.sort();
        assert!(list.iter().copied().eq(0..500));

        let mut list: SegmentedList<usize> = SegmentedList::with_block_size(16);
        list.extend((0..500).rev());
        list.sort();
        assert!(list.iter().copied().eq(0..500));
    }

    #[test]
    fn test_sort_duplicates() {
        let mut list: SegmentedList<u8> = SegmentedList::with_block_size(8);
        list.extend([3, 1, 3, 1, 3, 1, 2, 2, 2, 3].repeat(20));
        list.sort();
        let sorted: Vec<u8> = list.iter().copied().collect();
        assert!(sorted.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(sorted.iter().filter(|&&x| x == 3).count(), 80);
    }

    #[test]
    fn test_quicksort_on_slices() {
        let mut data = [9i32, -3, 7, 0, 7, 2];
        let len = data.len();
        quicksort(&mut data[..], 0, len, &mut |a, b| a < b);
        assert_eq!(data, [-3, 0, 2, 7, 7, 9]);
    }

    #[test]
    fn test_empty_and_single() {
        let mut list: SegmentedList<i32> = SegmentedList::new();
        list.sort();
        list.push(1);
        list.sort();
        assert_eq!(list[0], 1);
    }
}
