//! A pooled segmented list for very large element counts.
//!
//! `SegmentedList` stores elements in a table of fixed-size, power-of-two
//! blocks instead of one contiguous buffer. Blocks are rented from a
//! process-wide size-classed recycling pool and returned to it when the list
//! shrinks or is dropped, so code that repeatedly builds and discards large
//! collections stops churning the system allocator.
//!
//! Logical indices decompose into a block and an offset with a shift and a
//! mask, so indexed access stays O(1) with no division. Growth rents new
//! blocks; existing elements are never moved.
//!
//! # Example
//!
//! ```
//! use recycled_list::SegmentedList;
//!
//! let mut list: SegmentedList<u64> = SegmentedList::new();
//! for i in 0..1000 {
//!     list.push(i);
//! }
//! assert_eq!(list.len(), 1000);
//! assert_eq!(list[999], 999);
//! assert_eq!(list.index_of(&500), Some(500));
//! ```
//!
//! # Concurrency
//!
//! A list is a single-writer structure: it is `Send`/`Sync` like `Vec`, but
//! concurrent mutation must be synchronized externally. The only internal
//! concurrency is [`SegmentedList::index_of`], which fans a large search out
//! over the rayon pool with early exit; see the method docs for its
//! duplicate-key semantics.

mod block;
mod extend;
mod iter;
pub mod pool;
pub mod pressure;
mod search;
pub mod sort;

pub use iter::Iter;
pub use sort::IndexedAccess;

use std::fmt;
use std::ops::{Index, IndexMut};
use std::ptr;

use block::RawBlock;

/// Default block size for lists constructed without an explicit one.
pub const DEFAULT_BLOCK_SIZE: usize = 128;

/// A growable sequence stored as fixed-size pooled blocks.
///
/// # Memory layout
///
/// All blocks have the same power-of-two length, fixed when the first block
/// is rented (the pool may hand back a larger buffer than requested, in
/// which case its power-of-two item capacity is adopted as the permanent
/// block size). For a logical index `i`:
///
/// ```text
/// block  = i >> block_shift
/// offset = i & (block_size - 1)
/// ```
///
/// Unlike `Vec`, growing never moves existing elements. Unlike a B-tree or
/// rope, there is no per-element overhead: a block is a plain buffer.
pub struct SegmentedList<T> {
    /// The block table. Every entry has at least `block_size` usable items.
    pub(crate) blocks: Vec<RawBlock<T>>,
    /// Items per block; always a power of two.
    pub(crate) block_size: usize,
    /// `log2(block_size)`.
    pub(crate) block_shift: u32,
    /// Number of initialized elements.
    pub(crate) len: usize,
    /// Write cursor: the next free slot is
    /// `blocks[next_block_index][next_item_index]`.
    pub(crate) next_block_index: usize,
    /// Always in `0..block_size`; rollover is normalized immediately.
    pub(crate) next_item_index: usize,
}

impl<T> SegmentedList<T> {
    /// Creates an empty list with the default block size.
    ///
    /// Does not allocate until elements are pushed.
    ///
    /// # Example
    ///
    /// ```
    /// use recycled_list::SegmentedList;
    /// let list: SegmentedList<i32> = SegmentedList::new();
    /// assert!(list.is_empty());
    /// ```
    #[inline]
    pub const fn new() -> Self {
        Self {
            blocks: Vec::new(),
            block_size: DEFAULT_BLOCK_SIZE,
            block_shift: DEFAULT_BLOCK_SIZE.trailing_zeros(),
            len: 0,
            next_block_index: 0,
            next_item_index: 0,
        }
    }

    /// Creates an empty list whose blocks hold at least `min_block_size`
    /// elements, rounded up to a power of two.
    pub fn with_block_size(min_block_size: usize) -> Self {
        let block_size = min_block_size
            .max(1)
            .checked_next_power_of_two()
            .expect("capacity overflow");
        Self {
            blocks: Vec::new(),
            block_size,
            block_shift: block_size.trailing_zeros(),
            len: 0,
            next_block_index: 0,
            next_item_index: 0,
        }
    }

    /// Creates a list pre-sized for `expected_items` elements.
    ///
    /// The expected capacity is reserved exactly, in whole blocks, rather
    /// than rounded up to a power of two: a list built for a known size
    /// should not over-commit.
    ///
    /// # Example
    ///
    /// ```
    /// use recycled_list::SegmentedList;
    /// let list: SegmentedList<i32> = SegmentedList::with_capacity(8, 20);
    /// assert_eq!(list.capacity(), 24);
    /// ```
    pub fn with_capacity(min_block_size: usize, expected_items: usize) -> Self {
        let mut list = Self::with_block_size(min_block_size);
        if expected_items > 0 {
            list.grow_to(expected_items);
        }
        list
    }

    /// Returns the number of elements in the list.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list contains no elements.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the current capacity in elements.
    ///
    /// Always a multiple of the block size.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.blocks.len() << self.block_shift
    }

    /// Returns the block size in elements. Fixed once the first block has
    /// been rented.
    #[inline]
    pub const fn block_size(&self) -> usize {
        self.block_size
    }

    #[inline]
    pub(crate) const fn block_shift(&self) -> u32 {
        self.block_shift
    }

    /// Decomposes a logical index into `(block, offset)`.
    #[inline]
    pub(crate) const fn location(&self, index: usize) -> (usize, usize) {
        (index >> self.block_shift, index & (self.block_size - 1))
    }

    /// Raw pointer to the slot for `index`.
    ///
    /// # Safety
    ///
    /// `index` must be within the allocated capacity.
    #[inline]
    pub(crate) unsafe fn item_ptr(&self, index: usize) -> *mut T {
        let (block, offset) = self.location(index);
        debug_assert!(block < self.blocks.len());
        self.blocks.get_unchecked(block).ptr().add(offset)
    }

    /// Number of initialized elements in block `block_index`.
    #[inline]
    pub(crate) fn block_len(&self, block_index: usize) -> usize {
        let full_blocks = self.len >> self.block_shift;
        if block_index < full_blocks {
            self.block_size
        } else if block_index == full_blocks {
            self.len & (self.block_size - 1)
        } else {
            0
        }
    }

    /// The initialized prefix of block `block_index` as a slice.
    #[inline]
    pub(crate) fn block_slice(&self, block_index: usize) -> &[T] {
        let len = self.block_len(block_index);
        // Safety: the first `len` slots of the block are initialized and the
        // borrow of self keeps them alive.
        unsafe { std::slice::from_raw_parts(self.blocks[block_index].ptr(), len) }
    }

    /// Recomputes the write cursor from `len`. Keeps the
    /// `next_item_index < block_size` invariant by construction.
    #[inline]
    pub(crate) fn sync_cursor(&mut self) {
        self.next_block_index = self.len >> self.block_shift;
        self.next_item_index = self.len & (self.block_size - 1);
    }

    /// Reserves capacity for at least `additional` more elements.
    ///
    /// The first reservation on an empty list is exact (in whole blocks);
    /// later reservations round the required capacity up to the next power
    /// of two.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow.
    pub fn reserve(&mut self, additional: usize) {
        let required = self
            .len
            .checked_add(additional)
            .expect("capacity overflow");
        self.ensure_capacity(required);
    }

    pub(crate) fn ensure_capacity(&mut self, required: usize) {
        if required <= self.capacity() {
            return;
        }
        let target = if self.capacity() == 0 {
            required
        } else {
            required
                .checked_next_power_of_two()
                .expect("capacity overflow")
        };
        self.grow_to(target);
    }

    /// Grows the block table until capacity is at least `target_capacity`,
    /// renting blocks from the pool.
    pub(crate) fn grow_to(&mut self, target_capacity: usize) {
        let mut needed_blocks = self.blocks_for(target_capacity);
        if needed_blocks <= self.blocks.len() {
            return;
        }

        if self.blocks.is_empty() {
            // The pool may return a larger buffer than asked for; its
            // power-of-two item capacity then becomes the block size for the
            // rest of this list's lifetime. Only possible here, before any
            // index has been decomposed.
            let first = pool::rent::<T>(self.block_size);
            let adopted = first.item_capacity();
            debug_assert!(adopted.is_power_of_two() && adopted >= self.block_size);
            if adopted != self.block_size {
                self.block_size = adopted;
                self.block_shift = adopted.trailing_zeros();
                needed_blocks = self.blocks_for(target_capacity);
            }
            self.blocks.reserve(needed_blocks);
            self.blocks.push(first);
        }

        while self.blocks.len() < needed_blocks {
            self.blocks.push(pool::rent::<T>(self.block_size));
        }
    }

    #[inline]
    fn blocks_for(&self, capacity: usize) -> usize {
        capacity
            .checked_add(self.block_size - 1)
            .expect("capacity overflow")
            >> self.block_shift
    }

    /// Appends an element to the back of the list. Amortized O(1).
    ///
    /// # Example
    ///
    /// ```
    /// use recycled_list::SegmentedList;
    /// let mut list = SegmentedList::new();
    /// list.push(1);
    /// list.push(2);
    /// assert_eq!(list.len(), 2);
    /// ```
    #[inline]
    pub fn push(&mut self, value: T) {
        if self.len == self.capacity() {
            self.grow_for_push();
        }
        unsafe {
            let block = self.blocks.get_unchecked(self.next_block_index);
            ptr::write(block.ptr().add(self.next_item_index), value);
        }
        self.len += 1;
        self.next_item_index += 1;
        if self.next_item_index == self.block_size {
            self.next_item_index = 0;
            self.next_block_index += 1;
        }
    }

    #[cold]
    #[inline(never)]
    fn grow_for_push(&mut self) {
        let required = self.len.checked_add(1).expect("capacity overflow");
        self.ensure_capacity(required);
        // Block size may have been adopted on the very first growth.
        self.sync_cursor();
    }

    /// Removes the last element and returns it, or `None` if empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        let value = unsafe { ptr::read(self.item_ptr(self.len)) };
        self.sync_cursor();
        Some(value)
    }

    /// Returns a reference to the element at `index`, or `None` if out of
    /// bounds.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index < self.len {
            Some(unsafe { &*self.item_ptr(index) })
        } else {
            None
        }
    }

    /// Returns a mutable reference to the element at `index`, or `None` if
    /// out of bounds.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index < self.len {
            Some(unsafe { &mut *self.item_ptr(index) })
        } else {
            None
        }
    }

    /// Returns a reference to the first element, or `None` if empty.
    #[inline]
    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    /// Returns a reference to the last element, or `None` if empty.
    #[inline]
    pub fn last(&self) -> Option<&T> {
        self.len.checked_sub(1).and_then(|i| self.get(i))
    }

    /// Swaps the elements at `a` and `b`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn swap(&mut self, a: usize, b: usize) {
        assert!(
            a < self.len && b < self.len,
            "swap indices (are {a}, {b}) should be < len (is {len})",
            len = self.len
        );
        unsafe {
            // ptr::swap permits overlapping (here: identical) pointers.
            ptr::swap(self.item_ptr(a), self.item_ptr(b));
        }
    }

    /// Returns the index of an occurrence of `item`, or `None`.
    ///
    /// Small lists are scanned sequentially and return the leftmost match.
    /// Lists of at least `PARALLEL_SEARCH_MIN` (65,536) elements are
    /// searched by parallel workers with early exit; when `item` occurs more
    /// than once, whichever worker finds a match first wins, so the returned
    /// index is one matching occurrence but not necessarily the leftmost.
    /// This trade is deliberate: forcing leftmost semantics would make every
    /// partition run to completion. For guaranteed leftmost results, or for
    /// element types that are not `Sync`, use
    /// [`SegmentedList::sequential_index_of`].
    pub fn index_of(&self, item: &T) -> Option<usize>
    where
        T: PartialEq + Sync,
    {
        if self.len == 0 {
            return None;
        }
        if self.len <= self.block_size {
            return self.block_slice(0).iter().position(|x| x == item);
        }
        if self.len >= search::PARALLEL_SEARCH_MIN {
            return search::parallel_index_of(self, item);
        }
        self.sequential_index_of(item)
    }

    /// Returns the index of the leftmost occurrence of `item`, or `None`.
    ///
    /// Always scans sequentially, whatever the list size, so it needs only
    /// `T: PartialEq` and keeps strict leftmost semantics. Use this for
    /// element types that are not `Sync`, or when a deterministic index
    /// matters more than the parallel speedup of
    /// [`SegmentedList::index_of`].
    pub fn sequential_index_of(&self, item: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        let mut base = 0;
        let mut block_index = 0;
        while base < self.len {
            let slice = self.block_slice(block_index);
            if let Some(position) = slice.iter().position(|x| x == item) {
                return Some(base + position);
            }
            base += slice.len();
            block_index += 1;
        }
        None
    }

    /// Returns `true` if the list contains `item`.
    ///
    /// Uses the same search strategy as [`SegmentedList::index_of`].
    #[inline]
    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq + Sync,
    {
        self.index_of(item).is_some()
    }

    /// Removes the first found occurrence of `item`, returning `true` if one
    /// was found.
    pub fn remove(&mut self, item: &T) -> bool
    where
        T: PartialEq + Sync,
    {
        match self.index_of(item) {
            Some(index) => {
                self.remove_at(index);
                true
            }
            None => false,
        }
    }

    /// Removes and returns the element at `index`, shifting everything after
    /// it left by one position. O(n) in the number of trailing elements.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove_at(&mut self, index: usize) -> T {
        assert!(
            index < self.len,
            "removal index (is {index}) should be < len (is {len})",
            len = self.len
        );

        unsafe {
            let removed = ptr::read(self.item_ptr(index));

            let last = self.len - 1;
            let (last_block, last_offset) = self.location(last);
            let (mut block, mut offset) = self.location(index);

            // Shift whole blocks left by one slot, pulling the head of each
            // following block into the freed tail slot.
            while block < last_block {
                let base = self.blocks.get_unchecked(block).ptr();
                ptr::copy(
                    base.add(offset + 1),
                    base.add(offset),
                    self.block_size - offset - 1,
                );
                let next_base = self.blocks.get_unchecked(block + 1).ptr();
                ptr::copy_nonoverlapping(next_base, base.add(self.block_size - 1), 1);
                block += 1;
                offset = 0;
            }

            let base = self.blocks.get_unchecked(block).ptr();
            ptr::copy(base.add(offset + 1), base.add(offset), last_offset - offset);

            // The old last slot is uninitialized from here on; the cursor
            // rolls backward into the previous block when it sat at offset 0.
            self.len -= 1;
            self.sync_cursor();
            removed
        }
    }

    /// Inserting before an arbitrary position is not supported.
    ///
    /// The segmented layout has an append-only write cursor; a mid-sequence
    /// insert would degrade to an O(n) rebuild, which this type refuses to
    /// hide behind a list-like method.
    ///
    /// # Panics
    ///
    /// Always panics.
    pub fn insert(&mut self, _index: usize, _element: T) {
        panic!("insert is not supported: SegmentedList only appends");
    }

    /// Shortens the list to `len` elements, dropping the rest. Keeps all
    /// rented blocks.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        let old_len = self.len;
        // State first, so a panicking Drop cannot cause a double drop.
        self.len = len;
        self.sync_cursor();
        unsafe { self.drop_range(len, old_len) };
    }

    /// Clears the list, removing all elements.
    ///
    /// When the block size is at or above the pooling threshold the blocks
    /// and the table go back to the pool for other lists to reuse;
    /// otherwise the blocks are kept for this list.
    pub fn clear(&mut self) {
        let old_len = self.len;
        self.len = 0;
        self.next_block_index = 0;
        self.next_item_index = 0;
        unsafe { self.drop_range(0, old_len) };

        if self.block_size >= pool::MIN_POOLED_ITEMS && !self.blocks.is_empty() {
            for block in std::mem::take(&mut self.blocks) {
                pool::recycle(block);
            }
        }
    }

    /// Returns excess tail blocks to the pool, keeping just enough capacity
    /// for the current length. Existing elements are never moved.
    pub fn shrink_to_fit(&mut self) {
        let needed = self.blocks_for(self.len);
        if needed < self.blocks.len() {
            for block in self.blocks.drain(needed..) {
                pool::recycle(block);
            }
        }
    }

    /// Returns a forward iterator over the list.
    ///
    /// A fresh iterator always starts at logical index 0. Iterators borrow
    /// the list, so iterating across mutation is rejected at compile time.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Drops the elements in `[from, to)`.
    ///
    /// # Safety
    ///
    /// The range must be initialized and must already be excluded from
    /// `self.len`.
    unsafe fn drop_range(&mut self, from: usize, to: usize) {
        if !std::mem::needs_drop::<T>() {
            return;
        }
        let mut index = from;
        while index < to {
            let (block, offset) = self.location(index);
            let count = (self.block_size - offset).min(to - index);
            let base = self.blocks.get_unchecked(block).ptr().add(offset);
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base, count));
            index += count;
        }
    }
}

impl<T> Drop for SegmentedList<T> {
    fn drop(&mut self) {
        let old_len = self.len;
        self.len = 0;
        unsafe { self.drop_range(0, old_len) };
        for block in self.blocks.drain(..) {
            pool::recycle(block);
        }
    }
}

impl<T> Default for SegmentedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for SegmentedList<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(value) => value,
            None => panic!(
                "index out of bounds: the len is {len} but the index is {index}",
                len = self.len
            ),
        }
    }
}

impl<T> IndexMut<usize> for SegmentedList<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len;
        match self.get_mut(index) {
            Some(value) => value,
            None => panic!("index out of bounds: the len is {len} but the index is {index}"),
        }
    }
}

impl<T: Clone> Clone for SegmentedList<T> {
    fn clone(&self) -> Self {
        let mut out = Self::with_block_size(self.block_size);
        out.push_list(self);
        out
    }
}

impl<T: fmt::Debug> fmt::Debug for SegmentedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for SegmentedList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: Eq> Eq for SegmentedList<T> {}

// Safety: the list owns its blocks; T determines thread safety, as for Vec.
unsafe impl<T: Send> Send for SegmentedList<T> {}
unsafe impl<T: Sync> Sync for SegmentedList<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_empty() {
        let list: SegmentedList<i32> = SegmentedList::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert_eq!(list.capacity(), 0);
    }

    #[test]
    fn test_push_get() {
        let mut list: SegmentedList<i32> = SegmentedList::new();
        list.push(10);
        list.push(20);
        list.push(30);
        assert_eq!(list.get(0), Some(&10));
        assert_eq!(list.get(1), Some(&20));
        assert_eq!(list.get(2), Some(&30));
        assert_eq!(list.get(3), None);
        assert_eq!(list[1], 20);
    }

    #[test]
    fn test_push_across_blocks() {
        let mut list: SegmentedList<usize> = SegmentedList::with_block_size(8);
        for i in 0..100 {
            list.push(i);
        }
        assert_eq!(list.len(), 100);
        for i in 0..100 {
            assert_eq!(list[i], i);
        }
    }

    #[test]
    fn test_pop() {
        let mut list: SegmentedList<i32> = SegmentedList::with_block_size(4);
        for i in 0..10 {
            list.push(i);
        }
        for i in (0..10).rev() {
            assert_eq!(list.pop(), Some(i));
        }
        assert_eq!(list.pop(), None);
    }

    #[test]
    fn test_capacity_is_block_multiple() {
        let mut list: SegmentedList<u8> = SegmentedList::with_block_size(8);
        list.reserve(20);
        assert!(list.capacity() >= 20);
        assert_eq!(list.capacity() % list.block_size(), 0);
    }

    #[test]
    fn test_first_allocation_exact_then_power_of_two() {
        let mut list: SegmentedList<u8> = SegmentedList::with_block_size(8);
        list.reserve(20);
        assert_eq!(list.capacity(), 24);
        // A later grow rounds the requirement up to a power of two.
        for i in 0..25u8 {
            list.push(i);
        }
        assert_eq!(list.capacity(), 32);
    }

    #[test]
    fn test_block_layout_scenario() {
        // block_size 8, push 0..20: len 20, capacity 24, third block holds
        // 16..=19 at offsets 0..=3.
        let mut list: SegmentedList<i32> = SegmentedList::with_block_size(8);
        list.extend(0..20);
        assert_eq!(list.len(), 20);
        assert_eq!(list.capacity(), 24);
        assert_eq!(list.block_size(), 8);
        assert_eq!(list.block_slice(2), &[16, 17, 18, 19]);

        assert_eq!(list.remove_at(5), 5);
        assert_eq!(list[5], 6);
        assert_eq!(list.len(), 19);
    }

    #[test]
    fn test_index_decomposition_law() {
        let mut list: SegmentedList<usize> = SegmentedList::with_block_size(16);
        for i in 0..1000 {
            list.push(i);
        }
        let mask = list.block_size() - 1;
        for i in 0..1000 {
            let (block, offset) = (i >> list.block_shift(), i & mask);
            assert_eq!(list.block_slice(block)[offset], i);
        }
    }

    #[test]
    fn test_remove_at_shifts_across_blocks() {
        let mut list: SegmentedList<usize> = SegmentedList::with_block_size(4);
        for i in 0..20 {
            list.push(i);
        }
        let expected: Vec<usize> = (0..20).filter(|&i| i != 2).collect();
        assert_eq!(list.remove_at(2), 2);
        assert_eq!(list.len(), 19);
        for (i, want) in expected.iter().enumerate() {
            assert_eq!(list[i], *want);
        }
    }

    #[test]
    fn test_remove_at_last() {
        let mut list: SegmentedList<i32> = SegmentedList::with_block_size(4);
        list.extend(0..5);
        assert_eq!(list.remove_at(4), 4);
        assert_eq!(list.len(), 4);
        assert_eq!(list.last(), Some(&3));
    }

    #[test]
    #[should_panic(expected = "removal index")]
    fn test_remove_at_out_of_bounds() {
        let mut list: SegmentedList<i32> = SegmentedList::new();
        list.push(1);
        list.remove_at(1);
    }

    #[test]
    #[should_panic(expected = "not supported")]
    fn test_insert_unsupported() {
        let mut list: SegmentedList<i32> = SegmentedList::new();
        list.insert(0, 1);
    }

    #[test]
    fn test_sequential_index_of_without_sync() {
        use std::rc::Rc;
        // Rc is not Sync; the sequential path must still be available.
        let mut list: SegmentedList<Rc<i32>> = SegmentedList::with_block_size(4);
        for i in 0..20 {
            list.push(Rc::new(i));
        }
        list.push(Rc::new(7));
        assert_eq!(list.sequential_index_of(&Rc::new(7)), Some(7));
        assert_eq!(list.sequential_index_of(&Rc::new(99)), None);
    }

    #[test]
    fn test_remove_by_value() {
        let mut list: SegmentedList<i32> = SegmentedList::with_block_size(4);
        list.extend([5, 6, 7, 6]);
        assert!(list.remove(&6));
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), [5, 7, 6]);
        assert!(!list.remove(&42));
    }

    #[test]
    fn test_clear_returns_pooled_blocks() {
        let mut list: SegmentedList<u64> = SegmentedList::with_block_size(64);
        list.extend(0..1000);
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.capacity(), 0);
        list.push(1);
        assert_eq!(list[0], 1);
    }

    #[test]
    fn test_clear_keeps_small_blocks() {
        let mut list: SegmentedList<u64> = SegmentedList::with_block_size(4);
        list.extend(0..10);
        let capacity = list.capacity();
        list.clear();
        assert_eq!(list.capacity(), capacity);
    }

    #[test]
    fn test_truncate_and_shrink() {
        let mut list: SegmentedList<String> = SegmentedList::with_block_size(4);
        list.extend((0..20).map(|i| i.to_string()));
        list.truncate(5);
        assert_eq!(list.len(), 5);
        assert_eq!(list[4], "4");
        list.shrink_to_fit();
        assert_eq!(list.capacity(), 8);
    }

    #[test]
    fn test_drops_contents() {
        use std::rc::Rc;
        let probe = Rc::new(());
        {
            let mut list: SegmentedList<Rc<()>> = SegmentedList::with_block_size(4);
            for _ in 0..50 {
                list.push(Rc::clone(&probe));
            }
            list.remove_at(10);
            list.truncate(30);
            assert_eq!(Rc::strong_count(&probe), 31);
        }
        assert_eq!(Rc::strong_count(&probe), 1);
    }

    #[test]
    fn test_swap() {
        let mut list: SegmentedList<i32> = SegmentedList::with_block_size(4);
        list.extend(0..10);
        list.swap(0, 9);
        assert_eq!(list[0], 9);
        assert_eq!(list[9], 0);
        list.swap(3, 3);
        assert_eq!(list[3], 3);
    }

    #[test]
    fn test_clone_eq_debug() {
        let mut list: SegmentedList<i32> = SegmentedList::with_block_size(4);
        list.extend(0..10);
        let copy = list.clone();
        assert_eq!(list, copy);
        assert_eq!(
            format!("{:?}", copy),
            format!("{:?}", (0..10).collect::<Vec<_>>())
        );
    }

    #[test]
    fn test_zero_sized_elements() {
        let mut list: SegmentedList<()> = SegmentedList::new();
        for _ in 0..1000 {
            list.push(());
        }
        assert_eq!(list.len(), 1000);
        assert_eq!(list.get(999), Some(&()));
        list.remove_at(0);
        assert_eq!(list.len(), 999);
    }

    #[test]
    fn test_large_list_round_trip() {
        let mut list: SegmentedList<u64> = SegmentedList::new();
        list.extend(0..100_000u64);
        assert_eq!(list.len(), 100_000);
        assert!(list.iter().copied().eq(0..100_000u64));
    }
}
