//! Raw block allocation handles for `SegmentedList`.
//!
//! A [`RawBlock`] owns one fixed-size allocation holding a contiguous run of
//! the logical sequence. It tracks element capacity but does not track element
//! count or handle initialization/destruction; that is the list's job.

use std::alloc::{self, Layout};
use std::ptr::NonNull;

/// A raw fixed-size buffer of `T` items.
///
/// Blocks come in two flavors:
/// - *pooled*: rented from a size-class bucket, sized to a power-of-two byte
///   class, returnable to the pool;
/// - *exact*: a plain heap allocation of exactly the requested item count,
///   used below the pooling threshold where bucket bookkeeping does not pay
///   for itself.
///
/// A block is never resized in place; growth replaces it wholesale.
pub(crate) struct RawBlock<T> {
    ptr: NonNull<T>,
    /// Usable item capacity. A power of two for pooled blocks.
    item_capacity: usize,
    /// Size of the underlying allocation in bytes. Zero for ZSTs.
    byte_size: usize,
    /// Alignment the allocation was made with.
    align: usize,
    /// Whether this block belongs to a size-class bucket.
    pooled: bool,
}

impl<T> RawBlock<T> {
    /// Creates a block backed by a fresh, exactly-sized allocation.
    ///
    /// # Panics
    ///
    /// Panics if the layout computation overflows; aborts via
    /// `handle_alloc_error` if the allocation fails.
    pub(crate) fn alloc_exact(items: usize) -> Self {
        if std::mem::size_of::<T>() == 0 || items == 0 {
            return Self::dangling(items);
        }

        let layout = Layout::array::<T>(items).expect("capacity overflow");
        let ptr = unsafe { alloc::alloc(layout) };
        let Some(ptr) = NonNull::new(ptr as *mut T) else {
            alloc::handle_alloc_error(layout);
        };

        Self {
            ptr,
            item_capacity: items,
            byte_size: layout.size(),
            align: layout.align(),
            pooled: false,
        }
    }

    /// Creates a block over an allocation owned by the size-class pool.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a live allocation of `byte_size` bytes with
    /// alignment `align`, and `item_capacity * size_of::<T>()` must not
    /// exceed `byte_size`.
    pub(crate) unsafe fn from_pooled(
        ptr: NonNull<u8>,
        byte_size: usize,
        align: usize,
        item_capacity: usize,
    ) -> Self {
        debug_assert!(item_capacity.is_power_of_two());
        debug_assert!(item_capacity * std::mem::size_of::<T>() <= byte_size);
        Self {
            ptr: ptr.cast(),
            item_capacity,
            byte_size,
            align,
            pooled: true,
        }
    }

    /// A zero-allocation block, used for ZSTs and zero-item requests.
    pub(crate) fn dangling(items: usize) -> Self {
        Self {
            ptr: NonNull::dangling(),
            item_capacity: items,
            byte_size: 0,
            align: std::mem::align_of::<T>(),
            pooled: false,
        }
    }

    #[inline]
    pub(crate) fn ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    #[inline]
    pub(crate) fn as_bytes_ptr(&self) -> NonNull<u8> {
        self.ptr.cast()
    }

    #[inline]
    pub(crate) fn item_capacity(&self) -> usize {
        self.item_capacity
    }

    #[inline]
    pub(crate) fn byte_size(&self) -> usize {
        self.byte_size
    }

    #[inline]
    pub(crate) fn align(&self) -> usize {
        self.align
    }

    #[inline]
    pub(crate) fn is_pooled(&self) -> bool {
        self.pooled
    }

    /// Frees the underlying allocation without returning it to the pool.
    ///
    /// All elements must have been dropped before calling this. `RawBlock`
    /// deliberately has no `Drop` impl: ownership moves between the list and
    /// the pool, and only one of them frees it.
    pub(crate) fn dealloc(self) {
        if self.byte_size == 0 {
            return;
        }
        // Layout reconstruction cannot fail: the allocation succeeded with
        // these exact parameters.
        let layout = Layout::from_size_align(self.byte_size, self.align).expect("invalid layout");
        unsafe {
            alloc::dealloc(self.ptr.as_ptr() as *mut u8, layout);
        }
    }
}

// Safety: RawBlock owns its allocation; T determines thread safety.
unsafe impl<T: Send> Send for RawBlock<T> {}
unsafe impl<T: Sync> Sync for RawBlock<T> {}
