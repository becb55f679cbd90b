//! Process-wide size-classed recycling pool for blocks.
//!
//! Freed block allocations are kept on per-size-class free lists and handed
//! back out on the next rent of the same class, so lists that repeatedly grow
//! and shrink stop hitting the system allocator. Each class is a singly
//! linked stack threaded through the freed buffers themselves; push/pop is
//! guarded by a short spinlock. A background monitor (see [`crate::pressure`])
//! trims cached buffers when process memory usage runs high.
//!
//! Buffers below [`MIN_POOLED_ITEMS`] items never touch the pool: for small
//! blocks the bookkeeping costs more than the allocation it saves.

use std::alloc::{self, Layout};
use std::cell::UnsafeCell;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::OnceLock;

use crossbeam_utils::Backoff;

use crate::block::RawBlock;

/// Power-of-two byte size classes: 2^0 through 2^31.
const SIZE_CLASSES: usize = 32;

/// Supported allocation alignments: 2^0 through 2^12 (4096).
const ALIGN_SHELVES: usize = 13;

/// Minimum item count for a block to be drawn from the pool.
pub const MIN_POOLED_ITEMS: usize = 32;

/// Largest byte class the pool will cache.
const MAX_CLASS_BYTES: usize = 1 << (SIZE_CLASSES - 1);

/// Default cap on buffers retained per bucket.
const DEFAULT_MAX_RETAINED: usize = 64;

static MAX_RETAINED_PER_BUCKET: AtomicUsize = AtomicUsize::new(DEFAULT_MAX_RETAINED);

/// Sets the maximum number of buffers each size-class bucket may retain.
///
/// A return to a full bucket frees the buffer outright instead of caching
/// it.
pub fn set_max_retained_per_bucket(max: usize) {
    MAX_RETAINED_PER_BUCKET.store(max, Ordering::Relaxed);
}

/// One free list of recycled allocations, all sharing a byte size class and
/// an alignment.
///
/// The list is intrusive: the first word of each freed buffer stores the
/// pointer to the next one. Pooled buffers are always at least
/// `MIN_POOLED_ITEMS` bytes and aligned for a pointer, so the word is always
/// writable.
struct Bucket {
    locked: AtomicBool,
    head: UnsafeCell<*mut u8>,
    count: AtomicUsize,
}

// Safety: `head` is only touched while `locked` is held.
unsafe impl Send for Bucket {}
unsafe impl Sync for Bucket {}

impl Bucket {
    fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
            head: UnsafeCell::new(std::ptr::null_mut()),
            count: AtomicUsize::new(0),
        }
    }

    /// Spin-acquires the bucket lock. Held only across a few pointer writes.
    fn lock(&self) {
        let backoff = Backoff::new();
        while self
            .locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            backoff.snooze();
        }
    }

    fn unlock(&self) {
        self.locked.store(false, Ordering::Release);
    }

    /// Pops one cached buffer, or `None` if the bucket is empty.
    fn pop(&self) -> Option<NonNull<u8>> {
        self.lock();
        let head = unsafe { *self.head.get() };
        let result = NonNull::new(head);
        if let Some(ptr) = result {
            // The freed buffer's first word holds the next entry.
            let next = unsafe { *(ptr.as_ptr() as *const *mut u8) };
            unsafe { *self.head.get() = next };
            self.count.fetch_sub(1, Ordering::Relaxed);
        }
        self.unlock();
        result
    }

    /// Pushes a buffer onto the free list.
    ///
    /// The buffer must be at least one pointer large and pointer-aligned,
    /// and must not already be on any free list.
    unsafe fn push(&self, ptr: NonNull<u8>) {
        self.lock();
        let head = *self.head.get();
        *(ptr.as_ptr() as *mut *mut u8) = head;
        *self.head.get() = ptr.as_ptr();
        self.count.fetch_add(1, Ordering::Relaxed);
        self.unlock();
    }

    fn len(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }
}

type Shelves = Box<[[Bucket; SIZE_CLASSES]; ALIGN_SHELVES]>;

fn shelves() -> &'static Shelves {
    static SHELVES: OnceLock<Shelves> = OnceLock::new();
    SHELVES.get_or_init(|| {
        Box::new(std::array::from_fn(|_| std::array::from_fn(|_| Bucket::new())))
    })
}

/// Effective allocation alignment for pooled buffers of `T`.
///
/// At least pointer-aligned so the intrusive next link can be stored in the
/// buffer while it sits on a free list.
fn pooled_align<T>() -> usize {
    std::mem::align_of::<T>().max(std::mem::align_of::<*mut u8>())
}

fn largest_pow2_at_most(n: usize) -> usize {
    debug_assert!(n > 0);
    1 << n.ilog2()
}

/// Rents a block of at least `min_items` items.
///
/// Below the pooling threshold the block is a fresh allocation of exactly
/// `min_items`. At or above it, the byte size rounds up to the power-of-two
/// class and the block's usable item capacity is the largest power of two
/// the class holds, which may exceed the request.
///
/// # Panics
///
/// Panics on arithmetic overflow of the size computation.
pub(crate) fn rent<T>(min_items: usize) -> RawBlock<T> {
    let item_size = std::mem::size_of::<T>();
    if item_size == 0 {
        return RawBlock::dangling(min_items);
    }
    let align = pooled_align::<T>();
    if min_items < MIN_POOLED_ITEMS || align > (1 << (ALIGN_SHELVES - 1)) {
        return RawBlock::alloc_exact(min_items);
    }

    let wanted_items = min_items
        .checked_next_power_of_two()
        .expect("capacity overflow");
    let wanted_bytes = wanted_items
        .checked_mul(item_size)
        .expect("capacity overflow");
    if wanted_bytes > MAX_CLASS_BYTES {
        return RawBlock::alloc_exact(min_items);
    }

    #[cfg(not(test))]
    crate::pressure::ensure_monitor_started();

    let class_bytes = wanted_bytes.next_power_of_two();
    let class = class_bytes.trailing_zeros() as usize;
    let shelf = align.trailing_zeros() as usize;
    let bucket = &shelves()[shelf][class];

    let ptr = bucket.pop().unwrap_or_else(|| alloc_raw(class_bytes, align));
    let item_capacity = largest_pow2_at_most(class_bytes / item_size);
    debug_assert!(item_capacity >= wanted_items);

    // Safety: the allocation is class_bytes long with the shelf's alignment,
    // and item_capacity * item_size <= class_bytes.
    unsafe { RawBlock::from_pooled(ptr, class_bytes, align, item_capacity) }
}

/// Returns a block to the pool.
///
/// The caller must already have dropped every initialized element; the pool
/// treats the memory as raw bytes from here on. Returning the same block
/// twice without an intervening rent corrupts the free list and is a caller
/// bug the pool does not detect.
pub(crate) fn recycle<T>(block: RawBlock<T>) {
    if !block.is_pooled() {
        block.dealloc();
        return;
    }

    // While memory pressure is high, stop caching and let returns fall
    // through to the system allocator.
    if crate::pressure::under_pressure() {
        block.dealloc();
        return;
    }

    let class = block.byte_size().trailing_zeros() as usize;
    let shelf = block.align().trailing_zeros() as usize;
    let bucket = &shelves()[shelf][class];

    if bucket.len() >= MAX_RETAINED_PER_BUCKET.load(Ordering::Relaxed) {
        block.dealloc();
        return;
    }

    let ptr = block.as_bytes_ptr();
    std::mem::forget(block);
    // Safety: pooled buffers are >= MIN_POOLED_ITEMS bytes, pointer-aligned,
    // and ownership was just transferred to the bucket.
    unsafe { bucket.push(ptr) };
}

fn alloc_raw(bytes: usize, align: usize) -> NonNull<u8> {
    // Both are powers of two, so this layout is always valid.
    let layout = Layout::from_size_align(bytes, align).expect("invalid layout");
    let ptr = unsafe { alloc::alloc(layout) };
    match NonNull::new(ptr) {
        Some(ptr) => ptr,
        None => alloc::handle_alloc_error(layout),
    }
}

/// Frees up to `per_bucket` cached buffers from every bucket.
///
/// Called by the memory-pressure monitor; also usable directly to release
/// cached memory eagerly. Returns the number of bytes freed.
pub fn trim(per_bucket: usize) -> usize {
    let mut freed = 0usize;
    for (shelf, classes) in shelves().iter().enumerate() {
        for (class, bucket) in classes.iter().enumerate() {
            for _ in 0..per_bucket {
                let Some(ptr) = bucket.pop() else { break };
                let layout = Layout::from_size_align(1 << class, 1 << shelf)
                    .expect("invalid layout");
                unsafe { alloc::dealloc(ptr.as_ptr(), layout) };
                freed += 1 << class;
            }
        }
    }
    if freed > 0 {
        log::debug!("pool trim freed {freed} bytes");
    }
    freed
}

/// Snapshot of pool contents, for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Number of buffers currently cached across all buckets.
    pub cached_buffers: usize,
    /// Total bytes held by cached buffers.
    pub cached_bytes: usize,
}

/// Returns a snapshot of the pool's cached contents.
///
/// Counts are approximate under concurrent rents and returns.
pub fn stats() -> PoolStats {
    let mut stats = PoolStats::default();
    for classes in shelves().iter() {
        for (class, bucket) in classes.iter().enumerate() {
            let n = bucket.len();
            stats.cached_buffers += n;
            stats.cached_bytes += n << class;
        }
    }
    stats
}

/// Serializes tests that assert on shared pool state; `trim` and the
/// pressure flag are process-global.
#[cfg(test)]
pub(crate) static TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
