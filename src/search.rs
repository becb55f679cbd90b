//! Early-exit parallel search over a `SegmentedList`.
//!
//! A large search is partitioned into a geometric sequence of ranges, each
//! dispatched to a rayon worker against a shared context. Workers scan block
//! by block and re-check the shared found flag after every sub-scan, so the
//! whole fleet stands down quickly once any worker hits. The initiating
//! thread blocks until every worker has finished; a worker panic (from a
//! user `PartialEq`, say) is re-raised there only after the join.
//!
//! Contexts and range buffers are pooled so the hot search path does not
//! allocate.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;

use crate::SegmentedList;

/// Minimum list length for `index_of` to go parallel.
pub(crate) const PARALLEL_SEARCH_MIN: usize = 64 * 1024;

/// Fraction of the remaining elements carved off per partition. Tuned to
/// balance dispatch overhead against early-exit savings; not
/// correctness-relevant.
const CHUNK_FRACTION: f64 = 0.329;

/// One search partition: a span of logical elements described in block
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ItemRange {
    pub(crate) block_index: usize,
    pub(crate) first_item_index: usize,
    pub(crate) items_to_search: usize,
}

/// Shared state for one parallel search invocation.
pub(crate) struct SearchContext {
    /// Set by the first worker to find a match; checked by every worker
    /// after each sub-scan.
    found: AtomicBool,
    /// Absolute logical index of the match; valid once `found` is set.
    found_index: AtomicI64,
}

impl SearchContext {
    fn new() -> Self {
        Self {
            found: AtomicBool::new(false),
            found_index: AtomicI64::new(-1),
        }
    }

    fn reset(&self) {
        self.found.store(false, Ordering::Relaxed);
        self.found_index.store(-1, Ordering::Relaxed);
    }

    #[inline]
    fn is_found(&self) -> bool {
        self.found.load(Ordering::Acquire)
    }

    /// Records a hit. The first winner's index sticks; later hits from
    /// racing workers are dropped.
    fn record(&self, index: usize) {
        if self
            .found
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.found_index.store(index as i64, Ordering::Release);
        }
    }

    fn result(&self) -> Option<usize> {
        if self.found.load(Ordering::Acquire) {
            Some(self.found_index.load(Ordering::Acquire) as usize)
        } else {
            None
        }
    }
}

static CONTEXT_POOL: Mutex<Vec<Box<SearchContext>>> = Mutex::new(Vec::new());
static RANGE_POOL: Mutex<Vec<Vec<ItemRange>>> = Mutex::new(Vec::new());

fn acquire_context() -> Box<SearchContext> {
    let ctx = CONTEXT_POOL
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .pop()
        .unwrap_or_else(|| Box::new(SearchContext::new()));
    ctx.reset();
    ctx
}

fn release_context(ctx: Box<SearchContext>) {
    CONTEXT_POOL
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .push(ctx);
}

fn acquire_ranges() -> Vec<ItemRange> {
    RANGE_POOL
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .pop()
        .unwrap_or_default()
}

fn release_ranges(mut ranges: Vec<ItemRange>) {
    ranges.clear();
    RANGE_POOL
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .push(ranges);
}

/// Splits `len` elements into a geometric sequence of ranges: each step
/// carves `max(1, floor(remaining * CHUNK_FRACTION))` off the front, and
/// once the remainder is no larger than the step it becomes the final
/// range.
pub(crate) fn partition(len: usize, block_shift: u32, block_mask: usize, out: &mut Vec<ItemRange>) {
    let mut offset = 0usize;
    let mut remaining = len;
    while remaining > 0 {
        let step = ((remaining as f64 * CHUNK_FRACTION) as usize).max(1);
        let take = if remaining <= step { remaining } else { step };
        out.push(ItemRange {
            block_index: offset >> block_shift,
            first_item_index: offset & block_mask,
            items_to_search: take,
        });
        offset += take;
        remaining -= take;
    }
}

/// Scans one range, sub-scan per block, bailing out as soon as another
/// worker has signalled a hit.
fn scan_range<T: PartialEq>(
    list: &SegmentedList<T>,
    range: ItemRange,
    item: &T,
    ctx: &SearchContext,
) {
    let mut block_index = range.block_index;
    let mut offset = range.first_item_index;
    let mut remaining = range.items_to_search;

    while remaining > 0 {
        if ctx.is_found() {
            return;
        }
        let slice = list.block_slice(block_index);
        let take = (slice.len() - offset).min(remaining);
        if let Some(position) = slice[offset..offset + take].iter().position(|x| x == item) {
            let absolute = (block_index << list.block_shift()) + offset + position;
            ctx.record(absolute);
            return;
        }
        remaining -= take;
        block_index += 1;
        offset = 0;
    }
}

/// Fork-join parallel search across the whole list.
///
/// Returns the index recorded by whichever worker found a match first, or
/// `None` after every partition has been exhausted.
pub(crate) fn parallel_index_of<T>(list: &SegmentedList<T>, item: &T) -> Option<usize>
where
    T: PartialEq + Sync,
{
    let mut ranges = acquire_ranges();
    partition(
        list.len(),
        list.block_shift(),
        list.block_size() - 1,
        &mut ranges,
    );

    let ctx = acquire_context();
    let ctx_ref: &SearchContext = &ctx;
    rayon::scope(|scope| {
        for range in ranges.iter().copied() {
            scope.spawn(move |_| scan_range(list, range, item, ctx_ref));
        }
    });

    let result = ctx.result();
    release_context(ctx);
    release_ranges(ranges);
    result
}
