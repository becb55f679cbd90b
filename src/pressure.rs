//! Background memory-pressure monitoring for the block pool.
//!
//! A detached thread samples process-wide memory usage on a fixed interval
//! and, while usage sits above a high-water threshold, drops a bounded number
//! of cached buffers from every pool bucket per check. Trimming is advisory:
//! the rent/recycle hot path never waits on the monitor, and a skipped cycle
//! is not an error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use std::time::Duration;

use crate::pool;

/// Sampling interval of the monitor thread.
const SAMPLE_INTERVAL: Duration = Duration::from_millis(500);

/// Fraction of total memory in use above which trimming kicks in.
const HIGH_PRESSURE: f64 = 0.90;

/// Buffers dropped per bucket per high-pressure check.
const TRIM_PER_CYCLE: usize = 8;

static MONITOR_ENABLED: AtomicBool = AtomicBool::new(true);
static UNDER_PRESSURE: AtomicBool = AtomicBool::new(false);

/// Source of memory-usage samples.
///
/// The default implementation reads system statistics via `sysinfo`; tests
/// substitute a fake to drive trim cycles deterministically.
pub trait MemorySampler: Send + 'static {
    /// Fraction of total memory currently in use, in `[0.0, 1.0]`.
    fn usage_fraction(&mut self) -> f64;
}

/// [`MemorySampler`] backed by `sysinfo` system memory statistics.
pub struct SystemMemorySampler {
    system: sysinfo::System,
}

impl SystemMemorySampler {
    pub fn new() -> Self {
        Self {
            system: sysinfo::System::new(),
        }
    }
}

impl Default for SystemMemorySampler {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySampler for SystemMemorySampler {
    fn usage_fraction(&mut self) -> f64 {
        self.system.refresh_memory();
        let total = self.system.total_memory();
        if total == 0 {
            return 0.0;
        }
        self.system.used_memory() as f64 / total as f64
    }
}

/// Enables or disables the background monitor.
///
/// Takes effect only if called before the first pooled rent; the monitor
/// thread is started at most once per process.
pub fn set_monitor_enabled(enabled: bool) {
    MONITOR_ENABLED.store(enabled, Ordering::Relaxed);
}

/// Whether the last sample crossed the high-pressure threshold.
///
/// Read without synchronization by pool internals; a stale value only delays
/// trimming by one cycle.
pub fn under_pressure() -> bool {
    UNDER_PRESSURE.load(Ordering::Relaxed)
}

/// One monitor step: sample, update the pressure flag, trim if high.
///
/// Factored out of the thread loop so tests can drive it directly.
pub fn run_pressure_check(sampler: &mut dyn MemorySampler) -> usize {
    let usage = sampler.usage_fraction();
    let high = usage > HIGH_PRESSURE;
    UNDER_PRESSURE.store(high, Ordering::Relaxed);
    if !high {
        return 0;
    }
    let freed = pool::trim(TRIM_PER_CYCLE);
    log::debug!("memory usage {:.0}%, trimmed {freed} bytes", usage * 100.0);
    freed
}

/// Starts the monitor thread if enabled and not already running.
///
/// Called from the pool on the first pooled rent; may also be called
/// directly to start monitoring earlier.
pub fn ensure_monitor_started() {
    if !MONITOR_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    static STARTED: OnceLock<()> = OnceLock::new();
    STARTED.get_or_init(|| {
        std::thread::Builder::new()
            .name("recycled-list-pressure".into())
            .spawn(|| {
                log::trace!("memory pressure monitor started");
                let mut sampler = SystemMemorySampler::new();
                loop {
                    std::thread::sleep(SAMPLE_INTERVAL);
                    run_pressure_check(&mut sampler);
                }
            })
            .expect("failed to spawn pressure monitor thread");
    });
}
