//! Logger and buffer pool metrics
//!
//! Relaxed atomic counters describing what the logger did with each call:
//! how many records reached the sink, how many were filtered by level, and
//! how often the sink refused a write. `PoolMetrics` tracks the buffer
//! recycler so callers can confirm that filtered records never lease.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the record write path
///
/// # Example
///
/// ```
/// use rust_structured_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
/// metrics.record_written(64);
/// metrics.record_filtered();
///
/// assert_eq!(metrics.records_written(), 1);
/// assert_eq!(metrics.bytes_written(), 64);
/// assert_eq!(metrics.records_filtered(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records handed to the sink successfully
    records_written: AtomicU64,

    /// Calls rejected by the minimum level check
    records_filtered: AtomicU64,

    /// Records the sink refused
    write_failures: AtomicU64,

    /// Total bytes accepted by the sink
    bytes_written: AtomicU64,
}

impl LoggerMetrics {
    pub const fn new() -> Self {
        Self {
            records_written: AtomicU64::new(0),
            records_filtered: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn records_written(&self) -> u64 {
        self.records_written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn records_filtered(&self) -> u64 {
        self.records_filtered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    /// Record a successful sink write of `bytes` bytes
    #[inline]
    pub fn record_written(&self, bytes: usize) -> u64 {
        self.bytes_written.fetch_add(bytes as u64, Ordering::Relaxed);
        self.records_written.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_filtered(&self) -> u64 {
        self.records_filtered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_write_failure(&self) -> u64 {
        self.write_failures.fetch_add(1, Ordering::Relaxed)
    }

    /// Share of attempted writes that failed, as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been written yet.
    pub fn failure_rate(&self) -> f64 {
        let failed = self.write_failures() as f64;
        let total = self.records_written() as f64 + failed;
        if total == 0.0 {
            0.0
        } else {
            (failed / total) * 100.0
        }
    }

    pub fn reset(&self) {
        self.records_written.store(0, Ordering::Relaxed);
        self.records_filtered.store(0, Ordering::Relaxed);
        self.write_failures.store(0, Ordering::Relaxed);
        self.bytes_written.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            records_written: AtomicU64::new(self.records_written()),
            records_filtered: AtomicU64::new(self.records_filtered()),
            write_failures: AtomicU64::new(self.write_failures()),
            bytes_written: AtomicU64::new(self.bytes_written()),
        }
    }
}

/// Counters for the buffer recycler
#[derive(Debug, Default)]
pub struct PoolMetrics {
    leases: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    releases: AtomicU64,
    discarded: AtomicU64,
}

impl PoolMetrics {
    pub const fn new() -> Self {
        Self {
            leases: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            releases: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        }
    }

    /// Total number of buffers handed out
    #[inline]
    pub fn leases(&self) -> u64 {
        self.leases.load(Ordering::Relaxed)
    }

    /// Leases satisfied from a pooled buffer
    #[inline]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Leases that had to allocate
    #[inline]
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Buffers returned to a tier
    #[inline]
    pub fn releases(&self) -> u64 {
        self.releases.load(Ordering::Relaxed)
    }

    /// Buffers dropped on release (oversized, undersized, or tier full)
    #[inline]
    pub fn discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn record_lease(&self, hit: bool) {
        self.leases.fetch_add(1, Ordering::Relaxed);
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub(crate) fn record_release(&self, pooled: bool) {
        if pooled {
            self.releases.fetch_add(1, Ordering::Relaxed);
        } else {
            self.discarded.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Share of leases served from the pool, as a percentage (0.0 - 100.0)
    pub fn hit_rate(&self) -> f64 {
        let leases = self.leases() as f64;
        if leases == 0.0 {
            0.0
        } else {
            (self.hits() as f64 / leases) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.records_written(), 0);
        assert_eq!(metrics.records_filtered(), 0);
        assert_eq!(metrics.write_failures(), 0);
        assert_eq!(metrics.bytes_written(), 0);
    }

    #[test]
    fn test_metrics_record_written() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.record_written(10), 0); // Returns previous value
        metrics.record_written(5);
        assert_eq!(metrics.records_written(), 2);
        assert_eq!(metrics.bytes_written(), 15);
    }

    #[test]
    fn test_metrics_failure_rate() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.failure_rate(), 0.0);

        for _ in 0..90 {
            metrics.record_written(1);
        }
        for _ in 0..10 {
            metrics.record_write_failure();
        }

        let rate = metrics.failure_rate();
        assert!((9.9..=10.1).contains(&rate), "Failure rate was {}", rate);
    }

    #[test]
    fn test_metrics_reset() {
        let metrics = LoggerMetrics::new();
        metrics.record_written(3);
        metrics.record_filtered();
        metrics.record_write_failure();

        metrics.reset();

        assert_eq!(metrics.records_written(), 0);
        assert_eq!(metrics.records_filtered(), 0);
        assert_eq!(metrics.write_failures(), 0);
        assert_eq!(metrics.bytes_written(), 0);
    }

    #[test]
    fn test_metrics_clone_is_snapshot() {
        let metrics = LoggerMetrics::new();
        metrics.record_written(1);

        let snapshot = metrics.clone();
        metrics.record_written(1);

        assert_eq!(snapshot.records_written(), 1);
        assert_eq!(metrics.records_written(), 2);
    }

    #[test]
    fn test_pool_metrics() {
        let metrics = PoolMetrics::new();
        metrics.record_lease(false);
        metrics.record_lease(true);
        metrics.record_lease(true);
        metrics.record_release(true);
        metrics.record_release(false);

        assert_eq!(metrics.leases(), 3);
        assert_eq!(metrics.hits(), 2);
        assert_eq!(metrics.misses(), 1);
        assert_eq!(metrics.releases(), 1);
        assert_eq!(metrics.discarded(), 1);
        assert!((metrics.hit_rate() - 66.66).abs() < 0.1);
    }
}
