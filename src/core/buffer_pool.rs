//! Size-tiered scratch buffer recycler
//!
//! Record assembly writes into a leased `Vec<u8>` instead of allocating a
//! fresh `String` per call. Buffers live in three free-lists keyed by
//! capacity (512 B, 4 KiB, 32 KiB). Each free-list is a bounded
//! `crossbeam_channel`, so lease and release never take a shared lock and
//! never block: an empty tier allocates, a full tier drops the buffer.

use super::metrics::PoolMetrics;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::fmt;
use std::ops::{Deref, DerefMut};

pub const SMALL_BUFFER_SIZE: usize = 512;
pub const MEDIUM_BUFFER_SIZE: usize = 4 * 1024;
pub const LARGE_BUFFER_SIZE: usize = 32 * 1024;

/// Buffers that grew beyond this are dropped on release instead of pooled.
pub const MAX_POOLED_CAPACITY: usize = 64 * 1024;

/// Default number of idle buffers retained per tier
pub const DEFAULT_TIER_DEPTH: usize = 64;

/// Capacity class of a pooled buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Small,
    Medium,
    Large,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Small, Tier::Medium, Tier::Large];

    /// Capacity every buffer in this tier is guaranteed to have
    pub const fn ceiling(self) -> usize {
        match self {
            Tier::Small => SMALL_BUFFER_SIZE,
            Tier::Medium => MEDIUM_BUFFER_SIZE,
            Tier::Large => LARGE_BUFFER_SIZE,
        }
    }

    /// Smallest tier able to satisfy a request, `None` above the large tier
    pub fn for_request(min_capacity: usize) -> Option<Tier> {
        Tier::ALL
            .into_iter()
            .find(|tier| min_capacity <= tier.ceiling())
    }

    /// Tier a buffer of `capacity` belongs to on release
    ///
    /// A buffer joins the largest tier whose ceiling it still meets, so any
    /// later lease from that tier gets at least the ceiling. Buffers below
    /// the small ceiling or above `MAX_POOLED_CAPACITY` have no tier.
    pub fn for_capacity(capacity: usize) -> Option<Tier> {
        if capacity > MAX_POOLED_CAPACITY {
            return None;
        }
        Tier::ALL
            .into_iter()
            .rev()
            .find(|tier| capacity >= tier.ceiling())
    }

    fn index(self) -> usize {
        match self {
            Tier::Small => 0,
            Tier::Medium => 1,
            Tier::Large => 2,
        }
    }
}

struct TierPool {
    tx: Sender<Vec<u8>>,
    rx: Receiver<Vec<u8>>,
}

impl TierPool {
    fn new(depth: usize) -> Self {
        let (tx, rx) = bounded(depth);
        Self { tx, rx }
    }
}

/// Pool of reusable record buffers
///
/// # Example
///
/// ```
/// use rust_structured_logger::BufferRecycler;
///
/// let recycler = BufferRecycler::new();
/// {
///     let mut buf = recycler.lease(100);
///     buf.extend_from_slice(b"hello");
/// } // returned to the pool here
///
/// let buf = recycler.lease(100);
/// assert!(buf.is_empty());
/// assert_eq!(recycler.metrics().hits(), 1);
/// ```
pub struct BufferRecycler {
    tiers: [TierPool; 3],
    metrics: PoolMetrics,
}

impl BufferRecycler {
    #[must_use]
    pub fn new() -> Self {
        Self::with_depth(DEFAULT_TIER_DEPTH)
    }

    /// Create a recycler retaining at most `depth` idle buffers per tier
    ///
    /// A depth of zero disables pooling: every lease allocates.
    #[must_use]
    pub fn with_depth(depth: usize) -> Self {
        Self {
            tiers: [
                TierPool::new(depth),
                TierPool::new(depth),
                TierPool::new(depth),
            ],
            metrics: PoolMetrics::new(),
        }
    }

    /// Lease an empty buffer with at least `min_capacity` bytes of capacity
    ///
    /// The buffer goes back to the pool when the guard is dropped, on every
    /// exit path including unwinding.
    pub fn lease(&self, min_capacity: usize) -> PooledBuffer<'_> {
        PooledBuffer {
            buf: self.lease_vec(min_capacity),
            recycler: self,
        }
    }

    /// Lease without a guard; pair with [`BufferRecycler::release`]
    pub fn lease_vec(&self, min_capacity: usize) -> Vec<u8> {
        let Some(tier) = Tier::for_request(min_capacity) else {
            self.metrics.record_lease(false);
            return Vec::with_capacity(min_capacity);
        };

        match self.tiers[tier.index()].rx.try_recv() {
            Ok(buf) => {
                self.metrics.record_lease(true);
                buf
            }
            Err(_) => {
                self.metrics.record_lease(false);
                Vec::with_capacity(tier.ceiling())
            }
        }
    }

    /// Truncate a buffer and return it to the tier matching its capacity
    pub fn release(&self, mut buf: Vec<u8>) {
        let Some(tier) = Tier::for_capacity(buf.capacity()) else {
            self.metrics.record_release(false);
            return;
        };

        buf.clear();
        let pooled = self.tiers[tier.index()].tx.try_send(buf).is_ok();
        self.metrics.record_release(pooled);
    }

    /// Number of idle buffers currently held by `tier`
    pub fn idle(&self, tier: Tier) -> usize {
        self.tiers[tier.index()].rx.len()
    }

    pub fn metrics(&self) -> &PoolMetrics {
        &self.metrics
    }
}

impl Default for BufferRecycler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BufferRecycler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferRecycler")
            .field("small", &self.idle(Tier::Small))
            .field("medium", &self.idle(Tier::Medium))
            .field("large", &self.idle(Tier::Large))
            .field("metrics", &self.metrics)
            .finish()
    }
}

/// A leased buffer, released back to its recycler on drop
pub struct PooledBuffer<'a> {
    buf: Vec<u8>,
    recycler: &'a BufferRecycler,
}

impl PooledBuffer<'_> {
    /// Detach the buffer from the pool; it will not be recycled
    pub fn into_inner(mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        let buf = std::mem::take(&mut self.buf);
        // into_inner leaves an unallocated Vec behind; nothing to recycle
        if buf.capacity() > 0 {
            self.recycler.release(buf);
        }
    }
}
