//! Sink metrics
//!
//! Counters are atomics behind an `Arc` so a `SinkMetricsHandle` can be read
//! from another thread without taking the lock that serializes writes.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::trigger::RotationReason;

/// Counters maintained by the rotating sink
#[derive(Debug, Default)]
pub struct SinkMetrics {
    /// Successful write calls
    pub writes: AtomicU64,

    /// Payload bytes written
    pub bytes_written: AtomicU64,

    /// Write calls that returned an error
    pub write_errors: AtomicU64,

    /// Sync calls
    pub syncs: AtomicU64,

    /// Rotations triggered by the midnight boundary
    pub midnight_rotations: AtomicU64,

    /// Rotations triggered by the size threshold
    pub size_rotations: AtomicU64,

    /// Absorbed housekeeping failures
    pub housekeeping_errors: AtomicU64,
}

impl SinkMetrics {
    /// Create new metrics instance
    pub const fn new() -> Self {
        Self {
            writes: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            write_errors: AtomicU64::new(0),
            syncs: AtomicU64::new(0),
            midnight_rotations: AtomicU64::new(0),
            size_rotations: AtomicU64::new(0),
            housekeeping_errors: AtomicU64::new(0),
        }
    }

    /// Record a successful write
    #[inline]
    pub fn record_write(&self, bytes: u64) {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record a failed write
    #[inline]
    pub fn record_write_error(&self) {
        self.write_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a sync
    #[inline]
    pub fn record_sync(&self) {
        self.syncs.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rotation
    #[inline]
    pub fn record_rotation(&self, reason: RotationReason) {
        let counter = match reason {
            RotationReason::Midnight => &self.midnight_rotations,
            RotationReason::Size => &self.size_rotations,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an absorbed housekeeping failure
    #[inline]
    pub fn record_housekeeping_error(&self) {
        self.housekeeping_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        let midnight_rotations = self.midnight_rotations.load(Ordering::Relaxed);
        let size_rotations = self.size_rotations.load(Ordering::Relaxed);
        MetricsSnapshot {
            writes: self.writes.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
            syncs: self.syncs.load(Ordering::Relaxed),
            rotations: midnight_rotations + size_rotations,
            midnight_rotations,
            size_rotations,
            housekeeping_errors: self.housekeeping_errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of sink metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub writes: u64,
    pub bytes_written: u64,
    pub write_errors: u64,
    pub syncs: u64,
    pub rotations: u64,
    pub midnight_rotations: u64,
    pub size_rotations: u64,
    pub housekeeping_errors: u64,
}

/// Cloneable read-only view of a sink's metrics
///
/// Stays valid after the sink is moved behind a lock or dropped.
#[derive(Debug, Clone)]
pub struct SinkMetricsHandle {
    metrics: Arc<SinkMetrics>,
}

impl SinkMetricsHandle {
    pub(crate) fn new(metrics: Arc<SinkMetrics>) -> Self {
        Self { metrics }
    }

    /// Current counter values
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
