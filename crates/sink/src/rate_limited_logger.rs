//! Rate-limited warning logger
//!
//! Housekeeping failures repeat on every rotation until someone fixes the
//! directory (read-only archive, foreign file owner, ...). This logs at most
//! once per interval and reports how many warnings were suppressed in
//! between.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Default interval between logged warnings
pub const DEFAULT_LOG_INTERVAL: Duration = Duration::from_secs(10);

/// Logs at most once per `min_interval`
pub struct RateLimitedLogger {
    /// Minimum interval between log messages
    min_interval: Duration,

    /// Last time we logged
    last_log_time: Mutex<Option<Instant>>,

    /// Count of warnings since last log
    pending: AtomicU64,

    /// Total warnings ever recorded
    total: AtomicU64,
}

impl RateLimitedLogger {
    /// Create a new rate-limited logger with the specified interval
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_log_time: Mutex::new(None),
            pending: AtomicU64::new(0),
            total: AtomicU64::new(0),
        }
    }

    /// Record a warning and log it if the interval has elapsed
    ///
    /// Returns true if the warning was logged, false if it was suppressed.
    pub fn warn(&self, message: &str, error: &dyn std::fmt::Display) -> bool {
        self.pending.fetch_add(1, Ordering::Relaxed);
        self.total.fetch_add(1, Ordering::Relaxed);

        if !self.should_log() {
            return false;
        }

        let count = self.pending.swap(0, Ordering::Relaxed);
        let total = self.total.load(Ordering::Relaxed);

        if count > 1 {
            tracing::warn!(
                context = %message,
                error = %error,
                suppressed_count = count - 1,
                total_warnings = total,
                "rotation housekeeping failed (rate-limited)"
            );
        } else {
            tracing::warn!(
                context = %message,
                error = %error,
                total_warnings = total,
                "rotation housekeeping failed"
            );
        }
        true
    }

    fn should_log(&self) -> bool {
        let mut last_time = self.last_log_time.lock();
        let now = Instant::now();

        match *last_time {
            Some(last) if now.duration_since(last) < self.min_interval => false,
            _ => {
                *last_time = Some(now);
                true
            }
        }
    }

    /// Warnings recorded since the last logged one
    pub fn pending_count(&self) -> u64 {
        self.pending.load(Ordering::Relaxed)
    }

    /// Warnings recorded in total
    pub fn total_count(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

impl Default for RateLimitedLogger {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_INTERVAL)
    }
}
