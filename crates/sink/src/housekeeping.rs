//! Reporting of absorbed rotation failures
//!
//! Renumbering and pruning are best effort: a failed rename or delete never
//! fails the write that triggered the rotation. Every such failure is still
//! logged (rate limited), counted in the sink metrics and passed to the
//! optional observer so callers can see what was dropped.

use std::sync::Arc;

use crate::error::SinkError;
use crate::metrics::SinkMetrics;
use crate::rate_limited_logger::RateLimitedLogger;

/// Callback receiving every absorbed housekeeping error
///
/// Runs synchronously inside the write that triggered the rotation, while
/// the caller's lock is held. It must not write to the same sink.
pub type HousekeepingObserver = Arc<dyn Fn(&SinkError) + Send + Sync>;

pub(crate) struct Housekeeping {
    observer: Option<HousekeepingObserver>,
    logger: RateLimitedLogger,
    metrics: Arc<SinkMetrics>,
}

impl Housekeeping {
    pub(crate) fn new(observer: Option<HousekeepingObserver>, metrics: Arc<SinkMetrics>) -> Self {
        Self {
            observer,
            logger: RateLimitedLogger::default(),
            metrics,
        }
    }

    /// Absorb a non-fatal error
    pub(crate) fn report(&self, err: SinkError) {
        self.metrics.record_housekeeping_error();
        tracing::debug!(error = %err, "housekeeping error absorbed");
        self.logger.warn("rotation continues best effort", &err);

        if let Some(observer) = &self.observer {
            observer(&err);
        }
    }
}
