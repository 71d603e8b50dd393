//! Rotation trigger
//!
//! Decides, before every write, whether the active file must be rotated
//! first. Two conditions, checked in this order:
//!
//! 1. **Midnight**: the clock reached the stored boundary. The boundary is
//!    advanced to the following midnight as part of the check, whether or not
//!    the rotation that follows succeeds.
//! 2. **Size**: the pending payload would push the active file past the
//!    threshold.

use std::fmt;

use chrono::{DateTime, Local};

use crate::clock::next_midnight;

/// Threshold used when no size limit is configured
pub const UNLIMITED_ROTATE_SIZE: u64 = 0xFFFF_FFFF;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Why a rotation was triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationReason {
    /// Local midnight boundary crossed
    Midnight,
    /// Size threshold would be exceeded
    Size,
}

impl RotationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Midnight => "midnight",
            Self::Size => "size",
        }
    }
}

impl fmt::Display for RotationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert a megabyte setting into the byte threshold
///
/// Zero or negative means unlimited.
pub fn rotate_size_threshold(rotate_size_mb: i64) -> u64 {
    if rotate_size_mb <= 0 {
        UNLIMITED_ROTATE_SIZE
    } else {
        (rotate_size_mb as u64).saturating_mul(BYTES_PER_MB)
    }
}

/// Owns the next midnight boundary and the size threshold
#[derive(Debug, Clone)]
pub struct RotationTrigger {
    threshold: u64,
    next_rotate_time: DateTime<Local>,
}

impl RotationTrigger {
    /// Create a trigger whose first boundary is the midnight after `now`
    pub fn new(threshold: u64, now: DateTime<Local>) -> Self {
        Self {
            threshold,
            next_rotate_time: next_midnight(now),
        }
    }

    /// Check whether a write of `pending` bytes needs a rotation first
    pub fn needs_rotation(
        &mut self,
        pending: u64,
        current_size: u64,
        now: DateTime<Local>,
    ) -> Option<RotationReason> {
        if now >= self.next_rotate_time {
            self.next_rotate_time = next_midnight(now);
            return Some(RotationReason::Midnight);
        }

        if pending.saturating_add(current_size) > self.threshold {
            return Some(RotationReason::Size);
        }

        None
    }

    /// Size threshold in bytes
    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Next midnight boundary
    pub fn next_rotate_time(&self) -> DateTime<Local> {
        self.next_rotate_time
    }
}

#[cfg(test)]
#[path = "trigger_test.rs"]
mod trigger_test;
