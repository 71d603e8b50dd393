//! Sink options
//!
//! The recognized initialization settings:
//!
//! | Option | Meaning |
//! |--------|---------|
//! | `when` | rotation mode, only `MIDNIGHT` |
//! | `rotate_size_mb` | size threshold in MB, `<= 0` unlimited |
//! | `log_file_name` | active file, required |
//! | `max_file_number_per_day` | files kept per day, clamped to `[1, 1000]` |

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::SinkError;
use crate::housekeeping::HousekeepingObserver;

/// Upper bound (and default) for files retained per day
pub const MAX_FILES_PER_DAY: u32 = 1000;

/// Default capacity of the buffered writer
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Time-based rotation mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RotationMode {
    /// Rotate at local midnight
    #[default]
    Midnight,
}

impl RotationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Midnight => "MIDNIGHT",
        }
    }
}

impl FromStr for RotationMode {
    type Err = SinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MIDNIGHT" => Ok(Self::Midnight),
            other => Err(SinkError::UnsupportedRotationMode(other.to_string())),
        }
    }
}

impl fmt::Display for RotationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clamp the per-day file count
///
/// Zero, negative and values above the maximum all mean the maximum.
pub fn retention_limit(max_file_number_per_day: i64) -> u32 {
    if max_file_number_per_day <= 0 || max_file_number_per_day > i64::from(MAX_FILES_PER_DAY) {
        MAX_FILES_PER_DAY
    } else {
        max_file_number_per_day as u32
    }
}

/// Options for opening a `RotatingSink`
#[derive(Clone)]
pub struct SinkOptions {
    /// Rotation mode
    pub when: RotationMode,

    /// Size threshold in megabytes, `<= 0` for unlimited
    pub rotate_size_mb: i64,

    /// Active log file, relative to the working directory or absolute
    pub log_file_name: PathBuf,

    /// Files (active + archived) kept per day
    pub max_file_number_per_day: i64,

    /// Buffered writer capacity
    pub buffer_size: usize,

    /// Receives housekeeping errors that rotation absorbs
    pub observer: Option<HousekeepingObserver>,
}

impl SinkOptions {
    /// Options for `log_file_name` with no size limit and the maximum
    /// retention
    pub fn new(log_file_name: impl Into<PathBuf>) -> Self {
        Self {
            when: RotationMode::Midnight,
            rotate_size_mb: 0,
            log_file_name: log_file_name.into(),
            max_file_number_per_day: i64::from(MAX_FILES_PER_DAY),
            buffer_size: DEFAULT_BUFFER_SIZE,
            observer: None,
        }
    }

    #[must_use]
    pub fn with_when(mut self, when: RotationMode) -> Self {
        self.when = when;
        self
    }

    #[must_use]
    pub fn with_rotate_size_mb(mut self, rotate_size_mb: i64) -> Self {
        self.rotate_size_mb = rotate_size_mb;
        self
    }

    #[must_use]
    pub fn with_max_file_number_per_day(mut self, max: i64) -> Self {
        self.max_file_number_per_day = max;
        self
    }

    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Observe housekeeping errors that would otherwise only be logged
    #[must_use]
    pub fn with_housekeeping_observer(
        mut self,
        observer: impl Fn(&SinkError) + Send + Sync + 'static,
    ) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }
}

impl fmt::Debug for SinkOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkOptions")
            .field("when", &self.when)
            .field("rotate_size_mb", &self.rotate_size_mb)
            .field("log_file_name", &self.log_file_name)
            .field("max_file_number_per_day", &self.max_file_number_per_day)
            .field("buffer_size", &self.buffer_size)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_str() {
        assert_eq!("MIDNIGHT".parse::<RotationMode>().unwrap(), RotationMode::Midnight);
    }

    #[test]
    fn test_mode_rejects_others() {
        for s in ["midnight", "HOURLY", "", "DAILY"] {
            let err = s.parse::<RotationMode>().unwrap_err();
            assert!(matches!(err, SinkError::UnsupportedRotationMode(_)));
        }
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(RotationMode::Midnight.to_string(), "MIDNIGHT");
    }

    #[test]
    fn test_retention_limit_clamp() {
        assert_eq!(retention_limit(3), 3);
        assert_eq!(retention_limit(1), 1);
        assert_eq!(retention_limit(1000), 1000);
        assert_eq!(retention_limit(0), 1000);
        assert_eq!(retention_limit(-1), 1000);
        assert_eq!(retention_limit(1001), 1000);
    }

    #[test]
    fn test_options_defaults() {
        let options = SinkOptions::new("try.log");
        assert_eq!(options.when, RotationMode::Midnight);
        assert_eq!(options.rotate_size_mb, 0);
        assert_eq!(options.log_file_name, PathBuf::from("try.log"));
        assert_eq!(options.max_file_number_per_day, 1000);
        assert_eq!(options.buffer_size, DEFAULT_BUFFER_SIZE);
        assert!(options.observer.is_none());
    }

    #[test]
    fn test_options_chained_builders() {
        let options = SinkOptions::new("/var/log/app.log")
            .with_rotate_size_mb(1)
            .with_max_file_number_per_day(3)
            .with_buffer_size(4096)
            .with_housekeeping_observer(|_| {});

        assert_eq!(options.rotate_size_mb, 1);
        assert_eq!(options.max_file_number_per_day, 3);
        assert_eq!(options.buffer_size, 4096);
        assert!(format!("{options:?}").contains("observer: true"));
    }
}
