//! Rotalog Sink
//!
//! A log-file sink that appends payloads to one active file and rotates it
//! at local midnight or when the next write would push it past a size
//! threshold.
//!
//! # File layout
//!
//! ```text
//! try.log                  active file
//! try.log.tmp              staging file, only exists mid-rotation
//! try.log.2024-01-01.000   newest archive of the day
//! try.log.2024-01-01.001
//! try.log.2024-01-01.002   oldest archive of the day
//! ```
//!
//! At most `max_file_number_per_day` files are kept per date, the active
//! file included. Archives from other dates are never touched.
//!
//! # Usage
//!
//! ```no_run
//! use rotalog_sink::{LockedSink, RotatingSink, SinkOptions};
//!
//! let sink = RotatingSink::open(SinkOptions::new("try.log").with_rotate_size_mb(1))?;
//! let shared = LockedSink::new(sink);
//!
//! shared.append(b"record\n")?;
//! shared.sync()?;
//! # Ok::<(), rotalog_sink::SinkError>(())
//! ```
//!
//! # Failure model
//!
//! A write fails only when the active file cannot be (re)created or the
//! write itself fails. Failed renames and deletes while shifting archives
//! are absorbed, logged under the `rotalog_sink` target, counted in the
//! metrics and handed to an optional observer.

pub mod clock;
pub mod error;
pub mod locked;
pub mod metrics;
pub mod options;
pub mod path;
pub mod rate_limited_logger;
pub mod scan;
pub mod trigger;

mod executor;
mod housekeeping;
mod sink;
mod state;

pub use clock::{Clock, DATE_FORMAT, ManualClock, SystemClock};
pub use error::{HousekeepingOp, Result, SinkError};
pub use housekeeping::HousekeepingObserver;
pub use locked::{LockedSink, LockedSinkWriter};
pub use metrics::{MetricsSnapshot, SinkMetricsHandle};
pub use options::{DEFAULT_BUFFER_SIZE, MAX_FILES_PER_DAY, RotationMode, SinkOptions};
pub use path::{ResolvedPath, STAGING_SUFFIX};
pub use sink::RotatingSink;
pub use trigger::{RotationReason, UNLIMITED_ROTATE_SIZE};
