//! Rotating sink
//!
//! Composes path resolution, scanning, the trigger and the executor behind
//! two operations: append a payload, and sync buffered bytes to the file.
//!
//! The sink takes `&mut self` and does no locking of its own. Share it
//! through `LockedSink` (or any other mutex) when more than one caller
//! writes.
//!
//! # Example
//!
//! ```no_run
//! use rotalog_sink::{RotatingSink, SinkOptions};
//!
//! let options = SinkOptions::new("try.log")
//!     .with_rotate_size_mb(1)
//!     .with_max_file_number_per_day(3);
//! let mut sink = RotatingSink::open(options)?;
//!
//! sink.append(b"hello\n")?;
//! sink.sync()?;
//! # Ok::<(), rotalog_sink::SinkError>(())
//! ```

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::clock::{Clock, SystemClock, date_string};
use crate::error::{Result, SinkError};
use crate::executor::RotationExecutor;
use crate::housekeeping::Housekeeping;
use crate::metrics::{SinkMetrics, SinkMetricsHandle};
use crate::options::{RotationMode, SinkOptions, retention_limit};
use crate::path::ResolvedPath;
use crate::scan;
use crate::state::ActiveFileState;
use crate::trigger::{RotationReason, RotationTrigger, rotate_size_threshold};

/// Log file sink with midnight and size based rotation
pub struct RotatingSink {
    state: ActiveFileState,
    trigger: RotationTrigger,
    clock: Box<dyn Clock>,
    housekeeping: Housekeeping,
    metrics: Arc<SinkMetrics>,
}

impl RotatingSink {
    /// Open a sink from the raw option values
    ///
    /// # Errors
    ///
    /// Fails if `when` is not `MIDNIGHT`, the file name is empty or cannot
    /// be resolved, or the active file cannot be opened.
    pub fn init(
        when: &str,
        rotate_size_mb: i64,
        log_file_name: impl AsRef<Path>,
        max_file_number_per_day: i64,
    ) -> Result<Self> {
        let when: RotationMode = when.parse()?;
        let options = SinkOptions::new(log_file_name.as_ref())
            .with_when(when)
            .with_rotate_size_mb(rotate_size_mb)
            .with_max_file_number_per_day(max_file_number_per_day);
        Self::open(options)
    }

    /// Open a sink driven by the system clock
    pub fn open(options: SinkOptions) -> Result<Self> {
        Self::open_with_clock(options, SystemClock)
    }

    /// Open a sink driven by `clock`
    ///
    /// Resumes size and sequence numbering from files already on disk and
    /// recovers a staging file left by a crash mid-rotation before the
    /// active file is opened. An existing active file is appended to, never
    /// truncated.
    pub fn open_with_clock(options: SinkOptions, clock: impl Clock + 'static) -> Result<Self> {
        if options.log_file_name.as_os_str().is_empty() {
            return Err(SinkError::MissingFileName);
        }
        let path = ResolvedPath::resolve(&options.log_file_name)?;

        let resume = scan::resume_scan(path.dir(), path.base());
        let now = clock.now();
        let trigger = RotationTrigger::new(rotate_size_threshold(options.rotate_size_mb), now);
        let retention = retention_limit(options.max_file_number_per_day);

        let metrics = Arc::new(SinkMetrics::new());
        let housekeeping = Housekeeping::new(options.observer.clone(), Arc::clone(&metrics));

        let staging = path.staging_path();
        if staging.is_file() {
            let outcome = RotationExecutor::new(&housekeeping).promote_staging(
                &path,
                retention,
                &date_string(now),
            );
            tracing::warn!(
                staging = %staging.display(),
                outcome = ?outcome,
                "recovered staging file from interrupted rotation"
            );
        }

        let state = ActiveFileState::open(
            path,
            retention,
            resume.max_sequence.saturating_add(1),
            resume.active_size,
            options.buffer_size,
        )?;

        tracing::info!(
            path = %state.path.path().display(),
            mode = %options.when,
            threshold = trigger.threshold(),
            retention,
            resumed_size = resume.active_size,
            next_sequence = state.current_sequence_number,
            "rotating sink opened"
        );

        Ok(Self {
            state,
            trigger,
            clock: Box::new(clock),
            housekeeping,
            metrics,
        })
    }

    /// Append `payload` to the active file, rotating first if needed
    ///
    /// Returns the number of bytes written, which is the payload length on
    /// success.
    ///
    /// # Errors
    ///
    /// Fails if the active file cannot be (re)created or the write itself
    /// fails. Housekeeping failures during rotation are not returned.
    pub fn append(&mut self, payload: &[u8]) -> Result<usize> {
        let result = self.append_inner(payload);
        match &result {
            Ok(n) => self.metrics.record_write(*n as u64),
            Err(_) => self.metrics.record_write_error(),
        }
        result
    }

    fn append_inner(&mut self, payload: &[u8]) -> Result<usize> {
        let now = self.clock.now();
        if let Some(reason) =
            self.trigger
                .needs_rotation(payload.len() as u64, self.state.current_size, now)
        {
            self.rotate(reason, now)?;
        }

        self.state.writer()?.write_all(payload)?;
        self.state.current_size += payload.len() as u64;
        Ok(payload.len())
    }

    fn rotate(&mut self, reason: RotationReason, now: DateTime<Local>) -> Result<()> {
        let date = date_string(now);
        let archived_size = self.state.current_size;

        RotationExecutor::new(&self.housekeeping).rotate(&mut self.state, &date)?;
        self.metrics.record_rotation(reason);

        tracing::info!(
            path = %self.state.path.path().display(),
            reason = %reason,
            date = %date,
            archived_size,
            next_rotate_time = %self.trigger.next_rotate_time(),
            "log file rotated"
        );
        Ok(())
    }

    /// Flush buffered bytes into the active file
    ///
    /// This hands the bytes to the OS; it does not fsync.
    pub fn sync(&mut self) -> Result<()> {
        self.metrics.record_sync();
        self.state.flush()
    }

    /// Absolute path of the active file
    pub fn path(&self) -> &Path {
        self.state.path.path()
    }

    /// Bytes in the active file, including buffered ones
    pub fn current_size(&self) -> u64 {
        self.state.current_size
    }

    /// Sequence number the next archive would get
    pub fn current_sequence_number(&self) -> u32 {
        self.state.current_sequence_number
    }

    /// Files kept per day
    pub fn retention_limit(&self) -> u32 {
        self.state.retention_limit
    }

    /// Size threshold in bytes
    pub fn rotate_size_threshold(&self) -> u64 {
        self.trigger.threshold()
    }

    /// Next midnight boundary
    pub fn next_rotate_time(&self) -> DateTime<Local> {
        self.trigger.next_rotate_time()
    }

    /// Handle for reading metrics without access to the sink
    pub fn metrics_handle(&self) -> SinkMetricsHandle {
        SinkMetricsHandle::new(Arc::clone(&self.metrics))
    }
}

impl Write for RotatingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.append(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(self.sync()?)
    }
}

impl Drop for RotatingSink {
    fn drop(&mut self) {
        if let Err(e) = self.state.flush() {
            tracing::warn!(path = %self.state.path.path().display(), error = %e, "final flush failed");
        }
    }
}

#[cfg(test)]
#[path = "sink_test.rs"]
mod sink_test;
