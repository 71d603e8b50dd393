//! Sink error types
//!
//! Initialization and write-path errors are returned to the caller.
//! Housekeeping errors (archive renumbering and pruning) never are: they are
//! logged, counted and handed to the optional housekeeping observer.

use std::fmt;
use std::io;
use std::path::Path;

use thiserror::Error;

/// Result type for sink operations
pub type Result<T> = std::result::Result<T, SinkError>;

/// Filesystem step of a rotation that failed without failing the write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HousekeepingOp {
    /// Flushing the active file before it is renamed away
    Flush,
    /// Renaming the active file to the staging name
    Stage,
    /// Deleting an archive that fell out of retention
    Delete,
    /// Shifting an archive to the next sequence number
    Renumber,
    /// Renaming the staging file to sequence `000`
    Promote,
    /// Removing the staging file when no archive may be kept
    Discard,
}

impl HousekeepingOp {
    /// Short name used in log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flush => "flush",
            Self::Stage => "stage",
            Self::Delete => "delete",
            Self::Renumber => "renumber",
            Self::Promote => "promote",
            Self::Discard => "discard",
        }
    }
}

impl fmt::Display for HousekeepingOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by the rotating sink
#[derive(Debug, Error)]
pub enum SinkError {
    /// The log file name could not be turned into an absolute path
    #[error("cannot resolve log file path '{path}': {reason}")]
    Path {
        /// Path as given by the caller
        path: String,
        /// What went wrong
        reason: String,
    },

    /// Rotation mode other than `MIDNIGHT`
    #[error("unsupported rotation mode '{0}': only 'MIDNIGHT' is supported")]
    UnsupportedRotationMode(String),

    /// Empty log file name
    #[error("log file name is missing")]
    MissingFileName,

    /// The active file could not be created or opened
    #[error("failed to create log file '{path}': {source}")]
    Create {
        /// Active file path
        path: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// The log directory could not be listed
    #[error("failed to scan directory '{path}': {source}")]
    Scan {
        /// Directory path
        path: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// A best-effort rotation step failed
    #[error("rotation {operation} failed for '{path}': {source}")]
    Housekeeping {
        /// Which step failed
        operation: HousekeepingOp,
        /// File the step was applied to
        path: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Write or flush on the active file failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl SinkError {
    /// Create a Path error
    pub fn path(path: &Path, reason: impl Into<String>) -> Self {
        Self::Path {
            path: path.display().to_string(),
            reason: reason.into(),
        }
    }

    /// Create a Create error
    pub fn create(path: &Path, source: io::Error) -> Self {
        Self::Create {
            path: path.display().to_string(),
            source,
        }
    }

    /// Create a Scan error
    pub fn scan(path: &Path, source: io::Error) -> Self {
        Self::Scan {
            path: path.display().to_string(),
            source,
        }
    }

    /// Create a Housekeeping error
    pub fn housekeeping(operation: HousekeepingOp, path: &Path, source: io::Error) -> Self {
        Self::Housekeeping {
            operation,
            path: path.display().to_string(),
            source,
        }
    }
}

impl From<SinkError> for io::Error {
    fn from(err: SinkError) -> Self {
        match err {
            SinkError::Io(e) => e,
            SinkError::Create { source, .. } => source,
            other => io::Error::other(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_mode_message() {
        let err = SinkError::UnsupportedRotationMode("HOURLY".into());
        assert!(err.to_string().contains("HOURLY"));
        assert!(err.to_string().contains("MIDNIGHT"));
    }

    #[test]
    fn test_housekeeping_message() {
        let err = SinkError::housekeeping(
            HousekeepingOp::Renumber,
            Path::new("/var/log/app.log.2024-01-01.000"),
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("renumber"));
        assert!(msg.contains("app.log.2024-01-01.000"));
    }

    #[test]
    fn test_scan_message() {
        let err = SinkError::scan(Path::new("/nope"), io::Error::from(io::ErrorKind::NotFound));
        assert!(err.to_string().contains("/nope"));
    }

    #[test]
    fn test_into_io_error_keeps_kind() {
        let err = SinkError::create(
            Path::new("/ro/app.log"),
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        let io_err: io::Error = err.into();
        assert_eq!(io_err.kind(), io::ErrorKind::PermissionDenied);

        let io_err: io::Error = SinkError::MissingFileName.into();
        assert_eq!(io_err.kind(), io::ErrorKind::Other);
    }
}
