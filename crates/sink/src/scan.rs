//! Directory scanning
//!
//! Two non-recursive scans over the log directory:
//!
//! - **Resume scan**: run once at startup to pick up the size of an existing
//!   active file and the highest sequence number already on disk.
//! - **Rotation scan**: run by the executor to find one day's archives and
//!   split them into files to renumber and files to delete.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SinkError};
use crate::path::STAGING_SUFFIX;

/// State recovered from an existing log directory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResumeState {
    /// Size of the active file, 0 if it does not exist
    pub active_size: u64,
    /// Largest numeric suffix among files named `{base}*`
    pub max_sequence: u32,
}

/// An archived file and its parsed sequence number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedFile {
    pub path: PathBuf,
    pub sequence: u32,
}

/// Result of a date-scoped rotation scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationScan {
    /// Archives to shift by one, sorted by ascending sequence number
    pub renumber: Vec<ArchivedFile>,
    /// Archives that would overflow retention once shifted
    pub delete: Vec<PathBuf>,
}

/// Recover the active file size and highest sequence number
///
/// Listing failures yield the empty state; a missing directory simply means
/// nothing to resume.
pub fn resume_scan(dir: &Path, base: &str) -> ResumeState {
    let mut state = ResumeState::default();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "resume scan skipped");
            return state;
        }
    };

    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };

        if name == base {
            state.active_size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        }

        if name.starts_with(base)
            && let Some(sequence) = parse_sequence(name)
        {
            state.max_sequence = state.max_sequence.max(sequence);
        }
    }

    state
}

/// List one day's archives and partition them by retention
///
/// Entries named `{base}.{date}.*` are kept, except the active and staging
/// files. An archive whose sequence is at or above `retention - 2` is a
/// deletion candidate: after the shift it would leave no room for the active
/// file plus the new `000`.
///
/// # Errors
///
/// Returns `SinkError::Scan` if the directory cannot be listed.
pub fn rotation_scan(dir: &Path, base: &str, date: &str, retention: u32) -> Result<RotationScan> {
    let entries = fs::read_dir(dir).map_err(|e| SinkError::scan(dir, e))?;

    let staging = format!("{base}.{STAGING_SUFFIX}");
    let prefix = format!("{base}.{date}.");
    let limit = i64::from(retention) - 2;
    let mut scan = RotationScan::default();

    for entry in entries {
        let entry = entry.map_err(|e| SinkError::scan(dir, e))?;
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name == base || name == staging || !name.starts_with(&prefix) {
            continue;
        }
        let Some(sequence) = parse_sequence(name) else {
            continue;
        };

        if i64::from(sequence) >= limit {
            scan.delete.push(entry.path());
        } else {
            scan.renumber.push(ArchivedFile {
                path: entry.path(),
                sequence,
            });
        }
    }

    // read_dir order is unspecified; pair each file with its own number
    scan.renumber.sort_by_key(|f| f.sequence);
    scan.delete.sort();

    Ok(scan)
}

/// Parse the text after the final `.` as a sequence number
fn parse_sequence(name: &str) -> Option<u32> {
    let (_, ext) = name.rsplit_once('.')?;
    ext.parse().ok()
}

#[cfg(test)]
#[path = "scan_test.rs"]
mod scan_test;
