//! Rotation executor
//!
//! The filesystem choreography of a rotation, run synchronously inside the
//! write that triggered it:
//!
//! ```text
//! 1. flush + close active         B
//! 2. rename active -> staging     B -> B.tmp
//! 3. open fresh active            B (empty)
//! 4. scan today's archives        B.DATE.NNN
//! 5. delete overflow              NNN >= retention - 2
//! 6. shift the rest, highest first  NNN -> NNN+1
//! 7. promote staging              B.tmp -> B.DATE.000
//! ```
//!
//! Only step 3 can fail the write. Everything else is best effort and goes
//! through `Housekeeping`. The staging file is promoted even when step 3
//! fails. A staging file that could not be promoted is retried at the next
//! rotation and, while it stays, blocks step 2: the active file keeps
//! growing instead of overwriting it.
//!
//! Steps 4-7 also run at startup when a staging file survived a crash.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::error::{HousekeepingOp, Result, SinkError};
use crate::housekeeping::Housekeeping;
use crate::path::ResolvedPath;
use crate::scan::{self, RotationScan};
use crate::state::ActiveFileState;

/// What happened to the staging file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StagingOutcome {
    /// Renamed to sequence `000`
    Promoted,
    /// Removed because retention leaves no room for archives
    Discarded,
    /// Rename or removal failed, the staging file is still there
    Left,
}

pub(crate) struct RotationExecutor<'a> {
    housekeeping: &'a Housekeeping,
}

impl<'a> RotationExecutor<'a> {
    pub(crate) fn new(housekeeping: &'a Housekeeping) -> Self {
        Self { housekeeping }
    }

    /// Archive the active file and open a fresh one
    ///
    /// A staging file left by an earlier failed promotion is promoted first.
    /// If it is still there afterwards the active file is not staged and
    /// keeps being appended to, with `current_size` taken from disk.
    ///
    /// # Errors
    ///
    /// Returns `SinkError::Create` if the fresh active file cannot be opened.
    /// The sink then has no writer until a later write manages to reopen it.
    pub(crate) fn rotate(&self, state: &mut ActiveFileState, date: &str) -> Result<()> {
        if let Some(mut writer) = state.writer.take()
            && let Err(e) = writer.flush()
        {
            self.report(HousekeepingOp::Flush, state.path.path(), e);
        }

        let staging = state.path.staging_path();
        if staging.is_file() {
            self.promote_staging(&state.path, state.retention_limit, date);
        }

        let staged = if staging.exists() {
            let occupied = io::Error::new(
                io::ErrorKind::AlreadyExists,
                "staging file from an earlier rotation is still present",
            );
            self.report(HousekeepingOp::Stage, &staging, occupied);
            false
        } else {
            match fs::rename(state.path.path(), &staging) {
                Ok(()) => true,
                Err(e) => {
                    self.report(HousekeepingOp::Stage, state.path.path(), e);
                    false
                }
            }
        };

        let reopened = state.reopen();

        if staged {
            state.current_size = 0;
            self.promote_staging(&state.path, state.retention_limit, date);
            state.current_sequence_number = state.current_sequence_number.saturating_add(1);
        } else if let Ok(metadata) = fs::metadata(state.path.path()) {
            // the active file was kept, so its contents still count
            state.current_size = metadata.len();
        }

        reopened
    }

    /// Make room in today's archives and move the staging file into them
    pub(crate) fn promote_staging(
        &self,
        path: &ResolvedPath,
        retention_limit: u32,
        date: &str,
    ) -> StagingOutcome {
        let scan = match scan::rotation_scan(path.dir(), path.base(), date, retention_limit) {
            Ok(scan) => scan,
            Err(e) => {
                self.housekeeping.report(e);
                RotationScan::default()
            }
        };

        for victim in &scan.delete {
            match fs::remove_file(victim) {
                Ok(()) => tracing::debug!(path = %victim.display(), "deleted archive past retention"),
                Err(e) => self.report(HousekeepingOp::Delete, victim, e),
            }
        }

        // Highest first so a target name is always already free
        for archived in scan.renumber.iter().rev() {
            let target = path.archive_path(date, archived.sequence + 1);
            if let Err(e) = fs::rename(&archived.path, &target) {
                self.report(HousekeepingOp::Renumber, &archived.path, e);
            }
        }

        let staging = path.staging_path();
        if retention_limit <= 1 {
            return match fs::remove_file(&staging) {
                Ok(()) => StagingOutcome::Discarded,
                Err(e) => {
                    self.report(HousekeepingOp::Discard, &staging, e);
                    StagingOutcome::Left
                }
            };
        }

        let newest = path.archive_path(date, 0);
        match fs::rename(&staging, &newest) {
            Ok(()) => {
                tracing::debug!(
                    archive = %newest.display(),
                    shifted = scan.renumber.len(),
                    deleted = scan.delete.len(),
                    "staging file promoted"
                );
                StagingOutcome::Promoted
            }
            Err(e) => {
                self.report(HousekeepingOp::Promote, &staging, e);
                StagingOutcome::Left
            }
        }
    }

    fn report(&self, operation: HousekeepingOp, path: &Path, source: io::Error) {
        self.housekeeping
            .report(SinkError::housekeeping(operation, path, source));
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod executor_test;
