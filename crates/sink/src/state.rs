//! Active file state
//!
//! The mutable record of the file currently being appended to. Owned by
//! exactly one `RotatingSink`; the rotation executor closes and replaces the
//! writer in place.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};

use crate::error::{Result, SinkError};
use crate::path::ResolvedPath;

pub(crate) struct ActiveFileState {
    pub(crate) path: ResolvedPath,
    pub(crate) retention_limit: u32,
    /// Sequence the next archive derived from the active file would get
    pub(crate) current_sequence_number: u32,
    pub(crate) current_size: u64,
    pub(crate) writer: Option<BufWriter<File>>,
    buffer_size: usize,
}

impl ActiveFileState {
    /// Open the active file for appending, creating it if needed
    pub(crate) fn open(
        path: ResolvedPath,
        retention_limit: u32,
        current_sequence_number: u32,
        current_size: u64,
        buffer_size: usize,
    ) -> Result<Self> {
        let mut state = Self {
            path,
            retention_limit,
            current_sequence_number,
            current_size,
            writer: None,
            buffer_size,
        };
        state.reopen()?;
        Ok(state)
    }

    /// Replace the writer with a fresh one on the active path
    pub(crate) fn reopen(&mut self) -> Result<()> {
        self.writer = Some(self.open_writer()?);
        Ok(())
    }

    /// Writer for the active file, reopening it if a previous attempt failed
    pub(crate) fn writer(&mut self) -> Result<&mut BufWriter<File>> {
        let writer = match self.writer.take() {
            Some(writer) => writer,
            None => {
                tracing::debug!(path = %self.path.path().display(), "reopening active file");
                self.open_writer()?
            }
        };
        Ok(self.writer.insert(writer))
    }

    /// Open the active path for appending
    ///
    /// Never truncates: if the previous file could not be moved away, its
    /// contents are kept and appended to.
    fn open_writer(&self) -> Result<BufWriter<File>> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path.path())
            .map_err(|e| SinkError::create(self.path.path(), e))?;

        Ok(BufWriter::with_capacity(self.buffer_size, file))
    }

    /// Flush buffered bytes into the file
    pub(crate) fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}
