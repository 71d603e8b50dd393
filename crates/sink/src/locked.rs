//! Shared sink
//!
//! `RotatingSink` does no locking of its own. `LockedSink` puts it behind a
//! mutex so several threads can append, and plugs it into
//! `tracing_subscriber` as a `MakeWriter`.
//!
//! Each `write` call takes the lock once, so a formatted event written in a
//! single call is never interleaved with another thread's bytes.
//!
//! The sink logs through `tracing` itself (target `rotalog_sink`). A
//! subscriber layer that writes into a `LockedSink` must filter that target
//! out, or a rotation log line would try to take the lock it already holds.

use std::io;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tracing_subscriber::fmt::MakeWriter;

use crate::error::Result;
use crate::metrics::SinkMetricsHandle;
use crate::sink::RotatingSink;

/// Cloneable, thread-safe handle to a `RotatingSink`
#[derive(Clone)]
pub struct LockedSink {
    inner: Arc<Mutex<RotatingSink>>,
    metrics: SinkMetricsHandle,
}

impl LockedSink {
    pub fn new(sink: RotatingSink) -> Self {
        let metrics = sink.metrics_handle();
        Self {
            inner: Arc::new(Mutex::new(sink)),
            metrics,
        }
    }

    /// Exclusive access to the sink
    pub fn lock(&self) -> MutexGuard<'_, RotatingSink> {
        self.inner.lock()
    }

    /// Append under the lock
    pub fn append(&self, payload: &[u8]) -> Result<usize> {
        self.inner.lock().append(payload)
    }

    /// Flush under the lock
    pub fn sync(&self) -> Result<()> {
        self.inner.lock().sync()
    }

    /// Metrics readable without taking the lock
    pub fn metrics_handle(&self) -> SinkMetricsHandle {
        self.metrics.clone()
    }
}

impl io::Write for LockedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.append(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(self.sync()?)
    }
}

/// Writer handed out per event by `MakeWriter`
pub struct LockedSinkWriter<'a> {
    sink: &'a Mutex<RotatingSink>,
}

impl io::Write for LockedSinkWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.sink.lock().append(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(self.sink.lock().sync()?)
    }
}

impl<'a> MakeWriter<'a> for LockedSink {
    type Writer = LockedSinkWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LockedSinkWriter { sink: &self.inner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::options::SinkOptions;
    use std::fs;
    use std::io::Write;
    use std::thread;
    use tempfile::TempDir;
    use tracing_subscriber::layer::SubscriberExt;

    fn locked(dir: &TempDir, rotate_size_mb: i64) -> LockedSink {
        let options = SinkOptions::new(dir.path().join("try.log")).with_rotate_size_mb(rotate_size_mb);
        let clock = ManualClock::at(2024, 1, 1, 12, 0, 0).unwrap();
        LockedSink::new(RotatingSink::open_with_clock(options, clock).unwrap())
    }

    #[test]
    fn test_concurrent_appends_keep_records_whole() {
        let dir = TempDir::new().unwrap();
        let sink = locked(&dir, 0);

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let sink = sink.clone();
                thread::spawn(move || {
                    for i in 0..250 {
                        sink.append(format!("thread-{t} record-{i}\n").as_bytes())
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        sink.sync().unwrap();

        let contents = fs::read_to_string(dir.path().join("try.log")).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 1000);
        assert!(lines.iter().all(|l| l.starts_with("thread-") && l.contains(" record-")));
        assert_eq!(sink.metrics_handle().snapshot().writes, 1000);
    }

    #[test]
    fn test_concurrent_rotation_loses_nothing() {
        let dir = TempDir::new().unwrap();
        let sink = locked(&dir, 1);
        let record = vec![b'r'; 100 * 1024];

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let sink = sink.clone();
                let record = record.clone();
                thread::spawn(move || {
                    for _ in 0..10 {
                        sink.append(&record).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        sink.sync().unwrap();

        let total: u64 = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().metadata().unwrap().len())
            .sum();
        assert_eq!(total, 40 * 100 * 1024);
        assert!(sink.metrics_handle().snapshot().size_rotations >= 3);
    }

    #[test]
    fn test_io_write_through_clone() {
        let dir = TempDir::new().unwrap();
        let mut sink = locked(&dir, 0);

        writeln!(sink, "via io::Write").unwrap();
        sink.flush().unwrap();

        let contents = fs::read_to_string(dir.path().join("try.log")).unwrap();
        assert_eq!(contents, "via io::Write\n");
        assert_eq!(sink.lock().current_size(), 14);
    }

    #[test]
    fn test_make_writer_for_fmt_layer() {
        let dir = TempDir::new().unwrap();
        let sink = locked(&dir, 0);

        let layer = tracing_subscriber::fmt::layer()
            .with_writer(sink.clone())
            .with_ansi(false)
            .with_target(false);
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(record = 1, "hello from tracing");
        });
        sink.sync().unwrap();

        let contents = fs::read_to_string(dir.path().join("try.log")).unwrap();
        assert!(contents.contains("hello from tracing"));
        assert!(contents.contains("record=1"));
    }
}
