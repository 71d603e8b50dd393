//! End-to-end rotation scenarios through the public API

use std::fs;
use std::path::Path;

use chrono::TimeDelta;
use rotalog_sink::{LockedSink, ManualClock, RotatingSink, SinkOptions};
use tempfile::TempDir;

const PAYLOAD: usize = 2_000_000;

fn names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn first_byte(path: impl AsRef<Path>) -> u8 {
    fs::read(path).unwrap()[0]
}

fn try_log(dir: &TempDir, clock: &ManualClock) -> RotatingSink {
    let options = SinkOptions::new(dir.path().join("try.log"))
        .with_rotate_size_mb(1)
        .with_max_file_number_per_day(3);
    RotatingSink::open_with_clock(options, clock.clone()).unwrap()
}

#[test]
fn test_three_overflowing_writes_with_retention_three() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::at(2024, 1, 1, 9, 30, 0).unwrap();
    let mut sink = try_log(&dir, &clock);

    // 0 + 2,000,000 > 1,048,576: the empty active file becomes 000
    sink.append(&vec![b'1'; PAYLOAD]).unwrap();
    sink.sync().unwrap();
    assert_eq!(names(dir.path()), vec!["try.log", "try.log.2024-01-01.000"]);
    assert_eq!(fs::metadata(dir.path().join("try.log.2024-01-01.000")).unwrap().len(), 0);
    assert_eq!(fs::metadata(dir.path().join("try.log")).unwrap().len(), PAYLOAD as u64);

    // 000 shifts to 001, the first payload becomes 000
    sink.append(&vec![b'2'; PAYLOAD]).unwrap();
    sink.sync().unwrap();
    assert_eq!(
        names(dir.path()),
        vec!["try.log", "try.log.2024-01-01.000", "try.log.2024-01-01.001"]
    );
    assert_eq!(first_byte(dir.path().join("try.log.2024-01-01.000")), b'1');

    // 001 sits on the retention boundary and is deleted instead of shifted
    sink.append(&vec![b'3'; PAYLOAD]).unwrap();
    sink.sync().unwrap();
    assert_eq!(
        names(dir.path()),
        vec!["try.log", "try.log.2024-01-01.000", "try.log.2024-01-01.001"]
    );
    assert_eq!(first_byte(dir.path().join("try.log")), b'3');
    assert_eq!(first_byte(dir.path().join("try.log.2024-01-01.000")), b'2');
    assert_eq!(first_byte(dir.path().join("try.log.2024-01-01.001")), b'1');

    let snapshot = sink.metrics_handle().snapshot();
    assert_eq!(snapshot.size_rotations, 3);
    assert_eq!(snapshot.housekeeping_errors, 0);
}

#[test]
fn test_restart_continues_where_it_left_off() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::at(2024, 1, 1, 9, 30, 0).unwrap();

    {
        let mut sink = try_log(&dir, &clock);
        sink.append(&vec![b'a'; PAYLOAD]).unwrap();
        sink.append(b"tail").unwrap();
    }

    let mut sink = try_log(&dir, &clock);
    assert_eq!(sink.current_size(), 4);
    assert_eq!(sink.current_sequence_number(), 2);

    sink.append(b"+more").unwrap();
    sink.sync().unwrap();
    assert_eq!(fs::read(dir.path().join("try.log")).unwrap(), b"tail+more");
}

#[test]
fn test_day_change_starts_a_fresh_retention_window() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::at(2024, 1, 1, 23, 0, 0).unwrap();
    let mut sink = try_log(&dir, &clock);

    for _ in 0..4 {
        sink.append(&vec![b'x'; PAYLOAD]).unwrap();
    }
    clock.advance(TimeDelta::hours(2));
    sink.append(b"after midnight").unwrap();
    sink.sync().unwrap();

    assert_eq!(
        names(dir.path()),
        vec![
            "try.log",
            "try.log.2024-01-01.000",
            "try.log.2024-01-01.001",
            "try.log.2024-01-02.000",
        ]
    );
    assert_eq!(fs::read(dir.path().join("try.log")).unwrap(), b"after midnight");

    let snapshot = sink.metrics_handle().snapshot();
    assert_eq!(snapshot.midnight_rotations, 1);
    assert_eq!(snapshot.size_rotations, 4);
}

#[test]
fn test_shared_sink_across_threads() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::at(2024, 1, 1, 9, 30, 0).unwrap();
    let shared = LockedSink::new(try_log(&dir, &clock));

    let handles: Vec<_> = (0..2)
        .map(|t| {
            let shared = shared.clone();
            std::thread::spawn(move || {
                for i in 0..100 {
                    shared.append(format!("test...{t}.{i}\n").as_bytes()).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    shared.sync().unwrap();

    let contents = fs::read_to_string(dir.path().join("try.log")).unwrap();
    assert_eq!(contents.lines().count(), 200);
    assert_eq!(shared.metrics_handle().snapshot().rotations, 0);
}
