//! Wall clock abstraction
//!
//! Rotation decisions are made against local time. `SystemClock` reads the
//! real clock; `ManualClock` is a shared, settable clock for tests and
//! replays.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveTime, TimeDelta, TimeZone};
use parking_lot::Mutex;

/// Date format used in archive names
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of local wall-clock time
pub trait Clock: Send {
    /// Current local time
    fn now(&self) -> DateTime<Local>;
}

/// Real local clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock that only moves when told to
///
/// Clones share the same time, so a test can keep one handle and give the
/// other to the sink.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Local>>>,
}

impl ManualClock {
    /// Create a clock fixed at `now`
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Create a clock at the given local date and time
    ///
    /// Returns `None` if the local time does not exist (DST gap) or the
    /// fields are out of range.
    pub fn at(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Option<Self> {
        Local
            .with_ymd_and_hms(year, month, day, hour, min, sec)
            .earliest()
            .map(Self::new)
    }

    /// Jump to `now`
    pub fn set(&self, now: DateTime<Local>) {
        *self.now.lock() = now;
    }

    /// Move forward by `delta`
    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock();
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock()
    }
}

/// First instant of the local day after `now`
///
/// When midnight itself is skipped by a DST transition, the first valid
/// instant after it is used instead.
pub fn next_midnight(now: DateTime<Local>) -> DateTime<Local> {
    let Some(tomorrow) = now.date_naive().succ_opt() else {
        return now + TimeDelta::days(1);
    };

    let midnight = tomorrow.and_time(NaiveTime::MIN);
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            Local
                .from_local_datetime(&(midnight + TimeDelta::hours(1)))
                .earliest()
        })
        .unwrap_or_else(|| now + TimeDelta::days(1))
}

/// `YYYY-MM-DD` for `now`
pub fn date_string(now: DateTime<Local>) -> String {
    now.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_next_midnight_is_start_of_next_day() {
        let now = Local.with_ymd_and_hms(2024, 1, 1, 15, 30, 0).unwrap();
        let midnight = next_midnight(now);

        assert_eq!(midnight.day(), 2);
        assert_eq!(midnight.hour(), 0);
        assert_eq!(midnight.minute(), 0);
        assert_eq!(midnight.second(), 0);
    }

    #[test]
    fn test_next_midnight_from_midnight_moves_a_full_day() {
        let now = Local.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let midnight = next_midnight(now);

        assert_eq!(midnight.date_naive().to_string(), "2024-01-03");
    }

    #[test]
    fn test_next_midnight_crosses_year() {
        let now = Local.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(date_string(next_midnight(now)), "2025-01-01");
    }

    #[test]
    fn test_date_string() {
        let now = Local.with_ymd_and_hms(2024, 3, 7, 8, 0, 0).unwrap();
        assert_eq!(date_string(now), "2024-03-07");
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::at(2024, 1, 1, 12, 0, 0).unwrap();
        let handle = clock.clone();

        handle.advance(TimeDelta::hours(13));
        assert_eq!(date_string(clock.now()), "2024-01-02");

        let later = Local.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        handle.set(later);
        assert_eq!(clock.now(), later);
    }
}
