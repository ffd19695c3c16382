// SPDX-FileCopyrightText: 2026 Wordhoard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Time source used for due dates and timestamps.

use std::ops::Range;
use std::sync::Mutex;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveTime, Offset, TimeZone, Utc};

/// Timestamp format written to `created_at` / `updated_at` columns.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Source of "today" and "now".
///
/// Due dates are calendar days in the learner's local time zone; timestamps are UTC.
pub trait Clock: Send + Sync + 'static {
    /// The learner's current calendar day.
    fn today(&self) -> NaiveDate;

    /// The current instant.
    fn now(&self) -> DateTime<Utc>;

    /// The UTC instants spanning the learner's current calendar day.
    fn today_bounds(&self) -> Range<DateTime<Utc>>;

    /// The current instant formatted for storage.
    fn timestamp(&self) -> String {
        self.now().format(TIMESTAMP_FORMAT).to_string()
    }
}

/// `[midnight, next midnight)` of `day` in `zone`, as UTC.
///
/// A midnight skipped by a DST jump falls back to the offset at noon.
fn day_bounds<Tz: TimeZone>(zone: &Tz, day: NaiveDate) -> Range<DateTime<Utc>> {
    let start_of = |d: NaiveDate| {
        let midnight = d.and_time(NaiveTime::MIN);
        match zone.from_local_datetime(&midnight).earliest() {
            Some(t) => t.with_timezone(&Utc),
            None => {
                let noon = zone
                    .from_local_datetime(&d.and_hms_opt(12, 0, 0).unwrap_or(midnight))
                    .earliest()
                    .map(|t| t.offset().fix().local_minus_utc())
                    .unwrap_or(0);
                (midnight - chrono::Duration::seconds(i64::from(noon))).and_utc()
            }
        }
    };
    let start = start_of(day);
    let end = day
        .succ_opt()
        .map(start_of)
        .unwrap_or(start + chrono::Duration::days(1));
    start..end
}

/// Wall clock backed by the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today_bounds(&self) -> Range<DateTime<Utc>> {
        day_bounds(&Local, self.today())
    }
}

/// Manually driven clock for tests.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
    offset: FixedOffset,
}

impl FixedClock {
    /// Create a clock pinned to midday UTC on `date`.
    pub fn on(date: NaiveDate) -> Self {
        let noon = date
            .and_hms_opt(12, 0, 0)
            .unwrap_or_default()
            .and_utc();
        Self::at(noon)
    }

    /// Create a clock pinned to `now`, with the learner in UTC.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
            offset: Utc.fix(),
        }
    }

    /// Place the learner at `offset` from UTC; `today()` follows it.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Move the clock forward by whole days.
    pub fn advance_days(&self, days: i64) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += chrono::Duration::days(days);
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.now().with_timezone(&self.offset).date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn today_bounds(&self) -> Range<DateTime<Utc>> {
        day_bounds(&self.offset, self.today())
    }
}
