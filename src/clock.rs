//! Wall clock used for timestamps and for deciding which calendar day is
//! "today". Days are UTC days, formatted `YYYY-MM-DD`.

use std::sync::Mutex;

use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime};

const DAY_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIME_OF_DAY_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]");

pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;

    fn today(&self) -> Date {
        self.now().date()
    }
}

/// Current UTC time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Clock pinned to a settable instant, for tests and replays.
#[derive(Debug)]
pub struct FixedClock(Mutex<OffsetDateTime>);

impl FixedClock {
    pub fn new(at: OffsetDateTime) -> Self {
        Self(Mutex::new(at))
    }

    pub fn set(&self, at: OffsetDateTime) {
        if let Ok(mut guard) = self.0.lock() {
            *guard = at;
        }
    }

    pub fn advance(&self, by: time::Duration) {
        if let Ok(mut guard) = self.0.lock() {
            *guard += by;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        match self.0.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Bucket key for a calendar day, e.g. `2026-10-17`.
pub fn day_key(date: Date) -> String {
    // formatting a Date with a date-only description cannot fail
    date.format(DAY_FORMAT).unwrap_or_else(|_| date.to_string())
}

pub fn parse_day_key(key: &str) -> Option<Date> {
    Date::parse(key, DAY_FORMAT).ok()
}

/// Clock time shown next to a meal, e.g. `08:05`.
pub fn time_of_day(at: OffsetDateTime) -> String {
    at.format(TIME_OF_DAY_FORMAT)
        .unwrap_or_else(|_| format!("{:02}:{:02}", at.hour(), at.minute()))
}

pub fn weekday_short(date: Date) -> &'static str {
    use time::Weekday::*;
    match date.weekday() {
        Monday => "Mon",
        Tuesday => "Tue",
        Wednesday => "Wed",
        Thursday => "Thu",
        Friday => "Fri",
        Saturday => "Sat",
        Sunday => "Sun",
    }
}
