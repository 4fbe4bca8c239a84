use chrono::{DateTime, Datelike, Days, LocalResult, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

use crate::attendance::error::AttendanceError;

/// Half-open range `[start, end)` of absolute instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl WeekWindow {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

pub fn parse_timezone(name: &str) -> Result<Tz, AttendanceError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| AttendanceError::InvalidTimezone(name.to_string()))
}

pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// First instant of `date` in `tz`. When midnight falls inside a DST gap the
/// day starts at the first local time after the gap.
pub fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let mut local = date.and_time(NaiveTime::MIN);
    loop {
        match tz.from_local_datetime(&local) {
            LocalResult::Single(dt) => return dt.to_utc(),
            LocalResult::Ambiguous(earliest, _) => return earliest.to_utc(),
            LocalResult::None => local += TimeDelta::minutes(15),
        }
    }
}

/// Monday 00:00 local of the week containing `reference`, through the local
/// midnight seven calendar days later.
pub fn week_window(reference: DateTime<Utc>, tz: Tz) -> WeekWindow {
    let today = local_date(reference, tz);
    let monday = today - Days::new(today.weekday().num_days_from_monday() as u64);

    WeekWindow {
        start: local_midnight(monday, tz),
        end: local_midnight(monday + Days::new(7), tz),
    }
}

pub fn day_window(date: NaiveDate, tz: Tz) -> WeekWindow {
    WeekWindow {
        start: local_midnight(date, tz),
        end: local_midnight(date + Days::new(1), tz),
    }
}
