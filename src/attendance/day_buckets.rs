use std::collections::BTreeMap;

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::attendance::calendar::local_date;
use crate::attendance::employee::AttendanceEvent;

/// Groups one employee's time ordered events by local calendar date.
///
/// Dates come out ascending and events keep their input order within a date.
/// Dates without events are absent.
pub fn bucket_by_day(
    events: &[AttendanceEvent],
    tz: Tz,
) -> BTreeMap<NaiveDate, Vec<AttendanceEvent>> {
    let mut buckets: BTreeMap<NaiveDate, Vec<AttendanceEvent>> = BTreeMap::new();
    for event in events {
        buckets
            .entry(local_date(event.timestamp, tz))
            .or_default()
            .push(event.clone());
    }
    buckets
}

pub fn events_on_day(events: &[AttendanceEvent], date: NaiveDate, tz: Tz) -> Vec<AttendanceEvent> {
    events
        .iter()
        .filter(|event| local_date(event.timestamp, tz) == date)
        .cloned()
        .collect()
}
