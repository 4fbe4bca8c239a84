use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, NaiveDate, Utc};

use crate::attendance::employee::{AttendanceEvent, AttendanceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anomaly {
    DoubleArrival { at: DateTime<Utc> },
    LeaveWithoutArrival { at: DateTime<Utc> },
    MissingLeave { arrived_at: DateTime<Utc> },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::DoubleArrival { at } => write!(f, "ARRIVED at {at} while already arrived"),
            Anomaly::LeaveWithoutArrival { at } => write!(f, "LEFT at {at} without ARRIVED"),
            Anomaly::MissingLeave { arrived_at } => {
                write!(f, "ARRIVED at {arrived_at} never followed by LEFT")
            }
        }
    }
}

/// Replays one day's events and reports the first inconsistency, if any.
pub fn detect_day_anomaly(events: &[AttendanceEvent]) -> Option<Anomaly> {
    let mut open: Option<DateTime<Utc>> = None;

    for event in events {
        match event.kind {
            AttendanceKind::Arrived => {
                if open.is_some() {
                    return Some(Anomaly::DoubleArrival {
                        at: event.timestamp,
                    });
                }
                open = Some(event.timestamp);
            }
            AttendanceKind::Left => {
                if open.take().is_none() {
                    return Some(Anomaly::LeaveWithoutArrival {
                        at: event.timestamp,
                    });
                }
            }
            AttendanceKind::BreakStart | AttendanceKind::BreakEnd => {}
        }
    }

    open.map(|arrived_at| Anomaly::MissingLeave { arrived_at })
}

/// First anomalous day in ascending date order.
pub fn first_week_anomaly(
    buckets: &BTreeMap<NaiveDate, Vec<AttendanceEvent>>,
) -> Option<(NaiveDate, Anomaly)> {
    buckets
        .iter()
        .find_map(|(date, events)| detect_day_anomaly(events).map(|anomaly| (*date, anomaly)))
}
