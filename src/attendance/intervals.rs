use chrono::{DateTime, Utc};
use tracing::warn;

use crate::attendance::employee::{AttendanceEvent, AttendanceKind, WorkInterval};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct IntervalScan {
    pub intervals: Vec<WorkInterval>,
    pub gross_ms: i64,
    /// Start of an ARRIVED that never saw a matching LEFT.
    pub open_start: Option<DateTime<Utc>>,
}

impl IntervalScan {
    pub fn gross_minutes(&self) -> i64 {
        gross_minutes(self.gross_ms)
    }
}

/// Whole minutes worked, truncated.
pub fn gross_minutes(gross_ms: i64) -> i64 {
    gross_ms.max(0) / 60_000
}

/// Pairs every ARRIVED with the next LEFT.
///
/// A LEFT with nothing open and a trailing ARRIVED both contribute nothing.
/// Break events are ignored; breaks are deducted as a flat daily allowance.
pub fn reconstruct_intervals(events: &[AttendanceEvent]) -> IntervalScan {
    let mut scan = IntervalScan::default();

    for event in events {
        match event.kind {
            AttendanceKind::Arrived => match scan.open_start {
                Some(open) => {
                    scan.open_start = Some(reopen_on_double_arrival(event, open));
                }
                None => scan.open_start = Some(event.timestamp),
            },
            AttendanceKind::Left => {
                if let Some(start) = scan.open_start.take() {
                    if event.timestamp > start {
                        scan.gross_ms += (event.timestamp - start).num_milliseconds();
                        scan.intervals.push(WorkInterval {
                            start,
                            end: event.timestamp,
                        });
                    }
                }
            }
            AttendanceKind::BreakStart | AttendanceKind::BreakEnd => {}
        }
    }

    scan
}

/// A second ARRIVED while one is open replaces the open start; the time since
/// the first ARRIVED is dropped. Historical totals depend on this.
pub fn reopen_on_double_arrival(event: &AttendanceEvent, open: DateTime<Utc>) -> DateTime<Utc> {
    warn!(
        employee_id = %event.employee_id,
        discarded_start = %open,
        new_start = %event.timestamp,
        "ARRIVED while already arrived; discarding the open start"
    );
    event.timestamp
}
