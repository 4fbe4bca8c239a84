use std::path::Path;

use anyhow::Error;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::attendance::calendar::{day_window, local_date};
use crate::attendance::day_buckets::events_on_day;
use crate::attendance::employee::{
    AttendanceEvent, AttendanceKind, EmployeeWorkProfile, TodayOverview, TodayStatus,
};
use crate::attendance::snapshot::{load_snapshot, ReportOptions};

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DayEvents {
    pub employee_id: String,
    pub date: NaiveDate,
    pub events: Vec<AttendanceEvent>,
}

pub fn today_overview_from_json_file(
    path: &Path,
    options: &ReportOptions,
) -> Result<TodayOverview, Error> {
    let snapshot = load_snapshot(path, options)?;
    Ok(today_overview(
        &snapshot.profiles,
        &snapshot.events,
        snapshot.timezone,
        snapshot.reference,
    ))
}

pub fn day_events_from_json_file(
    path: &Path,
    employee_id: &str,
    date: NaiveDate,
    options: &ReportOptions,
) -> Result<DayEvents, Error> {
    let snapshot = load_snapshot(path, options)?;
    snapshot.profile(employee_id)?;

    Ok(DayEvents {
        employee_id: employee_id.to_string(),
        date,
        events: events_on_day(&snapshot.events_for(employee_id), date, snapshot.timezone),
    })
}

/// Where everyone stands on the local day containing `reference`, judged by
/// each employee's latest event that day.
pub fn today_overview(
    profiles: &[EmployeeWorkProfile],
    events: &[AttendanceEvent],
    tz: Tz,
    reference: DateTime<Utc>,
) -> TodayOverview {
    let date = local_date(reference, tz);
    let window = day_window(date, tz);

    let employees: Vec<TodayStatus> = profiles
        .iter()
        .map(|profile| {
            let today: Vec<&AttendanceEvent> = events
                .iter()
                .filter(|event| {
                    event.employee_id == profile.employee_id && window.contains(event.timestamp)
                })
                .collect();
            let last = today.iter().max_by_key(|event| event.timestamp);

            TodayStatus {
                employee_id: profile.employee_id.clone(),
                email: profile.email.clone(),
                name: profile.name.clone(),
                last_kind: last.map(|event| event.kind),
                last_at: last.map(|event| event.timestamp),
                events_today: today.len(),
            }
        })
        .collect();

    let mut overview = TodayOverview {
        date,
        total_employees: employees.len(),
        arrived: 0,
        left: 0,
        no_registration: 0,
        missing_checkout: 0,
        employees: vec![],
    };
    for status in &employees {
        match status.last_kind {
            None => overview.no_registration += 1,
            Some(AttendanceKind::Arrived) => {
                overview.arrived += 1;
                overview.missing_checkout += 1;
            }
            Some(AttendanceKind::Left) => overview.left += 1,
            Some(AttendanceKind::BreakStart | AttendanceKind::BreakEnd) => {}
        }
    }
    overview.employees = employees;

    overview
}
