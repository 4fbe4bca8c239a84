use std::{
    collections::{BTreeMap, HashMap},
    path::Path,
};

use anyhow::Error;
use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::attendance::calendar::{local_date, week_window, WeekWindow};
use crate::attendance::day_buckets::bucket_by_day;
use crate::attendance::employee::{
    AttendanceEvent, CompanyWeekReport, DaySummary, EmployeeWorkProfile, WeekDetail, WeekSummary,
    WeekTotals,
};
use crate::attendance::intervals::{gross_minutes, reconstruct_intervals};
use crate::attendance::snapshot::{load_snapshot, ReportOptions};
use crate::attendance::warnings::first_week_anomaly;

pub fn summarize_week_from_json_file(
    path: &Path,
    options: &ReportOptions,
) -> Result<CompanyWeekReport, Error> {
    let snapshot = load_snapshot(path, options)?;
    let window = week_window(snapshot.reference, snapshot.timezone);

    Ok(CompanyWeekReport {
        timezone: snapshot.timezone.name().to_string(),
        week_start: window.start,
        week_end: window.end,
        employees: summarize_company_week(
            &snapshot.profiles,
            &snapshot.events,
            snapshot.timezone,
            window,
        ),
    })
}

pub fn week_details_from_json_file(
    path: &Path,
    employee_id: &str,
    options: &ReportOptions,
) -> Result<WeekDetail, Error> {
    let snapshot = load_snapshot(path, options)?;
    let profile = snapshot.profile(employee_id)?;
    let window = week_window(snapshot.reference, snapshot.timezone);
    let events = events_in_window(snapshot.events_for(employee_id), window);

    Ok(summarize_week_details(
        profile,
        &events,
        snapshot.timezone,
        window,
    ))
}

/// Summarizes every profile, in input order, over the events inside `window`.
pub fn summarize_company_week(
    profiles: &[EmployeeWorkProfile],
    events: &[AttendanceEvent],
    tz: Tz,
    window: WeekWindow,
) -> Vec<WeekSummary> {
    let mut by_employee: HashMap<&str, Vec<AttendanceEvent>> = HashMap::new();
    for event in events.iter().filter(|event| window.contains(event.timestamp)) {
        by_employee
            .entry(event.employee_id.as_str())
            .or_default()
            .push(event.clone());
    }

    for employee_id in by_employee.keys() {
        if !profiles.iter().any(|profile| profile.employee_id == *employee_id) {
            warn!(%employee_id, "ignoring events for employee without a profile");
        }
    }

    profiles
        .iter()
        .map(|profile| {
            let mut employee_events = by_employee
                .remove(profile.employee_id.as_str())
                .unwrap_or_default();
            employee_events.sort_by_key(|event| event.timestamp);
            summarize_week(profile, &employee_events, tz)
        })
        .collect()
}

/// Week totals for one employee from a time ordered stream already limited to the week.
///
/// Gross time pairs events across the whole week, so a shift running past
/// local midnight counts in full. The break allowance is charged once per
/// local date that has at least one whole minute of work starting and ending
/// on that date, which is the same set of days the per-day breakdown charges.
pub fn summarize_week(
    profile: &EmployeeWorkProfile,
    events: &[AttendanceEvent],
    tz: Tz,
) -> WeekSummary {
    let scan = reconstruct_intervals(events);

    let mut same_day_ms: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for interval in &scan.intervals {
        let date = local_date(interval.start, tz);
        if local_date(interval.end, tz) == date {
            *same_day_ms.entry(date).or_default() +=
                (interval.end - interval.start).num_milliseconds();
        }
    }
    let worked_days = same_day_ms
        .values()
        .filter(|ms| gross_minutes(**ms) > 0)
        .count();

    let worked_minutes_gross = scan.gross_minutes();
    let break_minutes_deducted = profile.break_deduction_for_week(worked_days);
    let worked_minutes_net = worked_minutes_gross
        .saturating_sub(break_minutes_deducted)
        .max(0);
    let expected_minutes = profile.expected_minutes();
    let has_warnings = week_has_warnings(&profile.employee_id, events, tz);

    debug!(
        employee_id = %profile.employee_id,
        worked_days,
        worked_minutes_gross,
        worked_minutes_net,
        has_warnings,
        "summarized week"
    );

    WeekSummary {
        employee_id: profile.employee_id.clone(),
        email: profile.email.clone(),
        name: profile.name.clone(),
        expected_minutes,
        worked_minutes_gross,
        break_minutes_deducted,
        worked_minutes_net,
        delta_minutes: worked_minutes_net.saturating_sub(expected_minutes),
        has_warnings,
    }
}

/// Day by day breakdown for one employee, dates ascending.
pub fn summarize_week_details(
    profile: &EmployeeWorkProfile,
    events: &[AttendanceEvent],
    tz: Tz,
    window: WeekWindow,
) -> WeekDetail {
    let buckets = bucket_by_day(events, tz);

    let days: Vec<DaySummary> = buckets
        .iter()
        .map(|(date, day_events)| summarize_day(profile, *date, day_events))
        .collect();

    let mut totals = WeekTotals {
        expected_minutes: profile.expected_minutes(),
        ..Default::default()
    };
    for day in &days {
        totals.worked_minutes_gross = totals
            .worked_minutes_gross
            .saturating_add(day.worked_minutes_gross);
        totals.break_minutes_deducted = totals
            .break_minutes_deducted
            .saturating_add(day.break_minutes_deducted);
        totals.worked_minutes_net = totals
            .worked_minutes_net
            .saturating_add(day.worked_minutes_net);
    }
    totals.delta_minutes = totals
        .worked_minutes_net
        .saturating_sub(totals.expected_minutes);

    WeekDetail {
        employee_id: profile.employee_id.clone(),
        week_start: window.start,
        week_end: window.end,
        days,
        totals,
        has_warnings: week_has_warnings(&profile.employee_id, events, tz),
    }
}

pub fn summarize_day(
    profile: &EmployeeWorkProfile,
    date: NaiveDate,
    events: &[AttendanceEvent],
) -> DaySummary {
    let scan = reconstruct_intervals(events);
    if let Some(open_start) = scan.open_start {
        debug!(
            employee_id = %profile.employee_id,
            %date,
            %open_start,
            "day ends with an open arrival"
        );
    }

    let worked_minutes_gross = scan.gross_minutes();
    let break_minutes_deducted = profile.break_deduction_for_day(worked_minutes_gross);

    DaySummary {
        date,
        worked_minutes_gross,
        break_minutes_deducted,
        worked_minutes_net: worked_minutes_gross
            .saturating_sub(break_minutes_deducted)
            .max(0),
        intervals: scan.intervals,
        events_count: events.len(),
    }
}

fn week_has_warnings(employee_id: &str, events: &[AttendanceEvent], tz: Tz) -> bool {
    match first_week_anomaly(&bucket_by_day(events, tz)) {
        Some((date, anomaly)) => {
            warn!(%employee_id, %date, %anomaly, "attendance anomaly");
            true
        }
        None => false,
    }
}

fn events_in_window(mut events: Vec<AttendanceEvent>, window: WeekWindow) -> Vec<AttendanceEvent> {
    events.retain(|event| window.contains(event.timestamp));
    events
}
