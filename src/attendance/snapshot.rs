use std::{collections::HashSet, io::BufReader, path::Path, str::FromStr};

use anyhow::{Context, Error};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::info;

use crate::attendance::calendar::parse_timezone;
use crate::attendance::employee::{
    AttendanceEvent, AttendanceKind, EmployeeWorkProfile, RawAttendanceEvent, RawEmployeeProfile,
};
use crate::attendance::error::AttendanceError;

/// A week has 168 hours and a day 1440 minutes.
pub const MAX_WEEKLY_HOURS: f64 = 168.;
pub const MAX_BREAK_MINUTES_PER_DAY: f64 = 1440.;

/// Attendance data as exported by the punch clock backend.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RawAttendanceSnapshot {
    pub timezone: Option<String>,
    pub reference_instant: Option<String>,
    #[serde(default)]
    pub employees: Vec<RawEmployeeProfile>,
    #[serde(default)]
    pub events: Vec<RawAttendanceEvent>,
}

/// How the caller wants the snapshot interpreted. Explicit values win over
/// what the snapshot carries.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub timezone: Option<String>,
    pub default_timezone: String,
    pub reference: Option<DateTime<Utc>>,
    pub now: DateTime<Utc>,
}

#[derive(Debug)]
pub struct AttendanceSnapshot {
    pub timezone: Tz,
    pub reference: DateTime<Utc>,
    pub profiles: Vec<EmployeeWorkProfile>,
    /// Ascending by timestamp.
    pub events: Vec<AttendanceEvent>,
}

impl AttendanceSnapshot {
    pub fn profile(&self, employee_id: &str) -> Result<&EmployeeWorkProfile, AttendanceError> {
        self.profiles
            .iter()
            .find(|profile| profile.employee_id == employee_id)
            .ok_or_else(|| AttendanceError::UnknownEmployee(employee_id.to_string()))
    }

    pub fn events_for(&self, employee_id: &str) -> Vec<AttendanceEvent> {
        self.events
            .iter()
            .filter(|event| event.employee_id == employee_id)
            .cloned()
            .collect()
    }
}

pub fn load_snapshot(path: &Path, options: &ReportOptions) -> Result<AttendanceSnapshot, Error> {
    let raw = read_snapshot(path)?;
    let snapshot = validate_snapshot(raw, options)?;

    info!(
        path = %path.display(),
        timezone = snapshot.timezone.name(),
        reference = %snapshot.reference,
        employees = snapshot.profiles.len(),
        events = snapshot.events.len(),
        "loaded attendance snapshot"
    );

    Ok(snapshot)
}

fn read_snapshot(path: &Path) -> Result<RawAttendanceSnapshot, Error> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.to_string_lossy()))?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse attendance snapshot: {}", path.display()))
}

pub fn validate_snapshot(
    raw: RawAttendanceSnapshot,
    options: &ReportOptions,
) -> Result<AttendanceSnapshot, Error> {
    let timezone_name = options
        .timezone
        .as_deref()
        .or(raw.timezone.as_deref())
        .unwrap_or(&options.default_timezone);
    let timezone = parse_timezone(timezone_name)?;

    let reference = match (options.reference, raw.reference_instant.as_deref()) {
        (Some(reference), _) => reference,
        (None, Some(instant)) => parse_instant(instant).context("invalid referenceInstant")?,
        (None, None) => options.now,
    };

    let profiles = raw
        .employees
        .iter()
        .map(|profile| {
            validate_profile(profile).with_context(|| format!("invalid employee: {:?}", profile))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen = HashSet::new();
    if let Some(duplicate) = profiles
        .iter()
        .find(|profile| !seen.insert(profile.employee_id.as_str()))
    {
        return Err(AttendanceError::DuplicateEmployee(duplicate.employee_id.clone()).into());
    }

    let mut events = raw
        .events
        .iter()
        .map(|event| {
            validate_event(event).with_context(|| format!("invalid event: {:?}", event))
        })
        .collect::<Result<Vec<_>, _>>()?;
    events.sort_by_key(|event| event.timestamp);

    Ok(AttendanceSnapshot {
        timezone,
        reference,
        profiles,
        events,
    })
}

pub fn parse_instant(value: &str) -> Result<DateTime<Utc>, AttendanceError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|instant| instant.to_utc())
        .map_err(|_| AttendanceError::InvalidTimestamp(value.to_string()))
}

pub fn validate_event(event: &RawAttendanceEvent) -> Result<AttendanceEvent, AttendanceError> {
    Ok(AttendanceEvent {
        employee_id: event.employee_id.clone(),
        kind: AttendanceKind::from_str(event.kind.trim())
            .map_err(|_| AttendanceError::UnknownEventKind(event.kind.clone()))?,
        timestamp: parse_instant(&event.timestamp)?,
    })
}

/// Applies the default working rules and rejects values the arithmetic can't take.
pub fn validate_profile(
    profile: &RawEmployeeProfile,
) -> Result<EmployeeWorkProfile, AttendanceError> {
    let mut validated = EmployeeWorkProfile::new(profile.id.clone());
    validated.email = profile.email.clone();
    validated.name = profile.name.clone();

    if let Some(weekly_hours) = profile.weekly_hours {
        validated.weekly_hours_target =
            within(&profile.id, "weeklyHours", weekly_hours, MAX_WEEKLY_HOURS)?;
    }
    if let Some(break_minutes) = profile.break_minutes_per_day {
        validated.daily_break_minutes = within(
            &profile.id,
            "breakMinutesPerDay",
            break_minutes,
            MAX_BREAK_MINUTES_PER_DAY,
        )?
        .trunc() as i64;
    }
    if let Some(break_is_paid) = profile.break_is_paid {
        validated.break_is_paid = break_is_paid;
    }

    Ok(validated)
}

fn within(
    employee_id: &str,
    field: &'static str,
    value: f64,
    max: f64,
) -> Result<f64, AttendanceError> {
    if value.is_finite() && (0. ..=max).contains(&value) {
        Ok(value)
    } else {
        Err(AttendanceError::InvalidProfile {
            employee_id: employee_id.to_string(),
            field,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, str::FromStr};

    use chrono::TimeZone;
    use chrono_tz::Europe::Copenhagen;

    use super::*;

    fn options() -> ReportOptions {
        ReportOptions {
            timezone: None,
            default_timezone: "Europe/Copenhagen".to_string(),
            reference: None,
            now: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        }
    }

    fn raw_event(kind: &str, timestamp: &str) -> RawAttendanceEvent {
        RawAttendanceEvent {
            employee_id: "e1".to_string(),
            kind: kind.to_string(),
            timestamp: timestamp.to_string(),
        }
    }

    #[test]
    fn test_validate_event() {
        let event = validate_event(&raw_event("MOEDT", "2024-07-01T09:00:00+02:00")).unwrap();

        assert_eq!(event.kind, AttendanceKind::Arrived);
        assert_eq!(event.timestamp, Utc.with_ymd_and_hms(2024, 7, 1, 7, 0, 0).unwrap());
        assert_eq!(
            validate_event(&raw_event("NAP", "2024-07-01T09:00:00Z")),
            Err(AttendanceError::UnknownEventKind("NAP".to_string()))
        );
        assert_eq!(
            validate_event(&raw_event("LEFT", "yesterday")),
            Err(AttendanceError::InvalidTimestamp("yesterday".to_string()))
        );
    }

    #[test]
    fn test_validate_profile_applies_defaults() {
        let profile = validate_profile(&RawEmployeeProfile {
            id: "e1".to_string(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(profile.weekly_hours_target, 37.);
        assert_eq!(profile.daily_break_minutes, 30);
        assert!(!profile.break_is_paid);
    }

    #[test]
    fn test_validate_profile_truncates_break_and_rejects_negative() {
        let profile = validate_profile(&RawEmployeeProfile {
            id: "e1".to_string(),
            weekly_hours: Some(32.5),
            break_minutes_per_day: Some(45.9),
            break_is_paid: Some(true),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(profile.expected_minutes(), 1950);
        assert_eq!(profile.daily_break_minutes, 45);
        assert!(profile.break_is_paid);

        assert_eq!(
            validate_profile(&RawEmployeeProfile {
                id: "e2".to_string(),
                break_minutes_per_day: Some(-5.),
                ..Default::default()
            }),
            Err(AttendanceError::InvalidProfile {
                employee_id: "e2".to_string(),
                field: "breakMinutesPerDay",
                value: -5.
            })
        );
        assert!(validate_profile(&RawEmployeeProfile {
            id: "e3".to_string(),
            weekly_hours: Some(f64::NAN),
            ..Default::default()
        })
        .is_err());
    }

    #[test]
    fn test_validate_profile_rejects_allowances_longer_than_a_day() {
        assert_eq!(
            validate_profile(&RawEmployeeProfile {
                id: "e1".to_string(),
                break_minutes_per_day: Some(1e20),
                ..Default::default()
            }),
            Err(AttendanceError::InvalidProfile {
                employee_id: "e1".to_string(),
                field: "breakMinutesPerDay",
                value: 1e20
            })
        );
        assert!(validate_profile(&RawEmployeeProfile {
            id: "e2".to_string(),
            weekly_hours: Some(169.),
            ..Default::default()
        })
        .is_err());

        let profile = validate_profile(&RawEmployeeProfile {
            id: "e3".to_string(),
            weekly_hours: Some(168.),
            break_minutes_per_day: Some(1440.),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(profile.daily_break_minutes, 1440);
        assert_eq!(profile.expected_minutes(), 10080);
    }

    #[test]
    fn test_validate_snapshot_rejects_duplicate_employee() {
        let raw = RawAttendanceSnapshot {
            timezone: None,
            reference_instant: None,
            employees: vec![
                RawEmployeeProfile {
                    id: "e1".to_string(),
                    ..Default::default()
                },
                RawEmployeeProfile {
                    id: "e2".to_string(),
                    ..Default::default()
                },
                RawEmployeeProfile {
                    id: "e1".to_string(),
                    weekly_hours: Some(20.),
                    ..Default::default()
                },
            ],
            events: vec![raw_event("ARRIVED", "2024-07-01T09:00:00+02:00")],
        };

        let err = validate_snapshot(raw, &options()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<AttendanceError>(),
            Some(&AttendanceError::DuplicateEmployee("e1".to_string()))
        );
    }

    #[test]
    fn test_validate_snapshot_resolution_order() {
        let raw = || RawAttendanceSnapshot {
            timezone: Some("America/Chicago".to_string()),
            reference_instant: Some("2024-07-03T12:00:00Z".to_string()),
            employees: vec![],
            events: vec![
                raw_event("LEFT", "2024-07-01T17:00:00+02:00"),
                raw_event("ARRIVED", "2024-07-01T09:00:00+02:00"),
            ],
        };

        let snapshot = validate_snapshot(raw(), &options()).unwrap();
        assert_eq!(snapshot.timezone, chrono_tz::America::Chicago);
        assert_eq!(
            snapshot.reference,
            Utc.with_ymd_and_hms(2024, 7, 3, 12, 0, 0).unwrap()
        );
        assert_eq!(snapshot.events[0].kind, AttendanceKind::Arrived);

        let overridden = ReportOptions {
            timezone: Some("Europe/Copenhagen".to_string()),
            reference: Some(Utc.with_ymd_and_hms(2024, 8, 1, 0, 0, 0).unwrap()),
            ..options()
        };
        let snapshot = validate_snapshot(raw(), &overridden).unwrap();
        assert_eq!(snapshot.timezone, Copenhagen);
        assert_eq!(
            snapshot.reference,
            Utc.with_ymd_and_hms(2024, 8, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_validate_snapshot_rejects_unknown_timezone() {
        let raw = RawAttendanceSnapshot {
            timezone: Some("Nowhere/Special".to_string()),
            reference_instant: None,
            employees: vec![],
            events: vec![],
        };

        let err = validate_snapshot(raw, &options()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<AttendanceError>(),
            Some(&AttendanceError::InvalidTimezone("Nowhere/Special".to_string()))
        );
    }

    #[test]
    fn test_load_snapshot_from_file() {
        let path = PathBuf::from_str("./test_datasets/week_single_employee.json").unwrap();
        let snapshot = load_snapshot(&path, &options()).unwrap();

        assert_eq!(snapshot.timezone, Copenhagen);
        assert_eq!(snapshot.profiles.len(), 1);
        assert_eq!(snapshot.profiles[0].employee_id, "emp-1");
        assert_eq!(snapshot.events.len(), 2);
        assert!(snapshot.profile("emp-2").is_err());
        assert_eq!(snapshot.events_for("emp-1").len(), 2);
    }
}
