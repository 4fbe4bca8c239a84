use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub const DEFAULT_WEEKLY_HOURS: f64 = 37.;
pub const DEFAULT_BREAK_MINUTES_PER_DAY: i64 = 30;

/// What a single punch records. The legacy stored names are accepted when parsing.
#[derive(Serialize, Deserialize, Display, EnumString, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(ascii_case_insensitive)]
pub enum AttendanceKind {
    #[strum(to_string = "ARRIVED", serialize = "MOEDT")]
    Arrived,
    #[strum(to_string = "LEFT", serialize = "GAAET")]
    Left,
    #[strum(to_string = "BREAK_START", serialize = "PAUSE_START")]
    BreakStart,
    #[strum(to_string = "BREAK_END", serialize = "PAUSE_END")]
    BreakEnd,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawAttendanceEvent {
    #[serde(alias = "userId")]
    pub employee_id: String,
    #[serde(alias = "type")]
    pub kind: String,
    #[serde(alias = "at")]
    pub timestamp: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEvent {
    pub employee_id: String,
    pub kind: AttendanceKind,
    pub timestamp: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawEmployeeProfile {
    #[serde(alias = "employeeId")]
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    #[serde(alias = "weeklyHoursTarget")]
    pub weekly_hours: Option<f64>,
    #[serde(alias = "dailyBreakMinutes")]
    pub break_minutes_per_day: Option<f64>,
    pub break_is_paid: Option<bool>,
}

/// Working rules for one employee, with defaults already applied.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeWorkProfile {
    pub employee_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub weekly_hours_target: f64,
    pub daily_break_minutes: i64,
    pub break_is_paid: bool,
}

impl EmployeeWorkProfile {
    pub fn new(employee_id: impl Into<String>) -> Self {
        Self {
            employee_id: employee_id.into(),
            email: None,
            name: None,
            weekly_hours_target: DEFAULT_WEEKLY_HOURS,
            daily_break_minutes: DEFAULT_BREAK_MINUTES_PER_DAY,
            break_is_paid: false,
        }
    }

    pub fn expected_minutes(&self) -> i64 {
        (self.weekly_hours_target * 60.).trunc() as i64
    }

    /// Break allowance for a day with `gross_minutes` worked.
    pub fn break_deduction_for_day(&self, gross_minutes: i64) -> i64 {
        if self.break_is_paid || gross_minutes <= 0 {
            0
        } else {
            self.daily_break_minutes.max(0)
        }
    }

    pub fn break_deduction_for_week(&self, worked_days: usize) -> i64 {
        if self.break_is_paid {
            0
        } else {
            (worked_days as i64).saturating_mul(self.daily_break_minutes.max(0))
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: NaiveDate,
    pub worked_minutes_gross: i64,
    pub break_minutes_deducted: i64,
    pub worked_minutes_net: i64,
    pub intervals: Vec<WorkInterval>,
    pub events_count: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeekSummary {
    pub employee_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub expected_minutes: i64,
    pub worked_minutes_gross: i64,
    pub break_minutes_deducted: i64,
    pub worked_minutes_net: i64,
    pub delta_minutes: i64,
    pub has_warnings: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WeekTotals {
    pub worked_minutes_gross: i64,
    pub break_minutes_deducted: i64,
    pub worked_minutes_net: i64,
    pub expected_minutes: i64,
    pub delta_minutes: i64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeekDetail {
    pub employee_id: String,
    pub week_start: DateTime<Utc>,
    pub week_end: DateTime<Utc>,
    pub days: Vec<DaySummary>,
    pub totals: WeekTotals,
    pub has_warnings: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompanyWeekReport {
    pub timezone: String,
    pub week_start: DateTime<Utc>,
    pub week_end: DateTime<Utc>,
    pub employees: Vec<WeekSummary>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TodayStatus {
    pub employee_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub last_kind: Option<AttendanceKind>,
    pub last_at: Option<DateTime<Utc>>,
    pub events_today: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TodayOverview {
    pub date: NaiveDate,
    pub total_employees: usize,
    pub arrived: usize,
    pub left: usize,
    pub no_registration: usize,
    pub missing_checkout: usize,
    pub employees: Vec<TodayStatus>,
}
