use thiserror::Error;

/// Hard failures of the aggregation core.
///
/// Imperfect punch sequences are not errors; they surface as warnings on the
/// summaries instead.
#[derive(Debug, Error, PartialEq)]
pub enum AttendanceError {
    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),
    #[error("invalid {field} for employee {employee_id}: {value}")]
    InvalidProfile {
        employee_id: String,
        field: &'static str,
        value: f64,
    },
    #[error("unknown attendance event kind: {0}")]
    UnknownEventKind(String),
    #[error("timestamp was not rfc3339 compliant: {0}")]
    InvalidTimestamp(String),
    #[error("employee listed more than once: {0}")]
    DuplicateEmployee(String),
    #[error("employee not found: {0}")]
    UnknownEmployee(String),
}
