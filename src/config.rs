use std::{env, path::PathBuf};

pub const DEFAULT_TIMEZONE: &str = "Europe/Copenhagen";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// IANA zone used for day bucketing and week boundaries.
    pub timezone: String,
    pub output: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
            output: PathBuf::from("./attendance_report.json"),
        }
    }
}

impl Settings {
    /// Reads `ATTENDANCE_*` variables, seeded from a `.env` file when present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(timezone) = lookup("ATTENDANCE_TIMEZONE").filter(|tz| !tz.trim().is_empty()) {
            settings.timezone = timezone.trim().to_string();
        }
        if let Some(output) = lookup("ATTENDANCE_OUTPUT").filter(|path| !path.trim().is_empty()) {
            settings.output = PathBuf::from(output);
        }

        settings
    }
}
