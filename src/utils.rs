use chrono::{Local, NaiveDate, SecondsFormat, Utc};
use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// Profile mode for the application (dev or prod)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Dev,
    Prod,
}

impl Profile {
    pub(crate) fn app_name(self) -> &'static str {
        match self {
            Profile::Dev => "diary-dev",
            Profile::Prod => "diary",
        }
    }
}

/// Get the configuration directory path
/// If profile is Dev, uses "diary-dev" instead of "diary"
pub fn get_config_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "diary", profile.app_name())
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the data directory path
/// If profile is Dev, uses "diary-dev" instead of "diary"
pub fn get_data_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "diary", profile.app_name())
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Expand `~` in a path string to the user's home directory
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Parse a date string in ISO 8601 format (YYYY-MM-DD)
pub fn parse_date(date_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
}

/// Parse a month string (YYYY-MM) into the first day of that month
pub fn parse_month(month_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(&format!("{}-01", month_str.trim()), "%Y-%m-%d")
}

/// Format a date the way entry lists show it, e.g. "Mar 5, 2024"
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Today's date in the local timezone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Current UTC time as an ISO 8601 timestamp with millisecond precision
pub fn get_current_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_rejects_other_formats() {
        assert!(parse_date("2024-01-31").is_ok());
        assert!(parse_date("01/31/2024").is_err());
        assert!(parse_date("2024-02-30").is_err());
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2024-02").ok(), NaiveDate::from_ymd_opt(2024, 2, 1));
        assert!(parse_month("2024-13").is_err());
    }

    #[test]
    fn test_timestamp_is_rfc3339() {
        let ts = get_current_timestamp();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
        assert!(ts.ends_with('Z'));
    }

    #[test]
    fn test_expand_path_leaves_absolute_paths() {
        assert_eq!(expand_path("/tmp/diary.db"), PathBuf::from("/tmp/diary.db"));
    }
}
