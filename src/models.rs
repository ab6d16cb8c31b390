use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::{format_display_date, get_current_timestamp, parse_date};

/// Lowest accepted motivation rating
pub const MIN_MOTIVATION_LEVEL: i64 = 1;
/// Highest accepted motivation rating
pub const MAX_MOTIVATION_LEVEL: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Neutral,
    Sad,
}

impl Mood {
    pub fn label(&self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Neutral => "Neutral",
            Mood::Sad => "Sad",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "happy" => Ok(Mood::Happy),
            "neutral" => Ok(Mood::Neutral),
            "sad" => Ok(Mood::Sad),
            other => Err(format!("Unknown mood '{}' (expected happy, neutral or sad)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub temperature: f64,
    pub condition: String,
    #[serde(default)]
    pub icon: String,
}

/// A single diary entry as persisted under the `diary_entries` key.
///
/// Field names follow the camelCase layout of the stored JSON so data
/// written by earlier versions of the app round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryEntry {
    pub id: String,
    /// Calendar day, YYYY-MM-DD
    pub date: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    /// Opaque reference to a recorded clip, empty if none
    #[serde(default, deserialize_with = "null_as_empty")]
    pub audio_path: String,
    #[serde(default)]
    pub is_important: bool,
    /// ISO 8601 creation timestamp
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<Weather>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl DiaryEntry {
    /// Create an empty entry for `date` with a fresh id and creation time
    pub fn new(date: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            date,
            title: String::new(),
            text: String::new(),
            audio_path: String::new(),
            is_important: false,
            created_at: get_current_timestamp(),
            mood: None,
            location: None,
            weather: None,
        }
    }

    /// True when the body contains something other than whitespace
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    pub fn has_audio(&self) -> bool {
        !self.audio_path.is_empty()
    }

    /// Length of the body in characters
    pub fn text_length(&self) -> usize {
        self.text.chars().count()
    }

    /// The calendar date of the entry, if `date` is well-formed
    pub fn day(&self) -> Option<chrono::NaiveDate> {
        parse_date(&self.date).ok()
    }

    /// Title for display, falling back to the formatted date when blank
    pub fn display_title(&self) -> String {
        let title = self.title.trim();
        if !title.is_empty() {
            return title.to_string();
        }
        match self.day() {
            Some(day) => format_display_date(day),
            None => self.date.clone(),
        }
    }
}

/// One motivation rating, appended by the motivation store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredMotivationEntry")]
pub struct MotivationEntry {
    /// ISO 8601 timestamp of the rating
    pub date: String,
    pub level: u8,
    pub label: String,
}

/// Stored form of a rating; older records may lack the label or date
#[derive(Deserialize)]
struct StoredMotivationEntry {
    #[serde(default)]
    date: String,
    level: u8,
    #[serde(default)]
    label: Option<String>,
}

impl From<StoredMotivationEntry> for MotivationEntry {
    fn from(stored: StoredMotivationEntry) -> Self {
        let label = stored
            .label
            .filter(|label| !label.is_empty())
            .unwrap_or_else(|| motivation_label(i64::from(stored.level)).to_string());
        Self {
            date: stored.date,
            level: stored.level,
            label,
        }
    }
}

impl MotivationEntry {
    /// Build a record stamped with the current time.
    ///
    /// Callers are expected to have validated `level` already.
    pub fn new(level: u8) -> Self {
        Self {
            date: get_current_timestamp(),
            level,
            label: motivation_label(i64::from(level)).to_string(),
        }
    }

    /// The calendar date the rating was recorded on, in the offset it was written with
    pub fn day(&self) -> Option<chrono::NaiveDate> {
        chrono::DateTime::parse_from_rfc3339(&self.date)
            .ok()
            .map(|ts| ts.date_naive())
    }
}

/// Fixed label for a motivation level
pub fn motivation_label(level: i64) -> &'static str {
    match level {
        1 => "Very Low",
        2 => "Low",
        3 => "Moderate",
        4 => "High",
        5 => "Very High",
        _ => "Unknown",
    }
}
