//! Aggregates and calendar helpers derived from in-memory snapshots.
//!
//! Everything here is pure: callers load the entries or motivation history
//! first and pass "today" explicitly. Every function accepts an empty slice.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{DiaryEntry, MotivationEntry};

/// Anything that falls on a calendar day
pub trait Dated {
    fn day(&self) -> Option<NaiveDate>;
}

impl Dated for DiaryEntry {
    fn day(&self) -> Option<NaiveDate> {
        DiaryEntry::day(self)
    }
}

impl Dated for MotivationEntry {
    fn day(&self) -> Option<NaiveDate> {
        MotivationEntry::day(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntrySummary {
    pub id: String,
    pub title: String,
    pub date: String,
    pub length: usize,
}

impl EntrySummary {
    fn of(entry: &DiaryEntry) -> Self {
        Self {
            id: entry.id.clone(),
            title: entry.display_title(),
            date: entry.date.clone(),
            length: entry.text_length(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntryStats {
    pub total_entries: usize,
    pub text_entries: usize,
    pub audio_entries: usize,
    pub important_entries: usize,
    pub average_text_length: usize,
    pub longest_entry: Option<EntrySummary>,
    pub last_entry: Option<EntrySummary>,
    pub streak_days: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MotivationStats {
    pub count: usize,
    pub average: f64,
    pub highest: Option<u8>,
    pub lowest: Option<u8>,
    pub most_frequent: Option<u8>,
}

/// Calendar markers for one day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DayMarkers {
    pub has_text: bool,
    pub has_audio: bool,
    pub important: bool,
}

pub fn entry_stats(entries: &[DiaryEntry], today: NaiveDate) -> EntryStats {
    let text_entries: Vec<&DiaryEntry> = entries.iter().filter(|e| e.has_text()).collect();

    let total_text_length: usize = text_entries.iter().map(|e| e.text_length()).sum();
    let average_text_length = if text_entries.is_empty() {
        0
    } else {
        (total_text_length as f64 / text_entries.len() as f64).round() as usize
    };

    // Strictly greater, so the first of equally long entries wins
    let mut longest: Option<&DiaryEntry> = None;
    for &entry in &text_entries {
        if longest.is_none_or(|l| entry.text_length() > l.text_length()) {
            longest = Some(entry);
        }
    }

    let mut last: Option<(&DiaryEntry, NaiveDate)> = None;
    for entry in entries {
        if let Some(day) = entry.day() {
            if last.is_none_or(|(_, last_day)| day > last_day) {
                last = Some((entry, day));
            }
        }
    }

    EntryStats {
        total_entries: entries.len(),
        text_entries: text_entries.len(),
        audio_entries: entries.iter().filter(|e| e.has_audio()).count(),
        important_entries: entries.iter().filter(|e| e.is_important).count(),
        average_text_length,
        longest_entry: longest.map(EntrySummary::of),
        last_entry: last.map(|(entry, _)| EntrySummary::of(entry)),
        streak_days: current_streak(entries, today),
    }
}

/// Number of consecutive days with at least one entry, counting back from
/// today or yesterday. Entries with a malformed date are ignored.
pub fn current_streak(entries: &[DiaryEntry], today: NaiveDate) -> u32 {
    let days: BTreeSet<NaiveDate> = entries.iter().filter_map(|e| e.day()).collect();

    let mut streak = 0;
    let mut previous: Option<NaiveDate> = None;
    for &day in days.iter().rev() {
        let continues = match previous {
            None => today.signed_duration_since(day).num_days() <= 1,
            Some(prev) => prev.signed_duration_since(day).num_days() == 1,
        };
        if !continues {
            break;
        }
        streak += 1;
        previous = Some(day);
    }
    streak
}

pub fn motivation_stats(history: &[MotivationEntry]) -> MotivationStats {
    if history.is_empty() {
        return MotivationStats::default();
    }

    let sum: u64 = history.iter().map(|e| u64::from(e.level)).sum();
    let average = (sum as f64 / history.len() as f64 * 10.0).round() / 10.0;

    // Frequency table in first-seen order; ties go to the earliest level seen
    let mut frequencies: Vec<(u8, usize)> = Vec::new();
    for entry in history {
        match frequencies.iter_mut().find(|(level, _)| *level == entry.level) {
            Some((_, count)) => *count += 1,
            None => frequencies.push((entry.level, 1)),
        }
    }
    let mut most_frequent: Option<(u8, usize)> = None;
    for &(level, count) in &frequencies {
        if most_frequent.is_none_or(|(_, best)| count > best) {
            most_frequent = Some((level, count));
        }
    }

    MotivationStats {
        count: history.len(),
        average,
        highest: history.iter().map(|e| e.level).max(),
        lowest: history.iter().map(|e| e.level).min(),
        most_frequent: most_frequent.map(|(level, _)| level),
    }
}

/// Items whose day falls within `[start, end]`, in their original order
pub fn filter_by_date_range<T: Dated>(items: &[T], start: NaiveDate, end: NaiveDate) -> Vec<&T> {
    items
        .iter()
        .filter(|item| item.day().is_some_and(|day| day >= start && day <= end))
        .collect()
}

/// First and last day of the month containing `day`
pub fn month_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = day
        .checked_sub_days(Days::new(u64::from(day.day0())))
        .unwrap_or(day);
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX);
    (start, end)
}

/// Sunday through Saturday of the week containing `day`
pub fn week_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let offset = u64::from(day.weekday().num_days_from_sunday());
    let start = day.checked_sub_days(Days::new(offset)).unwrap_or(NaiveDate::MIN);
    let end = start.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX);
    (start, end)
}

/// Newest calendar date first; stable, so same-day entries keep stored order
pub fn sort_by_date_desc(entries: &mut [DiaryEntry]) {
    entries.sort_by(|a, b| b.day().cmp(&a.day()));
}

/// Most recently created first
pub fn sort_by_created_desc(entries: &mut [DiaryEntry]) {
    entries.sort_by(|a, b| {
        let created = |e: &DiaryEntry| chrono::DateTime::parse_from_rfc3339(&e.created_at).ok();
        created(b).cmp(&created(a))
    });
}

/// Up to `limit` entries dated today, yesterday or elsewhere in the current
/// week, most recently created first
pub fn recent_entries(entries: &[DiaryEntry], today: NaiveDate, limit: usize) -> Vec<DiaryEntry> {
    let (week_start, week_end) = week_bounds(today);
    let yesterday = today.pred_opt();

    let mut sorted = entries.to_vec();
    sort_by_created_desc(&mut sorted);
    sorted
        .into_iter()
        .filter(|e| {
            e.day().is_some_and(|day| {
                Some(day) == yesterday || (day >= week_start && day <= week_end)
            })
        })
        .take(limit)
        .collect()
}

/// Up to `limit` important entries, most recently created first
pub fn important_entries(entries: &[DiaryEntry], limit: usize) -> Vec<DiaryEntry> {
    let mut sorted = entries.to_vec();
    sort_by_created_desc(&mut sorted);
    sorted
        .into_iter()
        .filter(|e| e.is_important)
        .take(limit)
        .collect()
}

/// Calendar markers keyed by date; entries sharing a date are merged
pub fn marked_dates(entries: &[DiaryEntry]) -> BTreeMap<String, DayMarkers> {
    let mut marks: BTreeMap<String, DayMarkers> = BTreeMap::new();
    for entry in entries {
        let mark = marks.entry(entry.date.clone()).or_default();
        mark.has_text |= entry.has_text();
        mark.has_audio |= entry.has_audio();
        mark.important |= entry.is_important;
    }
    marks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn entry(id: &str, day: &str, text: &str) -> DiaryEntry {
        let mut e = DiaryEntry::new(day.to_string());
        e.id = id.to_string();
        e.text = text.to_string();
        e
    }

    fn rating(date: &str, level: u8) -> MotivationEntry {
        MotivationEntry {
            date: date.to_string(),
            level,
            label: crate::models::motivation_label(i64::from(level)).to_string(),
        }
    }

    #[test]
    fn test_empty_entry_stats() {
        let stats = entry_stats(&[], date("2024-05-10"));
        assert_eq!(stats, EntryStats::default());
    }

    #[test]
    fn test_streak_today_and_yesterday() {
        let today = date("2024-05-10");
        let entries = vec![entry("1", "2024-05-10", "a"), entry("2", "2024-05-09", "b")];
        assert_eq!(current_streak(&entries, today), 2);
    }

    #[test]
    fn test_streak_breaks_on_gap() {
        let today = date("2024-05-10");
        let entries = vec![entry("1", "2024-05-10", "a"), entry("2", "2024-05-07", "b")];
        assert_eq!(current_streak(&entries, today), 1);
    }

    #[test]
    fn test_streak_can_start_yesterday() {
        let today = date("2024-05-10");
        let entries = vec![
            entry("1", "2024-05-09", "a"),
            entry("2", "2024-05-08", "b"),
            entry("3", "2024-05-08", "duplicate day"),
        ];
        assert_eq!(current_streak(&entries, today), 2);
    }

    #[test]
    fn test_streak_zero_when_latest_is_old() {
        let today = date("2024-05-10");
        let entries = vec![entry("1", "2024-05-08", "a"), entry("2", "2024-05-07", "b")];
        assert_eq!(current_streak(&entries, today), 0);
        assert_eq!(current_streak(&[], today), 0);
    }

    #[test]
    fn test_streak_crosses_month_boundary() {
        let today = date("2024-03-01");
        let entries = vec![entry("1", "2024-02-29", "a"), entry("2", "2024-03-01", "b")];
        assert_eq!(current_streak(&entries, today), 2);
    }

    #[test]
    fn test_average_text_length_skips_empty_text() {
        let entries = vec![
            entry("1", "2024-01-01", "abcd"),
            entry("2", "2024-01-02", "abcdef"),
            entry("3", "2024-01-03", ""),
        ];
        let stats = entry_stats(&entries, date("2024-01-03"));
        assert_eq!(stats.text_entries, 2);
        assert_eq!(stats.average_text_length, 5);
    }

    #[test]
    fn test_counts_and_longest_entry() {
        let mut audio = entry("2", "2024-01-02", "");
        audio.audio_path = "clip.m4a".to_string();
        audio.is_important = true;
        let entries = vec![
            entry("1", "2024-01-01", "same"),
            audio,
            entry("3", "2024-01-03", "same"),
            entry("4", "2024-01-04", "abc"),
        ];
        let stats = entry_stats(&entries, date("2024-01-20"));
        assert_eq!(stats.total_entries, 4);
        assert_eq!(stats.text_entries, 3);
        assert_eq!(stats.audio_entries, 1);
        assert_eq!(stats.important_entries, 1);
        assert_eq!(stats.longest_entry.unwrap().id, "1");
        assert_eq!(stats.last_entry.unwrap().id, "4");
        assert_eq!(stats.streak_days, 0);
    }

    #[test]
    fn test_last_entry_ties_keep_first() {
        let entries = vec![entry("1", "2024-01-05", "a"), entry("2", "2024-01-05", "b")];
        let stats = entry_stats(&entries, date("2024-01-05"));
        assert_eq!(stats.last_entry.unwrap().id, "1");
    }

    #[test]
    fn test_motivation_stats() {
        let history = vec![
            rating("2024-01-01T08:00:00.000Z", 4),
            rating("2024-01-02T08:00:00.000Z", 2),
            rating("2024-01-03T08:00:00.000Z", 2),
            rating("2024-01-04T08:00:00.000Z", 4),
            rating("2024-01-05T08:00:00.000Z", 5),
        ];
        let stats = motivation_stats(&history);
        assert_eq!(stats.count, 5);
        assert_eq!(stats.average, 3.4);
        assert_eq!(stats.highest, Some(5));
        assert_eq!(stats.lowest, Some(2));
        assert_eq!(stats.most_frequent, Some(4));
    }

    #[test]
    fn test_motivation_average_rounds_to_one_decimal() {
        let history = vec![
            rating("2024-01-01T08:00:00.000Z", 1),
            rating("2024-01-02T08:00:00.000Z", 2),
            rating("2024-01-03T08:00:00.000Z", 2),
        ];
        assert_eq!(motivation_stats(&history).average, 1.7);
    }

    #[test]
    fn test_empty_motivation_stats() {
        let stats = motivation_stats(&[]);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.average, 0.0);
        assert_eq!(stats.most_frequent, None);
    }

    #[test]
    fn test_filter_by_month_is_inclusive() {
        let entries = vec![
            entry("1", "2024-01-31", "a"),
            entry("2", "2024-02-01", "b"),
            entry("3", "2024-02-29", "c"),
            entry("4", "2024-03-01", "d"),
            entry("5", "not-a-date", "e"),
        ];
        let (start, end) = month_bounds(date("2024-02-14"));
        assert_eq!(start, date("2024-02-01"));
        assert_eq!(end, date("2024-02-29"));
        let ids: Vec<&str> = filter_by_date_range(&entries, start, end)
            .into_iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[test]
    fn test_filter_motivation_by_week() {
        let history = vec![
            rating("2024-05-04T10:00:00.000Z", 1),
            rating("2024-05-05T10:00:00.000Z", 2),
            rating("2024-05-11T10:00:00.000Z", 3),
            rating("2024-05-12T10:00:00.000Z", 4),
        ];
        let (start, end) = week_bounds(date("2024-05-08"));
        assert_eq!(start, date("2024-05-05"));
        assert_eq!(end, date("2024-05-11"));
        let levels: Vec<u8> = filter_by_date_range(&history, start, end)
            .into_iter()
            .map(|m| m.level)
            .collect();
        assert_eq!(levels, vec![2, 3]);
    }

    #[test]
    fn test_month_bounds_december() {
        assert_eq!(
            month_bounds(date("2023-12-25")),
            (date("2023-12-01"), date("2023-12-31"))
        );
    }

    #[test]
    fn test_sort_by_date_desc_is_stable() {
        let mut entries = vec![
            entry("1", "2024-01-01", "a"),
            entry("2", "2024-01-03", "b"),
            entry("3", "2024-01-01", "c"),
        ];
        sort_by_date_desc(&mut entries);
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1", "3"]);
    }

    #[test]
    fn test_recent_and_important_entries() {
        // 2024-05-12 is a Sunday, so yesterday belongs to the previous week
        let today = date("2024-05-12");
        let mut a = entry("a", "2024-05-11", "yesterday");
        a.created_at = "2024-05-11T20:00:00.000Z".to_string();
        let mut b = entry("b", "2024-05-12", "today");
        b.created_at = "2024-05-12T09:00:00.000Z".to_string();
        b.is_important = true;
        let mut c = entry("c", "2024-05-01", "old");
        c.created_at = "2024-05-01T09:00:00.000Z".to_string();
        c.is_important = true;
        let entries = vec![a, b, c];

        let ids: Vec<String> = recent_entries(&entries, today, 5).into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["b", "a"]);

        let ids: Vec<String> = important_entries(&entries, 1).into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn test_marked_dates_merge_same_day() {
        let mut voice = entry("2", "2024-01-01", "");
        voice.audio_path = "clip.m4a".to_string();
        let entries = vec![entry("1", "2024-01-01", "text"), voice];
        let marks = marked_dates(&entries);
        assert_eq!(marks.len(), 1);
        let mark = marks["2024-01-01"];
        assert!(mark.has_text && mark.has_audio && !mark.important);
    }
}
