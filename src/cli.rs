use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::config::Config;
use crate::entries::{EntryDraft, EntryError, EntryStore};
use crate::models::{DiaryEntry, Mood};
use crate::motivation::{MotivationError, MotivationStore};
use crate::preferences::{ThemeMode, ThemePreferences};
use crate::quotes::quote_for_date;
use crate::stats;
use crate::storage::{KeyValueStore, StorageError};
use crate::utils::{format_display_date, parse_date, parse_month};

#[derive(Parser)]
#[command(name = "diary")]
#[command(about = "Diary - text and voice journal with motivation tracking")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config/database)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show today's entry, streak and quote (default if no subcommand)
    Today,
    /// Write the entry for a day, replacing any entry already saved for it
    Write {
        /// Entry text
        text: Option<String>,
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Entry title; a numbered title is used when omitted
        #[arg(long)]
        title: Option<String>,
        /// Path of a recorded audio clip
        #[arg(long)]
        audio: Option<String>,
        /// Mark the entry important
        #[arg(long)]
        important: bool,
        /// happy, neutral or sad
        #[arg(long)]
        mood: Option<Mood>,
    },
    /// List entries for a month, newest first
    List {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(long)]
        month: Option<String>,
        /// Only important entries
        #[arg(long)]
        important: bool,
    },
    /// Show this week's entries and the latest important ones
    Recent,
    /// Show the entry for a date
    Show {
        /// Date (YYYY-MM-DD)
        date: String,
    },
    /// Delete an entry by id
    Delete {
        id: String,
    },
    /// Toggle the important flag of an entry
    Star {
        id: String,
    },
    /// Show writing statistics
    Stats,
    /// Record and review motivation ratings
    Motivation {
        #[command(subcommand)]
        command: MotivationCommand,
    },
    /// Show or change the theme preference
    Theme {
        /// light, dark or system
        mode: Option<ThemeMode>,
    },
    /// Show the quote of the day
    Quote {
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum MotivationCommand {
    /// Record how motivated you feel, from 1 (very low) to 5 (very high)
    Add {
        level: i64,
    },
    /// List recorded ratings
    History {
        /// Month (YYYY-MM) to restrict the listing to
        #[arg(long)]
        month: Option<String>,
    },
    /// Summarize recorded ratings
    Stats,
    /// Delete every recorded rating
    Clear,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
    #[error("{0}")]
    EntryError(#[from] EntryError),
    #[error("{0}")]
    MotivationError(#[from] MotivationError),
    #[error("Failed to parse date: {0}")]
    DateParseError(String),
    #[error("No entry with id {0}")]
    EntryNotFound(String),
}

fn parse_date_arg(date: Option<String>, today: NaiveDate) -> Result<NaiveDate, CliError> {
    match date {
        Some(date_str) => parse_date(&date_str)
            .map_err(|e| CliError::DateParseError(format!("Invalid date format '{}': {}", date_str, e))),
        None => Ok(today),
    }
}

fn parse_month_arg(month: Option<String>, today: NaiveDate) -> Result<NaiveDate, CliError> {
    match month {
        Some(month_str) => parse_month(&month_str)
            .map_err(|e| CliError::DateParseError(format!("Invalid month format '{}': {}", month_str, e))),
        None => Ok(today),
    }
}

/// One-line listing used by every entry list
pub fn format_entry_line(entry: &DiaryEntry) -> String {
    let mut line = format!(
        "{}  {}{}",
        entry.date,
        if entry.is_important { "* " } else { "" },
        entry.display_title()
    );
    if entry.has_audio() {
        line.push_str(" (audio)");
    }
    if let Some(mood) = entry.mood {
        line.push_str(&format!(" [{}]", mood));
    }
    line.push_str(&format!("  id:{}", entry.id));
    line
}

fn print_entry(entry: &DiaryEntry) {
    println!("{}", entry.display_title());
    println!(
        "{}",
        entry.day().map_or_else(|| entry.date.clone(), format_display_date)
    );
    if entry.is_important {
        println!("Marked important");
    }
    if let Some(mood) = entry.mood {
        println!("Mood: {}", mood);
    }
    if let Some(location) = &entry.location {
        println!("Location: {}", location.name);
    }
    if let Some(weather) = &entry.weather {
        println!("Weather: {} {:.0}°", weather.condition, weather.temperature);
    }
    if entry.has_audio() {
        println!("Audio: {}", entry.audio_path);
    }
    if !entry.text.is_empty() {
        println!();
        println!("{}", entry.text);
    }
    println!();
    println!("id: {}", entry.id);
}

/// Handle the default command
pub fn handle_today<S: KeyValueStore>(
    entries: &EntryStore<S>,
    config: &Config,
    today: NaiveDate,
) -> Result<(), CliError> {
    let all = entries.list_entries()?;
    let date = today.format("%Y-%m-%d").to_string();

    println!("{}", format_display_date(today));
    match all.iter().find(|e| e.date == date) {
        Some(entry) => println!("Today: {}", format_entry_line(entry)),
        None => println!("Nothing written today yet."),
    }
    println!("Current streak: {} days", stats::current_streak(&all, today));

    if config.show_quote {
        let quote = quote_for_date(today);
        println!();
        println!("\"{}\"", quote.content);
        println!("  - {}", quote.author);
    }
    Ok(())
}

/// Handle the write command
#[allow(clippy::too_many_arguments)]
pub fn handle_write<S: KeyValueStore>(
    text: Option<String>,
    date: Option<String>,
    title: Option<String>,
    audio: Option<String>,
    important: bool,
    mood: Option<Mood>,
    entries: &EntryStore<S>,
    today: NaiveDate,
) -> Result<(), CliError> {
    let day = parse_date_arg(date, today)?;

    // Options left out on the command line keep what is already stored for the day
    let draft = EntryDraft {
        title,
        text,
        audio_path: audio,
        is_important: important.then_some(true),
        mood,
        ..EntryDraft::new(day.format("%Y-%m-%d").to_string())
    };

    let saved = entries.save_for_date(draft)?;
    println!("Entry saved: {}", format_entry_line(&saved));
    Ok(())
}

/// Handle the list command
pub fn handle_list<S: KeyValueStore>(
    month: Option<String>,
    important: bool,
    entries: &EntryStore<S>,
    today: NaiveDate,
) -> Result<(), CliError> {
    let (start, end) = stats::month_bounds(parse_month_arg(month, today)?);
    let all = entries.list_entries()?;

    let mut month_entries: Vec<DiaryEntry> = stats::filter_by_date_range(&all, start, end)
        .into_iter()
        .filter(|e| !important || e.is_important)
        .cloned()
        .collect();
    stats::sort_by_date_desc(&mut month_entries);

    println!("{}", start.format("%B %Y"));
    if month_entries.is_empty() {
        println!("No entries.");
    }
    for entry in &month_entries {
        println!("{}", format_entry_line(entry));
    }
    Ok(())
}

/// Handle the recent command
pub fn handle_recent<S: KeyValueStore>(
    entries: &EntryStore<S>,
    config: &Config,
    today: NaiveDate,
) -> Result<(), CliError> {
    let all = entries.list_entries()?;

    println!("This week");
    let recent = stats::recent_entries(&all, today, config.recent_entries_limit);
    if recent.is_empty() {
        println!("  No entries.");
    }
    for entry in &recent {
        println!("  {}", format_entry_line(entry));
    }

    println!("Important");
    let important = stats::important_entries(&all, config.important_entries_limit);
    if important.is_empty() {
        println!("  No entries.");
    }
    for entry in &important {
        println!("  {}", format_entry_line(entry));
    }
    Ok(())
}

/// Handle the show command
pub fn handle_show<S: KeyValueStore>(date: String, entries: &EntryStore<S>) -> Result<(), CliError> {
    parse_date(&date)
        .map_err(|e| CliError::DateParseError(format!("Invalid date format '{}': {}", date, e)))?;
    match entries.find_entry_by_date(&date)? {
        Some(entry) => print_entry(&entry),
        None => println!("No entry for {}", date),
    }
    Ok(())
}

/// Handle the delete command
pub fn handle_delete<S: KeyValueStore>(id: String, entries: &EntryStore<S>) -> Result<(), CliError> {
    let existed = entries.find_entry(&id)?.is_some();
    entries.delete_entry(&id)?;
    if existed {
        println!("Entry deleted (ID: {})", id);
    } else {
        println!("No entry with id {}, nothing deleted", id);
    }
    Ok(())
}

/// Handle the star command
pub fn handle_star<S: KeyValueStore>(id: String, entries: &EntryStore<S>) -> Result<(), CliError> {
    match entries.toggle_important(&id)? {
        Some(true) => println!("Marked important (ID: {})", id),
        Some(false) => println!("No longer important (ID: {})", id),
        None => return Err(CliError::EntryNotFound(id)),
    }
    Ok(())
}

/// Handle the stats command
pub fn handle_stats<S: KeyValueStore>(entries: &EntryStore<S>, today: NaiveDate) -> Result<(), CliError> {
    let summary = stats::entry_stats(&entries.list_entries()?, today);

    println!("Overview");
    println!("  Text entries:    {}", summary.text_entries);
    println!("  Audio notes:     {}", summary.audio_entries);
    println!("  Important:       {}", summary.important_entries);
    println!("Writing");
    println!("  Total entries:   {}", summary.total_entries);
    println!("  Current streak:  {} days", summary.streak_days);
    println!("  Average length:  {} characters", summary.average_text_length);
    if let Some(longest) = &summary.longest_entry {
        println!("  Longest entry:   {} ({} chars)", longest.title, longest.length);
    }
    if let Some(last) = &summary.last_entry {
        println!("  Last entry:      {} ({})", last.title, last.date);
    }
    Ok(())
}

/// Handle the motivation subcommands
pub fn handle_motivation<S: KeyValueStore>(
    command: MotivationCommand,
    store: &MotivationStore<S>,
    today: NaiveDate,
) -> Result<(), CliError> {
    match command {
        MotivationCommand::Add { level } => {
            let entry = store.add_motivation_entry(level)?;
            println!("Motivation recorded: {} ({})", entry.level, entry.label);
        }
        MotivationCommand::History { month } => {
            let history = store.list_motivation_history()?;
            let shown: Vec<_> = match month {
                Some(month) => {
                    let (start, end) = stats::month_bounds(parse_month_arg(Some(month), today)?);
                    stats::filter_by_date_range(&history, start, end)
                }
                None => history.iter().collect(),
            };
            if shown.is_empty() {
                println!("No motivation ratings recorded.");
            }
            for entry in shown {
                println!("{}  {} ({})", entry.date, entry.level, entry.label);
            }
        }
        MotivationCommand::Stats => {
            let summary = stats::motivation_stats(&store.list_motivation_history()?);
            let level = |l: Option<u8>| l.map_or_else(|| "-".to_string(), |l| l.to_string());
            println!("Ratings:        {}", summary.count);
            println!("Average:        {:.1}", summary.average);
            println!("Highest:        {}", level(summary.highest));
            println!("Lowest:         {}", level(summary.lowest));
            println!("Most frequent:  {}", level(summary.most_frequent));
        }
        MotivationCommand::Clear => {
            store.clear_motivation_history()?;
            println!("Motivation history cleared");
        }
    }
    Ok(())
}

/// Handle the theme command
pub fn handle_theme<S: KeyValueStore>(
    mode: Option<ThemeMode>,
    prefs: &ThemePreferences<S>,
) -> Result<(), CliError> {
    match mode {
        Some(mode) => {
            prefs.set_theme_mode(mode)?;
            println!("Theme set to {}", mode);
        }
        None => println!("{}", prefs.theme_mode()?),
    }
    Ok(())
}

/// Handle the quote command
pub fn handle_quote(date: Option<String>, today: NaiveDate) -> Result<(), CliError> {
    let quote = quote_for_date(parse_date_arg(date, today)?);
    println!("\"{}\"", quote.content);
    println!("  - {}", quote.author);
    Ok(())
}
