use clap::Parser;
use color_eyre::Result;
use diary::cli::{self, Cli, Commands};
use diary::{Config, EntryStore, MotivationStore, Profile, SqliteStorage, ThemePreferences};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    // Logs go to stderr so command output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("diary=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Determine profile: --dev flag enables dev mode, otherwise use prod
    let profile = if cli.dev {
        Profile::Dev
    } else {
        Profile::Prod
    };

    // An explicit config file wins over the profile's default location
    let config = match &cli.config {
        Some(path) => Config::load_from_path(Path::new(path))?,
        None => Config::load_with_profile(profile)?,
    };

    // All stores share one database
    let storage = Arc::new(SqliteStorage::open(&config.get_database_path())?);
    let entries = EntryStore::new(Arc::clone(&storage));
    let motivation = MotivationStore::new(Arc::clone(&storage));
    let preferences = ThemePreferences::new(Arc::clone(&storage));

    let today = diary::utils::today();

    // Dispatch to appropriate command handler
    match cli.command.unwrap_or(Commands::Today) {
        Commands::Today => cli::handle_today(&entries, &config, today)?,
        Commands::Write { text, date, title, audio, important, mood } => {
            cli::handle_write(text, date, title, audio, important, mood, &entries, today)?;
        }
        Commands::List { month, important } => {
            cli::handle_list(month, important, &entries, today)?;
        }
        Commands::Recent => cli::handle_recent(&entries, &config, today)?,
        Commands::Show { date } => cli::handle_show(date, &entries)?,
        Commands::Delete { id } => cli::handle_delete(id, &entries)?,
        Commands::Star { id } => cli::handle_star(id, &entries)?,
        Commands::Stats => cli::handle_stats(&entries, today)?,
        Commands::Motivation { command } => {
            cli::handle_motivation(command, &motivation, today)?;
        }
        Commands::Theme { mode } => cli::handle_theme(mode, &preferences)?,
        Commands::Quote { date } => cli::handle_quote(date, today)?,
    }

    Ok(())
}
