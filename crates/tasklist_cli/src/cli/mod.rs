use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tasklist_core::config::ConfigOverrides;
use tasklist_core::error::AppError;
use tasklist_core::model::{WeekDays, Weekday};
use time::Time;
use time::macros::format_description;

#[derive(Parser, Debug)]
#[command(name = "tasklist", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a task at the end of the list
    ///
    /// Example: tasklist add "Buy milk"
    Add { text: Option<String> },
    /// Delete a task
    ///
    /// Example: tasklist remove 2
    Remove { position: usize },
    /// Check a task off, or uncheck it with --undo
    ///
    /// Example: tasklist done 1
    /// Example: tasklist done 1 --undo
    Done {
        position: usize,
        #[arg(long)]
        undo: bool,
    },
    /// Replace a task's text
    ///
    /// Example: tasklist edit 1 "Buy oat milk"
    Edit { position: usize, text: String },
    /// Move a task to another position
    ///
    /// Example: tasklist move 3 1
    Move { from: usize, to: usize },
    /// Uncheck a task automatically at a time on given weekdays
    ///
    /// Example: tasklist schedule 1 09:00 mon,wed,fri
    /// Example: tasklist schedule 2 18:30 weekdays
    Schedule {
        position: usize,
        time: String,
        #[arg(required = true, num_args = 1..)]
        days: Vec<String>,
    },
    /// Remove a task's schedule
    ///
    /// Example: tasklist unschedule 1
    Unschedule { position: usize },
    /// List tasks in order
    ///
    /// Example: tasklist list
    List,
    /// Print the whole state as JSON
    ///
    /// Example: tasklist export > backup.json
    Export,
    /// Load state from JSON (stdin when no file is given)
    ///
    /// Example: tasklist import backup.json
    Import { file: Option<PathBuf> },
    /// Flip panel visibility
    Toggle,
    /// Hide the panel
    Hide,
    /// Show the panel
    Show,
    /// Show visibility and the last scheduler check
    Status,
    /// Run one scheduler check now
    Tick,
    /// Run the scheduler until interrupted
    Watch,
}

pub const CONFIG_OVERRIDE_FLAG: &str = "--config-override";

/// Folds `--config-override KEY=VALUE` arguments into [`ConfigOverrides`].
///
/// Keys ignore case, and `-` or `.` may stand in for `_`.
pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        apply_override(&mut overrides, entry)
            .map_err(|err| AppError::invalid_input(format!("{CONFIG_OVERRIDE_FLAG}: {err}")))?;
    }
    Ok(overrides)
}

fn apply_override(overrides: &mut ConfigOverrides, entry: &str) -> Result<(), String> {
    let (key, value) = entry
        .split_once('=')
        .ok_or_else(|| format!("'{}' is not KEY=VALUE", entry.trim()))?;
    let key = key.trim().to_ascii_lowercase().replace(['-', '.'], "_");
    let value = value.trim();

    match key.as_str() {
        "theme" => overrides.theme = Some(value.to_string()),
        "reference_offset" | "offset" => overrides.reference_offset = Some(value.to_string()),
        "tick_interval" | "tick_interval_secs" => {
            let secs = value
                .parse::<u64>()
                .map_err(|_| "tick_interval must be a number of seconds".to_string())?;
            overrides.tick_interval_secs = Some(secs);
        }
        "" => return Err("override key cannot be empty".to_string()),
        other => return Err(format!("unknown config field '{other}'")),
    }
    Ok(())
}

/// Turns a 1-based list position into a store index.
pub fn resolve_position(position: usize, len: usize) -> Result<usize, AppError> {
    if position == 0 || position > len {
        return Err(AppError::out_of_range(position, len));
    }
    Ok(position - 1)
}

/// Normalizes `9:00` / `09:00` to the zero-padded `HH:MM` the scheduler compares against.
pub fn parse_clock(raw: &str) -> Result<String, AppError> {
    let parsed = Time::parse(
        raw.trim(),
        format_description!("[hour padding:none]:[minute]"),
    )
    .map_err(|_| AppError::invalid_input(format!("time '{}' must be HH:MM", raw.trim())))?;
    parsed
        .format(format_description!("[hour]:[minute]"))
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

/// Accepts weekday keys separated by commas or spaces, plus `daily`, `weekdays` and `weekends`.
pub fn parse_days(raw: &[String]) -> Result<WeekDays, AppError> {
    let mut selected = Vec::new();
    for token in raw
        .iter()
        .flat_map(|arg| arg.split([',', ' ']))
        .map(str::trim)
        .filter(|token| !token.is_empty())
    {
        match token.to_ascii_lowercase().as_str() {
            "daily" | "everyday" => selected.extend(Weekday::ALL),
            "weekdays" => selected.extend(Weekday::ALL.into_iter().filter(|day| !day.is_weekend())),
            "weekends" => selected.extend(Weekday::ALL.into_iter().filter(|day| day.is_weekend())),
            _ => selected.push(token.parse::<Weekday>().map_err(AppError::invalid_input)?),
        }
    }

    if selected.is_empty() {
        return Err(AppError::invalid_input("at least one weekday is required"));
    }
    Ok(selected.into_iter().collect())
}
