//! User configuration: display theme, reference clock and scheduler period.

use crate::error::AppError;
use crate::scheduler::{DEFAULT_TICK_INTERVAL, ResetScheduler};
use crate::storage::app_file;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use time::UtcOffset;
use time::macros::format_description;

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "TASKLIST_CONFIG_PATH";

const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escapes for the two highlighted pieces of output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub accent: &'static str,
    pub done: &'static str,
}

impl Palette {
    pub const PLAIN: Palette = Palette {
        accent: "",
        done: "",
    };

    pub fn highlight(&self, text: &str) -> String {
        paint(self.accent, text)
    }

    pub fn completed(&self, text: &str) -> String {
        paint(self.done, text)
    }
}

fn paint(code: &str, text: &str) -> String {
    if code.is_empty() {
        text.to_string()
    } else {
        format!("{code}{text}{ANSI_RESET}")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Plain,
    Noir,
    Solarized,
}

impl Theme {
    /// Loose lookup: case and punctuation are ignored, unknown names read as plain.
    pub fn from_name(raw: &str) -> Self {
        let squashed: String = raw
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|ch| ch.to_ascii_lowercase())
            .collect();

        match squashed.as_str() {
            "noir" | "dark" | "darkmode" => Self::Noir,
            "solarized" => Self::Solarized,
            _ => Self::Plain,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Noir => "noir",
            Self::Solarized => "solarized",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Self::Plain => Palette::PLAIN,
            Self::Noir => Palette {
                accent: "\x1b[38;5;141m",
                done: "\x1b[9;38;5;245m",
            },
            Self::Solarized => Palette {
                accent: "\x1b[38;5;37m",
                done: "\x1b[9;38;5;246m",
            },
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: Option<String>,
    /// Fixed offset of the reference clock, e.g. `"+00:00"`. Defaults to UTC.
    #[serde(default)]
    pub reference_offset: Option<String>,
    #[serde(default)]
    pub tick_interval_secs: Option<u64>,
}

impl Config {
    pub fn theme(&self) -> Theme {
        self.theme
            .as_deref()
            .map(Theme::from_name)
            .unwrap_or_default()
    }

    pub fn reference_offset(&self) -> Result<UtcOffset, AppError> {
        match self.reference_offset.as_deref() {
            Some(raw) => parse_offset(raw),
            None => Ok(UtcOffset::UTC),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TICK_INTERVAL)
    }

    pub fn scheduler(&self) -> Result<ResetScheduler, AppError> {
        ResetScheduler::new(self.reference_offset()?, self.tick_interval())
    }

    /// Returns a copy with every present override applied.
    pub fn with_overrides(&self, overrides: &ConfigOverrides) -> Config {
        Config {
            theme: overrides
                .theme
                .as_deref()
                .map(|name| Theme::from_name(name).name().to_string())
                .or_else(|| self.theme.clone()),
            reference_offset: overrides
                .reference_offset
                .clone()
                .or_else(|| self.reference_offset.clone()),
            tick_interval_secs: overrides.tick_interval_secs.or(self.tick_interval_secs),
        }
    }
}

/// Accepts `Z`, `UTC`, `+HH:MM` or `-HH:MM`.
pub fn parse_offset(raw: &str) -> Result<UtcOffset, AppError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
        return Ok(UtcOffset::UTC);
    }
    UtcOffset::parse(
        trimmed,
        format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
    )
    .map_err(|_| AppError::invalid_data(format!("reference_offset '{trimmed}' must look like +HH:MM")))
}

/// Result of loading the config file. A broken file still yields defaults,
/// with the reason kept in `warning`.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub warning: Option<AppError>,
}

impl ConfigLoad {
    fn defaults(warning: Option<AppError>) -> Self {
        Self {
            config: Config::default(),
            warning,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub theme: Option<String>,
    pub reference_offset: Option<String>,
    pub tick_interval_secs: Option<u64>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    app_file(CONFIG_ENV_VAR, CONFIG_FILE_NAME)
}

pub fn load_config() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_at(&path),
        Err(err) => ConfigLoad::defaults(Some(err)),
    }
}

fn load_config_at(path: &Path) -> ConfigLoad {
    match read_config(path) {
        Ok(Some(config)) => ConfigLoad {
            config,
            warning: None,
        },
        Ok(None) => ConfigLoad::defaults(None),
        Err(err) => ConfigLoad::defaults(Some(err)),
    }
}

fn read_config(path: &Path) -> Result<Option<Config>, AppError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(AppError::storage(format!("{}: {}", path.display(), err))),
    };

    let config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    config.scheduler()?;
    tracing::debug!(path = %path.display(), theme = config.theme().name(), "loaded config");
    Ok(Some(config))
}
