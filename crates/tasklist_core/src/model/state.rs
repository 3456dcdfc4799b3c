use crate::model::Task;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

pub const NEVER: &str = "Never";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub hidden: bool,
}

/// Moment of the most recent scheduler tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LastChecked {
    #[default]
    Never,
    At(OffsetDateTime),
}

impl LastChecked {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        if trimmed == NEVER {
            return Ok(Self::Never);
        }
        OffsetDateTime::parse(trimmed, &Rfc3339)
            .map(Self::At)
            .map_err(|_| format!("'{trimmed}' is neither \"{NEVER}\" nor an RFC3339 timestamp"))
    }

    pub fn to_storage_string(&self) -> String {
        match self {
            Self::Never => NEVER.to_string(),
            Self::At(at) => at
                .to_offset(UtcOffset::UTC)
                .format(&Rfc3339)
                .unwrap_or_else(|_| NEVER.to_string()),
        }
    }

    /// Moves forward to `now`; an earlier reading leaves the value untouched.
    pub fn advance(&mut self, now: OffsetDateTime) -> bool {
        match self {
            Self::At(previous) if *previous > now => false,
            _ => {
                *self = Self::At(now);
                true
            }
        }
    }

    /// `HH:MM` in the given offset, or `Never`.
    pub fn clock_label(&self, offset: UtcOffset) -> String {
        match self {
            Self::Never => NEVER.to_string(),
            Self::At(at) => at
                .to_offset(offset)
                .format(format_description!("[hour]:[minute]"))
                .unwrap_or_else(|_| NEVER.to_string()),
        }
    }
}

impl fmt::Display for LastChecked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_storage_string())
    }
}

impl Serialize for LastChecked {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_storage_string())
    }
}

impl<'de> Deserialize<'de> for LastChecked {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        LastChecked::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Full exportable state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub tasks: Vec<Task>,
    pub settings: Settings,
    pub last_checked_time: LastChecked,
}
