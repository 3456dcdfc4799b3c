use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub text: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
}

impl Task {
    pub fn new<T: Into<String>>(text: T) -> Self {
        Self {
            text: text.into(),
            done: false,
            schedule: None,
        }
    }

    /// True when a completed task is due to be reset at the given slot.
    pub fn resets_at(&self, time: &str, day: Weekday) -> bool {
        self.done
            && self
                .schedule
                .as_ref()
                .is_some_and(|schedule| schedule.matches(time, day))
    }
}

/// Weekly recurrence: the `HH:MM` slot on the reference clock and the days it applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub time: String,
    #[serde(default)]
    pub days: WeekDays,
}

impl Schedule {
    pub fn new<T: Into<String>>(time: T, days: WeekDays) -> Self {
        Self {
            time: time.into(),
            days,
        }
    }

    pub fn matches(&self, time: &str, day: Weekday) -> bool {
        self.time == time && self.days.is_active(day)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Mon => "mon",
            Self::Tue => "tue",
            Self::Wed => "wed",
            Self::Thu => "thu",
            Self::Fri => "fri",
            Self::Sat => "sat",
            Self::Sun => "sun",
        }
    }

    pub fn is_weekend(self) -> bool {
        matches!(self, Self::Sat | Self::Sun)
    }
}

impl From<time::Weekday> for Weekday {
    fn from(day: time::Weekday) -> Self {
        match day {
            time::Weekday::Monday => Self::Mon,
            time::Weekday::Tuesday => Self::Tue,
            time::Weekday::Wednesday => Self::Wed,
            time::Weekday::Thursday => Self::Thu,
            time::Weekday::Friday => Self::Fri,
            time::Weekday::Saturday => Self::Sat,
            time::Weekday::Sunday => Self::Sun,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Weekday {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let lowered = raw.trim().to_ascii_lowercase();
        Weekday::ALL
            .into_iter()
            .find(|day| lowered == day.key())
            .ok_or_else(|| format!("unknown weekday '{}'", raw.trim()))
    }
}

/// Per-weekday flags. A missing key reads as inactive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekDays(BTreeMap<Weekday, bool>);

impl WeekDays {
    pub fn is_active(&self, day: Weekday) -> bool {
        self.0.get(&day).copied().unwrap_or(false)
    }

    pub fn set(&mut self, day: Weekday, active: bool) {
        self.0.insert(day, active);
    }

    pub fn active_days(&self) -> Vec<Weekday> {
        Weekday::ALL
            .into_iter()
            .filter(|day| self.is_active(*day))
            .collect()
    }
}

impl FromIterator<Weekday> for WeekDays {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut days = WeekDays::default();
        for day in iter {
            days.set(day, true);
        }
        days
    }
}
