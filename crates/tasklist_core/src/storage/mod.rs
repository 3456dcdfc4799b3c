//! String-valued key-value persistence.
//!
//! The store keeps three keys: [`TASKS_KEY`] and [`SETTINGS_KEY`] hold JSON,
//! [`LAST_CHECKED_KEY`] holds a raw timestamp or `Never`.

pub mod json_store;

use crate::error::AppError;
use std::collections::HashMap;
use std::path::PathBuf;

pub use json_store::JsonFileStore;

pub const TASKS_KEY: &str = "tasks";
pub const SETTINGS_KEY: &str = "settings";
pub const LAST_CHECKED_KEY: &str = "last_checked_time";

const APP_DIR: &str = "tasklist";

/// Path of one of the app's files: `env_var` when set and non-blank, else the
/// per-user config directory.
pub fn app_file(env_var: &str, file_name: &str) -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(env_var)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    let base = if cfg!(windows) {
        std::env::var("APPDATA")
            .map(PathBuf::from)
            .map_err(|_| AppError::invalid_data("APPDATA is not set"))?
    } else {
        std::env::var("HOME")
            .map(|home| PathBuf::from(home).join(".config"))
            .map_err(|_| AppError::invalid_data("HOME is not set"))?
    };
    Ok(base.join(APP_DIR).join(file_name))
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        (**self).set(key, value)
    }
}

/// In-process store. Counts writes per key so callers can see what was persisted.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    writes: HashMap<String, usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }

    pub fn writes(&self, key: &str) -> usize {
        self.writes.get(key).copied().unwrap_or(0)
    }

    pub fn total_writes(&self) -> usize {
        self.writes.values().sum()
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        self.entries.insert(key.to_string(), value.to_string());
        *self.writes.entry(key.to_string()).or_insert(0) += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyValueStore, MemoryStore};

    #[test]
    fn memory_store_counts_writes_per_key() {
        let mut store = MemoryStore::new();
        store.set("tasks", "[]").unwrap();
        store.set("tasks", "[]").unwrap();
        store.set("settings", "{}").unwrap();

        assert_eq!(store.writes("tasks"), 2);
        assert_eq!(store.writes("settings"), 1);
        assert_eq!(store.writes("last_checked_time"), 0);
        assert_eq!(store.total_writes(), 3);
        assert_eq!(store.get("settings").unwrap().as_deref(), Some("{}"));
        assert_eq!(store.get("missing").unwrap(), None);
    }
}
