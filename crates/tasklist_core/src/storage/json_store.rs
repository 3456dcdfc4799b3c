use crate::error::AppError;
use crate::storage::{KeyValueStore, app_file};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const SCHEMA_VERSION: u32 = 1;
const STORE_FILE_NAME: &str = "store.json";
const STORE_ENV_VAR: &str = "TASKLIST_STORE_PATH";

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredEntries {
    schema_version: u32,
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

pub fn store_path() -> Result<PathBuf, AppError> {
    app_file(STORE_ENV_VAR, STORE_FILE_NAME)
}

/// Key-value store backed by a single JSON file, rewritten on every `set`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    pub fn open_default() -> Result<Self, AppError> {
        let path = store_path()?;
        Self::open(&path)
    }

    pub fn open(path: &Path) -> Result<Self, AppError> {
        let entries = load_entries(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        let previous = self.entries.insert(key.to_string(), value.to_string());
        if let Err(err) = save_entries(&self.path, &self.entries) {
            match previous {
                Some(old) => self.entries.insert(key.to_string(), old),
                None => self.entries.remove(key),
            };
            return Err(err);
        }
        tracing::debug!(key, path = %self.path.display(), "persisted entry");
        Ok(())
    }
}

fn load_entries(path: &Path) -> Result<BTreeMap<String, String>, AppError> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::storage(format!("{}: {}", path.display(), err)))?;
    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    let stored: StoredEntries =
        serde_json::from_str(&content).map_err(|err| AppError::invalid_data(err.to_string()))?;

    if stored.schema_version != SCHEMA_VERSION {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }

    Ok(stored.entries)
}

fn save_entries(path: &Path, entries: &BTreeMap<String, String>) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| AppError::storage(err.to_string()))?;
    }

    let stored = StoredEntries {
        schema_version: SCHEMA_VERSION,
        entries: entries.clone(),
    };
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(path, content).map_err(|err| AppError::storage(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions)
            .map_err(|err| AppError::storage(err.to_string()))?;
    }

    Ok(())
}
