//! The task store: ordered tasks, panel settings and the last scheduler check.
//!
//! Every mutating call writes the affected key(s) through the backing
//! [`KeyValueStore`] before returning, then tells subscribers what changed.

use crate::error::AppError;
use crate::model::{LastChecked, Schedule, Settings, Snapshot, Task, WeekDays, Weekday};
use crate::storage::{KeyValueStore, LAST_CHECKED_KEY, SETTINGS_KEY, TASKS_KEY};
use serde::Deserialize;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Tasks,
    Settings,
    LastChecked,
    Imported,
}

type Listener = Box<dyn FnMut(Change)>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartialSnapshot {
    #[serde(default)]
    tasks: Option<Vec<Task>>,
    #[serde(default)]
    settings: Option<Settings>,
    #[serde(default)]
    last_checked_time: Option<LastChecked>,
}

pub struct TaskStore<S: KeyValueStore> {
    storage: S,
    tasks: Vec<Task>,
    settings: Settings,
    last_checked: LastChecked,
    listeners: Vec<Listener>,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Loads state from `storage`; missing keys fall back to defaults.
    pub fn open(storage: S) -> Result<Self, AppError> {
        let tasks = match storage.get(TASKS_KEY)? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|err| AppError::invalid_data(format!("stored tasks: {err}")))?,
            None => Vec::new(),
        };
        let settings = match storage.get(SETTINGS_KEY)? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|err| AppError::invalid_data(format!("stored settings: {err}")))?,
            None => Settings::default(),
        };
        let last_checked = match storage.get(LAST_CHECKED_KEY)? {
            Some(raw) => LastChecked::parse(&raw)
                .map_err(|err| AppError::invalid_data(format!("stored {LAST_CHECKED_KEY}: {err}")))?,
            None => LastChecked::Never,
        };

        tracing::debug!(tasks = tasks.len(), hidden = settings.hidden, "opened task store");

        Ok(Self {
            storage,
            tasks,
            settings,
            last_checked,
            listeners: Vec::new(),
        })
    }

    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(Change) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn last_checked(&self) -> LastChecked {
        self.last_checked
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Appends a new unchecked task. Blank text is ignored and yields `None`.
    pub fn add(&mut self, text: &str) -> Result<Option<usize>, AppError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        self.tasks.push(Task::new(trimmed));
        self.commit_tasks()?;
        Ok(Some(self.tasks.len() - 1))
    }

    pub fn remove(&mut self, index: usize) -> Result<Task, AppError> {
        self.check_index(index)?;
        let removed = self.tasks.remove(index);
        self.commit_tasks()?;
        Ok(removed)
    }

    pub fn toggle_done(&mut self, index: usize, done: bool) -> Result<(), AppError> {
        self.task_mut(index)?.done = done;
        self.commit_tasks()
    }

    pub fn set_text(&mut self, index: usize, text: &str) -> Result<(), AppError> {
        self.task_mut(index)?.text = text.to_string();
        self.commit_tasks()
    }

    /// Moves the task at `from` so it ends up at `to` in the resulting list.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), AppError> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from == to {
            return Ok(());
        }

        let task = self.tasks.remove(from);
        self.tasks.insert(to, task);
        self.commit_tasks()
    }

    pub fn set_schedule(&mut self, index: usize, time: &str, days: WeekDays) -> Result<(), AppError> {
        self.task_mut(index)?.schedule = Some(Schedule::new(time, days));
        self.commit_tasks()
    }

    pub fn clear_schedule(&mut self, index: usize) -> Result<(), AppError> {
        self.task_mut(index)?.schedule = None;
        self.commit_tasks()
    }

    pub fn export_snapshot(&self) -> Snapshot {
        Snapshot {
            tasks: self.tasks.clone(),
            settings: self.settings.clone(),
            last_checked_time: self.last_checked,
        }
    }

    pub fn export_text(&self) -> Result<String, AppError> {
        serde_json::to_string_pretty(&self.export_snapshot())
            .map_err(|err| AppError::invalid_data(err.to_string()))
    }

    /// Merges the fields present in `text` over the current state, then writes all keys.
    pub fn import_snapshot(&mut self, text: &str) -> Result<(), AppError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|err| AppError::invalid_format(err.to_string()))?;
        if !value.is_object() {
            return Err(AppError::invalid_format("expected a JSON object"));
        }
        let partial: PartialSnapshot =
            serde_json::from_value(value).map_err(|err| AppError::invalid_format(err.to_string()))?;

        if let Some(tasks) = partial.tasks {
            self.tasks = tasks;
        }
        if let Some(settings) = partial.settings {
            self.settings = settings;
        }
        if let Some(last_checked) = partial.last_checked_time {
            self.last_checked = last_checked;
        }

        self.persist_tasks()?;
        self.persist_settings()?;
        self.persist_last_checked()?;
        tracing::info!(tasks = self.tasks.len(), "imported snapshot");
        self.notify(Change::Imported);
        Ok(())
    }

    /// Flips panel visibility and returns the new `hidden` value.
    pub fn toggle_visibility(&mut self) -> Result<bool, AppError> {
        self.settings.hidden = !self.settings.hidden;
        self.commit_settings()?;
        Ok(self.settings.hidden)
    }

    pub fn set_hidden(&mut self, hidden: bool) -> Result<(), AppError> {
        self.settings.hidden = hidden;
        self.commit_settings()
    }

    pub fn save_settings(&mut self) -> Result<(), AppError> {
        self.commit_settings()
    }

    /// Stamps the check time. Returns false when `now` is older than the stored value.
    pub fn record_check(&mut self, now: OffsetDateTime) -> Result<bool, AppError> {
        if !self.last_checked.advance(now) {
            tracing::warn!(
                now = %LastChecked::At(now),
                stored = %self.last_checked,
                "clock reads earlier than last check"
            );
            return Ok(false);
        }
        self.persist_last_checked()?;
        self.notify(Change::LastChecked);
        Ok(true)
    }

    /// Unchecks every completed task scheduled for `time` on `day`, then writes the list once.
    pub fn reset_matching(&mut self, time: &str, day: Weekday) -> Result<Vec<usize>, AppError> {
        let mut reset = Vec::new();
        for (index, task) in self.tasks.iter_mut().enumerate() {
            if task.resets_at(time, day) {
                task.done = false;
                reset.push(index);
            }
        }

        for index in &reset {
            tracing::info!(index, text = %self.tasks[*index].text, time, %day, "reset recurring task");
        }

        self.commit_tasks()?;
        Ok(reset)
    }

    fn check_index(&self, index: usize) -> Result<(), AppError> {
        if index < self.tasks.len() {
            Ok(())
        } else {
            Err(AppError::out_of_range(index, self.tasks.len()))
        }
    }

    fn task_mut(&mut self, index: usize) -> Result<&mut Task, AppError> {
        let len = self.tasks.len();
        self.tasks
            .get_mut(index)
            .ok_or_else(|| AppError::out_of_range(index, len))
    }

    fn commit_tasks(&mut self) -> Result<(), AppError> {
        self.persist_tasks()?;
        self.notify(Change::Tasks);
        Ok(())
    }

    fn commit_settings(&mut self) -> Result<(), AppError> {
        self.persist_settings()?;
        self.notify(Change::Settings);
        Ok(())
    }

    fn persist_tasks(&mut self) -> Result<(), AppError> {
        let content = serde_json::to_string(&self.tasks)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;
        self.storage.set(TASKS_KEY, &content)
    }

    fn persist_settings(&mut self) -> Result<(), AppError> {
        let content = serde_json::to_string(&self.settings)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;
        self.storage.set(SETTINGS_KEY, &content)
    }

    fn persist_last_checked(&mut self) -> Result<(), AppError> {
        let content = self.last_checked.to_storage_string();
        self.storage.set(LAST_CHECKED_KEY, &content)
    }

    fn notify(&mut self, change: Change) {
        for listener in &mut self.listeners {
            listener(change);
        }
    }
}

/// Tracks the task being dragged between `dragstart` and `drop`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DragSession {
    dragged: Option<usize>,
}

impl DragSession {
    pub fn start(&mut self, index: usize) {
        self.dragged = Some(index);
    }

    pub fn cancel(&mut self) {
        self.dragged = None;
    }

    pub fn dragged(&self) -> Option<usize> {
        self.dragged
    }

    /// Completes the drag onto `target`. Does nothing when no drag is active.
    pub fn drop_on<S: KeyValueStore>(
        &mut self,
        store: &mut TaskStore<S>,
        target: usize,
    ) -> Result<(), AppError> {
        match self.dragged.take() {
            Some(from) => store.reorder(from, target),
            None => Ok(()),
        }
    }
}
