//! Desktop notifications for tasks unchecked by the scheduler.

use crate::error::AppError;
use crate::model::Task;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::LinuxNotifier;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WindowsNotifier;

const APP_NAME: &str = "tasklist";

pub trait Notifier {
    fn notify(&self, task: &Task) -> Result<(), AppError>;
}

pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _task: &Task) -> Result<(), AppError> {
        Ok(())
    }
}

pub fn notifier_from_env() -> Box<dyn Notifier> {
    if std::env::var("TASKLIST_DISABLE_NOTIFICATIONS").is_ok() {
        return Box::new(NoopNotifier);
    }

    platform_notifier().unwrap_or_else(|err| {
        tracing::debug!(error = %err, "desktop notifications unavailable");
        Box::new(NoopNotifier)
    })
}

/// Line shown in the notification body.
pub fn reset_message(task: &Task) -> String {
    match task.schedule.as_ref() {
        Some(schedule) => format!("{} (due again at {})", task.text, schedule.time),
        None => task.text.clone(),
    }
}

#[cfg(target_os = "linux")]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(LinuxNotifier))
}

#[cfg(windows)]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(WindowsNotifier))
}

#[cfg(not(any(target_os = "linux", windows)))]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Err(AppError::notify(
        "notifications are not supported on this platform",
    ))
}
