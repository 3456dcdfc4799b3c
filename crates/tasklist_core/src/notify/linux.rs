use crate::error::AppError;
use crate::model::Task;
use crate::notify::{APP_NAME, Notifier, reset_message};
use notify_rust::Notification;

pub struct LinuxNotifier;

impl Notifier for LinuxNotifier {
    fn notify(&self, task: &Task) -> Result<(), AppError> {
        Notification::new()
            .appname(APP_NAME)
            .summary("Recurring task is due")
            .body(&reset_message(task))
            .show()
            .map_err(|err| AppError::notify(err.to_string()))?;
        Ok(())
    }
}
