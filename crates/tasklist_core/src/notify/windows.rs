use crate::error::AppError;
use crate::model::Task;
use crate::notify::{APP_NAME, Notifier, reset_message};
use tauri_winrt_notification::Toast;

pub struct WindowsNotifier;

impl Notifier for WindowsNotifier {
    fn notify(&self, task: &Task) -> Result<(), AppError> {
        Toast::new(Toast::POWERSHELL_APP_ID)
            .title(APP_NAME)
            .text1("Recurring task is due")
            .text2(&reset_message(task))
            .show()
            .map_err(|err| AppError::notify(err.to_string()))
    }
}
