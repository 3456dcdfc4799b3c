pub mod config;
pub mod error;
pub mod model;
pub mod notify;
pub mod scheduler;
pub mod storage;
pub mod store;

pub use error::AppError;
pub use scheduler::{Clock, ResetScheduler, SystemClock, TickReport};
pub use store::{Change, DragSession, TaskStore};

#[cfg(test)]
mod tests {
    use crate::error::AppError;
    use crate::model::Task;

    #[test]
    fn task_has_required_fields() {
        let task = Task::new("demo");

        assert_eq!(task.text, "demo");
        assert!(!task.done);
        assert_eq!(task.schedule, None);
    }

    #[test]
    fn app_error_exposes_code() {
        let err = AppError::invalid_format("missing text");
        assert_eq!(err.code(), "invalid_format");
    }
}
