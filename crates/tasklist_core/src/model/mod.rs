mod state;
mod task;

pub use state::{LastChecked, NEVER, Settings, Snapshot};
pub use task::{Schedule, Task, WeekDays, Weekday};
