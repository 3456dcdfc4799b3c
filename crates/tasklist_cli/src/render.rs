use tabled::settings::Style;
use tabled::{Table, Tabled};
use tasklist_core::config::Palette;
use tasklist_core::model::{Schedule, Task};

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Done")]
    done: &'static str,
    #[tabled(rename = "Task")]
    text: String,
    #[tabled(rename = "Resets")]
    schedule: String,
}

pub fn schedule_label(schedule: Option<&Schedule>) -> String {
    match schedule {
        Some(schedule) => {
            let days = schedule.days.active_days();
            if days.is_empty() {
                format!("{} (no days)", schedule.time)
            } else {
                let keys: Vec<&str> = days.iter().map(|day| day.key()).collect();
                format!("{} {}", schedule.time, keys.join(","))
            }
        }
        None => "-".to_string(),
    }
}

pub fn task_table(tasks: &[Task], palette: &Palette) -> String {
    let rows = tasks.iter().enumerate().map(|(index, task)| TaskRow {
        position: index + 1,
        done: if task.done { "[x]" } else { "[ ]" },
        text: if task.done {
            palette.completed(&task.text)
        } else {
            task.text.clone()
        },
        schedule: schedule_label(task.schedule.as_ref()),
    });

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

pub fn task_json(position: usize, task: &Task) -> serde_json::Value {
    serde_json::json!({
        "position": position,
        "text": task.text,
        "done": task.done,
        "schedule": task.schedule,
    })
}
