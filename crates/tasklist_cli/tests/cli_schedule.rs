use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};
use time::macros::format_description;
use time::{Duration, OffsetDateTime};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("tasklist-{nanos}-{file_name}"))
}

fn run(store_path: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tasklist"))
        .args(args)
        .env("TASKLIST_STORE_PATH", store_path)
        .env("TASKLIST_CONFIG_PATH", store_path.with_extension("config.json"))
        .env("TASKLIST_DISABLE_NOTIFICATIONS", "1")
        .output()
        .expect("failed to run tasklist")
}

fn write_tasks(path: &Path, tasks: serde_json::Value) {
    let content = serde_json::json!({
        "schema_version": 1,
        "entries": {
            "tasks": tasks.to_string(),
        }
    });
    std::fs::write(path, serde_json::to_string_pretty(&content).unwrap()).unwrap();
}

fn stored_entries(store_path: &Path) -> serde_json::Value {
    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store_path).unwrap()).expect("stored json");
    stored["entries"].clone()
}

fn stored_tasks(store_path: &Path) -> serde_json::Value {
    let raw = stored_entries(store_path)["tasks"]
        .as_str()
        .expect("tasks entry")
        .to_string();
    serde_json::from_str(&raw).expect("tasks json")
}

#[test]
fn schedule_command_normalizes_time_and_days() {
    let store_path = temp_path("cli-schedule.json");
    assert!(run(&store_path, &["add", "gym"]).status.success());

    let output = run(&store_path, &["schedule", "1", "9:00", "mon,wed", "fri"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("resets at 09:00 mon,wed,fri"));
    assert_eq!(
        stored_tasks(&store_path)[0]["schedule"],
        serde_json::json!({
            "time": "09:00",
            "days": { "mon": true, "wed": true, "fri": true }
        })
    );

    std::fs::remove_file(&store_path).ok();
}

#[test]
fn schedule_command_rejects_bad_time() {
    let store_path = temp_path("cli-schedule-bad.json");
    assert!(run(&store_path, &["add", "gym"]).status.success());

    let output = run(&store_path, &["schedule", "1", "25:00", "daily"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
    assert!(stored_tasks(&store_path)[0].get("schedule").is_none());

    std::fs::remove_file(&store_path).ok();
}

#[test]
fn unschedule_command_removes_field() {
    let store_path = temp_path("cli-unschedule.json");
    write_tasks(
        &store_path,
        serde_json::json!([
            {
                "text": "gym",
                "done": false,
                "schedule": { "time": "09:00", "days": { "mon": true } }
            }
        ]),
    );

    let output = run(&store_path, &["unschedule", "1"]);
    assert!(output.status.success());
    assert_eq!(
        stored_tasks(&store_path),
        serde_json::json!([{ "text": "gym", "done": false }])
    );

    let output = run(&store_path, &["unschedule", "1"]);
    assert!(output.status.success());

    std::fs::remove_file(&store_path).ok();
}

#[test]
fn tick_command_resets_task_due_now() {
    let store_path = temp_path("cli-tick.json");
    let slot = format_description!("[hour]:[minute]");
    let now = OffsetDateTime::now_utc();
    let this_minute = now.format(slot).unwrap();
    let next_minute = (now + Duration::minutes(1)).format(slot).unwrap();
    let daily = serde_json::json!({
        "mon": true, "tue": true, "wed": true, "thu": true,
        "fri": true, "sat": true, "sun": true
    });

    write_tasks(
        &store_path,
        serde_json::json!([
            { "text": "now", "done": true, "schedule": { "time": this_minute, "days": daily } },
            { "text": "soon", "done": true, "schedule": { "time": next_minute, "days": daily } },
            { "text": "plain", "done": true }
        ]),
    );

    let output = run(&store_path, &["--json", "tick"]);

    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(parsed["reset"].as_array().unwrap().len(), 1);

    let tasks = stored_tasks(&store_path);
    let still_done = tasks
        .as_array()
        .unwrap()
        .iter()
        .filter(|task| task["done"] == true)
        .count();
    assert_eq!(still_done, 2);
    assert_eq!(tasks[2]["done"], true);

    let last_checked = stored_entries(&store_path)["last_checked_time"]
        .as_str()
        .unwrap()
        .to_string();
    assert_ne!(last_checked, "Never");
    assert!(last_checked.ends_with('Z'));

    std::fs::remove_file(&store_path).ok();
}

#[test]
fn tick_command_rejects_slow_interval_override() {
    let store_path = temp_path("cli-tick-slow.json");

    let output = run(
        &store_path,
        &["--config-override", "tick_interval=120", "tick"],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
}
