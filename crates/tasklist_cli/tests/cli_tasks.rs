use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

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

fn stored_tasks(store_path: &Path) -> serde_json::Value {
    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store_path).unwrap()).expect("stored json");
    let raw = stored["entries"]["tasks"].as_str().expect("tasks entry");
    serde_json::from_str(raw).expect("tasks json")
}

fn stored_texts(store_path: &Path) -> Vec<String> {
    stored_tasks(store_path)
        .as_array()
        .unwrap()
        .iter()
        .map(|task| task["text"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn add_command_persists_task() {
    let store_path = temp_path("cli-add.json");
    let output = run(&store_path, &["add", "  demo task  "]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added task #1: demo task"));
    assert_eq!(
        stored_tasks(&store_path),
        serde_json::json!([{ "text": "demo task", "done": false }])
    );

    std::fs::remove_file(&store_path).ok();
}

#[test]
fn add_command_ignores_blank_text() {
    let store_path = temp_path("cli-add-blank.json");
    let output = run(&store_path, &["add", "   "]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Nothing added"));
    assert!(!store_path.exists());
}

#[test]
fn remove_command_shifts_positions() {
    let store_path = temp_path("cli-remove.json");
    for text in ["a", "b", "c"] {
        assert!(run(&store_path, &["add", text]).status.success());
    }

    let output = run(&store_path, &["remove", "2"]);
    assert!(output.status.success());
    assert_eq!(stored_texts(&store_path), vec!["a", "c"]);

    std::fs::remove_file(&store_path).ok();
}

#[test]
fn remove_command_reports_missing_position() {
    let store_path = temp_path("cli-remove-missing.json");
    assert!(run(&store_path, &["add", "only"]).status.success());

    let output = run(&store_path, &["remove", "5"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: out_of_range"));
    assert_eq!(stored_texts(&store_path), vec!["only"]);

    std::fs::remove_file(&store_path).ok();
}

#[test]
fn done_and_undo_toggle_flag() {
    let store_path = temp_path("cli-done.json");
    assert!(run(&store_path, &["add", "laundry"]).status.success());

    let output = run(&store_path, &["done", "1"]);
    assert!(output.status.success());
    assert_eq!(stored_tasks(&store_path)[0]["done"], true);

    let output = run(&store_path, &["done", "1", "--undo"]);
    assert!(output.status.success());
    assert_eq!(stored_tasks(&store_path)[0]["done"], false);

    std::fs::remove_file(&store_path).ok();
}

#[test]
fn edit_command_replaces_text() {
    let store_path = temp_path("cli-edit.json");
    assert!(run(&store_path, &["add", "old"]).status.success());

    let output = run(&store_path, &["--json", "edit", "1", "new text"]);

    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(parsed["text"], "new text");
    assert_eq!(parsed["position"], 1);
    assert_eq!(stored_texts(&store_path), vec!["new text"]);

    std::fs::remove_file(&store_path).ok();
}

#[test]
fn move_command_reorders_tasks() {
    let store_path = temp_path("cli-move.json");
    for text in ["a", "b", "c", "d"] {
        assert!(run(&store_path, &["add", text]).status.success());
    }

    assert!(run(&store_path, &["move", "1", "3"]).status.success());
    assert_eq!(stored_texts(&store_path), vec!["b", "c", "a", "d"]);

    assert!(run(&store_path, &["move", "3", "1"]).status.success());
    assert_eq!(stored_texts(&store_path), vec!["a", "b", "c", "d"]);

    std::fs::remove_file(&store_path).ok();
}

#[test]
fn list_command_prints_table_and_json() {
    let store_path = temp_path("cli-list.json");
    assert!(run(&store_path, &["add", "first"]).status.success());
    assert!(run(&store_path, &["add", "second"]).status.success());
    assert!(run(&store_path, &["done", "2"]).status.success());

    let output = run(&store_path, &["list"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("first"));
    assert!(stdout.contains("[x]"));

    let output = run(&store_path, &["--json", "list"]);
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(parsed.as_array().unwrap().len(), 2);
    assert_eq!(parsed[1]["position"], 2);
    assert_eq!(parsed[1]["done"], true);

    std::fs::remove_file(&store_path).ok();
}

#[test]
fn list_command_on_empty_store() {
    let store_path = temp_path("cli-list-empty.json");
    let output = run(&store_path, &["list"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No tasks."));
}

#[test]
fn toggle_hide_show_update_settings() {
    let store_path = temp_path("cli-toggle.json");

    let output = run(&store_path, &["toggle"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("now hidden"));

    let output = run(&store_path, &["--json", "status"]);
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(parsed["hidden"], true);
    assert_eq!(parsed["lastCheckedTime"], "Never");

    assert!(run(&store_path, &["show"]).status.success());
    let output = run(&store_path, &["status"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("To-do list: visible"));
    assert!(stdout.contains("Last check: Never"));

    std::fs::remove_file(&store_path).ok();
}

#[test]
fn corrupt_store_is_reported() {
    let store_path = temp_path("cli-corrupt.json");
    std::fs::write(&store_path, "{ not json").unwrap();

    let output = run(&store_path, &["list"]);
    std::fs::remove_file(&store_path).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_data"));
}
