use std::fs;

use chrono::NaiveDate;
use flowlog::io::storage::{JsonFileStorage, TaskStorage};
use flowlog::model::task::{Subtask, Task, TaskStatus};
use flowlog::ops::store::TaskStore;
use flowlog::ops::task_ops::new_task;
use pretty_assertions::assert_eq;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn full_task() -> Task {
    let mut task = new_task("T-007".into(), "Ship v2 \u{1F680}", Some(date("2025-06-01")), date("2025-05-10"));
    task.description = "first line\nsecond line".into();
    task.status = TaskStatus::Ongoing;
    task.start_date = date("2025-05-12");
    task.hard_deadline = Some(date("2025-05-30"));
    task.auto_progress = true;
    task.progress = 50;
    task.subtasks = vec![
        Subtask {
            id: "T-007.1".into(),
            text: "write notes".into(),
            done: true,
        },
        Subtask {
            id: "T-007.2".into(),
            text: "tag release".into(),
            done: false,
        },
    ];
    task.created_at = 1_715_300_000_000;
    task
}

// ============================================================================
// JSON file round-trip
// ============================================================================

#[test]
fn round_trip_every_field() {
    let tmp = tempfile::TempDir::new().unwrap();
    let mut storage = JsonFileStorage::new(tmp.path());
    let mut plain = new_task("T-001".into(), "plain", None, date("2025-05-10"));
    plain.created_at = 1;
    let tasks = vec![plain, full_task()];

    storage.write(&tasks).unwrap();
    assert_eq!(storage.read().unwrap(), tasks);
}

#[test]
fn round_trip_is_stable_on_disk() {
    let tmp = tempfile::TempDir::new().unwrap();
    let mut storage = JsonFileStorage::new(tmp.path());
    storage.write(&[full_task()]).unwrap();
    let first = fs::read_to_string(storage.path()).unwrap();

    let tasks = storage.read().unwrap();
    storage.write(&tasks).unwrap();
    let second = fs::read_to_string(storage.path()).unwrap();

    assert_eq!(second, first);
}

#[test]
fn file_uses_camel_case_keys() {
    let tmp = tempfile::TempDir::new().unwrap();
    let mut storage = JsonFileStorage::new(tmp.path());
    storage.write(&[full_task()]).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(storage.path()).unwrap()).unwrap();
    let task = &value[0];
    assert_eq!(task["plannedEndDate"], "2025-06-01");
    assert_eq!(task["startDate"], "2025-05-12");
    assert_eq!(task["hardDeadline"], "2025-05-30");
    assert_eq!(task["autoProgress"], true);
    assert_eq!(task["status"], "ongoing");
    assert_eq!(task["subtasks"][0]["done"], true);
}

#[test]
fn missing_optional_fields_default() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(
        tmp.path().join("tasks.json"),
        r#"[{
  "id": "T-001",
  "title": "minimal",
  "status": "inbox",
  "startDate": "2025-05-10",
  "plannedEndDate": "2025-05-10",
  "createdAt": 5
}]"#,
    )
    .unwrap();

    let tasks = JsonFileStorage::new(tmp.path()).read().unwrap();
    assert_eq!(tasks.len(), 1);
    let task = &tasks[0];
    assert_eq!(task.description, "");
    assert_eq!(task.progress, 0);
    assert_eq!(task.hard_deadline, None);
    assert!(task.subtasks.is_empty());
    assert!(!task.auto_progress);
}

#[test]
fn missing_file_reads_empty() {
    let tmp = tempfile::TempDir::new().unwrap();
    let storage = JsonFileStorage::new(&tmp.path().join("not-created-yet"));
    assert_eq!(storage.read().unwrap(), Vec::<Task>::new());
}

// ============================================================================
// Store persistence
// ============================================================================

#[test]
fn store_changes_survive_reload() {
    let tmp = tempfile::TempDir::new().unwrap();
    let today = date("2025-05-10");

    let mut store = TaskStore::new(Box::new(JsonFileStorage::new(tmp.path()))).with_today(today);
    store.load_from_storage();
    let id = store.add_task("persist me", Some(date("2025-05-20")));
    store.promote(&id).unwrap();
    store.add_subtask(&id, "half").unwrap();
    store.add_subtask(&id, "other half").unwrap();

    let mut reloaded =
        TaskStore::new(Box::new(JsonFileStorage::new(tmp.path()))).with_today(today);
    reloaded.load_from_storage();
    assert_eq!(reloaded.tasks(), store.tasks());

    let task = reloaded.get(&id).unwrap();
    assert_eq!(task.status, TaskStatus::Ongoing);
    assert_eq!(task.start_date, today);
    assert_eq!(task.subtasks.len(), 2);
}

#[test]
fn corrupt_file_loads_empty_and_is_logged() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(tmp.path().join("tasks.json"), "[{\"id\": ").unwrap();

    let mut store = TaskStore::new(Box::new(JsonFileStorage::new(tmp.path())));
    store.load_from_storage();
    assert!(store.tasks().is_empty());

    let log = fs::read_to_string(tmp.path().join(".recovery.log")).unwrap();
    assert!(log.contains("[{\"id\": "));
}
