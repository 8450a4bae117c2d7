use chrono::{Duration, Local, NaiveDate, Utc};

use crate::model::task::{Subtask, Task, TaskPatch, TaskStatus};

/// Error type for task operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("subtask not found: {subtask_id} (in {task_id})")]
    SubtaskNotFound { task_id: String, subtask_id: String },
    #[error("invalid date: {0} (expected YYYY-MM-DD, today, tomorrow or in Nd)")]
    InvalidDate(String),
    #[error("title cannot be empty")]
    EmptyTitle,
    #[error("invalid progress: {0} (expected a number from 0 to 100)")]
    InvalidProgress(String),
    #[error("{0} is not completed")]
    NotCompleted(String),
}

// ---------------------------------------------------------------------------
// Derivation rules
// ---------------------------------------------------------------------------

/// Recompute `progress` from the subtask ratio when auto-progress is on.
///
/// No subtasks means 0%. Halves round up, so 1 of 8 done is 13%.
pub fn apply_auto_progress(mut task: Task) -> Task {
    if !task.auto_progress {
        return task;
    }
    let total = task.subtasks.len();
    task.progress = if total == 0 {
        0
    } else {
        let done = task.done_subtask_count();
        ((done * 200 + total) / (2 * total)) as u8
    };
    task
}

/// Force an open task at 100% into `completed`.
///
/// One-way: nothing here moves a task back out of `completed`.
pub fn apply_auto_complete(mut task: Task) -> Task {
    if task.progress == 100 && !task.status.is_closed() {
        task.status = TaskStatus::Completed;
    }
    task
}

/// Both derivation rules, in order. Completion sees the recomputed progress.
pub fn derive(task: Task) -> Task {
    apply_auto_complete(apply_auto_progress(task))
}

// ---------------------------------------------------------------------------
// Construction and patching
// ---------------------------------------------------------------------------

/// Build a fresh inbox task starting today.
pub fn new_task(
    id: String,
    title: &str,
    planned_end: Option<NaiveDate>,
    today: NaiveDate,
) -> Task {
    Task {
        id,
        title: title.to_string(),
        description: String::new(),
        status: TaskStatus::Inbox,
        progress: 0,
        start_date: today,
        planned_end_date: planned_end.unwrap_or(today),
        hard_deadline: None,
        subtasks: Vec::new(),
        auto_progress: false,
        created_at: Utc::now().timestamp_millis(),
    }
}

/// Merge a patch onto a copy of the task. Progress always comes out in
/// 0..=100; derivation is not applied here.
pub fn apply_patch(task: &Task, patch: TaskPatch) -> Task {
    let mut out = task.clone();
    if let Some(title) = patch.title {
        out.title = title;
    }
    if let Some(description) = patch.description {
        out.description = description;
    }
    if let Some(status) = patch.status {
        out.status = status;
    }
    if let Some(progress) = patch.progress {
        out.progress = clamp_progress(progress);
    }
    if let Some(start) = patch.start_date {
        out.start_date = start;
    }
    if let Some(end) = patch.planned_end_date {
        out.planned_end_date = end;
    }
    if let Some(deadline) = patch.hard_deadline {
        out.hard_deadline = deadline;
    }
    if let Some(subtasks) = patch.subtasks {
        out.subtasks = subtasks;
    }
    if let Some(auto) = patch.auto_progress {
        out.auto_progress = auto;
    }
    out.progress = out.progress.min(100);
    out
}

pub fn clamp_progress(value: i64) -> u8 {
    value.clamp(0, 100) as u8
}

/// Subtask list with one entry's `done` flipped.
pub fn toggled_subtasks(task: &Task, subtask_id: &str) -> Result<Vec<Subtask>, TaskError> {
    if task.find_subtask(subtask_id).is_none() {
        return Err(TaskError::SubtaskNotFound {
            task_id: task.id.clone(),
            subtask_id: subtask_id.to_string(),
        });
    }
    Ok(task
        .subtasks
        .iter()
        .map(|s| {
            if s.id == subtask_id {
                Subtask {
                    done: !s.done,
                    ..s.clone()
                }
            } else {
                s.clone()
            }
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Ids
// ---------------------------------------------------------------------------

/// Next task id for `prefix`: one above the highest number in use.
pub fn next_task_id(tasks: &[Task], prefix: &str) -> String {
    let prefix_dash = format!("{}-", prefix);
    let max = tasks
        .iter()
        .filter_map(|t| t.id.strip_prefix(&prefix_dash))
        .filter_map(|rest| rest.parse::<usize>().ok())
        .max()
        .unwrap_or(0);
    format!("{}-{:03}", prefix, max + 1)
}

/// Next subtask id inside `task`, e.g. `T-004.3`.
pub fn next_subtask_id(task: &Task) -> String {
    let prefix_dot = format!("{}.", task.id);
    let max = task
        .subtasks
        .iter()
        .filter_map(|s| s.id.strip_prefix(&prefix_dot))
        .filter_map(|n| n.parse::<usize>().ok())
        .max()
        .unwrap_or(0);
    format!("{}.{}", task.id, max + 1)
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a date typed by the user.
///
/// Accepts `YYYY-MM-DD`, `today`, `tomorrow`, `yesterday`, `in Nd` and `in Nw`.
pub fn parse_date_input(input: &str, today: NaiveDate) -> Result<NaiveDate, TaskError> {
    let s = input.trim().to_lowercase();
    match s.as_str() {
        "today" => return Ok(today),
        "tomorrow" => return Ok(today + Duration::days(1)),
        "yesterday" => return Ok(today - Duration::days(1)),
        _ => {}
    }
    if let Some(rest) = s.strip_prefix("in ") {
        let rest = rest.trim();
        if let Some(n) = rest.strip_suffix('d').and_then(|n| n.trim().parse::<i64>().ok()) {
            return Ok(today + Duration::days(n));
        }
        if let Some(n) = rest.strip_suffix('w').and_then(|n| n.trim().parse::<i64>().ok()) {
            return Ok(today + Duration::weeks(n));
        }
    }
    NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| TaskError::InvalidDate(input.to_string()))
}

/// Parse an optional date field: empty input means "unset".
pub fn parse_optional_date(input: &str, today: NaiveDate) -> Result<Option<NaiveDate>, TaskError> {
    if input.trim().is_empty() {
        Ok(None)
    } else {
        parse_date_input(input, today).map(Some)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample_task() -> Task {
        new_task("T-001".into(), "Write report", None, date("2025-05-10"))
    }

    fn with_subtasks(done: &[bool]) -> Task {
        let mut task = sample_task();
        task.subtasks = done
            .iter()
            .enumerate()
            .map(|(i, d)| Subtask {
                id: format!("T-001.{}", i + 1),
                text: format!("step {}", i + 1),
                done: *d,
            })
            .collect();
        task
    }

    #[test]
    fn test_new_task_defaults() {
        let task = sample_task();
        assert_eq!(task.status, TaskStatus::Inbox);
        assert_eq!(task.progress, 0);
        assert_eq!(task.start_date, date("2025-05-10"));
        assert_eq!(task.planned_end_date, date("2025-05-10"));
        assert_eq!(task.hard_deadline, None);
        assert!(task.subtasks.is_empty());
        assert!(!task.auto_progress);
        assert!(task.description.is_empty());
    }

    #[test]
    fn test_new_task_with_deadline() {
        let task = new_task("T-002".into(), "x", Some(date("2025-05-20")), date("2025-05-10"));
        assert_eq!(task.planned_end_date, date("2025-05-20"));
        assert_eq!(task.start_date, date("2025-05-10"));
    }

    #[test]
    fn test_auto_progress_three_of_four() {
        let mut task = with_subtasks(&[true, true, true, false]);
        task.auto_progress = true;
        assert_eq!(apply_auto_progress(task).progress, 75);
    }

    #[test]
    fn test_auto_progress_no_subtasks_is_zero() {
        let mut task = sample_task();
        task.auto_progress = true;
        task.progress = 40;
        assert_eq!(apply_auto_progress(task).progress, 0);
    }

    #[test]
    fn test_auto_progress_rounds_half_up() {
        let mut task = with_subtasks(&[true, false, false, false, false, false, false, false]);
        task.auto_progress = true;
        // 12.5% rounds to 13
        assert_eq!(apply_auto_progress(task).progress, 13);

        let mut task = with_subtasks(&[true, false, false]);
        task.auto_progress = true;
        assert_eq!(apply_auto_progress(task).progress, 33);

        let mut task = with_subtasks(&[true, true, false]);
        task.auto_progress = true;
        assert_eq!(apply_auto_progress(task).progress, 67);
    }

    #[test]
    fn test_auto_progress_off_leaves_progress() {
        let mut task = with_subtasks(&[true, true]);
        task.progress = 10;
        assert_eq!(apply_auto_progress(task).progress, 10);
    }

    #[test]
    fn test_auto_complete_at_100() {
        let mut task = sample_task();
        task.status = TaskStatus::Ongoing;
        task.progress = 100;
        assert_eq!(apply_auto_complete(task).status, TaskStatus::Completed);
    }

    #[test]
    fn test_auto_complete_from_inbox() {
        let mut task = sample_task();
        task.progress = 100;
        assert_eq!(apply_auto_complete(task).status, TaskStatus::Completed);
    }

    #[test]
    fn test_auto_complete_leaves_archived() {
        let mut task = sample_task();
        task.status = TaskStatus::Archived;
        task.progress = 100;
        assert_eq!(apply_auto_complete(task).status, TaskStatus::Archived);
    }

    #[test]
    fn test_auto_complete_below_100_noop() {
        let mut task = sample_task();
        task.status = TaskStatus::Ongoing;
        task.progress = 99;
        assert_eq!(apply_auto_complete(task).status, TaskStatus::Ongoing);
    }

    #[test]
    fn test_derive_uses_recomputed_progress() {
        // Stale progress 100 but only half the subtasks done: must not complete
        let mut task = with_subtasks(&[true, false]);
        task.status = TaskStatus::Ongoing;
        task.auto_progress = true;
        task.progress = 100;
        let task = derive(task);
        assert_eq!(task.progress, 50);
        assert_eq!(task.status, TaskStatus::Ongoing);

        // All subtasks done: recomputed 100 completes
        let mut task = with_subtasks(&[true, true]);
        task.status = TaskStatus::Ongoing;
        task.auto_progress = true;
        let task = derive(task);
        assert_eq!(task.progress, 100);
        assert_eq!(task.status, TaskStatus::Completed);
    }

    #[test]
    fn test_apply_patch_clamps_progress() {
        let task = sample_task();
        assert_eq!(apply_patch(&task, TaskPatch::new().progress(250)).progress, 100);
        assert_eq!(apply_patch(&task, TaskPatch::new().progress(-5)).progress, 0);
        assert_eq!(apply_patch(&task, TaskPatch::new().progress(42)).progress, 42);
    }

    #[test]
    fn test_apply_patch_clamps_existing_progress() {
        let mut task = sample_task();
        task.progress = 150;
        let patched = apply_patch(&task, TaskPatch::new().title("Renamed"));
        assert_eq!(patched.progress, 100);
    }

    #[test]
    fn test_apply_patch_merges_only_given_fields() {
        let task = sample_task();
        let patched = apply_patch(
            &task,
            TaskPatch::new()
                .title("Renamed")
                .hard_deadline(Some(date("2025-06-01"))),
        );
        assert_eq!(patched.title, "Renamed");
        assert_eq!(patched.hard_deadline, Some(date("2025-06-01")));
        assert_eq!(patched.id, task.id);
        assert_eq!(patched.created_at, task.created_at);
        assert_eq!(patched.start_date, task.start_date);

        let cleared = apply_patch(&patched, TaskPatch::new().hard_deadline(None));
        assert_eq!(cleared.hard_deadline, None);
    }

    #[test]
    fn test_toggled_subtasks() {
        let task = with_subtasks(&[false, true]);
        let subs = toggled_subtasks(&task, "T-001.1").unwrap();
        assert!(subs[0].done);
        assert!(subs[1].done);
        // Original untouched
        assert!(!task.subtasks[0].done);
    }

    #[test]
    fn test_toggled_subtasks_missing() {
        let task = with_subtasks(&[false]);
        assert_eq!(
            toggled_subtasks(&task, "T-001.9"),
            Err(TaskError::SubtaskNotFound {
                task_id: "T-001".into(),
                subtask_id: "T-001.9".into()
            })
        );
    }

    #[test]
    fn test_next_task_id() {
        assert_eq!(next_task_id(&[], "T"), "T-001");
        let mut a = sample_task();
        a.id = "T-009".into();
        let mut b = sample_task();
        b.id = "T-002".into();
        let mut other = sample_task();
        other.id = "X-500".into();
        assert_eq!(next_task_id(&[a, b, other], "T"), "T-010");
    }

    #[test]
    fn test_next_subtask_id() {
        let task = with_subtasks(&[false, false]);
        assert_eq!(next_subtask_id(&task), "T-001.3");
        assert_eq!(next_subtask_id(&sample_task()), "T-001.1");
    }

    #[test]
    fn test_parse_date_input() {
        let today = date("2025-05-10");
        assert_eq!(parse_date_input("today", today), Ok(today));
        assert_eq!(parse_date_input("Tomorrow", today), Ok(date("2025-05-11")));
        assert_eq!(parse_date_input("yesterday", today), Ok(date("2025-05-09")));
        assert_eq!(parse_date_input("in 3d", today), Ok(date("2025-05-13")));
        assert_eq!(parse_date_input("in 2w", today), Ok(date("2025-05-24")));
        assert_eq!(parse_date_input("2025-12-31", today), Ok(date("2025-12-31")));
        assert_eq!(
            parse_date_input("31/12/2025", today),
            Err(TaskError::InvalidDate("31/12/2025".into()))
        );
        assert!(parse_date_input("2025-02-30", today).is_err());
    }

    #[test]
    fn test_parse_optional_date() {
        let today = date("2025-05-10");
        assert_eq!(parse_optional_date("  ", today), Ok(None));
        assert_eq!(parse_optional_date("today", today), Ok(Some(today)));
        assert!(parse_optional_date("soon", today).is_err());
    }
}
