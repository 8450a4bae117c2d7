use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Lifecycle status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Inbox,
    Ongoing,
    Completed,
    Archived,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Inbox => "inbox",
            TaskStatus::Ongoing => "ongoing",
            TaskStatus::Completed => "completed",
            TaskStatus::Archived => "archived",
        }
    }

    /// Parse a status name as written on the command line
    pub fn parse_status(s: &str) -> Option<TaskStatus> {
        match s {
            "inbox" => Some(TaskStatus::Inbox),
            "ongoing" => Some(TaskStatus::Ongoing),
            "completed" | "done" => Some(TaskStatus::Completed),
            "archived" => Some(TaskStatus::Archived),
            _ => None,
        }
    }

    /// Completed and archived tasks are closed: they leave the timeline
    /// and are never auto-completed again.
    pub fn is_closed(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Archived)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A checklist step inside a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

/// A task with its schedule, progress and checklist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque id like `T-014`, never changes
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    /// Percent complete, 0..=100
    #[serde(default, deserialize_with = "clamped_progress")]
    pub progress: u8,
    pub start_date: NaiveDate,
    pub planned_end_date: NaiveDate,
    #[serde(default)]
    pub hard_deadline: Option<NaiveDate>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    /// When set, `progress` is derived from the subtask ratio
    #[serde(default)]
    pub auto_progress: bool,
    /// Creation time in epoch milliseconds
    pub created_at: i64,
}

/// Read any JSON number as a percentage, rounded and clamped to 0..=100, so
/// one hand-edited value cannot fail the whole file.
fn clamped_progress<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let value = f64::deserialize(deserializer)?;
    if value.is_nan() {
        return Ok(0);
    }
    Ok(value.round().clamp(0.0, 100.0) as u8)
}

impl Task {
    pub fn done_subtask_count(&self) -> usize {
        self.subtasks.iter().filter(|s| s.done).count()
    }

    pub fn find_subtask(&self, subtask_id: &str) -> Option<&Subtask> {
        self.subtasks.iter().find(|s| s.id == subtask_id)
    }

    /// True when the planned end runs past the hard deadline
    pub fn is_overdue(&self) -> bool {
        self.hard_deadline
            .is_some_and(|deadline| self.planned_end_date > deadline)
    }
}

/// A partial field set merged onto a task by `TaskStore::update_task`.
///
/// `id` and `created_at` are deliberately absent: they are immutable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    /// Out-of-range values are clamped to 100 when applied
    pub progress: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub planned_end_date: Option<NaiveDate>,
    /// `Some(None)` clears the deadline
    pub hard_deadline: Option<Option<NaiveDate>>,
    pub subtasks: Option<Vec<Subtask>>,
    pub auto_progress: Option<bool>,
}

impl TaskPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn progress(mut self, progress: i64) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn planned_end_date(mut self, date: NaiveDate) -> Self {
        self.planned_end_date = Some(date);
        self
    }

    pub fn hard_deadline(mut self, deadline: Option<NaiveDate>) -> Self {
        self.hard_deadline = Some(deadline);
        self
    }

    pub fn subtasks(mut self, subtasks: Vec<Subtask>) -> Self {
        self.subtasks = Some(subtasks);
        self
    }

    pub fn auto_progress(mut self, on: bool) -> Self {
        self.auto_progress = Some(on);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }
}
