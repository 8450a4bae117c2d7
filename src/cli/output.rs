use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::model::task::{Task, TaskStatus};
use crate::ops::board::{BoardStats, timeline_rows};
use crate::ops::timeline::TimelineAxis;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson<'a> {
    #[serde(flatten)]
    pub task: &'a Task,
    pub overdue: bool,
}

impl<'a> TaskJson<'a> {
    pub fn new(task: &'a Task) -> Self {
        TaskJson {
            task,
            overdue: task.is_overdue(),
        }
    }
}

#[derive(Serialize)]
pub struct TaskListJson<'a> {
    pub section: String,
    pub tasks: Vec<TaskJson<'a>>,
    pub stats: BoardStats,
}

#[derive(Serialize)]
pub struct TimelineRowJson<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub start: i64,
    pub end: i64,
    pub progress: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<i64>,
    pub overdue: bool,
}

#[derive(Serialize)]
pub struct TimelineJson<'a> {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub today: NaiveDate,
    /// Offsets below are in days from `start`
    pub rows: Vec<TimelineRowJson<'a>>,
}

pub fn timeline_json<'a>(tasks: &'a [Task], axis: &TimelineAxis, today: NaiveDate) -> TimelineJson<'a> {
    let days = TimelineAxis { day_width: 1, ..*axis };
    let rows = timeline_rows(tasks)
        .into_iter()
        .map(|task| {
            let bar = days.bar(task, None);
            TimelineRowJson {
                id: &task.id,
                title: &task.title,
                start: bar.start_px,
                end: bar.end_px,
                progress: task.progress as i64,
                deadline: bar.deadline_px,
                overdue: bar.overdue.is_some(),
            }
        })
        .collect();
    TimelineJson {
        start: axis.start,
        end: axis.end,
        today,
        rows,
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

fn status_char(status: TaskStatus) -> char {
    match status {
        TaskStatus::Inbox => ' ',
        TaskStatus::Ongoing => '~',
        TaskStatus::Completed => 'x',
        TaskStatus::Archived => '-',
    }
}

/// One-line summary: `[~] T-002 Title  40%  end 2025-05-20`
pub fn format_task_line(task: &Task) -> String {
    let mut line = format!(
        "[{}] {} {}  {}%{}  end {}",
        status_char(task.status),
        task.id,
        task.title,
        task.progress,
        if task.auto_progress { " (auto)" } else { "" },
        task.planned_end_date,
    );
    if let Some(deadline) = task.hard_deadline {
        line.push_str(&format!("  deadline {}", deadline));
        if task.is_overdue() {
            line.push_str(" OVERDUE");
        }
    }
    line
}

pub fn format_task_detail(task: &Task) -> Vec<String> {
    let mut lines = vec![format!("[{}] {} {}", status_char(task.status), task.id, task.title)];
    lines.push(format!("status: {}", task.status));
    lines.push(format!(
        "progress: {}%{}",
        task.progress,
        if task.auto_progress { " (from subtasks)" } else { "" }
    ));
    lines.push(format!("start: {}", task.start_date));
    lines.push(format!("end: {}", task.planned_end_date));
    if let Some(deadline) = task.hard_deadline {
        let flag = if task.is_overdue() { " (overdue)" } else { "" };
        lines.push(format!("deadline: {}{}", deadline, flag));
    }
    if !task.description.is_empty() {
        lines.push("description:".to_string());
        for line in task.description.lines() {
            lines.push(format!("  {}", line));
        }
    }
    if !task.subtasks.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "subtasks: {}/{}",
            task.done_subtask_count(),
            task.subtasks.len()
        ));
        for sub in &task.subtasks {
            lines.push(format!(
                "  [{}] {} {}",
                if sub.done { 'x' } else { ' ' },
                sub.id,
                sub.text
            ));
        }
    }
    lines
}

/// Text Gantt chart of the open tasks, one character per day.
///
/// `#` is the filled share of the bar, `=` the rest, `!` days past the hard
/// deadline and `|` the deadline day itself, inside the bar or not.
pub fn format_timeline(tasks: &[Task], axis: &TimelineAxis, today: NaiveDate) -> Vec<String> {
    let days = TimelineAxis { day_width: 1, ..*axis };
    let rows = timeline_rows(tasks);
    let label_width = rows
        .iter()
        .map(|t| crate::util::unicode::display_width(&t.id) + 1 + crate::util::unicode::display_width(&t.title))
        .max()
        .unwrap_or(0)
        .clamp(8, 32);

    let mut lines = Vec::new();
    let mut header = " ".repeat(label_width + 1);
    let mut marker = " ".repeat(label_width + 1);
    for day in days.days() {
        header.push(char::from_digit(day.day() % 10, 10).unwrap_or('?'));
        marker.push(if day == today { 'v' } else { ' ' });
    }
    lines.push(format!(
        "{} .. {}",
        axis.start.format("%Y-%m-%d"),
        axis.end.format("%Y-%m-%d")
    ));
    lines.push(marker.trim_end().to_string());
    lines.push(header);

    for task in rows {
        let bar = days.bar(task, None);
        let label = crate::util::unicode::pad_to_width(
            &crate::util::unicode::truncate_to_width(
                &format!("{} {}", task.id, task.title),
                label_width,
            ),
            label_width,
        );
        let mut cells = String::new();
        for px in 0..days.width() {
            let c = if bar.deadline_px == Some(px + 1) {
                '|'
            } else if bar.contains(px) {
                if bar.is_overdue_at(px) {
                    '!'
                } else if bar.is_filled_at(px) {
                    '#'
                } else {
                    '='
                }
            } else {
                '.'
            };
            cells.push(c);
        }
        lines.push(format!("{} {}", label, cells));
    }
    lines
}
