use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::io::storage::MemoryStorage;
use crate::model::config::Config;
use crate::model::task::{Subtask, Task, TaskStatus};
use crate::ops::store::TaskStore;
use crate::ops::task_ops::{derive, new_task};
use crate::tui::app::App;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// The fixed "today" of every test app
pub fn today() -> NaiveDate {
    date("2025-05-10")
}

pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

pub fn ctrl(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::CONTROL)
}

/// Four tasks, one of each kind the board shows:
///
/// - `T-001` inbox, ends in two days
/// - `T-002` ongoing, manual 40%, 05-08 to 05-14
/// - `T-003` ongoing, auto-progress with 3 of 4 subtasks done, hard deadline
///   before its planned end (overdue)
/// - `T-004` completed
pub fn sample_tasks() -> Vec<Task> {
    let mut inbox = new_task("T-001".into(), "Draft outline", Some(date("2025-05-12")), today());
    inbox.created_at = 1;

    let mut manual = new_task("T-002".into(), "Ship release", Some(date("2025-05-14")), today());
    manual.status = TaskStatus::Ongoing;
    manual.start_date = date("2025-05-08");
    manual.progress = 40;
    manual.created_at = 2;

    let mut auto = new_task("T-003".into(), "Migrate data", Some(date("2025-05-16")), today());
    auto.status = TaskStatus::Ongoing;
    auto.start_date = date("2025-05-09");
    auto.hard_deadline = Some(date("2025-05-13"));
    auto.auto_progress = true;
    auto.subtasks = (1..=4)
        .map(|n| Subtask {
            id: format!("T-003.{}", n),
            text: format!("step {}", n),
            done: n < 4,
        })
        .collect();
    auto.created_at = 3;
    let auto = derive(auto);

    let mut done = new_task("T-004".into(), "Book venue", Some(date("2025-05-09")), today());
    done.status = TaskStatus::Completed;
    done.start_date = date("2025-05-05");
    done.progress = 100;
    done.created_at = 4;

    vec![inbox, manual, auto, done]
}

/// An app over an in-memory store pinned to `today()`
pub fn app_with_tasks(tasks: Vec<Task>) -> App {
    let mut store = TaskStore::new(Box::new(MemoryStorage::with_tasks(tasks))).with_today(today());
    store.load_from_storage();
    App::new(store, Config::default())
}
