use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::task::TaskPatch;
use crate::ops::task_ops::{TaskError, parse_date_input, parse_optional_date};
use crate::tui::app::{App, DetailRow, EditState, EditTarget, Mode};
use crate::util::unicode;

/// Keys while the status-row prompt is open
pub(super) fn handle_edit(app: &mut App, key: KeyEvent) {
    let Some(edit) = app.edit.as_mut() else {
        app.mode = Mode::Navigate;
        return;
    };

    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => cancel_edit(app),
        (_, KeyCode::Enter) => submit_edit(app),

        // Cursor movement
        (m, KeyCode::Left) if m.contains(KeyModifiers::ALT) => {
            edit.cursor = unicode::word_boundary_left(&edit.buffer, edit.cursor);
        }
        (_, KeyCode::Left) => {
            if let Some(prev) = unicode::prev_grapheme_boundary(&edit.buffer, edit.cursor) {
                edit.cursor = prev;
            }
        }
        (_, KeyCode::Right) => {
            if let Some(next) = unicode::next_grapheme_boundary(&edit.buffer, edit.cursor) {
                edit.cursor = next;
            }
        }
        (_, KeyCode::Home) => edit.cursor = 0,
        (_, KeyCode::End) => edit.cursor = edit.buffer.len(),
        (m, KeyCode::Char('a')) if m.contains(KeyModifiers::CONTROL) => edit.cursor = 0,
        (m, KeyCode::Char('e')) if m.contains(KeyModifiers::CONTROL) => {
            edit.cursor = edit.buffer.len();
        }

        // Deletion
        (m, KeyCode::Backspace)
            if m.contains(KeyModifiers::ALT) || m.contains(KeyModifiers::CONTROL) =>
        {
            delete_word_left(edit);
        }
        (m, KeyCode::Char('w')) if m.contains(KeyModifiers::CONTROL) => delete_word_left(edit),
        (m, KeyCode::Char('u')) if m.contains(KeyModifiers::CONTROL) => {
            edit.buffer.drain(..edit.cursor);
            edit.cursor = 0;
        }
        (_, KeyCode::Backspace) => {
            if let Some(prev) = unicode::prev_grapheme_boundary(&edit.buffer, edit.cursor) {
                edit.buffer.drain(prev..edit.cursor);
                edit.cursor = prev;
            }
        }
        (_, KeyCode::Delete) => {
            if let Some(next) = unicode::next_grapheme_boundary(&edit.buffer, edit.cursor) {
                edit.buffer.drain(edit.cursor..next);
            }
        }

        // Typing
        (m, KeyCode::Char(c)) if !m.contains(KeyModifiers::CONTROL) => {
            edit.buffer.insert(edit.cursor, c);
            edit.cursor += c.len_utf8();
        }
        _ => {}
    }
}

fn delete_word_left(edit: &mut EditState) {
    let start = unicode::word_boundary_left(&edit.buffer, edit.cursor);
    edit.buffer.drain(start..edit.cursor);
    edit.cursor = start;
}

fn cancel_edit(app: &mut App) {
    app.edit = None;
    app.mode = Mode::Navigate;
}

/// Keep the prompt open with what was typed, and say why it was refused
fn retry(app: &mut App, edit: EditState, error: TaskError) {
    app.set_error(error.to_string());
    app.edit = Some(edit);
    app.mode = Mode::Edit;
}

fn submit_edit(app: &mut App) {
    let Some(edit) = app.edit.take() else {
        return;
    };
    app.mode = Mode::Navigate;
    let today = app.store.today();
    let value = edit.buffer.trim().to_string();

    match edit.target.clone() {
        EditTarget::NewTaskTitle => {
            if value.is_empty() {
                app.set_error(TaskError::EmptyTitle.to_string());
                return;
            }
            app.begin_edit(EditTarget::NewTaskDeadline { title: value }, String::new());
        }
        EditTarget::NewTaskDeadline { title } => match parse_optional_date(&value, today) {
            Ok(end) => {
                let id = app.store.add_task(&title, end);
                app.select_task(&id);
                app.set_status(format!("added {}", id));
            }
            Err(e) => retry(app, edit, e),
        },
        EditTarget::NewSubtask { task_id } => {
            if value.is_empty() {
                return;
            }
            match app.store.add_subtask(&task_id, &value) {
                Ok(sub_id) => app.set_status(format!("added {}", sub_id)),
                Err(e) => app.set_error(e.to_string()),
            }
        }
        EditTarget::Field { task_id, row } => {
            match field_patch(row, &value, today) {
                Ok(patch) => {
                    let result = app.store.update_task(&task_id, patch);
                    app.report(result, format!("updated {}", task_id));
                }
                Err(e) => retry(app, edit, e),
            }
        }
    }
}

/// The patch a submitted detail field asks for
fn field_patch(
    row: DetailRow,
    value: &str,
    today: chrono::NaiveDate,
) -> Result<TaskPatch, TaskError> {
    let patch = TaskPatch::new();
    Ok(match row {
        DetailRow::Title if value.is_empty() => return Err(TaskError::EmptyTitle),
        DetailRow::Title => patch.title(value),
        DetailRow::Description => patch.description(value),
        DetailRow::Start => patch.start_date(parse_date_input(value, today)?),
        DetailRow::End => patch.planned_end_date(parse_date_input(value, today)?),
        DetailRow::Deadline => patch.hard_deadline(parse_optional_date(value, today)?),
        DetailRow::Progress => match value.trim_end_matches('%').trim().parse::<i64>() {
            Ok(n) => patch.progress(n),
            Err(_) => return Err(TaskError::InvalidProgress(value.to_string())),
        },
        DetailRow::Subtask(_) => patch,
    })
}
