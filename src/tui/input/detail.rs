use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::task::TaskPatch;
use crate::tui::app::{App, DetailRow, EditTarget, detail_rows};

use super::navigate;

/// Keys while the detail overlay is open
pub(super) fn handle_detail(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return;
    }
    let Some((task_id, rows)) = app
        .detail
        .as_ref()
        .and_then(|d| app.store.get(&d.task_id))
        .map(|t| (t.id.clone(), detail_rows(t)))
    else {
        app.detail = None;
        return;
    };
    let row = app.detail_row();

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.detail = None,
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('j') | KeyCode::Down => {
            if let Some(detail) = &mut app.detail {
                detail.cursor = (detail.cursor + 1).min(rows.len().saturating_sub(1));
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if let Some(detail) = &mut app.detail {
                detail.cursor = detail.cursor.saturating_sub(1);
            }
        }
        KeyCode::Enter | KeyCode::Char('e') => match row {
            Some(DetailRow::Subtask(index)) => toggle_subtask(app, &task_id, index),
            Some(row) => edit_row(app, &task_id, row),
            None => {}
        },
        KeyCode::Char(' ') => {
            if let Some(DetailRow::Subtask(index)) = row {
                toggle_subtask(app, &task_id, index);
            }
        }
        KeyCode::Char('x') => {
            if let Some(DetailRow::Subtask(index)) = row {
                remove_subtask(app, &task_id, index);
            }
        }
        KeyCode::Char('n') => app.begin_edit(EditTarget::NewSubtask { task_id }, String::new()),
        KeyCode::Char('a') => toggle_auto(app, &task_id),
        KeyCode::Char('+') | KeyCode::Char('=') => navigate::step_progress(app, 10),
        KeyCode::Char('-') => navigate::step_progress(app, -10),
        KeyCode::Char('s') => navigate::start_selected(app),
        KeyCode::Char('d') => navigate::complete_selected(app),
        KeyCode::Char('r') => navigate::restore_selected(app),
        KeyCode::Char('D') | KeyCode::Delete => navigate::confirm_delete_selected(app),
        _ => {}
    }
}

/// Open the status-row prompt for a field, prefilled with its value
fn edit_row(app: &mut App, task_id: &str, row: DetailRow) {
    let Some(task) = app.store.get(task_id) else {
        return;
    };
    let initial = match row {
        DetailRow::Title => task.title.clone(),
        DetailRow::Description => task.description.clone(),
        DetailRow::Start => task.start_date.to_string(),
        DetailRow::End => task.planned_end_date.to_string(),
        DetailRow::Deadline => task.hard_deadline.map(|d| d.to_string()).unwrap_or_default(),
        DetailRow::Progress if task.auto_progress => {
            app.set_error("progress follows subtasks (press a for manual)");
            return;
        }
        DetailRow::Progress => task.progress.to_string(),
        DetailRow::Subtask(_) => return,
    };
    app.begin_edit(
        EditTarget::Field {
            task_id: task_id.to_string(),
            row,
        },
        initial,
    );
}

fn subtask_id_at(app: &App, task_id: &str, index: usize) -> Option<String> {
    app.store
        .get(task_id)
        .and_then(|t| t.subtasks.get(index))
        .map(|s| s.id.clone())
}

fn toggle_subtask(app: &mut App, task_id: &str, index: usize) {
    let Some(sub_id) = subtask_id_at(app, task_id, index) else {
        return;
    };
    let result = app.store.toggle_subtask(task_id, &sub_id);
    let progress = app.store.get(task_id).map_or(0, |t| t.progress);
    app.report(result, format!("{} at {}%", task_id, progress));
}

fn remove_subtask(app: &mut App, task_id: &str, index: usize) {
    let Some(sub_id) = subtask_id_at(app, task_id, index) else {
        return;
    };
    let result = app.store.remove_subtask(task_id, &sub_id);
    app.report(result, format!("removed {}", sub_id));
}

fn toggle_auto(app: &mut App, task_id: &str) {
    let Some(on) = app.store.get(task_id).map(|t| !t.auto_progress) else {
        return;
    };
    let result = app
        .store
        .update_task(task_id, TaskPatch::new().auto_progress(on));
    let message = if on {
        "progress follows subtasks"
    } else {
        "progress is manual"
    };
    app.report(result, message);
}
