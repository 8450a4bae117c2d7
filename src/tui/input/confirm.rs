use crossterm::event::{KeyCode, KeyEvent};

use crate::io::recovery::log_task_deletion;
use crate::tui::app::{App, ConfirmAction, Mode};

pub(super) fn handle_confirm(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            let action = app.confirm.take();
            app.mode = Mode::Navigate;
            if let Some(ConfirmAction::DeleteTask { task_id }) = action {
                confirm_delete_task(app, &task_id);
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.confirm = None;
            app.mode = Mode::Navigate;
        }
        _ => {}
    }
}

fn confirm_delete_task(app: &mut App, task_id: &str) {
    match app.store.delete_task(task_id) {
        Ok(task) => {
            // Deletion is permanent; keep a copy in the recovery log
            if let Some(dir) = &app.data_dir {
                log_task_deletion(dir, &task);
            }
            app.set_status(format!("deleted {}", task_id));
        }
        Err(e) => app.set_error(e.to_string()),
    }
}
