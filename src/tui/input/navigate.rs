use chrono::Duration;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::task::{TaskPatch, TaskStatus};
use crate::tui::app::{App, ConfirmAction, EditTarget, Mode, View};

/// Step for `+`/`-` on manual progress
const PROGRESS_STEP: i64 = 10;

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return;
    }
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.show_help = true,

        // Views
        KeyCode::Tab | KeyCode::BackTab => {
            let next = match app.view {
                View::Board => View::Timeline,
                View::Timeline => View::Board,
            };
            app.set_view(next);
        }
        KeyCode::Char('1') => app.set_view(View::Board),
        KeyCode::Char('2') => app.set_view(View::Timeline),
        KeyCode::Char('T') => {
            app.toggle_theme();
            app.set_status(format!("{} theme", app.theme_mode.as_str()));
        }

        // Cursor
        KeyCode::Char('j') | KeyCode::Down => app.move_cursor(true),
        KeyCode::Char('k') | KeyCode::Up => app.move_cursor(false),
        KeyCode::Char('g') | KeyCode::Home => app.jump_cursor(false),
        KeyCode::Char('G') | KeyCode::End => app.jump_cursor(true),

        // Tasks
        KeyCode::Char('n') => app.begin_edit(EditTarget::NewTaskTitle, String::new()),
        KeyCode::Enter => app.open_detail(),
        KeyCode::Char('s') => start_selected(app),
        KeyCode::Char('d') => complete_selected(app),
        KeyCode::Char('r') => restore_selected(app),
        KeyCode::Char('a') => archive_selected(app),
        KeyCode::Char('D') | KeyCode::Delete => confirm_delete_selected(app),
        KeyCode::Char('+') | KeyCode::Char('=') => step_progress(app, PROGRESS_STEP),
        KeyCode::Char('-') => step_progress(app, -PROGRESS_STEP),
        KeyCode::Char('<') if app.view == View::Timeline => shift_end(app, -1),
        KeyCode::Char('>') if app.view == View::Timeline => shift_end(app, 1),
        _ => {}
    }
}

pub(super) fn start_selected(app: &mut App) {
    let Some((id, status)) = app.selected_task().map(|t| (t.id.clone(), t.status)) else {
        return;
    };
    if status != TaskStatus::Inbox {
        app.set_error(format!("{} is already started", id));
        return;
    }
    let result = app.store.promote(&id);
    app.report(result, format!("started {}", id));
    app.select_task(&id);
}

pub(super) fn complete_selected(app: &mut App) {
    let Some(id) = app.selected_task_id() else {
        return;
    };
    let result = app.store.complete(&id);
    app.report(result, format!("completed {}", id));
    app.select_task(&id);
}

pub(super) fn restore_selected(app: &mut App) {
    let Some(id) = app.selected_task_id() else {
        return;
    };
    let result = app.store.restore(&id);
    app.report(result, format!("restored {}", id));
    app.select_task(&id);
}

pub(super) fn archive_selected(app: &mut App) {
    let Some(id) = app.selected_task_id() else {
        return;
    };
    let result = app.store.archive(&id);
    app.report(result, format!("archived {}", id));
}

pub(super) fn confirm_delete_selected(app: &mut App) {
    if let Some(task_id) = app.selected_task_id() {
        app.confirm = Some(ConfirmAction::DeleteTask { task_id });
        app.mode = Mode::Confirm;
    }
}

pub(super) fn step_progress(app: &mut App, delta: i64) {
    let Some((id, progress, auto)) = app
        .selected_task()
        .map(|t| (t.id.clone(), t.progress, t.auto_progress))
    else {
        return;
    };
    if auto {
        app.set_error("progress follows subtasks (turn off auto first)");
        return;
    }
    let result = app.store.set_progress(&id, progress as i64 + delta);
    let shown = app.store.get(&id).map_or(0, |t| t.progress);
    app.report(result, format!("{} at {}%", id, shown));
}

/// Move the selected task's planned end by `days`, never before its start
pub(super) fn shift_end(app: &mut App, days: i64) {
    let Some((id, start, end)) = app
        .selected_task()
        .map(|t| (t.id.clone(), t.start_date, t.planned_end_date))
    else {
        return;
    };
    let moved = (end + Duration::days(days)).max(start);
    if moved == end {
        return;
    }
    let result = app
        .store
        .update_task(&id, TaskPatch::new().planned_end_date(moved));
    app.report(result, format!("{} ends {}", id, moved));
}

#[cfg(test)]
mod tests {
    use crate::model::task::TaskStatus;
    use crate::tui::app::{Mode, Section, View};
    use crate::tui::input::handle_key;
    use crate::tui::render::test_helpers::*;
    use crossterm::event::KeyCode;

    #[test]
    fn start_moves_inbox_task_to_ongoing() {
        let mut app = app_with_tasks(sample_tasks());
        handle_key(&mut app, key(KeyCode::Char('s')));
        let task = app.store.get("T-001").unwrap();
        assert_eq!(task.status, TaskStatus::Ongoing);
        assert_eq!(task.start_date, today());
        assert_eq!(app.section, Section::Ongoing);
        assert_eq!(app.selected_task_id().as_deref(), Some("T-001"));
    }

    #[test]
    fn restore_refuses_open_task() {
        let mut app = app_with_tasks(sample_tasks());
        app.select_task("T-001");
        handle_key(&mut app, key(KeyCode::Char('r')));
        assert_eq!(app.store.get("T-001").unwrap().status, TaskStatus::Inbox);
        assert_eq!(app.status_message.as_deref(), Some("T-001 is not completed"));
        assert!(app.status_is_error);
    }

    #[test]
    fn done_then_restore() {
        let mut app = app_with_tasks(sample_tasks());
        app.select_task("T-002");
        handle_key(&mut app, key(KeyCode::Char('d')));
        assert_eq!(app.store.get("T-002").unwrap().status, TaskStatus::Completed);
        assert_eq!(app.section, Section::History);

        handle_key(&mut app, key(KeyCode::Char('r')));
        let task = app.store.get("T-002").unwrap();
        assert_eq!(task.status, TaskStatus::Ongoing);
        assert_eq!(task.progress, 100);
    }

    #[test]
    fn plus_steps_manual_progress_and_completes_at_100() {
        let mut app = app_with_tasks(sample_tasks());
        app.select_task("T-002");
        for _ in 0..10 {
            handle_key(&mut app, key(KeyCode::Char('+')));
        }
        let task = app.store.get("T-002").unwrap();
        assert_eq!(task.progress, 100);
        assert_eq!(task.status, TaskStatus::Completed);
    }

    #[test]
    fn progress_keys_refused_for_auto_tasks() {
        let mut app = app_with_tasks(sample_tasks());
        app.select_task("T-003");
        let before = app.store.get("T-003").unwrap().progress;
        handle_key(&mut app, key(KeyCode::Char('+')));
        assert_eq!(app.store.get("T-003").unwrap().progress, before);
        assert!(app.status_is_error);
    }

    #[test]
    fn angle_brackets_shift_end_on_timeline() {
        let mut app = app_with_tasks(sample_tasks());
        app.view = View::Timeline;
        app.select_task("T-002");
        let end = app.store.get("T-002").unwrap().planned_end_date;
        handle_key(&mut app, key(KeyCode::Char('>')));
        assert_eq!(
            app.store.get("T-002").unwrap().planned_end_date,
            end + chrono::Duration::days(1)
        );
        handle_key(&mut app, key(KeyCode::Char('<')));
        handle_key(&mut app, key(KeyCode::Char('<')));
        assert_eq!(
            app.store.get("T-002").unwrap().planned_end_date,
            end - chrono::Duration::days(1)
        );
    }

    #[test]
    fn shrinking_stops_at_start_date() {
        let mut app = app_with_tasks(sample_tasks());
        app.view = View::Timeline;
        app.select_task("T-001");
        let start = app.store.get("T-001").unwrap().start_date;
        for _ in 0..10 {
            handle_key(&mut app, key(KeyCode::Char('<')));
        }
        assert_eq!(app.store.get("T-001").unwrap().planned_end_date, start);
    }

    #[test]
    fn tab_switches_view() {
        let mut app = app_with_tasks(sample_tasks());
        handle_key(&mut app, key(KeyCode::Tab));
        assert_eq!(app.view, View::Timeline);
        handle_key(&mut app, key(KeyCode::Char('1')));
        assert_eq!(app.view, View::Board);
    }

    #[test]
    fn delete_asks_first() {
        let mut app = app_with_tasks(sample_tasks());
        handle_key(&mut app, key(KeyCode::Char('D')));
        assert_eq!(app.mode, Mode::Confirm);
        assert!(app.store.get("T-001").is_some());
    }
}
