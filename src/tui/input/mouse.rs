use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::ops::gesture::GestureEnd;
use crate::tui::app::{App, Mode, View};

pub(super) fn handle_mouse(app: &mut App, event: MouseEvent) {
    let (col, row) = (event.column, event.row);
    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => press(app, col, row),
        MouseEventKind::Drag(MouseButton::Left) => drag(app, col),
        MouseEventKind::Up(MouseButton::Left) => end_gestures(app, GestureEnd::Release),
        MouseEventKind::ScrollDown if is_idle(app) => app.move_cursor(true),
        MouseEventKind::ScrollUp if is_idle(app) => app.move_cursor(false),
        _ => {}
    }
}

/// Nothing on top of the current view
fn is_idle(app: &App) -> bool {
    app.mode == Mode::Navigate && app.detail.is_none() && !app.show_help
}

fn press(app: &mut App, col: u16, row: u16) {
    // A second press while dragging means the release never arrived
    if app.gesture_active() {
        end_gestures(app, GestureEnd::Release);
        return;
    }
    if !is_idle(app) {
        return;
    }
    match app.view {
        View::Timeline => press_timeline(app, col, row),
        View::Board => press_board(app, col, row),
    }
}

fn press_timeline(app: &mut App, col: u16, row: u16) {
    let Some(hit) = &app.hits.timeline else {
        return;
    };
    let Some(task_id) = hit
        .rows
        .iter()
        .find(|(y, _)| *y == row)
        .map(|(_, id)| id.clone())
    else {
        return;
    };
    let in_chart = col >= hit.x && col < hit.x + hit.width;
    let px = col as i64 - hit.x as i64;

    app.select_task(&task_id);
    if !in_chart {
        return;
    }
    let axis = app.axis();
    let Some(task) = app.store.get(&task_id) else {
        return;
    };
    if axis.bar(task, None).is_trailing_edge(px, axis.day_width) {
        let task = task.clone();
        app.resize.begin(&task, px);
    }
}

fn press_board(app: &mut App, col: u16, row: u16) {
    let bar = app
        .hits
        .progress_bars
        .iter()
        .find(|b| b.y == row && col >= b.x && col < b.x + b.width)
        .cloned();
    if let Some(bar) = bar {
        app.select_task(&bar.task_id);
        let Some(task) = app.store.get(&bar.task_id).cloned() else {
            return;
        };
        if task.auto_progress {
            app.set_error("progress follows subtasks");
            return;
        }
        app.progress_drag
            .begin(&task, (col - bar.x) as i64, bar.width as i64);
        return;
    }

    let hit = app
        .hits
        .rows
        .iter()
        .find(|r| r.contains(col, row))
        .map(|r| r.task_id.clone());
    if let Some(task_id) = hit {
        app.select_task(&task_id);
    }
}

fn drag(app: &mut App, col: u16) {
    if app.resize.is_active() {
        let axis = app.axis();
        if let Some(hit) = &app.hits.timeline {
            let px = col as i64 - hit.x as i64;
            app.resize.update(px, &axis);
        }
    }
    if let Some(task_id) = app.progress_drag.active_task() {
        let x = app
            .hits
            .progress_bars
            .iter()
            .find(|b| b.task_id == task_id)
            .map(|b| col as i64 - b.x as i64);
        if let Some(x) = x {
            app.progress_drag.update(x);
        }
    }
}

/// End whichever drag is running and commit what it asks for
pub(super) fn end_gestures(app: &mut App, end: GestureEnd) {
    if let Some(commit) = app.resize.finish(end) {
        let result = app.store.update_task(&commit.task_id, commit.patch());
        app.report(
            result,
            format!("{} ends {}", commit.task_id, commit.planned_end),
        );
    }
    if let Some(commit) = app.progress_drag.finish(end) {
        let result = app.store.update_task(&commit.task_id, commit.patch());
        app.report(
            result,
            format!("{} at {}%", commit.task_id, commit.progress),
        );
    }
}
