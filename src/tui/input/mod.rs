mod confirm;
mod detail;
mod edit;
mod mouse;
mod navigate;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};

use super::app::{App, Mode};
use crate::ops::gesture::GestureEnd;

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    let key = normalize_key(key);

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    // Escape drops a drag in progress before anything else sees it
    if key.code == KeyCode::Esc && app.gesture_active() {
        mouse::end_gestures(app, GestureEnd::Cancel);
        app.set_status("drag cancelled");
        return;
    }

    if app.mode != Mode::Edit {
        app.status_message = None;
    }

    if app.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.show_help = false;
        }
        return;
    }

    match app.mode {
        Mode::Navigate if app.detail.is_some() => detail::handle_detail(app, key),
        Mode::Navigate => navigate::handle_navigate(app, key),
        Mode::Edit => edit::handle_edit(app, key),
        Mode::Confirm => confirm::handle_confirm(app, key),
    }
    app.sync_store_events();
}

pub fn handle_mouse(app: &mut App, event: MouseEvent) {
    mouse::handle_mouse(app, event);
    app.sync_store_events();
}

/// The terminal lost focus: a drag in progress ends as if released
pub fn handle_focus_lost(app: &mut App) {
    mouse::end_gestures(app, GestureEnd::FocusLost);
    app.sync_store_events();
}

/// Fold Shift into the character so bindings match on `Char('D')` or `Char('>')`
fn normalize_key(mut key: KeyEvent) -> KeyEvent {
    if let KeyCode::Char(c) = key.code
        && key.modifiers.contains(KeyModifiers::SHIFT)
    {
        if c.is_ascii_lowercase() {
            key.code = KeyCode::Char(c.to_ascii_uppercase());
        }
        key.modifiers.remove(KeyModifiers::SHIFT);
    }
    key
}
