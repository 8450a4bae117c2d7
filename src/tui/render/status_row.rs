use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::helpers::{short_date, spans_width};
use crate::ops::board::board_stats;
use crate::tui::app::{App, ConfirmAction, Mode, View};
use crate::util::unicode;

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let dim = Style::default().fg(app.theme.dim).bg(bg);

    let (mut spans, hint): (Vec<Span>, String) = match app.mode {
        Mode::Edit => {
            let Some(edit) = &app.edit else {
                return;
            };
            let (before, after) = edit.buffer.split_at(edit.cursor.min(edit.buffer.len()));
            let spans = vec![
                Span::styled(
                    format!("{}: ", edit.label()),
                    Style::default().fg(app.theme.purple).bg(bg),
                ),
                Span::styled(
                    before.to_string(),
                    Style::default().fg(app.theme.text_bright).bg(bg),
                ),
                Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)), // ▌ cursor
                Span::styled(
                    after.to_string(),
                    Style::default().fg(app.theme.text_bright).bg(bg),
                ),
            ];
            (spans, "Enter ok  Esc cancel".to_string())
        }
        Mode::Confirm => {
            let question = match &app.confirm {
                Some(ConfirmAction::DeleteTask { task_id }) => {
                    let title = app.store.get(task_id).map_or("", |t| t.title.as_str());
                    format!("delete {} \"{}\"?", task_id, title)
                }
                None => String::new(),
            };
            let spans = vec![Span::styled(
                question,
                Style::default()
                    .fg(app.theme.red)
                    .bg(bg)
                    .add_modifier(Modifier::BOLD),
            )];
            (spans, "y delete  n keep".to_string())
        }
        Mode::Navigate => navigate_line(app),
    };

    // Right-aligned hint when it fits
    let content_width = spans_width(&spans);
    let hint_width = unicode::display_width(&hint);
    if !hint.is_empty() && content_width + hint_width < width {
        spans.push(Span::styled(
            " ".repeat(width - content_width - hint_width),
            Style::default().bg(bg),
        ));
        spans.push(Span::styled(hint, dim));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

/// Drag preview, then the last message, then counts and key hints
fn navigate_line(app: &App) -> (Vec<Span<'static>>, String) {
    let bg = app.theme.background;
    let text = Style::default().fg(app.theme.text).bg(bg);

    if let Some(task_id) = app.resize.active_task()
        && let Some(end) = app.resize.preview(task_id)
    {
        let line = format!("{} ends {}", task_id, short_date(end));
        return (vec![Span::styled(line, text)], "release to apply  Esc cancel".into());
    }
    if let Some(task_id) = app.progress_drag.active_task()
        && let Some(progress) = app.progress_drag.preview(task_id)
    {
        let line = format!("{} at {}%", task_id, progress);
        return (vec![Span::styled(line, text)], "release to apply  Esc cancel".into());
    }

    if let Some(message) = &app.status_message {
        let color = if app.status_is_error {
            app.theme.red
        } else {
            app.theme.text
        };
        return (
            vec![Span::styled(message.clone(), Style::default().fg(color).bg(bg))],
            String::new(),
        );
    }

    let stats = board_stats(app.store.tasks());
    let mut summary = format!(
        "{} inbox  {} ongoing  {} done",
        stats.inbox, stats.ongoing, stats.completed
    );
    if stats.overdue > 0 {
        summary.push_str(&format!("  {} overdue", stats.overdue));
    }
    let hint = if app.config.ui.show_key_hints {
        match (app.view, app.detail.is_some()) {
            (_, true) => "e edit  space toggle  n subtask  a auto  Esc close",
            (View::Board, false) => "n new  s start  d done  Enter open  ? help",
            (View::Timeline, false) => "</> end date  drag bar edge  ? help",
        }
    } else {
        "? help"
    };
    (
        vec![Span::styled(summary, Style::default().fg(app.theme.dim).bg(bg))],
        hint.to_string(),
    )
}
