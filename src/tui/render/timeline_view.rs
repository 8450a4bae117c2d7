use chrono::{Datelike, NaiveDate};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::helpers::{pad_spans, scroll_offset};
use crate::model::task::Task;
use crate::ops::board::timeline_rows;
use crate::ops::timeline::{BarGeometry, TimelineAxis};
use crate::tui::app::{App, TimelineHit};
use crate::tui::theme::Theme;
use crate::util::unicode;

/// Width of the task title column
const LABEL_WIDTH: u16 = 24;

/// Render the timeline: a title column, a day header, and one bar per open task
pub fn render_timeline_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let axis = app.axis();
    let today = app.store.today();
    let rows: Vec<Task> = timeline_rows(app.store.tasks())
        .into_iter()
        .cloned()
        .collect();

    if rows.is_empty() {
        let empty = Paragraph::new(" No open tasks. Press n to add one.")
            .style(Style::default().fg(app.theme.dim).bg(bg));
        frame.render_widget(empty, area);
        return;
    }

    let label_w = LABEL_WIDTH.min(area.width / 3);
    let chart_x = area.x + label_w + 1;
    let chart_w = (area.width.saturating_sub(label_w + 1) as i64).min(axis.width()) as u16;

    let mut lines: Vec<Line> = Vec::new();
    lines.push(header_line(&app.theme, &axis, today, label_w, chart_w));

    let body_h = area.height.saturating_sub(1) as usize;
    let cursor = app.timeline_cursor;
    let offset = scroll_offset(cursor, body_h);
    let mut hit_rows = Vec::new();

    for (i, task) in rows.iter().enumerate().skip(offset).take(body_h) {
        let selected = app.detail.is_none() && i == cursor;
        let bar = axis.bar(task, app.resize.preview(&task.id));
        let row_bg = if selected {
            app.theme.selection_bg
        } else {
            bg
        };

        let mut spans = vec![Span::styled(
            unicode::pad_to_width(&format!(" {} {}", task.id, task.title), label_w as usize),
            Style::default()
                .fg(if selected {
                    app.theme.text_bright
                } else {
                    app.theme.text
                })
                .bg(row_bg),
        )];
        spans.push(Span::styled(" ", Style::default().bg(row_bg)));
        for px in 0..chart_w as i64 {
            let is_today = axis.date_at(px) == today;
            spans.push(bar_cell(&app.theme, &bar, px, is_today));
        }
        pad_spans(&mut spans, area.width as usize, Style::default().bg(bg));
        lines.push(Line::from(spans));

        hit_rows.push((area.y + 1 + (i - offset) as u16, task.id.clone()));
    }

    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);

    app.hits.timeline = Some(TimelineHit {
        x: chart_x,
        width: chart_w,
        rows: hit_rows,
    });
}

/// Month label over the title column, then each day's number at its first column
fn header_line(
    theme: &Theme,
    axis: &TimelineAxis,
    today: NaiveDate,
    label_w: u16,
    chart_w: u16,
) -> Line<'static> {
    let bg = theme.background;
    let mut spans = vec![Span::styled(
        unicode::pad_to_width(&format!(" {}", axis.start.format("%b %Y")), label_w as usize + 1),
        Style::default().fg(theme.dim).bg(bg),
    )];

    let dw = axis.day_width as usize;
    for day in axis.days() {
        let start = axis.pixel_offset(day);
        if start >= chart_w as i64 {
            break;
        }
        let cells = dw.min((chart_w as i64 - start) as usize);
        let label = if dw >= 3 {
            format!("{:<w$}", day.day(), w = dw)
        } else {
            format!("{:<w$}", day.day() % 10, w = dw)
        };
        let label: String = label.chars().take(cells).collect();
        let style = if day == today {
            Style::default()
                .fg(theme.highlight)
                .bg(theme.today_bg)
                .add_modifier(Modifier::BOLD)
        } else if day.weekday().number_from_monday() >= 6 {
            Style::default().fg(theme.dim).bg(bg)
        } else {
            Style::default().fg(theme.text).bg(bg)
        };
        spans.push(Span::styled(label, style));
    }
    Line::from(spans)
}

/// One chart cell: deadline marker, progress fill, remaining bar, overdue tail
/// or background
fn bar_cell(theme: &Theme, bar: &BarGeometry, px: i64, is_today: bool) -> Span<'static> {
    let empty_bg = if is_today { theme.today_bg } else { theme.background };
    // The marker sits on the deadline's last column, drawn over the bar too
    if bar.deadline_px == Some(px + 1) {
        return Span::styled(
            "\u{2503}", // ┃
            Style::default()
                .fg(theme.overdue)
                .bg(empty_bg)
                .add_modifier(Modifier::BOLD),
        );
    }
    if bar.contains(px) {
        let color = if bar.is_overdue_at(px) {
            theme.overdue
        } else if bar.is_filled_at(px) {
            theme.bar_fill
        } else {
            theme.bar_empty
        };
        let symbol = if bar.is_filled_at(px) {
            "\u{2588}" // █
        } else if bar.is_overdue_at(px) {
            "\u{2593}" // ▓
        } else {
            "\u{2591}" // ░
        };
        return Span::styled(symbol, Style::default().fg(color).bg(empty_bg));
    }
    Span::styled(" ", Style::default().bg(empty_bg))
}
