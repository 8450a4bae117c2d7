use chrono::NaiveDate;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Span;

use crate::model::task::TaskStatus;
use crate::util::unicode;

/// Status symbols (markdown checkbox style)
pub(super) fn status_symbol(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Inbox => "[ ]",
        TaskStatus::Ongoing => "[>]",
        TaskStatus::Completed => "[x]",
        TaskStatus::Archived => "[-]",
    }
}

/// Short date for cards and rows, e.g. "May 14"
pub(super) fn short_date(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// Compute total display width of a slice of spans
pub(super) fn spans_width(spans: &[Span]) -> usize {
    spans
        .iter()
        .map(|s| unicode::display_width(&s.content))
        .sum()
}

/// Pad `spans` with styled spaces out to `width` cells
pub(super) fn pad_spans(spans: &mut Vec<Span<'static>>, width: usize, style: Style) {
    let used = spans_width(spans);
    if used < width {
        spans.push(Span::styled(" ".repeat(width - used), style));
    }
}

/// Filled and empty cell counts for a progress bar `width` cells wide
pub(super) fn progress_cells(width: usize, progress: u8) -> (usize, usize) {
    let filled = width * progress.min(100) as usize / 100;
    (filled, width - filled)
}

/// Centered rect using a percentage of the area
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// First row to draw so that `cursor` stays inside a window of `visible` rows
pub(super) fn scroll_offset(cursor: usize, visible: usize) -> usize {
    if visible == 0 {
        return 0;
    }
    (cursor + 1).saturating_sub(visible)
}
