use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::ops::board::board_stats;
use crate::tui::app::{App, View};

/// Render the tab bar: Board and Timeline tabs, with separator line below
pub fn render_tab_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Split into tab row and separator row
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // tabs
            Constraint::Length(1), // separator
        ])
        .split(area);

    let sep_cols = render_tabs(frame, app, chunks[0]);
    render_separator(frame, app, chunks[1], &sep_cols);
}

/// Render tabs and return the column positions of each separator character.
fn render_tabs(frame: &mut Frame, app: &App, area: Rect) -> Vec<usize> {
    let mut spans: Vec<Span> = Vec::new();
    let mut sep_cols: Vec<usize> = Vec::new();
    let bg = app.theme.background;
    let sep = Span::styled("\u{2502}", Style::default().fg(app.theme.dim).bg(bg));
    let stats = board_stats(app.store.tasks());

    // Leading icon
    let bg_style = Style::default().bg(bg);
    spans.push(Span::styled(" ", bg_style));
    spans.push(Span::styled(
        "\u{25B6}",
        Style::default().fg(app.theme.purple).bg(bg),
    ));
    spans.push(Span::styled(" ", bg_style));

    // Board tab with inbox (*N) and ongoing (~N) counts
    let is_board = app.view == View::Board;
    let style = tab_style(app, is_board);
    let tab_bg = if is_board { app.theme.selection_bg } else { bg };
    spans.push(Span::styled(" Board ", style));
    spans.push(Span::styled(
        format!("*{}", stats.inbox),
        Style::default().fg(app.theme.purple).bg(tab_bg),
    ));
    spans.push(Span::styled(" ", style));
    spans.push(Span::styled(
        format!("~{}", stats.ongoing),
        Style::default().fg(app.theme.highlight).bg(tab_bg),
    ));
    spans.push(Span::styled(" ", style));
    sep_cols.push(spans.iter().map(|s| s.content.chars().count()).sum());
    spans.push(sep.clone());

    // Timeline tab with open task count, flagged when anything is overdue
    let is_timeline = app.view == View::Timeline;
    let style = tab_style(app, is_timeline);
    let tab_bg = if is_timeline { app.theme.selection_bg } else { bg };
    spans.push(Span::styled(
        format!(" Timeline {} ", stats.inbox + stats.ongoing),
        style,
    ));
    if stats.overdue > 0 {
        spans.push(Span::styled(
            format!("!{} ", stats.overdue),
            Style::default().fg(app.theme.overdue).bg(tab_bg),
        ));
    }
    sep_cols.push(spans.iter().map(|s| s.content.chars().count()).sum());
    spans.push(sep);

    let line = Line::from(spans);
    let tabs = Paragraph::new(line).style(Style::default().bg(bg));
    frame.render_widget(tabs, area);
    sep_cols
}

fn render_separator(frame: &mut Frame, app: &App, area: Rect, sep_cols: &[usize]) {
    let width = area.width as usize;
    let mut line: String = String::with_capacity(width * 3);
    for col in 0..width {
        if sep_cols.contains(&col) {
            line.push('\u{2534}');
        } else {
            line.push('\u{2500}');
        }
    }
    let sep_widget =
        Paragraph::new(line).style(Style::default().fg(app.theme.dim).bg(app.theme.background));
    frame.render_widget(sep_widget, area);
}

/// Style for a tab: highlighted if current, normal otherwise
fn tab_style(app: &App, is_current: bool) -> Style {
    if is_current {
        Style::default()
            .fg(app.theme.text_bright)
            .bg(app.theme.selection_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.text).bg(app.theme.background)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn tabs_show_counts() {
        let app = app_with_tasks(sample_tasks());
        let output = render_to_string(TERM_W, 2, |frame, area| {
            render_tab_bar(frame, &app, area);
        });
        let first = output.lines().next().unwrap();
        assert!(first.contains("Board *1 ~2"), "{first}");
        assert!(first.contains("Timeline 3 !1"), "{first}");
        assert!(output.lines().nth(1).unwrap().contains('\u{2534}'));
    }

    #[test]
    fn no_overdue_flag_when_clear() {
        let app = app_with_tasks(vec![]);
        let output = render_to_string(TERM_W, 2, |frame, area| {
            render_tab_bar(frame, &app, area);
        });
        assert!(output.contains("Timeline 0"));
        assert!(!output.contains('!'));
    }
}
