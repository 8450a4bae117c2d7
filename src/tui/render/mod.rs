pub mod board_view;
pub mod detail_view;
pub mod help_overlay;
pub mod helpers;
pub mod status_row;
pub mod tab_bar;
pub mod timeline_view;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;

use super::app::{App, HitMap, View};

/// Main render function: dispatches to sub-renderers
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: tab bar (2 rows) | content | status row (1 row)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // tab bar + separator
            Constraint::Min(1),    // content area
            Constraint::Length(1), // status row
        ])
        .split(area);

    // Hit regions are rebuilt by the views every frame
    app.hits = HitMap::default();

    tab_bar::render_tab_bar(frame, app, chunks[0]);

    match app.view {
        View::Board => board_view::render_board_view(frame, app, chunks[1]),
        View::Timeline => timeline_view::render_timeline_view(frame, app, chunks[1]),
    }

    if app.detail.is_some() {
        detail_view::render_detail_view(frame, app, chunks[1]);
    }

    // Help overlay (rendered on top of everything)
    if app.show_help {
        help_overlay::render_help_overlay(frame, app, frame.area());
    }

    status_row::render_status_row(frame, app, chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_helpers::*;

    #[test]
    fn full_screen_board() {
        let mut app = app_with_tasks(sample_tasks());
        let output = render_to_string(TERM_W, TERM_H, |frame, _| render(frame, &mut app));
        assert!(output.contains("Board"));
        assert!(output.contains("Timeline"));
        assert!(output.contains("Draft outline"));
        assert!(output.contains("Ship release"));
        assert!(output.contains("Book venue"));
    }

    #[test]
    fn full_screen_timeline_hides_closed_tasks() {
        let mut app = app_with_tasks(sample_tasks());
        app.view = View::Timeline;
        let output = render_to_string(TERM_W, TERM_H, |frame, _| render(frame, &mut app));
        assert!(output.contains("Migrate data"));
        assert!(!output.contains("Book venue"));
        let hit = app.hits.timeline.as_ref().unwrap();
        assert_eq!(hit.rows.len(), 3);
    }

    #[test]
    fn light_and_dark_backgrounds_differ() {
        let mut app = app_with_tasks(sample_tasks());
        let backend = ratatui::backend::TestBackend::new(TERM_W, TERM_H);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, &mut app)).unwrap();
        let light = terminal.backend().buffer()[(0, 23)].bg;

        app.toggle_theme();
        terminal.draw(|frame| render(frame, &mut app)).unwrap();
        let dark = terminal.backend().buffer()[(0, 23)].bg;
        assert_ne!(light, dark);
        assert_eq!(dark, app.theme.background);
    }
}
