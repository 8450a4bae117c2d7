use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::helpers::centered_rect;
use crate::tui::app::{App, View};

/// Render the help overlay (toggled with ?)
pub fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let overlay_area = centered_rect(60, 90, area);
    frame.render_widget(Clear, overlay_area);

    let bg = app.theme.background;
    let key_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(app.theme.text).bg(bg);
    let header_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(" Key Bindings", header_style)));
    lines.push(Line::from(""));

    // Context-sensitive section first
    if app.detail.is_some() {
        lines.push(Line::from(Span::styled(" Task Detail", header_style)));
        add_binding(&mut lines, " \u{2191}\u{2193}/jk", "Move between fields", key_style, desc_style);
        add_binding(&mut lines, " Enter/e", "Edit field", key_style, desc_style);
        add_binding(&mut lines, " Space", "Toggle subtask", key_style, desc_style);
        add_binding(&mut lines, " n", "Add subtask", key_style, desc_style);
        add_binding(&mut lines, " x", "Remove subtask", key_style, desc_style);
        add_binding(&mut lines, " a", "Toggle auto progress", key_style, desc_style);
        add_binding(&mut lines, " +/-", "Adjust progress", key_style, desc_style);
        add_binding(&mut lines, " Esc/q", "Close", key_style, desc_style);
    } else {
        match app.view {
            View::Board => {
                lines.push(Line::from(Span::styled(" Board", header_style)));
                add_binding(&mut lines, " \u{2191}\u{2193}/jk", "Move cursor", key_style, desc_style);
                add_binding(&mut lines, " g/G", "Jump to top/bottom", key_style, desc_style);
                add_binding(&mut lines, " n", "New task", key_style, desc_style);
                add_binding(&mut lines, " Enter", "Open task detail", key_style, desc_style);
                add_binding(&mut lines, " +/-", "Adjust progress", key_style, desc_style);
                add_binding(&mut lines, " drag bar", "Set progress", key_style, desc_style);
            }
            View::Timeline => {
                lines.push(Line::from(Span::styled(" Timeline", header_style)));
                add_binding(&mut lines, " \u{2191}\u{2193}/jk", "Move cursor", key_style, desc_style);
                add_binding(&mut lines, " </>", "Move end date a day", key_style, desc_style);
                add_binding(&mut lines, " drag edge", "Move end date", key_style, desc_style);
                add_binding(&mut lines, " Enter", "Open task detail", key_style, desc_style);
            }
        }
    }
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(" Tasks", header_style)));
    add_binding(&mut lines, " s", "Start", key_style, desc_style);
    add_binding(&mut lines, " d", "Complete", key_style, desc_style);
    add_binding(&mut lines, " r", "Restore completed", key_style, desc_style);
    add_binding(&mut lines, " a", "Archive", key_style, desc_style);
    add_binding(&mut lines, " D/Del", "Delete", key_style, desc_style);
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(" General", header_style)));
    add_binding(&mut lines, " Tab/1/2", "Switch view", key_style, desc_style);
    add_binding(&mut lines, " T", "Toggle theme", key_style, desc_style);
    add_binding(&mut lines, " Esc", "Cancel drag", key_style, desc_style);
    add_binding(&mut lines, " ?", "Toggle this help", key_style, desc_style);
    add_binding(&mut lines, " q", "Quit", key_style, desc_style);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.dim).bg(bg))
        .style(Style::default().bg(bg));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(bg));

    frame.render_widget(paragraph, overlay_area);
}

fn add_binding<'a>(
    lines: &mut Vec<Line<'a>>,
    key: &'a str,
    desc: &'a str,
    key_style: Style,
    desc_style: Style,
) {
    let padded_key = format!("{:<14}", key);
    lines.push(Line::from(vec![
        Span::styled(padded_key, key_style),
        Span::styled(desc, desc_style),
    ]));
}
