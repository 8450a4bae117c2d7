use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::helpers::{pad_spans, progress_cells, scroll_offset, short_date, status_symbol, spans_width};
use crate::model::task::Task;
use crate::tui::app::{App, ProgressHit, RowHit, Section, View};
use crate::util::unicode;

/// Columns before a card's progress bar
const BAR_INDENT: u16 = 4;
/// Room after the bar for " 100% auto"
const BAR_SUFFIX: u16 = 10;

/// Render the board: inbox, ongoing cards and history stacked top to bottom
pub fn render_board_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(50),
            Constraint::Percentage(20),
        ])
        .split(area);

    for (section, chunk) in Section::ALL.into_iter().zip(chunks.iter()) {
        render_section(frame, app, section, *chunk);
    }
}

fn render_section(frame: &mut Frame, app: &mut App, section: Section, area: Rect) {
    if area.height == 0 {
        return;
    }
    let bg = app.theme.background;
    let width = area.width as usize;
    let status = section.status();
    let tasks: Vec<Task> = app
        .store
        .tasks()
        .iter()
        .filter(|t| t.status == status)
        .cloned()
        .collect();
    let is_current = app.view == View::Board && app.section == section && app.detail.is_none();
    let cursor = app.board_cursors[section.index()];

    // Header: "Inbox 3 ─────"
    let header_style = Style::default()
        .fg(if is_current {
            app.theme.text_bright
        } else {
            app.theme.text
        })
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let mut header = vec![
        Span::styled(format!(" {} ", section.title()), header_style),
        Span::styled(
            format!("{} ", tasks.len()),
            Style::default().fg(app.theme.dim).bg(bg),
        ),
    ];
    let rule = width.saturating_sub(spans_width(&header));
    header.push(Span::styled(
        "\u{2500}".repeat(rule),
        Style::default().fg(app.theme.dim).bg(bg),
    ));
    frame.render_widget(
        Paragraph::new(Line::from(header)),
        Rect { height: 1, ..area },
    );

    let body = Rect {
        y: area.y + 1,
        height: area.height - 1,
        ..area
    };
    if tasks.is_empty() {
        let message = match section {
            Section::Inbox => " Inbox is empty. Press n to capture a task.",
            Section::Ongoing => " Nothing in progress",
            Section::History => " Nothing completed yet",
        };
        frame.render_widget(
            Paragraph::new(message).style(Style::default().fg(app.theme.dim).bg(bg)),
            body,
        );
        return;
    }

    let item_height: u16 = if section == Section::Ongoing { 2 } else { 1 };
    let visible = (body.height / item_height) as usize;
    let offset = scroll_offset(cursor, visible);

    let mut lines: Vec<Line> = Vec::new();
    for (i, task) in tasks.iter().enumerate().skip(offset).take(visible) {
        let selected = is_current && i == cursor;
        let y = body.y + ((i - offset) as u16) * item_height;
        app.hits.rows.push(RowHit {
            task_id: task.id.clone(),
            area: Rect::new(body.x, y, body.width, item_height),
        });
        match section {
            Section::Ongoing => {
                let (title_line, bar_line) = card_lines(app, task, width, selected);
                lines.push(title_line);
                lines.push(bar_line);
                let bar_width = body.width.saturating_sub(BAR_INDENT + BAR_SUFFIX);
                if bar_width > 0 {
                    app.hits.progress_bars.push(ProgressHit {
                        task_id: task.id.clone(),
                        x: body.x + BAR_INDENT,
                        y: y + 1,
                        width: bar_width,
                    });
                }
            }
            _ => lines.push(row_line(app, task, width, selected)),
        }
    }

    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), body);
}

/// One-line row for inbox and history: "[ ] T-001 Title        ends May 12"
fn row_line(app: &App, task: &Task, width: usize, selected: bool) -> Line<'static> {
    let bg = if selected {
        app.theme.selection_bg
    } else {
        app.theme.background
    };
    let right = if task.status.is_closed() {
        format!("{}% ", task.progress)
    } else {
        format!("ends {} ", short_date(task.planned_end_date))
    };
    let mut spans = vec![
        Span::styled(
            format!(" {} ", status_symbol(task.status)),
            Style::default().fg(app.theme.status_color(task.status)).bg(bg),
        ),
        Span::styled(
            format!("{} ", task.id),
            Style::default().fg(app.theme.dim).bg(bg),
        ),
    ];
    let title_room = width.saturating_sub(spans_width(&spans) + unicode::display_width(&right) + 1);
    spans.push(Span::styled(
        unicode::truncate_to_width(&task.title, title_room),
        title_style(app, selected, bg),
    ));
    pad_spans(
        &mut spans,
        width.saturating_sub(unicode::display_width(&right)),
        Style::default().bg(bg),
    );
    spans.push(Span::styled(right, Style::default().fg(app.theme.dim).bg(bg)));
    Line::from(spans)
}

/// Two lines for an ongoing card: title with dates, then the progress bar
fn card_lines(app: &App, task: &Task, width: usize, selected: bool) -> (Line<'static>, Line<'static>) {
    let bg = if selected {
        app.theme.selection_bg
    } else {
        app.theme.background
    };

    // Title line
    let mut dates = vec![Span::styled(
        format!("ends {}", short_date(task.planned_end_date)),
        Style::default().fg(app.theme.dim).bg(bg),
    )];
    if let Some(deadline) = task.hard_deadline {
        let color = if task.is_overdue() {
            app.theme.overdue
        } else {
            app.theme.yellow
        };
        dates.push(Span::styled(
            format!("  deadline {}", short_date(deadline)),
            Style::default().fg(color).bg(bg),
        ));
        if task.is_overdue() {
            dates.push(Span::styled(
                " OVERDUE",
                Style::default()
                    .fg(app.theme.overdue)
                    .bg(bg)
                    .add_modifier(Modifier::BOLD),
            ));
        }
    }
    dates.push(Span::styled(" ", Style::default().bg(bg)));

    let mut title = vec![
        Span::styled(
            format!(" {} ", status_symbol(task.status)),
            Style::default().fg(app.theme.status_color(task.status)).bg(bg),
        ),
        Span::styled(
            format!("{} ", task.id),
            Style::default().fg(app.theme.dim).bg(bg),
        ),
    ];
    let dates_width = spans_width(&dates);
    let title_room = width.saturating_sub(spans_width(&title) + dates_width + 1);
    title.push(Span::styled(
        unicode::truncate_to_width(&task.title, title_room),
        title_style(app, selected, bg),
    ));
    pad_spans(&mut title, width.saturating_sub(dates_width), Style::default().bg(bg));
    title.extend(dates);

    // Bar line, showing the drag preview while one is running
    let progress = app.progress_drag.preview(&task.id).unwrap_or(task.progress);
    let bar_width = width.saturating_sub((BAR_INDENT + BAR_SUFFIX) as usize);
    let (filled, empty) = progress_cells(bar_width, progress);
    let fill_color = if task.auto_progress {
        app.theme.dim
    } else {
        app.theme.bar_fill
    };
    let mut bar = vec![
        Span::styled(" ".repeat(BAR_INDENT as usize), Style::default().bg(bg)),
        Span::styled("\u{2588}".repeat(filled), Style::default().fg(fill_color).bg(bg)),
        Span::styled(
            "\u{2591}".repeat(empty),
            Style::default().fg(app.theme.bar_empty).bg(bg),
        ),
        Span::styled(
            format!(" {:>3}%", progress),
            Style::default().fg(app.theme.text).bg(bg),
        ),
    ];
    if task.auto_progress {
        bar.push(Span::styled(
            format!(" {}/{}", task.done_subtask_count(), task.subtasks.len()),
            Style::default().fg(app.theme.dim).bg(bg),
        ));
    }
    pad_spans(&mut bar, width, Style::default().bg(bg));

    (Line::from(title), Line::from(bar))
}

fn title_style(app: &App, selected: bool, bg: ratatui::style::Color) -> Style {
    let style = Style::default().fg(app.theme.text_bright).bg(bg);
    if selected {
        style.add_modifier(Modifier::BOLD)
    } else {
        style
    }
}
