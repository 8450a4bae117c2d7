use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::helpers::{centered_rect, pad_spans, scroll_offset, short_date, status_symbol};
use crate::model::task::Task;
use crate::tui::app::{App, DetailRow, detail_rows};

const LABEL_WIDTH: usize = 12;

/// Render the task detail overlay on top of the current view
pub fn render_detail_view(frame: &mut Frame, app: &App, area: Rect) {
    let Some(detail) = &app.detail else {
        return;
    };
    let Some(task) = app.store.get(&detail.task_id) else {
        return;
    };

    let popup = centered_rect(70, 80, area);
    frame.render_widget(Clear, popup);

    let bg = app.theme.background;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {} ", task.id),
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(app.theme.purple).bg(bg))
        .style(Style::default().bg(bg));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);
    if inner.height < 2 {
        return;
    }

    let width = inner.width as usize;
    let rows = detail_rows(task);
    let mut lines: Vec<Line> = Vec::new();
    let mut cursor_line = 0;

    for (i, row) in rows.iter().enumerate() {
        if let DetailRow::Subtask(0) = row {
            // Status sits between the fields and the subtasks, not a cursor stop
            lines.push(field_line(
                app,
                "Status",
                vec![Span::styled(
                    format!("{} {}", status_symbol(task.status), task.status.as_str()),
                    Style::default().fg(app.theme.status_color(task.status)),
                )],
                width,
                false,
            ));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!(
                    " Subtasks {}/{}",
                    task.done_subtask_count(),
                    task.subtasks.len()
                ),
                Style::default()
                    .fg(app.theme.text_bright)
                    .bg(bg)
                    .add_modifier(Modifier::BOLD),
            )));
        }
        let selected = i == detail.cursor;
        if selected {
            cursor_line = lines.len();
        }
        lines.push(row_line(app, task, *row, width, selected));
    }
    if task.subtasks.is_empty() {
        lines.push(field_line(
            app,
            "Status",
            vec![Span::styled(
                format!("{} {}", status_symbol(task.status), task.status.as_str()),
                Style::default().fg(app.theme.status_color(task.status)),
            )],
            width,
            false,
        ));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            " No subtasks. Press n to add one.",
            Style::default().fg(app.theme.dim).bg(bg),
        )));
    }

    // Last line of the popup holds the key hints
    let body_height = inner.height.saturating_sub(1) as usize;
    let offset = scroll_offset(cursor_line, body_height);
    let body = Rect {
        height: inner.height - 1,
        ..inner
    };
    frame.render_widget(
        Paragraph::new(lines)
            .style(Style::default().bg(bg))
            .scroll((offset as u16, 0)),
        body,
    );

    let hint = Rect {
        y: inner.y + inner.height - 1,
        height: 1,
        ..inner
    };
    frame.render_widget(
        Paragraph::new(" e edit  space toggle  n subtask  x remove  a auto  Esc close")
            .style(Style::default().fg(app.theme.dim).bg(bg)),
        hint,
    );
}

fn row_line(app: &App, task: &Task, row: DetailRow, width: usize, selected: bool) -> Line<'static> {
    let text = Style::default().fg(app.theme.text_bright);
    let dim = Style::default().fg(app.theme.dim);
    match row {
        DetailRow::Title => field_line(
            app,
            "Title",
            vec![Span::styled(task.title.clone(), text.add_modifier(Modifier::BOLD))],
            width,
            selected,
        ),
        DetailRow::Description => {
            let value = if task.description.is_empty() {
                Span::styled("none", dim)
            } else {
                // Only the first line fits the field row
                let first = task.description.lines().next().unwrap_or("");
                Span::styled(first.to_string(), text)
            };
            field_line(app, "Description", vec![value], width, selected)
        }
        DetailRow::Start => field_line(
            app,
            "Start",
            vec![Span::styled(task.start_date.to_string(), text)],
            width,
            selected,
        ),
        DetailRow::End => field_line(
            app,
            "End",
            vec![Span::styled(task.planned_end_date.to_string(), text)],
            width,
            selected,
        ),
        DetailRow::Deadline => {
            let spans = match task.hard_deadline {
                Some(deadline) if task.is_overdue() => vec![
                    Span::styled(deadline.to_string(), Style::default().fg(app.theme.overdue)),
                    Span::styled(
                        format!("  overdue, ends {}", short_date(task.planned_end_date)),
                        Style::default()
                            .fg(app.theme.overdue)
                            .add_modifier(Modifier::BOLD),
                    ),
                ],
                Some(deadline) => vec![Span::styled(deadline.to_string(), text)],
                None => vec![Span::styled("none", dim)],
            };
            field_line(app, "Deadline", spans, width, selected)
        }
        DetailRow::Progress => {
            let mode = if task.auto_progress {
                format!(
                    "  auto ({}/{} subtasks)",
                    task.done_subtask_count(),
                    task.subtasks.len()
                )
            } else {
                "  manual".to_string()
            };
            let progress = app.progress_drag.preview(&task.id).unwrap_or(task.progress);
            field_line(
                app,
                "Progress",
                vec![
                    Span::styled(format!("{}%", progress), text),
                    Span::styled(mode, dim),
                ],
                width,
                selected,
            )
        }
        DetailRow::Subtask(index) => {
            let Some(subtask) = task.subtasks.get(index) else {
                return Line::from("");
            };
            let bg = if selected {
                app.theme.selection_bg
            } else {
                app.theme.background
            };
            let (mark, mark_color) = if subtask.done {
                ("[x]", app.theme.green)
            } else {
                ("[ ]", app.theme.text)
            };
            let text_style = if subtask.done {
                Style::default().fg(app.theme.dim).bg(bg)
            } else {
                Style::default().fg(app.theme.text_bright).bg(bg)
            };
            let mut spans = vec![
                Span::styled(format!("   {} ", mark), Style::default().fg(mark_color).bg(bg)),
                Span::styled(
                    format!("{} ", subtask.id),
                    Style::default().fg(app.theme.dim).bg(bg),
                ),
                Span::styled(subtask.text.clone(), text_style),
            ];
            pad_spans(&mut spans, width, Style::default().bg(bg));
            Line::from(spans)
        }
    }
}

/// "  Label       value", with the row background carried across the width
fn field_line(
    app: &App,
    label: &str,
    value: Vec<Span<'static>>,
    width: usize,
    selected: bool,
) -> Line<'static> {
    let bg = if selected {
        app.theme.selection_bg
    } else {
        app.theme.background
    };
    let mut spans = vec![Span::styled(
        format!(" {:<w$}", label, w = LABEL_WIDTH),
        Style::default().fg(app.theme.dim).bg(bg),
    )];
    spans.extend(value.into_iter().map(|s| {
        let style = s.style.bg(bg);
        s.style(style)
    }));
    pad_spans(&mut spans, width, Style::default().bg(bg));
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    fn detail(app: &App) -> String {
        render_to_string(TERM_W, 30, |frame, area| {
            render_detail_view(frame, app, area);
        })
    }

    fn open(app: &mut App, id: &str) {
        app.select_task(id);
        app.open_detail();
    }

    #[test]
    fn shows_fields_and_subtasks() {
        let mut app = app_with_tasks(sample_tasks());
        open(&mut app, "T-003");
        let output = detail(&app);
        assert!(output.contains(" T-003 "));
        assert!(output.contains("Migrate data"));
        assert!(output.contains("2025-05-09"));
        assert!(output.contains("2025-05-16"));
        assert!(output.contains("75%  auto (3/4 subtasks)"));
        assert!(output.contains("Subtasks 3/4"));
        assert!(output.contains("[x] T-003.1 step 1"));
        assert!(output.contains("[ ] T-003.4 step 4"));
    }

    #[test]
    fn overdue_deadline_flagged() {
        let mut app = app_with_tasks(sample_tasks());
        open(&mut app, "T-003");
        assert!(detail(&app).contains("2025-05-13  overdue, ends May 16"));
    }

    #[test]
    fn manual_task_without_subtasks() {
        let mut app = app_with_tasks(sample_tasks());
        open(&mut app, "T-002");
        let output = detail(&app);
        assert!(output.contains("40%  manual"));
        assert!(output.contains("No subtasks"));
        assert!(output.contains("[>] ongoing"));
    }

    #[test]
    fn missing_deadline_reads_none() {
        let mut app = app_with_tasks(sample_tasks());
        open(&mut app, "T-001");
        let output = detail(&app);
        let deadline = output.lines().find(|l| l.contains("Deadline")).unwrap();
        assert!(deadline.contains("none"));
    }

    #[test]
    fn nothing_when_closed() {
        let app = app_with_tasks(sample_tasks());
        assert_eq!(detail(&app), "");
    }
}
