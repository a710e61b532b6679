use chrono::Datelike;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

use super::app::{now, App, InputMode, Overlay, ViewMode};
use crate::calendar::{day_markers, leading_blanks, month_buckets, tasks_for_day, CalendarState, Marker};
use crate::filter::category_count;
use crate::models::Task;
use crate::status::{display_status, DisplayStatus};

/// Characters of a document's data-URL shown in the details overlay.
const PREVIEW_CHARS: usize = 60;

fn status_color(status: DisplayStatus) -> Color {
    match status {
        DisplayStatus::Completed => Color::Green,
        DisplayStatus::Overdue => Color::Red,
        DisplayStatus::Cancelled => Color::DarkGray,
        DisplayStatus::Pending => Color::Yellow,
    }
}

fn marker_color(marker: Marker) -> Color {
    match marker {
        Marker::Overdue => Color::Red,
        Marker::Completed => Color::Green,
        Marker::Other => Color::Blue,
    }
}

fn time_cell(t: &Task) -> String {
    t.time.map(|x| x.format("%H:%M").to_string()).unwrap_or_else(|| "--:--".into())
}

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // View
            Constraint::Length(3)  // Help
        ].as_ref())
        .split(f.area());

    match app.view_mode {
        ViewMode::Tasks => render_tasks(f, app, chunks[0]),
        ViewMode::Schedule => render_schedule(f, app, chunks[0]),
        ViewMode::Notes => render_notes(f, app, chunks[0]),
    }

    let help_text = match app.input_mode {
        InputMode::Normal => match (&app.overlay, app.view_mode) {
            (Overlay::Reminder, _) => "Enter/y: Mark Completed | Esc/l: Later",
            (Overlay::Details, _) => "Tab: Next Doc | o: Save Doc | x: Remove Doc | f: Attach | Esc: Close",
            (_, ViewMode::Tasks) => "q: Quit | Tab: View | h/l: Day | </>: Month | g: Today | [/]: Category | a: Add | Enter: Details | Space: Done | n/D/t/c/C/A/K/m/s: Edit | f: Attach | d: Del",
            (_, ViewMode::Schedule) => "q: Quit | Tab: View | S: From | E: To | x: Clear | Enter: Show Day | i: Details | [/]: Category | Space: Done | d: Del",
            (_, ViewMode::Notes) => "q: Quit | Tab: View | a: Add Note | d: Del",
        },
        InputMode::Adding => "Enter: Next Step | Tab: Next Category | Esc: Cancel",
        InputMode::Editing => "Enter: Save | Tab: Next Category | Esc: Cancel",
        InputMode::Attach => "Comma-separated paths (PDF or images) | Enter: Attach | Esc: Cancel",
        _ => "Enter: Save | Esc: Cancel",
    };
    let help_text = match &app.message {
        Some(msg) => format!("{}  ||  {}", msg, help_text),
        None => help_text.to_string(),
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(help, chunks[1]);

    match app.overlay {
        Overlay::Details => render_details(f, app),
        Overlay::Reminder => render_reminder(f, app),
        Overlay::None => {}
    }

    if app.input_mode != InputMode::Normal {
        render_input(f, app);
    }
}

fn render_tasks(f: &mut Frame, app: &mut App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(0)].as_ref())
        .split(area);

    let entries = app.sidebar_categories();
    let sidebar = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(0)].as_ref())
        .split(columns[0]);

    render_calendar(f, app, sidebar[0]);

    let tasks = app.session.tasks.tasks();
    let lines: Vec<Line> = entries
        .iter()
        .map(|c| {
            let text = format!("{} ({})", c.label(), category_count(tasks, c));
            if *c == app.category {
                Line::from(Span::styled(text, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)))
            } else {
                Line::from(text)
            }
        })
        .collect();
    let categories = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Categories"));
    f.render_widget(categories, sidebar[1]);

    let now = now();
    let selected = app.calendar.selected;
    let rows: Vec<Row> = app
        .visible_tasks()
        .into_iter()
        .map(|t| {
            let status = display_status(t, now);
            Row::new(vec![
                Cell::from(time_cell(t)),
                Cell::from(t.title.clone()),
                Cell::from(t.category().to_string()),
                Cell::from(t.client.clone().unwrap_or_default()),
                Cell::from(t.assignee.clone().unwrap_or_default()),
                Cell::from(if t.documents.is_empty() { String::new() } else { t.documents.len().to_string() }),
                Cell::from(status.label()),
            ]).style(Style::default().fg(status_color(status)))
        })
        .collect();

    let widths = [
        Constraint::Length(6),
        Constraint::Min(20),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Length(12),
        Constraint::Length(5),
        Constraint::Length(10),
    ];

    let day_tasks = tasks_for_day(app.session.tasks.tasks(), selected.year(), selected.month(), selected.day());
    let mut title = vec![Span::raw(format!(
        "Taskal - {} - {} ",
        selected.format("%A %d %B %Y"),
        app.category.label()
    ))];
    for marker in day_markers(&day_tasks, now).all() {
        title.push(Span::styled("●", Style::default().fg(marker_color(marker))));
    }
    let table = Table::new(rows, widths)
        .header(Row::new(vec!["Time", "Title", "Category", "Client", "Assignee", "Docs", "Status"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title(Line::from(title)))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, columns[1], &mut app.task_state);
}

/// Month grid. Each day is colored by its dominant marker.
fn render_calendar(f: &mut Frame, app: &App, area: Rect) {
    let now = now();
    let cal = &app.calendar;
    let week_start = app.config.week_start;
    let buckets = month_buckets(cal.year(), cal.month(), app.session.tasks.tasks(), now);

    let mut lines = vec![Line::from(
        week_start.labels().iter().map(|l| format!("{:>3}", l)).collect::<String>(),
    )];
    let mut spans: Vec<Span> = (0..leading_blanks(cal.year(), cal.month(), week_start))
        .map(|_| Span::raw("   "))
        .collect();

    for bucket in &buckets {
        let mut style = match bucket.markers.dominant() {
            Some(m) => Style::default().fg(marker_color(m)).add_modifier(Modifier::BOLD),
            None if CalendarState::is_weekend(bucket.date) => Style::default().fg(Color::DarkGray),
            None => Style::default(),
        };
        if bucket.date == now.date() {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        if bucket.date == cal.selected {
            style = style.add_modifier(Modifier::REVERSED);
        }
        spans.push(Span::styled(format!("{:>3}", bucket.day()), style));
        if spans.len() == 7 {
            lines.push(Line::from(std::mem::take(&mut spans)));
        }
    }
    if !spans.is_empty() {
        lines.push(Line::from(spans));
    }

    let title = cal.selected.format("%B %Y").to_string();
    let calendar = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(calendar, area);
}

fn render_schedule(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let bound = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "any".into());
    let header = Paragraph::new(format!(
        "From: {}   To: {}   Category: {}",
        bound(app.range.start),
        bound(app.range.end),
        app.category.label()
    ))
    .block(Block::default().borders(Borders::ALL).title("Range"));
    f.render_widget(header, chunks[0]);

    let now = now();
    let rows: Vec<Row> = app
        .visible_tasks()
        .into_iter()
        .map(|t| {
            let status = display_status(t, now);
            Row::new(vec![
                Cell::from(t.date.map(|d| d.format("%a %d %b %Y").to_string()).unwrap_or_else(|| "No date".into())),
                Cell::from(time_cell(t)),
                Cell::from(t.title.clone()),
                Cell::from(t.category().to_string()),
                Cell::from(t.client.clone().unwrap_or_default()),
                Cell::from(status.label()),
            ]).style(Style::default().fg(status_color(status)))
        })
        .collect();

    let widths = [
        Constraint::Length(16),
        Constraint::Length(6),
        Constraint::Min(20),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths)
        .header(Row::new(vec!["Date", "Time", "Title", "Category", "Client", "Status"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title("Taskal - Schedule"))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, chunks[1], &mut app.schedule_state);
}

fn render_notes(f: &mut Frame, app: &mut App, area: Rect) {
    let rows: Vec<Row> = app
        .session
        .notes
        .notes()
        .iter()
        .map(|n| {
            Row::new(vec![
                Cell::from(n.created_at.format("%d %B %Y %H:%M").to_string()),
                Cell::from(n.content.clone()),
            ])
        })
        .collect();

    let widths = [Constraint::Length(20), Constraint::Min(20)];

    let table = Table::new(rows, widths)
        .header(Row::new(vec!["Taken", "Note"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title("Taskal - Notes"))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.note_state);
}

fn render_details(f: &mut Frame, app: &App) {
    let Some(t) = app.detail_task() else { return; };
    let status = display_status(t, now());
    let field = |label: &str, value: Option<&String>| {
        Line::from(vec![
            Span::styled(format!("{:<10}", label), Style::default().fg(Color::Cyan)),
            Span::raw(value.cloned().unwrap_or_else(|| "-".into())),
        ])
    };

    let mut lines = vec![
        Line::from(Span::styled(t.title.clone(), Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        field("Date", t.date.map(|d| d.format("%A %d %B %Y").to_string()).as_ref()),
        field("Time", t.time.map(|x| x.format("%H:%M").to_string()).as_ref()),
        field("Category", Some(&t.category().to_string())),
        field("Client", t.client.as_ref()),
        field("Assignee", t.assignee.as_ref()),
        field("Contract", t.contract.as_ref()),
        field("Comment", t.comment.as_ref()),
        Line::from(vec![
            Span::styled(format!("{:<10}", "Status"), Style::default().fg(Color::Cyan)),
            Span::styled(status.label(), Style::default().fg(status_color(status))),
        ]),
        Line::from(""),
        Line::from(Span::styled(format!("Documents ({})", t.documents.len()), Style::default().fg(Color::Cyan))),
    ];
    for (i, doc) in t.documents.iter().enumerate() {
        let style = if i == app.doc_index {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(format!("  {} [{}]", doc.name, doc.mime_type), style)));
    }
    if let Some(url) = app.selected_document_preview(PREVIEW_CHARS) {
        let preview: String = url.chars().take(PREVIEW_CHARS).collect();
        lines.push(Line::from(Span::styled(format!("  {}...", preview), Style::default().fg(Color::DarkGray))));
    }

    let area = centered_rect(70, lines.len() as u16 + 2, f.area());
    f.render_widget(Clear, area);
    let details = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Task"));
    f.render_widget(details, area);
}

fn render_reminder(f: &mut Frame, app: &App) {
    let Some(t) = app.active_reminder() else { return; };
    let when = t.due_at().map(|d| d.format("%d %B %Y %H:%M").to_string()).unwrap_or_default();
    let lines = vec![
        Line::from(Span::styled(t.title.clone(), Style::default().add_modifier(Modifier::BOLD))),
        Line::from(crate::notify::REMINDER_BODY),
        Line::from(when),
        Line::from(""),
        Line::from("[Enter] Mark as completed    [Esc] Later"),
    ];
    let area = centered_rect(50, lines.len() as u16 + 2, f.area());
    f.render_widget(Clear, area);
    let popup = Paragraph::new(lines)
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title("Reminder"));
    f.render_widget(popup, area);
}

fn render_input(f: &mut Frame, app: &App) {
    let area = centered_rect(60, 3, f.area()); // Fixed height of 3 (border + 1 line)
    f.render_widget(Clear, area); // Clear the area first

    let title = match app.input_mode {
        InputMode::Adding => match app.add_state.field() {
            Some(field) => format!("Add Task ({}/{}): {}", app.add_state.step + 1, super::app::ADD_STEPS.len(), field.label()),
            None => "Add Task".to_string(),
        },
        InputMode::Editing => format!("Edit {}", app.edit_field.label()),
        InputMode::Note => "New Note".to_string(),
        InputMode::RangeStart => "From (YYYY-MM-DD, empty for any)".to_string(),
        InputMode::RangeEnd => "To (YYYY-MM-DD, empty for any)".to_string(),
        InputMode::Attach => "Attach Files".to_string(),
        InputMode::NewCategory => "New Category".to_string(),
        InputMode::Normal => String::new(),
    };

    let input = Paragraph::new(app.input_buffer.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(title));

    f.render_widget(input, area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let height = height.min(r.height);
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((r.height - height) / 2),
            Constraint::Length(height),
            Constraint::Length((r.height - height) / 2),
        ].as_ref())
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(popup_layout[1])[1]
}
