pub mod app;
pub mod ui;

use std::io;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{error, info};

use crate::commands::Field;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::session::Session;
use app::{App, InputMode, Overlay, ViewMode};
use ui::ui;

/// How long to wait for a key before checking fired reminders again.
const TICK: Duration = Duration::from_millis(250);

/// Runs the interactive session and hands back what was entered.
pub fn run_tui(config: Config, start: NaiveDate) -> Result<Session> {
    // Reminder timers live on their own small runtime
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_time()
        .build()
        .map_err(|e| Error::Runtime(e.to_string()))?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, runtime.handle().clone(), start);
    info!(%start, "session started");

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(%err, "event loop failed");
    }
    res?;

    info!(pending = app.pending_reminders(), "session ended");
    // Dropping the rest of the app cancels reminders before the runtime goes.
    let App { session, .. } = app;
    Ok(session)
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        app.drain_reminders();
        terminal.draw(|f| ui(f, app))?;

        if !event::poll(TICK)? {
            continue;
        }
        let Event::Key(key) = event::read()? else { continue; };

        if app.input_mode != InputMode::Normal {
            match key.code {
                KeyCode::Enter => app.handle_input(),
                KeyCode::Esc => app.cancel_input(),
                KeyCode::Tab => app.complete_category(),
                KeyCode::Char(c) => app.input_buffer.push(c),
                KeyCode::Backspace => {
                    app.input_buffer.pop();
                }
                _ => {}
            }
            continue;
        }

        match app.overlay {
            Overlay::Reminder => match key.code {
                KeyCode::Enter | KeyCode::Char('y') => app.reminder_complete(),
                KeyCode::Esc | KeyCode::Char('l') | KeyCode::Char('n') => app.reminder_later(),
                _ => {}
            },
            Overlay::Details => match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => app.close_overlay(),
                KeyCode::Tab => app.next_document(),
                KeyCode::Char('x') => app.detach_document(),
                KeyCode::Char('o') => app.export_document(),
                KeyCode::Char('f') => app.start_attach(),
                _ => {}
            },
            Overlay::None => {
                if key.code == KeyCode::Char('q') {
                    return Ok(());
                }
                handle_normal_key(app, key.code);
            }
        }
    }
}

fn handle_normal_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Tab => return app.toggle_view(),
        KeyCode::Char('1') => return app.set_view(ViewMode::Tasks),
        KeyCode::Char('2') => return app.set_view(ViewMode::Schedule),
        KeyCode::Char('3') => return app.set_view(ViewMode::Notes),
        KeyCode::Down | KeyCode::Char('j') => return app.next(),
        KeyCode::Up | KeyCode::Char('k') => return app.previous(),
        KeyCode::Char('d') | KeyCode::Delete => return app.delete_selected(),
        _ => {}
    }

    match app.view_mode {
        ViewMode::Tasks | ViewMode::Schedule => match code {
            KeyCode::Char(' ') => app.toggle_complete_selected(),
            KeyCode::Char('[') => app.cycle_category(false),
            KeyCode::Char(']') => app.cycle_category(true),
            KeyCode::Char('N') => app.start_new_category(),
            KeyCode::Char('n') => app.start_edit(Field::Title),
            KeyCode::Char('D') => app.start_edit(Field::Date),
            KeyCode::Char('t') => app.start_edit(Field::Time),
            KeyCode::Char('c') => app.start_edit(Field::Category),
            KeyCode::Char('C') => app.start_edit(Field::Client),
            KeyCode::Char('A') => app.start_edit(Field::Assignee),
            KeyCode::Char('K') => app.start_edit(Field::Contract),
            KeyCode::Char('m') => app.start_edit(Field::Comment),
            KeyCode::Char('s') => app.start_edit(Field::Status),
            KeyCode::Char('f') => app.start_attach(),
            _ => match app.view_mode {
                ViewMode::Tasks => handle_calendar_key(app, code),
                _ => handle_schedule_key(app, code),
            },
        },
        ViewMode::Notes => {
            if code == KeyCode::Char('a') {
                app.start_note();
            }
        }
    }
}

fn handle_calendar_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Left | KeyCode::Char('h') => app.shift_day(-1),
        KeyCode::Right | KeyCode::Char('l') => app.shift_day(1),
        KeyCode::Char('<') | KeyCode::PageUp => app.prev_month(),
        KeyCode::Char('>') | KeyCode::PageDown => app.next_month(),
        KeyCode::Char('w') => app.shift_day(7),
        KeyCode::Char('b') => app.shift_day(-7),
        KeyCode::Char('g') => app.go_today(),
        KeyCode::Char('a') => app.start_add(),
        KeyCode::Enter => app.open_details(),
        _ => {}
    }
}

fn handle_schedule_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('S') => app.start_range(false),
        KeyCode::Char('E') => app.start_range(true),
        KeyCode::Char('x') => app.clear_range(),
        KeyCode::Char('i') => app.open_details(),
        KeyCode::Enter => app.jump_to_selected(),
        _ => {}
    }
}
