use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveDateTime};
use ratatui::widgets::TableState;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::debug;
use uuid::Uuid;

use crate::blobs::read_uploads;
use crate::calendar::CalendarState;
use crate::commands::{
    cmd_add, cmd_attach, cmd_complete, cmd_detach, cmd_edit, cmd_export_document, cmd_note_add,
    cmd_note_remove, cmd_remove, cmd_toggle_complete, Field, TaskForm,
};
use crate::config::Config;
use crate::filter::{categories, day_view, range_view, CategoryFilter, DateRange};
use crate::models::{Task, TaskStatus};
use crate::notify::{NotificationScheduler, Notifier, TerminalBell};
use crate::session::Session;
use crate::status::{key_of, parse_date, parse_time};

#[derive(PartialEq)]
pub enum InputMode {
    Normal,
    Editing,
    Adding,
    Note,
    RangeStart,
    RangeEnd,
    Attach,
    NewCategory,
}

#[derive(Clone, Copy, PartialEq)]
pub enum ViewMode {
    Tasks,
    Schedule,
    Notes,
}

#[derive(PartialEq)]
pub enum Overlay {
    None,
    Details,
    Reminder,
}

/// Fields asked for, in order, by the "Add Task" wizard.
pub const ADD_STEPS: [Field; 8] = [
    Field::Title,
    Field::Date,
    Field::Time,
    Field::Category,
    Field::Client,
    Field::Assignee,
    Field::Contract,
    Field::Comment,
];

/// State for the multi-step "Add Task" wizard.
#[derive(Default)]
pub struct AddState {
    pub form: TaskForm,
    pub step: usize,
}

impl AddState {
    pub fn field(&self) -> Option<Field> {
        ADD_STEPS.get(self.step).copied()
    }

    fn slot(&mut self, field: Field) -> Option<&mut String> {
        let form = &mut self.form;
        match field {
            Field::Title => Some(&mut form.title),
            Field::Date => Some(&mut form.date),
            Field::Time => Some(&mut form.time),
            Field::Category => Some(&mut form.category),
            Field::Client => Some(&mut form.client),
            Field::Assignee => Some(&mut form.assignee),
            Field::Contract => Some(&mut form.contract),
            Field::Comment => Some(&mut form.comment),
            Field::Status => None,
        }
    }
}

/// A reminder whose timer fired. `due_at` tells stale timers apart from
/// current ones after a task was rescheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reminder {
    pub task: Uuid,
    pub due_at: NaiveDateTime,
}

pub struct App {
    pub session: Session,
    pub config: Config,
    pub calendar: CalendarState,
    pub category: CategoryFilter,
    /// Categories added during this run; offered in the picker only.
    pub custom_categories: Vec<String>,
    pub range: DateRange,
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub overlay: Overlay,
    pub edit_field: Field,
    pub input_buffer: String,
    pub target_id: Option<Uuid>,
    pub add_state: AddState,
    pub task_state: TableState,
    pub schedule_state: TableState,
    pub note_state: TableState,
    pub doc_index: usize,
    pub reminders: Vec<Reminder>,
    pub message: Option<String>,
    handle: Handle,
    scheduler: NotificationScheduler,
    fired_tx: UnboundedSender<Reminder>,
    fired_rx: UnboundedReceiver<Reminder>,
}

pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl App {
    /// Creates a new App focused on `start`, with reminders on `handle`.
    pub fn new(config: Config, handle: Handle, start: NaiveDate) -> App {
        let notifier: Arc<dyn Notifier> = Arc::new(TerminalBell::new(config.notifications));
        let scheduler = NotificationScheduler::new(handle.clone(), notifier);
        let (fired_tx, fired_rx) = unbounded_channel();
        App {
            session: Session::new(),
            config,
            calendar: CalendarState::new(start),
            category: CategoryFilter::All,
            custom_categories: Vec::new(),
            range: DateRange::default(),
            view_mode: ViewMode::Tasks,
            input_mode: InputMode::Normal,
            overlay: Overlay::None,
            edit_field: Field::Title,
            input_buffer: String::new(),
            target_id: None,
            add_state: AddState::default(),
            task_state: TableState::default(),
            schedule_state: TableState::default(),
            note_state: TableState::default(),
            doc_index: 0,
            reminders: Vec::new(),
            message: None,
            handle,
            scheduler,
            fired_tx,
            fired_rx,
        }
    }

    /// Tasks listed by the current view, in display order.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        let tasks = self.session.tasks.tasks();
        match self.view_mode {
            ViewMode::Tasks => day_view(tasks, self.calendar.selected, &self.category),
            ViewMode::Schedule => range_view(tasks, &self.range, &self.category),
            ViewMode::Notes => Vec::new(),
        }
    }

    fn current_state(&mut self) -> &mut TableState {
        match self.view_mode {
            ViewMode::Tasks => &mut self.task_state,
            ViewMode::Schedule => &mut self.schedule_state,
            ViewMode::Notes => &mut self.note_state,
        }
    }

    fn current_len(&self) -> usize {
        match self.view_mode {
            ViewMode::Notes => self.session.notes.len(),
            _ => self.visible_tasks().len(),
        }
    }

    pub fn selected_task_id(&self) -> Option<Uuid> {
        let i = match self.view_mode {
            ViewMode::Tasks => self.task_state.selected()?,
            ViewMode::Schedule => self.schedule_state.selected()?,
            ViewMode::Notes => return None,
        };
        self.visible_tasks().get(i).map(|t| t.id)
    }

    /// Keeps the selection inside the current list after it changed.
    pub fn clamp_selection(&mut self) {
        let len = self.current_len();
        let state = self.current_state();
        if len == 0 {
            state.select(None);
        } else {
            match state.selected() {
                Some(i) if i >= len => state.select(Some(len - 1)),
                None => state.select(Some(0)),
                _ => {}
            }
        }
    }

    /// Selects the next item in the current list.
    pub fn next(&mut self) {
        let len = self.current_len();
        if len == 0 { return; }
        let state = self.current_state();
        let i = match state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        state.select(Some(i));
    }

    /// Selects the previous item in the current list.
    pub fn previous(&mut self) {
        let len = self.current_len();
        if len == 0 { return; }
        let state = self.current_state();
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
    }

    pub fn set_view(&mut self, view: ViewMode) {
        self.view_mode = view;
        self.clamp_selection();
    }

    /// Cycles Tasks -> Schedule -> Notes.
    pub fn toggle_view(&mut self) {
        let next = match self.view_mode {
            ViewMode::Tasks => ViewMode::Schedule,
            ViewMode::Schedule => ViewMode::Notes,
            ViewMode::Notes => ViewMode::Tasks,
        };
        self.set_view(next);
    }

    fn after_day_change(&mut self) {
        self.task_state.select(None);
        self.clamp_selection();
    }

    pub fn shift_day(&mut self, days: i64) {
        self.calendar.shift_days(days);
        self.after_day_change();
    }

    pub fn prev_month(&mut self) {
        self.calendar.prev_month();
        self.after_day_change();
    }

    pub fn next_month(&mut self) {
        self.calendar.next_month();
        self.after_day_change();
    }

    pub fn go_today(&mut self) {
        self.calendar.today(now().date());
        self.after_day_change();
    }

    /// Sidebar entries: "All" followed by every category in use.
    pub fn sidebar_categories(&self) -> Vec<CategoryFilter> {
        let mut out = vec![CategoryFilter::All];
        out.extend(categories(self.session.tasks.tasks()).into_iter().map(CategoryFilter::Named));
        out
    }

    pub fn cycle_category(&mut self, forward: bool) {
        let entries = self.sidebar_categories();
        let pos = entries.iter().position(|c| *c == self.category).unwrap_or(0);
        let next = if forward {
            (pos + 1) % entries.len()
        } else {
            (pos + entries.len() - 1) % entries.len()
        };
        self.category = entries[next].clone();
        self.task_state.select(None);
        self.schedule_state.select(None);
        self.clamp_selection();
    }

    /// Categories offered when typing one: configured, custom, then in use.
    pub fn picker_categories(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let in_use = categories(self.session.tasks.tasks());
        for c in self.config.categories.iter().chain(&self.custom_categories).chain(&in_use) {
            if !out.contains(c) {
                out.push(c.clone());
            }
        }
        out
    }

    /// Replaces the input buffer with the next picker category.
    pub fn complete_category(&mut self) {
        let is_category_input = match self.input_mode {
            InputMode::Adding => self.add_state.field() == Some(Field::Category),
            InputMode::Editing => self.edit_field == Field::Category,
            _ => false,
        };
        if !is_category_input { return; }
        let picks = self.picker_categories();
        if picks.is_empty() { return; }
        let next = match picks.iter().position(|c| *c == self.input_buffer) {
            Some(i) => (i + 1) % picks.len(),
            None => 0,
        };
        self.input_buffer = picks[next].clone();
    }

    /// Initiates the "Add Task" wizard for the selected day.
    pub fn start_add(&mut self) {
        self.add_state = AddState::default();
        self.add_state.form.date = key_of(self.calendar.selected);
        self.add_state.form.category = self.config.default_category.clone();
        self.input_mode = InputMode::Adding;
        self.prefill_add_step();
    }

    fn prefill_add_step(&mut self) {
        self.input_buffer = match self.add_state.field() {
            Some(field) => self.add_state.slot(field).map(|s| s.clone()).unwrap_or_default(),
            None => String::new(),
        };
    }

    /// Handles Enter in the "Add Task" wizard.
    fn handle_adding_input(&mut self) {
        let Some(field) = self.add_state.field() else { return; };
        let value = self.input_buffer.trim().to_string();
        let invalid = match field {
            Field::Title if value.is_empty() => Some("Title is required".to_string()),
            Field::Date if !value.is_empty() && parse_date(&value).is_none() => {
                Some(format!("Invalid date '{}'. Use YYYY-MM-DD.", value))
            }
            Field::Time if !value.is_empty() && parse_time(&value).is_none() => {
                Some(format!("Invalid time '{}'. Use HH:MM.", value))
            }
            _ => None,
        };
        if let Some(msg) = invalid {
            self.message = Some(msg);
            return;
        }
        if let Some(slot) = self.add_state.slot(field) {
            *slot = value;
        }
        self.add_state.step += 1;

        if self.add_state.step < ADD_STEPS.len() {
            self.prefill_add_step();
            return;
        }

        // Finish Add
        match cmd_add(&mut self.session, &self.add_state.form) {
            Ok(id) => {
                self.message = Some(format!("Task '{}' added.", self.add_state.form.title.trim()));
                self.schedule_reminder(id);
            }
            Err(e) => self.message = Some(e.to_string()),
        }
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
        self.clamp_selection();
    }

    /// Initiates editing of a specific field for the selected task.
    pub fn start_edit(&mut self, field: Field) {
        let Some(id) = self.selected_task_id() else { return; };
        let Some(t) = self.session.tasks.get(id) else { return; };
        // Pre-fill buffer for editing
        self.input_buffer = match field {
            Field::Title => t.title.clone(),
            Field::Date => t.date.map(key_of).unwrap_or_default(),
            Field::Time => t.time.map(|x| x.format("%H:%M").to_string()).unwrap_or_default(),
            Field::Category => t.category().to_string(),
            Field::Assignee => t.assignee.clone().unwrap_or_default(),
            Field::Client => t.client.clone().unwrap_or_default(),
            Field::Contract => t.contract.clone().unwrap_or_default(),
            Field::Comment => t.comment.clone().unwrap_or_default(),
            Field::Status => t.status.as_str().to_string(),
        };
        self.target_id = Some(id);
        self.edit_field = field;
        self.input_mode = InputMode::Editing;
    }

    /// Handles Enter in the "Edit Task" mode.
    fn handle_editing_input(&mut self) {
        let Some(id) = self.target_id.take() else {
            self.input_mode = InputMode::Normal;
            return;
        };
        match cmd_edit(&mut self.session, id, self.edit_field, &self.input_buffer) {
            Ok(()) => {
                if matches!(self.edit_field, Field::Date | Field::Time | Field::Status) {
                    self.schedule_reminder(id);
                }
            }
            Err(e) => self.message = Some(e.to_string()),
        }
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
        self.clamp_selection();
    }

    /// Handles Enter for every text input mode.
    pub fn handle_input(&mut self) {
        self.message = None;
        match self.input_mode {
            InputMode::Adding => self.handle_adding_input(),
            InputMode::Editing => self.handle_editing_input(),
            InputMode::Note => {
                if cmd_note_add(&mut self.session, &self.input_buffer, now()).is_some() {
                    self.note_state.select(Some(0));
                }
                self.finish_input();
            }
            InputMode::RangeStart | InputMode::RangeEnd => self.handle_range_input(),
            InputMode::Attach => self.handle_attach_input(),
            InputMode::NewCategory => {
                let name = self.input_buffer.trim().to_string();
                if !name.is_empty() && !self.custom_categories.contains(&name) {
                    self.message = Some(format!("Category '{}' available in the picker.", name));
                    self.custom_categories.push(name);
                }
                self.finish_input();
            }
            InputMode::Normal => {}
        }
    }

    pub fn cancel_input(&mut self) {
        self.target_id = None;
        self.finish_input();
    }

    fn finish_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
        self.clamp_selection();
    }

    pub fn toggle_complete_selected(&mut self) {
        let Some(id) = self.selected_task_id() else { return; };
        match cmd_toggle_complete(&mut self.session, id) {
            Ok(TaskStatus::Pending) => self.schedule_reminder(id),
            Ok(_) => {}
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    pub fn delete_selected(&mut self) {
        match self.view_mode {
            ViewMode::Notes => {
                let Some(i) = self.note_state.selected() else { return; };
                if let Some(id) = self.session.notes.notes().get(i).map(|n| n.id) {
                    cmd_note_remove(&mut self.session, id);
                }
            }
            _ => {
                let Some(id) = self.selected_task_id() else { return; };
                if let Err(e) = cmd_remove(&mut self.session, id) {
                    self.message = Some(e.to_string());
                }
                self.reminders.retain(|r| r.task != id);
            }
        }
        self.clamp_selection();
    }

    pub fn start_note(&mut self) {
        self.input_buffer.clear();
        self.input_mode = InputMode::Note;
    }

    pub fn start_range(&mut self, end: bool) {
        let current = if end { self.range.end } else { self.range.start };
        self.input_buffer = current.map(key_of).unwrap_or_default();
        self.input_mode = if end { InputMode::RangeEnd } else { InputMode::RangeStart };
    }

    fn handle_range_input(&mut self) {
        let value = self.input_buffer.trim().to_string();
        let bound = if value.is_empty() {
            None
        } else {
            match parse_date(&value) {
                Some(d) => Some(d),
                None => {
                    self.message = Some(format!("Invalid date '{}'. Use YYYY-MM-DD.", value));
                    return;
                }
            }
        };
        if self.input_mode == InputMode::RangeEnd {
            self.range.end = bound;
        } else {
            self.range.start = bound;
        }
        self.schedule_state.select(None);
        self.finish_input();
    }

    pub fn clear_range(&mut self) {
        self.range = DateRange::default();
        self.clamp_selection();
    }

    /// Shows the selected schedule entry's day in the calendar.
    pub fn jump_to_selected(&mut self) {
        let Some(id) = self.selected_task_id() else { return; };
        let Some(date) = self.session.tasks.get(id).and_then(|t| t.date) else { return; };
        self.calendar.selected = date;
        self.set_view(ViewMode::Tasks);
        let pos = self.visible_tasks().iter().position(|t| t.id == id);
        self.task_state.select(pos);
    }

    pub fn start_attach(&mut self) {
        let Some(id) = self.selected_task_id() else { return; };
        self.target_id = Some(id);
        self.input_buffer.clear();
        self.input_mode = InputMode::Attach;
    }

    /// Reads the comma-separated paths concurrently and attaches what is accepted.
    fn handle_attach_input(&mut self) {
        let Some(id) = self.target_id.take() else {
            self.finish_input();
            return;
        };
        let paths: Vec<PathBuf> = self
            .input_buffer
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .collect();
        let requested = paths.len();
        let uploads = self.handle.block_on(read_uploads(paths));
        let attached = cmd_attach(&mut self.session, id, uploads);
        self.message = Some(format!("{} of {} file(s) attached.", attached, requested));
        self.finish_input();
    }

    pub fn start_new_category(&mut self) {
        self.input_buffer.clear();
        self.input_mode = InputMode::NewCategory;
    }

    pub fn open_details(&mut self) {
        if let Some(id) = self.selected_task_id() {
            self.target_id = Some(id);
            self.doc_index = 0;
            self.overlay = Overlay::Details;
        }
    }

    pub fn close_overlay(&mut self) {
        self.target_id = None;
        self.overlay = if self.reminders.is_empty() { Overlay::None } else { Overlay::Reminder };
    }

    /// Task shown in the details overlay.
    pub fn detail_task(&self) -> Option<&Task> {
        self.session.tasks.get(self.target_id?)
    }

    pub fn next_document(&mut self) {
        let count = self.detail_task().map(|t| t.documents.len()).unwrap_or(0);
        if count > 0 {
            self.doc_index = (self.doc_index + 1) % count;
        }
    }

    fn selected_document(&self) -> Option<(Uuid, Uuid)> {
        let task = self.detail_task()?;
        let doc = task.documents.get(self.doc_index)?;
        Some((task.id, doc.id))
    }

    pub fn detach_document(&mut self) {
        let Some((task, doc)) = self.selected_document() else { return; };
        match cmd_detach(&mut self.session, task, doc) {
            Ok(_) => self.doc_index = 0,
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    /// Writes the selected document into the working directory.
    pub fn export_document(&mut self) {
        let Some((task, doc)) = self.selected_document() else { return; };
        self.message = Some(match cmd_export_document(&self.session, task, doc, &PathBuf::from(".")) {
            Ok(path) => format!("Saved {}", path.display()),
            Err(e) => e.to_string(),
        });
    }

    /// Start of the selected document's data-URL, for the details overlay.
    pub fn selected_document_preview(&self, max_chars: usize) -> Option<String> {
        let task = self.detail_task()?;
        let doc = task.documents.get(self.doc_index)?;
        self.session.blobs.data_url_preview(&doc.blob, max_chars)
    }

    /// Arms a reminder for a pending task with a date and a time.
    fn schedule_reminder(&mut self, id: Uuid) {
        let Some(task) = self.session.tasks.get(id) else { return; };
        if task.status != TaskStatus::Pending { return; }
        let Some(due_at) = task.due_at() else { return; };
        let tx = self.fired_tx.clone();
        let reminder = Reminder { task: id, due_at };
        let title = task.title.clone();
        self.scheduler.schedule(title, due_at, now(), move || {
            let _ = tx.send(reminder);
        });
    }

    /// Collects fired reminders that still match their task.
    pub fn drain_reminders(&mut self) {
        while let Ok(r) = self.fired_rx.try_recv() {
            let current = self
                .session
                .tasks
                .get(r.task)
                .is_some_and(|t| t.status == TaskStatus::Pending && t.due_at() == Some(r.due_at));
            if !current || self.reminders.contains(&r) {
                debug!(task = %r.task, "dropping stale reminder");
                continue;
            }
            self.reminders.push(r);
        }
        if !self.reminders.is_empty() && self.overlay == Overlay::None && self.input_mode == InputMode::Normal {
            self.overlay = Overlay::Reminder;
        }
    }

    pub fn active_reminder(&self) -> Option<&Task> {
        self.session.tasks.get(self.reminders.first()?.task)
    }

    /// "Mark as completed" on the reminder prompt.
    pub fn reminder_complete(&mut self) {
        if self.reminders.is_empty() { return; }
        let r = self.reminders.remove(0);
        if let Err(e) = cmd_complete(&mut self.session, r.task) {
            self.message = Some(e.to_string());
        }
        self.close_overlay();
    }

    /// "Later" on the reminder prompt.
    pub fn reminder_later(&mut self) {
        if !self.reminders.is_empty() {
            self.reminders.remove(0);
        }
        self.close_overlay();
    }

    pub fn pending_reminders(&self) -> usize {
        self.scheduler.pending()
    }
}
