use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;

use chrono::NaiveDateTime;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use tracing::{info, warn};
use uuid::Uuid;

use crate::blobs::Upload;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::filter::sort_chronologically;
use crate::models::{DocumentDraft, NewTask, TaskPatch, TaskStatus};
use crate::session::Session;
use crate::status::{display_status, parse_date, parse_time, DisplayStatus};

/// Raw text of the "add task" form, as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct TaskForm {
    pub title: String,
    pub date: String,
    pub time: String,
    pub category: String,
    pub assignee: String,
    pub client: String,
    pub contract: String,
    pub comment: String,
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() { None } else { Some(s.to_string()) }
}

impl TaskForm {
    /// Validates the form. The title is required; date and time must parse
    /// when given.
    pub fn parse(&self) -> Result<NewTask> {
        let title = non_empty(&self.title).ok_or(Error::EmptyTitle)?;
        let date = match non_empty(&self.date) {
            Some(d) => Some(parse_date(&d).ok_or(Error::InvalidDate(d))?),
            None => None,
        };
        let time = match non_empty(&self.time) {
            Some(t) => Some(parse_time(&t).ok_or(Error::InvalidTime(t))?),
            None => None,
        };
        Ok(NewTask {
            title,
            date,
            time,
            category: non_empty(&self.category),
            assignee: non_empty(&self.assignee),
            client: non_empty(&self.client),
            contract: non_empty(&self.contract),
            comment: non_empty(&self.comment),
            documents: Vec::new(),
        })
    }
}

/// A single editable field of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Date,
    Time,
    Category,
    Assignee,
    Client,
    Contract,
    Comment,
    Status,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Date => "Date (YYYY-MM-DD)",
            Self::Time => "Time (HH:MM)",
            Self::Category => "Category",
            Self::Assignee => "Assignee",
            Self::Client => "Client",
            Self::Contract => "Contract",
            Self::Comment => "Comment",
            Self::Status => "Status (pending/completed/cancelled)",
        }
    }

    /// Builds the patch for setting this field to `value`. Empty input clears
    /// optional fields.
    pub fn patch(&self, value: &str) -> Result<TaskPatch> {
        let mut patch = TaskPatch::default();
        match self {
            Self::Title => patch.title = Some(non_empty(value).ok_or(Error::EmptyTitle)?),
            Self::Date => {
                patch.date = Some(match non_empty(value) {
                    Some(d) => Some(parse_date(&d).ok_or(Error::InvalidDate(d))?),
                    None => None,
                })
            }
            Self::Time => {
                patch.time = Some(match non_empty(value) {
                    Some(t) => Some(parse_time(&t).ok_or(Error::InvalidTime(t))?),
                    None => None,
                })
            }
            Self::Category => patch.category = Some(non_empty(value)),
            Self::Assignee => patch.assignee = Some(non_empty(value)),
            Self::Client => patch.client = Some(non_empty(value)),
            Self::Contract => patch.contract = Some(non_empty(value)),
            Self::Comment => patch.comment = Some(non_empty(value)),
            Self::Status => match TaskStatus::parse(value) {
                Some(status) => patch.status = Some(status),
                None => {
                    warn!(value, "rejected unknown status");
                    return Err(Error::InvalidStatus(value.trim().to_string()));
                }
            },
        }
        Ok(patch)
    }
}

/// Adds a new task from the form.
pub fn cmd_add(session: &mut Session, form: &TaskForm) -> Result<Uuid> {
    let fields = form.parse()?;
    Ok(session.tasks.create(fields))
}

/// Sets one field of a task from user input.
pub fn cmd_edit(session: &mut Session, id: Uuid, field: Field, value: &str) -> Result<()> {
    let patch = field.patch(value)?;
    if session.tasks.update(id, patch) {
        Ok(())
    } else {
        Err(Error::TaskNotFound(id))
    }
}

/// Flips a task between completed and pending.
pub fn cmd_toggle_complete(session: &mut Session, id: Uuid) -> Result<TaskStatus> {
    let task = session.tasks.get(id).ok_or(Error::TaskNotFound(id))?;
    let status = if task.is_completed() { TaskStatus::Pending } else { TaskStatus::Completed };
    session.tasks.update(id, TaskPatch::status(status));
    Ok(status)
}

/// Marks a task as completed, e.g. from a reminder.
pub fn cmd_complete(session: &mut Session, id: Uuid) -> Result<()> {
    if session.tasks.update(id, TaskPatch::status(TaskStatus::Completed)) {
        Ok(())
    } else {
        Err(Error::TaskNotFound(id))
    }
}

/// Removes a task and the blobs only it referenced.
pub fn cmd_remove(session: &mut Session, id: Uuid) -> Result<()> {
    if !session.tasks.delete(id) {
        return Err(Error::TaskNotFound(id));
    }
    session.collect_garbage();
    Ok(())
}

/// Stores uploads and appends them to the task, one by one.
///
/// Returns how many were attached; zero if the task is gone.
pub fn cmd_attach(session: &mut Session, id: Uuid, uploads: Vec<Upload>) -> usize {
    let mut attached = 0;
    for upload in uploads {
        let blob = session.blobs.put(&upload.mime_type, upload.bytes);
        let draft = DocumentDraft::new(upload.name, blob, upload.mime_type);
        if session.tasks.append_document(id, draft).is_some() {
            attached += 1;
        }
    }
    session.collect_garbage();
    attached
}

/// Removes one document from a task. Remaining documents keep their ids.
pub fn cmd_detach(session: &mut Session, id: Uuid, document: Uuid) -> Result<bool> {
    let task = session.tasks.get(id).ok_or(Error::TaskNotFound(id))?;
    let before = task.documents.len();
    let kept: Vec<DocumentDraft> = task
        .documents
        .iter()
        .filter(|d| d.id != document)
        .cloned()
        .map(DocumentDraft::from)
        .collect();
    if kept.len() == before {
        return Ok(false);
    }
    session.tasks.update(id, TaskPatch { documents: Some(kept), ..Default::default() });
    session.collect_garbage();
    Ok(true)
}

/// Writes a task's document into `dir` and returns the written path.
///
/// An existing file of the same name is left alone and reported as
/// [`Error::FileExists`].
pub fn cmd_export_document(session: &Session, id: Uuid, document: Uuid, dir: &Path) -> Result<std::path::PathBuf> {
    let task = session.tasks.get(id).ok_or(Error::TaskNotFound(id))?;
    let doc = task
        .documents
        .iter()
        .find(|d| d.id == document)
        .ok_or(Error::DocumentNotFound(document))?;
    let blob = session.blobs.get(&doc.blob).ok_or(Error::DocumentNotFound(document))?;
    let path = dir.join(&doc.name);
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => Error::FileExists(path.clone()),
            _ => Error::Io(e),
        })?;
    file.write_all(&blob.bytes)?;
    info!(path = %path.display(), "document exported");
    Ok(path)
}

/// Takes a note at `now`. Blank notes are ignored.
pub fn cmd_note_add(session: &mut Session, content: &str, now: NaiveDateTime) -> Option<Uuid> {
    session.notes.add(content, now)
}

pub fn cmd_note_remove(session: &mut Session, id: Uuid) -> bool {
    session.notes.delete(id)
}

/// Prints the session's tasks in a table, chronologically.
pub fn print_summary(session: &Session, now: NaiveDateTime) {
    let mut tasks: Vec<_> = session.tasks.tasks().iter().collect();
    if tasks.is_empty() {
        println!("No tasks in this session.");
        return;
    }
    sort_chronologically(&mut tasks);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Title").add_attribute(Attribute::Bold),
            Cell::new("Category").add_attribute(Attribute::Bold),
            Cell::new("Date").add_attribute(Attribute::Bold),
            Cell::new("Time").add_attribute(Attribute::Bold),
            Cell::new("Client").add_attribute(Attribute::Bold),
            Cell::new("Docs").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    for t in tasks {
        let status = display_status(t, now);
        let status_color = match status {
            DisplayStatus::Completed => Color::Green,
            DisplayStatus::Overdue => Color::Red,
            DisplayStatus::Cancelled => Color::Grey,
            DisplayStatus::Pending => Color::Yellow,
        };
        table.add_row(vec![
            Cell::new(&t.title),
            Cell::new(t.category()),
            Cell::new(t.date.map(|d| d.to_string()).unwrap_or_else(|| "-".into())),
            Cell::new(t.time.map(|d| d.format("%H:%M").to_string()).unwrap_or_default()),
            Cell::new(t.client.clone().unwrap_or_default()),
            Cell::new(t.documents.len()),
            Cell::new(status.label()).fg(status_color),
        ]);
    }

    println!("{table}");
    println!("{} note(s) taken.", session.notes.len());
}

/// Prints the effective configuration.
pub fn print_config(config: &Config, path: &Path) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Setting", "Value"]);
    table.add_row(vec!["config file".to_string(), path.display().to_string()]);
    table.add_row(vec!["default_category".to_string(), config.default_category.clone()]);
    table.add_row(vec!["categories".to_string(), config.categories.join(", ")]);
    table.add_row(vec!["week_start".to_string(), format!("{:?}", config.week_start).to_lowercase()]);
    table.add_row(vec!["notifications".to_string(), config.notifications.to_string()]);
    table.add_row(vec!["log_level".to_string(), config.log_level.clone()]);
    table.add_row(vec!["log_dir".to_string(), config.log_dir().display().to_string()]);
    println!("{table}");
}
