use std::collections::HashSet;

use chrono::NaiveDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{Document, DocumentDraft, NewTask, Note, Task, TaskPatch, TaskStatus};

/// Ordered, in-memory collection of tasks.
///
/// Insertion order is preserved. Every operation is total: an unknown id is a
/// logged no-op, never an error.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a task and appends it. Returns the new id.
    ///
    /// Every supplied document receives a fresh id, whatever it carried.
    pub fn create(&mut self, fields: NewTask) -> Uuid {
        let id = Uuid::new_v4();
        let documents = fields
            .documents
            .into_iter()
            .map(|d| Document {
                id: Uuid::new_v4(),
                name: d.name,
                blob: d.blob,
                mime_type: d.mime_type,
            })
            .collect();
        let task = Task {
            id,
            title: fields.title,
            date: fields.date,
            time: fields.time,
            status: TaskStatus::Pending,
            category: fields.category,
            assignee: fields.assignee,
            client: fields.client,
            contract: fields.contract,
            comment: fields.comment,
            documents,
        };
        info!(task = %id, title = %task.title, "task created");
        self.tasks.push(task);
        id
    }

    /// Merges `patch` onto the task with `id`. Returns `false` if no such task.
    pub fn update(&mut self, id: Uuid, patch: TaskPatch) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            debug!(task = %id, "update ignored, task not found");
            return false;
        };
        if patch.is_empty() {
            return true;
        }

        if let Some(title) = patch.title { task.title = title; }
        if let Some(date) = patch.date { task.date = date; }
        if let Some(time) = patch.time { task.time = time; }
        if let Some(status) = patch.status { task.status = status; }
        if let Some(category) = patch.category { task.category = category; }
        if let Some(assignee) = patch.assignee { task.assignee = assignee; }
        if let Some(client) = patch.client { task.client = client; }
        if let Some(contract) = patch.contract { task.contract = contract; }
        if let Some(comment) = patch.comment { task.comment = comment; }
        if let Some(drafts) = patch.documents {
            task.documents = settle_documents(drafts);
        }
        info!(task = %id, "task updated");
        true
    }

    /// Appends a single document to a task, leaving its siblings alone.
    ///
    /// Returns the document id, or `None` when the task no longer exists.
    pub fn append_document(&mut self, id: Uuid, draft: DocumentDraft) -> Option<Uuid> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            debug!(task = %id, document = %draft.name, "dropping document for missing task");
            return None;
        };
        let doc_id = match draft.id {
            Some(existing) if !task.documents.iter().any(|d| d.id == existing) => existing,
            _ => Uuid::new_v4(),
        };
        task.documents.push(Document {
            id: doc_id,
            name: draft.name,
            blob: draft.blob,
            mime_type: draft.mime_type,
        });
        info!(task = %id, document = %doc_id, "document attached");
        Some(doc_id)
    }

    /// Removes the task with `id`. Returns `false` if it was not there.
    pub fn delete(&mut self, id: Uuid) -> bool {
        let len_before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == len_before {
            debug!(task = %id, "delete ignored, task not found");
            false
        } else {
            info!(task = %id, "task deleted");
            true
        }
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Gives ids to drafts that lack one and keeps ids unique within the list.
fn settle_documents(drafts: Vec<DocumentDraft>) -> Vec<Document> {
    let mut seen = HashSet::new();
    drafts
        .into_iter()
        .map(|d| {
            let id = match d.id {
                Some(id) if seen.insert(id) => id,
                Some(dup) => {
                    debug!(document = %dup, "duplicate document id, assigning a new one");
                    let fresh = Uuid::new_v4();
                    seen.insert(fresh);
                    fresh
                }
                None => {
                    let fresh = Uuid::new_v4();
                    seen.insert(fresh);
                    fresh
                }
            };
            Document {
                id,
                name: d.name,
                blob: d.blob,
                mime_type: d.mime_type,
            }
        })
        .collect()
}

/// Notes from the notes pane, newest first.
#[derive(Debug, Default)]
pub struct NoteBook {
    notes: Vec<Note>,
}

impl NoteBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a note taken at `now`. Blank content is ignored.
    pub fn add(&mut self, content: impl Into<String>, now: NaiveDateTime) -> Option<Uuid> {
        let content = content.into();
        if content.trim().is_empty() {
            debug!("ignoring blank note");
            return None;
        }
        let id = Uuid::new_v4();
        self.notes.insert(0, Note { id, content, created_at: now });
        info!(note = %id, "note added");
        Some(id)
    }

    pub fn delete(&mut self, id: Uuid) -> bool {
        let len_before = self.notes.len();
        self.notes.retain(|n| n.id != id);
        let removed = self.notes.len() != len_before;
        if !removed {
            debug!(note = %id, "delete ignored, note not found");
        }
        removed
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}
