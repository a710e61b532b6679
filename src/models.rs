use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blobs::BlobKey;

/// Category shown for tasks that were created without one.
pub const DEFAULT_CATEGORY: &str = "Général";

/// Stored lifecycle state of a task.
///
/// `Overdue` is intentionally absent: it is derived from the due date-time at
/// render time (see [`crate::status::DisplayStatus`]).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "completed" | "done" => Some(Self::Completed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// A document attached to a task.
///
/// The bytes live in the [`crate::blobs::BlobStore`]; the task only keeps a
/// reference and the metadata needed to list it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: Uuid,
    /// Original file name.
    pub name: String,
    pub blob: BlobKey,
    /// MIME type, e.g. `application/pdf` or `image/png`.
    pub mime_type: String,
}

/// A document as supplied by a caller, before the store settles its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentDraft {
    /// Existing identity, if the document was already attached.
    pub id: Option<Uuid>,
    pub name: String,
    pub blob: BlobKey,
    pub mime_type: String,
}

impl DocumentDraft {
    pub fn new(name: impl Into<String>, blob: BlobKey, mime_type: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            blob,
            mime_type: mime_type.into(),
        }
    }
}

impl From<Document> for DocumentDraft {
    fn from(doc: Document) -> Self {
        Self {
            id: Some(doc.id),
            name: doc.name,
            blob: doc.blob,
            mime_type: doc.mime_type,
        }
    }
}

/// Represents a single task in the task manager.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Unique identifier, assigned by the store.
    pub id: Uuid,
    pub title: String,
    /// Calendar day of the task, if scheduled.
    pub date: Option<NaiveDate>,
    /// Time of day; only meaningful together with `date`.
    pub time: Option<NaiveTime>,
    pub status: TaskStatus,
    /// Free-text label. `None` reads as [`DEFAULT_CATEGORY`].
    pub category: Option<String>,
    pub assignee: Option<String>,
    pub client: Option<String>,
    pub contract: Option<String>,
    pub comment: Option<String>,
    #[serde(default)]
    pub documents: Vec<Document>,
}

impl Task {
    /// Effective category of the task.
    pub fn category(&self) -> &str {
        match self.category.as_deref() {
            Some(c) if !c.trim().is_empty() => c,
            _ => DEFAULT_CATEGORY,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Date and time combined, when both are set.
    pub fn due_at(&self) -> Option<NaiveDateTime> {
        Some(self.date?.and_time(self.time?))
    }
}

/// Fields supplied when creating a task. Identity, completion and status are
/// assigned by the store.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub category: Option<String>,
    pub assignee: Option<String>,
    pub client: Option<String>,
    pub contract: Option<String>,
    pub comment: Option<String>,
    pub documents: Vec<DocumentDraft>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Partial update of a task. Fields left at `None` are not touched; the inner
/// `Option` of clearable fields distinguishes "clear" from "leave alone".
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub date: Option<Option<NaiveDate>>,
    pub time: Option<Option<NaiveTime>>,
    pub status: Option<TaskStatus>,
    pub category: Option<Option<String>>,
    pub assignee: Option<Option<String>>,
    pub client: Option<Option<String>>,
    pub contract: Option<Option<String>>,
    pub comment: Option<Option<String>>,
    pub documents: Option<Vec<DocumentDraft>>,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.status.is_none()
            && self.category.is_none()
            && self.assignee.is_none()
            && self.client.is_none()
            && self.contract.is_none()
            && self.comment.is_none()
            && self.documents.is_none()
    }
}

/// A freeform note from the notes pane.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: Uuid,
    pub content: String,
    /// Timestamp when the note was taken.
    pub created_at: NaiveDateTime,
}
