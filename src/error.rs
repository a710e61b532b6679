use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised at the fallible edges of the application.
///
/// The core (store, filters, calendar) never returns these: it is total over
/// well-formed input and reports no-ops through logging instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid date '{0}', use YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid time '{0}', use HH:MM")]
    InvalidTime(String),

    #[error("invalid status '{0}', use pending, completed or cancelled")]
    InvalidStatus(String),

    #[error("task title must not be empty")]
    EmptyTitle,

    #[error("task {0} not found")]
    TaskNotFound(Uuid),

    #[error("document {0} not found")]
    DocumentNotFound(Uuid),

    #[error("{0} already exists")]
    FileExists(PathBuf),

    #[error("unsupported shell '{0}'")]
    UnsupportedShell(String),

    #[error("async runtime error: {0}")]
    Runtime(String),
}

pub type Result<T> = std::result::Result<T, Error>;
