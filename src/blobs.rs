//! External storage for attached document bytes.
//!
//! Tasks never inline file content. An upload is put into the [`BlobStore`],
//! which hands back a content-derived [`BlobKey`]; the task's
//! [`Document`](crate::models::Document) keeps only that key plus metadata.
//! A self-contained data-URL can still be rendered on demand.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::Task;

/// Namespace for content-derived blob keys.
const BLOB_NAMESPACE: Uuid = Uuid::from_bytes([
    0x6b, 0x1f, 0x3a, 0x52, 0x9e, 0x0c, 0x4d, 0x2a, 0x8f, 0x61, 0x0d, 0x7e, 0x55, 0xc4, 0x19, 0xa3,
]);

/// Reference to a blob. Equal content (and MIME type) yields an equal key.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct BlobKey(pub Uuid);

impl BlobKey {
    fn for_content(mime_type: &str, bytes: &[u8]) -> Self {
        let mut name = Vec::with_capacity(mime_type.len() + 1 + bytes.len());
        name.extend_from_slice(mime_type.as_bytes());
        name.push(0);
        name.extend_from_slice(bytes);
        BlobKey(Uuid::new_v5(&BLOB_NAMESPACE, &name))
    }
}

impl std::fmt::Display for BlobKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// In-memory, content-addressed blob storage.
#[derive(Debug, Default)]
pub struct BlobStore {
    blobs: HashMap<BlobKey, Blob>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `bytes` and returns their key. Storing the same content twice
    /// keeps a single copy.
    pub fn put(&mut self, mime_type: &str, bytes: Vec<u8>) -> BlobKey {
        let key = BlobKey::for_content(mime_type, &bytes);
        self.blobs.entry(key).or_insert_with(|| Blob {
            mime_type: mime_type.to_string(),
            bytes,
        });
        key
    }

    pub fn get(&self, key: &BlobKey) -> Option<&Blob> {
        self.blobs.get(key)
    }

    /// Renders a blob as a `data:<mime>;base64,<payload>` URL.
    pub fn data_url(&self, key: &BlobKey) -> Option<String> {
        let blob = self.blobs.get(key)?;
        Some(format!("data:{};base64,{}", blob.mime_type, STANDARD.encode(&blob.bytes)))
    }

    /// Like [`BlobStore::data_url`], but encodes only enough leading bytes for
    /// a payload of about `max_chars` characters.
    pub fn data_url_preview(&self, key: &BlobKey, max_chars: usize) -> Option<String> {
        let blob = self.blobs.get(key)?;
        let head = &blob.bytes[..blob.bytes.len().min(max_chars * 3 / 4)];
        Some(format!("data:{};base64,{}", blob.mime_type, STANDARD.encode(head)))
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    /// Drops blobs no longer referenced by any task. Returns how many were removed.
    pub fn retain_referenced<'a>(&mut self, tasks: impl IntoIterator<Item = &'a Task>) -> usize {
        let live: HashSet<BlobKey> = tasks
            .into_iter()
            .flat_map(|t| t.documents.iter().map(|d| d.blob))
            .collect();
        let before = self.blobs.len();
        self.blobs.retain(|k, _| live.contains(k));
        before - self.blobs.len()
    }
}

/// Only PDFs and images may be attached.
pub fn is_accepted(mime_type: &str) -> bool {
    mime_type == "application/pdf" || mime_type.starts_with("image/")
}

/// Guesses a MIME type from the file extension.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    let mime = match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "tif" | "tiff" => "image/tiff",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "zip" => "application/zip",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => return None,
    };
    Some(mime)
}

/// A file read from disk and ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Reads one file if its type is accepted.
///
/// Returns `Ok(None)` for unsupported types; those are skipped without
/// surfacing an error.
pub async fn read_upload(path: &Path) -> crate::error::Result<Option<Upload>> {
    let mime_type = match mime_for_path(path) {
        Some(m) if is_accepted(m) => m,
        other => {
            debug!(path = %path.display(), mime = ?other, "ignoring unsupported upload");
            return Ok(None);
        }
    };
    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(Some(Upload {
        name,
        mime_type: mime_type.to_string(),
        bytes,
    }))
}

/// Reads several files concurrently.
///
/// Results come back in completion order. Unsupported or unreadable files are
/// left out (unreadable ones are logged).
pub async fn read_uploads(paths: Vec<PathBuf>) -> Vec<Upload> {
    let mut set = JoinSet::new();
    for path in paths {
        set.spawn(async move {
            let res = read_upload(&path).await;
            (path, res)
        });
    }

    let mut uploads = Vec::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((_, Ok(Some(upload)))) => uploads.push(upload),
            Ok((_, Ok(None))) => {}
            Ok((path, Err(e))) => warn!(path = %path.display(), error = %e, "failed to read upload"),
            Err(e) => warn!(error = %e, "upload task aborted"),
        }
    }
    uploads
}
