use crate::blobs::BlobStore;
use crate::store::{NoteBook, TaskStore};

/// Everything the user works on during one run of the program.
///
/// Nothing here outlives the process.
#[derive(Debug, Default)]
pub struct Session {
    pub tasks: TaskStore,
    pub notes: NoteBook,
    pub blobs: BlobStore,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops blobs that no task references any more.
    pub fn collect_garbage(&mut self) -> usize {
        self.blobs.retain_referenced(self.tasks.tasks())
    }
}
