//! Storage contract, error taxonomy, and the local filesystem engine.

/// Backup-then-write file replacement.
pub(crate) mod backup;
/// Notebook index construction, loading, and persistence.
pub mod index;
/// Deterministic on-disk path computation.
pub mod layout;
/// Filesystem-backed storage engine.
pub mod local;

use std::path::PathBuf;

use hashbrown::HashMap;
use thiserror::Error;

use crate::note::{Note, NoteSummary, NotebookMeta};
use crate::types::NoteId;

/// Mapping from note id to summary, one per notebook.
pub type NotebookIndex = HashMap<NoteId, NoteSummary>;

/// Errors surfaced by storage and cache operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The named notebook has no directory or no loaded index.
    #[error("notebook {0:?} not found")]
    NotebookNotFound(String),
    /// The note id has no entry in the current notebook.
    #[error("note {0} not found")]
    NoteNotFound(NoteId),
    /// A path expected to be a directory is a regular file.
    #[error("{0:?} exists, but is not a directory")]
    NotADirectory(PathBuf),
    /// Non-recursive removal was asked of a notebook that still holds notes.
    #[error("notebook {0:?} still contains notes")]
    NotebookNotEmpty(String),
    /// The currently selected notebook cannot be removed.
    #[error("notebook {0:?} is currently selected")]
    NotebookSelected(String),
    /// Notebook name is empty, hidden, or contains a path separator.
    #[error("invalid notebook name {0:?}")]
    InvalidName(String),
    /// A freshly allocated note id collided with an existing note.
    #[error("note id {0} already allocated")]
    DuplicateId(NoteId),
    /// A persisted file failed to encode or decode.
    #[error("{context}: {source}")]
    Corrupt {
        /// Operation being performed.
        context: String,
        /// Underlying serde failure.
        #[source]
        source: serde_json::Error,
    },
    /// A filesystem operation failed.
    #[error("{context}: {source}")]
    Io {
        /// Operation being performed.
        context: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// Restoring a backup after a failed write also failed; the original
    /// file may be missing on disk.
    #[error("restore {path:?} from backup: {source}")]
    RestoreFailed {
        /// File that could not be restored.
        path: PathBuf,
        /// Underlying I/O failure of the restore rename.
        #[source]
        source: std::io::Error,
    },
    /// A cache forwarded a miss to the wrapped store and the fetch failed.
    #[error("cache miss: {0}")]
    CacheMiss(#[source] Box<StoreError>),
    /// `flush` was called on a cache that holds no state.
    #[error("noop cache: nothing to flush")]
    NothingToFlush,
}

impl StoreError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn corrupt(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Corrupt {
            context: context.into(),
            source,
        }
    }

    /// True for recoverable missing-file or missing-entry conditions, the
    /// ones a caller may answer with a rebuild or an explicit create.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotebookNotFound(_) | Self::NoteNotFound(_) => true,
            Self::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            Self::CacheMiss(inner) => inner.is_not_found(),
            _ => false,
        }
    }
}

/// Result alias for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Contract shared by the local engine and any cache wrapped around it.
///
/// Mutating operations are serialized by the implementation; reads may run
/// concurrently where the implementation documents it.
pub trait NoteStore {
    /// Reads the current notebook's metadata file.
    fn get_meta(&self) -> StoreResult<NotebookMeta>;
    /// Persists the current notebook's metadata with the backup-then-write
    /// protocol.
    fn save_meta(&self, meta: &NotebookMeta) -> StoreResult<()>;

    /// Creates a notebook directory with fresh metadata and an empty index.
    fn create_notebook(&self, name: &str) -> StoreResult<()>;
    /// Returns the currently selected notebook name.
    fn get_notebook(&self) -> String;
    /// Selects `name` after validating its directory exists.
    fn set_notebook(&self, name: &str) -> StoreResult<()>;
    /// Renames a notebook directory and relocates its in-memory index.
    fn rename_notebook(&self, old: &str, new: &str) -> StoreResult<()>;
    /// Removes a notebook; non-recursive removal requires it to hold no
    /// notes.
    fn remove_notebook(&self, name: &str, recursive: bool) -> StoreResult<()>;
    /// Returns the names of all known notebooks, in no particular order.
    fn list_notebooks(&self) -> Vec<String>;

    /// Looks up one summary in the current notebook's index.
    fn get_note_summary(&self, id: NoteId) -> StoreResult<NoteSummary>;
    /// Returns a copy of the current notebook's full index.
    fn get_all_note_summaries(&self) -> StoreResult<NotebookIndex>;
    /// Opens and decodes a note file. Does not consult the index.
    fn get_note(&self, id: NoteId) -> StoreResult<Note>;
    /// Writes a note file, then updates and persists the index.
    fn save_note(&self, note: &Note) -> StoreResult<()>;
    /// Deletes a note file, then updates and persists the index.
    fn remove_note(&self, id: NoteId) -> StoreResult<()>;
}

/// Shared handles forward to the underlying store.
impl<S: NoteStore + ?Sized> NoteStore for std::sync::Arc<S> {
    fn get_meta(&self) -> StoreResult<NotebookMeta> {
        (**self).get_meta()
    }

    fn save_meta(&self, meta: &NotebookMeta) -> StoreResult<()> {
        (**self).save_meta(meta)
    }

    fn create_notebook(&self, name: &str) -> StoreResult<()> {
        (**self).create_notebook(name)
    }

    fn get_notebook(&self) -> String {
        (**self).get_notebook()
    }

    fn set_notebook(&self, name: &str) -> StoreResult<()> {
        (**self).set_notebook(name)
    }

    fn rename_notebook(&self, old: &str, new: &str) -> StoreResult<()> {
        (**self).rename_notebook(old, new)
    }

    fn remove_notebook(&self, name: &str, recursive: bool) -> StoreResult<()> {
        (**self).remove_notebook(name, recursive)
    }

    fn list_notebooks(&self) -> Vec<String> {
        (**self).list_notebooks()
    }

    fn get_note_summary(&self, id: NoteId) -> StoreResult<NoteSummary> {
        (**self).get_note_summary(id)
    }

    fn get_all_note_summaries(&self) -> StoreResult<NotebookIndex> {
        (**self).get_all_note_summaries()
    }

    fn get_note(&self, id: NoteId) -> StoreResult<Note> {
        (**self).get_note(id)
    }

    fn save_note(&self, note: &Note) -> StoreResult<()> {
        (**self).save_note(note)
    }

    fn remove_note(&self, id: NoteId) -> StoreResult<()> {
        (**self).remove_note(id)
    }
}
