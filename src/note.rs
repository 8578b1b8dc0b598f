//! Note domain records: summaries, bodies, edit history, notebook metadata.

use serde::{Deserialize, Serialize};

use crate::types::{NOT_DELETED, NoteId, TimestampMs};

/// Maximum number of edit records retained per note. Older entries are
/// dropped first.
pub const MAX_EDIT_HISTORY: usize = 64;

/// One applied edit: when it happened and how large the body was afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRecord {
    /// Edit timestamp in milliseconds since epoch.
    pub updated_at_ms: TimestampMs,
    /// Body size in bytes after the edit.
    pub size_bytes: u64,
}

/// Lightweight per-note metadata kept in the notebook index so that listing
/// commands never have to open note files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSummary {
    /// Stable note identifier, assigned as latest id + 1 and never reused.
    pub id: NoteId,
    /// Display title.
    pub title: String,
    /// Creation timestamp in milliseconds since epoch.
    pub created_at_ms: TimestampMs,
    /// Soft-deletion timestamp; [`NOT_DELETED`] while the note is live.
    pub deleted_at_ms: TimestampMs,
    /// Bounded history of applied edits, oldest first.
    pub history: Vec<EditRecord>,
}

impl NoteSummary {
    /// True when the note has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at_ms != NOT_DELETED
    }
}

/// Full note: summary plus body.
///
/// The summary is embedded in the note file as backup, so a notebook index
/// can be rebuilt from note files alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Embedded summary.
    pub summary: NoteSummary,
    /// Note text.
    pub body: String,
}

impl Note {
    /// Constructs a live note with an empty edit history.
    pub fn new(id: NoteId, title: impl Into<String>, created_at_ms: TimestampMs) -> Self {
        Self {
            summary: NoteSummary {
                id,
                title: title.into(),
                created_at_ms,
                deleted_at_ms: NOT_DELETED,
                history: Vec::new(),
            },
            body: String::new(),
        }
    }

    /// Records an edit at `at_ms` with the current body size, dropping the
    /// oldest records beyond [`MAX_EDIT_HISTORY`].
    pub fn append_edit(&mut self, at_ms: TimestampMs) {
        self.summary.history.push(EditRecord {
            updated_at_ms: at_ms,
            size_bytes: self.body.len() as u64,
        });
        if self.summary.history.len() > MAX_EDIT_HISTORY {
            let excess = self.summary.history.len() - MAX_EDIT_HISTORY;
            self.summary.history.drain(..excess);
        }
    }
}

/// Per-notebook metadata file contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookMeta {
    /// Version of the tool that last wrote this notebook.
    pub version: String,
    /// Highest note id ever allocated in this notebook; only moves forward.
    pub latest_id: NoteId,
    /// Approximate total size in bytes of all note bodies in the notebook.
    pub approx_size_bytes: u64,
}

impl NotebookMeta {
    /// Fresh metadata with zero counters.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            latest_id: 0,
            approx_size_bytes: 0,
        }
    }
}
