//! Note operations shared by CLI commands and the autosave watcher.
//!
//! These functions own the invariants that sit above raw storage: id
//! allocation from `latest_id`, duplicate-id detection, soft-delete
//! restoration on edit, and the notebook's approximate size counter.

use tracing::debug;

use crate::note::Note;
use crate::storage::{NoteStore, StoreError, StoreResult};
use crate::types::{NOT_DELETED, NoteId, now_ms};

/// Options for [`edit_note`].
#[derive(Debug, Clone, Default)]
pub struct EditNoteOptions {
    /// Replacement title; empty or absent keeps the current one.
    pub title: Option<String>,
    /// Replacement body; absent keeps the current one.
    pub body: Option<String>,
    /// Skip recording an edit history entry.
    pub no_history: bool,
}

/// Creates a note with the next id in the current notebook, saves it, and
/// advances the notebook metadata.
///
/// An empty `title` falls back to a date-derived one. Returns
/// [`StoreError::DuplicateId`] if the allocated id is already indexed,
/// which signals a corrupted `latest_id`.
pub fn new_note(
    store: &dyn NoteStore,
    title: Option<String>,
    body: String,
) -> StoreResult<Note> {
    let mut meta = store.get_meta()?;
    let id = meta.latest_id + 1;
    if store.get_note_summary(id).is_ok() {
        return Err(StoreError::DuplicateId(id));
    }

    let now = now_ms();
    let title = match title.filter(|t| !t.is_empty()) {
        Some(title) => title,
        None => date_title(),
    };

    let mut note = Note::new(id, title, now);
    note.body = body;
    note.append_edit(now);
    store.save_note(&note)?;

    meta.latest_id = id;
    meta.approx_size_bytes += note.body.len() as u64;
    store.save_meta(&meta)?;

    debug!(id, "created note");
    Ok(note)
}

/// Applies title/body changes to an existing note.
///
/// Editing a soft-deleted note restores it. When nothing changed, the note
/// is returned without touching disk.
pub fn edit_note(
    store: &dyn NoteStore,
    id: NoteId,
    options: EditNoteOptions,
) -> StoreResult<Note> {
    let mut note = store.get_note(id)?;
    let old_size = note.body.len() as u64;
    let mut changed = false;

    if note.summary.is_deleted() {
        debug!(id, deleted_at_ms = note.summary.deleted_at_ms, "restored soft-deleted note");
        note.summary.deleted_at_ms = NOT_DELETED;
        changed = true;
    }

    if let Some(title) = options.title.filter(|t| !t.is_empty()) {
        if title != note.summary.title {
            note.summary.title = title;
            changed = true;
        }
    }

    if let Some(body) = options.body {
        if body != note.body {
            note.body = body;
            changed = true;
        }
    }

    if !changed {
        return Ok(note);
    }

    if !options.no_history {
        note.append_edit(now_ms());
    }
    store.save_note(&note)?;

    let mut meta = store.get_meta()?;
    meta.approx_size_bytes = meta
        .approx_size_bytes
        .saturating_sub(old_size)
        .saturating_add(note.body.len() as u64);
    store.save_meta(&meta)?;

    debug!(id, "updated note");
    Ok(note)
}

/// Removes a note: soft by default (sets the deletion timestamp, keeping
/// the file), physically when `hard` is set.
pub fn remove_note(store: &dyn NoteStore, id: NoteId, hard: bool) -> StoreResult<()> {
    if hard {
        let size = store
            .get_note_summary(id)?
            .history
            .last()
            .map(|edit| edit.size_bytes)
            .unwrap_or(0);

        store.remove_note(id)?;

        let mut meta = store.get_meta()?;
        meta.approx_size_bytes = meta.approx_size_bytes.saturating_sub(size);
        store.save_meta(&meta)?;

        debug!(id, "deleted note");
        return Ok(());
    }

    let mut note = store.get_note(id)?;
    note.summary.deleted_at_ms = now_ms();
    store.save_note(&note)?;

    debug!(id, "soft-deleted note");
    Ok(())
}

fn date_title() -> String {
    chrono::Local::now().to_rfc2822()
}
