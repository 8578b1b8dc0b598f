//! Notebook index construction, loading, and persistence.

use std::fs;
use std::path::Path;

use tracing::warn;

use crate::note::Note;

use super::backup::{BackupMode, write_with_backup};
use super::{NotebookIndex, StoreError, StoreResult, layout};

/// Opens and decodes an existing index file.
///
/// A missing file is reported as an error for which
/// [`StoreError::is_not_found`] holds, so the caller can fall back to
/// [`build_index`].
pub fn load_index(path: &Path) -> StoreResult<NotebookIndex> {
    let bytes = fs::read(path).map_err(|err| StoreError::io("open index file", err))?;
    serde_json::from_slice(&bytes).map_err(|err| StoreError::corrupt("decode index file", err))
}

/// Rebuilds a notebook's index from scratch by scanning its note files.
///
/// Directory entries that are not note files are skipped silently; note
/// files that cannot be read or decoded are skipped with a warning rather
/// than failing the whole rebuild. The resulting index is persisted
/// immediately and becomes authoritative for the notebook.
pub fn build_index(base: &Path, notebook: &str) -> StoreResult<NotebookIndex> {
    let dir = layout::notebook_path(base, notebook);
    let entries = fs::read_dir(&dir).map_err(|err| StoreError::io("read notes directory", err))?;

    let mut index = NotebookIndex::new();
    for entry in entries {
        let entry = entry.map_err(|err| StoreError::io("read notes directory", err))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if is_dir || !layout::is_note_filename(name) {
            continue;
        }

        let path = entry.path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(path = %path.display(), %err, "skipping unreadable note file");
                continue;
            }
        };
        match serde_json::from_slice::<Note>(&bytes) {
            Ok(note) => {
                index.insert(note.summary.id, note.summary);
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "skipping undecodable note file");
            }
        }
    }

    let payload =
        serde_json::to_vec(&index).map_err(|err| StoreError::corrupt("encode index file", err))?;
    fs::write(layout::index_path(base, notebook), payload)
        .map_err(|err| StoreError::io("create index file", err))?;

    Ok(index)
}

/// Persists a notebook's index with the backup-then-write protocol.
pub fn save_index(base: &Path, notebook: &str, index: &NotebookIndex) -> StoreResult<()> {
    let payload =
        serde_json::to_vec(index).map_err(|err| StoreError::corrupt("encode index file", err))?;
    write_with_backup(
        &layout::index_path(base, notebook),
        &payload,
        BackupMode::Require,
        "index",
    )
}
