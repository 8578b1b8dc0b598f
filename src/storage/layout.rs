//! Deterministic on-disk paths for notebooks, notes, and control files.
//!
//! Pure path computation; nothing here touches the filesystem. Callers are
//! responsible for validating notebook names before joining them.

use std::path::{Path, PathBuf};

use crate::types::NoteId;

/// Fixed metadata filename inside each notebook directory.
pub const META_FILENAME: &str = "meta";
/// Fixed index filename inside each notebook directory.
pub const INDEX_FILENAME: &str = "index";
/// Suffix appended to a file being replaced under backup-then-write.
pub const BACKUP_SUFFIX: &str = ".bak";
/// Width of zero-padded decimal note filenames.
pub const NOTE_FILENAME_WIDTH: usize = 6;

/// Zero-padded decimal filename for a note id, e.g. `000042`.
pub fn note_filename(id: NoteId) -> String {
    format!("{id:0width$}", width = NOTE_FILENAME_WIDTH)
}

/// Directory holding one notebook's files.
pub fn notebook_path(base: &Path, notebook: &str) -> PathBuf {
    base.join(notebook)
}

/// Canonical path of a note file.
pub fn note_path(base: &Path, notebook: &str, id: NoteId) -> PathBuf {
    notebook_path(base, notebook).join(note_filename(id))
}

/// Path of a notebook's metadata file.
pub fn meta_path(base: &Path, notebook: &str) -> PathBuf {
    notebook_path(base, notebook).join(META_FILENAME)
}

/// Path of a notebook's index file.
pub fn index_path(base: &Path, notebook: &str) -> PathBuf {
    notebook_path(base, notebook).join(INDEX_FILENAME)
}

/// Backup sibling of `path`, e.g. `meta` -> `meta.bak`.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// True for filenames matching the note pattern: exactly six ASCII digits.
pub fn is_note_filename(name: &str) -> bool {
    name.len() == NOTE_FILENAME_WIDTH && name.bytes().all(|b| b.is_ascii_digit())
}

/// Hidden-file check. File names may not be empty under the unix
/// specification, so a leading marker test is sufficient.
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Validates a notebook name: non-empty, not hidden, and free of path
/// separators that would escape the one-directory-per-notebook layout.
pub fn validate_notebook_name(name: &str) -> Result<(), super::StoreError> {
    if name.is_empty() || is_hidden(name) || name.contains(['/', '\\']) {
        return Err(super::StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}
