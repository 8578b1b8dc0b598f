//! Filesystem-backed storage engine.

use std::fs;
use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use parking_lot::Mutex;
use tracing::warn;

use crate::note::{Note, NoteSummary, NotebookMeta};
use crate::types::NoteId;

use super::backup::{BackupMode, write_with_backup};
use super::{NoteStore, NotebookIndex, StoreError, StoreResult, index, layout};

/// Name of the notebook selected when none has been chosen yet.
pub const DEFAULT_NOTEBOOK: &str = "notes";

#[derive(Debug)]
struct State {
    notebook: String,
    indexes: HashMap<String, NotebookIndex>,
}

/// Local storage engine: one directory per notebook under a base directory,
/// JSON-encoded meta, index, and note files.
///
/// All mutating operations hold the instance mutex for their full duration;
/// the target notebook name is captured once at operation start, so a
/// concurrent notebook switch can never redirect an in-flight save.
/// [`NoteStore::get_note`] releases the lock before touching the note file
/// and so tolerates concurrent reads, but not concurrent replacement of the
/// same note file.
#[derive(Debug)]
pub struct LocalStore {
    base: PathBuf,
    version: String,
    state: Mutex<State>,
}

impl LocalStore {
    /// Opens the storage rooted at `base`, creating it if absent.
    ///
    /// Ensures the default notebook exists with a metadata file carrying
    /// `version`, then preloads the index of every non-hidden notebook
    /// directory, rebuilding any index that is missing or undecodable.
    pub fn open(base: impl Into<PathBuf>, version: impl Into<String>) -> StoreResult<Self> {
        let base = base.into();
        let version = version.into();

        ensure_dir(&base)?;
        ensure_dir(&layout::notebook_path(&base, DEFAULT_NOTEBOOK))?;

        let meta_path = layout::meta_path(&base, DEFAULT_NOTEBOOK);
        if !meta_path.exists() {
            build_meta(&meta_path, &version)?;
        }

        let mut indexes = HashMap::new();
        let entries =
            fs::read_dir(&base).map_err(|err| StoreError::io("read base directory", err))?;
        for entry in entries {
            let entry = entry.map_err(|err| StoreError::io("read base directory", err))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if !is_dir || layout::is_hidden(name) {
                continue;
            }

            let loaded = match index::load_index(&layout::index_path(&base, name)) {
                Ok(loaded) => loaded,
                Err(err) if err.is_not_found() => index::build_index(&base, name)?,
                Err(err @ StoreError::Corrupt { .. }) => {
                    warn!(notebook = name, %err, "rebuilding corrupt index");
                    index::build_index(&base, name)?
                }
                Err(err) => return Err(err),
            };
            indexes.insert(name.to_string(), loaded);
        }

        Ok(Self {
            base,
            version,
            state: Mutex::new(State {
                notebook: DEFAULT_NOTEBOOK.to_string(),
                indexes,
            }),
        })
    }

    /// Base directory this engine is rooted at.
    pub fn base_dir(&self) -> &Path {
        &self.base
    }
}

impl NoteStore for LocalStore {
    fn get_meta(&self) -> StoreResult<NotebookMeta> {
        let state = self.state.lock();
        read_meta(&layout::meta_path(&self.base, &state.notebook))
    }

    fn save_meta(&self, meta: &NotebookMeta) -> StoreResult<()> {
        let state = self.state.lock();
        let path = layout::meta_path(&self.base, &state.notebook);
        let payload =
            serde_json::to_vec(meta).map_err(|err| StoreError::corrupt("encode meta file", err))?;
        write_with_backup(&path, &payload, BackupMode::Require, "meta")
    }

    fn create_notebook(&self, name: &str) -> StoreResult<()> {
        layout::validate_notebook_name(name)?;

        let mut state = self.state.lock();
        create_dir_owner_only(&layout::notebook_path(&self.base, name))
            .map_err(|err| StoreError::io("make notebook directory", err))?;
        build_meta(&layout::meta_path(&self.base, name), &self.version)?;

        let built = index::build_index(&self.base, name)?;
        state.indexes.insert(name.to_string(), built);
        Ok(())
    }

    fn get_notebook(&self) -> String {
        self.state.lock().notebook.clone()
    }

    fn set_notebook(&self, name: &str) -> StoreResult<()> {
        layout::validate_notebook_name(name)?;

        let mut state = self.state.lock();
        let path = layout::notebook_path(&self.base, name);
        let info = fs::metadata(&path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotebookNotFound(name.to_string())
            } else {
                StoreError::io("stat notebook directory", err)
            }
        })?;
        if !info.is_dir() {
            return Err(StoreError::NotADirectory(path));
        }

        state.notebook = name.to_string();
        Ok(())
    }

    fn rename_notebook(&self, old: &str, new: &str) -> StoreResult<()> {
        layout::validate_notebook_name(old)?;
        layout::validate_notebook_name(new)?;

        let mut state = self.state.lock();
        let old_path = layout::notebook_path(&self.base, old);
        if !old_path.is_dir() {
            return Err(StoreError::NotebookNotFound(old.to_string()));
        }

        fs::rename(&old_path, layout::notebook_path(&self.base, new))
            .map_err(|err| StoreError::io("rename notebook directory", err))?;

        if let Some(moved) = state.indexes.remove(old) {
            state.indexes.insert(new.to_string(), moved);
        }
        if state.notebook == old {
            state.notebook = new.to_string();
        }
        Ok(())
    }

    fn remove_notebook(&self, name: &str, recursive: bool) -> StoreResult<()> {
        layout::validate_notebook_name(name)?;

        let mut state = self.state.lock();
        if state.notebook == name {
            return Err(StoreError::NotebookSelected(name.to_string()));
        }

        let path = layout::notebook_path(&self.base, name);
        let info = fs::metadata(&path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotebookNotFound(name.to_string())
            } else {
                StoreError::io("stat notebook directory", err)
            }
        })?;
        if !info.is_dir() {
            return Err(StoreError::NotADirectory(path));
        }

        if recursive {
            fs::remove_dir_all(&path)
                .map_err(|err| StoreError::io("remove notebook directory", err))?;
            state.indexes.remove(name);
            return Ok(());
        }

        let entries =
            fs::read_dir(&path).map_err(|err| StoreError::io("read notebook directory", err))?;
        for entry in entries {
            let entry =
                entry.map_err(|err| StoreError::io("read notebook directory", err))?;
            if let Some(entry_name) = entry.file_name().to_str() {
                if layout::is_note_filename(entry_name) {
                    return Err(StoreError::NotebookNotEmpty(name.to_string()));
                }
            }
        }

        // Only control files remain; clear them so the directory removal
        // cannot fail on non-emptiness.
        for control in [
            layout::meta_path(&self.base, name),
            layout::index_path(&self.base, name),
        ] {
            let _ = fs::remove_file(layout::backup_path(&control));
            let _ = fs::remove_file(control);
        }
        fs::remove_dir(&path).map_err(|err| StoreError::io("remove notebook directory", err))?;
        state.indexes.remove(name);
        Ok(())
    }

    fn list_notebooks(&self) -> Vec<String> {
        self.state.lock().indexes.keys().cloned().collect()
    }

    fn get_note_summary(&self, id: NoteId) -> StoreResult<NoteSummary> {
        let state = self.state.lock();
        let index = state
            .indexes
            .get(&state.notebook)
            .ok_or_else(|| StoreError::NotebookNotFound(state.notebook.clone()))?;
        index.get(&id).cloned().ok_or(StoreError::NoteNotFound(id))
    }

    fn get_all_note_summaries(&self) -> StoreResult<NotebookIndex> {
        let state = self.state.lock();
        state
            .indexes
            .get(&state.notebook)
            .cloned()
            .ok_or_else(|| StoreError::NotebookNotFound(state.notebook.clone()))
    }

    fn get_note(&self, id: NoteId) -> StoreResult<Note> {
        let notebook = self.state.lock().notebook.clone();
        let path = layout::note_path(&self.base, &notebook, id);
        let bytes = fs::read(&path).map_err(|err| StoreError::io("open note file", err))?;
        serde_json::from_slice(&bytes).map_err(|err| StoreError::corrupt("decode note file", err))
    }

    fn save_note(&self, note: &Note) -> StoreResult<()> {
        let mut state = self.state.lock();
        let notebook = state.notebook.clone();
        if !state.indexes.contains_key(&notebook) {
            return Err(StoreError::NotebookNotFound(notebook));
        }

        let payload = serde_json::to_vec(note)
            .map_err(|err| StoreError::corrupt("encode note file", err))?;
        let path = layout::note_path(&self.base, &notebook, note.summary.id);
        write_with_backup(&path, &payload, BackupMode::IfPresent, "note")?;

        let index = state
            .indexes
            .get_mut(&notebook)
            .ok_or_else(|| StoreError::NotebookNotFound(notebook.clone()))?;
        index.insert(note.summary.id, note.summary.clone());
        index::save_index(&self.base, &notebook, index)
    }

    fn remove_note(&self, id: NoteId) -> StoreResult<()> {
        let mut state = self.state.lock();
        let notebook = state.notebook.clone();
        if !state.indexes.contains_key(&notebook) {
            return Err(StoreError::NotebookNotFound(notebook));
        }

        let path = layout::note_path(&self.base, &notebook, id);
        fs::remove_file(&path).map_err(|err| StoreError::io("remove note file", err))?;
        let _ = fs::remove_file(layout::backup_path(&path));

        let index = state
            .indexes
            .get_mut(&notebook)
            .ok_or_else(|| StoreError::NotebookNotFound(notebook.clone()))?;
        index.remove(&id);
        index::save_index(&self.base, &notebook, index)
    }
}

fn read_meta(path: &Path) -> StoreResult<NotebookMeta> {
    let bytes = fs::read(path).map_err(|err| StoreError::io("open meta file", err))?;
    serde_json::from_slice(&bytes).map_err(|err| StoreError::corrupt("decode meta file", err))
}

fn build_meta(path: &Path, version: &str) -> StoreResult<NotebookMeta> {
    let meta = NotebookMeta::new(version);
    let payload =
        serde_json::to_vec(&meta).map_err(|err| StoreError::corrupt("encode meta file", err))?;
    fs::write(path, payload).map_err(|err| StoreError::io("create meta file", err))?;
    Ok(meta)
}

fn ensure_dir(path: &Path) -> StoreResult<()> {
    match fs::metadata(path) {
        Ok(info) if info.is_dir() => Ok(()),
        Ok(_) => Err(StoreError::NotADirectory(path.to_path_buf())),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            create_dir_owner_only(path).map_err(|err| StoreError::io("make directory", err))
        }
        Err(err) => Err(StoreError::io("stat directory", err)),
    }
}

fn create_dir_owner_only(path: &Path) -> std::io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(path)
}
