//! Backup-then-write file replacement.
//!
//! The only crash-recovery mechanism in the engine: the existing file is
//! renamed to a `.bak` sibling before the new contents are written, and the
//! backup is renamed back if the write fails.

use std::fs;
use std::io;
use std::path::Path;

use super::{StoreError, StoreResult, layout};

/// Whether the file being replaced must already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BackupMode {
    /// The file must exist; a failed backup rename aborts the save.
    Require,
    /// A missing file skips the backup step (first save of a note).
    IfPresent,
}

/// Replaces `path` with `payload` under the backup-then-write protocol.
///
/// On write failure the backup is restored and the original error returned;
/// a failed restore is surfaced as the more severe
/// [`StoreError::RestoreFailed`]. On success the backup is removed
/// best-effort. `what` names the file kind in error contexts.
pub(crate) fn write_with_backup(
    path: &Path,
    payload: &[u8],
    mode: BackupMode,
    what: &str,
) -> StoreResult<()> {
    let bak = layout::backup_path(path);
    let backed_up = match mode {
        BackupMode::Require => {
            fs::rename(path, &bak)
                .map_err(|err| StoreError::io(format!("backup old {what} file"), err))?;
            true
        }
        BackupMode::IfPresent => match fs::rename(path, &bak) {
            Ok(()) => true,
            Err(err) if err.kind() == io::ErrorKind::NotFound => false,
            Err(err) => return Err(StoreError::io(format!("backup old {what} file"), err)),
        },
    };

    if let Err(err) = fs::write(path, payload) {
        if backed_up {
            if let Err(restore_err) = fs::rename(&bak, path) {
                return Err(StoreError::RestoreFailed {
                    path: path.to_path_buf(),
                    source: restore_err,
                });
            }
        }
        return Err(StoreError::io(format!("create {what} file"), err));
    }

    if backed_up {
        let _ = fs::remove_file(&bak);
    }
    Ok(())
}
