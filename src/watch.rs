//! Autosave watcher used during editor hand-off.
//!
//! While the user has a note open in an external editor, a background task
//! periodically re-reads the scratch file and, on change, appends an edit
//! record and saves through the shared, mutex-guarded engine. There is no
//! private fast path: the watcher uses the same [`NoteStore`] methods as
//! foreground commands.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::note::Note;
use crate::storage::{NoteStore, StoreError, StoreResult};
use crate::types::now_ms;

/// Handle to a running autosave task.
pub struct AutosaveHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<StoreResult<Note>>,
}

impl AutosaveHandle {
    /// Signals the task to stop and returns the last saved note state.
    pub async fn stop(self) -> StoreResult<Note> {
        let _ = self.stop_tx.send(true);
        self.task
            .await
            .map_err(|err| StoreError::io("join autosave task", std::io::Error::other(err)))?
    }
}

/// Spawns a task that re-reads `scratch` every `period` and saves `note`
/// with the new body whenever the contents differ from the last saved
/// state. The task ends on [`AutosaveHandle::stop`] or on the first
/// storage error.
pub fn spawn_autosave<S>(
    store: Arc<S>,
    note: Note,
    scratch: PathBuf,
    period: Duration,
) -> AutosaveHandle
where
    S: NoteStore + Send + Sync + 'static,
{
    let (stop_tx, mut stop_rx) = watch::channel(false);
    // interval panics on a zero period.
    let period = period.max(Duration::from_millis(1));

    let task = tokio::spawn(async move {
        let mut note = note;
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = stop_rx.changed() => break,
                _ = ticker.tick() => {
                    let contents = match tokio::fs::read_to_string(&scratch).await {
                        Ok(contents) => contents,
                        Err(err) => return Err(StoreError::io("read scratch file", err)),
                    };
                    if contents == note.body {
                        continue;
                    }

                    note.body = contents;
                    note.append_edit(now_ms());

                    let store = Arc::clone(&store);
                    let to_save = note.clone();
                    tokio::task::spawn_blocking(move || store.save_note(&to_save))
                        .await
                        .map_err(|err| {
                            StoreError::io("join autosave save", std::io::Error::other(err))
                        })??;
                }
            }
        }

        Ok(note)
    });

    AutosaveHandle { stop_tx, task }
}
