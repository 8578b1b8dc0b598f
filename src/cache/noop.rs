//! Passthrough cache.

use crate::note::Note;
use crate::storage::{NoteStore, StoreError, StoreResult};
use crate::types::NoteId;

use super::{NoteCache, passthrough_store_methods};

/// Cache that holds no state and forwards every call unchanged.
///
/// `flush` reports an error, deliberately surfacing that a no-op cache was
/// wired where a flush was expected.
pub struct NoopCache {
    inner: Box<dyn NoteStore>,
}

impl NoopCache {
    /// Wraps `inner`.
    pub fn new(inner: Box<dyn NoteStore>) -> Self {
        Self { inner }
    }
}

impl NoteStore for NoopCache {
    passthrough_store_methods!(inner);

    fn get_note(&self, id: NoteId) -> StoreResult<Note> {
        self.inner.get_note(id)
    }
}

impl NoteCache for NoopCache {
    fn flush(&self) -> StoreResult<()> {
        Err(StoreError::NothingToFlush)
    }
}
