//! Random-replacement policy.

use std::cell::RefCell;

use hashbrown::HashMap;
use rand::RngExt;

use crate::note::Note;
use crate::storage::{NoteStore, StoreError, StoreResult};
use crate::types::NoteId;

use super::{NoteCache, passthrough_store_methods};

#[derive(Debug, Default)]
struct RrState {
    slots: Vec<NoteId>,
    notes: HashMap<NoteId, Note>,
}

impl RrState {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            notes: HashMap::with_capacity(capacity),
        }
    }
}

/// Bounded cache that evicts a uniformly random note when full.
///
/// RR does not track recency: hits return the cached note unchanged.
pub struct RrCache {
    inner: Box<dyn NoteStore>,
    capacity: usize,
    state: RefCell<RrState>,
}

impl RrCache {
    /// Wraps `inner` with room for `capacity` cached notes (at least one).
    pub fn new(inner: Box<dyn NoteStore>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner,
            capacity,
            state: RefCell::new(RrState::with_capacity(capacity)),
        }
    }
}

impl NoteStore for RrCache {
    passthrough_store_methods!(inner);

    fn get_note(&self, id: NoteId) -> StoreResult<Note> {
        if let Some(note) = self.state.borrow().notes.get(&id) {
            return Ok(note.clone());
        }

        let note = self
            .inner
            .get_note(id)
            .map_err(|err| StoreError::CacheMiss(Box::new(err)))?;

        let mut state = self.state.borrow_mut();
        if state.slots.len() < self.capacity {
            state.slots.push(id);
        } else {
            let victim = rand::rng().random_range(0..state.slots.len());
            let evicted = state.slots[victim];
            state.notes.remove(&evicted);
            state.slots[victim] = id;
        }
        state.notes.insert(id, note.clone());
        Ok(note)
    }
}

impl NoteCache for RrCache {
    fn flush(&self) -> StoreResult<()> {
        *self.state.borrow_mut() = RrState::with_capacity(self.capacity);
        Ok(())
    }
}
