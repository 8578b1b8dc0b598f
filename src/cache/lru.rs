//! Least-recently-used replacement policy.

use std::cell::RefCell;

use hashbrown::HashMap;

use crate::note::Note;
use crate::storage::{NoteStore, StoreError, StoreResult};
use crate::types::NoteId;

use super::{NoteCache, passthrough_store_methods};

#[derive(Debug)]
struct Node {
    prev: Option<usize>,
    next: Option<usize>,
    id: NoteId,
    note: Note,
}

/// Recency list over an arena of nodes: `front` is most recently used,
/// `rear` is the eviction candidate. Evicted slots go on the free list and
/// are recycled by later inserts.
#[derive(Debug, Default)]
struct LruState {
    map: HashMap<NoteId, usize>,
    nodes: Vec<Node>,
    free: Vec<usize>,
    front: Option<usize>,
    rear: Option<usize>,
}

impl LruState {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity),
            nodes: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = (self.nodes[slot].prev, self.nodes[slot].next);
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.front = next,
        }
        match next {
            Some(n) => self.nodes[n].prev = prev,
            None => self.rear = prev,
        }
    }

    fn link_front(&mut self, slot: usize) {
        let old_front = self.front;
        self.nodes[slot].prev = None;
        self.nodes[slot].next = old_front;
        if let Some(f) = old_front {
            self.nodes[f].prev = Some(slot);
        }
        self.front = Some(slot);
        if self.rear.is_none() {
            self.rear = Some(slot);
        }
    }

    fn move_to_front(&mut self, slot: usize) {
        if self.front == Some(slot) {
            return;
        }
        self.unlink(slot);
        self.link_front(slot);
    }

    fn insert_front(&mut self, id: NoteId, note: Note) {
        let node = Node {
            prev: None,
            next: None,
            id,
            note,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                slot
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };
        self.map.insert(id, slot);
        self.link_front(slot);
    }

    fn evict_rear(&mut self) {
        let Some(slot) = self.rear else {
            return;
        };
        self.unlink(slot);
        self.map.remove(&self.nodes[slot].id);
        self.free.push(slot);
    }
}

/// Bounded cache that evicts the least recently used note when full.
pub struct LruCache {
    inner: Box<dyn NoteStore>,
    capacity: usize,
    state: RefCell<LruState>,
}

impl LruCache {
    /// Wraps `inner` with room for `capacity` cached notes (at least one).
    pub fn new(inner: Box<dyn NoteStore>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner,
            capacity,
            state: RefCell::new(LruState::with_capacity(capacity)),
        }
    }
}

impl NoteStore for LruCache {
    passthrough_store_methods!(inner);

    fn get_note(&self, id: NoteId) -> StoreResult<Note> {
        {
            let mut state = self.state.borrow_mut();
            if let Some(&slot) = state.map.get(&id) {
                state.move_to_front(slot);
                return Ok(state.nodes[slot].note.clone());
            }
        }

        let note = self
            .inner
            .get_note(id)
            .map_err(|err| StoreError::CacheMiss(Box::new(err)))?;

        let mut state = self.state.borrow_mut();
        state.insert_front(id, note.clone());
        if state.map.len() > self.capacity {
            state.evict_rear();
        }
        Ok(note)
    }
}

impl NoteCache for LruCache {
    fn flush(&self) -> StoreResult<()> {
        *self.state.borrow_mut() = LruState::with_capacity(self.capacity);
        Ok(())
    }
}
