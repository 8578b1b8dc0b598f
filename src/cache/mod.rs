//! Replacement-cache decorators over any [`NoteStore`].
//!
//! A cache wraps a store behind the identical contract, intercepting
//! [`NoteStore::get_note`] so repeated reads are served from memory. Errors
//! from the wrapped store are wrapped with a cache-miss marker and
//! propagated, never swallowed.
//!
//! The LRU and RR policies keep their state in a `RefCell`, so caches are
//! single-owner: the compiler rejects sharing one across threads. Wrap the
//! engine, not the cache, when a background task needs store access.

mod lru;
mod noop;
mod rr;

pub use lru::LruCache;
pub use noop::NoopCache;
pub use rr::RrCache;

use crate::storage::{NoteStore, StoreResult};

/// Replacement policy selection for [`new_note_cache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Passthrough; holds no state.
    #[default]
    Noop,
    /// Least-recently-used eviction.
    Lru,
    /// Uniformly random eviction.
    Rr,
}

/// A note store with discardable cached state.
pub trait NoteCache: NoteStore {
    /// Discards all cached notes.
    fn flush(&self) -> StoreResult<()>;
}

/// Wraps `store` in the cache selected by `policy`. `capacity` bounds the
/// number of cached notes and is ignored by the no-op policy.
pub fn new_note_cache(
    store: Box<dyn NoteStore>,
    policy: CachePolicy,
    capacity: usize,
) -> Box<dyn NoteCache> {
    match policy {
        CachePolicy::Lru => Box::new(LruCache::new(store, capacity)),
        CachePolicy::Rr => Box::new(RrCache::new(store, capacity)),
        CachePolicy::Noop => Box::new(NoopCache::new(store)),
    }
}

/// Expands to every [`NoteStore`] method except `get_note`, forwarding to
/// the wrapped store in `self.$field`. Each cache supplies its own
/// `get_note`.
macro_rules! passthrough_store_methods {
    ($field:ident) => {
        fn get_meta(&self) -> crate::storage::StoreResult<crate::note::NotebookMeta> {
            self.$field.get_meta()
        }

        fn save_meta(&self, meta: &crate::note::NotebookMeta) -> crate::storage::StoreResult<()> {
            self.$field.save_meta(meta)
        }

        fn create_notebook(&self, name: &str) -> crate::storage::StoreResult<()> {
            self.$field.create_notebook(name)
        }

        fn get_notebook(&self) -> String {
            self.$field.get_notebook()
        }

        fn set_notebook(&self, name: &str) -> crate::storage::StoreResult<()> {
            self.$field.set_notebook(name)
        }

        fn rename_notebook(&self, old: &str, new: &str) -> crate::storage::StoreResult<()> {
            self.$field.rename_notebook(old, new)
        }

        fn remove_notebook(
            &self,
            name: &str,
            recursive: bool,
        ) -> crate::storage::StoreResult<()> {
            self.$field.remove_notebook(name, recursive)
        }

        fn list_notebooks(&self) -> Vec<String> {
            self.$field.list_notebooks()
        }

        fn get_note_summary(
            &self,
            id: crate::types::NoteId,
        ) -> crate::storage::StoreResult<crate::note::NoteSummary> {
            self.$field.get_note_summary(id)
        }

        fn get_all_note_summaries(
            &self,
        ) -> crate::storage::StoreResult<crate::storage::NotebookIndex> {
            self.$field.get_all_note_summaries()
        }

        fn save_note(&self, note: &crate::note::Note) -> crate::storage::StoreResult<()> {
            self.$field.save_note(note)
        }

        fn remove_note(&self, id: crate::types::NoteId) -> crate::storage::StoreResult<()> {
            self.$field.remove_note(id)
        }
    };
}

pub(crate) use passthrough_store_methods;
