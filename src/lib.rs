//! Personal note storage: directory-backed notebooks, a persisted summary
//! index, and optional replacement caching in front of the engine.
//!
//! # Examples
//!
//! Engine usage with [`storage::local::LocalStore`]:
//! ```
//! use notelog::{
//!     ops,
//!     storage::{NoteStore, local::LocalStore},
//! };
//!
//! let dir = tempfile::tempdir().expect("tempdir");
//! let store = LocalStore::open(dir.path(), "0.1.0").expect("open");
//!
//! let note = ops::new_note(&store, Some("first".to_string()), "hello".to_string())
//!     .expect("new note");
//! assert_eq!(note.summary.id, 1);
//!
//! let loaded = store.get_note(note.summary.id).expect("get note");
//! assert_eq!(loaded.body, "hello");
//! ```
//!
//! Interposing an LRU cache in front of a shared engine:
//! ```no_run
//! use std::sync::Arc;
//!
//! use notelog::{
//!     cache::{CachePolicy, new_note_cache},
//!     storage::{NoteStore, local::LocalStore},
//! };
//!
//! let engine = Arc::new(LocalStore::open("/tmp/notes", "0.1.0").expect("open"));
//! let cache = new_note_cache(Box::new(Arc::clone(&engine)), CachePolicy::Lru, 16);
//! let note = cache.get_note(1).expect("cached read");
//! assert_eq!(note.summary.id, 1);
//! ```
#![deny(missing_docs)]

/// Replacement-cache decorators over the storage contract.
pub mod cache;
/// Note domain records and notebook metadata.
pub mod note;
/// Note operations shared by CLI commands and the autosave watcher.
pub mod ops;
/// Storage contract, error taxonomy, and the local filesystem engine.
pub mod storage;
/// Shared identifier and timestamp primitives.
pub mod types;
/// Autosave watcher used during editor hand-off.
pub mod watch;
