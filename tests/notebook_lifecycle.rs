use std::fs;
use std::path::Path;

use notelog::{
    note::Note,
    storage::{NoteStore, StoreError, layout, local::{DEFAULT_NOTEBOOK, LocalStore}},
};

fn open_store(root: &Path) -> LocalStore {
    LocalStore::open(root.join("notes_dir"), "0.1.0-test").expect("open store")
}

fn sample_note(id: u64, title: &str) -> Note {
    let mut note = Note::new(id, title, 1_000);
    note.body = "body".to_string();
    note.append_edit(1_000);
    note
}

#[test]
fn open_creates_default_notebook() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = open_store(tmp.path());

    assert_eq!(store.get_notebook(), DEFAULT_NOTEBOOK);
    assert_eq!(store.list_notebooks(), vec![DEFAULT_NOTEBOOK.to_string()]);

    let base = tmp.path().join("notes_dir");
    assert!(layout::meta_path(&base, DEFAULT_NOTEBOOK).exists());
    assert!(layout::index_path(&base, DEFAULT_NOTEBOOK).exists());

    let meta = store.get_meta().expect("get meta");
    assert_eq!(meta.version, "0.1.0-test");
    assert_eq!(meta.latest_id, 0);
}

#[test]
fn create_select_and_separate_notebooks() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = open_store(tmp.path());

    store.create_notebook("work").expect("create");
    let mut notebooks = store.list_notebooks();
    notebooks.sort();
    assert_eq!(notebooks, vec!["notes".to_string(), "work".to_string()]);

    store.set_notebook("work").expect("select");
    assert_eq!(store.get_notebook(), "work");
    store.save_note(&sample_note(1, "in work")).expect("save");

    // The default notebook must not see the note.
    store.set_notebook(DEFAULT_NOTEBOOK).expect("select default");
    assert!(store.get_all_note_summaries().expect("summaries").is_empty());

    store.set_notebook("work").expect("select work");
    assert_eq!(store.get_all_note_summaries().expect("summaries").len(), 1);
}

#[test]
fn invalid_notebook_names_are_rejected() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = open_store(tmp.path());

    for name in ["", ".hidden", "a/b", "a\\b"] {
        let err = store.create_notebook(name).expect_err("invalid name");
        assert!(matches!(err, StoreError::InvalidName(_)), "name {name:?}");
    }
}

#[test]
fn set_notebook_requires_existing_directory() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = open_store(tmp.path());

    let err = store.set_notebook("absent").expect_err("missing notebook");
    assert!(err.is_not_found());
    assert_eq!(store.get_notebook(), DEFAULT_NOTEBOOK);
}

#[test]
fn rename_moves_directory_index_and_selection() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = open_store(tmp.path());

    store.create_notebook("work").expect("create");
    store.set_notebook("work").expect("select");
    store.save_note(&sample_note(1, "kept across rename")).expect("save");

    store.rename_notebook("work", "projects").expect("rename");
    assert_eq!(store.get_notebook(), "projects");

    let base = tmp.path().join("notes_dir");
    assert!(!layout::notebook_path(&base, "work").exists());
    assert!(layout::notebook_path(&base, "projects").is_dir());

    let summaries = store.get_all_note_summaries().expect("summaries");
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[&1].title, "kept across rename");
}

#[test]
fn remove_notebook_validates_and_cleans_up() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = open_store(tmp.path());

    store.create_notebook("scratch").expect("create");
    store.set_notebook("scratch").expect("select");
    store.save_note(&sample_note(1, "blocker")).expect("save");

    // The selected notebook cannot be removed out from under the engine.
    let err = store.remove_notebook("scratch", true).expect_err("selected");
    assert!(matches!(err, StoreError::NotebookSelected(_)));

    store.set_notebook(DEFAULT_NOTEBOOK).expect("deselect");
    let err = store.remove_notebook("scratch", false).expect_err("non-empty");
    assert!(matches!(err, StoreError::NotebookNotEmpty(_)));

    store.remove_notebook("scratch", true).expect("recursive remove");
    let base = tmp.path().join("notes_dir");
    assert!(!layout::notebook_path(&base, "scratch").exists());
    assert!(!store.list_notebooks().contains(&"scratch".to_string()));
}

#[test]
fn remove_empty_notebook_without_recursion() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = open_store(tmp.path());

    store.create_notebook("empty").expect("create");
    store.remove_notebook("empty", false).expect("remove");

    let base = tmp.path().join("notes_dir");
    assert!(!layout::notebook_path(&base, "empty").exists());
    assert!(!store.list_notebooks().contains(&"empty".to_string()));
}

#[test]
fn hidden_directories_are_not_notebooks() {
    let tmp = tempfile::tempdir().expect("tempdir");
    {
        let _ = open_store(tmp.path());
    }

    let base = tmp.path().join("notes_dir");
    fs::create_dir(base.join(".trash")).expect("mkdir hidden");
    fs::write(base.join(".trash").join("junk"), b"junk").expect("junk file");

    let store = open_store(tmp.path());
    assert_eq!(store.list_notebooks(), vec![DEFAULT_NOTEBOOK.to_string()]);

    let err = store.set_notebook(".trash").expect_err("hidden");
    assert!(matches!(err, StoreError::InvalidName(_)));
}

#[test]
fn reopen_discovers_every_notebook() {
    let tmp = tempfile::tempdir().expect("tempdir");
    {
        let store = open_store(tmp.path());
        store.create_notebook("work").expect("create work");
        store.create_notebook("home").expect("create home");
        store.set_notebook("home").expect("select");
        store.save_note(&sample_note(1, "persisted")).expect("save");
    }

    let store = open_store(tmp.path());
    let mut notebooks = store.list_notebooks();
    notebooks.sort();
    assert_eq!(
        notebooks,
        vec!["home".to_string(), "notes".to_string(), "work".to_string()]
    );

    store.set_notebook("home").expect("select");
    let summaries = store.get_all_note_summaries().expect("summaries");
    assert_eq!(summaries[&1].title, "persisted");
}
