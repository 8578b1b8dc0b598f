use std::sync::Arc;
use std::time::Duration;

use notelog::{
    ops,
    storage::{NoteStore, local::LocalStore},
    watch,
};

async fn wait_for_body(store: &LocalStore, id: u64, expected: &str) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if store.get_note(id).map(|n| n.body == expected).unwrap_or(false) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("body never reached expected contents");
}

#[tokio::test]
async fn autosave_saves_scratch_changes_through_the_engine() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let engine = Arc::new(
        LocalStore::open(tmp.path().join("notes_dir"), "0.1.0-test").expect("open store"),
    );

    let note = ops::new_note(&*engine, Some("watched".to_string()), "v1".to_string())
        .expect("new note");
    let id = note.summary.id;
    let edits_before = note.summary.history.len();

    let scratch = tmp.path().join("scratch");
    std::fs::write(&scratch, "v1").expect("seed scratch");

    let handle = watch::spawn_autosave(
        Arc::clone(&engine),
        note,
        scratch.clone(),
        Duration::from_millis(25),
    );

    // Let at least one unchanged tick pass, then edit the scratch file.
    tokio::time::sleep(Duration::from_millis(60)).await;
    std::fs::write(&scratch, "v2 from the editor").expect("edit scratch");

    wait_for_body(&engine, id, "v2 from the editor").await;

    let latest = handle.stop().await.expect("stop watcher");
    assert_eq!(latest.body, "v2 from the editor");
    assert_eq!(latest.summary.history.len(), edits_before + 1);

    let on_disk = engine.get_note(id).expect("get note");
    assert_eq!(on_disk, latest);
}

#[tokio::test]
async fn autosave_without_changes_saves_nothing() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let engine = Arc::new(
        LocalStore::open(tmp.path().join("notes_dir"), "0.1.0-test").expect("open store"),
    );

    let note = ops::new_note(&*engine, Some("idle".to_string()), "unchanged".to_string())
        .expect("new note");
    let id = note.summary.id;
    let history_before = note.summary.history.len();

    let scratch = tmp.path().join("scratch");
    std::fs::write(&scratch, "unchanged").expect("seed scratch");

    let handle = watch::spawn_autosave(
        Arc::clone(&engine),
        note,
        scratch,
        Duration::from_millis(10),
    );
    tokio::time::sleep(Duration::from_millis(80)).await;

    let latest = handle.stop().await.expect("stop watcher");
    assert_eq!(latest.body, "unchanged");
    assert_eq!(latest.summary.history.len(), history_before);

    let on_disk = engine.get_note(id).expect("get note");
    assert_eq!(on_disk.summary.history.len(), history_before);
}

#[tokio::test]
async fn autosave_surfaces_scratch_read_failures() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let engine = Arc::new(
        LocalStore::open(tmp.path().join("notes_dir"), "0.1.0-test").expect("open store"),
    );

    let note = ops::new_note(&*engine, Some("lost".to_string()), "v1".to_string())
        .expect("new note");

    let handle = watch::spawn_autosave(
        Arc::clone(&engine),
        note,
        tmp.path().join("never-created"),
        Duration::from_millis(10),
    );
    tokio::time::sleep(Duration::from_millis(50)).await;

    let err = handle.stop().await.expect_err("scratch is missing");
    assert!(err.is_not_found());
}
