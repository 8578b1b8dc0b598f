use proptest::prelude::*;

use notelog::{
    note::Note,
    storage::{
        NoteStore, index,
        local::{DEFAULT_NOTEBOOK, LocalStore},
    },
    types::NoteId,
};

#[derive(Debug, Clone)]
enum Action {
    Save { id_idx: u8, body_len: u8 },
    Remove { id_idx: u8 },
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0u8..12, 0u8..64).prop_map(|(id_idx, body_len)| Action::Save { id_idx, body_len }),
        (0u8..12).prop_map(|id_idx| Action::Remove { id_idx }),
    ]
}

fn note_for(id: NoteId, body_len: u8) -> Note {
    let mut note = Note::new(id, format!("note {id}"), 1_000 + id);
    note.body = "x".repeat(usize::from(body_len));
    note.append_edit(2_000 + id);
    note
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn index_agrees_with_disk_after_any_sequence(actions in prop::collection::vec(action_strategy(), 1..40)) {
        let tmp = tempfile::tempdir().expect("tempdir");
        let base = tmp.path().join("notes_dir");
        let store = LocalStore::open(&base, "prop-test").expect("open store");

        for action in actions {
            match action {
                Action::Save { id_idx, body_len } => {
                    let id = NoteId::from(id_idx) + 1;
                    store.save_note(&note_for(id, body_len)).expect("save note");
                }
                Action::Remove { id_idx } => {
                    // Removing an id that was never saved fails; that is not
                    // what this property is about.
                    let _ = store.remove_note(NoteId::from(id_idx) + 1);
                }
            }

            let summaries = store.get_all_note_summaries().expect("summaries");
            let rebuilt = index::build_index(&base, DEFAULT_NOTEBOOK).expect("rebuild");
            prop_assert_eq!(&summaries, &rebuilt);
        }

        let once = index::build_index(&base, DEFAULT_NOTEBOOK).expect("rebuild once");
        let twice = index::build_index(&base, DEFAULT_NOTEBOOK).expect("rebuild twice");
        prop_assert_eq!(once, twice);
    }
}
