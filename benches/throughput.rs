use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};

use notelog::{
    cache::{CachePolicy, new_note_cache},
    note::Note,
    storage::{NoteStore, local::LocalStore},
    types::NoteId,
};

fn note_for(id: NoteId) -> Note {
    let mut note = Note::new(id, format!("note {id}"), id);
    note.body = format!("body of note {id}, repeated {}", "x".repeat(128));
    note.append_edit(id);
    note
}

fn bench_saves(c: &mut Criterion) {
    c.bench_function("save_note_200", |b| {
        b.iter_batched(
            || {
                let tmp = tempfile::tempdir().expect("tempdir");
                let store =
                    LocalStore::open(tmp.path().join("notes_dir"), "bench").expect("open");
                (tmp, store)
            },
            |(_tmp, store)| {
                for id in 1..=200u64 {
                    store.save_note(&note_for(id)).expect("save");
                }
            },
            BatchSize::PerIteration,
        );
    });
}

fn bench_summary_listing(c: &mut Criterion) {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = LocalStore::open(tmp.path().join("notes_dir"), "bench").expect("open");
    for id in 1..=2_000u64 {
        store.save_note(&note_for(id)).expect("save");
    }

    c.bench_function("list_summaries_2k", |b| {
        b.iter(|| {
            let summaries = store.get_all_note_summaries().expect("summaries");
            assert_eq!(summaries.len(), 2_000);
        });
    });
}

fn bench_cached_reads(c: &mut Criterion) {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = LocalStore::open(tmp.path().join("notes_dir"), "bench").expect("open");
    for id in 1..=256u64 {
        store.save_note(&note_for(id)).expect("save");
    }
    let store = std::sync::Arc::new(store);

    let mut group = c.benchmark_group("hot_reads_64");
    for policy in [CachePolicy::Noop, CachePolicy::Lru, CachePolicy::Rr] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{policy:?}")),
            &policy,
            |b, &policy| {
                let cache = new_note_cache(Box::new(std::sync::Arc::clone(&store)), policy, 64);
                b.iter(|| {
                    for id in 1..=64u64 {
                        let _ = cache.get_note(id).expect("get");
                    }
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_saves, bench_summary_listing, bench_cached_reads);
criterion_main!(benches);
