use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;

use folio_diff::{build_text_diff, compare_revisions};
use folio_store::{InMemoryRevisionStore, NewRevision, RevisionStore};
use folio_types::{DocumentId, DocumentSchema, FieldKind, FieldValue, LocalizedMap};

fn article(revision: usize) -> String {
    (0..200)
        .map(|line| {
            if line % 40 == revision % 40 {
                format!("line {line} edited in revision {revision}\n")
            } else {
                format!("line {line}\n")
            }
        })
        .collect()
}

fn bench_text_diff(c: &mut Criterion) {
    let old = article(0);
    let new = article(1);
    c.bench_function("text_diff_200_lines", |b| {
        b.iter(|| build_text_diff(black_box("body"), black_box(&old), black_box(&new)))
    });
}

fn bench_history(c: &mut Criterion) {
    let schema = DocumentSchema::new("wiki")
        .with_field("title", FieldKind::Localized)
        .with_field("body", FieldKind::Text)
        .with_field("sources", FieldKind::Structured);

    let store = InMemoryRevisionStore::new();
    let doc = DocumentId::new();
    for i in 0..50 {
        let title: LocalizedMap = [("en", format!("Title {}", i / 10))].into_iter().collect();
        store
            .create_revision(
                NewRevision::new(doc)
                    .with_field("title", title)
                    .with_field("body", article(i))
                    .with_field("sources", FieldValue::Json(json!({"refs": (0..i % 7).collect::<Vec<_>>()}))),
            )
            .expect("in-memory write");
    }
    let revisions = store.list_revisions(&doc).expect("in-memory read");

    c.bench_function("history_50_revisions", |b| {
        b.iter(|| {
            revisions
                .windows(2)
                .map(|pair| compare_revisions(&schema, Some(&pair[0]), &pair[1]))
                .count()
        })
    });
}

criterion_group!(benches, bench_text_diff, bench_history);
criterion_main!(benches);
