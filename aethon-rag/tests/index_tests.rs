//! Behavior tests for the exact cosine index and its snapshot format.

use aethon_rag::{IndexSnapshot, RagError, VectorIndex};
use proptest::prelude::*;

fn index_of(vectors: &[Vec<f32>]) -> VectorIndex {
    let mut index = VectorIndex::new();
    for (i, vector) in vectors.iter().enumerate() {
        index.insert(format!("chunk-{i}"), vector.clone()).expect("valid vector");
    }
    index
}

#[test]
fn first_insert_establishes_dimensionality() {
    let mut index = VectorIndex::new();
    assert_eq!(index.dimensions(), None);
    index.insert("a", vec![1.0, 0.0, 0.0]).expect("first insert");
    assert_eq!(index.dimensions(), Some(3));

    let err = index.insert("b", vec![1.0, 0.0]).unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { expected: 3, actual: 2 }));
}

#[test]
fn zero_magnitude_vectors_are_rejected() {
    let mut index = VectorIndex::new();
    assert!(matches!(index.insert("a", vec![0.0, 0.0]), Err(RagError::DegenerateVector)));
    assert!(index.is_empty());

    index.insert("a", vec![1.0, 0.0]).expect("valid");
    assert!(matches!(index.search(&[0.0, 0.0], 1), Err(RagError::DegenerateVector)));
}

#[test]
fn searching_an_empty_index_fails() {
    let index = VectorIndex::new();
    assert!(matches!(index.search(&[1.0, 0.0], 3), Err(RagError::EmptyIndex)));
}

#[test]
fn zero_top_k_yields_empty_results_not_an_error() {
    let index = index_of(&[vec![1.0, 0.0]]);
    assert!(index.search(&[1.0, 0.0], 0).expect("ok").is_empty());
    // even on an empty index
    assert!(VectorIndex::new().search(&[1.0, 0.0], 0).expect("ok").is_empty());
}

#[test]
fn exact_match_scores_one() {
    let index = index_of(&[
        vec![1.0, 0.0, 0.0],
        vec![0.0, 1.0, 0.0],
        vec![0.0, 0.0, 1.0],
    ]);
    let results = index.search(&[0.0, 1.0, 0.0], 1).expect("search");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].text, "chunk-1");
    assert!((results[0].score - 1.0).abs() < 1e-6);
}

#[test]
fn scores_are_invariant_to_vector_magnitude() {
    let index = index_of(&[vec![2.0, 0.0], vec![0.0, 5.0]]);
    let results = index.search(&[0.5, 0.0], 2).expect("search");
    assert!((results[0].score - 1.0).abs() < 1e-6);
    assert!(results[1].score.abs() < 1e-6);
}

#[test]
fn ties_resolve_to_earliest_insertion() {
    let index = index_of(&[vec![1.0, 0.0], vec![1.0, 0.0], vec![1.0, 0.0]]);
    let results = index.search(&[1.0, 0.0], 3).expect("search");
    let texts: Vec<&str> = results.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, ["chunk-0", "chunk-1", "chunk-2"]);
}

#[test]
fn oversized_top_k_returns_every_entry() {
    let index = index_of(&[vec![1.0, 0.0], vec![0.0, 1.0]]);
    let results = index.search(&[1.0, 1.0], 100).expect("search");
    assert_eq!(results.len(), 2);
}

#[test]
fn snapshot_round_trip_preserves_chunks_and_identity() {
    let index = index_of(&[vec![1.0, 0.0], vec![0.0, 1.0]]);
    let snapshot = index.snapshot("doc_abcd1234", 2048, 3, "Page 1:\nsome text");

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("index.json");
    snapshot.write_to(&path).expect("write");

    let restored = IndexSnapshot::read_from(&path).expect("read");
    assert_eq!(restored, snapshot);
    assert_eq!(restored.document_id, "doc_abcd1234");
    assert_eq!(restored.chunks, vec!["chunk-0", "chunk-1"]);
}

#[test]
fn reading_a_malformed_snapshot_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("index.json");
    std::fs::write(&path, "not json").expect("write");
    assert!(matches!(IndexSnapshot::read_from(&path), Err(RagError::Snapshot(_))));
    assert!(matches!(
        IndexSnapshot::read_from(&dir.path().join("missing.json")),
        Err(RagError::Snapshot(_))
    ));
}

fn arb_vector() -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0, 4)
        .prop_filter("non-degenerate", |v| v.iter().map(|x| x * x).sum::<f32>().sqrt() > 0.01)
}

proptest! {
    /// Search returns at most `top_k` results with scores in descending
    /// order and within the cosine range.
    #[test]
    fn search_results_are_ranked_and_bounded(
        vectors in proptest::collection::vec(arb_vector(), 1..20),
        query in arb_vector(),
        top_k in 1usize..25,
    ) {
        let index = index_of(&vectors);
        let results = index.search(&query, top_k).expect("search");

        prop_assert_eq!(results.len(), top_k.min(vectors.len()));
        for pair in results.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
        for result in &results {
            prop_assert!(result.score >= -1.0001 && result.score <= 1.0001);
        }
    }
}
