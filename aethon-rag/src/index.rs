//! Brute-force exact cosine vector index with a durable snapshot.
//!
//! The index is an insertion-ordered collection of (text, vector) pairs.
//! Search is exact: every stored vector is scored against the query and
//! results are ranked by descending cosine similarity, with ties broken
//! by ascending insertion order. This is correct and fast enough at the
//! scale of a single document's chunks; there is deliberately no
//! approximate-nearest-neighbor structure.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// One stored (text, vector) pair.
#[derive(Debug, Clone)]
struct Entry {
    text: String,
    embedding: Vec<f32>,
}

/// A chunk text paired with its similarity score, produced by
/// [`VectorIndex::search`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredText {
    /// The stored chunk text.
    pub text: String,
    /// Cosine similarity to the query, in [-1, 1].
    pub score: f32,
}

/// An insertion-ordered exact cosine similarity index.
///
/// Dimensionality is established by the first inserted vector; every
/// later insert and every query must match it. Zero-magnitude vectors
/// are rejected at insert time so that search never divides by zero.
#[derive(Debug, Default)]
pub struct VectorIndex {
    entries: Vec<Entry>,
    dimensions: Option<usize>,
}

impl VectorIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty index with space for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity), dimensions: None }
    }

    /// Number of stored (text, vector) pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The established dimensionality, or `None` before the first insert.
    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    /// Iterate over stored chunk texts in insertion order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.text.as_str())
    }

    /// Append a (text, vector) pair.
    ///
    /// # Errors
    ///
    /// - [`RagError::DimensionMismatch`] if `embedding` does not match the
    ///   index's established dimensionality.
    /// - [`RagError::DegenerateVector`] if `embedding` has zero magnitude.
    pub fn insert(&mut self, text: impl Into<String>, embedding: Vec<f32>) -> Result<()> {
        if l2_norm(&embedding) == 0.0 {
            return Err(RagError::DegenerateVector);
        }
        match self.dimensions {
            Some(expected) if expected != embedding.len() => {
                return Err(RagError::DimensionMismatch { expected, actual: embedding.len() });
            }
            Some(_) => {}
            None => self.dimensions = Some(embedding.len()),
        }
        self.entries.push(Entry { text: text.into(), embedding });
        Ok(())
    }

    /// Return up to `top_k` entries ranked by descending cosine similarity
    /// to `query`, ties broken by ascending insertion order.
    ///
    /// `top_k == 0` yields an empty result, not an error. `top_k` larger
    /// than the index returns every entry.
    ///
    /// # Errors
    ///
    /// - [`RagError::EmptyIndex`] if no vectors are stored.
    /// - [`RagError::DimensionMismatch`] if `query` does not match the
    ///   index's dimensionality.
    /// - [`RagError::DegenerateVector`] if `query` has zero magnitude.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<ScoredText>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }
        if self.entries.is_empty() {
            return Err(RagError::EmptyIndex);
        }
        // dimensions is always Some once entries is non-empty
        if let Some(expected) = self.dimensions {
            if expected != query.len() {
                return Err(RagError::DimensionMismatch { expected, actual: query.len() });
            }
        }
        let query_norm = l2_norm(query);
        if query_norm == 0.0 {
            return Err(RagError::DegenerateVector);
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| {
                let dot: f32 =
                    entry.embedding.iter().zip(query.iter()).map(|(x, y)| x * y).sum();
                // entry norms are non-zero, guaranteed at insert
                (position, dot / (l2_norm(&entry.embedding) * query_norm))
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0))
        });
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(position, score)| ScoredText {
                text: self.entries[position].text.clone(),
                score,
            })
            .collect())
    }

    /// Capture a durable snapshot of the index contents.
    ///
    /// Vectors are not persisted; restoring a snapshot re-embeds every
    /// chunk, so reload cost equals initial index cost.
    pub fn snapshot(&self, document_id: &str, byte_len: usize, page_count: usize, source_text: &str) -> IndexSnapshot {
        IndexSnapshot {
            document_id: document_id.to_string(),
            byte_len,
            page_count,
            source_text: source_text.to_string(),
            chunks: self.texts().map(str::to_string).collect(),
        }
    }
}

fn l2_norm(vector: &[f32]) -> f32 {
    vector.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// A durable, reloadable serialization of an index's chunk data.
///
/// Contains the document identity and the ordered chunk texts; the
/// round trip through [`write_to`](IndexSnapshot::write_to) and
/// [`read_from`](IndexSnapshot::read_from) is lossless for chunk text
/// and ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    /// Fingerprint of the snapshotted document.
    pub document_id: String,
    /// Length of the document's raw bytes.
    pub byte_len: usize,
    /// Number of pages that yielded text.
    pub page_count: usize,
    /// The full extracted text the chunks were cut from.
    pub source_text: String,
    /// Ordered chunk texts.
    pub chunks: Vec<String>,
}

impl IndexSnapshot {
    /// Write the snapshot as JSON to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Snapshot`] on I/O or serialization failure.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .map_err(|e| RagError::Snapshot(format!("failed to create {}: {e}", path.display())))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self)
            .map_err(|e| RagError::Snapshot(format!("failed to serialize snapshot: {e}")))?;
        writer
            .flush()
            .map_err(|e| RagError::Snapshot(format!("failed to flush {}: {e}", path.display())))
    }

    /// Read a snapshot previously written with [`write_to`](IndexSnapshot::write_to).
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Snapshot`] on I/O or deserialization failure.
    pub fn read_from(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| RagError::Snapshot(format!("failed to open {}: {e}", path.display())))?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| RagError::Snapshot(format!("failed to parse snapshot: {e}")))
    }
}
