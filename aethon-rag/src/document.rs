//! Data types for documents, chunks, and retrieval results.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// How many bytes of the content digest contribute to the fingerprint.
/// Four bytes render as eight hex characters.
const FINGERPRINT_DIGEST_BYTES: usize = 4;

/// An indexed source document.
///
/// The identity is a content-derived fingerprint; a document is immutable
/// once stored and is superseded, not mutated, by re-indexing the same
/// fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    /// Content-derived fingerprint, see [`fingerprint`].
    pub id: String,
    /// Length of the raw uploaded bytes.
    pub byte_len: usize,
    /// Number of pages that yielded extractable text.
    pub page_count: usize,
}

/// A segment of a [`Document`]'s extracted text, the unit of embedding
/// and retrieval. Generated fresh on every (re)index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Position of the chunk within the document's chunk sequence.
    pub index: usize,
    /// The text content of the chunk.
    pub text: String,
    /// The fingerprint of the parent [`Document`].
    pub document_id: String,
}

/// A retrieved excerpt paired with its similarity score. Ephemeral,
/// produced per query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalResult {
    /// The retrieved chunk text.
    pub text: String,
    /// Cosine similarity to the query, in [-1, 1].
    pub score: f32,
    /// The fingerprint of the document the excerpt came from.
    pub document_id: String,
}

/// Derive a document fingerprint from the upload filename and content.
///
/// The fingerprint is `{filename stem}_{truncated SHA-256 of content}`.
/// Two uploads with the same fingerprint supersede one another; the engine
/// holds a single active document, so collisions overwrite rather than
/// reject.
pub fn fingerprint(filename: &str, content: &[u8]) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("document");
    let digest = Sha256::digest(content);
    let short: String = digest
        .iter()
        .take(FINGERPRINT_DIGEST_BYTES)
        .map(|byte| format!("{byte:02x}"))
        .collect();
    format!("{stem}_{short}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stem_plus_truncated_digest() {
        let id = fingerprint("reports/q3-earnings.pdf", b"content");
        let (stem, digest) = id.split_once('_').expect("separator");
        assert_eq!(stem, "q3-earnings");
        assert_eq!(digest.len(), 8);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn fingerprint_is_stable_and_content_sensitive() {
        assert_eq!(fingerprint("a.pdf", b"same"), fingerprint("a.pdf", b"same"));
        assert_ne!(fingerprint("a.pdf", b"one"), fingerprint("a.pdf", b"two"));
        assert_ne!(fingerprint("a.pdf", b"same"), fingerprint("b.pdf", b"same"));
    }

    #[test]
    fn fingerprint_tolerates_odd_filenames() {
        assert!(fingerprint("", b"x").starts_with("document_"));
        assert!(fingerprint(".hidden", b"x").starts_with(".hidden_"));
    }
}
