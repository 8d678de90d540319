//! Error types for the `aethon-rag` crate.

use thiserror::Error;

/// Errors that can occur in document indexing and retrieval operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// The uploaded bytes are not a well-formed document, or no page
    /// yielded any extractable text.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// The embedding provider failed (network, rate limit, malformed
    /// response). Surfaced as-is; retry policy belongs to the caller.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A vector's dimensionality does not match the index's established
    /// dimensionality. Always a defect, never expected in normal operation.
    #[error("Dimension mismatch: index holds {expected}-dimensional vectors, got {actual}")]
    DimensionMismatch {
        /// The dimensionality established by the first inserted vector.
        expected: usize,
        /// The dimensionality of the offending vector.
        actual: usize,
    },

    /// A zero-magnitude vector was supplied; cosine similarity is
    /// undefined for it.
    #[error("Degenerate vector: zero magnitude makes cosine similarity undefined")]
    DegenerateVector,

    /// A query was issued while no index is active. Recoverable by
    /// retrying after a successful load.
    #[error("No document is currently indexed")]
    NotReady,

    /// A search was issued against an index holding no vectors.
    #[error("The active index contains no vectors")]
    EmptyIndex,

    /// Reading or writing an index snapshot failed.
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
