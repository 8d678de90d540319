//! Document retrieval for the Aethon assistant.
//!
//! This crate turns an uploaded PDF into a queryable in-memory vector
//! index and answers similarity queries with prompt-ready excerpt blocks.
//! The pipeline is: extract page text, split it into overlapping
//! fixed-size chunks, embed each chunk, and store the vectors in an exact
//! cosine index. A [`RagEngine`] holds at most one indexed document at a
//! time and swaps replacements in atomically.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use aethon_rag::{OpenAIEmbeddingProvider, RagEngine};
//!
//! # async fn run() -> aethon_rag::Result<()> {
//! let engine = RagEngine::builder()
//!     .embedder(Arc::new(OpenAIEmbeddingProvider::from_env()?))
//!     .build()?;
//!
//! let bytes = std::fs::read("report.pdf").expect("readable file");
//! let report = engine.load("report.pdf", &bytes).await?;
//! println!("indexed {} chunks", report.chunk_count);
//!
//! let response = engine.query("What were the key findings?", None).await?;
//! println!("{}", response.context);
//! # Ok(())
//! # }
//! ```

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod engine;
pub mod entity;
pub mod error;
pub mod extract;
pub mod index;
pub mod openai;

pub use chunking::{Chunker, FixedSizeChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Chunk, Document, RetrievalResult, fingerprint};
pub use embedding::EmbeddingProvider;
pub use engine::{EngineStatus, IndexReport, QueryResponse, RagEngine, RagEngineBuilder};
pub use entity::{EntityLabel, EntityRecognizer, HeuristicRecognizer, NamedEntity};
pub use error::{RagError, Result};
pub use extract::{ExtractedDocument, PageText, extract_pages};
pub use index::{IndexSnapshot, ScoredText, VectorIndex};
pub use openai::OpenAIEmbeddingProvider;
