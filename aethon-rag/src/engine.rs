//! The retrieval engine: a single-active-document orchestrator.
//!
//! The engine owns at most one indexed document at a time. Loading a new
//! document builds its index completely off to the side and then swaps it
//! in atomically, so readers either see the previous document or the new
//! one, never a half-built index. A failed load leaves the previous
//! document active.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::chunking::{Chunker, FixedSizeChunker};
use crate::config::RagConfig;
use crate::document::{Chunk, Document, RetrievalResult, fingerprint};
use crate::embedding::EmbeddingProvider;
use crate::entity::{EntityRecognizer, HeuristicRecognizer, NamedEntity};
use crate::error::{RagError, Result};
use crate::extract::extract_pages;
use crate::index::{IndexSnapshot, VectorIndex};

/// The engine's externally visible lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineStatus {
    /// No document is indexed.
    Empty,
    /// An index build is in progress. Queries against a previously
    /// active document keep working while in this state.
    Indexing,
    /// A document is indexed and queryable.
    Ready,
}

/// Summary of a completed index build, returned by
/// [`RagEngine::load`] and [`RagEngine::restore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexReport {
    /// Fingerprint of the indexed document.
    pub document_id: String,
    /// Number of chunks embedded and stored.
    pub chunk_count: usize,
    /// Number of pages that yielded text.
    pub page_count: usize,
    /// 1-based numbers of pages skipped as unextractable.
    pub skipped_pages: Vec<u32>,
}

/// The answer to a retrieval query: ranked excerpts plus a prompt-ready
/// context block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// The excerpts rendered as numbered blocks, ready to paste into a
    /// completion prompt.
    pub context: String,
    /// The underlying excerpts in rank order.
    pub excerpts: Vec<RetrievalResult>,
}

/// Everything that belongs to the currently indexed document. Replaced
/// as a unit on load, taken as a unit on clear.
struct ActiveIndex {
    document: Document,
    text: String,
    index: VectorIndex,
}

/// Resets the indexing flag when a build finishes, succeed or fail.
struct IndexingGuard<'a>(&'a AtomicBool);

impl Drop for IndexingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// A retrieval engine over a single active document.
///
/// Construct with [`RagEngine::builder`]. All methods take `&self`; the
/// engine is designed to sit behind an [`Arc`] and be shared across
/// request handlers.
pub struct RagEngine {
    config: RagConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    chunker: Box<dyn Chunker>,
    recognizer: Box<dyn EntityRecognizer>,
    active: RwLock<Option<ActiveIndex>>,
    /// Serializes index builds; queries do not take this lock.
    build_gate: Mutex<()>,
    indexing: AtomicBool,
}

impl RagEngine {
    /// Create a new builder.
    pub fn builder() -> RagEngineBuilder {
        RagEngineBuilder::default()
    }

    /// The engine's configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Extract text from `bytes`, chunk and embed it, and make the result
    /// the active document, replacing whatever was active before.
    ///
    /// The build happens without holding the active-index lock, so
    /// concurrent queries keep being served from the previous document
    /// until the swap. On failure the previous document stays active.
    ///
    /// # Errors
    ///
    /// - [`RagError::Extraction`] if `bytes` are not a readable document.
    /// - [`RagError::Embedding`] if the embedding provider fails.
    pub async fn load(&self, filename: &str, bytes: &[u8]) -> Result<IndexReport> {
        let _gate = self.build_gate.lock().await;
        self.indexing.store(true, Ordering::SeqCst);
        let _guard = IndexingGuard(&self.indexing);

        let document_id = fingerprint(filename, bytes);
        info!(document_id = %document_id, bytes = bytes.len(), "indexing document");

        let extracted = extract_pages(bytes)?;
        if !extracted.skipped_pages.is_empty() {
            warn!(
                document_id = %document_id,
                skipped = extracted.skipped_pages.len(),
                "some pages could not be extracted"
            );
        }

        let text = extracted.joined_text();
        let chunks = self.chunker.chunk(&text);
        debug!(document_id = %document_id, chunk_count = chunks.len(), "chunked document");

        let index = self.build_index(&chunks).await?;
        let document = Document {
            id: document_id.clone(),
            byte_len: bytes.len(),
            page_count: extracted.page_count(),
        };
        let report = IndexReport {
            document_id,
            chunk_count: index.len(),
            page_count: extracted.page_count(),
            skipped_pages: extracted.skipped_pages.clone(),
        };

        let mut active = self.active.write().await;
        if let Some(previous) = active.as_ref() {
            info!(
                previous = %previous.document.id,
                replacement = %document.id,
                "replacing active document"
            );
        }
        *active = Some(ActiveIndex { document, text, index });

        info!(
            document_id = %report.document_id,
            chunks = report.chunk_count,
            pages = report.page_count,
            "document indexed"
        );
        Ok(report)
    }

    /// Retrieve the excerpts most similar to `query` from the active
    /// document.
    ///
    /// `top_k` overrides the configured excerpt count when given; a value
    /// larger than the index returns every chunk.
    ///
    /// # Errors
    ///
    /// - [`RagError::NotReady`] if no document is active.
    /// - [`RagError::Embedding`] if embedding the query fails.
    pub async fn query(&self, query: &str, top_k: Option<usize>) -> Result<QueryResponse> {
        let active = self.active.read().await;
        // checked before embedding so a missing document costs no API call
        let active = active.as_ref().ok_or(RagError::NotReady)?;

        let embedding = self.embedder.embed(query).await?;
        let top_k = top_k.unwrap_or(self.config.top_k);
        let scored = active.index.search(&embedding, top_k)?;

        let excerpts: Vec<RetrievalResult> = scored
            .into_iter()
            .map(|s| RetrievalResult {
                text: s.text,
                score: s.score,
                document_id: active.document.id.clone(),
            })
            .collect();
        let context = render_context(&excerpts);

        debug!(
            document_id = %active.document.id,
            excerpts = excerpts.len(),
            "query served"
        );
        Ok(QueryResponse { context, excerpts })
    }

    /// Drop the active document and its index. Idempotent; returns the
    /// document that was cleared, if any.
    pub async fn clear(&self) -> Option<Document> {
        let cleared = self.active.write().await.take();
        if let Some(active) = &cleared {
            info!(document_id = %active.document.id, "cleared active document");
        }
        cleared.map(|active| active.document)
    }

    /// The engine's current lifecycle state.
    pub async fn status(&self) -> EngineStatus {
        if self.indexing.load(Ordering::SeqCst) {
            return EngineStatus::Indexing;
        }
        if self.active.read().await.is_some() { EngineStatus::Ready } else { EngineStatus::Empty }
    }

    /// The active document's metadata, if one is indexed.
    pub async fn document(&self) -> Option<Document> {
        self.active.read().await.as_ref().map(|active| active.document.clone())
    }

    /// The active document's chunks in index order.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NotReady`] if no document is active.
    pub async fn chunks(&self) -> Result<Vec<Chunk>> {
        let active = self.active.read().await;
        let active = active.as_ref().ok_or(RagError::NotReady)?;
        Ok(active
            .index
            .texts()
            .enumerate()
            .map(|(index, text)| Chunk {
                index,
                text: text.to_string(),
                document_id: active.document.id.clone(),
            })
            .collect())
    }

    /// Extract the most frequent named entities from the active document's
    /// text.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NotReady`] if no document is active.
    pub async fn entities(&self, top_k: usize) -> Result<Vec<NamedEntity>> {
        let active = self.active.read().await;
        let active = active.as_ref().ok_or(RagError::NotReady)?;
        Ok(self.recognizer.extract(&active.text, top_k))
    }

    /// Extract named entities from caller-supplied text, without touching
    /// the active document.
    pub fn extract_entities(&self, text: &str, top_k: usize) -> Vec<NamedEntity> {
        self.recognizer.extract(text, top_k)
    }

    /// Write a snapshot of the active index to `path`.
    ///
    /// Vectors are not persisted; [`restore`](RagEngine::restore)
    /// re-embeds every chunk.
    ///
    /// # Errors
    ///
    /// - [`RagError::NotReady`] if no document is active.
    /// - [`RagError::Snapshot`] on I/O failure.
    pub async fn persist(&self, path: &Path) -> Result<()> {
        let active = self.active.read().await;
        let active = active.as_ref().ok_or(RagError::NotReady)?;
        let snapshot = active.index.snapshot(
            &active.document.id,
            active.document.byte_len,
            active.document.page_count,
            &active.text,
        );
        snapshot.write_to(path)?;
        info!(document_id = %active.document.id, path = %path.display(), "snapshot written");
        Ok(())
    }

    /// Rebuild the active index from a snapshot written by
    /// [`persist`](RagEngine::persist), re-embedding every chunk.
    ///
    /// # Errors
    ///
    /// - [`RagError::Snapshot`] if the file is unreadable, malformed, or
    ///   holds no chunks.
    /// - [`RagError::Embedding`] if re-embedding fails.
    pub async fn restore(&self, path: &Path) -> Result<IndexReport> {
        let _gate = self.build_gate.lock().await;
        self.indexing.store(true, Ordering::SeqCst);
        let _guard = IndexingGuard(&self.indexing);

        let snapshot = IndexSnapshot::read_from(path)?;
        if snapshot.chunks.is_empty() {
            return Err(RagError::Snapshot("snapshot holds no chunks".to_string()));
        }
        info!(
            document_id = %snapshot.document_id,
            chunks = snapshot.chunks.len(),
            "restoring snapshot"
        );

        let index = self.build_index(&snapshot.chunks).await?;
        let document = Document {
            id: snapshot.document_id.clone(),
            byte_len: snapshot.byte_len,
            page_count: snapshot.page_count,
        };
        let report = IndexReport {
            document_id: snapshot.document_id,
            chunk_count: index.len(),
            page_count: snapshot.page_count,
            skipped_pages: Vec::new(),
        };

        let mut active = self.active.write().await;
        *active = Some(ActiveIndex { document, text: snapshot.source_text, index });
        Ok(report)
    }

    async fn build_index(&self, chunks: &[String]) -> Result<VectorIndex> {
        let texts: Vec<&str> = chunks.iter().map(String::as_str).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let mut index = VectorIndex::with_capacity(chunks.len());
        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            index.insert(chunk.clone(), embedding)?;
        }
        Ok(index)
    }
}

/// Render ranked excerpts as numbered blocks separated by blank lines.
fn render_context(excerpts: &[RetrievalResult]) -> String {
    excerpts
        .iter()
        .enumerate()
        .map(|(i, excerpt)| format!("[Excerpt {}]:\n{}", i + 1, excerpt.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Builder for [`RagEngine`].
///
/// An embedding provider is required; chunker and entity recognizer
/// default to [`FixedSizeChunker`] and [`HeuristicRecognizer`].
#[derive(Default)]
pub struct RagEngineBuilder {
    config: Option<RagConfig>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    chunker: Option<Box<dyn Chunker>>,
    recognizer: Option<Box<dyn EntityRecognizer>>,
}

impl RagEngineBuilder {
    /// Set the engine configuration. Defaults to [`RagConfig::default`].
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider. Required.
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Override the chunking strategy.
    pub fn chunker(mut self, chunker: Box<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Override the entity recognizer.
    pub fn recognizer(mut self, recognizer: Box<dyn EntityRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    /// Build the engine.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if no embedding provider was set.
    pub fn build(self) -> Result<RagEngine> {
        let config = self.config.unwrap_or_default();
        let embedder = self
            .embedder
            .ok_or_else(|| RagError::Config("an embedding provider is required".to_string()))?;
        let chunker = self.chunker.unwrap_or_else(|| {
            Box::new(FixedSizeChunker::new(config.chunk_size, config.chunk_overlap))
        });
        let recognizer = match self.recognizer {
            Some(recognizer) => recognizer,
            None => Box::new(HeuristicRecognizer::new()?),
        };

        Ok(RagEngine {
            config,
            embedder,
            chunker,
            recognizer,
            active: RwLock::new(None),
            build_gate: Mutex::new(()),
            indexing: AtomicBool::new(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_blocks_are_numbered_from_one() {
        let excerpts = vec![
            RetrievalResult { text: "alpha".into(), score: 0.9, document_id: "d_1".into() },
            RetrievalResult { text: "beta".into(), score: 0.5, document_id: "d_1".into() },
        ];
        assert_eq!(render_context(&excerpts), "[Excerpt 1]:\nalpha\n\n[Excerpt 2]:\nbeta");
    }

    #[test]
    fn empty_excerpts_render_empty_context() {
        assert_eq!(render_context(&[]), "");
    }
}
