//! Configuration for the retrieval engine.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Configuration parameters for chunking and retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RagConfig {
    /// Target chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Default number of excerpts to retrieve per query.
    pub top_k: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self { chunk_size: 500, chunk_overlap: 50, top_k: 3 }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Build a configuration from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// Recognized variables: `AETHON_CHUNK_SIZE`, `AETHON_CHUNK_OVERLAP`,
    /// `AETHON_TOP_K`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if a variable is set but not a valid
    /// integer, or if the resulting parameters are inconsistent.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder();
        if let Ok(value) = std::env::var("AETHON_CHUNK_SIZE") {
            builder = builder.chunk_size(parse_env("AETHON_CHUNK_SIZE", &value)?);
        }
        if let Ok(value) = std::env::var("AETHON_CHUNK_OVERLAP") {
            builder = builder.chunk_overlap(parse_env("AETHON_CHUNK_OVERLAP", &value)?);
        }
        if let Ok(value) = std::env::var("AETHON_TOP_K") {
            builder = builder.top_k(parse_env("AETHON_TOP_K", &value)?);
        }
        builder.build()
    }
}

fn parse_env(key: &str, value: &str) -> Result<usize> {
    value
        .parse()
        .map_err(|_| RagError::Config(format!("{key} must be a non-negative integer, got '{value}'")))
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the target chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the default number of excerpts retrieved per query.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    pub fn build(self) -> Result<RagConfig> {
        if self.config.chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be greater than zero".to_string()));
        }
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_upload_pipeline_parameters() {
        let config = RagConfig::default();
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.chunk_overlap, 50);
        assert_eq!(config.top_k, 3);
    }

    #[test]
    fn builder_rejects_overlap_not_less_than_size() {
        let err = RagConfig::builder().chunk_size(10).chunk_overlap(10).build();
        assert!(matches!(err, Err(RagError::Config(_))));
    }

    #[test]
    fn builder_rejects_zero_top_k() {
        let err = RagConfig::builder().top_k(0).build();
        assert!(matches!(err, Err(RagError::Config(_))));
    }
}
