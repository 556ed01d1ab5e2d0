//! Configuration for the RAG pipeline.
//!
//! A [`RagConfig`] is constructed once at process start and passed by
//! reference into each pipeline component. Service endpoints and API keys
//! belong to the concrete providers ([`ChromaVectorStore`](crate::chroma::ChromaVectorStore),
//! [`GeminiClient`](crate::gemini::GeminiClient)), not here — there is no
//! ambient global lookup.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// The default collection name for chunk records.
pub const DEFAULT_COLLECTION: &str = "documents";

/// Configuration parameters for ingestion and retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Logical vector store collection holding chunk records.
    pub collection: String,
    /// Target chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters carried between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of nearest chunks to retrieve per query.
    pub top_k: usize,
    /// Maximum number of concurrent embedding calls during ingestion.
    pub embed_concurrency: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
            chunk_size: 1200,
            chunk_overlap: 200,
            top_k: 5,
            embed_concurrency: 8,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the collection name.
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.config.collection = name.into();
        self
    }

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

    /// Set the number of nearest chunks to retrieve per query.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the embedding fan-out limit for ingestion.
    pub fn embed_concurrency(mut self, limit: usize) -> Self {
        self.config.embed_concurrency = limit;
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
    /// - `embed_concurrency == 0`
    /// - `collection` is empty
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
        if self.config.embed_concurrency == 0 {
            return Err(RagError::Config(
                "embed_concurrency must be greater than zero".to_string(),
            ));
        }
        if self.config.collection.is_empty() {
            return Err(RagError::Config("collection name must not be empty".to_string()));
        }
        Ok(self.config)
    }
}
