//! Ingestion and retrieval orchestration.
//!
//! [`RagPipeline`] composes an [`EmbeddingProvider`], a [`VectorStore`], a
//! [`BlobStore`], and a [`GenerationProvider`] into the two core
//! workflows: ingest (extract → chunk → embed → upsert → persist blob) and
//! ask (embed query → similarity search → assemble context → generate).
//!
//! # Example
//!
//! ```rust,ignore
//! use docrag::{RagPipeline, RagConfig, InMemoryVectorStore, FsBlobStore};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(gemini.clone())
//!     .generation_provider(gemini)
//!     .vector_store(Arc::new(ChromaVectorStore::default_url()))
//!     .blob_store(Arc::new(FsBlobStore::new("uploads")))
//!     .build()?;
//!
//! let report = pipeline.ingest("paper.pdf", &bytes).await?;
//! let answer = pipeline.ask("what is the main finding?", 5).await?;
//! ```

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::blobstore::BlobStore;
use crate::chunking::ParagraphChunker;
use crate::config::RagConfig;
use crate::document::{
    ChunkMetadata, ChunkRecord, IngestReport, RagAnswer, RetrievedContext,
};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::extract;
use crate::generation::GenerationProvider;
use crate::vectorstore::VectorStore;

/// Delimiter between sources in the assembled context string.
const SOURCE_DELIMITER: &str = "\n\n---\n\n";

/// The ingestion and retrieval orchestrator.
///
/// Construct one via [`RagPipeline::builder()`]. All collaborators are
/// passed in explicitly; the pipeline holds no ambient global state, and
/// a pipeline instance is safe to share across concurrent tasks.
pub struct RagPipeline {
    config: RagConfig,
    chunker: ParagraphChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn GenerationProvider>,
    store: Arc<dyn VectorStore>,
    blobs: Arc<dyn BlobStore>,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the vector store.
    pub fn vector_store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// Return a reference to the blob store.
    pub fn blob_store(&self) -> &Arc<dyn BlobStore> {
        &self.blobs
    }

    /// Ingest an uploaded PDF: extract → chunk → embed → upsert → persist.
    ///
    /// A fresh document identifier is generated per upload; re-uploading
    /// the same file creates a new document. Any failing step aborts the
    /// remaining ones — in particular, the blob is only persisted after a
    /// successful upsert, and a blob-persist failure still fails the whole
    /// ingestion even though vector data exists by then (recoverable via
    /// [`DocumentLifecycle::delete_document`](crate::lifecycle::DocumentLifecycle::delete_document)
    /// or [`reconcile`](crate::lifecycle::DocumentLifecycle::reconcile)).
    ///
    /// # Errors
    ///
    /// - [`RagError::Extraction`] if the bytes cannot be parsed as a PDF
    ///   even after the repair pass.
    /// - [`RagError::EmptyContent`] if chunking produces zero chunks
    ///   (e.g. an image-only PDF); nothing is written in that case.
    /// - [`RagError::Embedding`], [`RagError::VectorStore`], or
    ///   [`RagError::BlobStore`] from the downstream services.
    pub async fn ingest(&self, file_name: &str, bytes: &[u8]) -> Result<IngestReport> {
        let text = extract::extract_text(bytes)?;

        let chunks = self.chunker.chunk(&text);
        if chunks.is_empty() {
            info!(file.name = file_name, "no extractable text, rejecting upload");
            return Err(RagError::EmptyContent);
        }

        let document_id = Uuid::new_v4().to_string();
        let created_at = Utc::now();

        let texts: Vec<&str> = chunks.iter().map(String::as_str).collect();
        let embeddings =
            self.embedder.embed_batch(&texts, self.config.embed_concurrency).await.map_err(
                |e| {
                    error!(document.id = %document_id, error = %e, "embedding failed during ingestion");
                    e
                },
            )?;

        let records: Vec<ChunkRecord> = chunks
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(ordinal_index, (text, embedding))| ChunkRecord {
                id: ChunkRecord::composite_id(&document_id, ordinal_index),
                text,
                embedding,
                metadata: ChunkMetadata {
                    document_id: document_id.clone(),
                    ordinal_index,
                    file_name: file_name.to_string(),
                    created_at,
                },
            })
            .collect();

        self.store.ensure_collection(&self.config.collection).await?;
        self.store.upsert(&self.config.collection, &records).await.map_err(|e| {
            error!(document.id = %document_id, error = %e, "upsert failed during ingestion");
            e
        })?;

        self.blobs.put(&document_id, bytes).await.map_err(|e| {
            // Vector data exists at this point; the caller may reconcile
            // via delete-by-document.
            error!(document.id = %document_id, error = %e, "blob persistence failed after upsert");
            e
        })?;

        let chunk_count = records.len();
        info!(document.id = %document_id, file.name = file_name, chunk_count, "ingested document");

        Ok(IngestReport { document_id, file_name: file_name.to_string(), chunk_count })
    }

    /// Retrieve context for a question: embed → search → assemble.
    ///
    /// `top_k` is clamped to at least 1. Each retrieved chunk is prefixed
    /// with a numbered source label (file name if present, else document
    /// id), rank 1 being the closest match. Zero matching chunks is not
    /// an error — the context is simply empty.
    pub async fn retrieve(&self, question: &str, top_k: usize) -> Result<RetrievedContext> {
        let top_k = top_k.max(1);

        let query_embedding = self.embedder.embed(question).await.map_err(|e| {
            error!(error = %e, "query embedding failed");
            e
        })?;

        let hits = self.store.query(&self.config.collection, &query_embedding, top_k).await?;

        let context = hits
            .iter()
            .enumerate()
            .map(|(i, hit)| format!("Source {} ({}):\n{}", i + 1, hit.metadata.source_label(), hit.text))
            .collect::<Vec<_>>()
            .join(SOURCE_DELIMITER);
        let sources = hits.into_iter().map(|hit| hit.metadata).collect();

        Ok(RetrievedContext { context, sources })
    }

    /// Answer a question over the indexed documents.
    ///
    /// Retrieves context ([`retrieve`](Self::retrieve)), hands it to the
    /// generation service together with the question, and returns the
    /// response verbatim along with the ordered source metadata. How to
    /// respond to an empty context is the generation prompt's decision,
    /// not this pipeline's.
    pub async fn ask(&self, question: &str, top_k: usize) -> Result<RagAnswer> {
        let retrieved = self.retrieve(question, top_k).await?;

        let prompt = answer_prompt(&retrieved.context, question);
        let answer = self.generator.complete(&prompt).await.map_err(|e| {
            error!(error = %e, "generation failed");
            e
        })?;

        info!(source_count = retrieved.sources.len(), "answered question");
        Ok(RagAnswer { answer, sources: retrieved.sources })
    }
}

/// Build the answer-from-context prompt handed to the generation service.
fn answer_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a helpful assistant. Use ONLY the context to answer the user's question.\n\
         If the answer is not contained in the context, say you don't know based on the provided documents.\n\n\
         Context:\n\"\"\"\n{context}\n\"\"\"\n\n\
         Question: {question}\n"
    )
}

/// Builder for constructing a [`RagPipeline`].
///
/// All fields except `config` are required; `config` falls back to
/// [`RagConfig::default()`].
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    generator: Option<Arc<dyn GenerationProvider>>,
    store: Option<Arc<dyn VectorStore>>,
    blobs: Option<Arc<dyn BlobStore>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(provider);
        self
    }

    /// Set the generation provider.
    pub fn generation_provider(mut self, provider: Arc<dyn GenerationProvider>) -> Self {
        self.generator = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the blob store backend.
    pub fn blob_store(mut self, blobs: Arc<dyn BlobStore>) -> Self {
        self.blobs = Some(blobs);
        self
    }

    /// Build the [`RagPipeline`], validating that all required fields are
    /// set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if any required collaborator is
    /// missing.
    pub fn build(self) -> Result<RagPipeline> {
        let config = self.config.unwrap_or_default();
        let embedder = self
            .embedder
            .ok_or_else(|| RagError::Config("embedding_provider is required".to_string()))?;
        let generator = self
            .generator
            .ok_or_else(|| RagError::Config("generation_provider is required".to_string()))?;
        let store =
            self.store.ok_or_else(|| RagError::Config("vector_store is required".to_string()))?;
        let blobs =
            self.blobs.ok_or_else(|| RagError::Config("blob_store is required".to_string()))?;

        let chunker = ParagraphChunker::new(config.chunk_size, config.chunk_overlap);

        Ok(RagPipeline { config, chunker, embedder, generator, store, blobs })
    }
}
