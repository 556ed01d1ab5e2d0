//! # docrag
//!
//! PDF ingestion and retrieval-augmented generation over a
//! Chroma-compatible vector store.
//!
//! The crate covers the document pipeline of a RAG system: PDF-to-text
//! extraction with a repair pass, paragraph-aware chunking with overlap,
//! order-preserving batch embedding, vector-store upsert and similarity
//! search, and consistent document deletion across the blob store and the
//! vector index. The HTTP layer, chat UI, and the services themselves
//! (embedding, generation, similarity search) are external collaborators
//! reached through the traits defined here.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docrag::{
//!     ChromaVectorStore, DocumentLifecycle, FsBlobStore, GeminiClient,
//!     RagConfig, RagPipeline,
//! };
//!
//! let gemini = Arc::new(GeminiClient::from_env()?);
//! let store = Arc::new(ChromaVectorStore::default_url());
//! let blobs = Arc::new(FsBlobStore::new("uploads"));
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(gemini.clone())
//!     .generation_provider(gemini)
//!     .vector_store(store.clone())
//!     .blob_store(blobs.clone())
//!     .build()?;
//!
//! let report = pipeline.ingest("paper.pdf", &pdf_bytes).await?;
//! let answer = pipeline.ask("what is the main finding?", 5).await?;
//!
//! let lifecycle = DocumentLifecycle::new(store, blobs, "documents");
//! lifecycle.delete_document(&report.document_id).await?;
//! ```

pub mod blobstore;
pub mod chroma;
pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod gemini;
pub mod generation;
pub mod inmemory;
pub mod lifecycle;
pub mod pipeline;
pub mod vectorstore;

pub use blobstore::{BlobStore, FsBlobStore};
pub use chroma::ChromaVectorStore;
pub use chunking::ParagraphChunker;
pub use config::{DEFAULT_COLLECTION, RagConfig, RagConfigBuilder};
pub use document::{
    ChunkMetadata, ChunkRecord, DocumentSummary, IngestReport, RagAnswer, RetrievedChunk,
    RetrievedContext,
};
pub use embedding::EmbeddingProvider;
pub use error::{BlobStoreOp, RagError, Result, VectorStoreOp};
pub use extract::extract_text;
pub use gemini::GeminiClient;
pub use generation::GenerationProvider;
pub use inmemory::InMemoryVectorStore;
pub use lifecycle::{ClearOutcome, DeleteReport, DocumentLifecycle, ReconcileReport};
pub use pipeline::{RagPipeline, RagPipelineBuilder};
pub use vectorstore::VectorStore;
