//! Vector store gateway trait.
//!
//! Abstracts upsert/query/delete/list operations against an external
//! similarity-search service, keyed by a logical collection name. Transport
//! failures are wrapped with a stable [`VectorStoreOp`](crate::error::VectorStoreOp)
//! kind; nothing is retried here — retry policy belongs to the caller.

use async_trait::async_trait;

use crate::document::{ChunkRecord, DocumentSummary, RetrievedChunk};
use crate::error::Result;

/// A storage backend for chunk embeddings with similarity search.
///
/// # Example
///
/// ```rust,ignore
/// use docrag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.ensure_collection("documents").await?;
/// store.upsert("documents", &records).await?;
/// let hits = store.query("documents", &query_embedding, 5).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Idempotently get or create a named collection.
    ///
    /// Must not error if the collection already exists; otherwise creates
    /// it with the service-default schema.
    async fn ensure_collection(&self, name: &str) -> Result<()>;

    /// Insert or overwrite chunk records.
    ///
    /// Records are identified by their composite id
    /// `"<documentId>:<ordinalIndex>"`; overwriting an existing id is an
    /// error-free replace, which keeps retried ingestions safe.
    async fn upsert(&self, collection: &str, records: &[ChunkRecord]) -> Result<()>;

    /// Return at most `top_k` nearest records, ordered by ascending
    /// distance (most similar first).
    ///
    /// An empty or missing collection yields an empty result sequence,
    /// not an error.
    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>>;

    /// Scan record metadata and return one summary per distinct document
    /// with an aggregated chunk count.
    ///
    /// A collection that does not exist yet yields an empty list.
    async fn list_documents(&self, collection: &str) -> Result<Vec<DocumentSummary>>;

    /// Delete all records belonging to `document_id`; returns the number
    /// of records removed. Zero matches is a successful no-op.
    async fn delete_document(&self, collection: &str, document_id: &str) -> Result<usize>;

    /// Destroy the entire collection in a single operation. A non-existent
    /// collection is a successful no-op.
    async fn clear_collection(&self, collection: &str) -> Result<()>;
}
