//! Data types for chunk records, retrieval results, and surfaced reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata attached to every chunk record in the vector store.
///
/// The wire keys (`documentId`, `ordinalIndex`, `fileName`, `createdAt`)
/// are the stable metadata map contract shared with the vector store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkMetadata {
    /// The owning document identifier.
    #[serde(rename = "documentId")]
    pub document_id: String,
    /// 0-based position of the chunk within its document. Dense and
    /// contiguous per document; defines retrieval citation order.
    #[serde(rename = "ordinalIndex")]
    pub ordinal_index: usize,
    /// Original upload file name.
    #[serde(rename = "fileName")]
    pub file_name: String,
    /// Ingestion timestamp of the owning document.
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl ChunkMetadata {
    /// Human-readable source label: the file name if present, otherwise
    /// the document identifier.
    pub fn source_label(&self) -> &str {
        if self.file_name.is_empty() { &self.document_id } else { &self.file_name }
    }
}

/// A chunk ready for (or retrieved from) the vector store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkRecord {
    /// Composite identity `"<documentId>:<ordinalIndex>"`, unique across
    /// the vector store.
    pub id: String,
    /// The chunk's text content.
    pub text: String,
    /// The embedding vector for `text`. Fixed dimension, set once at
    /// ingestion, never mutated.
    pub embedding: Vec<f32>,
    /// Chunk metadata.
    pub metadata: ChunkMetadata,
}

impl ChunkRecord {
    /// Build the composite record id for a document's chunk.
    pub fn composite_id(document_id: &str, ordinal_index: usize) -> String {
        format!("{document_id}:{ordinal_index}")
    }
}

/// A retrieved chunk paired with its distance to the query embedding.
///
/// Ephemeral: produced by similarity search, never persisted. Lower
/// distance means more similar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// The chunk's text content.
    pub text: String,
    /// The chunk's metadata, used for citation display.
    pub metadata: ChunkMetadata,
    /// Distance between the chunk and the query embedding.
    pub distance: f32,
}

/// One stored document, summarized from its chunk metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    /// The document identifier.
    pub document_id: String,
    /// Original upload file name.
    pub file_name: String,
    /// Number of chunks stored for this document.
    pub chunk_count: usize,
    /// Ingestion timestamp.
    pub created_at: DateTime<Utc>,
}

/// The surfaced result of a successful ingestion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    /// The freshly generated document identifier.
    pub document_id: String,
    /// Original upload file name.
    pub file_name: String,
    /// Number of chunks produced and upserted.
    pub chunk_count: usize,
}

/// Assembled retrieval context and the metadata of its sources, in rank
/// order (rank 1 = closest).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedContext {
    /// The concatenated, source-labelled context string.
    pub context: String,
    /// Metadata of each retrieved chunk, ordered by ascending distance.
    pub sources: Vec<ChunkMetadata>,
}

/// The surfaced result of a retrieval-augmented generation query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagAnswer {
    /// The generation service's response, verbatim.
    pub answer: String,
    /// Metadata of the retrieved chunks backing the answer, in rank order.
    pub sources: Vec<ChunkMetadata>,
}
