//! Error types for the `docrag` crate.

use std::fmt;

use thiserror::Error;

/// Identifies which vector store operation failed.
///
/// The display form is a stable kind string (`collection-create`, `upsert`,
/// `query`, `list`, `delete`, `clear`) so callers can branch on it without
/// parsing the underlying message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorStoreOp {
    /// Resolving or creating a collection.
    CollectionCreate,
    /// Inserting or overwriting chunk records.
    Upsert,
    /// Similarity search.
    Query,
    /// Scanning record metadata for document summaries.
    List,
    /// Deleting records by id.
    Delete,
    /// Destroying a whole collection.
    Clear,
}

impl fmt::Display for VectorStoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            VectorStoreOp::CollectionCreate => "collection-create",
            VectorStoreOp::Upsert => "upsert",
            VectorStoreOp::Query => "query",
            VectorStoreOp::List => "list",
            VectorStoreOp::Delete => "delete",
            VectorStoreOp::Clear => "clear",
        };
        f.write_str(kind)
    }
}

/// Identifies which blob store operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobStoreOp {
    /// Persisting file bytes.
    Put,
    /// Reading file bytes back.
    Get,
    /// Removing a stored file.
    Delete,
    /// Enumerating stored document ids.
    List,
}

impl fmt::Display for BlobStoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            BlobStoreOp::Put => "put",
            BlobStoreOp::Get => "get",
            BlobStoreOp::Delete => "delete",
            BlobStoreOp::List => "list",
        };
        f.write_str(kind)
    }
}

/// Errors that can occur in ingestion, retrieval, and lifecycle operations.
///
/// None of these are retried automatically anywhere in the crate; retry
/// policy is a caller concern.
#[derive(Debug, Error)]
pub enum RagError {
    /// The source file could not be parsed as a PDF, even after the repair
    /// pass against the permissive parser.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Chunking produced zero chunks: the document has no extractable text.
    #[error("No extractable text in document")]
    EmptyContent,

    /// An error from the embedding service. Any single failed embedding
    /// call fails the whole batch; there are no partial-success semantics.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error from the generation service.
    #[error("Generation error ({provider}): {message}")]
    Generation {
        /// The generation provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A transport or service error from the vector store, tagged with the
    /// operation that failed.
    #[error("Vector store error ({operation}): {message}")]
    VectorStore {
        /// The failing gateway operation.
        operation: VectorStoreOp,
        /// The original error message.
        message: String,
    },

    /// A transport or filesystem error from the blob store, tagged with the
    /// operation that failed.
    #[error("Blob store error ({operation}): {message}")]
    BlobStore {
        /// The failing blob store operation.
        operation: BlobStoreOp,
        /// The original error message.
        message: String,
    },

    /// The vector collection was cleared but some blobs could not be
    /// removed.
    #[error("Partial clear: removed {removed} blob(s), {failed} failed")]
    PartialClear {
        /// Number of blobs successfully removed.
        removed: usize,
        /// Number of blobs whose deletion failed.
        failed: usize,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A convenience result type for docrag operations.
pub type Result<T> = std::result::Result<T, RagError>;
