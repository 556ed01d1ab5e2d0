//! Document lifecycle management across the vector and blob stores.
//!
//! There is no cross-store transaction: deletion is best-effort sequential
//! (vector records first, then the blob) with independent failure
//! reporting. [`DocumentLifecycle::reconcile`] surfaces any drift the
//! best-effort model leaves behind.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::blobstore::BlobStore;
use crate::document::DocumentSummary;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// Orchestrates listing, deletion, and reconciliation over one collection.
pub struct DocumentLifecycle {
    store: Arc<dyn VectorStore>,
    blobs: Arc<dyn BlobStore>,
    collection: String,
}

/// The result of deleting one document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteReport {
    /// The targeted document identifier.
    pub document_id: String,
    /// Number of chunk records removed from the vector store.
    pub chunks_removed: usize,
    /// Whether the blob was removed. `false` covers both an absent blob
    /// and a tolerated deletion failure.
    pub blob_removed: bool,
}

impl DeleteReport {
    /// True when neither store held anything for the document.
    pub fn nothing_found(&self) -> bool {
        self.chunks_removed == 0 && !self.blob_removed
    }
}

/// The outcome of clearing every document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "status")]
pub enum ClearOutcome {
    /// The vector collection was cleared and every blob was removed.
    Complete {
        /// Number of blobs removed.
        blobs_removed: usize,
    },
    /// The vector collection was cleared but some blob deletions failed.
    Partial {
        /// Number of blobs removed.
        blobs_removed: usize,
        /// Number of blobs whose deletion failed.
        blobs_failed: usize,
    },
}

impl ClearOutcome {
    /// Convert a partial outcome into [`RagError::PartialClear`] for
    /// callers that require full success.
    pub fn into_result(self) -> Result<usize> {
        match self {
            ClearOutcome::Complete { blobs_removed } => Ok(blobs_removed),
            ClearOutcome::Partial { blobs_removed, blobs_failed } => {
                Err(RagError::PartialClear { removed: blobs_removed, failed: blobs_failed })
            }
        }
    }
}

/// Document ids present in one store but not the other.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// Documents with vector records but no stored blob.
    pub vector_only: Vec<String>,
    /// Blobs with no vector records (orphaned files).
    pub blob_only: Vec<String>,
}

impl ReconcileReport {
    /// True when both stores agree on the set of documents.
    pub fn is_consistent(&self) -> bool {
        self.vector_only.is_empty() && self.blob_only.is_empty()
    }
}

impl DocumentLifecycle {
    /// Create a lifecycle manager over the given stores and collection.
    pub fn new(
        store: Arc<dyn VectorStore>,
        blobs: Arc<dyn BlobStore>,
        collection: impl Into<String>,
    ) -> Self {
        Self { store, blobs, collection: collection.into() }
    }

    /// List one summary per stored document.
    pub async fn list_documents(&self) -> Result<Vec<DocumentSummary>> {
        self.store.list_documents(&self.collection).await
    }

    /// Delete a document from both stores.
    ///
    /// Vector records are deleted first. A failing or no-op blob deletion
    /// is logged and tolerated — the operation still reports success as
    /// long as vector deletion succeeded. Deleting a document that was
    /// never ingested succeeds with [`DeleteReport::nothing_found`].
    pub async fn delete_document(&self, document_id: &str) -> Result<DeleteReport> {
        let chunks_removed = self.store.delete_document(&self.collection, document_id).await?;

        let blob_removed = match self.blobs.delete(document_id).await {
            Ok(true) => true,
            Ok(false) => {
                debug!(document.id = document_id, "blob not found or already deleted");
                false
            }
            Err(e) => {
                warn!(document.id = document_id, error = %e, "blob deletion failed; vector records already removed");
                false
            }
        };

        info!(document.id = document_id, chunks_removed, blob_removed, "deleted document");
        Ok(DeleteReport { document_id: document_id.to_string(), chunks_removed, blob_removed })
    }

    /// Clear the entire collection, then delete every stored blob.
    ///
    /// Individual blob-deletion failures are aggregated into
    /// [`ClearOutcome::Partial`] rather than raised.
    ///
    /// # Errors
    ///
    /// Fails outright only when the vector clear itself fails, or when the
    /// blob store cannot even be enumerated.
    pub async fn clear_all(&self) -> Result<ClearOutcome> {
        self.store.clear_collection(&self.collection).await?;

        let ids = self.blobs.list_ids().await?;
        let mut blobs_removed = 0;
        let mut blobs_failed = 0;
        for document_id in &ids {
            match self.blobs.delete(document_id).await {
                Ok(true) => blobs_removed += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(document.id = %document_id, error = %e, "failed to delete blob during clear");
                    blobs_failed += 1;
                }
            }
        }

        if blobs_failed == 0 {
            info!(blobs_removed, "cleared all documents");
            Ok(ClearOutcome::Complete { blobs_removed })
        } else {
            warn!(blobs_removed, blobs_failed, "cleared vector store but some blobs remain");
            Ok(ClearOutcome::Partial { blobs_removed, blobs_failed })
        }
    }

    /// Compare document ids across the two stores and report orphans on
    /// either side. Read-only maintenance capability; nothing is repaired.
    pub async fn reconcile(&self) -> Result<ReconcileReport> {
        let indexed: BTreeSet<String> = self
            .list_documents()
            .await?
            .into_iter()
            .map(|summary| summary.document_id)
            .collect();
        let stored: BTreeSet<String> = self.blobs.list_ids().await?.into_iter().collect();

        let report = ReconcileReport {
            vector_only: indexed.difference(&stored).cloned().collect(),
            blob_only: stored.difference(&indexed).cloned().collect(),
        };
        if !report.is_consistent() {
            warn!(
                vector_only = report.vector_only.len(),
                blob_only = report.blob_only.len(),
                "stores are out of sync"
            );
        }
        Ok(report)
    }
}
