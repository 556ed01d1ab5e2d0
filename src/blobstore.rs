//! Blob store trait and filesystem implementation.
//!
//! The blob store owns the raw uploaded bytes for a document identifier.
//! [`FsBlobStore`] keys files as `"<documentId>.pdf"` under a root
//! directory, created lazily on first write.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{BlobStoreOp, RagError, Result};

/// Persistent storage for original uploaded files, keyed by document id.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist the raw bytes for a document, replacing any existing blob.
    async fn put(&self, document_id: &str, bytes: &[u8]) -> Result<()>;

    /// Read a document's bytes back, or `None` if no blob exists.
    async fn get(&self, document_id: &str) -> Result<Option<Vec<u8>>>;

    /// Remove a document's blob. Returns `false` (not an error) if the
    /// blob was already absent.
    async fn delete(&self, document_id: &str) -> Result<bool>;

    /// Enumerate the document ids that currently have a stored blob.
    async fn list_ids(&self) -> Result<Vec<String>>;
}

/// A [`BlobStore`] over a local directory of `<documentId>.pdf` files.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Create a store rooted at `root`. The directory is created on the
    /// first `put`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn blob_path(&self, document_id: &str) -> PathBuf {
        self.root.join(format!("{document_id}.pdf"))
    }

    fn op_err(op: BlobStoreOp, e: impl std::fmt::Display) -> RagError {
        RagError::BlobStore { operation: op, message: e.to_string() }
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, document_id: &str, bytes: &[u8]) -> Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| Self::op_err(BlobStoreOp::Put, e))?;
        let path = self.blob_path(document_id);
        tokio::fs::write(&path, bytes).await.map_err(|e| Self::op_err(BlobStoreOp::Put, e))?;
        debug!(document.id = document_id, path = %path.display(), size = bytes.len(), "stored blob");
        Ok(())
    }

    async fn get(&self, document_id: &str) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.blob_path(document_id)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::op_err(BlobStoreOp::Get, e)),
        }
    }

    async fn delete(&self, document_id: &str) -> Result<bool> {
        match tokio::fs::remove_file(self.blob_path(document_id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Self::op_err(BlobStoreOp::Delete, e)),
        }
    }

    async fn list_ids(&self) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            // A store that was never written to holds no documents.
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Self::op_err(BlobStoreOp::List, e)),
        };

        let mut ids = Vec::new();
        while let Some(entry) =
            entries.next_entry().await.map_err(|e| Self::op_err(BlobStoreOp::List, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("pdf") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// Borrow the root directory (used by maintenance tooling and tests).
impl AsRef<Path> for FsBlobStore {
    fn as_ref(&self) -> &Path {
        &self.root
    }
}
