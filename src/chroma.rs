//! Chroma vector store backend over HTTP/JSON.
//!
//! [`ChromaVectorStore`] implements [`VectorStore`] against a Chroma
//! server's REST API. Collections are addressed by a server-assigned id;
//! the name→id resolution goes through a single [`resolve_collection`]
//! path backed by a process-lifetime cache that is invalidated when the
//! server reports the collection gone.
//!
//! [`resolve_collection`]: ChromaVectorStore::resolve_collection

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::debug;

use crate::document::{ChunkMetadata, ChunkRecord, DocumentSummary, RetrievedChunk};
use crate::error::{RagError, Result, VectorStoreOp};
use crate::vectorstore::VectorStore;

/// The default Chroma server URL.
const DEFAULT_CHROMA_URL: &str = "http://localhost:8000";

/// Upper bound on records fetched by a metadata scan.
const SCAN_LIMIT: usize = 10_000;

/// A [`VectorStore`] backed by a Chroma server.
///
/// # Example
///
/// ```rust,ignore
/// use docrag::chroma::ChromaVectorStore;
///
/// let store = ChromaVectorStore::new("http://localhost:8000");
/// store.ensure_collection("documents").await?;
/// ```
pub struct ChromaVectorStore {
    http: reqwest::Client,
    base_url: String,
    /// Resolved collection ids, keyed by collection name.
    resolved: RwLock<HashMap<String, String>>,
}

// ── Chroma wire types ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CollectionInfo {
    id: String,
    name: String,
}

#[derive(Serialize)]
struct UpsertBody {
    ids: Vec<String>,
    embeddings: Vec<Vec<f32>>,
    metadatas: Vec<ChunkMetadata>,
    documents: Vec<String>,
}

#[derive(Serialize)]
struct QueryBody {
    query_embeddings: Vec<Vec<f32>>,
    n_results: usize,
}

/// Query responses carry parallel arrays, one row per query embedding.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    documents: Vec<Vec<String>>,
    #[serde(default)]
    metadatas: Vec<Vec<ChunkMetadata>>,
    #[serde(default)]
    distances: Vec<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
struct GetResponse {
    #[serde(default)]
    ids: Vec<String>,
    #[serde(default)]
    metadatas: Option<Vec<Option<ChunkMetadata>>>,
}

impl ChromaVectorStore {
    /// Create a new store pointing at the given Chroma base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            resolved: RwLock::new(HashMap::new()),
        }
    }

    /// Create a new store pointing at the default local Chroma server.
    pub fn default_url() -> Self {
        Self::new(DEFAULT_CHROMA_URL)
    }

    fn collections_url(&self) -> String {
        format!("{}/api/v1/collections", self.base_url)
    }

    fn collection_url(&self, id: &str, suffix: &str) -> String {
        if suffix.is_empty() {
            format!("{}/api/v1/collections/{id}", self.base_url)
        } else {
            format!("{}/api/v1/collections/{id}/{suffix}", self.base_url)
        }
    }

    fn op_err(op: VectorStoreOp, message: impl Into<String>) -> RagError {
        RagError::VectorStore { operation: op, message: message.into() }
    }

    /// Turn a non-success response into an error carrying the body text.
    async fn check_status(
        response: reqwest::Response,
        op: VectorStoreOp,
    ) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Self::op_err(op, format!("server returned {status}: {body}")))
    }

    /// Resolve a collection name to its server-assigned id.
    ///
    /// Idempotent get-or-create when `create` is true; plain lookup
    /// returning `None` otherwise. Resolved ids are cached for the process
    /// lifetime and dropped again by [`Self::invalidate`].
    async fn resolve_collection(
        &self,
        name: &str,
        create: bool,
        op: VectorStoreOp,
    ) -> Result<Option<String>> {
        if let Some(id) = self.resolved.read().await.get(name) {
            return Ok(Some(id.clone()));
        }

        let response = self
            .http
            .get(self.collections_url())
            .send()
            .await
            .map_err(|e| Self::op_err(op, format!("list collections failed: {e}")))?;
        let collections: Vec<CollectionInfo> = Self::check_status(response, op)
            .await?
            .json()
            .await
            .map_err(|e| Self::op_err(op, format!("failed to parse collection list: {e}")))?;

        if let Some(info) = collections.into_iter().find(|c| c.name == name) {
            self.resolved.write().await.insert(name.to_string(), info.id.clone());
            return Ok(Some(info.id));
        }

        if !create {
            return Ok(None);
        }

        let response = self
            .http
            .post(self.collections_url())
            .json(&json!({
                "name": name,
                "metadata": { "description": "Document embeddings collection" },
            }))
            .send()
            .await
            .map_err(|e| Self::op_err(op, format!("create collection failed: {e}")))?;
        let created: CollectionInfo = Self::check_status(response, op)
            .await?
            .json()
            .await
            .map_err(|e| Self::op_err(op, format!("failed to parse created collection: {e}")))?;

        debug!(collection = name, id = %created.id, "created chroma collection");
        self.resolved.write().await.insert(name.to_string(), created.id.clone());
        Ok(Some(created.id))
    }

    /// Resolve with get-or-create semantics, yielding the collection id.
    async fn get_or_create(&self, name: &str, op: VectorStoreOp) -> Result<String> {
        self.resolve_collection(name, true, op)
            .await?
            .ok_or_else(|| Self::op_err(op, format!("could not resolve collection '{name}'")))
    }

    /// Drop a cached name→id mapping after a not-found response.
    async fn invalidate(&self, name: &str) {
        self.resolved.write().await.remove(name);
    }

    /// POST to a collection endpoint.
    ///
    /// A 404 means the cached id went stale (collection deleted out of
    /// band): the cache entry is dropped and `None` returned so the caller
    /// can re-resolve against the server.
    async fn post_collection(
        &self,
        name: &str,
        id: &str,
        suffix: &str,
        body: &serde_json::Value,
        op: VectorStoreOp,
    ) -> Result<Option<reqwest::Response>> {
        let response = self
            .http
            .post(self.collection_url(id, suffix))
            .json(body)
            .send()
            .await
            .map_err(|e| Self::op_err(op, format!("{suffix} request failed: {e}")))?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(collection = name, id, "cached collection id is stale");
            self.invalidate(name).await;
            return Ok(None);
        }
        Ok(Some(Self::check_status(response, op).await?))
    }

    /// Fetch all record ids for a document via a metadata filter.
    ///
    /// `None` signals a stale collection id, as in [`Self::post_collection`].
    async fn chunk_ids_for_document(
        &self,
        name: &str,
        id: &str,
        document_id: &str,
        op: VectorStoreOp,
    ) -> Result<Option<Vec<String>>> {
        let body = json!({
            "where": { "documentId": document_id },
            "include": [],
        });
        let Some(response) = self.post_collection(name, id, "get", &body, op).await? else {
            return Ok(None);
        };
        let parsed: GetResponse = response
            .json()
            .await
            .map_err(|e| Self::op_err(op, format!("failed to parse get response: {e}")))?;
        Ok(Some(parsed.ids))
    }
}

#[async_trait]
impl VectorStore for ChromaVectorStore {
    async fn ensure_collection(&self, name: &str) -> Result<()> {
        self.resolve_collection(name, true, VectorStoreOp::CollectionCreate).await?;
        Ok(())
    }

    async fn upsert(&self, collection: &str, records: &[ChunkRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let body = UpsertBody {
            ids: records.iter().map(|r| r.id.clone()).collect(),
            embeddings: records.iter().map(|r| r.embedding.clone()).collect(),
            metadatas: records.iter().map(|r| r.metadata.clone()).collect(),
            documents: records.iter().map(|r| r.text.clone()).collect(),
        };
        let body = serde_json::to_value(&body)
            .map_err(|e| Self::op_err(VectorStoreOp::Upsert, e.to_string()))?;

        // One retry after a stale id: re-resolving recreates the collection.
        for _ in 0..2 {
            let id = self.get_or_create(collection, VectorStoreOp::Upsert).await?;
            if self
                .post_collection(collection, &id, "upsert", &body, VectorStoreOp::Upsert)
                .await?
                .is_some()
            {
                debug!(collection, count = records.len(), "upserted chunk records");
                return Ok(());
            }
        }
        Err(Self::op_err(VectorStoreOp::Upsert, "collection kept disappearing during upsert"))
    }

    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        let body = QueryBody { query_embeddings: vec![embedding.to_vec()], n_results: top_k };
        let body = serde_json::to_value(&body)
            .map_err(|e| Self::op_err(VectorStoreOp::Query, e.to_string()))?;

        for _ in 0..2 {
            let Some(id) =
                self.resolve_collection(collection, false, VectorStoreOp::Query).await?
            else {
                return Ok(Vec::new());
            };
            let Some(response) = self
                .post_collection(collection, &id, "query", &body, VectorStoreOp::Query)
                .await?
            else {
                continue;
            };
            let parsed: QueryResponse = response.json().await.map_err(|e| {
                Self::op_err(VectorStoreOp::Query, format!("failed to parse query response: {e}"))
            })?;

            let documents = parsed.documents.into_iter().next().unwrap_or_default();
            let metadatas = parsed.metadatas.into_iter().next().unwrap_or_default();
            let distances = parsed.distances.into_iter().next().unwrap_or_default();

            return Ok(documents
                .into_iter()
                .zip(metadatas)
                .zip(distances)
                .map(|((text, metadata), distance)| RetrievedChunk { text, metadata, distance })
                .collect());
        }
        Ok(Vec::new())
    }

    async fn list_documents(&self, collection: &str) -> Result<Vec<DocumentSummary>> {
        let body = json!({ "include": ["metadatas"], "limit": SCAN_LIMIT });

        for _ in 0..2 {
            let Some(id) =
                self.resolve_collection(collection, false, VectorStoreOp::List).await?
            else {
                return Ok(Vec::new());
            };
            let Some(response) =
                self.post_collection(collection, &id, "get", &body, VectorStoreOp::List).await?
            else {
                continue;
            };
            let parsed: GetResponse = response.json().await.map_err(|e| {
                Self::op_err(VectorStoreOp::List, format!("failed to parse get response: {e}"))
            })?;

            let mut order: Vec<String> = Vec::new();
            let mut summaries: HashMap<String, DocumentSummary> = HashMap::new();
            for metadata in parsed.metadatas.unwrap_or_default().into_iter().flatten() {
                match summaries.get_mut(&metadata.document_id) {
                    Some(summary) => summary.chunk_count += 1,
                    None => {
                        order.push(metadata.document_id.clone());
                        summaries.insert(
                            metadata.document_id.clone(),
                            DocumentSummary {
                                document_id: metadata.document_id,
                                file_name: metadata.file_name,
                                chunk_count: 1,
                                created_at: metadata.created_at,
                            },
                        );
                    }
                }
            }

            return Ok(order
                .into_iter()
                .filter_map(|document_id| summaries.remove(&document_id))
                .collect());
        }
        Ok(Vec::new())
    }

    async fn delete_document(&self, collection: &str, document_id: &str) -> Result<usize> {
        for _ in 0..2 {
            let Some(id) =
                self.resolve_collection(collection, false, VectorStoreOp::Delete).await?
            else {
                debug!(
                    collection,
                    document.id = document_id,
                    "collection absent, nothing to delete"
                );
                return Ok(0);
            };

            let Some(ids) = self
                .chunk_ids_for_document(collection, &id, document_id, VectorStoreOp::Delete)
                .await?
            else {
                continue;
            };
            if ids.is_empty() {
                debug!(collection, document.id = document_id, "no chunks found for document");
                return Ok(0);
            }

            let count = ids.len();
            let body = json!({ "ids": ids });
            let Some(_) = self
                .post_collection(collection, &id, "delete", &body, VectorStoreOp::Delete)
                .await?
            else {
                continue;
            };
            debug!(collection, document.id = document_id, count, "deleted chunk records");
            return Ok(count);
        }
        Ok(0)
    }

    async fn clear_collection(&self, collection: &str) -> Result<()> {
        let Some(id) = self.resolve_collection(collection, false, VectorStoreOp::Clear).await?
        else {
            return Ok(());
        };

        let response = self
            .http
            .delete(self.collection_url(&id, ""))
            .send()
            .await
            .map_err(|e| Self::op_err(VectorStoreOp::Clear, format!("delete request failed: {e}")))?;
        self.invalidate(collection).await;
        // Deleted out of band since the id was cached: already clear.
        if response.status() == StatusCode::NOT_FOUND {
            debug!(collection, "collection already gone");
            return Ok(());
        }
        Self::check_status(response, VectorStoreOp::Clear).await?;
        debug!(collection, "cleared chroma collection");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_response_parses_parallel_arrays() {
        let body = r#"{
            "documents": [["chunk one", "chunk two"]],
            "metadatas": [[
                {"documentId": "d1", "ordinalIndex": 0, "fileName": "a.pdf",
                 "createdAt": "2026-08-26T00:00:00Z"},
                {"documentId": "d1", "ordinalIndex": 1, "fileName": "a.pdf",
                 "createdAt": "2026-08-26T00:00:00Z"}
            ]],
            "distances": [[0.12, 0.48]]
        }"#;
        let parsed: QueryResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.documents[0].len(), 2);
        assert_eq!(parsed.metadatas[0][1].ordinal_index, 1);
        assert!(parsed.distances[0][0] < parsed.distances[0][1]);
    }

    #[test]
    fn get_response_tolerates_null_metadata_entries() {
        let body = r#"{
            "ids": ["d1:0", "d1:1"],
            "metadatas": [
                {"documentId": "d1", "ordinalIndex": 0, "fileName": "a.pdf",
                 "createdAt": "2026-08-26T00:00:00Z"},
                null
            ]
        }"#;
        let parsed: GetResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.ids.len(), 2);
        let present: Vec<_> = parsed.metadatas.unwrap().into_iter().flatten().collect();
        assert_eq!(present.len(), 1);
    }

    #[test]
    fn empty_query_response_yields_no_rows() {
        let parsed: QueryResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.documents.is_empty());
        assert!(parsed.distances.is_empty());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let store = ChromaVectorStore::new("http://localhost:8000/");
        assert_eq!(store.collections_url(), "http://localhost:8000/api/v1/collections");
    }
}
