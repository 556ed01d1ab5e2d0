//! In-memory vector store using cosine distance.
//!
//! [`InMemoryVectorStore`] is a zero-dependency [`VectorStore`] backed by a
//! `HashMap` behind a `tokio::sync::RwLock`. It mirrors the gateway
//! contract of the Chroma backend (ascending distance, tolerant no-op
//! deletes) and is meant for development and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{ChunkRecord, DocumentSummary, RetrievedChunk};
use crate::error::Result;
use crate::vectorstore::VectorStore;

/// An in-memory [`VectorStore`] using cosine distance for search.
///
/// Collections are stored as nested maps: collection name → record id →
/// record. Distance is `1 − cosine similarity`, matching the ascending
/// ordering of the HTTP backend.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, HashMap<String, ChunkRecord>>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Cosine distance between two vectors: `1 − (a·b)/(|a||b|)`.
///
/// Returns 1.0 (maximally distant) if either vector has zero magnitude.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn ensure_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.entry(name.to_string()).or_default();
        Ok(())
    }

    async fn upsert(&self, collection: &str, records: &[ChunkRecord]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let store = collections.entry(collection.to_string()).or_default();
        for record in records {
            store.insert(record.id.clone(), record.clone());
        }
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        let collections = self.collections.read().await;
        let Some(store) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut hits: Vec<(String, RetrievedChunk)> = store
            .values()
            .map(|record| {
                let distance = cosine_distance(&record.embedding, embedding);
                let hit = RetrievedChunk {
                    text: record.text.clone(),
                    metadata: record.metadata.clone(),
                    distance,
                };
                (record.id.clone(), hit)
            })
            .collect();

        // Tie-break on record id so equal distances order deterministically.
        hits.sort_by(|(id_a, a), (id_b, b)| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| id_a.cmp(id_b))
        });
        hits.truncate(top_k);
        Ok(hits.into_iter().map(|(_, hit)| hit).collect())
    }

    async fn list_documents(&self, collection: &str) -> Result<Vec<DocumentSummary>> {
        let collections = self.collections.read().await;
        let Some(store) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut summaries: HashMap<String, DocumentSummary> = HashMap::new();
        for record in store.values() {
            let metadata = &record.metadata;
            summaries
                .entry(metadata.document_id.clone())
                .and_modify(|summary| summary.chunk_count += 1)
                .or_insert_with(|| DocumentSummary {
                    document_id: metadata.document_id.clone(),
                    file_name: metadata.file_name.clone(),
                    chunk_count: 1,
                    created_at: metadata.created_at,
                });
        }

        let mut summaries: Vec<DocumentSummary> = summaries.into_values().collect();
        summaries.sort_by(|a, b| {
            a.created_at.cmp(&b.created_at).then_with(|| a.document_id.cmp(&b.document_id))
        });
        Ok(summaries)
    }

    async fn delete_document(&self, collection: &str, document_id: &str) -> Result<usize> {
        let mut collections = self.collections.write().await;
        let Some(store) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let before = store.len();
        store.retain(|_, record| record.metadata.document_id != document_id);
        Ok(before - store.len())
    }

    async fn clear_collection(&self, collection: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.remove(collection);
        Ok(())
    }
}
