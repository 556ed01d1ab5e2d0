//! Lifecycle manager tests: deletion, clear-all, and reconciliation.

mod common;

use std::sync::Arc;

use chrono::Utc;

use docrag::blobstore::{BlobStore, FsBlobStore};
use docrag::document::{ChunkMetadata, ChunkRecord};
use docrag::error::RagError;
use docrag::inmemory::InMemoryVectorStore;
use docrag::lifecycle::{ClearOutcome, DocumentLifecycle};
use docrag::vectorstore::VectorStore;

use common::FlakyBlobStore;

const COLLECTION: &str = "documents";

fn record(document_id: &str, ordinal_index: usize) -> ChunkRecord {
    ChunkRecord {
        id: ChunkRecord::composite_id(document_id, ordinal_index),
        text: format!("chunk {ordinal_index} of {document_id}"),
        embedding: vec![0.1, 0.2, 0.3],
        metadata: ChunkMetadata {
            document_id: document_id.to_string(),
            ordinal_index,
            file_name: format!("{document_id}.pdf"),
            created_at: Utc::now(),
        },
    }
}

async fn seed(store: &InMemoryVectorStore, blobs: &dyn BlobStore, document_id: &str, chunks: usize) {
    let records: Vec<ChunkRecord> = (0..chunks).map(|i| record(document_id, i)).collect();
    store.ensure_collection(COLLECTION).await.unwrap();
    store.upsert(COLLECTION, &records).await.unwrap();
    blobs.put(document_id, b"%PDF-stub").await.unwrap();
}

#[tokio::test]
async fn delete_document_removes_both_stores() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(InMemoryVectorStore::new());
    let blobs = Arc::new(FsBlobStore::new(dir.path()));
    seed(&store, blobs.as_ref(), "doc-a", 3).await;
    seed(&store, blobs.as_ref(), "doc-b", 2).await;

    let lifecycle = DocumentLifecycle::new(store.clone(), blobs.clone(), COLLECTION);
    let report = lifecycle.delete_document("doc-a").await.unwrap();
    assert_eq!(report.chunks_removed, 3);
    assert!(report.blob_removed);
    assert!(!report.nothing_found());

    // The other document is untouched.
    let remaining = lifecycle.list_documents().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].document_id, "doc-b");
    assert_eq!(blobs.list_ids().await.unwrap(), vec!["doc-b"]);
}

#[tokio::test]
async fn deleting_unknown_document_succeeds_with_nothing_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(InMemoryVectorStore::new());
    let blobs = Arc::new(FsBlobStore::new(dir.path()));

    let lifecycle = DocumentLifecycle::new(store, blobs, COLLECTION);
    let report = lifecycle.delete_document("never-ingested").await.unwrap();
    assert_eq!(report.chunks_removed, 0);
    assert!(!report.blob_removed);
    assert!(report.nothing_found());
}

#[tokio::test]
async fn blob_delete_failure_is_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(InMemoryVectorStore::new());
    let inner = FsBlobStore::new(dir.path());
    seed(&store, &inner, "doc-a", 2).await;
    let blobs = Arc::new(FlakyBlobStore::new(inner, ["doc-a".to_string()]));

    let lifecycle = DocumentLifecycle::new(store.clone(), blobs, COLLECTION);
    let report = lifecycle.delete_document("doc-a").await.unwrap();
    assert_eq!(report.chunks_removed, 2);
    assert!(!report.blob_removed);

    // Vector records are gone even though the blob lingers.
    assert!(store.list_documents(COLLECTION).await.unwrap().is_empty());
}

#[tokio::test]
async fn clear_all_empties_both_stores() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(InMemoryVectorStore::new());
    let blobs = Arc::new(FsBlobStore::new(dir.path()));
    seed(&store, blobs.as_ref(), "doc-a", 2).await;
    seed(&store, blobs.as_ref(), "doc-b", 1).await;

    let lifecycle = DocumentLifecycle::new(store.clone(), blobs.clone(), COLLECTION);
    let outcome = lifecycle.clear_all().await.unwrap();
    assert_eq!(outcome, ClearOutcome::Complete { blobs_removed: 2 });
    assert_eq!(outcome.into_result().unwrap(), 2);

    // After a clear: empty listing and an error-free empty query.
    assert!(lifecycle.list_documents().await.unwrap().is_empty());
    let hits = store.query(COLLECTION, &[0.1, 0.2, 0.3], 5).await.unwrap();
    assert!(hits.is_empty());
    assert!(blobs.list_ids().await.unwrap().is_empty());
}

#[tokio::test]
async fn partial_blob_failure_reports_partial_status() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(InMemoryVectorStore::new());
    let inner = FsBlobStore::new(dir.path());
    seed(&store, &inner, "doc-a", 1).await;
    seed(&store, &inner, "doc-b", 1).await;
    seed(&store, &inner, "doc-c", 1).await;
    let blobs = Arc::new(FlakyBlobStore::new(inner, ["doc-b".to_string()]));

    let lifecycle = DocumentLifecycle::new(store, blobs, COLLECTION);
    let outcome = lifecycle.clear_all().await.unwrap();
    assert_eq!(outcome, ClearOutcome::Partial { blobs_removed: 2, blobs_failed: 1 });

    let err = outcome.into_result().unwrap_err();
    assert!(matches!(err, RagError::PartialClear { removed: 2, failed: 1 }));
}

#[tokio::test]
async fn reconcile_reports_orphans_on_both_sides() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(InMemoryVectorStore::new());
    let blobs = Arc::new(FsBlobStore::new(dir.path()));

    // doc-a: vector records but no blob. doc-b: blob but no records.
    store.ensure_collection(COLLECTION).await.unwrap();
    store.upsert(COLLECTION, &[record("doc-a", 0)]).await.unwrap();
    blobs.put("doc-b", b"%PDF-stub").await.unwrap();

    let lifecycle = DocumentLifecycle::new(store, blobs, COLLECTION);
    let report = lifecycle.reconcile().await.unwrap();
    assert!(!report.is_consistent());
    assert_eq!(report.vector_only, vec!["doc-a"]);
    assert_eq!(report.blob_only, vec!["doc-b"]);
}

#[tokio::test]
async fn reconcile_is_clean_after_consistent_writes() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(InMemoryVectorStore::new());
    let blobs = Arc::new(FsBlobStore::new(dir.path()));
    seed(&store, blobs.as_ref(), "doc-a", 2).await;

    let lifecycle = DocumentLifecycle::new(store, blobs, COLLECTION);
    assert!(lifecycle.reconcile().await.unwrap().is_consistent());
}
