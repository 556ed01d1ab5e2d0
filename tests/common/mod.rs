//! Shared test doubles and fixtures.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use docrag::blobstore::{BlobStore, FsBlobStore};
use docrag::embedding::EmbeddingProvider;
use docrag::error::{BlobStoreOp, RagError, Result};
use docrag::generation::GenerationProvider;

/// Deterministic embedder that folds byte values into a fixed-size vector.
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dimensions];
        for (i, byte) in text.bytes().enumerate() {
            v[i % self.dimensions] += f32::from(byte);
        }
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.vector_for(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// [`HashEmbedder`] with a per-text delay so concurrent batch calls
/// complete out of request order.
pub struct JitterEmbedder {
    inner: HashEmbedder,
}

impl JitterEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { inner: HashEmbedder::new(dimensions) }
    }
}

#[async_trait]
impl EmbeddingProvider for JitterEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let jitter = (text.len() * 37 % 50) as u64;
        tokio::time::sleep(Duration::from_millis(jitter)).await;
        self.inner.embed(text).await
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }
}

/// Embedder that fails for any text containing `"poison"`.
pub struct PoisonEmbedder {
    inner: HashEmbedder,
}

impl PoisonEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { inner: HashEmbedder::new(dimensions) }
    }
}

#[async_trait]
impl EmbeddingProvider for PoisonEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.contains("poison") {
            return Err(RagError::Embedding {
                provider: "mock".into(),
                message: "poisoned input".into(),
            });
        }
        self.inner.embed(text).await
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }
}

/// Generator that records every prompt and returns a canned answer.
#[derive(Default)]
pub struct RecordingGenerator {
    pub prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl GenerationProvider for RecordingGenerator {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok("canned answer".to_string())
    }
}

impl RecordingGenerator {
    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

/// Filesystem blob store whose `delete` fails for configured ids.
pub struct FlakyBlobStore {
    inner: FsBlobStore,
    fail_ids: HashSet<String>,
}

impl FlakyBlobStore {
    pub fn new(inner: FsBlobStore, fail_ids: impl IntoIterator<Item = String>) -> Self {
        Self { inner, fail_ids: fail_ids.into_iter().collect() }
    }
}

#[async_trait]
impl BlobStore for FlakyBlobStore {
    async fn put(&self, document_id: &str, bytes: &[u8]) -> Result<()> {
        self.inner.put(document_id, bytes).await
    }

    async fn get(&self, document_id: &str) -> Result<Option<Vec<u8>>> {
        self.inner.get(document_id).await
    }

    async fn delete(&self, document_id: &str) -> Result<bool> {
        if self.fail_ids.contains(document_id) {
            return Err(RagError::BlobStore {
                operation: BlobStoreOp::Delete,
                message: "injected failure".into(),
            });
        }
        self.inner.delete(document_id).await
    }

    async fn list_ids(&self) -> Result<Vec<String>> {
        self.inner.list_ids().await
    }
}

/// Build a single-page PDF whose text content is the given lines.
pub fn pdf_with_text(lines: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 12.into()]),
        Operation::new("Td", vec![50.into(), 750.into()]),
    ];
    for line in lines {
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        operations.push(Operation::new("Td", vec![0.into(), (-14).into()]));
    }
    operations.push(Operation::new("ET", vec![]));

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().expect("content stream encodes"),
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Resources" => resources_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("pdf serializes");
    bytes
}

/// Build a PDF with a single empty page (no extractable text).
pub fn pdf_without_text() -> Vec<u8> {
    pdf_with_text(&[])
}
