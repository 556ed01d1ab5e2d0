//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};

use crate::error::Result;

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap specific embedding backends behind a unified async
/// interface. The default [`embed_batch`](EmbeddingProvider::embed_batch)
/// issues one [`embed`](EmbeddingProvider::embed) call per text with bounded
/// concurrency and reassembles the results in input order; backends with a
/// native batch endpoint should override it.
///
/// # Example
///
/// ```rust,ignore
/// use docrag::EmbeddingProvider;
///
/// let embedding = provider.embed("hello world").await?;
/// assert_eq!(embedding.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// Returns one vector per input, positionally matching the inputs even
    /// when individual calls complete out of order. Any single failure
    /// fails the whole batch; there are no partial results.
    ///
    /// `concurrency` bounds the number of in-flight calls (clamped to at
    /// least 1).
    async fn embed_batch(&self, texts: &[&str], concurrency: usize) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        // Futures are inert until polled, so collecting the calls up front
        // keeps the fan-out bounded by `buffered`, which polls at most
        // `concurrency` of them at once and yields results in input order.
        let calls: Vec<_> = texts.iter().map(|text| self.embed(text)).collect();
        stream::iter(calls).buffered(concurrency.max(1)).try_collect().await
    }

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;
}
