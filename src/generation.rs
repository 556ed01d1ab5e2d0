//! Generation provider trait for answer synthesis.
//!
//! The generation service is an opaque text-completion collaborator: the
//! retrieval pipeline hands it an assembled prompt and returns its response
//! verbatim. No structured output is required.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that completes a plain-text prompt.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate a text completion for the given prompt.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
