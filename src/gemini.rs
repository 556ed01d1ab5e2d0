//! Gemini REST client implementing both provider traits.
//!
//! [`GeminiClient`] calls the Generative Language API directly with
//! `reqwest`: `:embedContent` for embeddings and `:generateContent` for
//! answer synthesis.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::GenerationProvider;

/// The default Generative Language API base URL.
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// The default embedding model.
const DEFAULT_EMBED_MODEL: &str = "text-embedding-004";

/// The default generation model.
const DEFAULT_GENERATION_MODEL: &str = "gemini-2.5-flash";

/// The dimensionality of `text-embedding-004` vectors.
const DEFAULT_DIMENSIONS: usize = 768;

/// A Gemini API client implementing [`EmbeddingProvider`] and
/// [`GenerationProvider`].
///
/// # Configuration
///
/// - `api_key` – from the constructor or the `GEMINI_API_KEY` environment
///   variable.
/// - `embed_model` – defaults to `text-embedding-004`.
/// - `generation_model` – defaults to `gemini-2.5-flash`.
///
/// # Example
///
/// ```rust,ignore
/// use docrag::gemini::GeminiClient;
///
/// let client = GeminiClient::from_env()?;
/// let embedding = client.embed("hello world").await?;
/// ```
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    embed_model: String,
    generation_model: String,
    dimensions: usize,
}

impl GeminiClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::Embedding {
                provider: "Gemini".into(),
                message: "API key must not be empty".into(),
            });
        }

        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: GEMINI_BASE_URL.to_string(),
            embed_model: DEFAULT_EMBED_MODEL.to_string(),
            generation_model: DEFAULT_GENERATION_MODEL.to_string(),
            dimensions: DEFAULT_DIMENSIONS,
        })
    }

    /// Create a new client using the `GEMINI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| RagError::Embedding {
            provider: "Gemini".into(),
            message: "GEMINI_API_KEY environment variable not set".into(),
        })?;
        Self::new(api_key)
    }

    /// Override the API base URL (self-hosted proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the embedding model and its output dimensionality.
    pub fn with_embed_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.embed_model = model.into();
        self.dimensions = dimensions;
        self
    }

    /// Set the generation model (e.g. `gemini-2.5-pro`).
    pub fn with_generation_model(mut self, model: impl Into<String>) -> Self {
        self.generation_model = model.into();
        self
    }

    /// Read the response body as `T`, surfacing API error payloads.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        provider_op: &str,
    ) -> std::result::Result<T, String> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(format!("{provider_op} returned {status}: {detail}"));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| format!("failed to parse {provider_op} response: {e}"))
    }
}

// ── Gemini API request/response types ──────────────────────────────

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct EmbedContentRequest<'a> {
    content: Content<'a>,
}

#[derive(Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

// ── EmbeddingProvider implementation ───────────────────────────────

#[async_trait]
impl EmbeddingProvider for GeminiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "Gemini", text_len = text.len(), "embedding single text");

        let url = format!(
            "{}/models/{}:embedContent?key={}",
            self.base_url, self.embed_model, self.api_key
        );
        let body = EmbedContentRequest { content: Content { parts: vec![Part { text }] } };

        let response = self.http.post(&url).json(&body).send().await.map_err(|e| {
            error!(provider = "Gemini", error = %e, "embedding request failed");
            RagError::Embedding { provider: "Gemini".into(), message: format!("request failed: {e}") }
        })?;

        let parsed: EmbedContentResponse =
            Self::parse_response(response, "embedContent").await.map_err(|message| {
                error!(provider = "Gemini", %message, "embedding API error");
                RagError::Embedding { provider: "Gemini".into(), message }
            })?;

        Ok(parsed.embedding.values)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ── GenerationProvider implementation ──────────────────────────────

#[async_trait]
impl GenerationProvider for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!(provider = "Gemini", prompt_len = prompt.len(), "generating completion");

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.generation_model, self.api_key
        );
        let body = GenerateContentRequest {
            contents: vec![Content { parts: vec![Part { text: prompt }] }],
        };

        let response = self.http.post(&url).json(&body).send().await.map_err(|e| {
            error!(provider = "Gemini", error = %e, "generation request failed");
            RagError::Generation {
                provider: "Gemini".into(),
                message: format!("request failed: {e}"),
            }
        })?;

        let parsed: GenerateContentResponse =
            Self::parse_response(response, "generateContent").await.map_err(|message| {
                error!(provider = "Gemini", %message, "generation API error");
                RagError::Generation { provider: "Gemini".into(), message }
            })?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts.into_iter().map(|p| p.text).collect::<Vec<_>>().join(""))
            .unwrap_or_default();

        Ok(text)
    }
}
