use crate::embeddings::EmbeddingProvider;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-minilm";

/// Embedding provider backed by an Ollama server
pub struct OllamaEmbeddingProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimension: AtomicUsize, // Updated if the server reports a different dimension
}

impl OllamaEmbeddingProvider {
    /// Determine embedding dimension from model name
    pub(crate) fn get_dimension_for_model(model: &str) -> usize {
        match model {
            m if m.contains("all-minilm") => 384,
            m if m.contains("mxbai-embed") => 1024,
            m if m.contains("nomic-embed") => 768,
            m if m.contains("e5") => 768,
            _ => 384,
        }
    }

    /// Create a new Ollama embedding provider.
    /// Uses provided dimension, or infers it from the model name if not provided
    pub fn new(
        base_url: Option<&str>,
        model: Option<&str>,
        dimension: Option<usize>,
        timeout: Duration,
    ) -> Result<Self> {
        let model_name = model.unwrap_or(DEFAULT_EMBEDDING_MODEL).to_string();
        let dimension = dimension.unwrap_or_else(|| Self::get_dimension_for_model(&model_name));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for Ollama")?;

        Ok(Self {
            client,
            base_url: base_url.unwrap_or(DEFAULT_OLLAMA_URL).trim_end_matches('/').to_string(),
            model: model_name,
            dimension: AtomicUsize::new(dimension),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct OllamaEmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

#[async_trait::async_trait]
impl EmbeddingProvider for OllamaEmbeddingProvider {
    async fn compute_embedding(&self, content: &str) -> Result<Vec<f32>> {
        let content = content.trim();
        if content.is_empty() {
            anyhow::bail!("Cannot generate embedding for empty content");
        }

        let url = format!("{}/api/embeddings", self.base_url);
        let request = OllamaEmbeddingRequest {
            model: &self.model,
            prompt: content,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to connect to Ollama at {}", self.base_url))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama API returned error {}: {}", status, error_text);
        }

        let embedding_response: OllamaEmbeddingResponse = response
            .json()
            .await
            .context("Failed to parse Ollama embedding response")?;

        if embedding_response.embedding.is_empty() {
            anyhow::bail!("Ollama returned empty embedding (dimension 0) for model '{}'", self.model);
        }

        let actual_dimension = embedding_response.embedding.len();
        let expected_dimension = self.dimension.load(Ordering::Relaxed);
        if actual_dimension != expected_dimension {
            warn!(
                model = %self.model,
                actual = actual_dimension,
                expected = expected_dimension,
                "Embedding dimension differs from configuration, updating"
            );
            self.dimension.store(actual_dimension, Ordering::Relaxed);
        }

        Ok(embedding_response.embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(base_url: Option<&str>, model: Option<&str>, dims: Option<usize>) -> OllamaEmbeddingProvider {
        OllamaEmbeddingProvider::new(base_url, model, dims, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_ollama_embedding_provider_creation() {
        let provider = provider(None, None, None);
        assert_eq!(provider.base_url, "http://127.0.0.1:11434");
        assert_eq!(provider.model(), "all-minilm");
        assert_eq!(provider.dimension(), 384);
    }

    #[test]
    fn test_ollama_embedding_provider_with_explicit_dims() {
        let provider = provider(None, Some("custom-model"), Some(1024));
        assert_eq!(provider.model(), "custom-model");
        assert_eq!(provider.dimension(), 1024);
    }

    #[test]
    fn test_get_dimension_for_model() {
        assert_eq!(OllamaEmbeddingProvider::get_dimension_for_model("all-minilm:l6-v2"), 384);
        assert_eq!(OllamaEmbeddingProvider::get_dimension_for_model("mxbai-embed-large"), 1024);
        assert_eq!(OllamaEmbeddingProvider::get_dimension_for_model("nomic-embed-text"), 768);
        assert_eq!(OllamaEmbeddingProvider::get_dimension_for_model("unknown-model"), 384);
    }

    #[test]
    fn test_trailing_slash_trimmed_from_url() {
        let provider = provider(Some("http://localhost:8080/"), None, None);
        assert_eq!(provider.base_url, "http://localhost:8080");
    }

    #[tokio::test]
    async fn test_empty_content_rejected_without_request() {
        let provider = provider(Some("http://127.0.0.1:9"), None, None);
        let err = provider.compute_embedding("   ").await.unwrap_err();
        assert!(err.to_string().contains("empty content"));
    }

    #[tokio::test]
    #[ignore] // Requires Ollama server running
    async fn test_ollama_embedding_provider_compute() {
        let provider = provider(None, None, None);
        let embedding = provider.compute_embedding("test content").await.unwrap();
        assert_eq!(embedding.len(), 384);
        assert!(!embedding.iter().all(|&x| x == 0.0));
    }
}
