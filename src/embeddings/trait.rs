use anyhow::{Context, Result};

/// Trait for embedding providers that can compute semantic vectors from text
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Compute embedding vector from text content
    async fn compute_embedding(&self, content: &str) -> Result<Vec<f32>>;

    /// Get the dimension of embeddings produced by this provider
    fn dimension(&self) -> usize;

    /// Compute one embedding per input, preserving input order.
    ///
    /// The default implementation embeds sequentially and stops at the first
    /// failure. Providers with a native batch endpoint can override it.
    async fn compute_embeddings(&self, contents: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(contents.len());
        for (i, content) in contents.iter().enumerate() {
            let embedding = self
                .compute_embedding(content)
                .await
                .with_context(|| format!("Failed to compute embedding for chunk {}/{}", i + 1, contents.len()))?;

            if embedding.is_empty() {
                anyhow::bail!("Empty embedding returned for chunk {}/{}", i + 1, contents.len());
            }
            embeddings.push(embedding);
        }
        Ok(embeddings)
    }
}
