use anyhow::Result;

/// Trait for text-completion backends that turn a prompt into generated text
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate a completion for the prompt, returned as plain text
    async fn complete(&self, prompt: &str) -> Result<String>;
}
