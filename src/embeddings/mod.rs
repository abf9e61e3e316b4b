pub mod r#trait;
pub mod ollama;

pub use ollama::OllamaEmbeddingProvider;
pub use r#trait::EmbeddingProvider;
