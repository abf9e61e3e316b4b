pub mod assistant;
pub mod chunker;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod extractor;
pub mod index;
pub mod llm;
pub mod models;
pub mod prompt;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use assistant::{Assistant, NO_INDEX_RESPONSE};
pub use chunker::{ChunkConfig, Chunker};
pub use embeddings::EmbeddingProvider;
pub use error::{Error, Result, Stage};
pub use extractor::TextExtractor;
pub use index::VectorIndex;
pub use llm::CompletionProvider;
pub use models::{Chunk, Document, IngestReport, Mode, Page, ScoredChunk};
