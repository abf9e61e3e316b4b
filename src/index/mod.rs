//! Vector index holding a single live generation of embedded chunks.
//!
//! A generation is built completely (every chunk embedded and, when a
//! persist directory is configured, written to its own directory) before it
//! is swapped in. Readers clone the `Arc` of the live generation, so a
//! retrieval always sees exactly one generation.

pub mod generation;
pub mod store;

pub use generation::{IndexGeneration, IndexedChunk};
pub use store::{remove_best_effort, CleanupWarning, GenerationStore};

use crate::embeddings::EmbeddingProvider;
use crate::error::{Error, Result};
use crate::models::{Chunk, Document, ScoredChunk};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Default number of chunks returned by `retrieve`
pub const DEFAULT_TOP_K: usize = 4;

pub struct VectorIndex {
    current: RwLock<Option<Arc<IndexGeneration>>>,
    store: Option<GenerationStore>,
    next_id: AtomicU64,
}

impl VectorIndex {
    /// Index that keeps generations in memory only
    pub fn in_memory() -> Self {
        Self {
            current: RwLock::new(None),
            store: None,
            next_id: AtomicU64::new(1),
        }
    }

    /// Index that also writes each generation under `dir`.
    ///
    /// Generation directories left by a previous process are purged first.
    pub async fn persistent(dir: impl Into<PathBuf>) -> Self {
        let store = GenerationStore::new(dir);
        for warning in store.purge_stale().await {
            warn!(%warning, "Failed to purge stale index generation");
        }
        Self {
            current: RwLock::new(None),
            store: Some(store),
            next_id: AtomicU64::new(1),
        }
    }

    /// Snapshot of the live generation
    pub async fn current(&self) -> Option<Arc<IndexGeneration>> {
        self.current.read().await.clone()
    }

    pub async fn is_built(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// Embed `chunks` and assemble a new generation without installing it.
    ///
    /// Any failure is reported as `Error::Build`; nothing observable changes.
    pub async fn build(
        &self,
        document: Document,
        chunks: Vec<Chunk>,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<IndexGeneration> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = embedder.compute_embeddings(&texts).await.map_err(Error::Build)?;

        if embeddings.len() != chunks.len() {
            return Err(Error::Build(anyhow::anyhow!(
                "embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let dimension = embeddings.first().map(Vec::len).unwrap_or(0);
        if let Some(pos) = embeddings.iter().position(|e| e.is_empty() || e.len() != dimension) {
            return Err(Error::Build(anyhow::anyhow!(
                "embedding for chunk {} has dimension {}, expected {}",
                pos,
                embeddings[pos].len(),
                dimension
            )));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexedChunk { chunk, embedding })
            .collect();

        let mut generation = IndexGeneration {
            id,
            document,
            dimension,
            entries,
            dir: None,
        };

        if let Some(store) = &self.store {
            let dir = store.write(&generation).await.map_err(Error::Build)?;
            generation.dir = Some(dir);
        }

        debug!(generation = id, chunks = generation.len(), dimension, "Built index generation");
        Ok(generation)
    }

    /// Build a new generation, install it, then release the previous one.
    ///
    /// On failure the previous generation stays live. Failing to release the
    /// old generation's storage is logged and does not affect the new one.
    pub async fn replace(
        &self,
        document: Document,
        chunks: Vec<Chunk>,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<Arc<IndexGeneration>> {
        let generation = Arc::new(self.build(document, chunks, embedder).await?);

        let previous = {
            let mut current = self.current.write().await;
            current.replace(Arc::clone(&generation))
        };

        info!(
            generation = generation.id,
            chunks = generation.len(),
            source = %generation.document.path.display(),
            "Installed index generation"
        );

        if let Some(old) = previous {
            Self::retire(&old).await;
        }
        Ok(generation)
    }

    async fn retire(old: &IndexGeneration) {
        if let Some(dir) = &old.dir {
            if let Some(warning) = remove_best_effort(dir).await {
                warn!(generation = old.id, %warning, "Failed to release retired index generation");
            }
        }
        debug!(generation = old.id, "Retired index generation");
    }

    /// The `k` chunks nearest to `query`, nearest first
    pub async fn retrieve(
        &self,
        query: &str,
        embedder: &dyn EmbeddingProvider,
        k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let generation = self.current().await.ok_or(Error::NoIndex)?;
        if generation.is_empty() {
            return Err(Error::EmptyResult);
        }

        let query_embedding = embedder
            .compute_embedding(query)
            .await
            .map_err(|source| Error::Provider {
                provider: "embedding",
                source,
            })?;

        if query_embedding.len() != generation.dimension {
            return Err(Error::Provider {
                provider: "embedding",
                source: anyhow::anyhow!(
                    "query embedding has dimension {}, index generation {} has {}",
                    query_embedding.len(),
                    generation.id,
                    generation.dimension
                ),
            });
        }

        let results = generation.search(&query_embedding, k.max(1));
        debug!(
            generation = generation.id,
            requested = k,
            returned = results.len(),
            "Retrieved chunks"
        );
        Ok(results)
    }
}
