use crate::models::{Chunk, Document, ScoredChunk};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A chunk stored alongside its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedChunk {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// All (chunk, vector) pairs produced by one ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexGeneration {
    pub id: u64,
    pub document: Document,
    pub dimension: usize,
    pub entries: Vec<IndexedChunk>,
    /// Directory holding this generation on disk, if persisted
    #[serde(skip)]
    pub(crate) dir: Option<PathBuf>,
}

impl IndexGeneration {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dir(&self) -> Option<&PathBuf> {
        self.dir.as_ref()
    }

    /// The `k` entries most similar to `query`, nearest first.
    ///
    /// Equal scores keep chunk order.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<(f32, &IndexedChunk)> = self
            .entries
            .iter()
            .map(|entry| (cosine_similarity(query, &entry.embedding), entry))
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        scored
            .into_iter()
            .take(k)
            .map(|(score, entry)| ScoredChunk {
                chunk: entry.chunk.clone(),
                score,
            })
            .collect()
    }
}

/// Cosine similarity, 0.0 for mismatched lengths, zero vectors or overflow
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let similarity = dot / (norm_a * norm_b);
    if similarity.is_finite() {
        similarity
    } else {
        0.0
    }
}
