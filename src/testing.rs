//! Deterministic stand-ins for the external collaborators, used by unit tests.

use crate::embeddings::EmbeddingProvider;
use crate::error::{Error, Result};
use crate::extractor::TextExtractor;
use crate::llm::CompletionProvider;
use crate::models::{Chunk, Document, Page};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn document(path: &str) -> Document {
    Document {
        path: PathBuf::from(path),
        hash: format!("hash-of-{}", path),
    }
}

pub fn chunks_from(texts: &[&str]) -> Vec<Chunk> {
    texts
        .iter()
        .enumerate()
        .map(|(index, text)| Chunk {
            index,
            page: 1,
            offset: 0,
            text: text.to_string(),
        })
        .collect()
}

/// Hashes lowercase words into a fixed number of buckets
pub struct BagOfWordsEmbedder {
    dims: usize,
}

impl BagOfWordsEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims }
    }

    fn embed(&self, content: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dims];
        for word in content
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            let bucket = (hasher.finish() % self.dims as u64) as usize;
            vector[bucket] += 1.0;
        }
        vector
    }
}

impl Default for BagOfWordsEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for BagOfWordsEmbedder {
    async fn compute_embedding(&self, content: &str) -> anyhow::Result<Vec<f32>> {
        Ok(self.embed(content))
    }

    fn dimension(&self) -> usize {
        self.dims
    }
}

/// Behaves like `BagOfWordsEmbedder` except on one configured call
pub struct FailingEmbedder {
    inner: BagOfWordsEmbedder,
    fail_on: usize,
    calls: AtomicUsize,
}

impl FailingEmbedder {
    /// Fail the `call`-th request (1-based) only
    pub fn on_call(call: usize) -> Self {
        Self {
            inner: BagOfWordsEmbedder::default(),
            fail_on: call,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn compute_embedding(&self, content: &str) -> anyhow::Result<Vec<f32>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on {
            anyhow::bail!("simulated embedding outage on call {}", call);
        }
        self.inner.compute_embedding(content).await
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }
}

/// `BagOfWordsEmbedder` whose batch calls yield between items and record how
/// many batches were in flight at once
#[derive(Default)]
pub struct YieldingEmbedder {
    inner: BagOfWordsEmbedder,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl YieldingEmbedder {
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for YieldingEmbedder {
    async fn compute_embedding(&self, content: &str) -> anyhow::Result<Vec<f32>> {
        tokio::task::yield_now().await;
        self.inner.compute_embedding(content).await
    }

    async fn compute_embeddings(&self, contents: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        let active = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(active, Ordering::SeqCst);

        let mut vectors = Vec::with_capacity(contents.len());
        for content in contents {
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
            vectors.push(self.inner.compute_embedding(content).await?);
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }
}

/// Records every prompt and answers with a fixed reply
pub struct RecordingCompletion {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl RecordingCompletion {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CompletionProvider for RecordingCompletion {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}

pub struct FailingCompletion;

#[async_trait::async_trait]
impl CompletionProvider for FailingCompletion {
    async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
        anyhow::bail!("401 Unauthorized: invalid API key")
    }
}

/// Serves canned pages per path, with the same failure rules as a real extractor
#[derive(Default)]
pub struct StaticExtractor {
    documents: Mutex<HashMap<PathBuf, Vec<Page>>>,
}

impl StaticExtractor {
    pub fn with_document(self, path: &Path, pages: &[&str]) -> Self {
        let pages = pages
            .iter()
            .enumerate()
            .map(|(i, text)| Page::new(i + 1, *text))
            .collect();
        self.documents.lock().unwrap().insert(path.to_path_buf(), pages);
        self
    }
}

#[async_trait::async_trait]
impl TextExtractor for StaticExtractor {
    async fn extract(&self, path: &Path) -> Result<Vec<Page>> {
        let pages = self
            .documents
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| Error::Extraction {
                path: path.to_path_buf(),
                reason: "file not found".to_string(),
            })?;

        if pages.is_empty() {
            return Err(Error::Extraction {
                path: path.to_path_buf(),
                reason: "no pages found".to_string(),
            });
        }
        if pages.iter().all(Page::is_blank) {
            return Err(Error::EmptyContent {
                path: path.to_path_buf(),
            });
        }
        Ok(pages)
    }

    fn supports_extension(&self, _ext: &str) -> bool {
        true
    }
}
