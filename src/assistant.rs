use crate::chunker::Chunker;
use crate::config::Config;
use crate::embeddings::{EmbeddingProvider, OllamaEmbeddingProvider};
use crate::error::{Error, Result, Stage};
use crate::extractor::{PdfExtractor, TextExtractor};
use crate::index::{VectorIndex, DEFAULT_TOP_K};
use crate::llm::{ChatCompletionProvider, CompletionProvider};
use crate::models::{Document, IngestReport, Mode};
use crate::prompt;
use crate::utils;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Returned by `answer` while no document has been ingested
pub const NO_INDEX_RESPONSE: &str = "Please upload your notes first!";

/// Question used by `generate_quiz`
pub const QUIZ_QUERY: &str = "Generate 3 multiple choice questions based on these notes.";

const CONTEXT_SEPARATOR: &str = "\n\n";

/// Study assistant: ingests one document at a time and answers questions about it
pub struct Assistant {
    extractor: Arc<dyn TextExtractor>,
    chunker: Chunker,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn CompletionProvider>,
    index: VectorIndex,
    top_k: usize,
    ingest_lock: Mutex<()>,
}

impl Assistant {
    /// Create an assistant with an in-memory index and default chunking
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn CompletionProvider>,
    ) -> Self {
        Self {
            extractor,
            chunker: Chunker::default(),
            embedder,
            llm,
            index: VectorIndex::in_memory(),
            top_k: DEFAULT_TOP_K,
            ingest_lock: Mutex::new(()),
        }
    }

    /// Build the PDF + Ollama + chat-completion assistant described by `config`
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        config.validate()?;

        let embedder = OllamaEmbeddingProvider::new(
            Some(&config.embedding.url),
            Some(&config.embedding.model),
            config.embedding.dims,
            config.embedding.timeout(),
        )?;

        let llm = ChatCompletionProvider::new(config.llm_api_key().unwrap_or_default(), config.llm.timeout())?
            .with_api_base(&config.llm.api_base)
            .with_model(&config.llm.model)
            .with_temperature(config.llm.temperature);

        let index = match config.persist_dir() {
            Some(dir) => VectorIndex::persistent(dir).await,
            None => VectorIndex::in_memory(),
        };

        Ok(Self::new(Arc::new(PdfExtractor::new()), Arc::new(embedder), Arc::new(llm))
            .with_chunker(Chunker::new(config.chunking)?)
            .with_index(index)
            .with_top_k(config.retrieval.top_k))
    }

    pub fn with_chunker(mut self, chunker: Chunker) -> Self {
        self.chunker = chunker;
        self
    }

    pub fn with_index(mut self, index: VectorIndex) -> Self {
        self.index = index;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub async fn has_index(&self) -> bool {
        self.index.is_built().await
    }

    /// Index `path`, replacing whatever was indexed before.
    ///
    /// Extraction and chunking complete before the index is touched, so a
    /// failure at any stage leaves the previous index answering queries.
    pub async fn ingest(&self, path: impl AsRef<Path>) -> Result<IngestReport> {
        let path = path.as_ref();
        let _guard = self.ingest_lock.lock().await;
        info!(path = %path.display(), "Ingesting document");

        if let Some(ext) = utils::get_extension(path) {
            if !self.extractor.supports_extension(&ext) {
                let source = Error::Extraction {
                    path: path.to_path_buf(),
                    reason: format!("unsupported file type '.{}'", ext),
                };
                return Err(Error::ingest(path, Stage::Extract, source));
            }
        }

        let pages = self
            .extractor
            .extract(path)
            .await
            .map_err(|e| Error::ingest(path, Stage::Extract, e))?;

        let owned = path.to_path_buf();
        let hash = tokio::task::spawn_blocking(move || utils::compute_file_hash(&owned))
            .await
            .map_err(anyhow::Error::from)
            .and_then(|hashed| hashed)
            .map_err(|e| {
                let source = Error::Extraction {
                    path: path.to_path_buf(),
                    reason: format!("{:#}", e),
                };
                Error::ingest(path, Stage::Extract, source)
            })?;

        let chunks = self
            .chunker
            .split(&pages)
            .map_err(|e| Error::ingest(path, Stage::Chunk, e))?;
        debug!(pages = pages.len(), chunks = chunks.len(), "Split document into chunks");

        let document = Document {
            path: path.to_path_buf(),
            hash,
        };
        let generation = self
            .index
            .replace(document, chunks, self.embedder.as_ref())
            .await
            .map_err(|e| Error::ingest(path, Stage::Index, e))?;

        Ok(IngestReport {
            document: generation.document.clone(),
            generation: generation.id,
            pages: pages.len(),
            chunks: generation.len(),
        })
    }

    /// Retrieved chunk texts joined in rank order, as fed to the prompt
    pub async fn retrieve_context(&self, query: &str) -> Result<String> {
        let results = self.index.retrieve(query, self.embedder.as_ref(), self.top_k).await?;
        let texts: Vec<&str> = results.iter().map(|r| r.chunk.text.as_str()).collect();
        Ok(texts.join(CONTEXT_SEPARATOR))
    }

    /// Answer `query` from the indexed notes in the given style.
    ///
    /// Before any document is ingested this returns `NO_INDEX_RESPONSE`.
    pub async fn answer(&self, query: &str, mode: Mode) -> Result<String> {
        let context = match self.retrieve_context(query).await {
            Ok(context) => context,
            Err(Error::NoIndex) => return Ok(NO_INDEX_RESPONSE.to_string()),
            Err(e) => return Err(e),
        };

        let prompt = prompt::build(mode, &context, query);
        debug!(%mode, prompt_len = prompt.len(), "Requesting completion");

        self.llm
            .complete(&prompt)
            .await
            .map_err(|source| Error::Provider {
                provider: "completion",
                source,
            })
    }

    /// `answer` with the mode given by name, rejecting unknown names
    pub async fn answer_with_mode_str(&self, query: &str, mode: &str) -> Result<String> {
        let mode: Mode = mode.parse()?;
        self.answer(query, mode).await
    }

    /// Three multiple-choice questions drawn from the notes
    pub async fn generate_quiz(&self) -> Result<String> {
        self.answer(QUIZ_QUERY, Mode::General).await
    }
}
