use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Pipeline stage an ingestion failure originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extract,
    Chunk,
    Index,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Extract => "extract",
            Stage::Chunk => "chunk",
            Stage::Index => "index",
        };
        f.write_str(name)
    }
}

/// Errors produced by the ingestion and answering pipelines
#[derive(Error, Debug)]
pub enum Error {
    /// The file could not be opened, is not a valid document, or has no pages
    #[error("failed to extract text from {}: {reason}", path.display())]
    Extraction { path: PathBuf, reason: String },

    /// Every page was blank after trimming
    #[error("no text content extracted from {}; the PDF may be image-only or corrupted", path.display())]
    EmptyContent { path: PathBuf },

    #[error("no valid chunks created after splitting; the document content may be insufficient")]
    NoChunks,

    /// Building a new index generation failed; the previous generation is untouched
    #[error("index build failed: {0:#}")]
    Build(#[source] anyhow::Error),

    #[error("no index has been built yet")]
    NoIndex,

    #[error("the index contains no entries")]
    EmptyResult,

    #[error("unknown mode '{0}' (expected General, Teacher or ExamPrep)")]
    UnknownMode(String),

    /// An embedding or completion backend call failed
    #[error("{provider} provider failed: {source:#}")]
    Provider {
        provider: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// Ingestion failure with the file and stage it happened in
    #[error("error ingesting {}: {stage} stage failed: {source}", path.display())]
    Ingest {
        path: PathBuf,
        stage: Stage,
        #[source]
        source: Box<Error>,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn ingest(path: impl Into<PathBuf>, stage: Stage, source: Error) -> Self {
        Error::Ingest {
            path: path.into(),
            stage,
            source: Box::new(source),
        }
    }

    /// Strip ingestion context wrappers and return the originating error
    pub fn root(&self) -> &Error {
        match self {
            Error::Ingest { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
