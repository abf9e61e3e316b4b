use crate::index::generation::IndexGeneration;
use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

const GENERATION_PREFIX: &str = "gen-";
const GENERATION_FILE: &str = "generation.json";

/// A storage release that did not go through.
///
/// Cleanup is best-effort: callers log the warning and carry on.
#[derive(Debug)]
pub struct CleanupWarning {
    pub path: PathBuf,
    pub error: std::io::Error,
}

impl fmt::Display for CleanupWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not remove {}: {}", self.path.display(), self.error)
    }
}

/// Remove a directory tree, reporting instead of failing.
/// A directory that is already gone counts as removed.
pub async fn remove_best_effort(path: &Path) -> Option<CleanupWarning> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => {
            debug!(path = %path.display(), "Removed index directory");
            None
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(error) => Some(CleanupWarning {
            path: path.to_path_buf(),
            error,
        }),
    }
}

/// On-disk layout for index generations: one directory per generation under `root`
#[derive(Debug, Clone)]
pub struct GenerationStore {
    root: PathBuf,
}

impl GenerationStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn generation_dir(&self, id: u64) -> PathBuf {
        self.root.join(format!("{}{}", GENERATION_PREFIX, id))
    }

    /// Write a generation into its own directory and return that directory.
    /// A partially written directory is removed before the error is returned.
    pub async fn write(&self, generation: &IndexGeneration) -> Result<PathBuf> {
        let dir = self.generation_dir(generation.id);
        match Self::write_into(&dir, generation).await {
            Ok(()) => Ok(dir),
            Err(e) => {
                if let Some(warning) = remove_best_effort(&dir).await {
                    tracing::warn!(%warning, "Failed to clean up partial index directory");
                }
                Err(e)
            }
        }
    }

    async fn write_into(dir: &Path, generation: &IndexGeneration) -> Result<()> {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create index directory: {}", dir.display()))?;

        let bytes = serde_json::to_vec(generation).context("Failed to serialize index generation")?;
        let file = dir.join(GENERATION_FILE);
        tokio::fs::write(&file, bytes)
            .await
            .with_context(|| format!("Failed to write index file: {}", file.display()))?;
        Ok(())
    }

    /// Read a generation back from disk
    #[cfg(test)]
    pub async fn read(&self, id: u64) -> Result<IndexGeneration> {
        let dir = self.generation_dir(id);
        let file = dir.join(GENERATION_FILE);
        let bytes = tokio::fs::read(&file)
            .await
            .with_context(|| format!("Failed to read index file: {}", file.display()))?;
        let mut generation: IndexGeneration =
            serde_json::from_slice(&bytes).context("Failed to parse index generation")?;
        generation.dir = Some(dir);
        Ok(generation)
    }

    /// Remove generation directories left behind by earlier processes.
    ///
    /// Only directories named `gen-<id>` that hold a `generation.json` are
    /// touched; anything else under the root belongs to the user.
    pub async fn purge_stale(&self) -> Vec<CleanupWarning> {
        let mut warnings = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(_) => return warnings,
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            let named_like_generation = entry.file_name().to_str().and_then(parse_generation_id).is_some();
            if !named_like_generation || !Self::is_owned(&path).await {
                continue;
            }
            if let Some(warning) = remove_best_effort(&path).await {
                warnings.push(warning);
            }
        }
        warnings
    }

    async fn is_owned(dir: &Path) -> bool {
        tokio::fs::metadata(dir.join(GENERATION_FILE))
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }
}

/// Generation id from a directory name of the form `gen-<digits>`
fn parse_generation_id(name: &str) -> Option<u64> {
    let digits = name.strip_prefix(GENERATION_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
