use crate::error::{Error, Result};
use crate::models::{Chunk, Page};
use serde::{Deserialize, Serialize};

/// Sliding-window parameters, in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkConfig {
    #[serde(default = "default_max_len")]
    pub max_len: usize,
    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

fn default_max_len() -> usize {
    1000
}

fn default_overlap() -> usize {
    100
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_len: default_max_len(),
            overlap: default_overlap(),
        }
    }
}

impl ChunkConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_len == 0 {
            return Err(Error::Config("chunk max_len must be greater than zero".to_string()));
        }
        if self.overlap >= self.max_len {
            return Err(Error::Config(format!(
                "chunk overlap ({}) must be smaller than max_len ({})",
                self.overlap, self.max_len
            )));
        }
        Ok(())
    }
}

/// Splits page texts into overlapping windows that prefer natural boundaries
#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkConfig,
}

impl Chunker {
    pub fn new(config: ChunkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Split pages into chunks, dropping blank windows.
    ///
    /// Each page is windowed on its own so a chunk never straddles two pages.
    /// Returns `Error::NoChunks` when nothing survives.
    pub fn split(&self, pages: &[Page]) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::new();

        for page in pages {
            for (offset, text) in sliding_window(&page.text, self.config.max_len, self.config.overlap) {
                chunks.push(Chunk {
                    index: chunks.len(),
                    page: page.number,
                    offset,
                    text,
                });
            }
        }

        if chunks.is_empty() {
            return Err(Error::NoChunks);
        }
        Ok(chunks)
    }
}

/// Produce `(char_offset, trimmed_text)` windows over `text`.
fn sliding_window(text: &str, max_len: usize, overlap: usize) -> Vec<(usize, String)> {
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();
    let mut windows = Vec::new();
    let mut start = 0;

    while start < total {
        let target_end = (start + max_len).min(total);
        let end = if target_end == total {
            total
        } else {
            find_break_point(&chars, start, target_end)
        };

        let window = &chars[start..end];
        let leading = window.iter().take_while(|c| c.is_whitespace()).count();
        let content: String = window.iter().collect();
        let trimmed = content.trim();
        if !trimmed.is_empty() {
            windows.push((start + leading, trimmed.to_string()));
        }

        if end >= total {
            break;
        }

        let next = end.saturating_sub(overlap);
        start = if next > start { next } else { end };
    }

    windows
}

/// Best end position in the last fifth of `[start, target_end)`.
///
/// Paragraph breaks win over line breaks, line breaks over sentence ends,
/// sentence ends over plain whitespace. Without any of these the window is
/// cut hard at `target_end`.
fn find_break_point(chars: &[char], start: usize, target_end: usize) -> usize {
    let search_start = target_end - (target_end - start) / 5;
    let range = || (search_start..target_end).rev();

    for i in range() {
        if i + 1 < target_end && chars[i] == '\n' && chars[i + 1] == '\n' {
            return i + 2;
        }
    }

    for i in range() {
        if chars[i] == '\n' {
            return i + 1;
        }
    }

    for i in range() {
        if matches!(chars[i], '.' | '!' | '?') && i + 1 < chars.len() && chars[i + 1].is_whitespace() {
            return i + 1;
        }
    }

    for i in range() {
        if chars[i].is_whitespace() && i > start {
            return i;
        }
    }

    target_end
}
