use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// The file being ingested, identified by path and content hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub path: PathBuf,
    /// Blake3 hash of the file contents
    pub hash: String,
}

/// Text extracted from a single page of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number
    pub number: usize,
    pub text: String,
}

impl Page {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A contiguous segment of page text, the unit that gets embedded and retrieved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position of the chunk in the ingestion output
    pub index: usize,
    /// Page the chunk was cut from
    pub page: usize,
    /// Character offset of the chunk start within its page
    pub offset: usize,
    pub text: String,
}

/// A chunk returned by retrieval, with its similarity to the query
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Response style used when answering a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    General,
    Teacher,
    ExamPrep,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::General, Mode::Teacher, Mode::ExamPrep];

    pub fn label(&self) -> &'static str {
        match self {
            Mode::General => "General",
            Mode::Teacher => "Teacher",
            Mode::ExamPrep => "Exam Prep",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "general" => Ok(Mode::General),
            "teacher" => Ok(Mode::Teacher),
            "examprep" => Ok(Mode::ExamPrep),
            _ => Err(Error::UnknownMode(s.to_string())),
        }
    }
}

/// Summary of a successful ingestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub document: Document,
    pub generation: u64,
    pub pages: usize,
    pub chunks: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parses_canonical_names() {
        assert_eq!("General".parse::<Mode>().unwrap(), Mode::General);
        assert_eq!("Teacher".parse::<Mode>().unwrap(), Mode::Teacher);
        assert_eq!("ExamPrep".parse::<Mode>().unwrap(), Mode::ExamPrep);
    }

    #[test]
    fn test_mode_parses_ui_labels() {
        assert_eq!("Exam Prep".parse::<Mode>().unwrap(), Mode::ExamPrep);
        assert_eq!("exam-prep".parse::<Mode>().unwrap(), Mode::ExamPrep);
        assert_eq!(" teacher ".parse::<Mode>().unwrap(), Mode::Teacher);
    }

    #[test]
    fn test_mode_rejects_unknown() {
        let err = "BogusMode".parse::<Mode>().unwrap_err();
        assert!(matches!(err, Error::UnknownMode(ref m) if m == "BogusMode"));
    }

    #[test]
    fn test_mode_label_round_trips() {
        for mode in Mode::ALL {
            assert_eq!(mode.label().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_page_blank_detection() {
        assert!(Page::new(1, "  \n\t ").is_blank());
        assert!(!Page::new(1, " text ").is_blank());
    }

    #[test]
    fn test_chunk_serialization() {
        let chunk = Chunk {
            index: 2,
            page: 1,
            offset: 900,
            text: "Mitochondria are the powerhouse of the cell.".to_string(),
        };
        let serialized = serde_json::to_string(&chunk).unwrap();
        let deserialized: Chunk = serde_json::from_str(&serialized).unwrap();
        assert_eq!(chunk, deserialized);
    }
}
