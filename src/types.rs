//! Core data types shared across the chunking engine.

use serde::{Deserialize, Serialize};

/// A bounded unit of text emitted by the chunking engine for downstream
/// indexing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Final chunk text, including any rendered heading or continuation line.
    pub text: String,
    /// Heading label of the section this chunk came from. Empty for the
    /// fixed-size strategy and for preamble sections.
    #[serde(default)]
    pub heading: String,
}

impl Chunk {
    pub fn new(text: impl Into<String>, heading: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            heading: heading.into(),
        }
    }
}

/// A chunk frozen with its zero-based position in the document and the public
/// URL derived from the document's storage path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionedChunk {
    pub url: String,
    #[serde(rename = "chunk")]
    pub text: String,
    pub position: usize,
}

/// Errors surfaced by the chunking pipeline.
///
/// Recoverable conditions (unknown strategy names, undecodable bytes, absent
/// headings) are handled in place with a logged fallback and never appear
/// here.
#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    /// The HTML to Markdown converter rejected the document.
    #[error("markdown conversion failed: {0}")]
    MarkdownConversion(String),

    /// The token counter could not be constructed.
    #[error("tokenizer initialization failed: {0}")]
    Tokenizer(String),
}
