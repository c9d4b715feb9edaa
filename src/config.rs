//! Configuration for the chunking engine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Strategy used to decide where a document is split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChunkingStrategy {
    /// Token-budget splitting with no heading awareness.
    #[default]
    #[serde(rename = "fixed_size")]
    FixedSize,
    /// Split on `#` headings, falling back to `##`, then to fixed-size.
    #[serde(rename = "h1_heading_based")]
    H1HeadingBased,
    /// Split on `#` and `##` headings simultaneously, `##` winning as label.
    #[serde(rename = "h2_heading_based")]
    H2HeadingBased,
}

impl ChunkingStrategy {
    /// Parses a strategy name, substituting the default for unknown names.
    ///
    /// An unrecognized name is a recoverable condition, not an error: a
    /// warning is logged and chunking proceeds with
    /// [`ChunkingStrategy::FixedSize`].
    pub fn parse_or_default(name: &str) -> Self {
        match name {
            "fixed_size" | "fixed" => Self::FixedSize,
            "h1_heading_based" | "h1_based" => Self::H1HeadingBased,
            "h2_heading_based" | "h2_based" => Self::H2HeadingBased,
            other => {
                tracing::warn!(
                    strategy = other,
                    "unknown chunking strategy, defaulting to fixed_size"
                );
                Self::FixedSize
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FixedSize => "fixed_size",
            Self::H1HeadingBased => "h1_heading_based",
            Self::H2HeadingBased => "h2_heading_based",
        }
    }
}

impl fmt::Display for ChunkingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tunables for a single chunking invocation.
///
/// Builder-style setters, all `#[must_use]`. Defaults mirror the production
/// pipeline: 750-token chunks with 100 tokens of overlap and no main-content
/// extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum tokens per emitted chunk. A soft cap: indivisible runs larger
    /// than the budget are emitted rather than failing.
    pub chunk_size: usize,
    /// Tokens of shared context between consecutive pieces of a split.
    /// Must be smaller than `chunk_size`; larger values are clamped.
    pub chunk_overlap: usize,
    /// Strategy used to place split points.
    pub strategy: ChunkingStrategy,
    /// Strip navigation and boilerplate before Markdown conversion.
    pub extract_main_content: bool,
    /// Sub-pieces below this token count are folded into their predecessor by
    /// the H1 strategy's merge pass.
    pub merge_threshold_tokens: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 750,
            chunk_overlap: 100,
            strategy: ChunkingStrategy::default(),
            extract_main_content: false,
            merge_threshold_tokens: 50,
        }
    }
}

impl ChunkingConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn chunk_size(mut self, tokens: usize) -> Self {
        self.chunk_size = tokens.max(1);
        self
    }

    #[must_use]
    pub fn chunk_overlap(mut self, tokens: usize) -> Self {
        self.chunk_overlap = tokens;
        self
    }

    #[must_use]
    pub fn strategy(mut self, strategy: ChunkingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub fn extract_main_content(mut self, enabled: bool) -> Self {
        self.extract_main_content = enabled;
        self
    }

    #[must_use]
    pub fn merge_threshold_tokens(mut self, tokens: usize) -> Self {
        self.merge_threshold_tokens = tokens;
        self
    }
}
