//! Heading-aware HTML chunking for retrieval indexing pipelines.
//!
//! `chunksmith` turns raw HTML documents into ordered, token-bounded text
//! chunks ready for search indexing. The interesting part is the chunking
//! engine: deciding where to split so each piece respects a token budget,
//! preserves heading structure, and small leftover fragments are merged
//! instead of emitted as low-value noise.
//!
//! ```text
//! Raw HTML bytes ──► html::content (decode, main-content isolation)
//!                              │
//!                              ▼
//!                 html::markdown (HTML → Markdown)
//!                              │
//!                              ▼
//!          chunking::assembler (fixed / h1 / h2 strategies)
//!                 │                          │
//!                 ├─► chunking::heading      └─► chunking::splitter
//!                              │
//!                              ▼
//!               quality (normalize + gibberish filter)
//!                              │
//!                              ▼
//!        artifact (positions, URLs, indexer artifact records)
//! ```
//!
//! The engine is synchronous, deterministic, and stateless across
//! invocations. The token counter is an injected capability
//! ([`tokenizer::TokenCounter`]) constructed once and shared; storage, HTTP,
//! and batch orchestration are external collaborators and live outside this
//! crate.

pub mod artifact;
pub mod chunking;
pub mod config;
pub mod html;
pub mod pipeline;
pub mod quality;
pub mod tokenizer;
pub mod types;

pub use artifact::{build_artifacts, position_chunks, Artifact, UrlMapper, UrlRule};
pub use chunking::assembler::ChunkAssembler;
pub use chunking::heading::{is_meaningful_split, split_on_headings, Section};
pub use chunking::splitter::RecursiveTokenSplitter;
pub use config::{ChunkingConfig, ChunkingStrategy};
pub use html::markdown::MarkdownConverter;
pub use pipeline::{ChunkPipeline, HtmlDocument};
pub use quality::{apply_quality_filters, is_gibberish, normalize_chunk_text};
#[cfg(feature = "tiktoken")]
pub use tokenizer::TiktokenCounter;
pub use tokenizer::{SharedTokenCounter, TokenCounter, WhitespaceCounter};
pub use types::{Chunk, ChunkError, PositionedChunk};
