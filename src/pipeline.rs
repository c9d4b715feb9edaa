//! Per-document orchestration from raw HTML bytes to positioned chunks.

use std::sync::Arc;

use crate::artifact::{build_artifacts, position_chunks, Artifact, UrlMapper};
use crate::chunking::assembler::ChunkAssembler;
use crate::config::ChunkingConfig;
use crate::html::content::{
    decode_html, extract_category_paths, extract_main_content, extract_title,
};
use crate::html::markdown::MarkdownConverter;
use crate::quality::apply_quality_filters;
use crate::tokenizer::TokenCounter;
use crate::types::{ChunkError, PositionedChunk};

/// An HTML document as handed to the pipeline: raw bytes plus the storage
/// path identifying it. Immutable input.
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    pub raw_html: Vec<u8>,
    pub source_path: String,
}

impl HtmlDocument {
    pub fn new(raw_html: impl Into<Vec<u8>>, source_path: impl Into<String>) -> Self {
        Self {
            raw_html: raw_html.into(),
            source_path: source_path.into(),
        }
    }
}

/// Synchronous, reentrant chunking pipeline.
///
/// Holds the shared token counter and configuration. Each invocation works on
/// its own buffers and touches no shared mutable state, so one pipeline can
/// serve many worker threads; callers that want a deadline bound document
/// size externally.
pub struct ChunkPipeline {
    counter: Arc<dyn TokenCounter>,
    converter: MarkdownConverter,
    config: ChunkingConfig,
    url_mapper: UrlMapper,
}

impl ChunkPipeline {
    pub fn new(counter: Arc<dyn TokenCounter>, config: ChunkingConfig) -> Self {
        Self {
            counter,
            converter: MarkdownConverter::new(),
            config,
            url_mapper: UrlMapper::default(),
        }
    }

    /// Installs URL rewrite rules for deriving public chunk URLs.
    #[must_use]
    pub fn with_url_mapper(mut self, mapper: UrlMapper) -> Self {
        self.url_mapper = mapper;
        self
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Chunks one document into an ordered, filtered, positioned sequence.
    pub fn chunk_document(&self, doc: &HtmlDocument) -> Result<Vec<PositionedChunk>, ChunkError> {
        let file_name = doc
            .source_path
            .rsplit('/')
            .next()
            .unwrap_or(doc.source_path.as_str());
        tracing::info!(
            file = file_name,
            strategy = %self.config.strategy,
            "chunking html document"
        );

        let html = decode_html(&doc.raw_html, &doc.source_path);
        let clean = extract_main_content(&html, self.config.extract_main_content);
        let markdown = self.converter.convert(&clean)?;

        let assembled =
            ChunkAssembler::new(self.counter.as_ref(), &self.config).assemble(&markdown);
        let kept = apply_quality_filters(assembled);
        let positioned = position_chunks(&kept, &doc.source_path, &self.url_mapper);

        tracing::info!(
            file = file_name,
            chunks = positioned.len(),
            "chunking complete"
        );
        Ok(positioned)
    }

    /// Chunks one document and wraps the result in indexer artifacts, pulling
    /// title and category metadata from the raw HTML.
    pub fn build_document_artifacts(&self, doc: &HtmlDocument) -> Result<Vec<Artifact>, ChunkError> {
        let html = decode_html(&doc.raw_html, &doc.source_path);
        let title = extract_title(&html, &doc.source_path);
        let categories = extract_category_paths(&html, &doc.source_path);
        let chunks = self.chunk_document(doc)?;
        Ok(build_artifacts(&chunks, &categories, &title, &doc.source_path))
    }
}
