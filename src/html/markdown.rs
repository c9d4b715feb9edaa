//! HTML to Markdown conversion.

use htmd::HtmlToMarkdown;

use crate::types::ChunkError;

/// Converts HTML to Markdown with ATX (`#`) headings, keeping tables and
/// code fences, skipping `<script>` and `<style>` entirely.
///
/// Construct once and reuse; conversion itself is pure.
pub struct MarkdownConverter {
    inner: HtmlToMarkdown,
}

impl MarkdownConverter {
    pub fn new() -> Self {
        Self {
            inner: HtmlToMarkdown::builder()
                .skip_tags(vec!["script", "style"])
                .build(),
        }
    }

    pub fn convert(&self, html: &str) -> Result<String, ChunkError> {
        self.inner
            .convert(html)
            .map_err(|err| ChunkError::MarkdownConversion(err.to_string()))
    }
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}
