//! Strategy dispatch and chunk assembly.
//!
//! The assembler is the orchestrating core of the engine: it picks the
//! configured strategy, drives heading splitting and recursive splitting,
//! stitches oversize sections back together with continuation markers, and
//! merges undersized fragments so the output is not littered with tiny
//! low-value pieces.

use crate::chunking::heading::{is_meaningful_split, split_on_headings, Section};
use crate::chunking::splitter::RecursiveTokenSplitter;
use crate::config::{ChunkingConfig, ChunkingStrategy};
use crate::tokenizer::TokenCounter;
use crate::types::Chunk;

/// Assembles the ordered chunk list for one document's Markdown.
///
/// Stateless across invocations; safe to call concurrently as long as each
/// call gets its own input text.
pub struct ChunkAssembler<'a> {
    counter: &'a dyn TokenCounter,
    config: &'a ChunkingConfig,
}

impl<'a> ChunkAssembler<'a> {
    pub fn new(counter: &'a dyn TokenCounter, config: &'a ChunkingConfig) -> Self {
        Self { counter, config }
    }

    /// Runs the configured strategy over `markdown`.
    pub fn assemble(&self, markdown: &str) -> Vec<Chunk> {
        match self.config.strategy {
            ChunkingStrategy::FixedSize => self.fixed_size(markdown),
            ChunkingStrategy::H1HeadingBased => self.h1_heading_based(markdown),
            ChunkingStrategy::H2HeadingBased => self.h2_heading_based(markdown),
        }
    }

    fn splitter(&self, chunk_size: usize) -> RecursiveTokenSplitter<'a> {
        RecursiveTokenSplitter::new(self.counter, chunk_size, self.config.chunk_overlap)
    }

    /// Token-budget splitting of the whole text; headings are always empty.
    fn fixed_size(&self, markdown: &str) -> Vec<Chunk> {
        self.splitter(self.config.chunk_size)
            .split(markdown)
            .into_iter()
            .map(|text| Chunk::new(text, ""))
            .collect()
    }

    /// Level-1 heading chunking with the documented fallback chain:
    /// level 1 → level 2 → fixed-size.
    fn h1_heading_based(&self, markdown: &str) -> Vec<Chunk> {
        let mut sections = split_on_headings(markdown, &[1]);
        if !is_meaningful_split(&sections) {
            sections = split_on_headings(markdown, &[2]);
            if !is_meaningful_split(&sections) {
                tracing::debug!("no meaningful headings found, using fixed-size chunking");
                return self.fixed_size(markdown);
            }
        }

        let mut chunks = Vec::new();
        for section in &sections {
            let heading = section.label().unwrap_or("").to_string();
            let heading_line = match section.label_level() {
                Some(level) if !heading.is_empty() => render_heading_line(level, &heading),
                _ => String::new(),
            };
            self.emit_section(&mut chunks, section, &heading, &heading_line, true);
        }
        chunks
    }

    /// Level-1 + level-2 heading chunking. No fallback tier, and — unlike the
    /// H1 strategy — no small-fragment merging on the overflow path.
    fn h2_heading_based(&self, markdown: &str) -> Vec<Chunk> {
        let sections = split_on_headings(markdown, &[1, 2]);
        let mut chunks = Vec::new();
        for section in &sections {
            let heading = section.label().unwrap_or("").to_string();
            // Rendered at level-2 syntax regardless of which level supplied it.
            let heading_line = if heading.is_empty() {
                String::new()
            } else {
                render_heading_line(2, &heading)
            };
            self.emit_section(&mut chunks, section, &heading, &heading_line, false);
        }
        chunks
    }

    /// Emits one section as a single chunk when it fits, or as a run of
    /// sub-chunks prefixed with continuation markers when it overflows.
    fn emit_section(
        &self,
        out: &mut Vec<Chunk>,
        section: &Section,
        heading: &str,
        heading_line: &str,
        merge_small: bool,
    ) {
        let body = section.body.trim();
        let full = compose(heading_line, body);
        if full.trim().is_empty() {
            return;
        }
        if self.counter.count(&full) <= self.config.chunk_size {
            out.push(Chunk::new(full, heading));
            return;
        }

        // The continuation line is paid on every sub-chunk, so its token cost
        // comes out of the body budget.
        let continuation_line = if heading_line.is_empty() {
            "(continued)\n\n".to_string()
        } else {
            format!("{heading_line} (continued)\n\n")
        };
        let overhead = self.counter.count(&continuation_line);
        let body_budget = self.config.chunk_size.saturating_sub(overhead).max(1);

        let mut pieces = self.splitter(body_budget).split(body);
        if merge_small {
            pieces = self.merge_small_fragments(pieces, overhead);
        }

        for (i, piece) in pieces.into_iter().enumerate() {
            let text = if i == 0 {
                compose(heading_line, &piece)
            } else {
                format!("{continuation_line}{piece}")
            };
            out.push(Chunk::new(text, heading));
        }
    }

    /// Folds undersized fragments into their predecessor.
    ///
    /// Single forward scan with a pending accumulator: the current (possibly
    /// already merged) fragment absorbs the next one when the combined size
    /// still fits the budget alongside the continuation overhead and the next
    /// fragment is below the merge threshold. The fragment in the last
    /// position is never a merge target.
    fn merge_small_fragments(&self, pieces: Vec<String>, overhead: usize) -> Vec<String> {
        let mut merged = Vec::with_capacity(pieces.len());
        let mut pending: Option<String> = None;
        for (i, piece) in pieces.iter().enumerate() {
            let current = match pending.take() {
                Some(prev) => format!("{prev}\n\n{}", piece.trim()),
                None => piece.clone(),
            };
            if let Some(next) = pieces.get(i + 1) {
                let current_tokens = self.counter.count(&current);
                let next_tokens = self.counter.count(next);
                if current_tokens + next_tokens + overhead <= self.config.chunk_size
                    && next_tokens < self.config.merge_threshold_tokens
                {
                    pending = Some(current);
                    continue;
                }
            }
            merged.push(current);
        }
        debug_assert!(pending.is_none());
        merged
    }
}

fn compose(heading_line: &str, body: &str) -> String {
    if heading_line.is_empty() {
        body.to_string()
    } else if body.is_empty() {
        heading_line.to_string()
    } else {
        format!("{heading_line}\n\n{body}")
    }
}

fn render_heading_line(level: u8, heading: &str) -> String {
    format!("{} {heading}", "#".repeat(level as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::WhitespaceCounter;

    fn assemble(markdown: &str, config: &ChunkingConfig) -> Vec<Chunk> {
        ChunkAssembler::new(&WhitespaceCounter, config).assemble(markdown)
    }

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn small_headed_section_becomes_one_chunk() {
        let config = ChunkingConfig::new()
            .chunk_size(1000)
            .strategy(ChunkingStrategy::H1HeadingBased);
        let chunks = assemble("# A\n\nshort body", &config);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].heading, "A");
        assert_eq!(chunks[0].text, "# A\n\nshort body");
    }

    #[test]
    fn fixed_strategy_emits_empty_headings() {
        let config = ChunkingConfig::new()
            .chunk_size(5)
            .chunk_overlap(0)
            .strategy(ChunkingStrategy::FixedSize);
        let chunks = assemble(&words(12), &config);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.heading.is_empty());
            assert!(!chunk.text.trim().is_empty());
        }
    }

    #[test]
    fn h1_without_headings_matches_fixed_output() {
        let text = format!("{}\n\n{}", words(9), words(7));
        let fixed = assemble(
            &text,
            &ChunkingConfig::new().chunk_size(6).chunk_overlap(0),
        );
        let h1 = assemble(
            &text,
            &ChunkingConfig::new()
                .chunk_size(6)
                .chunk_overlap(0)
                .strategy(ChunkingStrategy::H1HeadingBased),
        );
        assert_eq!(fixed, h1);
    }

    #[test]
    fn h1_falls_back_to_level_two_headings() {
        let config = ChunkingConfig::new()
            .chunk_size(100)
            .strategy(ChunkingStrategy::H1HeadingBased);
        let chunks = assemble("## Only Subheadings\n\nbody here", &config);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].heading, "Only Subheadings");
        // Level-2 fallback keeps the `##` rendering.
        assert!(chunks[0].text.starts_with("## Only Subheadings"));
    }

    #[test]
    fn overflowing_section_gets_continuation_markers() {
        let config = ChunkingConfig::new()
            .chunk_size(20)
            .chunk_overlap(0)
            .strategy(ChunkingStrategy::H1HeadingBased);
        let markdown = format!("# Title\n\n{}", words(40));
        let chunks = assemble(&markdown, &config);
        assert!(chunks.len() > 1);
        assert!(chunks[0].text.starts_with("# Title\n\n"));
        for chunk in &chunks[1..] {
            assert!(chunk.text.starts_with("# Title (continued)\n\n"));
            assert_eq!(chunk.heading, "Title");
        }
    }

    #[test]
    fn h1_merges_small_trailing_fragment() {
        // Body splits into a 22-word run and a 5-word tail under a budget of
        // 25 - overhead(3) = 22; the tail merges into the 8-word remainder.
        let config = ChunkingConfig::new()
            .chunk_size(25)
            .chunk_overlap(0)
            .strategy(ChunkingStrategy::H1HeadingBased);
        let markdown = format!("# T\n\n{}\n\nsmall tail of five words", words(30));
        let chunks = assemble(&markdown, &config);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[1].text.contains("small tail of five words"));
    }

    #[test]
    fn h2_does_not_merge_small_fragments() {
        let config = ChunkingConfig::new()
            .chunk_size(25)
            .chunk_overlap(0)
            .strategy(ChunkingStrategy::H2HeadingBased);
        let markdown = format!("# T\n\n{}\n\nsmall tail of five words", words(30));
        let chunks = assemble(&markdown, &config);
        // Same input as the H1 merge test, one extra chunk: the asymmetry is
        // intentional.
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn h2_renders_all_headings_at_level_two() {
        let config = ChunkingConfig::new()
            .chunk_size(100)
            .strategy(ChunkingStrategy::H2HeadingBased);
        let chunks = assemble("# Top\n\nalpha\n\n## Nested\n\nbeta", &config);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].heading, "Top");
        assert!(chunks[0].text.starts_with("## Top\n\n"));
        assert_eq!(chunks[1].heading, "Nested");
        assert!(chunks[1].text.starts_with("## Nested\n\n"));
    }

    #[test]
    fn continuation_budget_shrinks_body_pieces() {
        let config = ChunkingConfig::new()
            .chunk_size(10)
            .chunk_overlap(0)
            .merge_threshold_tokens(0)
            .strategy(ChunkingStrategy::H1HeadingBased);
        let markdown = format!("# Heading Words Here\n\n{}", words(30));
        let chunks = assemble(&markdown, &config);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(
                WhitespaceCounter.count(&chunk.text) <= 10,
                "chunk over budget: {:?}",
                chunk.text
            );
        }
    }

    #[test]
    fn reconstruction_preserves_body_content() {
        let config = ChunkingConfig::new()
            .chunk_size(8)
            .chunk_overlap(0)
            .strategy(ChunkingStrategy::H1HeadingBased);
        let body = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
        let chunks = assemble(&format!("# T\n\n{body}"), &config);
        assert!(chunks.len() > 1);
        let mut rebuilt = Vec::new();
        for chunk in &chunks {
            // Drop the heading / continuation line.
            let (_, rest) = chunk.text.split_once("\n\n").unwrap();
            rebuilt.push(rest.trim());
        }
        assert_eq!(rebuilt.join(" "), body);
    }
}
