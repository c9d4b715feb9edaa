//! Recursive token-bounded text splitting.

use std::collections::VecDeque;

use crate::tokenizer::TokenCounter;

/// Separator priority, coarse to fine. The empty separator splits into
/// individual characters and guarantees progress on indivisible runs.
const SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

/// Splits text into token-bounded pieces with overlap.
///
/// The splitter walks [`SEPARATORS`] from coarse to fine: it splits on the
/// coarsest separator present in the text, greedily packs the resulting parts
/// into chunks up to `chunk_size` tokens, and re-splits any part that is
/// itself over budget with the next-finer separator. Consecutive chunks share
/// up to `chunk_overlap` trailing tokens of context.
///
/// The budget is a soft target: a run with no split point left is emitted
/// as-is rather than failing. Termination is the hard guarantee — the empty
/// separator always makes progress.
pub struct RecursiveTokenSplitter<'a> {
    counter: &'a dyn TokenCounter,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl<'a> RecursiveTokenSplitter<'a> {
    pub fn new(counter: &'a dyn TokenCounter, chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        let mut chunk_overlap = chunk_overlap;
        if chunk_overlap >= chunk_size {
            tracing::warn!(
                chunk_size,
                chunk_overlap,
                "chunk overlap must be smaller than chunk size, clamping"
            );
            chunk_overlap = chunk_size - 1;
        }
        Self {
            counter,
            chunk_size,
            chunk_overlap,
        }
    }

    /// Splits `text` into ordered, trimmed, non-empty pieces.
    ///
    /// Deterministic and total: empty (or whitespace-only) input yields an
    /// empty sequence; anything else yields at least one piece.
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        self.split_with(text, &SEPARATORS)
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        // Coarsest separator that actually occurs in the text wins; the empty
        // separator always matches.
        let mut separator = *separators.last().unwrap_or(&"");
        let mut finer: &[&str] = &[];
        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() {
                separator = "";
                finer = &[];
                break;
            }
            if text.contains(sep) {
                separator = sep;
                finer = &separators[i + 1..];
                break;
            }
        }

        let parts = split_keeping_separator(text, separator);

        let mut pieces = Vec::new();
        let mut within_budget: Vec<String> = Vec::new();
        for part in parts {
            if self.counter.count(&part) <= self.chunk_size {
                within_budget.push(part);
                continue;
            }
            if !within_budget.is_empty() {
                pieces.extend(self.pack(&within_budget));
                within_budget.clear();
            }
            if finer.is_empty() {
                // No finer separator left: hard-emit the oversize run.
                let trimmed = part.trim();
                if !trimmed.is_empty() {
                    tracing::debug!(
                        tokens = self.counter.count(trimmed),
                        budget = self.chunk_size,
                        "indivisible run exceeds chunk budget"
                    );
                    pieces.push(trimmed.to_string());
                }
            } else {
                pieces.extend(self.split_with(&part, finer));
            }
        }
        if !within_budget.is_empty() {
            pieces.extend(self.pack(&within_budget));
        }
        pieces
    }

    /// Greedily packs separator-level parts into chunks, sliding the window
    /// backwards so neighbors retain up to `chunk_overlap` tokens of shared
    /// trailing context.
    fn pack(&self, parts: &[String]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for part in parts {
            let len = self.counter.count(part);
            if total + len > self.chunk_size && !window.is_empty() {
                if let Some(chunk) = join_trimmed(&window) {
                    chunks.push(chunk);
                }
                while total > self.chunk_overlap
                    || (total + len > self.chunk_size && total > 0)
                {
                    let Some(front) = window.pop_front() else { break };
                    total -= self.counter.count(front);
                }
            }
            window.push_back(part.as_str());
            total += len;
        }
        if let Some(chunk) = join_trimmed(&window) {
            chunks.push(chunk);
        }
        chunks
    }
}

/// Splits on `separator`, keeping each separator attached to the start of the
/// part that follows it so concatenation reconstructs the input.
fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }
    let mut parts = Vec::new();
    for (i, piece) in text.split(separator).enumerate() {
        if i == 0 {
            if !piece.is_empty() {
                parts.push(piece.to_string());
            }
        } else if piece.is_empty() {
            // Adjacent separators still carry weight toward the window.
            parts.push(separator.to_string());
        } else {
            parts.push(format!("{separator}{piece}"));
        }
    }
    parts
}

fn join_trimmed(window: &VecDeque<&str>) -> Option<String> {
    let joined: String = window.iter().copied().collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
