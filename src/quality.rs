//! Chunk normalization and gibberish filtering.
//!
//! Runs once per assembled chunk, independent of the originating strategy.
//! Code fences, table rows, and heading lines are structural Markdown and
//! pass through both passes untouched.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::Chunk;

static TABLE_ROW: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\|.*\|$").unwrap());
static HEADING_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*#{1,6}\s").unwrap());
static RULE_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*[-=]{3,}\s*$").unwrap());
static TAB_CR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\t\r]+").unwrap());
static MULTI_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());
static EXEMPT_TEXT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```|~~~|\|.*\|").unwrap());
static NON_BASIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[^a-zA-Z0-9\s.,;:!?()"'{}\[\]<>=+\-/%$#@&*]"#).unwrap()
});

/// Longest run of an identical character tolerated before it is collapsed
/// (normalization) or the chunk is rejected (classification).
const MAX_REPEAT_RUN: usize = 6;

/// Normalizes a Markdown chunk while preserving fenced code blocks, table
/// rows, and heading lines.
///
/// Fence state is tracked across lines, so everything between an opening and
/// closing fence marker passes through verbatim. On all other lines: tabs and
/// carriage returns collapse to single spaces, runs of two or more spaces
/// collapse to one (leading indentation kept), non-printable control
/// characters are stripped, and runs of six or more identical non-markdown
/// characters collapse to a single occurrence. Horizontal-rule lines are
/// exempt from run collapsing. Idempotent.
pub fn normalize_chunk_text(text: &str) -> String {
    let mut cleaned = Vec::new();
    let mut in_fence = false;
    let mut fence_marker = "```";
    for line in text.lines() {
        if in_fence {
            cleaned.push(line.to_string());
            if line.trim_start().starts_with(fence_marker) {
                in_fence = false;
            }
            continue;
        }
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = true;
            fence_marker = if trimmed.starts_with("```") { "```" } else { "~~~" };
            cleaned.push(line.to_string());
            continue;
        }
        if TABLE_ROW.is_match(line) || HEADING_LINE.is_match(line) {
            cleaned.push(line.to_string());
            continue;
        }

        let line = TAB_CR.replace_all(line, " ");
        let indent = line.len() - line.trim_start_matches(' ').len();
        let line = format!(
            "{}{}",
            " ".repeat(indent),
            MULTI_SPACE.replace_all(line.trim_start_matches(' '), " ")
        );

        let line: String = line.chars().filter(|c| !is_control_char(*c)).collect();

        let line = if RULE_LINE.is_match(&line) {
            line
        } else {
            collapse_repeated_runs(&line)
        };
        cleaned.push(line);
    }
    cleaned.join("\n").trim().to_string()
}

/// Classifies a chunk as gibberish (corrupted or low-value text).
///
/// Chunks containing code fences or pipe tables always pass. Otherwise,
/// markdown decoration is stripped and the chunk is rejected when an
/// alphanumeric character repeats six or more times consecutively, or when
/// more than 10% of the remaining characters fall outside the basic
/// allowlist.
pub fn is_gibberish(text: &str) -> bool {
    if EXEMPT_TEXT.is_match(text) {
        return false;
    }

    let stripped: String = text
        .chars()
        .filter(|c| !matches!(c, '#' | '|' | '-' | '`'))
        .collect();

    if has_repeated_alphanumeric_run(&stripped) {
        return true;
    }

    let total = stripped.chars().count();
    if total > 0 {
        let non_basic = NON_BASIC.find_iter(&stripped).count();
        if non_basic as f64 / total as f64 > 0.1 {
            return true;
        }
    }

    false
}

/// Normalizes each chunk, then drops chunks whose normalized text is empty or
/// classifies as gibberish. Classification runs on the normalized text, so a
/// long character run that collapses into ordinary prose is kept. Survivors
/// keep their normalized text.
pub fn apply_quality_filters(chunks: Vec<Chunk>) -> Vec<Chunk> {
    let total = chunks.len();
    let mut kept = Vec::with_capacity(total);
    for mut chunk in chunks {
        let text = normalize_chunk_text(&chunk.text);
        if text.is_empty() || is_gibberish(&text) {
            continue;
        }
        chunk.text = text;
        kept.push(chunk);
    }
    if kept.len() < total {
        tracing::debug!(dropped = total - kept.len(), kept = kept.len(), "quality filter dropped chunks");
    }
    kept
}

fn is_control_char(c: char) -> bool {
    matches!(c, '\u{0000}'..='\u{001F}' | '\u{007F}'..='\u{009F}')
}

/// Collapses runs of `MAX_REPEAT_RUN`+ identical characters to one
/// occurrence, leaving markdown symbols (`#`, `-`, `=`) alone.
fn collapse_repeated_runs(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        let mut run = 1;
        while chars.peek() == Some(&c) {
            chars.next();
            run += 1;
        }
        let keep = if run >= MAX_REPEAT_RUN && !matches!(c, '#' | '-' | '=') {
            1
        } else {
            run
        };
        for _ in 0..keep {
            out.push(c);
        }
    }
    out
}

fn has_repeated_alphanumeric_run(text: &str) -> bool {
    let mut prev: Option<char> = None;
    let mut run = 0usize;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() && prev == Some(c) {
            run += 1;
            if run >= MAX_REPEAT_RUN {
                return true;
            }
        } else {
            prev = Some(c);
            run = 1;
        }
    }
    false
}
