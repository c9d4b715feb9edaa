//! Markdown heading splitting.

use std::collections::BTreeMap;

/// A contiguous Markdown excerpt governed by the headings in scope at its
/// start. Sections are ordered and never overlap in source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Heading text per configured heading level currently in scope. A
    /// shallower heading clears deeper entries.
    pub headings: BTreeMap<u8, String>,
    /// Section body with the heading lines themselves removed; the assembler
    /// re-renders them.
    pub body: String,
}

impl Section {
    /// Most specific heading governing this section, if any.
    pub fn label(&self) -> Option<&str> {
        self.headings.values().next_back().map(String::as_str)
    }

    /// Level of the most specific heading governing this section.
    pub fn label_level(&self) -> Option<u8> {
        self.headings.keys().next_back().copied()
    }
}

/// Splits Markdown into ordered sections at the given heading levels.
///
/// Heading lines at configured levels open a new section and are lifted out
/// of the body. Headings at other levels stay in the body, and headings
/// inside fenced code blocks are never split points. Text before the first
/// heading becomes a section with no heading. Sections whose body is empty
/// (a bare heading followed immediately by another) are not emitted.
pub fn split_on_headings(markdown: &str, levels: &[u8]) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut scope: BTreeMap<u8, String> = BTreeMap::new();
    let mut body: Vec<&str> = Vec::new();
    let mut in_fence = false;
    let mut fence_marker = "```";

    for line in markdown.lines() {
        let trimmed = line.trim_start();

        if in_fence {
            body.push(line);
            if trimmed.starts_with(fence_marker) {
                in_fence = false;
            }
            continue;
        }
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = true;
            fence_marker = if trimmed.starts_with("```") { "```" } else { "~~~" };
            body.push(line);
            continue;
        }

        match heading_at_levels(trimmed, levels) {
            Some((level, text)) => {
                flush_section(&mut sections, &mut body, &scope);
                scope.retain(|l, _| *l < level);
                scope.insert(level, text);
            }
            None => body.push(line),
        }
    }
    flush_section(&mut sections, &mut body, &scope);
    sections
}

/// A split is meaningful when it found real structure: more than one section,
/// or a single section governed by a non-empty heading.
pub fn is_meaningful_split(sections: &[Section]) -> bool {
    match sections {
        [] => false,
        [only] => only.label().is_some_and(|label| !label.is_empty()),
        _ => true,
    }
}

fn flush_section(sections: &mut Vec<Section>, body: &mut Vec<&str>, scope: &BTreeMap<u8, String>) {
    let text = body.join("\n");
    body.clear();
    if text.trim().is_empty() {
        return;
    }
    sections.push(Section {
        headings: scope.clone(),
        body: text,
    });
}

/// Parses `line` as an ATX heading if its level is in `levels`.
fn heading_at_levels(line: &str, levels: &[u8]) -> Option<(u8, String)> {
    if !line.starts_with('#') {
        return None;
    }
    let hashes = line.chars().take_while(|c| *c == '#').count();
    if hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    if !rest.is_empty() && !rest.starts_with(' ') {
        // "#tag" style text, not a heading.
        return None;
    }
    let level = hashes as u8;
    if !levels.contains(&level) {
        return None;
    }
    Some((level, rest.trim().to_string()))
}
