//! Positioned chunks, URL mapping, and downstream artifact records.
//!
//! Everything here runs after the chunking engine proper: chunks are frozen
//! with positions and public URLs, then wrapped in the records the search
//! indexer ingests.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::{Chunk, PositionedChunk};

/// One rewrite rule mapping a storage path to a public docs URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRule {
    /// Substrings identifying paths this rule applies to (any match).
    pub markers: Vec<String>,
    /// Path component the relative part starts after (last occurrence wins).
    pub split_on: String,
    /// Base the relative part is appended to.
    pub base: String,
}

impl UrlRule {
    pub fn new(
        markers: impl IntoIterator<Item = impl Into<String>>,
        split_on: impl Into<String>,
        base: impl Into<String>,
    ) -> Self {
        Self {
            markers: markers.into_iter().map(Into::into).collect(),
            split_on: split_on.into(),
            base: base.into(),
        }
    }

    fn matches(&self, storage_path: &str) -> bool {
        self.markers.iter().any(|m| storage_path.contains(m.as_str()))
    }

    fn apply(&self, storage_path: &str) -> String {
        let relative = match storage_path.rsplit_once(self.split_on.as_str()) {
            Some((_, rest)) => rest,
            None => storage_path,
        };
        format!("{}{}", self.base, relative.trim_start_matches('/'))
    }
}

/// Ordered URL rewrite rules with an identity fallback.
///
/// URL derivation is a deployment concern, not chunking logic: callers supply
/// the rules for their docs roots, and unmatched paths pass through
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlMapper {
    rules: Vec<UrlRule>,
}

impl UrlMapper {
    pub fn new(rules: Vec<UrlRule>) -> Self {
        Self { rules }
    }

    /// Maps a storage path to its public URL; the first matching rule wins.
    pub fn map(&self, storage_path: &str) -> String {
        for rule in &self.rules {
            if rule.matches(storage_path) {
                return rule.apply(storage_path);
            }
        }
        storage_path.to_string()
    }
}

/// Freezes filtered chunks into positioned chunks with derived URLs.
///
/// Positions are zero-based and sequential over the filtered sequence.
pub fn position_chunks(
    chunks: &[Chunk],
    storage_path: &str,
    mapper: &UrlMapper,
) -> Vec<PositionedChunk> {
    let url = mapper.map(storage_path);
    chunks
        .iter()
        .enumerate()
        .map(|(position, chunk)| PositionedChunk {
            url: url.clone(),
            text: chunk.text.clone(),
            position,
        })
        .collect()
}

/// Artifact record handed to the search indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub title: String,
    /// Base64 of the source storage path; shared by every chunk of a
    /// document.
    pub parent_id: String,
    pub location: String,
    pub chunk: String,
    pub category: Vec<String>,
    /// Last segment of the chunk URL.
    pub name: String,
    /// SHA-256 of `parent_id` + position, unique per chunk.
    pub chunk_id: String,
}

/// Builds indexer artifacts from positioned chunks and document metadata.
pub fn build_artifacts(
    chunks: &[PositionedChunk],
    categories: &[String],
    title: &str,
    storage_path: &str,
) -> Vec<Artifact> {
    let parent_id = BASE64.encode(storage_path.as_bytes());
    chunks
        .iter()
        .map(|chunk| {
            let name = if chunk.url.is_empty() {
                "unknown".to_string()
            } else {
                chunk.url.rsplit('/').next().unwrap_or("").to_string()
            };
            let chunk_id = hex::encode(Sha256::digest(
                format!("{parent_id}{}", chunk.position).as_bytes(),
            ));
            Artifact {
                title: title.to_string(),
                parent_id: parent_id.clone(),
                location: chunk.url.clone(),
                chunk: chunk.text.clone(),
                category: categories.to_vec(),
                name,
                chunk_id,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs_mapper() -> UrlMapper {
        UrlMapper::new(vec![
            UrlRule::new(
                ["Technical Documentation", "Technical%20Documentation"],
                "/techdocs",
                "https://docs.example.com/techdocs/",
            ),
            UrlRule::new(
                ["User Documentation", "User%20Documentation"],
                "/en/",
                "https://docs.example.com/userdocs/",
            ),
        ])
    }

    #[test]
    fn rules_rewrite_matching_paths() {
        let mapper = docs_mapper();
        assert_eq!(
            mapper.map("User%20Documentation/en/somefile.html"),
            "https://docs.example.com/userdocs/somefile.html"
        );
        assert_eq!(
            mapper.map("Technical Documentation/techdocs/guide/setup.html"),
            "https://docs.example.com/techdocs/guide/setup.html"
        );
    }

    #[test]
    fn unmatched_paths_pass_through() {
        let mapper = docs_mapper();
        assert_eq!(mapper.map("misc/other.html"), "misc/other.html");
    }

    #[test]
    fn empty_mapper_is_identity() {
        assert_eq!(UrlMapper::default().map("a/b.html"), "a/b.html");
    }

    #[test]
    fn positions_are_sequential() {
        let chunks = vec![Chunk::new("one", ""), Chunk::new("two", "")];
        let positioned = position_chunks(&chunks, "docs/page.html", &UrlMapper::default());
        assert_eq!(positioned.len(), 2);
        assert_eq!(positioned[0].position, 0);
        assert_eq!(positioned[1].position, 1);
        assert_eq!(positioned[0].url, "docs/page.html");
    }

    #[test]
    fn artifacts_carry_document_metadata() {
        let chunks = position_chunks(
            &[Chunk::new("text one", ""), Chunk::new("text two", "")],
            "docs/page.html",
            &UrlMapper::default(),
        );
        let categories = vec!["cat1".to_string(), "cat2".to_string()];
        let artifacts = build_artifacts(&chunks, &categories, "Title", "docs/page.html");

        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[0].title, "Title");
        assert_eq!(artifacts[0].name, "page.html");
        assert_eq!(artifacts[0].category, categories);
        assert_eq!(artifacts[0].parent_id, BASE64.encode(b"docs/page.html"));
        // Same parent, distinct chunk ids.
        assert_eq!(artifacts[0].parent_id, artifacts[1].parent_id);
        assert_ne!(artifacts[0].chunk_id, artifacts[1].chunk_id);
        assert_eq!(artifacts[0].chunk_id.len(), 64);
    }

    #[test]
    fn artifact_serializes_with_expected_fields() {
        let artifacts = build_artifacts(
            &[PositionedChunk {
                url: "u/file".into(),
                text: "t".into(),
                position: 0,
            }],
            &[],
            "T",
            "p",
        );
        let json = serde_json::to_value(&artifacts[0]).unwrap();
        for field in ["title", "parent_id", "location", "chunk", "category", "name", "chunk_id"] {
            assert!(json.get(field).is_some(), "missing field {field}");
        }
    }
}
