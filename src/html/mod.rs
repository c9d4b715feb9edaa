//! HTML boundary: decoding, metadata extraction, main-content isolation, and
//! Markdown conversion.

pub mod content;
pub mod markdown;

pub use content::{decode_html, extract_category_paths, extract_main_content, extract_title};
pub use markdown::MarkdownConverter;
