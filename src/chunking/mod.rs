//! The chunking engine: heading splitting, recursive token splitting, and
//! strategy-driven assembly.
//!
//! * [`heading`] — splits Markdown into heading-governed sections.
//! * [`splitter`] — token-bounded recursive splitting with overlap.
//! * [`assembler`] — strategy dispatch, continuation markers, fragment
//!   merging.

pub mod assembler;
pub mod heading;
pub mod splitter;

pub use assembler::ChunkAssembler;
pub use heading::{is_meaningful_split, split_on_headings, Section};
pub use splitter::RecursiveTokenSplitter;
