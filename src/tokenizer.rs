//! Token counting abstraction used for every size budget in the engine.
//!
//! The counter is an injected capability rather than process-wide state:
//! construct one [`TiktokenCounter`] at startup, wrap it in an `Arc`, and hand
//! it to the splitter, assembler, and pipeline. Implementations must be pure
//! and thread-safe so one counter can serve many worker threads.

use std::sync::Arc;

/// Counts tokens in a piece of text.
pub trait TokenCounter: Send + Sync {
    /// Number of tokens in `text`.
    fn count(&self, text: &str) -> usize;
}

/// Shared handle to a token counter.
pub type SharedTokenCounter = Arc<dyn TokenCounter>;

impl<T: TokenCounter + ?Sized> TokenCounter for Arc<T> {
    fn count(&self, text: &str) -> usize {
        (**self).count(text)
    }
}

/// Whitespace-run token counter.
///
/// Counts whitespace-separated words. A deterministic stand-in for builds
/// without the `tiktoken` feature and for tests that reason about exact token
/// arithmetic.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceCounter;

impl TokenCounter for WhitespaceCounter {
    fn count(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}

#[cfg(feature = "tiktoken")]
pub use self::tiktoken::TiktokenCounter;

#[cfg(feature = "tiktoken")]
mod tiktoken {
    use std::sync::Arc;

    use tiktoken_rs::{cl100k_base, CoreBPE};

    use super::TokenCounter;
    use crate::types::ChunkError;

    /// `cl100k_base` token counter backed by `tiktoken-rs`.
    ///
    /// Construction loads the BPE ranks once; clone the handle (it shares the
    /// underlying encoder) instead of rebuilding per document.
    #[derive(Clone)]
    pub struct TiktokenCounter {
        bpe: Arc<CoreBPE>,
    }

    impl TiktokenCounter {
        pub fn new() -> Result<Self, ChunkError> {
            let bpe = cl100k_base().map_err(|err| ChunkError::Tokenizer(err.to_string()))?;
            Ok(Self { bpe: Arc::new(bpe) })
        }
    }

    impl TokenCounter for TiktokenCounter {
        fn count(&self, text: &str) -> usize {
            self.bpe.encode_ordinary(text).len()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn counts_plain_sentence() {
            let counter = TiktokenCounter::new().unwrap();
            assert!(counter.count("This is a test sentence.") > 0);
        }

        #[test]
        fn empty_text_counts_zero() {
            let counter = TiktokenCounter::new().unwrap();
            assert_eq!(counter.count(""), 0);
        }
    }
}
