//! Text feature extraction
//!
//! Tokenization and weighted n-gram vectorization. The vectorizers are fit
//! once on the training subset and frozen; applying them to new text never
//! updates vocabulary or weighting statistics.

pub mod tfidf;

pub use tfidf::{CountVectorizer, TfidfVectorizer};

use serde::{Deserialize, Serialize};

/// Common English stop words removed before n-gram generation.
const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "if", "then", "in", "on", "at", "to",
    "for", "of", "with", "by", "from", "about", "as", "is", "was", "are",
    "were", "be", "been", "being", "have", "has", "had", "do", "does", "did",
    "it", "its", "this", "that", "these", "those", "i", "me", "my", "we",
    "our", "you", "your", "he", "she", "they", "them", "their", "not", "no",
    "so", "too", "very", "will", "would", "can", "could",
];

/// Simple word tokenizer: lowercase, split on non-alphanumeric characters,
/// drop short tokens and stop words.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextTokenizer {
    lowercase: bool,
    min_token_length: usize,
    stop_words: Vec<String>,
}

impl Default for TextTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextTokenizer {
    pub fn new() -> Self {
        Self {
            lowercase: true,
            min_token_length: 2,
            stop_words: Vec::new(),
        }
    }

    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    pub fn with_min_length(mut self, len: usize) -> Self {
        self.min_token_length = len;
        self
    }

    /// Use the built-in English stop word list.
    pub fn with_english_stop_words(mut self) -> Self {
        self.stop_words = ENGLISH_STOP_WORDS.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let processed = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        processed
            .split(|c: char| !c.is_alphanumeric())
            .filter(|s| !s.is_empty())
            .filter(|s| s.chars().count() >= self.min_token_length)
            .filter(|s| !self.stop_words.iter().any(|w| w == s))
            .map(|s| s.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases_and_splits() {
        let tokenizer = TextTokenizer::new();
        let tokens = tokenizer.tokenize("Mortgage Payment, misapplied!");
        assert_eq!(tokens, vec!["mortgage", "payment", "misapplied"]);
    }

    #[test]
    fn test_stop_words_removed() {
        let tokenizer = TextTokenizer::new().with_english_stop_words();
        let tokens = tokenizer.tokenize("the debt collector is calling me");
        assert_eq!(tokens, vec!["debt", "collector", "calling"]);
    }

    #[test]
    fn test_short_tokens_dropped() {
        let tokenizer = TextTokenizer::new();
        let tokens = tokenizer.tokenize("I o u 50 dollars");
        assert_eq!(tokens, vec!["50", "dollars"]);
    }
}
