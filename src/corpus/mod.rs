//! Labeled complaint corpus and category vocabulary
//!
//! The corpus is the immutable input to the benchmarking run: an ordered
//! collection of `(text, label)` samples whose labels all belong to a fixed
//! category vocabulary supplied at construction time.

pub mod loader;
pub mod split;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};

/// Integer identifier of a complaint category.
pub type CategoryId = u32;

/// Fixed mapping from category id to display name.
///
/// Passed explicitly into the loader, evaluator and predictor rather than
/// held as a process-wide global, so alternate vocabularies can be used in
/// tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryVocab {
    /// `(id, name)` pairs sorted by id.
    entries: Vec<(CategoryId, String)>,
}

impl CategoryVocab {
    /// Build a vocabulary from `(id, name)` pairs. Duplicate ids are rejected.
    pub fn new<S: Into<String>>(pairs: Vec<(CategoryId, S)>) -> Result<Self> {
        if pairs.is_empty() {
            return Err(TriageError::ValidationError(
                "category vocabulary cannot be empty".to_string(),
            ));
        }

        let mut entries: Vec<(CategoryId, String)> =
            pairs.into_iter().map(|(id, name)| (id, name.into())).collect();
        entries.sort_by_key(|(id, _)| *id);

        for window in entries.windows(2) {
            if window[0].0 == window[1].0 {
                return Err(TriageError::ValidationError(format!(
                    "duplicate category id {} in vocabulary",
                    window[0].0
                )));
            }
        }

        Ok(Self { entries })
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the vocabulary holds no categories.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `id` is a configured category.
    pub fn contains(&self, id: CategoryId) -> bool {
        self.index_of(id).is_some()
    }

    /// Display name for a category id.
    pub fn name(&self, id: CategoryId) -> Option<&str> {
        self.index_of(id).map(|i| self.entries[i].1.as_str())
    }

    /// Position of `id` in id-sorted order (used to index the confusion matrix).
    pub fn index_of(&self, id: CategoryId) -> Option<usize> {
        self.entries.binary_search_by_key(&id, |(i, _)| *i).ok()
    }

    /// Category id at a given id-sorted position.
    pub fn id_at(&self, index: usize) -> Option<CategoryId> {
        self.entries.get(index).map(|(id, _)| *id)
    }

    /// Iterate `(id, name)` in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (CategoryId, &str)> {
        self.entries.iter().map(|(id, name)| (*id, name.as_str()))
    }
}

/// One labeled complaint text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    /// Complaint text.
    pub text: String,
    /// Category id from the configured vocabulary.
    pub label: CategoryId,
}

impl Sample {
    pub fn new<S: Into<String>>(text: S, label: CategoryId) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}

/// Ordered, immutable collection of labeled samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Corpus {
    samples: Vec<Sample>,
}

impl Corpus {
    /// Wrap loaded samples. Labels are assumed pre-validated against the
    /// vocabulary (the loader reports unknown labels before a corpus exists).
    pub fn from_samples(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Sample count per represented category, in ascending id order.
    pub fn class_counts(&self) -> BTreeMap<CategoryId, usize> {
        let mut counts = BTreeMap::new();
        for sample in &self.samples {
            *counts.entry(sample.label).or_insert(0) += 1;
        }
        counts
    }

    /// Smallest sample count among represented categories.
    /// `None` for an empty corpus.
    pub fn min_class_count(&self) -> Option<usize> {
        self.class_counts().values().min().copied()
    }

    /// Summary statistics for display.
    pub fn stats(&self) -> CorpusStats {
        let n = self.samples.len();
        let text_lens: Vec<usize> = self.samples.iter().map(|s| s.text.chars().count()).collect();
        let word_counts: Vec<usize> = self
            .samples
            .iter()
            .map(|s| s.text.split_whitespace().count())
            .collect();

        let mean = |values: &[usize]| {
            if values.is_empty() {
                0.0
            } else {
                values.iter().sum::<usize>() as f64 / values.len() as f64
            }
        };

        CorpusStats {
            n_samples: n,
            class_counts: self.class_counts().into_iter().collect(),
            mean_text_len: mean(&text_lens),
            min_text_len: text_lens.iter().min().copied().unwrap_or(0),
            max_text_len: text_lens.iter().max().copied().unwrap_or(0),
            mean_word_count: mean(&word_counts),
        }
    }
}

/// Dataset summary produced for the report output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusStats {
    pub n_samples: usize,
    pub class_counts: Vec<(CategoryId, usize)>,
    pub mean_text_len: f64,
    pub min_text_len: usize,
    pub max_text_len: usize,
    pub mean_word_count: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> CategoryVocab {
        CategoryVocab::new(vec![(0, "alpha"), (1, "beta"), (3, "gamma")]).unwrap()
    }

    #[test]
    fn test_vocab_lookup() {
        let v = vocab();
        assert_eq!(v.len(), 3);
        assert_eq!(v.name(1), Some("beta"));
        assert_eq!(v.name(2), None);
        assert!(v.contains(3));
        assert_eq!(v.index_of(3), Some(2));
        assert_eq!(v.id_at(2), Some(3));
    }

    #[test]
    fn test_vocab_rejects_duplicates() {
        let result = CategoryVocab::new(vec![(0, "a"), (0, "b")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_vocab_rejects_empty() {
        let result = CategoryVocab::new(Vec::<(CategoryId, String)>::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_class_counts() {
        let corpus = Corpus::from_samples(vec![
            Sample::new("one", 0),
            Sample::new("two", 1),
            Sample::new("three", 1),
        ]);
        let counts = corpus.class_counts();
        assert_eq!(counts[&0], 1);
        assert_eq!(counts[&1], 2);
        assert_eq!(corpus.min_class_count(), Some(1));
    }

    #[test]
    fn test_stats() {
        let corpus = Corpus::from_samples(vec![
            Sample::new("ab cd", 0),
            Sample::new("efg", 0),
        ]);
        let stats = corpus.stats();
        assert_eq!(stats.n_samples, 2);
        assert_eq!(stats.min_text_len, 3);
        assert_eq!(stats.max_text_len, 5);
        assert!((stats.mean_word_count - 1.5).abs() < 1e-12);
    }
}
