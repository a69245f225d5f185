//! Adaptive train/evaluation splitting
//!
//! The split policy is a runtime decision on data characteristics: small
//! corpora give up training data for a larger evaluation share, and
//! stratification is only attempted when every represented category can be
//! divided between both subsets.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::corpus::{Corpus, Sample};
use crate::error::{Result, TriageError};

/// Corpus size at which the evaluation share drops from 0.5 to 0.2.
pub const LARGE_CORPUS_THRESHOLD: usize = 40;

/// Minimum per-category sample count required for a stratified split.
pub const MIN_STRATIFY_CLASS_COUNT: usize = 2;

/// Default random seed; fixed so repeated runs produce identical partitions.
pub const DEFAULT_SPLIT_SEED: u64 = 42;

/// Decision table for the split, derived from corpus characteristics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitPolicy {
    /// Fraction of the corpus reserved for evaluation.
    pub evaluation_fraction: f64,
    /// Whether category proportions are preserved across subsets.
    pub stratified: bool,
}

impl SplitPolicy {
    /// Derive the policy for a corpus of `n_samples` whose rarest represented
    /// category has `min_class_count` samples.
    pub fn for_corpus(n_samples: usize, min_class_count: usize) -> Self {
        Self {
            evaluation_fraction: if n_samples >= LARGE_CORPUS_THRESHOLD {
                0.2
            } else {
                0.5
            },
            stratified: min_class_count >= MIN_STRATIFY_CLASS_COUNT,
        }
    }
}

/// Disjoint, corpus-covering training and evaluation subsets.
#[derive(Debug, Clone)]
pub struct Split {
    pub training: Vec<Sample>,
    pub evaluation: Vec<Sample>,
}

/// Seeded corpus splitter.
pub struct Splitter {
    seed: u64,
}

impl Default for Splitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Splitter {
    /// Create a splitter with the fixed default seed.
    pub fn new() -> Self {
        Self {
            seed: DEFAULT_SPLIT_SEED,
        }
    }

    /// Override the seed (partitions stay reproducible for a given seed).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Partition the corpus according to the adaptive policy.
    pub fn split(&self, corpus: &Corpus) -> Result<Split> {
        let n = corpus.len();
        if n == 0 {
            return Err(TriageError::InsufficientData("corpus is empty".to_string()));
        }
        if n < 2 {
            return Err(TriageError::InsufficientData(format!(
                "corpus has {} sample; need at least 2 to form training and evaluation subsets",
                n
            )));
        }

        let min_class = corpus.min_class_count().unwrap_or(0);
        let policy = SplitPolicy::for_corpus(n, min_class);
        let n_eval = ((n as f64 * policy.evaluation_fraction).round() as usize).clamp(1, n - 1);

        debug!(
            n_samples = n,
            min_class_count = min_class,
            evaluation_fraction = policy.evaluation_fraction,
            stratified = policy.stratified,
            "splitting corpus"
        );

        let mut eval_indices = if policy.stratified {
            self.stratified_indices(corpus, n_eval)
        } else {
            self.shuffled_indices(n, n_eval)
        };
        eval_indices.sort_unstable();

        let mut in_eval = vec![false; n];
        for &i in &eval_indices {
            in_eval[i] = true;
        }

        let samples = corpus.samples();
        let evaluation: Vec<Sample> = eval_indices.iter().map(|&i| samples[i].clone()).collect();
        let training: Vec<Sample> = samples
            .iter()
            .enumerate()
            .filter(|(i, _)| !in_eval[*i])
            .map(|(_, s)| s.clone())
            .collect();

        if training.is_empty() || evaluation.is_empty() {
            return Err(TriageError::InsufficientData(format!(
                "partition produced {} training and {} evaluation samples",
                training.len(),
                evaluation.len()
            )));
        }

        Ok(Split {
            training,
            evaluation,
        })
    }

    /// Unstratified shuffle split: first `n_eval` of a seeded permutation.
    fn shuffled_indices(&self, n: usize, n_eval: usize) -> Vec<usize> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut rng);
        indices.truncate(n_eval);
        indices
    }

    /// Stratified allocation: the evaluation total is apportioned per category
    /// by largest remainder, capped so every category keeps at least one
    /// training sample.
    fn stratified_indices(&self, corpus: &Corpus, n_eval: usize) -> Vec<usize> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let frac = n_eval as f64 / corpus.len() as f64;

        let mut class_indices: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for (i, sample) in corpus.iter().enumerate() {
            class_indices.entry(sample.label).or_default().push(i);
        }
        for indices in class_indices.values_mut() {
            indices.shuffle(&mut rng);
        }

        // floor share per class, remainder ranked by fractional part
        let mut takes: Vec<(u32, usize, f64, usize)> = class_indices
            .iter()
            .map(|(&class, indices)| {
                let raw = indices.len() as f64 * frac;
                let cap = indices.len() - 1;
                let base = (raw.floor() as usize).min(cap);
                (class, base, raw - raw.floor(), cap)
            })
            .collect();

        let mut total: usize = takes.iter().map(|(_, base, _, _)| base).sum();
        let mut order: Vec<usize> = (0..takes.len()).collect();
        order.sort_by(|&a, &b| {
            takes[b]
                .2
                .partial_cmp(&takes[a].2)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(takes[a].0.cmp(&takes[b].0))
        });

        while total < n_eval {
            let mut grew = false;
            for &i in &order {
                if total == n_eval {
                    break;
                }
                if takes[i].1 < takes[i].3 {
                    takes[i].1 += 1;
                    total += 1;
                    grew = true;
                }
            }
            if !grew {
                break; // every category is at capacity
            }
        }

        takes
            .iter()
            .flat_map(|&(class, take, _, _)| class_indices[&class][..take].iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Sample;

    fn corpus_with_counts(counts: &[(u32, usize)]) -> Corpus {
        let mut samples = Vec::new();
        for &(class, count) in counts {
            for i in 0..count {
                samples.push(Sample::new(format!("sample {} of class {}", i, class), class));
            }
        }
        Corpus::from_samples(samples)
    }

    #[test]
    fn test_policy_decision_table() {
        let policy = SplitPolicy::for_corpus(40, 5);
        assert_eq!(policy.evaluation_fraction, 0.2);
        assert!(policy.stratified);

        let policy = SplitPolicy::for_corpus(39, 5);
        assert_eq!(policy.evaluation_fraction, 0.5);

        let policy = SplitPolicy::for_corpus(100, 1);
        assert!(!policy.stratified);

        let policy = SplitPolicy::for_corpus(100, 2);
        assert!(policy.stratified);
    }

    #[test]
    fn test_empty_corpus_rejected() {
        let corpus = Corpus::from_samples(Vec::new());
        let err = Splitter::new().split(&corpus).unwrap_err();
        assert!(matches!(err, TriageError::InsufficientData(_)));
    }

    #[test]
    fn test_single_sample_rejected() {
        let corpus = corpus_with_counts(&[(0, 1)]);
        let err = Splitter::new().split(&corpus).unwrap_err();
        assert!(matches!(err, TriageError::InsufficientData(_)));
    }

    #[test]
    fn test_stratified_split_is_exact_and_covering() {
        let corpus = corpus_with_counts(&[(0, 13), (1, 12), (2, 12), (3, 13)]);
        let split = Splitter::new().split(&corpus).unwrap();

        // 50 samples, fraction 0.2: exactly 10 evaluation rows
        assert_eq!(split.evaluation.len(), 10);
        assert_eq!(split.training.len(), 40);

        // training ∪ evaluation reconstructs the corpus exactly
        let mut merged: Vec<(String, u32)> = split
            .training
            .iter()
            .chain(split.evaluation.iter())
            .map(|s| (s.text.clone(), s.label))
            .collect();
        merged.sort();
        let mut original: Vec<(String, u32)> = corpus
            .iter()
            .map(|s| (s.text.clone(), s.label))
            .collect();
        original.sort();
        assert_eq!(merged, original);
    }

    #[test]
    fn test_stratified_proportions_within_rounding() {
        let corpus = corpus_with_counts(&[(0, 13), (1, 12), (2, 12), (3, 13)]);
        let split = Splitter::new().split(&corpus).unwrap();

        let eval_corpus = Corpus::from_samples(split.evaluation.clone());
        for (class, total) in corpus.class_counts() {
            let in_eval = eval_corpus.class_counts().get(&class).copied().unwrap_or(0);
            let expected = total as f64 * 0.2;
            assert!(
                (in_eval as f64 - expected).abs() <= 1.0,
                "class {}: {} evaluation rows, expected about {:.1}",
                class,
                in_eval,
                expected
            );
        }
    }

    #[test]
    fn test_small_corpus_uses_half_for_evaluation() {
        let corpus = corpus_with_counts(&[(0, 10), (1, 10)]);
        let split = Splitter::new().split(&corpus).unwrap();
        assert_eq!(split.evaluation.len(), 10);
        assert_eq!(split.training.len(), 10);
    }

    #[test]
    fn test_singleton_class_forces_unstratified() {
        let corpus = corpus_with_counts(&[(0, 20), (1, 1)]);
        let split = Splitter::new().split(&corpus).unwrap();
        // 21 samples below the threshold: half held out
        assert_eq!(split.evaluation.len() + split.training.len(), 21);
        assert_eq!(split.evaluation.len(), (21.0f64 * 0.5).round() as usize);
    }

    #[test]
    fn test_split_is_reproducible() {
        let corpus = corpus_with_counts(&[(0, 13), (1, 12), (2, 12), (3, 13)]);
        let a = Splitter::new().split(&corpus).unwrap();
        let b = Splitter::new().split(&corpus).unwrap();

        let texts = |s: &[Sample]| s.iter().map(|x| x.text.clone()).collect::<Vec<_>>();
        assert_eq!(texts(&a.training), texts(&b.training));
        assert_eq!(texts(&a.evaluation), texts(&b.evaluation));
    }

    #[test]
    fn test_different_seed_changes_partition() {
        let corpus = corpus_with_counts(&[(0, 25), (1, 25)]);
        let a = Splitter::new().split(&corpus).unwrap();
        let b = Splitter::new().with_seed(7).split(&corpus).unwrap();

        let texts = |s: &[Sample]| s.iter().map(|x| x.text.clone()).collect::<Vec<_>>();
        assert_ne!(texts(&a.evaluation), texts(&b.evaluation));
    }
}
