//! Gini classification tree
//!
//! Base learner for the random forest. Each split considers a seeded random
//! subset of features when `max_features` is set, so forests built from
//! distinct tree seeds decorrelate without sacrificing reproducibility.

use std::collections::BTreeMap;

use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};

/// Tree node: a split on one feature, or a leaf holding a class label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        value: f64,
        n_samples: usize,
    },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

/// Classification decision tree using Gini impurity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Option<TreeNode>,
    /// Maximum depth; unlimited when `None`.
    pub max_depth: Option<usize>,
    /// Minimum samples required to attempt a split.
    pub min_samples_split: usize,
    /// Minimum samples required in each child.
    pub min_samples_leaf: usize,
    /// Features considered per split; all when `None`.
    pub max_features: Option<usize>,
    seed: u64,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTree {
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fit the tree to training data.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();

        if n_samples != y.len() {
            return Err(TriageError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(TriageError::ValidationError(
                "fit requires at least one training sample".to_string(),
            ));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let indices: Vec<usize> = (0..n_samples).collect();
        self.root = Some(self.build_tree(x, y, &indices, 0, &mut rng));

        Ok(self)
    }

    fn build_tree(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let n_samples = indices.len();
        let y_subset: Vec<f64> = indices.iter().map(|&i| y[i]).collect();

        let should_stop = n_samples < self.min_samples_split
            || self.max_depth.is_some_and(|d| depth >= d)
            || Self::is_pure(&y_subset);

        if should_stop {
            return TreeNode::Leaf {
                value: Self::majority_class(&y_subset),
                n_samples,
            };
        }

        if let Some((feature_idx, threshold)) = self.find_best_split(x, y, indices, rng) {
            let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .partition(|&&i| x[[i, feature_idx]] <= threshold);

            if left_indices.len() < self.min_samples_leaf
                || right_indices.len() < self.min_samples_leaf
            {
                return TreeNode::Leaf {
                    value: Self::majority_class(&y_subset),
                    n_samples,
                };
            }

            let left = Box::new(self.build_tree(x, y, &left_indices, depth + 1, rng));
            let right = Box::new(self.build_tree(x, y, &right_indices, depth + 1, rng));

            TreeNode::Split {
                feature_idx,
                threshold,
                left,
                right,
            }
        } else {
            TreeNode::Leaf {
                value: Self::majority_class(&y_subset),
                n_samples,
            }
        }
    }

    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        rng: &mut ChaCha8Rng,
    ) -> Option<(usize, f64)> {
        let n_features = x.ncols();

        let candidates: Vec<usize> = match self.max_features {
            Some(k) if k < n_features => {
                let mut all: Vec<usize> = (0..n_features).collect();
                all.shuffle(rng);
                all.truncate(k.max(1));
                all
            }
            _ => (0..n_features).collect(),
        };

        let parent_impurity = Self::gini(&indices.iter().map(|&i| y[i]).collect::<Vec<_>>());

        let mut best_gain = 0.0f64;
        let mut best_split = None;

        for &feature_idx in &candidates {
            let mut values: Vec<f64> = indices.iter().map(|&i| x[[i, feature_idx]]).collect();
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            values.dedup();

            for window in values.windows(2) {
                let threshold = (window[0] + window[1]) / 2.0;

                let mut left_counts: BTreeMap<i64, usize> = BTreeMap::new();
                let mut right_counts: BTreeMap<i64, usize> = BTreeMap::new();
                let mut left_n = 0usize;
                let mut right_n = 0usize;

                for &idx in indices {
                    let class = y[idx].round() as i64;
                    if x[[idx, feature_idx]] <= threshold {
                        *left_counts.entry(class).or_insert(0) += 1;
                        left_n += 1;
                    } else {
                        *right_counts.entry(class).or_insert(0) += 1;
                        right_n += 1;
                    }
                }

                if left_n < self.min_samples_leaf || right_n < self.min_samples_leaf {
                    continue;
                }

                let weighted = (left_n as f64 * Self::gini_from_counts(&left_counts, left_n)
                    + right_n as f64 * Self::gini_from_counts(&right_counts, right_n))
                    / indices.len() as f64;

                let gain = parent_impurity - weighted;
                if gain > best_gain {
                    best_gain = gain;
                    best_split = Some((feature_idx, threshold));
                }
            }
        }

        best_split
    }

    fn gini(y: &[f64]) -> f64 {
        let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
        for &v in y {
            *counts.entry(v.round() as i64).or_insert(0) += 1;
        }
        Self::gini_from_counts(&counts, y.len())
    }

    fn gini_from_counts(counts: &BTreeMap<i64, usize>, n: usize) -> f64 {
        if n == 0 {
            return 0.0;
        }
        let sum_sq: f64 = counts
            .values()
            .map(|&c| (c as f64 / n as f64).powi(2))
            .sum();
        1.0 - sum_sq
    }

    fn is_pure(y: &[f64]) -> bool {
        y.windows(2).all(|w| (w[0] - w[1]).abs() < 1e-10)
    }

    /// Most frequent class; lowest class label wins ties.
    fn majority_class(y: &[f64]) -> f64 {
        let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
        for &v in y {
            *counts.entry(v.round() as i64).or_insert(0) += 1;
        }

        let mut best_class = 0i64;
        let mut best_count = 0usize;
        for (&class, &count) in &counts {
            if count > best_count {
                best_count = count;
                best_class = class;
            }
        }
        best_class as f64
    }

    /// Predict class labels.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(TriageError::ModelNotFitted)?;

        let predictions: Vec<f64> = (0..x.nrows())
            .map(|i| Self::predict_sample(root, &x.row(i).to_vec()))
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    fn predict_sample(node: &TreeNode, sample: &[f64]) -> f64 {
        match node {
            TreeNode::Leaf { value, .. } => *value,
            TreeNode::Split {
                feature_idx,
                threshold,
                left,
                right,
            } => {
                if sample[*feature_idx] <= *threshold {
                    Self::predict_sample(left, sample)
                } else {
                    Self::predict_sample(right, sample)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_separable_classification() {
        let x = array![
            [0.0, 0.0],
            [0.1, 0.1],
            [0.2, 0.2],
            [1.0, 1.0],
            [1.1, 1.1],
            [1.2, 1.2],
        ];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y).unwrap();

        let predictions = tree.predict(&x).unwrap();
        assert_eq!(predictions, y);
    }

    #[test]
    fn test_max_depth_limits_tree() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![0.0, 1.0, 0.0, 1.0];

        let mut tree = DecisionTree::new().with_max_depth(1);
        tree.fit(&x, &y).unwrap();

        // depth-1 tree has at most one split
        match tree.root.as_ref().unwrap() {
            TreeNode::Leaf { .. } => {}
            TreeNode::Split { left, right, .. } => {
                assert!(matches!(**left, TreeNode::Leaf { .. }));
                assert!(matches!(**right, TreeNode::Leaf { .. }));
            }
        }
    }

    #[test]
    fn test_seeded_feature_subsets_are_deterministic() {
        let x = array![
            [0.0, 5.0, 1.0],
            [0.1, 4.0, 1.1],
            [1.0, 5.1, 0.2],
            [1.1, 4.1, 0.1],
        ];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let mut a = DecisionTree::new().with_max_features(1).with_seed(7);
        let mut b = DecisionTree::new().with_max_features(1).with_seed(7);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let tree = DecisionTree::new();
        let x = array![[1.0]];
        assert!(matches!(tree.predict(&x), Err(TriageError::ModelNotFitted)));
    }
}
