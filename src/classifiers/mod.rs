//! Classification algorithms
//!
//! Implementations of the candidate model families compared by the benchmark
//! runner:
//! - Multinomial logistic regression (L2-regularized, gradient descent)
//! - Multinomial naive Bayes
//! - Linear support vector machine (SMO, one-vs-rest)
//! - Random forest (bagged Gini trees)
//!
//! All models operate on `ndarray` matrices with `f64`-encoded class labels;
//! fitting is deterministic under a fixed seed.

pub mod decision_tree;
pub mod logistic;
pub mod naive_bayes;
pub mod random_forest;
pub mod svm;

pub use decision_tree::DecisionTree;
pub use logistic::LogisticRegression;
pub use naive_bayes::MultinomialNaiveBayes;
pub use random_forest::RandomForest;
pub use svm::{LinearSvmClassifier, SvmConfig};
