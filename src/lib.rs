//! # triage
//!
//! Consumer complaint text classification: a model benchmarking and selection
//! engine. Labeled complaint text is vectorized with weighted n-gram features,
//! four candidate pipelines are trained and compared on held-out data, and the
//! most accurate becomes the production model for inference on new text.
//!
//! # Modules
//!
//! - [`corpus`] - labeled samples, category vocabulary, loading, splitting
//! - [`features`] - tokenization and TF-IDF vectorization
//! - [`classifiers`] - logistic regression, naive Bayes, linear SVM, random forest
//! - [`benchmark`] - candidate pipelines, scoring, and selection
//! - [`evaluation`] - per-category metrics and confusion matrix
//! - [`predictor`] - inference over the selected pipeline
//! - [`cli`] - command-line interface

pub mod benchmark;
pub mod classifiers;
pub mod cli;
pub mod corpus;
pub mod error;
pub mod evaluation;
pub mod features;
pub mod predictor;

pub use error::{Result, TriageError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::benchmark::{
        default_candidates, BenchmarkOutcome, BenchmarkRunner, CandidateSpec, ClassifierKind,
        ScoreRecord, TfidfConfig, TrainedPipeline,
    };
    pub use crate::corpus::loader::CorpusLoader;
    pub use crate::corpus::split::{Split, SplitPolicy, Splitter};
    pub use crate::corpus::{CategoryId, CategoryVocab, Corpus, CorpusStats, Sample};
    pub use crate::error::{Result, TriageError};
    pub use crate::evaluation::{ClassMetrics, ConfusionMatrix, EvaluationReport, Evaluator};
    pub use crate::features::{CountVectorizer, TextTokenizer, TfidfVectorizer};
    pub use crate::predictor::Predictor;
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
