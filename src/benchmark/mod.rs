//! Candidate pipelines and the benchmark runner
//!
//! A candidate pairs one feature configuration with one classification
//! algorithm. The runner trains every candidate on the training subset,
//! scores each on the evaluation subset, and selects the most accurate as
//! the production model.

mod pipeline;
mod runner;

pub use pipeline::{
    default_candidates, CandidateSpec, ClassifierKind, FittedClassifier, TfidfConfig,
    TrainedPipeline,
};
pub use runner::{BenchmarkOutcome, BenchmarkRunner, ScoreRecord};
