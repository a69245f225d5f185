//! Benchmark runner: train, score, rank, select

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::benchmark::pipeline::{CandidateSpec, TrainedPipeline};
use crate::corpus::split::Split;
use crate::error::{Result, TriageError};

/// Accuracy of one candidate on the evaluation subset. Records are appended
/// in candidate insertion order and read-only once the run completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub name: String,
    pub accuracy: f64,
}

/// Result of a benchmark run: the selected pipeline and all score records.
#[derive(Debug)]
pub struct BenchmarkOutcome {
    pub selected: TrainedPipeline,
    pub scores: Vec<ScoreRecord>,
}

impl BenchmarkOutcome {
    /// Score records sorted by descending accuracy for display.
    pub fn ranked_scores(&self) -> Vec<ScoreRecord> {
        let mut ranked = self.scores.clone();
        ranked.sort_by(|a, b| {
            b.accuracy
                .partial_cmp(&a.accuracy)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }
}

/// Trains every candidate pipeline, ranks by evaluation accuracy, and selects
/// the top performer. Candidates are independent (each fits its own
/// vectorizer) and train in parallel.
pub struct BenchmarkRunner {
    candidates: Vec<CandidateSpec>,
    seed: u64,
}

impl BenchmarkRunner {
    /// Create a runner over an ordered candidate list.
    pub fn new(candidates: Vec<CandidateSpec>) -> Self {
        Self {
            candidates,
            seed: 42,
        }
    }

    /// Override the seed shared by the seeded candidates.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Train and score every candidate, then select the one with the highest
    /// accuracy. Ties go to the first-encountered candidate in insertion
    /// order, keeping selection deterministic.
    pub fn run(&self, split: &Split) -> Result<BenchmarkOutcome> {
        if self.candidates.is_empty() {
            return Err(TriageError::ValidationError(
                "no candidate pipelines configured".to_string(),
            ));
        }
        if split.evaluation.is_empty() {
            return Err(TriageError::EvaluationImpossible(
                "evaluation subset is empty; no candidate can be scored".to_string(),
            ));
        }
        if split.training.is_empty() {
            return Err(TriageError::InsufficientData(
                "training subset is empty".to_string(),
            ));
        }

        let eval_texts: Vec<&str> = split.evaluation.iter().map(|s| s.text.as_str()).collect();

        let results: Vec<(TrainedPipeline, ScoreRecord)> = self
            .candidates
            .par_iter()
            .map(|spec| -> Result<(TrainedPipeline, ScoreRecord)> {
                let pipeline = TrainedPipeline::fit(spec, &split.training, self.seed)?;

                let predictions = pipeline.predict_texts(&eval_texts)?;
                let correct = predictions
                    .iter()
                    .zip(split.evaluation.iter())
                    .filter(|(pred, sample)| **pred == sample.label)
                    .count();
                let accuracy = correct as f64 / split.evaluation.len() as f64;

                info!(candidate = %spec.name, accuracy, "candidate scored");

                Ok((
                    pipeline,
                    ScoreRecord {
                        name: spec.name.clone(),
                        accuracy,
                    },
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut best_idx = 0;
        for (i, (_, record)) in results.iter().enumerate() {
            if record.accuracy > results[best_idx].1.accuracy {
                best_idx = i;
            }
        }

        let scores: Vec<ScoreRecord> = results.iter().map(|(_, r)| r.clone()).collect();
        let selected = results
            .into_iter()
            .nth(best_idx)
            .map(|(pipeline, _)| pipeline)
            .ok_or_else(|| {
                TriageError::ComputationError("candidate selection yielded no pipeline".to_string())
            })?;

        info!(
            selected = %selected.name(),
            accuracy = scores[best_idx].accuracy,
            "benchmark complete"
        );

        Ok(BenchmarkOutcome { selected, scores })
    }
}
