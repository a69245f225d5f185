//! Model evaluation: per-category metrics and confusion matrix

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::benchmark::TrainedPipeline;
use crate::corpus::{CategoryId, CategoryVocab, Sample};
use crate::error::{Result, TriageError};

/// Actual-vs-predicted counts, indexed by vocabulary position in ascending
/// category-id order. Rows are actual categories, columns predicted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    categories: Vec<CategoryId>,
    counts: Array2<u64>,
}

impl ConfusionMatrix {
    fn new(categories: Vec<CategoryId>) -> Self {
        let n = categories.len();
        Self {
            categories,
            counts: Array2::zeros((n, n)),
        }
    }

    /// Category ids in matrix index order.
    pub fn categories(&self) -> &[CategoryId] {
        &self.categories
    }

    /// Count of samples with actual category `actual` predicted as `predicted`.
    pub fn get(&self, actual: CategoryId, predicted: CategoryId) -> Option<u64> {
        let i = self.categories.iter().position(|&c| c == actual)?;
        let j = self.categories.iter().position(|&c| c == predicted)?;
        Some(self.counts[[i, j]])
    }

    /// Evaluation rows whose actual category sits at matrix index `i`.
    pub fn row_sum(&self, i: usize) -> u64 {
        self.counts.row(i).sum()
    }

    /// Predictions landing on the category at matrix index `i`.
    pub fn column_sum(&self, i: usize) -> u64 {
        self.counts.column(i).sum()
    }

    /// Total count; equals the evaluation subset size.
    pub fn total(&self) -> u64 {
        self.counts.sum()
    }

    /// Raw count grid.
    pub fn counts(&self) -> &Array2<u64> {
        &self.counts
    }
}

/// Metrics for one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub category: CategoryId,
    pub name: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Evaluation rows whose actual label is this category.
    pub support: usize,
    /// Accuracy restricted to this category's evaluation rows.
    /// `None` when the category has no test examples.
    pub accuracy: Option<f64>,
}

/// Full evaluation of the selected pipeline on the evaluation subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub per_class: Vec<ClassMetrics>,
    pub confusion: ConfusionMatrix,
    pub n_evaluated: usize,
}

/// Computes the evaluation report for a trained pipeline.
pub struct Evaluator<'a> {
    vocab: &'a CategoryVocab,
}

impl<'a> Evaluator<'a> {
    pub fn new(vocab: &'a CategoryVocab) -> Self {
        Self { vocab }
    }

    /// Evaluate `pipeline` against the evaluation subset.
    pub fn evaluate(
        &self,
        pipeline: &TrainedPipeline,
        evaluation: &[Sample],
    ) -> Result<EvaluationReport> {
        if evaluation.is_empty() {
            return Err(TriageError::EvaluationImpossible(
                "evaluation subset is empty".to_string(),
            ));
        }

        let texts: Vec<&str> = evaluation.iter().map(|s| s.text.as_str()).collect();
        let predictions = pipeline.predict_texts(&texts)?;

        let categories: Vec<CategoryId> = self.vocab.iter().map(|(id, _)| id).collect();
        let mut confusion = ConfusionMatrix::new(categories);

        for (sample, &predicted) in evaluation.iter().zip(predictions.iter()) {
            let i = self.vocab.index_of(sample.label).ok_or_else(|| {
                TriageError::ValidationError(format!(
                    "evaluate failed: label {} is not in the category vocabulary",
                    sample.label
                ))
            })?;
            let j = self.vocab.index_of(predicted).ok_or_else(|| {
                TriageError::ValidationError(format!(
                    "evaluate failed: predicted category {} is not in the vocabulary",
                    predicted
                ))
            })?;
            confusion.counts[[i, j]] += 1;
        }

        let mut per_class = Vec::with_capacity(self.vocab.len());
        for (i, (id, name)) in self.vocab.iter().enumerate() {
            let tp = confusion.counts[[i, i]] as f64;
            let actual = confusion.row_sum(i) as f64;
            let predicted = confusion.column_sum(i) as f64;

            let precision = if predicted > 0.0 { tp / predicted } else { 0.0 };
            let recall = if actual > 0.0 { tp / actual } else { 0.0 };
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };

            per_class.push(ClassMetrics {
                category: id,
                name: name.to_string(),
                precision,
                recall,
                f1,
                support: actual as usize,
                accuracy: if actual > 0.0 { Some(tp / actual) } else { None },
            });
        }

        Ok(EvaluationReport {
            per_class,
            confusion,
            n_evaluated: evaluation.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::{CandidateSpec, ClassifierKind, TfidfConfig};

    fn vocab() -> CategoryVocab {
        CategoryVocab::new(vec![(0, "credit"), (1, "debt"), (2, "loan")]).unwrap()
    }

    fn trained_pipeline(training: &[Sample]) -> TrainedPipeline {
        let spec = CandidateSpec {
            name: "Multinomial NB".to_string(),
            features: TfidfConfig {
                max_features: 500,
                ngram_range: (1, 2),
            },
            classifier: ClassifierKind::MultinomialNaiveBayes { alpha: 1.0 },
        };
        TrainedPipeline::fit(&spec, training, 42).unwrap()
    }

    fn training_samples() -> Vec<Sample> {
        vec![
            Sample::new("credit report wrong information", 0),
            Sample::new("credit bureau report errors", 0),
            Sample::new("debt collector calling constantly", 1),
            Sample::new("collection agency debt calls", 1),
        ]
    }

    #[test]
    fn test_confusion_matrix_invariants() {
        let vocab = vocab();
        let pipeline = trained_pipeline(&training_samples());

        let evaluation = vec![
            Sample::new("wrong credit report", 0),
            Sample::new("credit report errors everywhere", 0),
            Sample::new("debt collector calls", 1),
        ];

        let report = Evaluator::new(&vocab).evaluate(&pipeline, &evaluation).unwrap();

        assert_eq!(report.n_evaluated, 3);
        assert_eq!(report.confusion.total(), 3);

        // row sums equal per-category actual counts
        assert_eq!(report.confusion.row_sum(0), 2);
        assert_eq!(report.confusion.row_sum(1), 1);
        assert_eq!(report.confusion.row_sum(2), 0);
    }

    #[test]
    fn test_category_without_test_examples_marked() {
        let vocab = vocab();
        let pipeline = trained_pipeline(&training_samples());

        let evaluation = vec![
            Sample::new("credit report mistake", 0),
            Sample::new("debt collector harassment", 1),
        ];

        let report = Evaluator::new(&vocab).evaluate(&pipeline, &evaluation).unwrap();

        let loan = report.per_class.iter().find(|m| m.category == 2).unwrap();
        assert_eq!(loan.support, 0);
        assert_eq!(loan.accuracy, None);
        assert_eq!(loan.recall, 0.0);
    }

    #[test]
    fn test_perfect_predictions_metrics() {
        let vocab = vocab();
        let pipeline = trained_pipeline(&training_samples());

        let evaluation = vec![
            Sample::new("credit report wrong information again", 0),
            Sample::new("debt collector calling about debt", 1),
        ];

        let report = Evaluator::new(&vocab).evaluate(&pipeline, &evaluation).unwrap();

        for metrics in report.per_class.iter().filter(|m| m.support > 0) {
            assert!((metrics.recall - 1.0).abs() < 1e-12);
            assert_eq!(metrics.accuracy, Some(1.0));
        }
    }

    #[test]
    fn test_empty_evaluation_is_fatal() {
        let vocab = vocab();
        let pipeline = trained_pipeline(&training_samples());

        let err = Evaluator::new(&vocab).evaluate(&pipeline, &[]).unwrap_err();
        assert!(matches!(err, TriageError::EvaluationImpossible(_)));
    }
}
