//! Multinomial naive Bayes

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};

/// Multinomial naive Bayes for count-like features (TF-IDF weights included),
/// with Laplace smoothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultinomialNaiveBayes {
    /// Class labels in ascending order.
    classes: Vec<i64>,
    /// Log prior per class, aligned with `classes`.
    class_log_priors: Vec<f64>,
    /// Log feature probability per class, aligned with `classes`.
    feature_log_probs: Vec<Array1<f64>>,
    /// Smoothing parameter.
    pub alpha: f64,
    is_fitted: bool,
}

impl Default for MultinomialNaiveBayes {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl MultinomialNaiveBayes {
    pub fn new(alpha: f64) -> Self {
        Self {
            classes: Vec::new(),
            class_log_priors: Vec::new(),
            feature_log_probs: Vec::new(),
            alpha,
            is_fitted: false,
        }
    }

    /// Fit per-class feature distributions. Negative feature values are
    /// clamped to zero since the model assumes counts.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

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

        let mut classes: Vec<i64> = y.iter().map(|&v| v.round() as i64).collect();
        classes.sort_unstable();
        classes.dedup();

        let mut log_priors = Vec::with_capacity(classes.len());
        let mut log_probs = Vec::with_capacity(classes.len());

        for &class in &classes {
            let mut feature_counts = Array1::from_elem(n_features, self.alpha);
            let mut total = self.alpha * n_features as f64;
            let mut n_class = 0usize;

            for (row, &label) in x.rows().into_iter().zip(y.iter()) {
                if label.round() as i64 == class {
                    n_class += 1;
                    for (j, &v) in row.iter().enumerate() {
                        let v = v.max(0.0);
                        feature_counts[j] += v;
                        total += v;
                    }
                }
            }

            log_priors.push((n_class as f64 / n_samples as f64).ln());
            log_probs.push(feature_counts.mapv(|c| (c / total).ln()));
        }

        self.classes = classes;
        self.class_log_priors = log_priors;
        self.feature_log_probs = log_probs;
        self.is_fitted = true;

        Ok(self)
    }

    /// Joint log likelihood per class.
    pub fn predict_log_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(TriageError::ModelNotFitted);
        }

        let n_samples = x.nrows();
        let n_classes = self.classes.len();
        let mut log_probs = Array2::zeros((n_samples, n_classes));

        for (i, row) in x.rows().into_iter().enumerate() {
            for j in 0..n_classes {
                let likelihood: f64 = row
                    .iter()
                    .zip(self.feature_log_probs[j].iter())
                    .map(|(&xi, &lp)| xi.max(0.0) * lp)
                    .sum();
                log_probs[[i, j]] = self.class_log_priors[j] + likelihood;
            }
        }

        Ok(log_probs)
    }

    /// Predict class labels: maximum joint log likelihood, lowest class label
    /// winning exact ties.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let log_probs = self.predict_log_proba(x)?;

        let predictions = log_probs
            .rows()
            .into_iter()
            .map(|row| {
                let mut best = 0;
                for (j, &v) in row.iter().enumerate() {
                    if v > row[best] {
                        best = j;
                    }
                }
                self.classes[best] as f64
            })
            .collect();

        Ok(predictions)
    }
}
