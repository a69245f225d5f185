//! Multinomial logistic regression

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};

/// Multinomial (softmax) logistic regression with L2 regularization,
/// fit by batch gradient descent from a zero initialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Fitted coefficients, one column per class.
    coefficients: Option<Array2<f64>>,
    /// Fitted intercepts, one per class.
    intercepts: Option<Array1<f64>>,
    /// Class labels in ascending order.
    classes: Vec<i64>,
    /// L2 regularization strength.
    pub alpha: f64,
    /// Maximum gradient descent iterations.
    pub max_iter: usize,
    /// Convergence tolerance on the gradient norm.
    pub tol: f64,
    /// Learning rate.
    pub learning_rate: f64,
    is_fitted: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercepts: None,
            classes: Vec::new(),
            alpha: 0.01,
            max_iter: 1000,
            tol: 1e-6,
            learning_rate: 0.1,
            is_fitted: false,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    /// Row-wise softmax with max-subtraction for numeric stability.
    fn softmax(scores: &Array2<f64>) -> Array2<f64> {
        let mut probs = scores.clone();
        for mut row in probs.rows_mut() {
            let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let mut sum = 0.0;
            for v in row.iter_mut() {
                *v = (*v - max).exp();
                sum += *v;
            }
            for v in row.iter_mut() {
                *v /= sum;
            }
        }
        probs
    }

    /// Fit by gradient descent, stopping at convergence or the iteration cap,
    /// whichever comes first. Weights start at zero, so the fit is
    /// deterministic without any seed.
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
        let n_classes = classes.len();

        // one-hot targets
        let mut y_onehot = Array2::zeros((n_samples, n_classes));
        for (i, &label) in y.iter().enumerate() {
            let class = label.round() as i64;
            let idx = classes.binary_search(&class).unwrap_or(0);
            y_onehot[[i, idx]] = 1.0;
        }

        let mut weights: Array2<f64> = Array2::zeros((n_features, n_classes));
        let mut biases: Array1<f64> = Array1::zeros(n_classes);

        let lr = self.learning_rate;
        let alpha = self.alpha;

        for _iter in 0..self.max_iter {
            let scores = x.dot(&weights) + &biases;
            let probs = Self::softmax(&scores);
            let errors = &probs - &y_onehot;

            let grad_w = x.t().dot(&errors) / n_samples as f64 + alpha * &weights;
            let grad_b = errors.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(n_classes));

            let grad_norm =
                (grad_w.mapv(|v| v * v).sum() + grad_b.mapv(|v| v * v).sum()).sqrt();
            if grad_norm < self.tol {
                break;
            }

            weights = weights - lr * &grad_w;
            biases = biases - lr * &grad_b;
        }

        self.coefficients = Some(weights);
        self.intercepts = Some(biases);
        self.classes = classes;
        self.is_fitted = true;

        Ok(self)
    }

    /// Per-class probabilities.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(TriageError::ModelNotFitted);
        }

        let weights = self.coefficients.as_ref().unwrap();
        let biases = self.intercepts.as_ref().unwrap();
        let scores = x.dot(weights) + biases;
        Ok(Self::softmax(&scores))
    }

    /// Predict class labels: the highest-scoring class per row, with the
    /// lowest class label winning exact ties.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(TriageError::ModelNotFitted);
        }

        let weights = self.coefficients.as_ref().unwrap();
        let biases = self.intercepts.as_ref().unwrap();
        let scores = x.dot(weights) + biases;

        let predictions = scores
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

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn separable_data() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [1.0, 0.0, 0.0],
            [0.9, 0.1, 0.0],
            [0.8, 0.0, 0.2],
            [0.0, 1.0, 0.0],
            [0.1, 0.9, 0.0],
            [0.0, 0.8, 0.2],
            [0.0, 0.0, 1.0],
            [0.2, 0.0, 0.8],
            [0.0, 0.1, 0.9],
        ];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0];
        (x, y)
    }

    #[test]
    fn test_multiclass_fit_predict() {
        let (x, y) = separable_data();
        let mut model = LogisticRegression::new();
        model.fit(&x, &y).unwrap();

        let predictions = model.predict(&x).unwrap();
        let correct = predictions
            .iter()
            .zip(y.iter())
            .filter(|(p, a)| (*p - *a).abs() < 0.5)
            .count();
        assert!(correct >= 8, "only {} of 9 correct", correct);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let (x, y) = separable_data();
        let mut model = LogisticRegression::new();
        model.fit(&x, &y).unwrap();

        let proba = model.predict_proba(&x).unwrap();
        for row in proba.rows() {
            let sum: f64 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_deterministic_fit() {
        let (x, y) = separable_data();
        let mut a = LogisticRegression::new();
        let mut b = LogisticRegression::new();
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        assert_eq!(a.coefficients, b.coefficients);
        assert_eq!(a.intercepts, b.intercepts);
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let model = LogisticRegression::new();
        let x = array![[0.0, 1.0]];
        assert!(matches!(
            model.predict(&x),
            Err(TriageError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_zero_vector_input_returns_known_class() {
        let (x, y) = separable_data();
        let mut model = LogisticRegression::new();
        model.fit(&x, &y).unwrap();

        let oov = array![[0.0, 0.0, 0.0]];
        let pred = model.predict(&oov).unwrap();
        assert!(y.iter().any(|&c| (c - pred[0]).abs() < 0.5));
    }
}
