//! Linear support vector machine
//!
//! SMO training on the linear kernel, with the dual solution collapsed into a
//! primal weight vector after fitting. Multi-class prediction uses
//! one-vs-rest decision scores; no probability output.

use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};

/// Maximum number of training samples for the eager kernel matrix.
const MAX_KERNEL_MATRIX_SAMPLES: usize = 10_000;

/// SVM hyperparameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvmConfig {
    /// Regularization parameter (C).
    pub c: f64,
    /// Tolerance for the KKT stopping criterion.
    pub tol: f64,
    /// Maximum number of SMO sweeps.
    pub max_iter: usize,
    /// Random seed for working-pair selection.
    pub random_state: Option<u64>,
}

impl Default for SvmConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            tol: 1e-3,
            max_iter: 1000,
            random_state: Some(42),
        }
    }
}

/// One binary maximum-margin separator in primal form.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BinarySvm {
    weights: Array1<f64>,
    bias: f64,
}

impl BinarySvm {
    fn score(&self, sample: &Array1<f64>) -> f64 {
        self.weights.dot(sample) + self.bias
    }
}

/// Linear SVM classifier; binary directly, multi-class via one-vs-rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSvmClassifier {
    config: SvmConfig,
    /// Class labels in ascending order.
    classes: Vec<i64>,
    /// One machine for binary problems, one per class otherwise.
    machines: Vec<BinarySvm>,
    is_fitted: bool,
}

impl LinearSvmClassifier {
    pub fn new(config: SvmConfig) -> Self {
        Self {
            config,
            classes: Vec::new(),
            machines: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit the classifier. Labels must be integral.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(TriageError::ShapeError {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }
        for (i, &v) in y.iter().enumerate() {
            if (v - v.round()).abs() > 1e-9 {
                return Err(TriageError::ValidationError(format!(
                    "SVM requires integer class labels, but sample {} has label {}",
                    i, v
                )));
            }
        }
        if x.nrows() > MAX_KERNEL_MATRIX_SAMPLES {
            return Err(TriageError::ValidationError(format!(
                "dataset has {} samples, exceeding the maximum {} for the SVM kernel matrix",
                x.nrows(),
                MAX_KERNEL_MATRIX_SAMPLES
            )));
        }

        let mut classes: Vec<i64> = y.iter().map(|&v| v.round() as i64).collect();
        classes.sort_unstable();
        classes.dedup();

        if classes.len() < 2 {
            return Err(TriageError::ValidationError(
                "SVM requires at least 2 distinct classes".to_string(),
            ));
        }

        // linear kernel matrix, shared by every one-vs-rest problem
        let gram = x.dot(&x.t());

        let targets: Vec<i64> = if classes.len() == 2 {
            vec![classes[1]]
        } else {
            classes.clone()
        };

        let mut machines = Vec::with_capacity(targets.len());
        for class in targets {
            let y_signed: Array1<f64> =
                y.mapv(|v| if v.round() as i64 == class { 1.0 } else { -1.0 });
            machines.push(self.smo_train(x, &gram, &y_signed)?);
        }
        self.machines = machines;

        self.classes = classes;
        self.is_fitted = true;
        Ok(())
    }

    /// SMO on a ±1 problem; returns the primal weights `Σ αᵢ yᵢ xᵢ` and bias.
    fn smo_train(
        &self,
        x: &Array2<f64>,
        gram: &Array2<f64>,
        y: &Array1<f64>,
    ) -> Result<BinarySvm> {
        let n = x.nrows();
        let mut alphas: Array1<f64> = Array1::zeros(n);
        let mut bias = 0.0;

        let mut rng = match self.config.random_state {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };

        let decision = |alphas: &Array1<f64>, bias: f64, idx: usize| -> f64 {
            let mut sum = 0.0;
            for i in 0..n {
                sum += alphas[i] * y[i] * gram[[i, idx]];
            }
            sum + bias
        };

        let mut passes = 0;
        let max_passes = 5;
        let mut total_iter = 0;

        while passes < max_passes && total_iter < self.config.max_iter {
            let mut num_changed = 0;

            if n <= 1 {
                break;
            }

            for i in 0..n {
                let e_i = decision(&alphas, bias, i) - y[i];

                if (y[i] * e_i < -self.config.tol && alphas[i] < self.config.c)
                    || (y[i] * e_i > self.config.tol && alphas[i] > 0.0)
                {
                    let j = loop {
                        let j = rng.gen_range(0..n);
                        if j != i {
                            break j;
                        }
                    };

                    let e_j = decision(&alphas, bias, j) - y[j];

                    let alpha_i_old = alphas[i];
                    let alpha_j_old = alphas[j];

                    let (low, high) = if y[i] != y[j] {
                        (
                            (alphas[j] - alphas[i]).max(0.0),
                            (self.config.c + alphas[j] - alphas[i]).min(self.config.c),
                        )
                    } else {
                        (
                            (alphas[i] + alphas[j] - self.config.c).max(0.0),
                            (alphas[i] + alphas[j]).min(self.config.c),
                        )
                    };

                    if (low - high).abs() < 1e-10 {
                        continue;
                    }

                    let eta = 2.0 * gram[[i, j]] - gram[[i, i]] - gram[[j, j]];
                    if eta >= 0.0 {
                        continue;
                    }

                    alphas[j] -= y[j] * (e_i - e_j) / eta;
                    alphas[j] = alphas[j].max(low).min(high);

                    if (alphas[j] - alpha_j_old).abs() < 1e-5 {
                        continue;
                    }

                    alphas[i] += y[i] * y[j] * (alpha_j_old - alphas[j]);

                    let b1 = bias
                        - e_i
                        - y[i] * (alphas[i] - alpha_i_old) * gram[[i, i]]
                        - y[j] * (alphas[j] - alpha_j_old) * gram[[i, j]];
                    let b2 = bias
                        - e_j
                        - y[i] * (alphas[i] - alpha_i_old) * gram[[i, j]]
                        - y[j] * (alphas[j] - alpha_j_old) * gram[[j, j]];

                    bias = if alphas[i] > 0.0 && alphas[i] < self.config.c {
                        b1
                    } else if alphas[j] > 0.0 && alphas[j] < self.config.c {
                        b2
                    } else {
                        (b1 + b2) / 2.0
                    };

                    num_changed += 1;
                }
            }

            total_iter += 1;
            if num_changed == 0 {
                passes += 1;
            } else {
                passes = 0;
            }
        }

        let coef = &alphas * y;
        let weights = x.t().dot(&coef);
        Ok(BinarySvm { weights, bias })
    }

    /// Predict class labels. Binary: sign of the decision score; multi-class:
    /// highest one-vs-rest score, lowest class label winning exact ties.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(TriageError::ModelNotFitted);
        }

        let n = x.nrows();
        let mut predictions = Array1::zeros(n);

        for i in 0..n {
            let sample = x.row(i).to_owned();
            predictions[i] = if self.classes.len() == 2 {
                if self.machines[0].score(&sample) >= 0.0 {
                    self.classes[1] as f64
                } else {
                    self.classes[0] as f64
                }
            } else {
                let mut best = 0;
                let mut best_score = f64::NEG_INFINITY;
                for (k, machine) in self.machines.iter().enumerate() {
                    let score = machine.score(&sample);
                    if score > best_score {
                        best_score = score;
                        best = k;
                    }
                }
                self.classes[best] as f64
            };
        }

        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn binary_data() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [0.0, 0.1],
            [0.1, 0.0],
            [0.2, 0.2],
            [0.1, 0.3],
            [2.0, 2.1],
            [2.1, 1.9],
            [1.9, 2.2],
            [2.2, 2.0],
        ];
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        (x, y)
    }

    #[test]
    fn test_binary_classification() {
        let (x, y) = binary_data();
        let mut svm = LinearSvmClassifier::new(SvmConfig::default());
        svm.fit(&x, &y).unwrap();

        let predictions = svm.predict(&x).unwrap();
        let correct = predictions
            .iter()
            .zip(y.iter())
            .filter(|(p, a)| (*p - *a).abs() < 0.5)
            .count();
        assert!(correct >= 7, "only {} of 8 correct", correct);
    }

    #[test]
    fn test_multiclass_one_vs_rest() {
        let x = array![
            [1.0, 0.0, 0.0],
            [0.9, 0.1, 0.0],
            [0.8, 0.2, 0.0],
            [0.0, 1.0, 0.0],
            [0.1, 0.9, 0.0],
            [0.0, 0.8, 0.2],
            [0.0, 0.0, 1.0],
            [0.1, 0.0, 0.9],
            [0.0, 0.2, 0.8],
        ];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0];

        let mut svm = LinearSvmClassifier::new(SvmConfig::default());
        svm.fit(&x, &y).unwrap();

        let predictions = svm.predict(&x).unwrap();
        let correct = predictions
            .iter()
            .zip(y.iter())
            .filter(|(p, a)| (*p - *a).abs() < 0.5)
            .count();
        assert!(correct >= 8, "only {} of 9 correct", correct);
    }

    #[test]
    fn test_single_class_rejected() {
        let x = array![[1.0], [2.0]];
        let y = array![0.0, 0.0];
        let mut svm = LinearSvmClassifier::new(SvmConfig::default());
        assert!(svm.fit(&x, &y).is_err());
    }

    #[test]
    fn test_fractional_labels_rejected() {
        let x = array![[1.0], [2.0]];
        let y = array![0.5, 1.0];
        let mut svm = LinearSvmClassifier::new(SvmConfig::default());
        assert!(svm.fit(&x, &y).is_err());
    }

    #[test]
    fn test_seeded_fit_is_deterministic() {
        let (x, y) = binary_data();
        let mut a = LinearSvmClassifier::new(SvmConfig::default());
        let mut b = LinearSvmClassifier::new(SvmConfig::default());
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        let pa = a.predict(&x).unwrap();
        let pb = b.predict(&x).unwrap();
        assert_eq!(pa, pb);
    }
}
