//! Candidate pipeline configuration and trained pipelines

use std::time::Instant;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classifiers::{
    LinearSvmClassifier, LogisticRegression, MultinomialNaiveBayes, RandomForest, SvmConfig,
};
use crate::corpus::{CategoryId, Sample};
use crate::error::{Result, TriageError};
use crate::features::TfidfVectorizer;

/// Feature-extraction configuration for one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfConfig {
    /// Vocabulary cap.
    pub max_features: usize,
    /// Word n-gram sizes, inclusive.
    pub ngram_range: (usize, usize),
}

impl TfidfConfig {
    fn build(&self) -> TfidfVectorizer {
        TfidfVectorizer::new()
            .with_max_features(self.max_features)
            .with_ngram_range(self.ngram_range.0, self.ngram_range.1)
    }
}

/// Classification algorithm variant for one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClassifierKind {
    /// Multinomial logistic regression with L2 regularization.
    LogisticRegression { max_iter: usize },
    /// Multinomial naive Bayes with Laplace smoothing.
    MultinomialNaiveBayes { alpha: f64 },
    /// Linear maximum-margin classifier.
    LinearSvm { c: f64, max_iter: usize },
    /// Bagged decision-tree ensemble.
    RandomForest { n_estimators: usize },
}

/// One (feature configuration, algorithm) combination under comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSpec {
    pub name: String,
    pub features: TfidfConfig,
    pub classifier: ClassifierKind,
}

/// The fixed candidate set compared by this system. The ensemble-tree
/// candidate uses a smaller vocabulary cap, trading representation richness
/// for training cost on that higher-variance model.
pub fn default_candidates() -> Vec<CandidateSpec> {
    let wide = TfidfConfig {
        max_features: 20_000,
        ngram_range: (1, 2),
    };
    let narrow = TfidfConfig {
        max_features: 5_000,
        ngram_range: (1, 2),
    };

    vec![
        CandidateSpec {
            name: "Logistic Regression".to_string(),
            features: wide.clone(),
            classifier: ClassifierKind::LogisticRegression { max_iter: 1000 },
        },
        CandidateSpec {
            name: "Multinomial NB".to_string(),
            features: wide.clone(),
            classifier: ClassifierKind::MultinomialNaiveBayes { alpha: 1.0 },
        },
        CandidateSpec {
            name: "Linear SVM".to_string(),
            features: wide,
            classifier: ClassifierKind::LinearSvm {
                c: 1.0,
                max_iter: 1000,
            },
        },
        CandidateSpec {
            name: "Random Forest".to_string(),
            features: narrow,
            classifier: ClassifierKind::RandomForest { n_estimators: 100 },
        },
    ]
}

/// A fitted classification model, dispatched by variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FittedClassifier {
    Logistic(LogisticRegression),
    NaiveBayes(MultinomialNaiveBayes),
    Svm(LinearSvmClassifier),
    Forest(RandomForest),
}

impl FittedClassifier {
    fn predict(&self, x: &Array2<f64>) -> Result<ndarray::Array1<f64>> {
        match self {
            FittedClassifier::Logistic(model) => model.predict(x),
            FittedClassifier::NaiveBayes(model) => model.predict(x),
            FittedClassifier::Svm(model) => model.predict(x),
            FittedClassifier::Forest(model) => model.predict(x),
        }
    }
}

/// A candidate trained end-to-end: fitted vectorizer plus fitted model.
/// Immutable once created; the selected one becomes the production model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedPipeline {
    name: String,
    vectorizer: TfidfVectorizer,
    model: FittedClassifier,
}

impl TrainedPipeline {
    /// Train `spec` on the training subset. The vectorizer is fit on training
    /// texts only; evaluation text never reaches it before freezing.
    pub fn fit(spec: &CandidateSpec, training: &[Sample], seed: u64) -> Result<Self> {
        if training.is_empty() {
            return Err(TriageError::InsufficientData(
                "training subset is empty".to_string(),
            ));
        }

        let start = Instant::now();

        let texts: Vec<String> = training.iter().map(|s| s.text.clone()).collect();
        let labels: ndarray::Array1<f64> =
            training.iter().map(|s| s.label as f64).collect();

        let mut vectorizer = spec.features.build();
        let x = vectorizer.fit_transform(&texts).map_err(|e| {
            TriageError::ComputationError(format!("fit failed for '{}': {}", spec.name, e))
        })?;

        let model = match &spec.classifier {
            ClassifierKind::LogisticRegression { max_iter } => {
                let mut model = LogisticRegression::new().with_max_iter(*max_iter);
                model.fit(&x, &labels)?;
                FittedClassifier::Logistic(model)
            }
            ClassifierKind::MultinomialNaiveBayes { alpha } => {
                let mut model = MultinomialNaiveBayes::new(*alpha);
                model.fit(&x, &labels)?;
                FittedClassifier::NaiveBayes(model)
            }
            ClassifierKind::LinearSvm { c, max_iter } => {
                let config = SvmConfig {
                    c: *c,
                    max_iter: *max_iter,
                    random_state: Some(seed),
                    ..Default::default()
                };
                let mut model = LinearSvmClassifier::new(config);
                model.fit(&x, &labels)?;
                FittedClassifier::Svm(model)
            }
            ClassifierKind::RandomForest { n_estimators } => {
                let mut model = RandomForest::new(*n_estimators).with_random_state(seed);
                model.fit(&x, &labels)?;
                FittedClassifier::Forest(model)
            }
        };

        debug!(
            candidate = %spec.name,
            vocabulary = vectorizer.vocabulary_size(),
            training_secs = start.elapsed().as_secs_f64(),
            "candidate trained"
        );

        Ok(Self {
            name: spec.name.clone(),
            vectorizer,
            model,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Predict category ids for arbitrary texts. Out-of-vocabulary terms are
    /// ignored by the frozen vectorizer, so any input yields a valid category.
    pub fn predict_texts(&self, texts: &[&str]) -> Result<Vec<CategoryId>> {
        let documents: Vec<String> = texts.iter().map(|s| s.to_string()).collect();
        let x = self.vectorizer.transform(&documents)?;
        let predictions = self.model.predict(&x)?;
        Ok(predictions.iter().map(|&v| v.round() as CategoryId).collect())
    }
}
