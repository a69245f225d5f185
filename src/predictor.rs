//! Inference over the selected pipeline

use crate::benchmark::TrainedPipeline;
use crate::corpus::{CategoryId, CategoryVocab};
use crate::error::{Result, TriageError};

/// Exposes the selected pipeline's inference operation for new text.
/// Accepts arbitrary UTF-8, including text with no overlap with the training
/// vocabulary, and always returns exactly one configured category.
pub struct Predictor<'a> {
    vocab: &'a CategoryVocab,
    pipeline: &'a TrainedPipeline,
}

impl<'a> Predictor<'a> {
    pub fn new(vocab: &'a CategoryVocab, pipeline: &'a TrainedPipeline) -> Self {
        Self { vocab, pipeline }
    }

    /// Predict the category for one non-empty text.
    pub fn predict(&self, text: &str) -> Result<CategoryId> {
        if text.trim().is_empty() {
            return Err(TriageError::ValidationError(
                "prediction input text is empty".to_string(),
            ));
        }

        let predictions = self.pipeline.predict_texts(&[text])?;
        Ok(predictions[0])
    }

    /// Predict categories for a batch of texts, pairing each input with its
    /// predicted category id.
    pub fn predict_many(&self, texts: &[&str]) -> Result<Vec<(String, CategoryId)>> {
        texts
            .iter()
            .map(|&text| self.predict(text).map(|id| (text.to_string(), id)))
            .collect()
    }

    /// Display name for a predicted category.
    pub fn category_name(&self, id: CategoryId) -> Option<&str> {
        self.vocab.name(id)
    }
}
