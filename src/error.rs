//! Error types for the triage engine
//!
//! All fatal conditions abort the benchmarking run; error messages name the
//! stage that failed (split / fit / evaluate) so callers never see a bare
//! "an error occurred".

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, TriageError>;

/// Errors produced by the triage engine
#[derive(Error, Debug)]
pub enum TriageError {
    /// Corpus empty or too small to partition into training and evaluation subsets
    #[error("split failed: {0}")]
    InsufficientData(String),

    /// Evaluation subset is empty; no candidate can be scored or ranked
    #[error("evaluate failed: {0}")]
    EvaluationImpossible(String),

    /// A label in the data source is not present in the category vocabulary
    #[error("unknown category label(s): {0}")]
    UnknownCategory(String),

    /// Invalid argument or configuration
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Array dimension mismatch
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    /// Numeric computation failed
    #[error("computation error: {0}")]
    ComputationError(String),

    /// Prediction requested before fitting
    #[error("model not fitted")]
    ModelNotFitted,

    /// Data loading or conversion failure
    #[error("data error: {0}")]
    DataError(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_stage() {
        let err = TriageError::InsufficientData("corpus is empty".to_string());
        assert!(err.to_string().starts_with("split failed"));

        let err = TriageError::EvaluationImpossible("evaluation subset is empty".to_string());
        assert!(err.to_string().starts_with("evaluate failed"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = TriageError::from(io_error);
        assert!(matches!(err, TriageError::Io(_)));
    }
}
