//! CSV data loading
//!
//! Materializes a tabular data source into a [`Corpus`], validating every
//! label against the category vocabulary before the core ever sees it.

use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;

use polars::prelude::*;
use tracing::info;

use crate::corpus::{CategoryVocab, Corpus, Sample};
use crate::error::{Result, TriageError};

/// Loads labeled complaint data from CSV files.
pub struct CorpusLoader {
    text_column: String,
    label_column: String,
}

impl Default for CorpusLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CorpusLoader {
    /// Create a loader expecting the default `text` / `label` columns.
    pub fn new() -> Self {
        Self {
            text_column: "text".to_string(),
            label_column: "label".to_string(),
        }
    }

    /// Override the text column name.
    pub fn with_text_column<S: Into<String>>(mut self, name: S) -> Self {
        self.text_column = name.into();
        self
    }

    /// Override the label column name.
    pub fn with_label_column<S: Into<String>>(mut self, name: S) -> Self {
        self.label_column = name.into();
        self
    }

    /// Load a CSV file and validate it against the vocabulary.
    pub fn load_csv(&self, path: &Path, vocab: &CategoryVocab) -> Result<Corpus> {
        let file = File::open(path).map_err(|e| {
            TriageError::DataError(format!("cannot open {}: {}", path.display(), e))
        })?;

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(100))
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| TriageError::DataError(e.to_string()))?;

        let corpus = self.from_dataframe(&df, vocab)?;
        info!(
            samples = corpus.len(),
            categories = vocab.len(),
            path = %path.display(),
            "corpus loaded"
        );
        Ok(corpus)
    }

    /// Convert an already-read frame into a validated corpus.
    pub fn from_dataframe(&self, df: &DataFrame, vocab: &CategoryVocab) -> Result<Corpus> {
        let text_series = df
            .column(&self.text_column)
            .map_err(|_| TriageError::DataError(format!("missing column '{}'", self.text_column)))?;
        let label_series = df
            .column(&self.label_column)
            .map_err(|_| TriageError::DataError(format!("missing column '{}'", self.label_column)))?;

        let texts = text_series
            .str()
            .map_err(|e| TriageError::DataError(e.to_string()))?;

        let labels_i64 = label_series
            .cast(&DataType::Int64)
            .map_err(|e| TriageError::DataError(e.to_string()))?;
        let labels = labels_i64
            .i64()
            .map_err(|e| TriageError::DataError(e.to_string()))?;

        let mut samples = Vec::with_capacity(df.height());
        let mut unknown: BTreeSet<i64> = BTreeSet::new();

        for (row, (text, label)) in texts.into_iter().zip(labels.into_iter()).enumerate() {
            let text = text.ok_or_else(|| {
                TriageError::DataError(format!("row {}: missing text value", row))
            })?;
            let label = label.ok_or_else(|| {
                TriageError::DataError(format!("row {}: missing label value", row))
            })?;

            if text.trim().is_empty() {
                return Err(TriageError::DataError(format!(
                    "row {}: text is empty",
                    row
                )));
            }

            if label < 0 || !vocab.contains(label as u32) {
                unknown.insert(label);
                continue;
            }

            samples.push(Sample::new(text, label as u32));
        }

        if !unknown.is_empty() {
            let ids: Vec<String> = unknown.iter().map(|id| id.to_string()).collect();
            return Err(TriageError::UnknownCategory(ids.join(", ")));
        }

        Ok(Corpus::from_samples(samples))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> CategoryVocab {
        CategoryVocab::new(vec![(0, "zero"), (1, "one")]).unwrap()
    }

    fn frame(texts: &[&str], labels: &[i64]) -> DataFrame {
        df!(
            "text" => texts,
            "label" => labels,
        )
        .unwrap()
    }

    #[test]
    fn test_from_dataframe() {
        let df = frame(&["first complaint", "second complaint"], &[0, 1]);
        let corpus = CorpusLoader::new().from_dataframe(&df, &vocab()).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.samples()[1].label, 1);
    }

    #[test]
    fn test_unknown_labels_reported() {
        let df = frame(&["a", "b", "c"], &[0, 7, 9]);
        let err = CorpusLoader::new().from_dataframe(&df, &vocab()).unwrap_err();
        match err {
            TriageError::UnknownCategory(ids) => {
                assert_eq!(ids, "7, 9");
            }
            other => panic!("expected UnknownCategory, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_text_rejected() {
        let df = frame(&["ok", "   "], &[0, 1]);
        let err = CorpusLoader::new().from_dataframe(&df, &vocab()).unwrap_err();
        assert!(matches!(err, TriageError::DataError(_)));
    }

    #[test]
    fn test_custom_column_names() {
        let df = df!(
            "narrative" => &["text body"],
            "product" => &[1i64],
        )
        .unwrap();
        let corpus = CorpusLoader::new()
            .with_text_column("narrative")
            .with_label_column("product")
            .from_dataframe(&df, &vocab())
            .unwrap();
        assert_eq!(corpus.len(), 1);
    }
}
