//! Count and TF-IDF vectorizers
//!
//! Vocabulary selection ranks n-grams by document frequency with ties broken
//! alphabetically, so fitting twice on the same texts yields byte-identical
//! vocabularies and weights.

use std::collections::{HashMap, HashSet};

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};
use crate::features::TextTokenizer;

/// Count-based n-gram vectorizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountVectorizer {
    tokenizer: TextTokenizer,
    vocabulary: HashMap<String, usize>,
    max_features: Option<usize>,
    ngram_range: (usize, usize),
}

impl Default for CountVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl CountVectorizer {
    pub fn new() -> Self {
        Self {
            tokenizer: TextTokenizer::new().with_english_stop_words(),
            vocabulary: HashMap::new(),
            max_features: None,
            ngram_range: (1, 1),
        }
    }

    /// Cap the vocabulary at the `n` most document-frequent n-grams.
    pub fn with_max_features(mut self, n: usize) -> Self {
        self.max_features = Some(n);
        self
    }

    /// Generate n-grams for sizes `min..=max` (word n-grams joined by spaces).
    pub fn with_ngram_range(mut self, min: usize, max: usize) -> Self {
        self.ngram_range = (min.max(1), max.max(min));
        self
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    fn generate_ngrams(&self, tokens: &[String]) -> Vec<String> {
        let mut ngrams = Vec::new();
        for n in self.ngram_range.0..=self.ngram_range.1 {
            if tokens.len() >= n {
                for i in 0..=(tokens.len() - n) {
                    ngrams.push(tokens[i..i + n].join(" "));
                }
            }
        }
        ngrams
    }

    /// Build the vocabulary from training documents.
    pub fn fit(&mut self, documents: &[String]) -> Result<()> {
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let tokens = self.tokenizer.tokenize(doc);
            let ngrams = self.generate_ngrams(&tokens);
            let unique: HashSet<&String> = ngrams.iter().collect();
            for ngram in unique {
                *doc_freq.entry(ngram.clone()).or_insert(0) += 1;
            }
        }

        // Rank by document frequency; alphabetical tie-break keeps the
        // vocabulary deterministic across fits.
        let mut ranked: Vec<(String, usize)> = doc_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        if let Some(max_n) = self.max_features {
            ranked.truncate(max_n);
        }

        self.vocabulary.clear();
        for (idx, (term, _)) in ranked.into_iter().enumerate() {
            self.vocabulary.insert(term, idx);
        }

        Ok(())
    }

    /// Produce the term-count matrix for `documents`. Terms outside the fitted
    /// vocabulary contribute nothing.
    pub fn transform(&self, documents: &[String]) -> Result<Array2<f64>> {
        if self.vocabulary.is_empty() {
            return Err(TriageError::ModelNotFitted);
        }

        let n_features = self.vocabulary.len();
        let mut result = Array2::zeros((documents.len(), n_features));

        for (doc_idx, doc) in documents.iter().enumerate() {
            let tokens = self.tokenizer.tokenize(doc);
            for ngram in self.generate_ngrams(&tokens) {
                if let Some(&idx) = self.vocabulary.get(&ngram) {
                    result[[doc_idx, idx]] += 1.0;
                }
            }
        }

        Ok(result)
    }

    /// Vocabulary terms in feature-index order.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = vec![String::new(); self.vocabulary.len()];
        for (term, &idx) in &self.vocabulary {
            names[idx] = term.clone();
        }
        names
    }
}

/// TF-IDF vectorizer: term counts weighted by smoothed inverse document
/// frequency, L2-normalized per document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    count_vectorizer: CountVectorizer,
    idf: Option<Array1<f64>>,
    normalize: bool,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TfidfVectorizer {
    pub fn new() -> Self {
        Self {
            count_vectorizer: CountVectorizer::new(),
            idf: None,
            normalize: true,
        }
    }

    pub fn with_max_features(mut self, n: usize) -> Self {
        self.count_vectorizer = self.count_vectorizer.with_max_features(n);
        self
    }

    pub fn with_ngram_range(mut self, min: usize, max: usize) -> Self {
        self.count_vectorizer = self.count_vectorizer.with_ngram_range(min, max);
        self
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn is_fitted(&self) -> bool {
        self.idf.is_some()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.count_vectorizer.vocabulary_size()
    }

    /// Fit vocabulary and idf weights on training documents only. Statistics
    /// are frozen afterwards; `transform` never updates them.
    pub fn fit(&mut self, documents: &[String]) -> Result<()> {
        self.count_vectorizer.fit(documents)?;

        let count_matrix = self.count_vectorizer.transform(documents)?;
        let n_docs = documents.len() as f64;
        let n_features = count_matrix.ncols();

        let mut idf = Array1::zeros(n_features);
        for j in 0..n_features {
            let df = count_matrix
                .column(j)
                .iter()
                .filter(|&&v| v > 0.0)
                .count() as f64;
            // smoothed idf: ln((1 + n) / (1 + df)) + 1
            idf[j] = ((n_docs + 1.0) / (df + 1.0)).ln() + 1.0;
        }

        self.idf = Some(idf);
        Ok(())
    }

    /// Weight documents with the frozen statistics.
    pub fn transform(&self, documents: &[String]) -> Result<Array2<f64>> {
        let idf = self.idf.as_ref().ok_or(TriageError::ModelNotFitted)?;

        let mut matrix = self.count_vectorizer.transform(documents)?;

        for i in 0..matrix.nrows() {
            for j in 0..matrix.ncols() {
                matrix[[i, j]] *= idf[j];
            }
        }

        if self.normalize {
            for i in 0..matrix.nrows() {
                let norm: f64 = matrix.row(i).iter().map(|&v| v * v).sum::<f64>().sqrt();
                if norm > 0.0 {
                    for j in 0..matrix.ncols() {
                        matrix[[i, j]] /= norm;
                    }
                }
            }
        }

        Ok(matrix)
    }

    pub fn fit_transform(&mut self, documents: &[String]) -> Result<Array2<f64>> {
        self.fit(documents)?;
        self.transform(documents)
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.count_vectorizer.feature_names()
    }
}
