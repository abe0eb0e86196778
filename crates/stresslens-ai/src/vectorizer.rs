//! Fitted TF-IDF vectorizer loaded from a JSON export.
//!
//! Vocabulary, IDF weights and weighting options are frozen at training time;
//! this module only implements `transform`. Tokens are runs of two or more
//! word characters, optionally combined into word n-grams.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::info;

use crate::ArtifactError;
use crate::features::SparseRow;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// Row normalisation applied after TF-IDF weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

fn default_true() -> bool {
    true
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

/// TF-IDF vectorizer with a fixed vocabulary.
#[derive(Debug, Clone, Deserialize)]
pub struct TfidfVectorizer {
    /// term → column index
    vocabulary: HashMap<String, usize>,
    #[serde(default)]
    idf: Option<Vec<f64>>,
    #[serde(default = "default_ngram_range")]
    ngram_range: (usize, usize),
    #[serde(default = "default_true")]
    lowercase: bool,
    #[serde(default)]
    sublinear_tf: bool,
    #[serde(default)]
    binary: bool,
    #[serde(default = "default_true")]
    use_idf: bool,
    #[serde(default = "default_norm")]
    norm: Option<Norm>,
    #[serde(default)]
    stop_words: HashSet<String>,
}

impl TfidfVectorizer {
    /// Load a vectorizer export from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        if !path.exists() {
            return Err(ArtifactError::NotFound(path.to_path_buf()));
        }
        let file = std::fs::File::open(path)?;
        let vectorizer: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        vectorizer.validate()?;
        info!(
            vocab = vectorizer.vocabulary_size(),
            ngram_min = vectorizer.ngram_range.0,
            ngram_max = vectorizer.ngram_range.1,
            path = %path.display(),
            "loaded vectorizer"
        );
        Ok(vectorizer)
    }

    /// Parse and validate a vectorizer export from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        let vectorizer: Self = serde_json::from_str(json)?;
        vectorizer.validate()?;
        Ok(vectorizer)
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        let n = self.vocabulary.len();
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ArtifactError::InvalidVectorizer(format!(
                "bad ngram_range ({min_n}, {max_n})"
            )));
        }

        // Column indices must cover 0..n exactly once.
        let mut seen = vec![false; n];
        for (term, &idx) in &self.vocabulary {
            if idx >= n || std::mem::replace(&mut seen[idx], true) {
                return Err(ArtifactError::InvalidVectorizer(format!(
                    "term {term:?} has invalid or duplicate column {idx}"
                )));
            }
        }

        if self.use_idf {
            match &self.idf {
                Some(idf) if idf.len() == n => {}
                Some(idf) => {
                    return Err(ArtifactError::InvalidVectorizer(format!(
                        "idf has {} weights for {n} terms",
                        idf.len()
                    )));
                }
                None => {
                    return Err(ArtifactError::InvalidVectorizer(
                        "use_idf is set but no idf weights were exported".into(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Number of text feature columns.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Transform one document into a TF-IDF row.
    ///
    /// Terms outside the vocabulary are ignored.
    pub fn transform(&self, document: &str) -> SparseRow {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in self.analyze(document) {
            if let Some(&idx) = self.vocabulary.get(&term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut pairs: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(idx, tf)| {
                let tf = if self.binary {
                    1.0
                } else if self.sublinear_tf {
                    1.0 + tf.ln()
                } else {
                    tf
                };
                let weight = match (&self.idf, self.use_idf) {
                    (Some(idf), true) => tf * idf[idx],
                    _ => tf,
                };
                (idx, weight)
            })
            .collect();

        match self.norm {
            Some(Norm::L2) => {
                let norm = pairs.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
                scale(&mut pairs, norm);
            }
            Some(Norm::L1) => {
                let norm = pairs.iter().map(|(_, v)| v.abs()).sum::<f64>();
                scale(&mut pairs, norm);
            }
            None => {}
        }

        SparseRow::from_pairs(self.vocabulary_size(), pairs)
    }

    /// Tokenise, drop stop words, and expand into the configured n-grams.
    fn analyze(&self, document: &str) -> Vec<String> {
        let document = if self.lowercase {
            document.to_lowercase()
        } else {
            document.to_string()
        };

        let tokens: Vec<&str> = TOKEN
            .find_iter(&document)
            .map(|m| m.as_str())
            .filter(|t| !self.stop_words.contains(*t))
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n.min(tokens.len()) {
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }
}

fn scale(pairs: &mut [(usize, f64)], norm: f64) {
    if norm > 0.0 {
        for (_, v) in pairs.iter_mut() {
            *v /= norm;
        }
    }
}
