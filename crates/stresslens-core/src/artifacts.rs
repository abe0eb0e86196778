//! Locations of the serialized artifacts produced by the training pipeline.

use std::path::{Path, PathBuf};

/// Default file name of the classifier registry.
pub const DEFAULT_MODELS_FILE: &str = "final_models.json";
/// Default file name of the fitted TF-IDF vectorizer.
pub const DEFAULT_VECTORIZER_FILE: &str = "tfidf.json";
/// Default file name of the scaled numeric training matrix.
pub const DEFAULT_NUMERIC_FILE: &str = "X_train_num_scaled.parquet";

/// Paths to the three artifacts loaded at start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub models: PathBuf,
    pub vectorizer: PathBuf,
    pub numeric: PathBuf,
}

impl ArtifactPaths {
    /// Default file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            models: dir.join(DEFAULT_MODELS_FILE),
            vectorizer: dir.join(DEFAULT_VECTORIZER_FILE),
            numeric: dir.join(DEFAULT_NUMERIC_FILE),
        }
    }

    /// Resolve file names against `dir`, falling back to the defaults.
    ///
    /// Absolute overrides are used as-is.
    pub fn resolve(
        dir: &Path,
        models: Option<&Path>,
        vectorizer: Option<&Path>,
        numeric: Option<&Path>,
    ) -> Self {
        let defaults = Self::in_dir(dir);
        Self {
            models: models.map(|p| dir.join(p)).unwrap_or(defaults.models),
            vectorizer: vectorizer
                .map(|p| dir.join(p))
                .unwrap_or(defaults.vectorizer),
            numeric: numeric.map(|p| dir.join(p)).unwrap_or(defaults.numeric),
        }
    }
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self::in_dir(Path::new("."))
    }
}
