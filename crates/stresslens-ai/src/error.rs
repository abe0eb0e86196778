use std::path::PathBuf;

use thiserror::Error;

/// Failure to load or validate one of the serialized artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact not found: {0}")]
    NotFound(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("numeric matrix column '{0}' is not numeric")]
    NonNumericColumn(String),

    #[error("numeric matrix column '{0}' has no values")]
    EmptyColumn(String),

    #[error("numeric matrix has no columns")]
    EmptyMatrix,

    #[error("invalid vectorizer: {0}")]
    InvalidVectorizer(String),

    #[error("model '{model}' expects {actual} features, pipeline produces {expected}")]
    ShapeMismatch {
        model: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid model '{model}': {reason}")]
    InvalidModel { model: String, reason: String },

    #[error("invalid registry: {0}")]
    InvalidRegistry(String),
}

/// Per-request failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PredictError {
    #[error("input text is empty")]
    EmptyInput,
}
