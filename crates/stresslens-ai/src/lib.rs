//! Inference layer: TF-IDF text features, constant numeric block, fitted classifiers.

mod error;
pub mod features;
pub mod models;
pub mod numeric;
pub mod pipeline;
pub mod registry;
pub mod vectorizer;

pub use error::{ArtifactError, PredictError};
pub use features::{FeatureVector, SparseRow};
pub use numeric::NumericBlock;
pub use pipeline::{Pipeline, PipelineSummary};
pub use registry::{ModelRegistry, ModelSummary, Output, RegisteredModel};
pub use vectorizer::TfidfVectorizer;

#[cfg(test)]
pub(crate) mod fixtures;
