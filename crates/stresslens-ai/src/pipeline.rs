//! Stress inference pipeline.
//!
//! Built once from the three artifacts and never mutated afterwards, so a
//! single `Pipeline` can be shared by reference across every request.

use stresslens_core::{ArtifactPaths, PredictionSet, is_blank, normalize};
use tracing::{debug, info};

use crate::features::FeatureVector;
use crate::numeric::NumericBlock;
use crate::registry::{ModelRegistry, ModelSummary};
use crate::vectorizer::TfidfVectorizer;
use crate::{ArtifactError, PredictError};

/// Vectorizer, numeric block and classifier registry, validated against each other.
#[derive(Debug, Clone)]
pub struct Pipeline {
    vectorizer: TfidfVectorizer,
    numeric: NumericBlock,
    registry: ModelRegistry,
}

/// Shape of a loaded pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSummary {
    pub vocabulary_size: usize,
    pub numeric_columns: Vec<String>,
    pub feature_count: usize,
    pub models: Vec<ModelSummary>,
}

impl Pipeline {
    /// Load all three artifacts. Any missing or malformed artifact is fatal.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactError> {
        let vectorizer = TfidfVectorizer::load(&paths.vectorizer)?;
        let numeric = NumericBlock::load(&paths.numeric)?;
        let registry = ModelRegistry::load(&paths.models)?;
        Self::new(vectorizer, numeric, registry)
    }

    /// Assemble a pipeline, checking every model against the combined feature width.
    pub fn new(
        vectorizer: TfidfVectorizer,
        numeric: NumericBlock,
        registry: ModelRegistry,
    ) -> Result<Self, ArtifactError> {
        let dim = vectorizer.vocabulary_size() + numeric.width();
        registry.validate(dim)?;
        info!(
            features = dim,
            vocab = vectorizer.vocabulary_size(),
            numeric = numeric.width(),
            models = registry.len(),
            "pipeline ready"
        );
        Ok(Self {
            vectorizer,
            numeric,
            registry,
        })
    }

    /// Total feature columns: vocabulary size + numeric columns.
    pub fn feature_count(&self) -> usize {
        self.vectorizer.vocabulary_size() + self.numeric.width()
    }

    /// Normalise `text` and assemble its feature vector.
    ///
    /// The numeric block is the training-matrix mean and does not depend on `text`.
    pub fn features(&self, text: &str) -> FeatureVector<'_> {
        let cleaned = normalize(text);
        let row = self.vectorizer.transform(&cleaned);
        debug!(cleaned = %cleaned, terms = row.nnz(), "vectorised input");
        FeatureVector::new(row, self.numeric.values())
    }

    /// Score `text` with every registered model, in registry order.
    pub fn predict(&self, text: &str) -> Result<PredictionSet, PredictError> {
        if is_blank(text) {
            return Err(PredictError::EmptyInput);
        }

        let x = self.features(text);
        let mut results = PredictionSet::with_capacity(self.registry.len());
        for model in self.registry.iter() {
            let prediction = model.score(&x);
            debug!(
                model = %model.name,
                label = %prediction.label,
                probability = ?prediction.probability,
                "scored"
            );
            results.push(model.name.clone(), prediction);
        }
        Ok(results)
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn summary(&self) -> PipelineSummary {
        PipelineSummary {
            vocabulary_size: self.vectorizer.vocabulary_size(),
            numeric_columns: self.numeric.columns().to_vec(),
            feature_count: self.feature_count(),
            models: self.registry.summary(),
        }
    }
}
