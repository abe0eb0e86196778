//! Ordered, named collection of fitted classifiers.
//!
//! Each entry carries an [`Output`] tag fixed at load: either it reports a
//! positive-class probability alongside its label, or it is label-only.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use stresslens_core::{Label, Prediction};
use tracing::{info, warn};

use crate::ArtifactError;
use crate::features::FeatureVector;
use crate::models::{Model, ModelShapeError};

/// What a registered model reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// Label plus probability and confidence.
    WithProbability,
    /// Label only; probability and confidence are absent.
    LabelOnly,
}

/// One named classifier in registry order.
#[derive(Debug, Clone)]
pub struct RegisteredModel {
    pub name: String,
    pub model: Model,
    pub output: Output,
}

impl RegisteredModel {
    /// Label, plus probability and confidence when the output tag asks for them.
    ///
    /// Only reachable through [`crate::Pipeline`], which has checked the feature width.
    pub(crate) fn score(&self, x: &FeatureVector<'_>) -> Prediction {
        let label = Label::from_class(self.model.predict(x));
        match self.output {
            Output::LabelOnly => Prediction::label_only(label),
            Output::WithProbability => match self.model.positive_probability(x) {
                Some(p) => Prediction::with_probability(label, p),
                // Checked at load.
                None => Prediction::label_only(label),
            },
        }
    }
}

/// Summary row for one registered model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSummary {
    pub name: String,
    pub kind: &'static str,
    pub reports_probability: bool,
}

#[derive(Deserialize)]
struct RegistryFile {
    models: Vec<RegistryEntry>,
}

#[derive(Deserialize)]
struct RegistryEntry {
    name: String,
    #[serde(default)]
    probability: bool,
    #[serde(flatten)]
    model: Model,
}

/// Fitted classifiers keyed by name, in registry order.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: Vec<RegisteredModel>,
}

impl ModelRegistry {
    /// Load the registry export from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        if !path.exists() {
            return Err(ArtifactError::NotFound(path.to_path_buf()));
        }
        let file = std::fs::File::open(path)?;
        let raw: RegistryFile = serde_json::from_reader(std::io::BufReader::new(file))?;
        let registry = Self::from_entries(raw.models)?;
        info!(
            models = registry.len(),
            path = %path.display(),
            "loaded model registry"
        );
        Ok(registry)
    }

    /// Parse a registry export from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        let raw: RegistryFile = serde_json::from_str(json)?;
        Self::from_entries(raw.models)
    }

    fn from_entries(entries: Vec<RegistryEntry>) -> Result<Self, ArtifactError> {
        if entries.is_empty() {
            return Err(ArtifactError::InvalidRegistry("no models".into()));
        }

        let mut seen = HashSet::new();
        let mut models = Vec::with_capacity(entries.len());
        for entry in entries {
            if !seen.insert(entry.name.clone()) {
                return Err(ArtifactError::InvalidRegistry(format!(
                    "duplicate model name '{}'",
                    entry.name
                )));
            }
            if let Err(reason) = entry.model.check_structure() {
                return Err(ArtifactError::InvalidModel {
                    model: entry.name,
                    reason,
                });
            }
            let output = if entry.probability {
                if !entry.model.supports_probability() {
                    return Err(ArtifactError::InvalidModel {
                        model: entry.name,
                        reason: format!("{} cannot report a probability", entry.model.kind()),
                    });
                }
                Output::WithProbability
            } else {
                Output::LabelOnly
            };
            models.push(RegisteredModel {
                name: entry.name,
                model: entry.model,
                output,
            });
        }

        let designated = models
            .iter()
            .filter(|m| m.output == Output::WithProbability)
            .count();
        if designated != 1 {
            warn!(designated, "expected exactly one model designated to report probability");
        }

        Ok(Self { models })
    }

    /// Check every model against the pipeline's feature width.
    pub fn validate(&self, dim: usize) -> Result<(), ArtifactError> {
        for m in &self.models {
            m.model.validate(dim).map_err(|e| match e {
                ModelShapeError::Width { expected, actual } => ArtifactError::ShapeMismatch {
                    model: m.name.clone(),
                    expected,
                    actual,
                },
                ModelShapeError::Invalid(reason) => ArtifactError::InvalidModel {
                    model: m.name.clone(),
                    reason,
                },
            })?;
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredModel> {
        self.models.iter()
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredModel> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn summary(&self) -> Vec<ModelSummary> {
        self.models
            .iter()
            .map(|m| ModelSummary {
                name: m.name.clone(),
                kind: m.model.kind(),
                reports_probability: m.output == Output::WithProbability,
            })
            .collect()
    }
}
