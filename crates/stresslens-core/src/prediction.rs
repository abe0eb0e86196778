//! Per-model prediction results and the ordered result set returned by the pipeline.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Binary stress label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "Stressed")]
    Stressed,
    #[serde(rename = "Not Stressed")]
    NotStressed,
}

impl Label {
    /// Map a hard class index (1 = positive class) to a label.
    pub fn from_class(class: usize) -> Self {
        if class == 1 {
            Self::Stressed
        } else {
            Self::NotStressed
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stressed => "Stressed",
            Self::NotStressed => "Not Stressed",
        }
    }

    pub fn is_stressed(&self) -> bool {
        matches!(self, Self::Stressed)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result reported by a single model.
///
/// `probability` and `confidence` are either both present or both absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(rename = "Prediction")]
    pub label: Label,
    /// Positive-class probability, rounded to 3 decimals.
    #[serde(rename = "Probability")]
    pub probability: Option<f64>,
    /// `max(p, 1 - p)` as a percentage, rounded to 1 decimal.
    #[serde(rename = "Confidence")]
    pub confidence: Option<f64>,
}

impl Prediction {
    /// A prediction from a model that only reports a hard label.
    pub fn label_only(label: Label) -> Self {
        Self {
            label,
            probability: None,
            confidence: None,
        }
    }

    /// A prediction carrying the raw positive-class probability `p`.
    ///
    /// Confidence is derived from the unrounded probability.
    pub fn with_probability(label: Label, p: f64) -> Self {
        let p = p.clamp(0.0, 1.0);
        Self {
            label,
            probability: Some(round_to(p, 3)),
            confidence: Some(round_to(p.max(1.0 - p) * 100.0, 1)),
        }
    }
}

/// Round to `decimals` places, ties to even.
fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}

/// Predictions keyed by model name, in registry order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionSet {
    entries: Vec<(String, Prediction)>,
}

impl PredictionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            entries: Vec::with_capacity(n),
        }
    }

    /// Append a model's prediction. Registry names are unique, so no dedup here.
    pub fn push(&mut self, name: impl Into<String>, prediction: Prediction) {
        self.entries.push((name.into(), prediction));
    }

    pub fn get(&self, name: &str) -> Option<&Prediction> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Prediction)> {
        self.entries.iter().map(|(n, p)| (n.as_str(), p))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of models that labelled the text as stressed.
    pub fn stressed_votes(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, p)| p.label.is_stressed())
            .count()
    }
}

impl Serialize for PredictionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, prediction) in &self.entries {
            map.serialize_entry(name, prediction)?;
        }
        map.end()
    }
}
