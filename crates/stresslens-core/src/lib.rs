pub mod artifacts;
pub mod prediction;
pub mod text;

pub use artifacts::ArtifactPaths;
pub use prediction::{Label, Prediction, PredictionSet};
pub use text::{is_blank, normalize};
