//! Small hand-built artifacts shared by the unit tests.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde_json::json;
use stresslens_core::ArtifactPaths;

pub const VOCAB: [&str; 7] = [
    "exhausted",
    "overwhelmed",
    "stressed",
    "happy",
    "relaxed",
    "deadline",
    "no time",
];

pub const NUMERIC_COLUMNS: [&str; 2] = ["word_count_scaled", "sentiment_scaled"];

/// Vocabulary plus numeric columns.
pub const DIM: usize = VOCAB.len() + NUMERIC_COLUMNS.len();

/// Training matrix whose column means are `[0.5, -0.25]`.
pub fn numeric_matrix() -> Vec<(&'static str, Vec<f64>)> {
    vec![
        (NUMERIC_COLUMNS[0], vec![0.25, 0.75]),
        (NUMERIC_COLUMNS[1], vec![-0.5, 0.0]),
    ]
}

pub fn numeric_means() -> Vec<f64> {
    vec![0.5, -0.25]
}

pub fn vectorizer_json() -> String {
    let vocabulary: serde_json::Map<String, serde_json::Value> = VOCAB
        .iter()
        .enumerate()
        .map(|(i, term)| (term.to_string(), json!(i)))
        .collect();
    json!({
        "vocabulary": vocabulary,
        "idf": [1.5, 1.5, 1.2, 1.3, 1.4, 1.1, 2.0],
        "ngram_range": [1, 2],
        "sublinear_tf": false,
        "norm": "l2"
    })
    .to_string()
}

fn stump(feature: usize, left: [f64; 2], right: [f64; 2]) -> serde_json::Value {
    json!({
        "children_left": [1, -1, -1],
        "children_right": [2, -1, -1],
        "feature": [feature, -2, -2],
        "threshold": [0.0, -2.0, -2.0],
        "value": [[0.0, 0.0], left, right]
    })
}

pub fn registry_json() -> String {
    json!({
        "models": [
            {
                "name": "Logistic Regression",
                "kind": "logistic_regression",
                "probability": true,
                "coef": [1.5, 1.5, 2.0, -2.0, -2.0, 1.0, 1.0, 0.1, 0.1],
                "intercept": -0.5
            },
            {
                "name": "Linear SVM",
                "kind": "linear_svc",
                "coef": [1.0, 1.0, 1.5, -1.5, -1.5, 0.5, 0.5, 0.0, 0.0],
                "intercept": -0.1
            },
            {
                "name": "Naive Bayes",
                "kind": "multinomial_nb",
                "class_log_prior": [0.5f64.ln(), 0.5f64.ln()],
                "feature_log_prob": [
                    [-3.0, -3.0, -3.0, -1.0, -1.0, -2.5, -2.5, -2.0, -2.0],
                    [-1.0, -1.0, -1.0, -3.0, -3.0, -1.5, -1.5, -2.0, -2.0]
                ]
            },
            {
                "name": "Random Forest",
                "kind": "random_forest",
                "trees": [
                    stump(0, [5.0, 1.0], [1.0, 5.0]),
                    stump(2, [4.0, 2.0], [0.0, 6.0])
                ]
            }
        ]
    })
    .to_string()
}

/// Write one Float64 column per entry to a Parquet file.
pub fn write_numeric_parquet(path: &Path, columns: &[(&str, Vec<f64>)]) {
    let fields: Vec<Field> = columns
        .iter()
        .map(|(name, _)| Field::new(*name, DataType::Float64, true))
        .collect();
    let arrays: Vec<ArrayRef> = columns
        .iter()
        .map(|(_, values)| Arc::new(Float64Array::from(values.clone())) as ArrayRef)
        .collect();
    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).unwrap();

    let file = std::fs::File::create(path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
}

/// Write all three artifacts under their default names in `dir`.
pub fn write_artifacts(dir: &Path) -> ArtifactPaths {
    let paths = ArtifactPaths::in_dir(dir);
    std::fs::write(&paths.vectorizer, vectorizer_json()).unwrap();
    std::fs::write(&paths.models, registry_json()).unwrap();
    write_numeric_parquet(&paths.numeric, &numeric_matrix());
    paths
}
