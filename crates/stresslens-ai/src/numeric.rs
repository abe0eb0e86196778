//! Numeric feature block.
//!
//! The scaled numeric training matrix is reduced to its column-wise mean once
//! at load. That mean is appended to every feature vector, whatever the input
//! text, so the numeric block is constant for the lifetime of the pipeline.

use std::path::Path;

use arrow::array::{Array, Float64Array};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use tracing::{debug, info};

use crate::ArtifactError;

/// Column-wise mean of the numeric training matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericBlock {
    columns: Vec<String>,
    means: Vec<f64>,
    rows: usize,
}

impl NumericBlock {
    /// Read the numeric matrix from a Parquet file and reduce it to column means.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        if !path.exists() {
            return Err(ArtifactError::NotFound(path.to_path_buf()));
        }
        let batches = read_parquet(path)?;
        let block = Self::from_batches(&batches)?;
        info!(
            columns = block.width(),
            rows = block.rows,
            path = %path.display(),
            "loaded numeric matrix"
        );
        Ok(block)
    }

    /// Reduce Arrow batches to column means.
    ///
    /// Every column must be numeric; nulls are skipped. An empty batch list
    /// or a schema without columns is an error.
    pub fn from_batches(batches: &[RecordBatch]) -> Result<Self, ArtifactError> {
        let schema = batches
            .first()
            .map(|b| b.schema())
            .ok_or(ArtifactError::EmptyMatrix)?;
        if schema.fields().is_empty() {
            return Err(ArtifactError::EmptyMatrix);
        }

        let columns: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();
        for field in schema.fields() {
            if !field.data_type().is_numeric() {
                return Err(ArtifactError::NonNumericColumn(field.name().clone()));
            }
        }

        // Accumulate (sum, non-null count) per column across batches.
        let mut accum = vec![(0.0f64, 0usize); columns.len()];
        let mut rows = 0usize;
        for batch in batches {
            rows += batch.num_rows();
            for (col_idx, (sum, count)) in accum.iter_mut().enumerate() {
                let values = cast(batch.column(col_idx).as_ref(), &DataType::Float64)?;
                let values = values
                    .as_any()
                    .downcast_ref::<Float64Array>()
                    .ok_or_else(|| ArtifactError::NonNumericColumn(columns[col_idx].clone()))?;
                for v in values.iter().flatten() {
                    *sum += v;
                    *count += 1;
                }
            }
        }

        let mut means = Vec::with_capacity(columns.len());
        for (name, (sum, count)) in columns.iter().zip(accum) {
            if count == 0 {
                return Err(ArtifactError::EmptyColumn(name.clone()));
            }
            means.push(sum / count as f64);
        }
        debug!(?means, "numeric block means");

        Ok(Self {
            columns,
            means,
            rows,
        })
    }

    /// Build directly from precomputed means.
    pub fn from_means(columns: Vec<String>, means: Vec<f64>) -> Self {
        assert_eq!(columns.len(), means.len(), "one mean per column");
        Self {
            columns,
            means,
            rows: 0,
        }
    }

    /// Number of numeric feature columns.
    pub fn width(&self) -> usize {
        self.means.len()
    }

    /// Rows in the source matrix (0 when built from means).
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.means
    }
}

/// Read a Parquet file into Arrow RecordBatches.
fn read_parquet(path: &Path) -> Result<Vec<RecordBatch>, ArtifactError> {
    let file = std::fs::File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    let batches: Result<Vec<RecordBatch>, _> = reader.collect();
    Ok(batches?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use arrow::array::{ArrayRef, Float32Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use std::sync::Arc;

    fn col(name: &str, array: impl Array + 'static) -> (&str, ArrayRef) {
        (name, Arc::new(array))
    }

    fn batch(cols: Vec<(&str, ArrayRef)>) -> RecordBatch {
        let fields: Vec<Field> = cols
            .iter()
            .map(|(name, arr)| Field::new(*name, arr.data_type().clone(), true))
            .collect();
        RecordBatch::try_new(
            Arc::new(Schema::new(fields)),
            cols.into_iter().map(|(_, a)| a).collect(),
        )
        .unwrap()
    }

    #[test]
    fn column_means() {
        let b = batch(vec![
            col("word_count", Float64Array::from(vec![1.0, 2.0, 3.0])),
            col("exclaims", Int64Array::from(vec![0, 0, 6])),
        ]);
        let block = NumericBlock::from_batches(&[b]).unwrap();
        assert_eq!(block.width(), 2);
        assert_eq!(block.rows(), 3);
        assert_eq!(block.values(), &[2.0, 2.0]);
        assert_eq!(block.columns(), &["word_count", "exclaims"]);
    }

    #[test]
    fn means_span_batches_and_skip_nulls() {
        let b1 = batch(vec![col("x", Float32Array::from(vec![Some(1.0), None]))]);
        let b2 = batch(vec![col("x", Float32Array::from(vec![Some(5.0)]))]);
        let block = NumericBlock::from_batches(&[b1, b2]).unwrap();
        assert_eq!(block.values(), &[3.0]);
        assert_eq!(block.rows(), 3);
    }

    #[test]
    fn rejects_text_column() {
        let b = batch(vec![col("label", StringArray::from(vec!["a"]))]);
        let err = NumericBlock::from_batches(&[b]).unwrap_err();
        assert!(matches!(err, ArtifactError::NonNumericColumn(name) if name == "label"));
    }

    #[test]
    fn rejects_all_null_column() {
        let b = batch(vec![col("x", Float64Array::from(vec![None::<f64>, None]))]);
        let err = NumericBlock::from_batches(&[b]).unwrap_err();
        assert!(matches!(err, ArtifactError::EmptyColumn(_)));
    }

    #[test]
    fn rejects_no_batches() {
        let err = NumericBlock::from_batches(&[]).unwrap_err();
        assert!(matches!(err, ArtifactError::EmptyMatrix));
    }

    #[test]
    fn load_from_parquet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("numeric.parquet");
        fixtures::write_numeric_parquet(&path, &[("a", vec![1.0, 3.0]), ("b", vec![-2.0, 0.0])]);

        let block = NumericBlock::load(&path).unwrap();
        assert_eq!(block.values(), &[2.0, -1.0]);
    }

    #[test]
    fn load_missing_file() {
        let err = NumericBlock::load(Path::new("/nonexistent/num.parquet")).unwrap_err();
        assert!(matches!(err, ArtifactError::NotFound(_)));
    }
}
