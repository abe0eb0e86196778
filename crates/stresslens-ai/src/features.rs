//! Feature vectors: a sparse text block followed by a dense numeric block.

/// Sparse row vector with strictly increasing column indices.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseRow {
    dim: usize,
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseRow {
    /// All-zero row of width `dim`.
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Build from `(index, value)` pairs. Pairs are sorted; zero values are dropped.
    ///
    /// Panics if an index is out of range or repeated.
    pub fn from_pairs(dim: usize, mut pairs: Vec<(usize, f64)>) -> Self {
        pairs.sort_by_key(|&(i, _)| i);
        let mut indices = Vec::with_capacity(pairs.len());
        let mut values = Vec::with_capacity(pairs.len());
        for (i, v) in pairs {
            assert!(i < dim, "column {i} out of range for width {dim}");
            assert!(
                indices.last().is_none_or(|&last| last < i),
                "duplicate column {i}"
            );
            if v != 0.0 {
                indices.push(i);
                values.push(v);
            }
        }
        Self {
            dim,
            indices,
            values,
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn get(&self, index: usize) -> f64 {
        match self.indices.binary_search(&index) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    /// Non-zero entries in column order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Dense copy of the row.
    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dim];
        for (i, v) in self.iter() {
            dense[i] = v;
        }
        dense
    }
}

/// One assembled input row: vectorizer output followed by the numeric block.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector<'a> {
    text: SparseRow,
    numeric: &'a [f64],
}

impl<'a> FeatureVector<'a> {
    pub fn new(text: SparseRow, numeric: &'a [f64]) -> Self {
        Self { text, numeric }
    }

    /// Total column count: text width + numeric width.
    pub fn len(&self) -> usize {
        self.text.dim() + self.numeric.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn text_block(&self) -> &SparseRow {
        &self.text
    }

    pub fn numeric_block(&self) -> &[f64] {
        self.numeric
    }

    /// Value at column `index`; zero past the end.
    pub fn get(&self, index: usize) -> f64 {
        let text_dim = self.text.dim();
        if index < text_dim {
            self.text.get(index)
        } else {
            self.numeric.get(index - text_dim).copied().unwrap_or(0.0)
        }
    }

    /// Dot product with a dense weight vector of the same width.
    pub fn dot(&self, weights: &[f64]) -> f64 {
        debug_assert_eq!(weights.len(), self.len());
        let (text_weights, numeric_weights) = weights.split_at(self.text.dim());
        let text: f64 = self.text.iter().map(|(i, v)| v * text_weights[i]).sum();
        let numeric: f64 = self
            .numeric
            .iter()
            .zip(numeric_weights)
            .map(|(x, w)| x * w)
            .sum();
        text + numeric
    }
}
