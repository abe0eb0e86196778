//! Fitted binary classifiers exported from the training pipeline.
//!
//! Every model scores a [`FeatureVector`] into a hard class (0 = not stressed,
//! 1 = stressed). Models that can also produce a positive-class probability
//! expose it through [`Model::positive_probability`].

use serde::Deserialize;

use crate::features::FeatureVector;

/// A fitted classifier, tagged by `kind` in the registry export.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Model {
    LogisticRegression(LinearModel),
    LinearSvc(LinearModel),
    MultinomialNb(NaiveBayes),
    DecisionTree(DecisionTree),
    RandomForest(RandomForest),
}

impl Model {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LogisticRegression(_) => "logistic_regression",
            Self::LinearSvc(_) => "linear_svc",
            Self::MultinomialNb(_) => "multinomial_nb",
            Self::DecisionTree(_) => "decision_tree",
            Self::RandomForest(_) => "random_forest",
        }
    }

    /// Whether this model can report a probability at all.
    pub fn supports_probability(&self) -> bool {
        !matches!(self, Self::LinearSvc(_))
    }

    /// Hard class prediction. Only meaningful once the model passed [`Model::validate`].
    pub(crate) fn predict(&self, x: &FeatureVector<'_>) -> usize {
        match self {
            Self::LogisticRegression(m) | Self::LinearSvc(m) => usize::from(m.decision(x) > 0.0),
            Self::MultinomialNb(m) => argmax(m.joint_log_likelihood(x)),
            Self::DecisionTree(t) => argmax(t.class_distribution(x)),
            Self::RandomForest(f) => argmax(f.class_distribution(x)),
        }
    }

    /// Probability of the positive class, if the model has one.
    pub(crate) fn positive_probability(&self, x: &FeatureVector<'_>) -> Option<f64> {
        match self {
            Self::LogisticRegression(m) => Some(sigmoid(m.decision(x))),
            Self::LinearSvc(_) => None,
            Self::MultinomialNb(m) => {
                let [neg, pos] = m.joint_log_likelihood(x);
                // Two-class softmax is the sigmoid of the log-odds.
                Some(sigmoid(pos - neg))
            }
            Self::DecisionTree(t) => Some(t.class_distribution(x)[1]),
            Self::RandomForest(f) => Some(f.class_distribution(x)[1]),
        }
    }

    /// Checks that do not depend on the feature width: array lengths,
    /// tree topology, non-empty ensembles.
    pub(crate) fn check_structure(&self) -> Result<(), String> {
        match self {
            Self::LogisticRegression(_) | Self::LinearSvc(_) => Ok(()),
            Self::MultinomialNb(m) => m.check_structure(),
            Self::DecisionTree(t) => t.check_structure(),
            Self::RandomForest(f) => f.check_structure(),
        }
    }

    /// Check the model against the pipeline's feature width.
    pub(crate) fn validate(&self, dim: usize) -> Result<(), ModelShapeError> {
        self.check_structure().map_err(ModelShapeError::Invalid)?;
        match self {
            Self::LogisticRegression(m) | Self::LinearSvc(m) => m.validate(dim),
            Self::MultinomialNb(m) => m.validate(dim),
            Self::DecisionTree(t) => t.validate(dim),
            Self::RandomForest(f) => f.validate(dim),
        }
    }
}

/// Why a model does not fit the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ModelShapeError {
    Width { expected: usize, actual: usize },
    Invalid(String),
}

// ── Linear models ──

/// Weight vector plus intercept: logistic regression or linear SVM.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearModel {
    pub coef: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl LinearModel {
    pub(crate) fn decision(&self, x: &FeatureVector<'_>) -> f64 {
        x.dot(&self.coef) + self.intercept
    }

    fn validate(&self, dim: usize) -> Result<(), ModelShapeError> {
        if self.coef.len() != dim {
            return Err(ModelShapeError::Width {
                expected: dim,
                actual: self.coef.len(),
            });
        }
        Ok(())
    }
}

// ── Naive Bayes ──

/// Multinomial naive Bayes with per-class log priors and feature log probabilities.
#[derive(Debug, Clone, Deserialize)]
pub struct NaiveBayes {
    pub class_log_prior: [f64; 2],
    pub feature_log_prob: [Vec<f64>; 2],
}

impl NaiveBayes {
    fn joint_log_likelihood(&self, x: &FeatureVector<'_>) -> [f64; 2] {
        [
            self.class_log_prior[0] + x.dot(&self.feature_log_prob[0]),
            self.class_log_prior[1] + x.dot(&self.feature_log_prob[1]),
        ]
    }

    fn check_structure(&self) -> Result<(), String> {
        let [neg, pos] = &self.feature_log_prob;
        if neg.len() != pos.len() {
            return Err(format!(
                "feature_log_prob rows have different lengths ({} and {})",
                neg.len(),
                pos.len()
            ));
        }
        Ok(())
    }

    fn validate(&self, dim: usize) -> Result<(), ModelShapeError> {
        for row in &self.feature_log_prob {
            if row.len() != dim {
                return Err(ModelShapeError::Width {
                    expected: dim,
                    actual: row.len(),
                });
            }
        }
        Ok(())
    }
}

// ── Trees ──

/// Leaf marker in `children_left` / `children_right`.
const LEAF: i64 = -1;

/// Binary decision tree in flattened array form.
///
/// Node `i` splits on `feature[i] <= threshold[i]` (left) versus `>` (right);
/// `value[i]` holds the class weights reaching that node.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<[f64; 2]>,
}

impl DecisionTree {
    /// Normalised class distribution at the leaf reached by `x`.
    pub(crate) fn class_distribution(&self, x: &FeatureVector<'_>) -> [f64; 2] {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            // Trees are fitted on f32 inputs; compare at that precision.
            let value = f64::from(x.get(self.feature[node] as usize) as f32);
            node = if value <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        let [a, b] = self.value[node];
        let total = a + b;
        if total > 0.0 {
            [a / total, b / total]
        } else {
            [1.0, 0.0]
        }
    }

    fn check_structure(&self) -> Result<(), String> {
        let n = self.children_left.len();
        if n == 0 {
            return Err("tree has no nodes".into());
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err("tree arrays have different lengths".into());
        }

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF {
                if right != LEAF {
                    return Err(format!("node {node} has a right child but no left child"));
                }
                continue;
            }
            // Children always come after their parent, so traversal terminates.
            for child in [left, right] {
                if child <= node as i64 || child as usize >= n {
                    return Err(format!("node {node} has invalid child {child}"));
                }
            }
            if self.feature[node] < 0 {
                return Err(format!(
                    "node {node} splits on negative feature {}",
                    self.feature[node]
                ));
            }
        }
        Ok(())
    }

    fn validate(&self, dim: usize) -> Result<(), ModelShapeError> {
        for node in 0..self.children_left.len() {
            if self.children_left[node] == LEAF {
                continue;
            }
            let feature = self.feature[node];
            if feature as usize >= dim {
                return Err(ModelShapeError::Invalid(format!(
                    "node {node} splits on feature {feature}, pipeline has {dim}"
                )));
            }
        }
        Ok(())
    }
}

/// Ensemble of decision trees; class distribution is the mean over trees.
#[derive(Debug, Clone, Deserialize)]
pub struct RandomForest {
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub(crate) fn class_distribution(&self, x: &FeatureVector<'_>) -> [f64; 2] {
        let mut sum = [0.0, 0.0];
        for tree in &self.trees {
            let [a, b] = tree.class_distribution(x);
            sum[0] += a;
            sum[1] += b;
        }
        let n = self.trees.len() as f64;
        [sum[0] / n, sum[1] / n]
    }

    fn check_structure(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".into());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.check_structure().map_err(|reason| format!("tree {i}: {reason}"))?;
        }
        Ok(())
    }

    fn validate(&self, dim: usize) -> Result<(), ModelShapeError> {
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(dim).map_err(|e| match e {
                ModelShapeError::Invalid(reason) => {
                    ModelShapeError::Invalid(format!("tree {i}: {reason}"))
                }
                other => other,
            })?;
        }
        Ok(())
    }
}

/// Index of the larger value; ties go to class 0.
fn argmax(values: [f64; 2]) -> usize {
    usize::from(values[1] > values[0])
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::SparseRow;

    // Two text columns followed by one numeric column.
    static NUMERIC: [f64; 1] = [0.5];

    fn x(text: &[(usize, f64)]) -> FeatureVector<'static> {
        FeatureVector::new(SparseRow::from_pairs(2, text.to_vec()), &NUMERIC)
    }

    fn stump(feature: i64, threshold: f64, left: [f64; 2], right: [f64; 2]) -> DecisionTree {
        DecisionTree {
            children_left: vec![1, LEAF, LEAF],
            children_right: vec![2, LEAF, LEAF],
            feature: vec![feature, -2, -2],
            threshold: vec![threshold, -2.0, -2.0],
            value: vec![[0.0, 0.0], left, right],
        }
    }

    #[test]
    fn logistic_regression_label_and_probability() {
        let model = Model::LogisticRegression(LinearModel {
            coef: vec![2.0, -1.0, 0.0],
            intercept: -1.0,
        });
        let stressed = x(&[(0, 1.0)]);
        assert_eq!(model.predict(&stressed), 1);
        let p = model.positive_probability(&stressed).unwrap();
        assert!((p - sigmoid(1.0)).abs() < 1e-12);

        let calm = x(&[(1, 1.0)]);
        assert_eq!(model.predict(&calm), 0);
        assert!(model.positive_probability(&calm).unwrap() < 0.5);
    }

    #[test]
    fn linear_svc_is_label_only() {
        let model = Model::LinearSvc(LinearModel {
            coef: vec![0.0, 0.0, 4.0],
            intercept: -1.0,
        });
        // 0.5 * 4 - 1 = 1 > 0
        assert_eq!(model.predict(&x(&[])), 1);
        assert!(model.positive_probability(&x(&[])).is_none());
        assert!(!model.supports_probability());
    }

    #[test]
    fn naive_bayes_prefers_higher_likelihood() {
        let model = Model::MultinomialNb(NaiveBayes {
            class_log_prior: [0.5f64.ln(), 0.5f64.ln()],
            feature_log_prob: [vec![-0.5, -2.0, -1.0], vec![-2.0, -0.5, -1.0]],
        });
        assert_eq!(model.predict(&x(&[(1, 1.0)])), 1);
        assert_eq!(model.predict(&x(&[(0, 1.0)])), 0);

        let p = model.positive_probability(&x(&[(1, 1.0)])).unwrap();
        // log-odds = (-0.5) - (-2.0) = 1.5
        assert!((p - sigmoid(1.5)).abs() < 1e-12);
    }

    #[test]
    fn tree_routes_on_threshold() {
        let model = Model::DecisionTree(stump(0, 0.5, [8.0, 2.0], [1.0, 3.0]));
        assert_eq!(model.predict(&x(&[(0, 0.5)])), 0);
        assert_eq!(model.predict(&x(&[(0, 0.51)])), 1);
        assert_eq!(model.positive_probability(&x(&[(0, 0.9)])), Some(0.75));
    }

    #[test]
    fn tree_compares_at_single_precision() {
        let threshold = f64::from(0.3f32);
        let model = Model::DecisionTree(stump(0, threshold, [1.0, 0.0], [0.0, 1.0]));
        // Above the threshold in f64, equal to it once narrowed to f32.
        let value = 0.300000012;
        assert!(value > threshold);
        assert_eq!(model.predict(&x(&[(0, value)])), 0);
        assert_eq!(model.predict(&x(&[(0, 0.31)])), 1);
    }

    #[test]
    fn tree_can_split_on_numeric_block() {
        let model = Model::DecisionTree(stump(2, 0.4, [1.0, 0.0], [0.0, 1.0]));
        // Numeric column is 0.5 > 0.4 for every input.
        assert_eq!(model.predict(&x(&[])), 1);
    }

    #[test]
    fn forest_averages_tree_distributions() {
        let model = Model::RandomForest(RandomForest {
            trees: vec![
                stump(0, 0.5, [1.0, 0.0], [0.0, 1.0]),
                stump(1, 0.5, [1.0, 0.0], [0.0, 1.0]),
                stump(1, 0.5, [1.0, 0.0], [0.0, 1.0]),
            ],
        });
        let input = x(&[(0, 1.0)]);
        let p = model.positive_probability(&input).unwrap();
        assert!((p - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(model.predict(&input), 0);
    }

    #[test]
    fn validate_linear_width() {
        let model = Model::LogisticRegression(LinearModel {
            coef: vec![1.0; 2],
            intercept: 0.0,
        });
        assert_eq!(
            model.validate(3),
            Err(ModelShapeError::Width {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn validate_tree_feature_out_of_range() {
        let model = Model::DecisionTree(stump(7, 0.0, [1.0, 0.0], [0.0, 1.0]));
        assert!(matches!(model.validate(3), Err(ModelShapeError::Invalid(_))));
    }

    #[test]
    fn validate_tree_rejects_backward_child() {
        let mut tree = stump(0, 0.0, [1.0, 0.0], [0.0, 1.0]);
        tree.children_left[0] = 0;
        assert!(matches!(
            Model::DecisionTree(tree).validate(3),
            Err(ModelShapeError::Invalid(_))
        ));
    }

    #[test]
    fn structure_rejects_self_referencing_node() {
        let mut tree = stump(0, 0.0, [1.0, 0.0], [0.0, 1.0]);
        tree.children_left[0] = 0;
        tree.children_right[0] = 0;
        assert!(Model::DecisionTree(tree).check_structure().is_err());
    }

    #[test]
    fn structure_rejects_child_out_of_range() {
        let mut tree = stump(0, 0.0, [1.0, 0.0], [0.0, 1.0]);
        tree.children_left[0] = 5;
        assert!(Model::DecisionTree(tree).check_structure().is_err());
    }

    #[test]
    fn structure_rejects_empty_forest() {
        let err = Model::RandomForest(RandomForest { trees: vec![] })
            .check_structure()
            .unwrap_err();
        assert_eq!(err, "forest has no trees");
    }

    #[test]
    fn structure_rejects_ragged_naive_bayes() {
        let model = Model::MultinomialNb(NaiveBayes {
            class_log_prior: [0.0, 0.0],
            feature_log_prob: [vec![0.0; 3], vec![0.0; 2]],
        });
        assert!(model.check_structure().is_err());
    }

    #[test]
    fn structure_ignores_feature_width() {
        // Feature 7 is only out of range once the pipeline width is known.
        let model = Model::DecisionTree(stump(7, 0.0, [1.0, 0.0], [0.0, 1.0]));
        assert!(model.check_structure().is_ok());
        assert!(model.validate(3).is_err());
    }

    #[test]
    fn deserialize_tagged_kinds() {
        let model: Model = serde_json::from_str(
            r#"{"kind": "linear_svc", "coef": [1.0, 2.0, 3.0], "intercept": 0.5}"#,
        )
        .unwrap();
        assert_eq!(model.kind(), "linear_svc");

        let model: Model = serde_json::from_str(
            r#"{"kind": "random_forest", "trees": [{
                "children_left": [-1], "children_right": [-1],
                "feature": [-2], "threshold": [-2.0], "value": [[3.0, 1.0]]
            }]}"#,
        )
        .unwrap();
        assert_eq!(model.kind(), "random_forest");
        assert_eq!(model.positive_probability(&x(&[])), Some(0.25));
    }
}
