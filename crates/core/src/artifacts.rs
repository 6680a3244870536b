//! Serialized prediction pairs.
//!
//! A disease's prediction pair is two JSON files produced by the training pipeline: a
//! preprocessor (an ordered list of element-wise steps) and a binary classifier. Both are
//! validated against the disease profile when loaded, so at prediction time the only failures
//! left are data-dependent ones (non-finite values) which surface as [`PredictionError`].
//!
//! Preprocessor:
//!
//! ```json
//! {"feature_names": ["Glucose", "BMI"],
//!  "steps": [{"type": "simple_imputer", "fill": [120.0, 32.0]},
//!            {"type": "standard_scaler", "mean": [120.0, 32.0], "scale": [30.0, 7.0]},
//!            {"type": "min_max_scaler", "min": [0.5, 0.5], "scale": [0.1, 0.1]}]}
//! ```
//!
//! Model, one of:
//!
//! ```json
//! {"type": "logistic_regression", "coefficients": [0.8, 0.4], "intercept": -0.2, "threshold": 0.5}
//! {"type": "decision_tree", "nodes": [{"feature": 0, "threshold": 0.5, "left": 1, "right": 2},
//!                                      {"leaf": 0}, {"leaf": 1}]}
//! {"type": "random_forest", "trees": [[{"leaf": 1}], [{"leaf": 0}], [{"leaf": 1}]]}
//! ```

use crate::constants::DEFAULT_DECISION_THRESHOLD;
use crate::error::ArtifactLoadError;
use crate::profile::DiseaseProfile;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

/// Failure while transforming or classifying one row.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PredictionError {
    #[error("expected {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
    #[error("non-finite value after {stage} for feature {index}")]
    NonFinite { stage: &'static str, index: usize },
    #[error("model output is not finite")]
    NonFiniteScore,
    #[error("decision tree references missing node or feature {0}")]
    InvalidTree(usize),
}

/// Raw numeric row → model input.
pub trait Transform: Send + Sync {
    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, PredictionError>;
}

/// Model input → binary class.
pub trait Classify: Send + Sync {
    fn predict(&self, x: &[f64]) -> Result<u8, PredictionError>;
}

/// A fitted preprocessor and classifier, loaded once and shared read-only.
pub struct PredictionPair {
    preprocessor: Box<dyn Transform>,
    model: Box<dyn Classify>,
}

impl std::fmt::Debug for PredictionPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionPair").finish_non_exhaustive()
    }
}

impl PredictionPair {
    pub fn new(preprocessor: Box<dyn Transform>, model: Box<dyn Classify>) -> Self {
        Self {
            preprocessor,
            model,
        }
    }

    /// Loads and validates both artifacts of `profile`.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactLoadError`] if either file is missing or unparsable, its dimensions do
    /// not match the profile, or it declares feature names different from the profile's.
    pub fn load(profile: &DiseaseProfile) -> Result<Self, ArtifactLoadError> {
        let preprocessor: Preprocessor = read_json(&profile.preprocessor_artifact)?;
        preprocessor.validate(&profile.preprocessor_artifact, &profile.feature_names)?;

        let model: ModelArtifact = read_json(&profile.model_artifact)?;
        model.validate(&profile.model_artifact, &profile.feature_names)?;

        Ok(Self::new(Box::new(preprocessor), Box::new(model)))
    }

    /// Transform then classify one row.
    pub fn predict_row(&self, row: &[f64]) -> Result<u8, PredictionError> {
        let x = self.preprocessor.transform(row)?;
        self.model.predict(&x)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactLoadError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ArtifactLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ArtifactLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn invalid(path: &Path, reason: impl Into<String>) -> ArtifactLoadError {
    ArtifactLoadError::Invalid {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

fn check_feature_names(
    path: &Path,
    declared: &[String],
    expected: &[String],
) -> Result<(), ArtifactLoadError> {
    if declared != expected {
        return Err(ArtifactLoadError::FeatureMismatch {
            path: path.to_path_buf(),
            expected: expected.to_vec(),
            found: declared.to_vec(),
        });
    }
    Ok(())
}

fn check_len(path: &Path, what: &str, actual: usize, expected: usize) -> Result<(), ArtifactLoadError> {
    if actual != expected {
        return Err(invalid(
            path,
            format!("{what} has {actual} values, expected {expected}"),
        ));
    }
    Ok(())
}

fn check_finite(path: &Path, what: &str, values: &[f64]) -> Result<(), ArtifactLoadError> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(invalid(path, format!("{what} contains non-finite values")));
    }
    Ok(())
}

// ============================================================================
// PREPROCESSOR
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Preprocessor {
    feature_names: Vec<String>,
    #[serde(default)]
    steps: Vec<PreprocessStep>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum PreprocessStep {
    /// Replaces NaN inputs with the fitted fill value.
    SimpleImputer { fill: Vec<f64> },
    /// `(x - mean) / scale`; a zero scale leaves the centred value unscaled.
    StandardScaler { mean: Vec<f64>, scale: Vec<f64> },
    /// `x * scale + min`.
    MinMaxScaler { min: Vec<f64>, scale: Vec<f64> },
}

impl PreprocessStep {
    fn name(&self) -> &'static str {
        match self {
            Self::SimpleImputer { .. } => "simple_imputer",
            Self::StandardScaler { .. } => "standard_scaler",
            Self::MinMaxScaler { .. } => "min_max_scaler",
        }
    }

    fn vectors(&self) -> [(&'static str, &[f64]); 2] {
        match self {
            Self::SimpleImputer { fill } => [("fill", fill.as_slice()), ("fill", fill.as_slice())],
            Self::StandardScaler { mean, scale } => {
                [("mean", mean.as_slice()), ("scale", scale.as_slice())]
            }
            Self::MinMaxScaler { min, scale } => [("min", min.as_slice()), ("scale", scale.as_slice())],
        }
    }

    fn apply(&self, x: &mut [f64]) {
        match self {
            Self::SimpleImputer { fill } => {
                for (v, f) in x.iter_mut().zip(fill) {
                    if v.is_nan() {
                        *v = *f;
                    }
                }
            }
            Self::StandardScaler { mean, scale } => {
                for ((v, m), s) in x.iter_mut().zip(mean).zip(scale) {
                    let s = if *s == 0.0 { 1.0 } else { *s };
                    *v = (*v - m) / s;
                }
            }
            Self::MinMaxScaler { min, scale } => {
                for ((v, m), s) in x.iter_mut().zip(min).zip(scale) {
                    *v = *v * s + m;
                }
            }
        }
    }
}

impl Preprocessor {
    fn validate(&self, path: &Path, expected: &[String]) -> Result<(), ArtifactLoadError> {
        check_feature_names(path, &self.feature_names, expected)?;
        let n = expected.len();
        for step in &self.steps {
            for (what, values) in step.vectors() {
                let label = format!("{}.{}", step.name(), what);
                check_len(path, &label, values.len(), n)?;
                check_finite(path, &label, values)?;
            }
        }
        Ok(())
    }
}

impl Transform for Preprocessor {
    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, PredictionError> {
        if row.len() != self.feature_names.len() {
            return Err(PredictionError::ShapeMismatch {
                expected: self.feature_names.len(),
                actual: row.len(),
            });
        }

        let mut x = row.to_vec();
        for step in &self.steps {
            step.apply(&mut x);
            if let Some(index) = x.iter().position(|v| !v.is_finite()) {
                return Err(PredictionError::NonFinite {
                    stage: step.name(),
                    index,
                });
            }
        }

        // no steps, or only non-imputing steps before a NaN slipped through
        if let Some(index) = x.iter().position(|v| !v.is_finite()) {
            return Err(PredictionError::NonFinite {
                stage: "input",
                index,
            });
        }

        Ok(x)
    }
}

// ============================================================================
// MODEL
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Leaf {
        leaf: u8,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

fn default_threshold() -> f64 {
    DEFAULT_DECISION_THRESHOLD
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum ModelArtifact {
    LogisticRegression {
        coefficients: Vec<f64>,
        intercept: f64,
        #[serde(default = "default_threshold")]
        threshold: f64,
        #[serde(default)]
        feature_names: Option<Vec<String>>,
    },
    DecisionTree {
        nodes: Vec<TreeNode>,
        #[serde(default)]
        feature_names: Option<Vec<String>>,
    },
    RandomForest {
        trees: Vec<Vec<TreeNode>>,
        #[serde(default)]
        feature_names: Option<Vec<String>>,
    },
}

impl ModelArtifact {
    fn declared_feature_names(&self) -> Option<&[String]> {
        match self {
            Self::LogisticRegression { feature_names, .. }
            | Self::DecisionTree { feature_names, .. }
            | Self::RandomForest { feature_names, .. } => feature_names.as_deref(),
        }
    }

    fn validate(&self, path: &Path, expected: &[String]) -> Result<(), ArtifactLoadError> {
        if let Some(declared) = self.declared_feature_names() {
            check_feature_names(path, declared, expected)?;
        }
        let n = expected.len();

        match self {
            Self::LogisticRegression {
                coefficients,
                intercept,
                threshold,
                ..
            } => {
                check_len(path, "coefficients", coefficients.len(), n)?;
                check_finite(path, "coefficients", coefficients)?;
                check_finite(path, "intercept", std::slice::from_ref(intercept))?;
                if !(threshold.is_finite() && (0.0..=1.0).contains(threshold)) {
                    return Err(invalid(path, "threshold must be within [0, 1]"));
                }
            }
            Self::DecisionTree { nodes, .. } => validate_tree(path, nodes, n)?,
            Self::RandomForest { trees, .. } => {
                if trees.is_empty() {
                    return Err(invalid(path, "random forest has no trees"));
                }
                for tree in trees {
                    validate_tree(path, tree, n)?;
                }
            }
        }
        Ok(())
    }
}

/// Children must come after their parent, which also rules out cycles.
fn validate_tree(path: &Path, nodes: &[TreeNode], n_features: usize) -> Result<(), ArtifactLoadError> {
    if nodes.is_empty() {
        return Err(invalid(path, "decision tree has no nodes"));
    }
    for (i, node) in nodes.iter().enumerate() {
        match node {
            TreeNode::Leaf { leaf } => {
                if *leaf > 1 {
                    return Err(invalid(path, format!("node {i}: leaf class must be 0 or 1")));
                }
            }
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if *feature >= n_features {
                    return Err(invalid(path, format!("node {i}: feature index out of range")));
                }
                if !threshold.is_finite() {
                    return Err(invalid(path, format!("node {i}: threshold is not finite")));
                }
                for child in [left, right] {
                    if *child <= i || *child >= nodes.len() {
                        return Err(invalid(path, format!("node {i}: invalid child index {child}")));
                    }
                }
            }
        }
    }
    Ok(())
}

/// Each step must move to a later node, so the walk always terminates.
fn walk_tree(nodes: &[TreeNode], x: &[f64]) -> Result<u8, PredictionError> {
    let mut i = 0;
    loop {
        match nodes.get(i).ok_or(PredictionError::InvalidTree(i))? {
            TreeNode::Leaf { leaf } => return Ok(*leaf),
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                let value = x.get(*feature).ok_or(PredictionError::InvalidTree(*feature))?;
                let next = if *value <= *threshold { *left } else { *right };
                if next <= i {
                    return Err(PredictionError::InvalidTree(next));
                }
                i = next;
            }
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl Classify for ModelArtifact {
    fn predict(&self, x: &[f64]) -> Result<u8, PredictionError> {
        match self {
            Self::LogisticRegression {
                coefficients,
                intercept,
                threshold,
                ..
            } => {
                if x.len() != coefficients.len() {
                    return Err(PredictionError::ShapeMismatch {
                        expected: coefficients.len(),
                        actual: x.len(),
                    });
                }
                let z: f64 = coefficients.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + intercept;
                if !z.is_finite() {
                    return Err(PredictionError::NonFiniteScore);
                }
                Ok(u8::from(sigmoid(z) >= *threshold))
            }
            Self::DecisionTree { nodes, .. } => walk_tree(nodes, x),
            Self::RandomForest { trees, .. } => {
                let mut positive = 0;
                for tree in trees {
                    if walk_tree(tree, x)? == 1 {
                        positive += 1;
                    }
                }
                Ok(u8::from(positive * 2 >= trees.len()))
            }
        }
    }
}
