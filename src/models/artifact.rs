//! Trend-regression model artifacts.
//!
//! Training happens elsewhere; this module only loads a ready model and invokes it
//! over `{Month, Time}` feature rows.
//!
//! Artifact JSON schema:
//!
//! ```text
//! {"kind": "forest", "trees": [{"nodes": [
//!     {"feature": "Time", "threshold": 23.5, "left": 1, "right": 2},
//!     {"value": 5.0},
//!     {"value": 9.0}
//! ]}]}
//!
//! {"kind": "linear", "intercept": 0.0, "month": 0.0, "time": 0.5}
//! ```
//!
//! Trees use node arrays in pre-order: node 0 is the root, a sample goes `left` when
//! `x <= threshold`, and child indices always point forward. The forest predicts the
//! mean of its trees.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::FeatureRow;
use crate::error::ForecastError;

/// A trained regressor over `{Month, Time}` feature rows.
pub trait RegressionModel {
    /// One prediction per row, in row order.
    fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, ForecastError>;
}

/// Where a trained model comes from.
pub trait ModelSource {
    /// Human-readable location for error messages.
    fn location(&self) -> String;

    /// Load a ready model. Absence is an expected runtime condition.
    fn load(&self) -> Result<Box<dyn RegressionModel>, ForecastError>;
}

/// Which input column a split tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Feature {
    Month,
    Time,
}

impl Feature {
    fn value(self, row: &FeatureRow) -> f64 {
        match self {
            Feature::Month => row.month as f64,
            Feature::Time => row.time_index as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: Feature,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    threshold, left, right, ..
                } => {
                    if !threshold.is_finite() {
                        return Err(format!("node {idx}: non-finite threshold"));
                    }
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(format!("node {idx}: child index {child} out of order or range"));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("node {idx}: non-finite leaf value"));
                    }
                }
            }
        }
        Ok(())
    }

    fn predict_row(&self, row: &FeatureRow) -> Result<f64, ForecastError> {
        let mut idx = 0;
        // Children always point forward, so this walk terminates.
        loop {
            let node = self
                .nodes
                .get(idx)
                .ok_or_else(|| ForecastError::InvalidOutput(format!("tree node {idx} out of range")))?;
            match node {
                TreeNode::Leaf { value } => return Ok(*value),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if feature.value(row) <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

/// Mean of decision trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub trees: Vec<DecisionTree>,
}

impl RegressionModel for TreeEnsemble {
    fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, ForecastError> {
        let n_trees = self.trees.len() as f64;
        rows.iter()
            .map(|row| {
                let mut sum = 0.0;
                for tree in &self.trees {
                    sum += tree.predict_row(row)?;
                }
                Ok(sum / n_trees)
            })
            .collect()
    }
}

/// Linear model over `{Month, Time}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearTrend {
    pub intercept: f64,
    pub month: f64,
    pub time: f64,
}

impl RegressionModel for LinearTrend {
    fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, ForecastError> {
        Ok(rows
            .iter()
            .map(|r| self.intercept + self.month * r.month as f64 + self.time * r.time_index as f64)
            .collect())
    }
}

/// Serialized artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ModelArtifact {
    Forest(TreeEnsemble),
    Linear(LinearTrend),
}

impl ModelArtifact {
    /// Structural checks; a failing artifact is treated as corrupt.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            ModelArtifact::Forest(forest) => {
                if forest.trees.is_empty() {
                    return Err("forest has no trees".to_string());
                }
                for (i, tree) in forest.trees.iter().enumerate() {
                    tree.validate().map_err(|e| format!("tree {i}: {e}"))?;
                }
                Ok(())
            }
            ModelArtifact::Linear(lin) => {
                if [lin.intercept, lin.month, lin.time].iter().all(|v| v.is_finite()) {
                    Ok(())
                } else {
                    Err("linear model has non-finite coefficients".to_string())
                }
            }
        }
    }

    fn into_model(self) -> Box<dyn RegressionModel> {
        match self {
            ModelArtifact::Forest(forest) => Box::new(forest),
            ModelArtifact::Linear(lin) => Box::new(lin),
        }
    }
}

/// JSON artifact on disk.
#[derive(Debug, Clone)]
pub struct ArtifactFile {
    path: PathBuf,
}

impl ArtifactFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn unavailable(&self, reason: impl Into<String>) -> ForecastError {
        ForecastError::ModelUnavailable {
            location: self.location(),
            reason: reason.into(),
        }
    }
}

impl ModelSource for ArtifactFile {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Box<dyn RegressionModel>, ForecastError> {
        let bytes = fs::read(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => self.unavailable("artifact not found"),
            _ => self.unavailable(format!("failed to read artifact: {e}")),
        })?;
        let artifact: ModelArtifact =
            serde_json::from_slice(&bytes).map_err(|e| self.unavailable(format!("corrupt artifact: {e}")))?;
        artifact
            .validate()
            .map_err(|e| self.unavailable(format!("corrupt artifact: {e}")))?;
        debug!(path = %self.path.display(), "loaded trend-regression artifact");
        Ok(artifact.into_model())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump() -> ModelArtifact {
        ModelArtifact::Forest(TreeEnsemble {
            trees: vec![
                DecisionTree {
                    nodes: vec![
                        TreeNode::Split {
                            feature: Feature::Time,
                            threshold: 23.5,
                            left: 1,
                            right: 2,
                        },
                        TreeNode::Leaf { value: 5.0 },
                        TreeNode::Leaf { value: 9.0 },
                    ],
                },
                DecisionTree {
                    nodes: vec![TreeNode::Leaf { value: 7.0 }],
                },
            ],
        })
    }

    fn row(month: u32, time_index: usize) -> FeatureRow {
        FeatureRow { month, time_index }
    }

    #[test]
    fn forest_averages_tree_outputs() {
        let model = stump().into_model();
        let preds = model.predict(&[row(1, 10), row(2, 30)]).unwrap();
        assert_eq!(preds, vec![6.0, 8.0]);
    }

    #[test]
    fn split_threshold_is_inclusive_on_the_left() {
        let model = ModelArtifact::Forest(TreeEnsemble {
            trees: vec![DecisionTree {
                nodes: vec![
                    TreeNode::Split {
                        feature: Feature::Month,
                        threshold: 6.0,
                        left: 1,
                        right: 2,
                    },
                    TreeNode::Leaf { value: 1.0 },
                    TreeNode::Leaf { value: 2.0 },
                ],
            }],
        })
        .into_model();
        assert_eq!(model.predict(&[row(6, 0), row(7, 0)]).unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn artifact_json_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rf_model.json");
        std::fs::write(&path, serde_json::to_string(&stump()).unwrap()).unwrap();

        let model = ArtifactFile::new(&path).load().unwrap();
        assert_eq!(model.predict(&[row(3, 24)]).unwrap(), vec![8.0]);
    }

    #[test]
    fn linear_artifact_parses_from_documented_schema() {
        let json = r#"{"kind": "linear", "intercept": 0.0, "month": 0.0, "time": 0.5}"#;
        let artifact: ModelArtifact = serde_json::from_str(json).unwrap();
        let preds = artifact.into_model().predict(&[row(1, 24), row(2, 25)]).unwrap();
        assert_eq!(preds, vec![12.0, 12.5]);
    }

    #[test]
    fn missing_artifact_is_model_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = ArtifactFile::new(dir.path().join("rf_model.json"))
            .load()
            .err()
            .unwrap();
        match err {
            ForecastError::ModelUnavailable { reason, .. } => assert_eq!(reason, "artifact not found"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn corrupt_artifacts_are_model_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rf_model.json");

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            ArtifactFile::new(&path).load().err(),
            Some(ForecastError::ModelUnavailable { .. })
        ));

        // Backward child pointer would loop forever.
        std::fs::write(
            &path,
            r#"{"kind":"forest","trees":[{"nodes":[{"feature":"Time","threshold":1.0,"left":0,"right":0}]}]}"#,
        )
        .unwrap();
        let err = ArtifactFile::new(&path).load().err().unwrap();
        assert!(err.to_string().contains("corrupt artifact"));

        std::fs::write(&path, r#"{"kind":"forest","trees":[]}"#).unwrap();
        assert!(ArtifactFile::new(&path).load().is_err());
    }
}
