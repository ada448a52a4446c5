//! Inference for tree-ensemble models exported by the offline training job.
//!
//! The exported document lists the feature columns it was fitted on and a set of binary
//! decision trees. Each tree is a flat node table rooted at index 0. Split nodes send a
//! sample left when `features[feature] <= threshold`. Leaves carry the fraction of
//! high-risk training samples that reached them. Averaging those fractions across trees and
//! comparing against one half reproduces the ensemble's majority decision, with exact ties
//! resolving to low risk.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::advisory::{ClassifierError, PredictedLabel, SessionClassifier};
use super::features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        high_risk_probability: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn high_risk_probability(&self, features: &FeatureVector) -> Result<f64, ClassifierError> {
        let mut index = 0;
        // A well-formed tree reaches a leaf in fewer hops than it has nodes.
        for _ in 0..self.nodes.len() {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf {
                    high_risk_probability,
                }) => return Ok(*high_risk_probability),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = features.get(*feature).ok_or_else(|| {
                        ClassifierError::MalformedModel(format!(
                            "split references feature {feature}"
                        ))
                    })?;
                    index = if value <= *threshold { *left } else { *right };
                }
                None => {
                    return Err(ClassifierError::MalformedModel(format!(
                        "node {index} does not exist"
                    )))
                }
            }
        }

        Err(ClassifierError::MalformedModel(
            "tree traversal did not reach a leaf".to_string(),
        ))
    }

    fn validate(&self, position: usize) -> Result<(), ModelLoadError> {
        if self.nodes.is_empty() {
            return Err(ModelLoadError::Invalid(format!("tree {position} has no nodes")));
        }

        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= FEATURE_COUNT {
                        return Err(ModelLoadError::Invalid(format!(
                            "tree {position} node {index} splits on unknown feature {feature}"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(ModelLoadError::Invalid(format!(
                            "tree {position} node {index} has a non-finite threshold"
                        )));
                    }
                    if *left >= self.nodes.len() || *right >= self.nodes.len() {
                        return Err(ModelLoadError::Invalid(format!(
                            "tree {position} node {index} points outside the node table"
                        )));
                    }
                }
                TreeNode::Leaf {
                    high_risk_probability,
                } => {
                    if !(0.0..=1.0).contains(high_risk_probability) {
                        return Err(ModelLoadError::Invalid(format!(
                            "tree {position} node {index} probability {high_risk_probability} outside [0, 1]"
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

/// Immutable tree ensemble implementing [`SessionClassifier`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    pub feature_names: Vec<String>,
    pub trees: Vec<DecisionTree>,
}

impl ForestModel {
    pub fn new(trees: Vec<DecisionTree>) -> Result<Self, ModelLoadError> {
        let model = Self {
            feature_names: FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
            trees,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ModelLoadError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ModelLoadError> {
        let model: ForestModel = serde_json::from_reader(reader)?;
        model.validate()?;
        Ok(model)
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    fn validate(&self) -> Result<(), ModelLoadError> {
        let expected: Vec<&str> = FEATURE_NAMES.to_vec();
        let found: Vec<&str> = self.feature_names.iter().map(String::as_str).collect();
        if found != expected {
            return Err(ModelLoadError::Invalid(format!(
                "feature columns {found:?} do not match expected {expected:?}"
            )));
        }

        if self.trees.is_empty() {
            return Err(ModelLoadError::Invalid("model has no trees".to_string()));
        }

        for (position, tree) in self.trees.iter().enumerate() {
            tree.validate(position)?;
        }

        Ok(())
    }
}

impl SessionClassifier for ForestModel {
    fn predict(&self, features: &FeatureVector) -> Result<PredictedLabel, ClassifierError> {
        if let Some(index) = features.first_non_finite() {
            return Err(ClassifierError::NonFiniteFeature {
                name: FEATURE_NAMES[index],
            });
        }
        if self.trees.is_empty() {
            return Err(ClassifierError::MalformedModel("model has no trees".to_string()));
        }

        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.high_risk_probability(features)?;
        }
        let mean = total / self.trees.len() as f64;

        Ok(if mean > 0.5 {
            PredictedLabel::HighRisk
        } else {
            PredictedLabel::LowRisk
        })
    }
}

/// Failure raised while loading a model document.
#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error("failed to read model: {0}")]
    Io(#[from] std::io::Error),
    #[error("model is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("model rejected: {0}")]
    Invalid(String),
}
