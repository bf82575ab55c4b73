//! Logistic-regression classifier restored from a fitted scikit-learn export.
use std::{fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

use super::{MoodLabel, Prediction, context::ArtifactError, features::FeatureVector};

const ARTIFACT_KIND: &str = "classifier";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiClass {
    #[default]
    #[serde(alias = "auto")]
    Multinomial,
    Ovr,
}

#[derive(Debug, Deserialize)]
struct ClassifierArtifact {
    classes: Vec<i64>,
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    #[serde(default)]
    multi_class: MultiClass,
}

impl ClassifierArtifact {
    fn validate(&self) -> Result<Vec<MoodLabel>, ArtifactError> {
        if self.classes.len() != MoodLabel::ALL.len() {
            return Err(invalid(format!(
                "expected {} classes, found {}",
                MoodLabel::ALL.len(),
                self.classes.len()
            )));
        }
        if self.coef.len() != self.classes.len() {
            return Err(invalid(format!(
                "coef has {} rows for {} classes",
                self.coef.len(),
                self.classes.len()
            )));
        }
        if self.intercept.len() != self.classes.len() {
            return Err(invalid(format!(
                "intercept has {} values for {} classes",
                self.intercept.len(),
                self.classes.len()
            )));
        }
        let width = self.coef[0].len();
        if self.coef.iter().any(|row| row.len() != width) {
            return Err(invalid("coef rows have differing widths".to_string()));
        }
        if self
            .coef
            .iter()
            .flatten()
            .chain(&self.intercept)
            .any(|value| !value.is_finite())
        {
            return Err(invalid("weights contain non-finite values".to_string()));
        }

        let mut labels = Vec::with_capacity(self.classes.len());
        for &class_id in &self.classes {
            let label = MoodLabel::from_class_id(class_id)
                .ok_or_else(|| invalid(format!("unknown class id {class_id}")))?;
            if labels.contains(&label) {
                return Err(invalid(format!("class id {class_id} listed twice")));
            }
            labels.push(label);
        }
        Ok(labels)
    }
}

fn invalid(reason: String) -> ArtifactError {
    ArtifactError::Invalid {
        kind: ARTIFACT_KIND,
        reason,
    }
}

/// Failure while scoring a feature vector.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("feature dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("classifier produced non-finite probabilities")]
    NonFinite,
}

/// Per-class probabilities in the classifier's class order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassProbabilities {
    entries: Vec<(MoodLabel, f64)>,
}

impl ClassProbabilities {
    #[must_use]
    pub fn entries(&self) -> &[(MoodLabel, f64)] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, label: MoodLabel) -> Option<f64> {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == label)
            .map(|(_, probability)| *probability)
    }

    /// Highest-probability class; the first class wins ties.
    #[must_use]
    pub fn best(&self) -> Prediction {
        let (label, probability) = self.entries.iter().skip(1).fold(
            self.entries[0],
            |best, &candidate| if candidate.1 > best.1 { candidate } else { best },
        );
        Prediction::new(label, probability)
    }
}

#[derive(Debug)]
pub struct LogisticModel {
    labels: Vec<MoodLabel>,
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    multi_class: MultiClass,
    n_features: usize,
}

impl LogisticModel {
    /// # Errors
    /// Returns an error when the file cannot be read or is not a valid export.
    pub fn from_path(path: &Path) -> Result<Self, ArtifactError> {
        let raw = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// # Errors
    /// Returns an error when `raw` is not a valid classifier export.
    pub fn from_json(raw: &str) -> Result<Self, ArtifactError> {
        let artifact: ClassifierArtifact =
            serde_json::from_str(raw).map_err(|source| ArtifactError::Parse {
                kind: ARTIFACT_KIND,
                source,
            })?;
        let labels = artifact.validate()?;
        let n_features = artifact.coef[0].len();

        Ok(Self {
            labels,
            coef: artifact.coef,
            intercept: artifact.intercept,
            multi_class: artifact.multi_class,
            n_features,
        })
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    #[must_use]
    pub fn labels(&self) -> &[MoodLabel] {
        &self.labels
    }

    /// Coefficient row for `label`, if the model knows the class.
    #[must_use]
    pub fn coefficients(&self, label: MoodLabel) -> Option<&[f64]> {
        self.labels
            .iter()
            .position(|candidate| *candidate == label)
            .map(|row| self.coef[row].as_slice())
    }

    /// # Errors
    /// Returns an error when the vector does not match the model width.
    pub fn predict_proba(
        &self,
        features: &FeatureVector,
    ) -> Result<ClassProbabilities, InferenceError> {
        if features.dimension() != self.n_features {
            return Err(InferenceError::DimensionMismatch {
                expected: self.n_features,
                actual: features.dimension(),
            });
        }

        let scores: Vec<f64> = self
            .coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, bias)| bias + features.dot(row))
            .collect();
        let probabilities = match self.multi_class {
            MultiClass::Multinomial => softmax(&scores),
            MultiClass::Ovr => normalized_sigmoid(&scores),
        };
        if probabilities.iter().any(|p| !p.is_finite()) {
            return Err(InferenceError::NonFinite);
        }

        Ok(ClassProbabilities {
            entries: self.labels.iter().copied().zip(probabilities).collect(),
        })
    }

    /// Predicted label with its probability, plus the full distribution.
    ///
    /// # Errors
    /// Returns an error when the vector does not match the model width.
    pub fn predict(
        &self,
        features: &FeatureVector,
    ) -> Result<(Prediction, ClassProbabilities), InferenceError> {
        let probabilities = self.predict_proba(features)?;
        Ok((probabilities.best(), probabilities))
    }
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|score| (score - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|value| value / total).collect()
}

fn normalized_sigmoid(scores: &[f64]) -> Vec<f64> {
    let sigmoids: Vec<f64> = scores
        .iter()
        .map(|score| 1.0 / (1.0 + (-score).exp()))
        .collect();
    let total: f64 = sigmoids.iter().sum();
    sigmoids.into_iter().map(|value| value / total).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = r#"{
        "classes": [0, 1, 2],
        "coef": [[0.0, 0.0], [2.0, 0.0], [0.0, 1.0]],
        "intercept": [0.0, 0.0, 0.0]
    }"#;

    #[test]
    fn multinomial_probabilities_sum_to_one() {
        let model = LogisticModel::from_json(MODEL).expect("valid model");
        let features = FeatureVector::new(2, vec![(0, 1.0)]);
        let (prediction, probabilities) = model.predict(&features).expect("prediction");

        let total: f64 = probabilities.entries().iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert_eq!(prediction.label, MoodLabel::Anxiety);
        let expected = 2.0_f64.exp() / (2.0_f64.exp() + 2.0);
        assert!((prediction.confidence - expected).abs() < 1e-12);
    }

    #[test]
    fn ties_resolve_to_first_class() {
        let model = LogisticModel::from_json(MODEL).expect("valid model");
        let features = FeatureVector::new(2, Vec::new());
        let (prediction, _) = model.predict(&features).expect("prediction");
        assert_eq!(prediction.label, MoodLabel::Neutral);
        assert!((prediction.confidence - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn ovr_normalizes_sigmoids() {
        let raw = MODEL.replace("\"intercept\"", "\"multi_class\": \"ovr\", \"intercept\"");
        let model = LogisticModel::from_json(&raw).expect("valid model");
        let features = FeatureVector::new(2, vec![(1, 1.0)]);
        let probabilities = model.predict_proba(&features).expect("probabilities");

        let sigmoid = |x: f64| 1.0 / (1.0 + (-x).exp());
        let total = sigmoid(0.0) * 2.0 + sigmoid(1.0);
        let depression = probabilities.get(MoodLabel::Depression).expect("class");
        assert!((depression - sigmoid(1.0) / total).abs() < 1e-12);
    }

    #[test]
    fn dimension_mismatch_is_an_error() {
        let model = LogisticModel::from_json(MODEL).expect("valid model");
        let features = FeatureVector::new(5, vec![(4, 1.0)]);
        let error = model.predict(&features).expect_err("mismatch");
        assert!(matches!(
            error,
            InferenceError::DimensionMismatch {
                expected: 2,
                actual: 5
            }
        ));
    }

    #[test]
    fn rejects_unknown_class_ids() {
        let raw = MODEL.replace("[0, 1, 2]", "[0, 1, 7]");
        let error = LogisticModel::from_json(&raw).expect_err("unknown class");
        assert!(error.to_string().contains("unknown class id 7"));
    }

    #[test]
    fn rejects_binary_exports() {
        let raw = r#"{"classes": [0, 2], "coef": [[0.5, -0.5]], "intercept": [0.1]}"#;
        let error = LogisticModel::from_json(raw).expect_err("binary export");
        assert!(error.to_string().contains("expected 3 classes, found 2"));
    }

    #[test]
    fn rejects_ragged_coefficients() {
        let raw = MODEL.replace("[0.0, 1.0]", "[0.0]");
        assert!(LogisticModel::from_json(&raw).is_err());
    }

    #[test]
    fn exposes_coefficients_per_label() {
        let model = LogisticModel::from_json(MODEL).expect("valid model");
        assert_eq!(model.coefficients(MoodLabel::Anxiety), Some(&[2.0, 0.0][..]));
        assert_eq!(model.n_features(), 2);
    }
}
