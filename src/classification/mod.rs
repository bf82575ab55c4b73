//! Emotional-state classification of short free-text messages.
//!
//! The decision pipeline turns a raw message into a final [`Prediction`]:
//! translation into the pivot language, normalization, TF-IDF features,
//! logistic-regression inference and the positive-affect override.
use std::fmt;

use serde::{Deserialize, Serialize};

mod context;
pub mod features;
pub mod keywords;
pub mod model;
pub mod normalizer;
mod pipeline;

pub use context::{ArtifactError, InferenceContext, ModelState};
pub use features::{FeatureVector, TfidfVectorizer};
pub use keywords::{
    DEFAULT_OVERRIDE_CONFIDENCE, DEFAULT_OVERRIDE_THRESHOLD, OverrideDecision, OverridePolicy,
};
pub use model::{ClassProbabilities, InferenceError, LogisticModel};
pub use normalizer::TextNormalizer;
pub use pipeline::{
    Decision, DecisionPath, DecisionPipeline, LanguagePair, PipelineError, ShortCircuitReason,
    TranslationStatus,
};

/// Emotional-state category emitted by the classifier.
///
/// Serialized with the wire names the public API has always used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoodLabel {
    #[serde(rename = "Neutro")]
    Neutral,
    #[serde(rename = "Ansiedad")]
    Anxiety,
    #[serde(rename = "Depresion")]
    Depression,
}

impl MoodLabel {
    pub const ALL: [MoodLabel; 3] = [Self::Neutral, Self::Anxiety, Self::Depression];

    /// Maps the numeric class id stored in the classifier artifact.
    #[must_use]
    pub fn from_class_id(id: i64) -> Option<Self> {
        match id {
            0 => Some(Self::Neutral),
            1 => Some(Self::Anxiety),
            2 => Some(Self::Depression),
            _ => None,
        }
    }

    #[must_use]
    pub fn class_id(self) -> usize {
        match self {
            Self::Neutral => 0,
            Self::Anxiety => 1,
            Self::Depression => 2,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "Neutro",
            Self::Anxiety => "Ansiedad",
            Self::Depression => "Depresion",
        }
    }
}

impl fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final label with the probability mass the model assigned to it.
///
/// `confidence` keeps full precision; rounding happens only when a
/// response is rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub label: MoodLabel,
    pub confidence: f64,
}

impl Prediction {
    #[must_use]
    pub fn new(label: MoodLabel, confidence: f64) -> Self {
        Self {
            label,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Result used whenever the classifier is not consulted.
    #[must_use]
    pub fn certain_neutral() -> Self {
        Self::new(MoodLabel::Neutral, 1.0)
    }

    /// Confidence rounded to four decimal places for presentation.
    #[must_use]
    pub fn rounded_confidence(&self) -> f64 {
        (self.confidence * 10_000.0).round() / 10_000.0
    }
}
