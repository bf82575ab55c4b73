//! Fitted artifacts shared read-only by every request.
use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use thiserror::Error;
use tracing::{error, info};

use super::{
    ClassProbabilities, InferenceError, Prediction, features::TfidfVectorizer,
    model::LogisticModel,
};

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read artifact {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {kind} artifact")]
    Parse {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid {kind} artifact: {reason}")]
    Invalid { kind: &'static str, reason: String },
}

/// Vectorizer and classifier loaded together at startup.
#[derive(Debug)]
pub struct InferenceContext {
    vectorizer: TfidfVectorizer,
    model: LogisticModel,
}

impl InferenceContext {
    /// # Errors
    /// Returns an error when the vectorizer width differs from the classifier width.
    pub fn new(vectorizer: TfidfVectorizer, model: LogisticModel) -> Result<Self, ArtifactError> {
        if vectorizer.dimension() != model.n_features() {
            return Err(ArtifactError::Invalid {
                kind: "classifier",
                reason: format!(
                    "expects {} features but the vectorizer produces {}",
                    model.n_features(),
                    vectorizer.dimension()
                ),
            });
        }
        Ok(Self { vectorizer, model })
    }

    /// # Errors
    /// Returns an error when either artifact is missing or malformed.
    pub fn load(vectorizer_path: &Path, classifier_path: &Path) -> Result<Self, ArtifactError> {
        let vectorizer = TfidfVectorizer::from_path(vectorizer_path)?;
        let model = LogisticModel::from_path(classifier_path)?;
        Self::new(vectorizer, model)
    }

    #[must_use]
    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    #[must_use]
    pub fn model(&self) -> &LogisticModel {
        &self.model
    }

    /// Vectorizes already-normalized text and scores it.
    ///
    /// # Errors
    /// Returns an error when the classifier rejects the feature vector.
    pub fn infer(
        &self,
        normalized: &str,
    ) -> Result<(Prediction, ClassProbabilities), InferenceError> {
        let features = self.vectorizer.transform(normalized);
        self.model.predict(&features)
    }
}

/// Whether classification can run at all.
#[derive(Debug, Clone)]
pub enum ModelState {
    Ready(Arc<InferenceContext>),
    Unavailable { reason: String },
}

impl ModelState {
    /// Loads both artifacts, degrading to `Unavailable` instead of failing.
    pub fn load(vectorizer_path: &Path, classifier_path: &Path) -> Self {
        match InferenceContext::load(vectorizer_path, classifier_path) {
            Ok(context) => {
                info!(
                    vectorizer = %vectorizer_path.display(),
                    classifier = %classifier_path.display(),
                    features = context.model().n_features(),
                    "classification models loaded"
                );
                Self::Ready(Arc::new(context))
            }
            Err(err) => {
                error!(error = %error_chain(&err), "classification models unavailable");
                Self::Unavailable {
                    reason: error_chain(&err),
                }
            }
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    #[must_use]
    pub fn context(&self) -> Option<&Arc<InferenceContext>> {
        match self {
            Self::Ready(context) => Some(context),
            Self::Unavailable { .. } => None,
        }
    }

    #[must_use]
    pub fn unavailable_reason(&self) -> Option<&str> {
        match self {
            Self::Ready(_) => None,
            Self::Unavailable { reason } => Some(reason),
        }
    }
}

impl From<InferenceContext> for ModelState {
    fn from(context: InferenceContext) -> Self {
        Self::Ready(Arc::new(context))
    }
}

fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
