use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, instrument};

use super::{
    ClassProbabilities, InferenceError, ModelState, Prediction, keywords::OverridePolicy,
    normalizer::TextNormalizer,
};
use crate::clients::{PivotText, Translator};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("classification models are not loaded: {reason}")]
    ModelsUnavailable { reason: String },
    #[error("classification failed: {0}")]
    Internal(#[from] InferenceError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortCircuitReason {
    /// The message was empty or whitespace-only.
    EmptyInput,
    /// Nothing survived normalization.
    NormalizedEmpty,
}

impl ShortCircuitReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::NormalizedEmpty => "normalized_empty",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecisionPath {
    ShortCircuit(ShortCircuitReason),
    Classified { raw: Prediction, overridden: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationStatus {
    Translated,
    /// The translator failed and the original text was used.
    Failed,
    Skipped,
}

/// Final outcome for one message.
#[derive(Debug, Clone)]
pub struct Decision {
    pub prediction: Prediction,
    pub path: DecisionPath,
    pub normalized: String,
    pub translation: TranslationStatus,
    pub probabilities: Option<ClassProbabilities>,
}

impl Decision {
    fn short_circuit(
        reason: ShortCircuitReason,
        normalized: String,
        translation: TranslationStatus,
    ) -> Self {
        Self {
            prediction: Prediction::certain_neutral(),
            path: DecisionPath::ShortCircuit(reason),
            normalized,
            translation,
            probabilities: None,
        }
    }

    #[must_use]
    pub fn is_short_circuit(&self) -> bool {
        matches!(self.path, DecisionPath::ShortCircuit(_))
    }

    #[must_use]
    pub fn overridden(&self) -> bool {
        matches!(
            self.path,
            DecisionPath::Classified {
                overridden: true,
                ..
            }
        )
    }
}

/// Source language of incoming messages and the language the model expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    pub source: String,
    pub pivot: String,
}

impl LanguagePair {
    pub fn new(source: impl Into<String>, pivot: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            pivot: pivot.into(),
        }
    }

    #[must_use]
    pub fn needs_translation(&self) -> bool {
        !self.source.eq_ignore_ascii_case(&self.pivot)
    }
}

pub struct DecisionPipeline {
    models: ModelState,
    translator: Option<Arc<dyn Translator>>,
    normalizer: TextNormalizer,
    policy: OverridePolicy,
    languages: LanguagePair,
    max_translation_chars: usize,
}

impl DecisionPipeline {
    #[must_use]
    pub fn new(
        models: ModelState,
        translator: Option<Arc<dyn Translator>>,
        policy: OverridePolicy,
        languages: LanguagePair,
        max_translation_chars: usize,
    ) -> Self {
        Self {
            models,
            translator,
            normalizer: TextNormalizer::new(),
            policy,
            languages,
            max_translation_chars,
        }
    }

    #[must_use]
    pub fn models(&self) -> &ModelState {
        &self.models
    }

    #[must_use]
    pub fn languages(&self) -> &LanguagePair {
        &self.languages
    }

    /// # Errors
    /// Returns [`PipelineError::ModelsUnavailable`] before any work when the
    /// artifacts are not loaded, and [`PipelineError::Internal`] when the
    /// classifier rejects the features.
    #[instrument(skip_all, fields(message_len = message.len()))]
    pub async fn classify(&self, message: &str) -> Result<Decision, PipelineError> {
        if message.trim().is_empty() {
            debug!("empty message short-circuited");
            return Ok(Decision::short_circuit(
                ShortCircuitReason::EmptyInput,
                String::new(),
                TranslationStatus::Skipped,
            ));
        }

        let context = match &self.models {
            ModelState::Ready(context) => Arc::clone(context),
            ModelState::Unavailable { reason } => {
                return Err(PipelineError::ModelsUnavailable {
                    reason: reason.clone(),
                });
            }
        };

        let (pivot_text, translation) = self.to_pivot(message).await;
        let normalized = self.normalizer.normalize(&pivot_text);
        debug!(message, normalized = %normalized, "message normalized");
        if normalized.is_empty() {
            return Ok(Decision::short_circuit(
                ShortCircuitReason::NormalizedEmpty,
                normalized,
                translation,
            ));
        }

        let (raw, probabilities) = context.infer(&normalized)?;
        let outcome = self.policy.apply(&normalized, raw);
        info!(
            label = %outcome.prediction.label,
            confidence = outcome.prediction.confidence,
            raw_label = %raw.label,
            raw_confidence = raw.confidence,
            overridden = outcome.applied,
            "message classified"
        );

        Ok(Decision {
            prediction: outcome.prediction,
            path: DecisionPath::Classified {
                raw,
                overridden: outcome.applied,
            },
            normalized,
            translation,
            probabilities: Some(probabilities),
        })
    }

    async fn to_pivot(&self, message: &str) -> (String, TranslationStatus) {
        let Some(translator) = self
            .translator
            .as_ref()
            .filter(|_| self.languages.needs_translation())
        else {
            return (message.to_string(), TranslationStatus::Skipped);
        };

        let truncated = truncate_chars(message, self.max_translation_chars);
        let result = translator
            .translate(truncated, &self.languages.source, &self.languages.pivot)
            .await;
        let pivot = PivotText::from_result(result, message);
        let status = if pivot.is_translated() {
            TranslationStatus::Translated
        } else {
            TranslationStatus::Failed
        };
        (pivot.into_text(), status)
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((offset, _)) => &text[..offset],
        None => text,
    }
}
