#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use moodbot::classification::{
    DecisionPipeline, InferenceContext, LanguagePair, ModelState, OverridePolicy,
};
use moodbot::clients::{TranslationError, Translator};

pub const HAPPY: &str = "I am so happy today, everything is wonderful";
pub const NEGATED: &str = "I am not happy, nothing feels good anymore";

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn fixture_context() -> InferenceContext {
    InferenceContext::load(&fixture("vectorizer.json"), &fixture("classifier.json"))
        .expect("fixture artifacts load")
}

pub fn ready_models() -> ModelState {
    ModelState::from(fixture_context())
}

pub fn unavailable_models() -> ModelState {
    ModelState::Unavailable {
        reason: "classifier artifact missing".to_string(),
    }
}

/// Pipeline over the fixtures that classifies English text as received.
pub fn english_pipeline() -> DecisionPipeline {
    DecisionPipeline::new(
        ready_models(),
        None,
        OverridePolicy::default(),
        LanguagePair::new("en", "en"),
        4999,
    )
}

pub fn translating_pipeline(
    models: ModelState,
    translator: Arc<dyn Translator>,
    max_chars: usize,
) -> DecisionPipeline {
    DecisionPipeline::new(
        models,
        Some(translator),
        OverridePolicy::default(),
        LanguagePair::new("es", "en"),
        max_chars,
    )
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-4,
        "expected {expected}, got {actual}"
    );
}

/// Always fails, counting the attempts.
#[derive(Default)]
pub struct FailingTranslator {
    pub calls: Mutex<usize>,
}

#[async_trait]
impl Translator for FailingTranslator {
    async fn translate(
        &self,
        _text: &str,
        _source: &str,
        _target: &str,
    ) -> Result<String, TranslationError> {
        *self.calls.lock().expect("lock") += 1;
        Err(TranslationError::Status(503))
    }
}

/// Returns a fixed translation and records what it was asked to translate.
pub struct ScriptedTranslator {
    pub reply: String,
    pub requests: Mutex<Vec<(String, String, String)>>,
}

impl ScriptedTranslator {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<(String, String, String)> {
        self.requests.lock().expect("lock").clone()
    }
}

#[async_trait]
impl Translator for ScriptedTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslationError> {
        self.requests.lock().expect("lock").push((
            text.to_string(),
            source.to_string(),
            target.to_string(),
        ));
        Ok(self.reply.clone())
    }
}
