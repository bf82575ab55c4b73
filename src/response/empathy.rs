//! Empathetic reply composition on top of a classification decision.
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use super::resources::ResourceBundle;
use crate::classification::{Decision, DecisionPath, MoodLabel, Prediction, ShortCircuitReason};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation request failed")]
    Request(#[from] reqwest::Error),
    #[error("generator returned status {0}")]
    Status(u16),
    #[error("generator response has an unexpected shape")]
    MalformedResponse,
    #[error("generator returned an empty reply")]
    EmptyReply,
}

/// Free-text generator used to phrase the empathetic part of a reply.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Generated,
    /// No generator is configured, or the message was empty.
    Fallback,
    FallbackAfterError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedReply {
    pub text: String,
    pub source: ReplySource,
}

impl ComposedReply {
    #[must_use]
    pub fn generator_used(&self) -> bool {
        self.source == ReplySource::Generated
    }
}

#[must_use]
pub fn fallback_reply(label: MoodLabel) -> &'static str {
    match label {
        MoodLabel::Neutral => "Entiendo. ¿Hay algo más que quieras compartir?",
        MoodLabel::Anxiety => {
            "La ansiedad puede ser abrumadora, pero estás dando un paso importante al hablar de ello."
        }
        MoodLabel::Depression => {
            "Lamento que estés pasando por un momento difícil. Tus sentimientos son válidos y mereces apoyo."
        }
    }
}

fn language_name(code: &str) -> &str {
    match code.to_ascii_lowercase().as_str() {
        "es" => "español",
        "en" => "inglés",
        "pt" => "portugués",
        "fr" => "francés",
        _ => code,
    }
}

#[must_use]
pub fn build_prompt(message: &str, prediction: Prediction, reply_language: &str) -> String {
    format!(
        "Eres un asistente de apoyo emocional empático y profesional.\n\n\
         Un usuario ha compartido: \"{message}\"\n\n\
         Nuestro sistema de análisis ha detectado que el estado emocional predominante es: \
         {label} (confianza: {percent:.0}%)\n\n\
         Genera una respuesta que:\n\
         1. Sea empática y validante\n\
         2. Reconozca sus sentimientos sin juzgar\n\
         3. Sea breve (2-3 oraciones máximo)\n\
         4. Use un tono cálido pero profesional\n\
         5. No hagas diagnósticos ni des consejos médicos específicos\n\
         6. Responde en {language}\n\n\
         Respuesta:",
        label = prediction.label,
        percent = prediction.confidence * 100.0,
        language = language_name(reply_language),
    )
}

pub struct ResponseComposer {
    generator: Option<Arc<dyn ResponseGenerator>>,
    reply_language: String,
}

impl ResponseComposer {
    #[must_use]
    pub fn new(
        generator: Option<Arc<dyn ResponseGenerator>>,
        reply_language: impl Into<String>,
    ) -> Self {
        Self {
            generator,
            reply_language: reply_language.into(),
        }
    }

    #[must_use]
    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// Empathetic text followed by the help resources for the final label.
    /// Short-circuited decisions get the empathetic text only.
    pub async fn compose(&self, message: &str, decision: &Decision) -> ComposedReply {
        let prediction = decision.prediction;
        let (empathetic, source) = match (&self.generator, decision.path) {
            (_, DecisionPath::ShortCircuit(ShortCircuitReason::EmptyInput)) | (None, _) => {
                (fallback_reply(prediction.label).to_string(), ReplySource::Fallback)
            }
            (Some(generator), _) => {
                let prompt = build_prompt(message, prediction, &self.reply_language);
                match generator.generate(&prompt).await {
                    Ok(text) => (text, ReplySource::Generated),
                    Err(err) => {
                        warn!(error = %err, label = %prediction.label, "reply generation failed, using fallback");
                        (
                            fallback_reply(prediction.label).to_string(),
                            ReplySource::FallbackAfterError,
                        )
                    }
                }
            }
        };

        let text = if decision.is_short_circuit() {
            empathetic
        } else {
            format!(
                "{empathetic}\n{}",
                ResourceBundle::for_label(prediction.label).render()
            )
        };
        ComposedReply { text, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::TranslationStatus;
    use std::sync::Mutex;

    struct Scripted {
        reply: Result<&'static str, u16>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ResponseGenerator for Scripted {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            self.prompts.lock().expect("lock").push(prompt.to_string());
            self.reply
                .map(str::to_string)
                .map_err(GenerationError::Status)
        }
    }

    fn scripted(reply: Result<&'static str, u16>) -> Arc<Scripted> {
        Arc::new(Scripted {
            reply,
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn classified(label: MoodLabel, confidence: f64) -> Decision {
        let prediction = Prediction::new(label, confidence);
        Decision {
            prediction,
            path: DecisionPath::Classified {
                raw: prediction,
                overridden: false,
            },
            normalized: "tired".to_string(),
            translation: TranslationStatus::Translated,
            probabilities: None,
        }
    }

    fn short_circuit(reason: ShortCircuitReason) -> Decision {
        Decision {
            prediction: Prediction::certain_neutral(),
            path: DecisionPath::ShortCircuit(reason),
            normalized: String::new(),
            translation: TranslationStatus::Skipped,
            probabilities: None,
        }
    }

    #[tokio::test]
    async fn generated_reply_is_followed_by_resources() {
        let generator = scripted(Ok("Te escucho."));
        let composer = ResponseComposer::new(Some(generator.clone()), "es");
        let reply = composer
            .compose("Estoy muy cansado", &classified(MoodLabel::Depression, 0.9))
            .await;

        assert!(reply.generator_used());
        assert!(reply.text.starts_with("Te escucho.\n\n🆘 Líneas de ayuda inmediata:"));
        let prompts = generator.prompts.lock().expect("lock");
        assert!(prompts[0].contains("\"Estoy muy cansado\""));
        assert!(prompts[0].contains("Depresion (confianza: 90%)"));
        assert!(prompts[0].contains("Responde en español"));
    }

    #[tokio::test]
    async fn generator_failure_falls_back_to_label_reply() {
        let composer = ResponseComposer::new(Some(scripted(Err(500))), "es");
        let reply = composer
            .compose("tengo miedo", &classified(MoodLabel::Anxiety, 0.6))
            .await;

        assert_eq!(reply.source, ReplySource::FallbackAfterError);
        assert!(!reply.generator_used());
        assert!(reply.text.starts_with(fallback_reply(MoodLabel::Anxiety)));
        assert!(reply.text.contains("🧘 Técnicas que pueden ayudar:"));
    }

    #[tokio::test]
    async fn without_generator_uses_fallback() {
        let composer = ResponseComposer::new(None, "es");
        let reply = composer
            .compose("hola", &classified(MoodLabel::Neutral, 0.8))
            .await;
        assert_eq!(reply.source, ReplySource::Fallback);
        assert!(reply.text.contains("✨ Recomendaciones para el bienestar:"));
    }

    #[tokio::test]
    async fn empty_input_skips_generator_and_resources() {
        let generator = scripted(Ok("unused"));
        let composer = ResponseComposer::new(Some(generator.clone()), "es");
        let reply = composer
            .compose("   ", &short_circuit(ShortCircuitReason::EmptyInput))
            .await;

        assert_eq!(reply.text, fallback_reply(MoodLabel::Neutral));
        assert!(generator.prompts.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn normalized_empty_still_asks_generator_without_resources() {
        let composer = ResponseComposer::new(Some(scripted(Ok("Cuéntame más."))), "es");
        let reply = composer
            .compose("...", &short_circuit(ShortCircuitReason::NormalizedEmpty))
            .await;
        assert_eq!(reply.text, "Cuéntame más.");
        assert!(reply.generator_used());
    }
}
