use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::{
    api,
    classification::{DecisionPipeline, LanguagePair, ModelState, OverridePolicy},
    clients::{GeminiClient, GeminiConfig, GoogleTranslator, Translator, TranslatorConfig},
    config::Config,
    observability::Telemetry,
    response::{ResponseComposer, ResponseGenerator},
};

#[derive(Clone)]
pub struct AppState {
    registry: Arc<ComponentRegistry>,
}

impl AppState {
    #[must_use]
    pub fn new(registry: ComponentRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub(crate) fn pipeline(&self) -> &DecisionPipeline {
        &self.registry.pipeline
    }

    pub(crate) fn composer(&self) -> &ResponseComposer {
        &self.registry.composer
    }

    pub(crate) fn telemetry(&self) -> &Telemetry {
        &self.registry.telemetry
    }

    pub(crate) fn started_at(&self) -> DateTime<Utc> {
        self.registry.started_at
    }
}

/// Long-lived components shared by every request.
pub struct ComponentRegistry {
    pipeline: DecisionPipeline,
    composer: ResponseComposer,
    telemetry: Telemetry,
    started_at: DateTime<Utc>,
}

impl ComponentRegistry {
    /// Loads the model artifacts and builds the external clients.
    ///
    /// Missing or invalid artifacts do not fail the build; the service then
    /// reports itself as not ready.
    ///
    /// # Errors
    /// Returns an error when telemetry or an HTTP client cannot be built.
    pub fn build(config: &Config) -> Result<Self> {
        let telemetry = Telemetry::new().context("failed to register metrics")?;
        let models = ModelState::load(config.vectorizer_path(), config.classifier_path());

        let translator: Option<Arc<dyn Translator>> = if config.translation_enabled() {
            let client = GoogleTranslator::new(TranslatorConfig {
                base_url: config.translator_base_url().to_string(),
                connect_timeout: config.translator_connect_timeout(),
                total_timeout: config.translator_timeout(),
            })?;
            Some(Arc::new(client))
        } else {
            info!("translation disabled, messages are classified as received");
            None
        };

        let generator: Option<Arc<dyn ResponseGenerator>> = match config.gemini_api_key() {
            Some(api_key) => {
                let client = GeminiClient::new(GeminiConfig {
                    base_url: config.gemini_base_url().to_string(),
                    api_key: api_key.to_string(),
                    model: config.gemini_model().to_string(),
                    connect_timeout: config.gemini_connect_timeout(),
                    total_timeout: config.gemini_timeout(),
                })?;
                info!(model = config.gemini_model(), "gemini replies enabled");
                Some(Arc::new(client))
            }
            None => {
                info!("GEMINI_API_KEY not set, using fallback replies");
                None
            }
        };

        let pipeline = DecisionPipeline::new(
            models,
            translator,
            OverridePolicy::new(config.override_threshold(), config.override_confidence()),
            LanguagePair::new(config.source_lang(), config.pivot_lang()),
            config.translator_max_chars(),
        );
        let composer = ResponseComposer::new(generator, config.source_lang());

        Ok(Self::from_parts(pipeline, composer, telemetry))
    }

    #[must_use]
    pub fn from_parts(
        pipeline: DecisionPipeline,
        composer: ResponseComposer,
        telemetry: Telemetry,
    ) -> Self {
        Self {
            pipeline,
            composer,
            telemetry,
            started_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn models_ready(&self) -> bool {
        self.pipeline.models().is_ready()
    }
}

pub fn build_router(registry: ComponentRegistry) -> Router {
    let state = AppState::new(registry);
    api::router(state)
}
