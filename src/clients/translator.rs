//! Best-effort machine translation into the classifier's pivot language.
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("translation request failed")]
    Request(#[from] reqwest::Error),
    #[error("translator returned status {0}")]
    Status(u16),
    #[error("translator response has an unexpected shape")]
    MalformedResponse,
    #[error("translator returned an empty translation")]
    EmptyTranslation,
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslationError>;
}

/// Text handed to the normalizer, remembering whether translation worked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotText {
    text: String,
    translated: bool,
}

impl PivotText {
    /// Keeps the translation when it succeeded, otherwise falls back to the
    /// untranslated original.
    #[must_use]
    pub fn from_result(result: Result<String, TranslationError>, original: &str) -> Self {
        match result {
            Ok(text) => Self {
                text,
                translated: true,
            },
            Err(err) => {
                warn!(error = %err, "translation failed, using original text");
                Self {
                    text: original.to_string(),
                    translated: false,
                }
            }
        }
    }

    #[must_use]
    pub fn is_translated(&self) -> bool {
        self.translated
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }
}

#[derive(Debug, Clone)]
pub struct TranslatorConfig {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub total_timeout: Duration,
}

/// Client for the public Google Translate web endpoint.
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: Client,
    endpoint: Url,
}

impl GoogleTranslator {
    /// # Errors
    /// Returns an error when the base URL is invalid or the HTTP client cannot be built.
    pub fn new(config: TranslatorConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.total_timeout)
            .build()
            .context("failed to build translator HTTP client")?;

        let endpoint = Url::parse(&config.base_url)
            .context("invalid translator base URL")?
            .join("translate_a/single")
            .context("failed to build translator URL")?;

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslationError> {
        debug!(source, target, chars = text.chars().count(), "translating message");

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::Status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|_| TranslationError::MalformedResponse)?;
        extract_translation(&body)
    }
}

/// Joins the translated fragments found at `body[0][i][0]`.
fn extract_translation(body: &Value) -> Result<String, TranslationError> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or(TranslationError::MalformedResponse)?;

    let mut translated = String::new();
    for segment in segments {
        let fragment = segment
            .get(0)
            .and_then(Value::as_str)
            .ok_or(TranslationError::MalformedResponse)?;
        translated.push_str(fragment);
    }

    if translated.trim().is_empty() {
        return Err(TranslationError::EmptyTranslation);
    }
    Ok(translated)
}
