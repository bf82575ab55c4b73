use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

use thiserror::Error;

use crate::classification::{DEFAULT_OVERRIDE_CONFIDENCE, DEFAULT_OVERRIDE_THRESHOLD};

const DEFAULT_HTTP_BIND: &str = "0.0.0.0:5000";
const DEFAULT_CLASSIFIER_PATH: &str = "models/classifier.json";
const DEFAULT_VECTORIZER_PATH: &str = "models/tfidf_vectorizer.json";
const DEFAULT_TRANSLATOR_BASE_URL: &str = "https://translate.googleapis.com/";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/";
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
/// Just under the translator's 5000-character request limit.
const DEFAULT_TRANSLATOR_MAX_CHARS: usize = 4999;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct Config {
    http_bind: SocketAddr,
    classifier_path: PathBuf,
    vectorizer_path: PathBuf,
    source_lang: String,
    pivot_lang: String,
    translation_enabled: bool,
    translator_base_url: String,
    translator_timeout: Duration,
    translator_max_chars: usize,
    gemini_api_key: Option<String>,
    gemini_base_url: String,
    gemini_model: String,
    gemini_timeout: Duration,
    override_threshold: f64,
    override_confidence: f64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {source}")]
    Invalid {
        name: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl Config {
    /// Reads the configuration from environment variables, applying defaults.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            http_bind: parse_socket_addr("MOODBOT_HTTP_BIND", DEFAULT_HTTP_BIND)?,
            classifier_path: env_path("MOODBOT_CLASSIFIER_PATH", DEFAULT_CLASSIFIER_PATH),
            vectorizer_path: env_path("MOODBOT_VECTORIZER_PATH", DEFAULT_VECTORIZER_PATH),
            source_lang: parse_language("MOODBOT_SOURCE_LANG", "es")?,
            pivot_lang: parse_language("MOODBOT_PIVOT_LANG", "en")?,
            translation_enabled: parse_bool("MOODBOT_TRANSLATION_ENABLED", true)?,
            translator_base_url: env_or("TRANSLATOR_BASE_URL", DEFAULT_TRANSLATOR_BASE_URL),
            translator_timeout: parse_duration_ms("TRANSLATOR_TIMEOUT_MS", 5_000)?,
            translator_max_chars: parse_non_zero_usize(
                "TRANSLATOR_MAX_CHARS",
                DEFAULT_TRANSLATOR_MAX_CHARS,
            )?,
            gemini_api_key: env::var("GEMINI_API_KEY")
                .ok()
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty()),
            gemini_base_url: env_or("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
            gemini_model: env_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            gemini_timeout: parse_duration_ms("GEMINI_TIMEOUT_MS", 15_000)?,
            override_threshold: parse_probability(
                "MOODBOT_OVERRIDE_THRESHOLD",
                DEFAULT_OVERRIDE_THRESHOLD,
            )?,
            override_confidence: parse_probability(
                "MOODBOT_OVERRIDE_CONFIDENCE",
                DEFAULT_OVERRIDE_CONFIDENCE,
            )?,
        })
    }

    #[must_use]
    pub fn http_bind(&self) -> SocketAddr {
        self.http_bind
    }

    #[must_use]
    pub fn classifier_path(&self) -> &PathBuf {
        &self.classifier_path
    }

    #[must_use]
    pub fn vectorizer_path(&self) -> &PathBuf {
        &self.vectorizer_path
    }

    #[must_use]
    pub fn source_lang(&self) -> &str {
        &self.source_lang
    }

    #[must_use]
    pub fn pivot_lang(&self) -> &str {
        &self.pivot_lang
    }

    #[must_use]
    pub fn translation_enabled(&self) -> bool {
        self.translation_enabled
    }

    #[must_use]
    pub fn translator_base_url(&self) -> &str {
        &self.translator_base_url
    }

    #[must_use]
    pub fn translator_timeout(&self) -> Duration {
        self.translator_timeout
    }

    #[must_use]
    pub fn translator_connect_timeout(&self) -> Duration {
        CONNECT_TIMEOUT.min(self.translator_timeout)
    }

    #[must_use]
    pub fn translator_max_chars(&self) -> usize {
        self.translator_max_chars
    }

    #[must_use]
    pub fn gemini_api_key(&self) -> Option<&str> {
        self.gemini_api_key.as_deref()
    }

    #[must_use]
    pub fn gemini_base_url(&self) -> &str {
        &self.gemini_base_url
    }

    #[must_use]
    pub fn gemini_model(&self) -> &str {
        &self.gemini_model
    }

    #[must_use]
    pub fn gemini_timeout(&self) -> Duration {
        self.gemini_timeout
    }

    #[must_use]
    pub fn gemini_connect_timeout(&self) -> Duration {
        CONNECT_TIMEOUT.min(self.gemini_timeout)
    }

    #[must_use]
    pub fn override_threshold(&self) -> f64 {
        self.override_threshold
    }

    #[must_use]
    pub fn override_confidence(&self) -> f64 {
        self.override_confidence
    }
}

fn env_or(name: &'static str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_path(name: &'static str, default: &str) -> PathBuf {
    PathBuf::from(env_or(name, default))
}

fn parse_socket_addr(name: &'static str, default: &str) -> Result<SocketAddr, ConfigError> {
    let raw = env_or(name, default);
    raw.parse().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })
}

fn parse_language(name: &'static str, default: &str) -> Result<String, ConfigError> {
    let raw = env_or(name, default).trim().to_ascii_lowercase();
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_alphabetic() || c == '-') {
        return Err(ConfigError::Invalid {
            name,
            source: anyhow::anyhow!("invalid language code: {raw:?}"),
        });
    }
    Ok(raw)
}

fn parse_duration_ms(name: &'static str, default_ms: u64) -> Result<Duration, ConfigError> {
    let raw = env_or(name, &default_ms.to_string());
    let ms = raw.parse::<u64>().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })?;
    Ok(Duration::from_millis(ms))
}

fn parse_non_zero_usize(name: &'static str, default: usize) -> Result<usize, ConfigError> {
    let raw = env_or(name, &default.to_string());
    let parsed = raw.parse::<usize>().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })?;
    if parsed == 0 {
        return Err(ConfigError::Invalid {
            name,
            source: anyhow::anyhow!("value must be greater than zero"),
        });
    }
    Ok(parsed)
}

fn parse_probability(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    let raw = env_or(name, &default.to_string());
    let parsed = raw.parse::<f64>().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })?;
    if !(0.0..=1.0).contains(&parsed) {
        return Err(ConfigError::Invalid {
            name,
            source: anyhow::anyhow!("probability must be within [0, 1], got {parsed}"),
        });
    }
    Ok(parsed)
}

fn parse_bool(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    let raw = env_or(name, &default.to_string());
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            source: anyhow::anyhow!("invalid boolean value: {raw}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 15] = [
        "MOODBOT_HTTP_BIND",
        "MOODBOT_CLASSIFIER_PATH",
        "MOODBOT_VECTORIZER_PATH",
        "MOODBOT_SOURCE_LANG",
        "MOODBOT_PIVOT_LANG",
        "MOODBOT_TRANSLATION_ENABLED",
        "TRANSLATOR_BASE_URL",
        "TRANSLATOR_TIMEOUT_MS",
        "TRANSLATOR_MAX_CHARS",
        "GEMINI_API_KEY",
        "GEMINI_BASE_URL",
        "GEMINI_MODEL",
        "GEMINI_TIMEOUT_MS",
        "MOODBOT_OVERRIDE_THRESHOLD",
        "MOODBOT_OVERRIDE_CONFIDENCE",
    ];

    fn with_env<R>(overrides: &[(&str, &str)], check: impl FnOnce() -> R) -> R {
        let vars: Vec<(&str, Option<&str>)> = VARS
            .iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| *value);
                (*name, value)
            })
            .collect();
        temp_env::with_vars(vars, check)
    }

    #[test]
    fn from_env_uses_defaults() {
        let config = with_env(&[], Config::from_env).expect("config should load");

        assert_eq!(config.http_bind(), "0.0.0.0:5000".parse().expect("addr"));
        assert_eq!(config.classifier_path(), &PathBuf::from("models/classifier.json"));
        assert_eq!(
            config.vectorizer_path(),
            &PathBuf::from("models/tfidf_vectorizer.json")
        );
        assert_eq!(config.source_lang(), "es");
        assert_eq!(config.pivot_lang(), "en");
        assert!(config.translation_enabled());
        assert_eq!(config.translator_timeout(), Duration::from_millis(5000));
        assert_eq!(config.translator_max_chars(), 4999);
        assert!(config.gemini_api_key().is_none());
        assert_eq!(config.gemini_model(), "gemini-1.5-flash");
        assert_eq!(config.gemini_timeout(), Duration::from_millis(15000));
        assert!((config.override_threshold() - 0.85).abs() < f64::EPSILON);
        assert!((config.override_confidence() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn from_env_overrides_values() {
        let config = with_env(
            &[
                ("MOODBOT_HTTP_BIND", "127.0.0.1:8088"),
                ("MOODBOT_SOURCE_LANG", "PT"),
                ("MOODBOT_TRANSLATION_ENABLED", "off"),
                ("TRANSLATOR_MAX_CHARS", "100"),
                ("TRANSLATOR_TIMEOUT_MS", "1500"),
                ("GEMINI_API_KEY", " secret "),
                ("MOODBOT_OVERRIDE_THRESHOLD", "0.9"),
            ],
            Config::from_env,
        )
        .expect("config should load");

        assert_eq!(config.http_bind(), "127.0.0.1:8088".parse().expect("addr"));
        assert_eq!(config.source_lang(), "pt");
        assert!(!config.translation_enabled());
        assert_eq!(config.translator_max_chars(), 100);
        assert_eq!(config.translator_connect_timeout(), Duration::from_millis(1500));
        assert_eq!(config.gemini_api_key(), Some("secret"));
        assert!((config.override_threshold() - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn blank_gemini_key_disables_generation() {
        let config = with_env(&[("GEMINI_API_KEY", "  ")], Config::from_env).expect("config");
        assert!(config.gemini_api_key().is_none());
    }

    #[test]
    fn rejects_probability_out_of_range() {
        let error = with_env(&[("MOODBOT_OVERRIDE_CONFIDENCE", "1.5")], Config::from_env)
            .expect_err("out of range");
        assert!(matches!(
            error,
            ConfigError::Invalid {
                name: "MOODBOT_OVERRIDE_CONFIDENCE",
                ..
            }
        ));
    }

    #[test]
    fn rejects_zero_truncation_limit() {
        let error = with_env(&[("TRANSLATOR_MAX_CHARS", "0")], Config::from_env)
            .expect_err("zero limit");
        assert!(error.to_string().contains("TRANSLATOR_MAX_CHARS"));
    }

    #[test]
    fn rejects_invalid_boolean() {
        let error = with_env(&[("MOODBOT_TRANSLATION_ENABLED", "maybe")], Config::from_env)
            .expect_err("bad bool");
        assert!(error.to_string().contains("invalid boolean value"));
    }
}
