//! Prometheus metrics for the classification service.
use prometheus::{
    Histogram, IntCounter, IntCounterVec, Registry, register_histogram_with_registry,
    register_int_counter_vec_with_registry, register_int_counter_with_registry,
};

use crate::classification::{Decision, MoodLabel, TranslationStatus};

#[derive(Debug, Clone)]
pub struct Metrics {
    pub predictions: IntCounterVec,
    pub short_circuits: IntCounter,
    pub overrides: IntCounter,
    pub translation_failures: IntCounter,
    pub generation_fallbacks: IntCounter,
    pub pipeline_failures: IntCounter,
    pub inference_duration: Histogram,
}

impl Metrics {
    /// # Errors
    /// Returns an error when a metric with the same name is already registered.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let metrics = Self {
            predictions: register_int_counter_vec_with_registry!(
                "moodbot_predictions_total",
                "Final predictions by label",
                &["label"],
                registry
            )?,
            short_circuits: register_int_counter_with_registry!(
                "moodbot_short_circuits_total",
                "Messages answered without consulting the classifier",
                registry
            )?,
            overrides: register_int_counter_with_registry!(
                "moodbot_overrides_total",
                "Predictions downgraded to Neutral by the positive-affect override",
                registry
            )?,
            translation_failures: register_int_counter_with_registry!(
                "moodbot_translation_failures_total",
                "Translation attempts that fell back to the original text",
                registry
            )?,
            generation_fallbacks: register_int_counter_with_registry!(
                "moodbot_generation_fallbacks_total",
                "Generated replies replaced by the fixed fallback after an error",
                registry
            )?,
            pipeline_failures: register_int_counter_with_registry!(
                "moodbot_pipeline_failures_total",
                "Classification requests that failed",
                registry
            )?,
            inference_duration: register_histogram_with_registry!(
                "moodbot_inference_duration_seconds",
                "Decision pipeline duration in seconds",
                vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0],
                registry
            )?,
        };
        for label in MoodLabel::ALL {
            metrics.predictions.with_label_values(&[label.as_str()]);
        }
        Ok(metrics)
    }

    pub fn record_decision(&self, decision: &Decision) {
        self.predictions
            .with_label_values(&[decision.prediction.label.as_str()])
            .inc();
        if decision.is_short_circuit() {
            self.short_circuits.inc();
        }
        if decision.overridden() {
            self.overrides.inc();
        }
        if decision.translation == TranslationStatus::Failed {
            self.translation_failures.inc();
        }
    }
}
