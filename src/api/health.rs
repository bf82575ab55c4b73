use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::warn;

use crate::app::AppState;

#[derive(Debug, Serialize)]
pub(crate) struct ServiceHealth {
    status: &'static str,
    models_loaded: bool,
    generator_available: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct HealthReport {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl HealthReport {
    fn ready() -> Self {
        Self {
            status: "ready",
            detail: None,
        }
    }

    fn not_ready(detail: impl Into<String>) -> Self {
        Self {
            status: "not_ready",
            detail: Some(detail.into()),
        }
    }
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<ServiceHealth> {
    Json(ServiceHealth {
        status: "healthy",
        models_loaded: state.pipeline().models().is_ready(),
        generator_available: state.composer().has_generator(),
    })
}

pub(crate) async fn ready(
    State(state): State<AppState>,
) -> Result<Json<HealthReport>, (StatusCode, Json<HealthReport>)> {
    let models = state.pipeline().models();
    state.telemetry().record_ready_probe(models.is_ready());

    if let Some(reason) = models.unavailable_reason() {
        warn!(reason, "readiness check failed: models unavailable");
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthReport::not_ready(format!("models: {reason}"))),
        ));
    }

    Ok(Json(HealthReport::ready()))
}

pub(crate) async fn live(State(state): State<AppState>) -> Json<HealthReport> {
    state.telemetry().record_live_probe();
    Json(HealthReport {
        status: "live",
        detail: None,
    })
}
