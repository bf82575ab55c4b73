use std::time::Instant;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, error, info_span, warn};
use uuid::Uuid;

use crate::{
    app::AppState,
    classification::{MoodLabel, PipelineError},
    response::ReplySource,
};

#[derive(Debug, Deserialize)]
pub(crate) struct PredictRequest {
    message: String,
}

#[derive(Debug, Serialize)]
struct PredictionBody {
    label: MoodLabel,
    confidence: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct PredictResponse {
    success: bool,
    request_id: Uuid,
    prediction: PredictionBody,
    short_circuit: bool,
    overridden: bool,
    response: String,
    original_message: String,
    generator_used: bool,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

#[derive(Debug)]
pub(crate) enum PredictError {
    MissingMessage,
    ModelsUnavailable,
    Internal(String),
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MissingMessage => (StatusCode::BAD_REQUEST, "Missing message".to_string()),
            Self::ModelsUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Models not loaded".to_string(),
            ),
            Self::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        let body = ErrorBody {
            success: false,
            error: message,
        };
        (status, Json(body)).into_response()
    }
}

pub(crate) async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, PredictError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection, "rejected predict request");
        PredictError::MissingMessage
    })?;

    let request_id = Uuid::new_v4();
    let span = info_span!("predict", %request_id);
    handle(&state, request_id, request.message)
        .instrument(span)
        .await
}

async fn handle(
    state: &AppState,
    request_id: Uuid,
    message: String,
) -> Result<Json<PredictResponse>, PredictError> {
    let metrics = state.telemetry().metrics();

    let started = Instant::now();
    let outcome = state.pipeline().classify(&message).await;
    metrics
        .inference_duration
        .observe(started.elapsed().as_secs_f64());

    let decision = outcome.map_err(|err| {
        metrics.pipeline_failures.inc();
        match err {
            PipelineError::ModelsUnavailable { reason } => {
                warn!(reason = %reason, "prediction rejected: models unavailable");
                PredictError::ModelsUnavailable
            }
            PipelineError::Internal(source) => {
                error!(error = %source, "prediction failed");
                PredictError::Internal(source.to_string())
            }
        }
    })?;
    metrics.record_decision(&decision);

    let reply = state.composer().compose(&message, &decision).await;
    if reply.source == ReplySource::FallbackAfterError {
        metrics.generation_fallbacks.inc();
    }

    Ok(Json(PredictResponse {
        success: true,
        request_id,
        prediction: PredictionBody {
            label: decision.prediction.label,
            confidence: decision.prediction.rounded_confidence(),
        },
        short_circuit: decision.is_short_circuit(),
        overridden: decision.overridden(),
        generator_used: reply.generator_used(),
        response: reply.text,
        original_message: message,
    }))
}
