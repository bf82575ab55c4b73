use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app::AppState;

#[derive(Debug, Serialize)]
pub(crate) struct ServiceInfo {
    name: &'static str,
    version: &'static str,
    model: &'static str,
    features: [&'static str; 3],
    started_at: DateTime<Utc>,
}

pub(crate) async fn home(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: "MoodBot API",
        version: env!("CARGO_PKG_VERSION"),
        model: "Logistic Regression + Gemini AI",
        features: [
            "ML Classification",
            "Empathetic Responses",
            "Resource Recommendations",
        ],
        started_at: state.started_at(),
    })
}
