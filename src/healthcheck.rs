use std::{net::SocketAddr, time::Duration};

use thiserror::Error;

const DEFAULT_HTTP_PORT: u16 = 5000;

#[derive(Debug, Error)]
#[error("healthcheck failed: {0}")]
pub struct HealthcheckError(String);

/// Probes `/health` on the port the server is configured to bind.
///
/// # Errors
/// Returns an error when the endpoint is unreachable or not successful.
pub async fn healthcheck() -> Result<(), HealthcheckError> {
    let port = std::env::var("MOODBOT_HTTP_BIND")
        .ok()
        .and_then(|bind| bind.parse::<SocketAddr>().ok())
        .map_or(DEFAULT_HTTP_PORT, |addr| addr.port());
    healthcheck_with_port(port).await
}

/// # Errors
/// Returns an error when the endpoint is unreachable or not successful.
pub async fn healthcheck_with_port(port: u16) -> Result<(), HealthcheckError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
        .map_err(|e| HealthcheckError(format!("failed to create HTTP client: {e}")))?;

    let url = format!("http://127.0.0.1:{port}/health");
    let resp = client
        .get(&url)
        .send()
        .await
        .map_err(|e| HealthcheckError(format!("request failed: {e}")))?;

    if resp.status().is_success() {
        Ok(())
    } else {
        Err(HealthcheckError(format!(
            "health endpoint returned status: {}",
            resp.status()
        )))
    }
}
