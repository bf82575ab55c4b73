mod common;

use moodbot::app::{ComponentRegistry, build_router};
use moodbot::healthcheck_with_port;
use moodbot::observability::Telemetry;
use moodbot::response::ResponseComposer;
use tokio::net::TcpListener;

#[tokio::test]
async fn healthcheck_succeeds_against_running_server() {
    let registry = ComponentRegistry::from_parts(
        common::english_pipeline(),
        ResponseComposer::new(None, "es"),
        Telemetry::new().expect("telemetry"),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    tokio::spawn(async move {
        axum::serve(listener, build_router(registry))
            .await
            .expect("serve");
    });

    healthcheck_with_port(port).await.expect("healthy");
}

#[tokio::test]
async fn healthcheck_fails_when_nothing_listens() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);

    assert!(healthcheck_with_port(port).await.is_err());
}
