// Tests for the HTTP surfaces: the console API served to host UIs, and the
// agent client talking to a local stand-in for the command service.

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::post,
    Json, Router,
};
use common::{harness, EchoExecutor, FakePlatform};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use voice_console::console::{ConsoleAction, ConsoleSnapshot};
use voice_console::error::{ConsoleError, GENERIC_SUBMISSION_ERROR};
use voice_console::submission::CommandExecutor;
use voice_console::{create_router, AppState, HttpCommandExecutor};

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let platform = FakePlatform::without_speech();
    let h = harness(&platform, Arc::new(EchoExecutor::default()));
    let app = create_router(AppState::new(h.handle.clone()));

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_get_console_returns_snapshot() {
    let platform = FakePlatform::without_speech();
    let h = harness(&platform, Arc::new(EchoExecutor::default()));
    let app = create_router(AppState::new(h.handle.clone()));

    let response = app
        .oneshot(Request::get("/console").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let snapshot: ConsoleSnapshot = serde_json::from_value(body_json(response).await).unwrap();
    assert!(!snapshot.is_speech_supported);
    assert!(snapshot.voice_feedback_enabled);
    assert_eq!(snapshot.command_text, "");
}

#[tokio::test]
async fn test_submit_with_text_runs_command() {
    let platform = FakePlatform::full();
    let executor = Arc::new(EchoExecutor::default());
    let h = harness(&platform, executor.clone());
    let handle = h.handle.clone();
    let mut updates = handle.subscribe();
    let task = h.controller.spawn();
    let app = create_router(AppState::new(handle.clone()));

    let response = app
        .oneshot(
            Request::post("/console/submit")
                .header("content-type", "application/json")
                .body(Body::from(json!({"text": "Vendí 3 unidades del SKU AZUL-01"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    tokio::time::timeout(Duration::from_secs(5), async {
        while updates.borrow_and_update().last_result.is_none() {
            updates.changed().await.unwrap();
        }
    })
    .await
    .expect("result within 5s");

    assert_eq!(executor.calls(), vec!["Vendí 3 unidades del SKU AZUL-01"]);

    handle.send(ConsoleAction::Shutdown).await.unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn test_actions_after_shutdown_are_unavailable() {
    let platform = FakePlatform::full();
    let h = harness(&platform, Arc::new(EchoExecutor::default()));
    let handle = h.handle.clone();
    let task = h.controller.spawn();

    handle.send(ConsoleAction::Shutdown).await.unwrap();
    task.await.unwrap();

    let app = create_router(AppState::new(handle));
    let response = app
        .oneshot(Request::post("/console/listen").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// ============================================================================
// Agent client
// ============================================================================

/// Serve a stand-in agent on an ephemeral port and return its base URL
async fn spawn_agent(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_http_executor_returns_result() {
    let app = Router::new().route(
        "/agent",
        post(|Json(body): Json<Value>| async move {
            Json(json!({
                "action": "sale",
                "sku": "AZUL-01",
                "quantity": 7,
                "message": format!("Recibido: {}", body["command"].as_str().unwrap_or_default()),
            }))
        }),
    );
    let base = spawn_agent(app).await;
    let executor = HttpCommandExecutor::new(&base, Duration::from_secs(5)).unwrap();

    let result = executor.execute("Vendí 3 unidades del SKU AZUL-01").await.unwrap();

    assert_eq!(
        result.message.as_deref(),
        Some("Recibido: Vendí 3 unidades del SKU AZUL-01")
    );
    assert_eq!(result.raw["quantity"], 7);
}

#[tokio::test]
async fn test_http_executor_surfaces_detail() {
    let app = Router::new().route(
        "/agent",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"detail": "No pude entender el comando. Prueba con una frase más específica."})),
            )
        }),
    );
    let base = spawn_agent(app).await;
    let executor = HttpCommandExecutor::new(&base, Duration::from_secs(5)).unwrap();

    let err = executor.execute("hola").await.unwrap_err();

    match err.downcast_ref::<ConsoleError>() {
        Some(ConsoleError::Rejected(detail)) => assert_eq!(
            detail,
            "No pude entender el comando. Prueba con una frase más específica."
        ),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_http_executor_unreachable_is_transport_error() {
    // Bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let executor =
        HttpCommandExecutor::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
    let err = executor.execute("hola").await.unwrap_err();

    let console_err = err.downcast_ref::<ConsoleError>().expect("typed error");
    assert!(matches!(console_err, ConsoleError::Transport(_)));
    assert_eq!(console_err.user_message(), GENERIC_SUBMISSION_ERROR);
}
