use axum::{Json, Router, http::StatusCode, routing::post};
use msme_rs_server::{ChatEngine, ChatEngineError, ChatPrompt, OllamaEngine};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::time::Duration;
use tokio::net::TcpListener;

async fn fake_ollama(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

fn prompt() -> ChatPrompt {
    ChatPrompt {
        message: "What is Udyam?".to_string(),
        model: "phi3:3.8b".to_string(),
        feature: "lora".to_string(),
        version: "default".to_string(),
    }
}

#[tokio::test]
async fn sends_non_streaming_chat_and_reads_message_content() {
    let app = Router::new().route(
        "/api/chat",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["stream"], json!(false));
            assert_eq!(body["model"], json!("phi3:3.8b"));
            assert_eq!(body["messages"][0]["role"], json!("system"));
            assert_eq!(body["messages"][1]["content"], json!("What is Udyam?"));
            Json(json!({ "message": { "role": "assistant", "content": "A registration scheme." } }))
        }),
    );
    let base = fake_ollama(app).await;
    let engine = OllamaEngine::new(&base, Duration::from_secs(5)).expect("engine");
    let reply = engine.reply(&prompt()).await.expect("reply");
    assert_eq!(reply, "A registration scheme.");
}

#[tokio::test]
async fn upstream_error_status_is_reported() {
    let app = Router::new().route(
        "/api/chat",
        post(|| async { (StatusCode::NOT_FOUND, "model 'phi3:3.8b' not found") }),
    );
    let base = fake_ollama(app).await;
    let engine = OllamaEngine::new(&base, Duration::from_secs(5)).expect("engine");
    let err = engine.reply(&prompt()).await.unwrap_err();
    assert!(matches!(err, ChatEngineError::Status { status: 404, .. }));
    assert_eq!(
        err.to_string(),
        "Ollama HTTP Error: 404 - model 'phi3:3.8b' not found"
    );
}

#[tokio::test]
async fn unreachable_upstream_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let engine =
        OllamaEngine::new(&format!("http://{addr}"), Duration::from_secs(2)).expect("engine");
    let err = engine.reply(&prompt()).await.unwrap_err();
    assert!(err.to_string().starts_with("Ollama Error: "));
}
