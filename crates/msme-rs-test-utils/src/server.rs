use chrono::TimeDelta;
use msme_rs_chatlog::{ChatLogStore, MemoryChatLogStore};
use msme_rs_server::{AppState, TokenSessionGate, build_router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const TEST_ADMIN_USER: &str = "admin";
pub const TEST_ADMIN_PASSWORD: &str = "test-pass";

/// Echo-engine state over the given store with the test admin credentials.
pub fn test_state(store: Arc<dyn ChatLogStore>) -> AppState {
    let gate = Arc::new(TokenSessionGate::new(
        TEST_ADMIN_USER,
        TEST_ADMIN_PASSWORD,
        TimeDelta::hours(1),
    ));
    AppState::new(store, gate)
}

/// In-memory state, for tests that do not care about persistence.
pub fn memory_state() -> AppState {
    test_state(Arc::new(MemoryChatLogStore::new()))
}

/// Serve the router on an ephemeral port and return its base URL.
pub async fn spawn_app(state: AppState) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let app = build_router(state);
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    (format!("http://{addr}"), handle)
}
