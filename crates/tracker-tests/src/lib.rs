//! Integration tests for the Trade Tracker API.
//!
//! Each test spawns the backend in-process on an ephemeral port with a
//! round-the-clock trading session, so no external services are needed.

use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracker_client::{ClientConfig, TrackerClient};
use trade_tracker_backend::api::create_router;
use trade_tracker_backend::api::middleware::rate_limit_middleware;
use trade_tracker_backend::config::Config;
use trade_tracker_backend::state::AppState;

/// Server configuration used for tests. The session never closes so trading
/// operations are accepted regardless of when the suite runs.
const TEST_CONFIG: &str = r#"
[market]
open = "00:00"
close = "24:00"
weekdays_only = false

[settlement]
tolerance_bps = 500
price_ttl_secs = 300
"#;

/// A backend instance running in-process.
pub struct TestServer {
    /// Client pointed at the server.
    pub client: TrackerClient,
    /// Shared application state, for direct inspection.
    pub state: Arc<AppState>,
    /// Root URL of the server, for raw HTTP requests.
    pub base_url: String,
}

fn test_state() -> Arc<AppState> {
    let config = Config::parse(TEST_CONFIG).expect("test config is valid");
    Arc::new(AppState::from_config(config, None).expect("state builds"))
}

async fn serve(app: Router, state: Arc<AppState>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("ephemeral port available");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let base_url = format!("http://{}", addr);
    let client = TrackerClient::new(ClientConfig {
        base_url: base_url.clone(),
        timeout: std::time::Duration::from_secs(10),
    })
    .expect("client builds");

    TestServer {
        client,
        state,
        base_url,
    }
}

/// Spawns the backend on an ephemeral port and returns a connected client.
///
/// # Panics
/// Panics if the server cannot be started.
pub async fn spawn_test_server() -> TestServer {
    let state = test_state();
    let app = create_router(Arc::clone(&state));
    serve(app, state).await
}

/// Spawns the backend with the rate-limit middleware layered on, as the
/// production binary does.
///
/// # Panics
/// Panics if the server cannot be started.
pub async fn spawn_rate_limited_server() -> TestServer {
    let state = test_state();
    let app = create_router(Arc::clone(&state)).layer(axum::middleware::from_fn_with_state(
        Arc::clone(&state),
        rate_limit_middleware,
    ));
    serve(app, state).await
}

/// Generates a unique user id to avoid conflicts between tests.
#[must_use]
pub fn unique_user(prefix: &str) -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);

    format!("{}_{}_{}", prefix, ts, counter)
}
