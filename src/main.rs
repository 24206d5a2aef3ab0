//! Trade Tracker Backend Server
//!
//! REST API server for tracking options-trading performance.

use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trade_tracker_backend::api::create_router;
use trade_tracker_backend::api::middleware::rate_limit_middleware;
use trade_tracker_backend::config::Config;
use trade_tracker_backend::db::DatabasePool;
use trade_tracker_backend::state::AppState;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use trade_tracker_backend::models::{
    ApiKeyInfo, ApiKeysListResponse, CloseFillRequest, CloseFillResponse, CreateApiKeyRequest,
    CreateApiKeyResponse, CreateFollowRequest, FillInfo, FillsListResponse, FollowListResponse,
    FollowPurchaseInfo, GlobalStatsResponse, HealthResponse, InsertPriceRequest, Instrument,
    LeaderboardEntry, LeaderboardResponse, NotificationInfo, NotificationsResponse,
    OpenTradeRequest, OpenTradeResponse, PricesListResponse, ReferencePriceInfo,
    SessionStatusResponse, TradeInfo, TradeListResponse, UserStatsResponse,
};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        trade_tracker_backend::api::handlers::health_check,
        trade_tracker_backend::api::handlers::get_global_stats,
        trade_tracker_backend::api::handlers::open_trade,
        trade_tracker_backend::api::handlers::list_trades,
        trade_tracker_backend::api::handlers::get_trade,
        trade_tracker_backend::api::handlers::close_fill,
        trade_tracker_backend::api::handlers::list_fills,
        trade_tracker_backend::api::handlers::get_user_stats,
        trade_tracker_backend::api::handlers::get_leaderboard,
        trade_tracker_backend::api::handlers::get_session_status,
        trade_tracker_backend::api::handlers::get_all_prices,
        trade_tracker_backend::api::handlers::get_price,
        trade_tracker_backend::api::handlers::insert_price,
        trade_tracker_backend::api::handlers::create_follow,
        trade_tracker_backend::api::handlers::list_follows,
        trade_tracker_backend::api::handlers::list_notifications,
        trade_tracker_backend::api::handlers::create_api_key,
        trade_tracker_backend::api::handlers::list_api_keys,
        trade_tracker_backend::api::handlers::delete_api_key,
    ),
    components(
        schemas(
            HealthResponse,
            GlobalStatsResponse,
            Instrument,
            TradeInfo,
            FillInfo,
            OpenTradeRequest,
            OpenTradeResponse,
            CloseFillRequest,
            CloseFillResponse,
            TradeListResponse,
            FillsListResponse,
            UserStatsResponse,
            LeaderboardEntry,
            LeaderboardResponse,
            SessionStatusResponse,
            ReferencePriceInfo,
            InsertPriceRequest,
            PricesListResponse,
            CreateFollowRequest,
            FollowPurchaseInfo,
            FollowListResponse,
            NotificationInfo,
            NotificationsResponse,
            ApiKeyInfo,
            CreateApiKeyRequest,
            CreateApiKeyResponse,
            ApiKeysListResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Statistics", description = "User statistics and leaderboard"),
        (name = "Trades", description = "Trade lifecycle and fills"),
        (name = "Market", description = "Session status and reference prices"),
        (name = "Follows", description = "Follow purchases and notifications"),
        (name = "Authentication", description = "API key management"),
    ),
    info(
        title = "Trade Tracker API",
        version = "0.2.0",
        description = "REST API for tracking options-trading performance",
        license(name = "MIT"),
        contact(name = "Joaquin Bejar", email = "jb@taunais.com")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from TRACKER_CONFIG if set, defaults otherwise
    let config = match std::env::var("TRACKER_CONFIG") {
        Ok(path) => {
            info!("Loading configuration from {}", path);
            Config::load(&path)?
        }
        Err(_) => Config::default(),
    };

    // Connect the optional audit database
    let db = match std::env::var("DATABASE_URL") {
        Ok(url) => match DatabasePool::new(&url, &config.database).await {
            Ok(pool) => {
                pool.run_migrations().await?;
                info!("Audit database connected");
                Some(pool)
            }
            Err(err) => {
                warn!("Audit database unavailable, continuing without it: {}", err);
                None
            }
        },
        Err(_) => None,
    };

    let host = config.server.host.clone();
    let port = config.server.port;

    // Create application state
    let state = Arc::new(AppState::from_config(config, db)?);

    // Start the simulated price feed when enabled
    if let Some(simulator) = state.price_simulator.clone() {
        tokio::spawn(simulator.run());
        info!("Simulated price feed started");
    }

    info!("Starting Trade Tracker Backend on {}:{}", host, port);
    info!(
        "Swagger UI available at http://{}:{}/swagger-ui/",
        host, port
    );

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router
    let app = create_router(Arc::clone(&state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(axum::middleware::from_fn_with_state(
            state,
            rate_limit_middleware,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start the server
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
