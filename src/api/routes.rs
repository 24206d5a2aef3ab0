//! Route configuration.

use crate::api::handlers;
use crate::state::AppState;
use axum::Router;
use axum::routing::{delete, get, post};
use std::sync::Arc;

/// Creates the API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Statistics
        .route("/api/v1/stats", get(handlers::get_global_stats))
        .route("/api/v1/leaderboard", get(handlers::get_leaderboard))
        .route(
            "/api/v1/users/{user_id}/stats",
            get(handlers::get_user_stats),
        )
        // Trades
        .route(
            "/api/v1/trades",
            post(handlers::open_trade).get(handlers::list_trades),
        )
        .route("/api/v1/trades/{trade_id}", get(handlers::get_trade))
        .route(
            "/api/v1/trades/{trade_id}/fills",
            post(handlers::close_fill).get(handlers::list_fills),
        )
        // Market session & prices
        .route("/api/v1/market/session", get(handlers::get_session_status))
        .route(
            "/api/v1/prices",
            get(handlers::get_all_prices).post(handlers::insert_price),
        )
        .route("/api/v1/prices/{symbol}", get(handlers::get_price))
        // Follows
        .route("/api/v1/follows", post(handlers::create_follow))
        .route("/api/v1/follows/{user_id}", get(handlers::list_follows))
        .route(
            "/api/v1/follows/{user_id}/notifications",
            get(handlers::list_notifications),
        )
        // Authentication
        .route(
            "/api/v1/auth/keys",
            post(handlers::create_api_key).get(handlers::list_api_keys),
        )
        .route(
            "/api/v1/auth/keys/{key_id}",
            delete(handlers::delete_api_key),
        )
        .with_state(state)
}
