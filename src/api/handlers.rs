//! API request handlers.

use crate::db;
use crate::error::ApiError;
use crate::models::{
    ApiKeysListResponse, CloseFillRequest, CloseFillResponse, CreateApiKeyRequest,
    CreateApiKeyResponse, CreateFollowRequest, FillInfo, FillsListResponse, FollowListResponse,
    FollowPurchaseInfo, GlobalStatsResponse, HealthResponse, InsertPriceRequest, Instrument,
    LeaderboardQuery, LeaderboardResponse, NotificationsResponse, OpenTradeRequest,
    OpenTradeResponse, PricesListResponse, ReferencePriceInfo, SessionStatusResponse, TradeInfo,
    TradeListQuery, TradeListResponse, TradeStatus, UserStatsResponse,
};
use crate::settlement;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Default rate limit for newly created API keys.
const DEFAULT_KEY_RATE_LIMIT: u32 = 1000;

/// Looks up a fresh reference price or fails the operation.
fn fresh_reference(
    state: &AppState,
    symbol: &str,
    now: DateTime<Utc>,
) -> Result<Decimal, ApiError> {
    state
        .prices
        .get_fresh(symbol, now)
        .ok_or_else(|| ApiError::NoReferencePrice(symbol.to_string()))
}

/// Fails the operation when the market session is closed.
fn require_session_open(state: &AppState, now: DateTime<Utc>) -> Result<(), ApiError> {
    if state.calendar.is_open(now) {
        Ok(())
    } else {
        Err(ApiError::MarketClosed)
    }
}

/// Persists the current trade state to the audit sink, best effort.
fn persist_trade(state: &AppState, trade: &TradeInfo) {
    if let Some(pool) = state.db.clone() {
        let trade = trade.clone();
        tokio::spawn(async move {
            if let Err(err) = db::upsert_trade(pool.pool(), &trade).await {
                warn!("Failed to persist trade {}: {}", trade.trade_id, err);
            }
        });
    }
}

/// Persists a fill to the audit sink, best effort.
fn persist_fill(state: &AppState, trade_id: Uuid, fill: &FillInfo) {
    if let Some(pool) = state.db.clone() {
        let fill = fill.clone();
        tokio::spawn(async move {
            if let Err(err) = db::insert_fill(pool.pool(), trade_id, &fill).await {
                warn!("Failed to persist fill {}: {}", fill.fill_id, err);
            }
        });
    }
}

// ============================================================================
// Health Check
// ============================================================================

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Global Statistics
// ============================================================================

/// Get global statistics.
#[utoipa::path(
    get,
    path = "/api/v1/stats",
    responses(
        (status = 200, description = "Global statistics", body = GlobalStatsResponse)
    ),
    tag = "Statistics"
)]
pub async fn get_global_stats(State(state): State<Arc<AppState>>) -> Json<GlobalStatsResponse> {
    let counts = state.ledger.counts();
    Json(GlobalStatsResponse {
        total_trades: counts.total_trades,
        open_trades: counts.open_trades,
        closed_trades: counts.closed_trades,
        rejected_trades: counts.rejected_trades,
        total_fills: counts.total_fills,
        user_count: counts.user_count,
    })
}

// ============================================================================
// Trades
// ============================================================================

/// Open a trade.
///
/// The entry price is validated against the fresh reference price for the
/// underlying; an out-of-band price stores the trade as `rejected` rather
/// than failing, preserving the audit trail.
#[utoipa::path(
    post,
    path = "/api/v1/trades",
    request_body = OpenTradeRequest,
    responses(
        (status = 200, description = "Trade opened or stored as rejected", body = OpenTradeResponse),
        (status = 409, description = "Market closed"),
        (status = 422, description = "No fresh reference price")
    ),
    tag = "Trades"
)]
pub async fn open_trade(
    State(state): State<Arc<AppState>>,
    Json(request): Json<OpenTradeRequest>,
) -> Result<Json<OpenTradeResponse>, ApiError> {
    if request.user_id.trim().is_empty() {
        return Err(ApiError::InvalidRequest("user_id is required".to_string()));
    }
    if request.underlying.trim().is_empty() {
        return Err(ApiError::InvalidRequest(
            "underlying is required".to_string(),
        ));
    }

    let now = Utc::now();
    require_session_open(&state, now)?;
    let reference = fresh_reference(&state, &request.underlying, now)?;

    let instrument = Instrument {
        underlying: request.underlying.clone(),
        strike: request.strike,
        option_type: request.option_type,
        expiry: request.expiry,
    };

    let trade = state.ledger.open_trade(
        &request.user_id,
        instrument,
        request.price,
        request.contracts,
        reference,
        now,
    )?;

    if trade.status == TradeStatus::Open {
        state.follows.notify_trade_opened(&trade, now);
    }
    persist_trade(&state, &trade);

    let message = match trade.status {
        TradeStatus::Open => format!("Trade opened: {} x{}", trade.instrument.symbol(), trade.contracts),
        _ => format!(
            "Trade rejected: entry price {} outside tolerance of reference {}",
            trade.entry_price, reference
        ),
    };

    Ok(Json(OpenTradeResponse {
        trade_id: trade.trade_id,
        status: trade.status,
        reference_price: reference,
        message,
    }))
}

/// List trades with filters and pagination.
#[utoipa::path(
    get,
    path = "/api/v1/trades",
    params(
        ("user_id" = Option<String>, Query, description = "Filter by owning user"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("outcome" = Option<String>, Query, description = "Filter by outcome"),
        ("underlying" = Option<String>, Query, description = "Filter by underlying"),
        ("limit" = Option<u32>, Query, description = "Page size (default 100)"),
        ("offset" = Option<u32>, Query, description = "Page offset")
    ),
    responses(
        (status = 200, description = "Matching trades", body = TradeListResponse)
    ),
    tag = "Trades"
)]
pub async fn list_trades(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TradeListQuery>,
) -> Json<TradeListResponse> {
    let (trades, total) = state.ledger.list_trades(&query);
    Json(TradeListResponse {
        trades,
        total,
        limit: query.limit,
        offset: query.offset,
    })
}

/// Get one trade including its fills.
#[utoipa::path(
    get,
    path = "/api/v1/trades/{trade_id}",
    params(
        ("trade_id" = Uuid, Path, description = "Trade identifier")
    ),
    responses(
        (status = 200, description = "Trade detail", body = TradeInfo),
        (status = 404, description = "Trade not found")
    ),
    tag = "Trades"
)]
pub async fn get_trade(
    State(state): State<Arc<AppState>>,
    Path(trade_id): Path<Uuid>,
) -> Result<Json<TradeInfo>, ApiError> {
    state
        .ledger
        .get_trade(trade_id)
        .map(Json)
        .ok_or(ApiError::TradeNotFound(trade_id))
}

/// Submit a closing fill against an open trade.
#[utoipa::path(
    post,
    path = "/api/v1/trades/{trade_id}/fills",
    params(
        ("trade_id" = Uuid, Path, description = "Trade identifier")
    ),
    request_body = CloseFillRequest,
    responses(
        (status = 200, description = "Fill applied", body = CloseFillResponse),
        (status = 404, description = "Trade not found"),
        (status = 409, description = "Trade not open, oversell, or market closed"),
        (status = 422, description = "Price outside tolerance band")
    ),
    tag = "Trades"
)]
pub async fn close_fill(
    State(state): State<Arc<AppState>>,
    Path(trade_id): Path<Uuid>,
    Json(request): Json<CloseFillRequest>,
) -> Result<Json<CloseFillResponse>, ApiError> {
    let now = Utc::now();
    require_session_open(&state, now)?;

    let trade = state
        .ledger
        .get_trade(trade_id)
        .ok_or(ApiError::TradeNotFound(trade_id))?;
    let reference = fresh_reference(&state, &trade.instrument.underlying, now)?;

    let (trade, fill) = state.ledger.close_fill(
        trade_id,
        request.contracts,
        request.price,
        reference,
        now,
    )?;

    persist_trade(&state, &trade);
    persist_fill(&state, trade_id, &fill);

    let message = match trade.status {
        TradeStatus::Closed => format!(
            "Trade closed with net P&L {}",
            trade.net_pnl.unwrap_or_default()
        ),
        _ => format!("{} contracts remaining", trade.remaining_contracts),
    };

    Ok(Json(CloseFillResponse {
        trade_id,
        fill_id: fill.fill_id,
        status: trade.status,
        remaining_contracts: trade.remaining_contracts,
        net_pnl: trade.net_pnl,
        outcome: trade.outcome,
        message,
    }))
}

/// List fills for one trade.
#[utoipa::path(
    get,
    path = "/api/v1/trades/{trade_id}/fills",
    params(
        ("trade_id" = Uuid, Path, description = "Trade identifier")
    ),
    responses(
        (status = 200, description = "Fills, oldest first", body = FillsListResponse),
        (status = 404, description = "Trade not found")
    ),
    tag = "Trades"
)]
pub async fn list_fills(
    State(state): State<Arc<AppState>>,
    Path(trade_id): Path<Uuid>,
) -> Result<Json<FillsListResponse>, ApiError> {
    let trade = state
        .ledger
        .get_trade(trade_id)
        .ok_or(ApiError::TradeNotFound(trade_id))?;

    Ok(Json(FillsListResponse {
        trade_id,
        fills: trade.fills,
    }))
}

// ============================================================================
// Stats & Leaderboard
// ============================================================================

/// Per-user performance statistics.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/stats",
    params(
        ("user_id" = String, Path, description = "User identifier")
    ),
    responses(
        (status = 200, description = "Aggregated statistics", body = UserStatsResponse)
    ),
    tag = "Statistics"
)]
pub async fn get_user_stats(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Json<UserStatsResponse> {
    let trades = state.ledger.trades_for_user(&user_id);
    Json(settlement::user_stats(&user_id, &trades))
}

/// Company leaderboard ranked by net P&L.
#[utoipa::path(
    get,
    path = "/api/v1/leaderboard",
    params(
        ("limit" = Option<u32>, Query, description = "Maximum entries (default 25)")
    ),
    responses(
        (status = 200, description = "Ranked leaderboard", body = LeaderboardResponse)
    ),
    tag = "Statistics"
)]
pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LeaderboardQuery>,
) -> Json<LeaderboardResponse> {
    let trades = state.ledger.all_trades();
    Json(LeaderboardResponse {
        entries: settlement::leaderboard(&trades, query.limit as usize),
    })
}

// ============================================================================
// Market Session & Prices
// ============================================================================

/// Current market session status.
#[utoipa::path(
    get,
    path = "/api/v1/market/session",
    responses(
        (status = 200, description = "Session status", body = SessionStatusResponse)
    ),
    tag = "Market"
)]
pub async fn get_session_status(State(state): State<Arc<AppState>>) -> Json<SessionStatusResponse> {
    let now = Utc::now();
    let bounds = state.calendar.session_bounds(now);
    Json(SessionStatusResponse {
        open: state.calendar.is_open(now),
        timezone: state.calendar.timezone_name().to_string(),
        opens_at: bounds.map(|(open, _)| open),
        closes_at: bounds.map(|(_, close)| close),
    })
}

/// All known reference prices.
#[utoipa::path(
    get,
    path = "/api/v1/prices",
    responses(
        (status = 200, description = "Known reference prices", body = PricesListResponse)
    ),
    tag = "Market"
)]
pub async fn get_all_prices(State(state): State<Arc<AppState>>) -> Json<PricesListResponse> {
    Json(PricesListResponse {
        prices: state.prices.all(Utc::now()),
    })
}

/// Latest reference price for a symbol.
#[utoipa::path(
    get,
    path = "/api/v1/prices/{symbol}",
    params(
        ("symbol" = String, Path, description = "Underlying symbol")
    ),
    responses(
        (status = 200, description = "Latest reference price", body = ReferencePriceInfo),
        (status = 404, description = "Unknown symbol")
    ),
    tag = "Market"
)]
pub async fn get_price(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Json<ReferencePriceInfo>, ApiError> {
    state
        .prices
        .get(&symbol, Utc::now())
        .map(Json)
        .ok_or(ApiError::NotFound(symbol))
}

/// Ingest a reference price.
#[utoipa::path(
    post,
    path = "/api/v1/prices",
    request_body = InsertPriceRequest,
    responses(
        (status = 200, description = "Price recorded", body = ReferencePriceInfo),
        (status = 400, description = "Invalid price")
    ),
    tag = "Market"
)]
pub async fn insert_price(
    State(state): State<Arc<AppState>>,
    Json(request): Json<InsertPriceRequest>,
) -> Result<Json<ReferencePriceInfo>, ApiError> {
    if request.symbol.trim().is_empty() {
        return Err(ApiError::InvalidRequest("symbol is required".to_string()));
    }
    if request.price <= Decimal::ZERO {
        return Err(ApiError::InvalidRequest(
            "price must be positive".to_string(),
        ));
    }

    let now = Utc::now();
    state.prices.set_price(&request.symbol, request.price, now);
    Ok(Json(ReferencePriceInfo {
        symbol: request.symbol,
        price: request.price,
        updated_at: now,
        fresh: true,
    }))
}

// ============================================================================
// Follow Entitlements
// ============================================================================

/// Create a follow purchase.
#[utoipa::path(
    post,
    path = "/api/v1/follows",
    request_body = CreateFollowRequest,
    responses(
        (status = 200, description = "Purchase created", body = FollowPurchaseInfo),
        (status = 409, description = "Duplicate active purchase")
    ),
    tag = "Follows"
)]
pub async fn create_follow(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateFollowRequest>,
) -> Result<Json<FollowPurchaseInfo>, ApiError> {
    if request.follower_id.trim().is_empty() || request.leader_id.trim().is_empty() {
        return Err(ApiError::InvalidRequest(
            "follower_id and leader_id are required".to_string(),
        ));
    }

    let now = Utc::now();
    let quota = request
        .notification_quota
        .unwrap_or(state.config.follows.default_quota);
    let duration_days = request
        .duration_days
        .unwrap_or(state.config.follows.default_duration_days);
    if duration_days <= 0 {
        return Err(ApiError::InvalidRequest(
            "duration_days must be positive".to_string(),
        ));
    }

    let purchase = state.follows.create(
        &request.follower_id,
        &request.leader_id,
        quota,
        now + Duration::days(duration_days),
        now,
    )?;
    Ok(Json(purchase))
}

/// List follow purchases for a follower.
#[utoipa::path(
    get,
    path = "/api/v1/follows/{user_id}",
    params(
        ("user_id" = String, Path, description = "Follower user identifier")
    ),
    responses(
        (status = 200, description = "Purchases, newest first", body = FollowListResponse)
    ),
    tag = "Follows"
)]
pub async fn list_follows(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Json<FollowListResponse> {
    Json(FollowListResponse {
        purchases: state.follows.purchases_for_follower(&user_id),
    })
}

/// Copy-trade notifications received by a follower.
#[utoipa::path(
    get,
    path = "/api/v1/follows/{user_id}/notifications",
    params(
        ("user_id" = String, Path, description = "Follower user identifier")
    ),
    responses(
        (status = 200, description = "Notifications, newest first", body = NotificationsResponse)
    ),
    tag = "Follows"
)]
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Json<NotificationsResponse> {
    Json(NotificationsResponse {
        notifications: state.follows.notifications_for(&user_id),
    })
}

// ============================================================================
// Authentication
// ============================================================================

/// Create an API key. The raw key is returned exactly once.
#[utoipa::path(
    post,
    path = "/api/v1/auth/keys",
    request_body = CreateApiKeyRequest,
    responses(
        (status = 200, description = "Key created", body = CreateApiKeyResponse),
        (status = 400, description = "Invalid request")
    ),
    tag = "Authentication"
)]
pub async fn create_api_key(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateApiKeyRequest>,
) -> Result<Json<CreateApiKeyResponse>, ApiError> {
    if request.user_id.trim().is_empty() {
        return Err(ApiError::InvalidRequest("user_id is required".to_string()));
    }
    if request.name.trim().is_empty() {
        return Err(ApiError::InvalidRequest("name is required".to_string()));
    }
    if request.permissions.is_empty() {
        return Err(ApiError::InvalidRequest(
            "at least one permission is required".to_string(),
        ));
    }

    let rate_limit = request.rate_limit.unwrap_or(DEFAULT_KEY_RATE_LIMIT);
    let (key_id, api_key) = state.api_key_store.create_key(
        request.user_id,
        request.name,
        request.permissions,
        rate_limit,
    );

    let info = state
        .api_key_store
        .get_by_id(&key_id)
        .ok_or_else(|| ApiError::Internal("key vanished after creation".to_string()))?;

    Ok(Json(CreateApiKeyResponse {
        key_id,
        api_key,
        info,
    }))
}

/// List API keys.
#[utoipa::path(
    get,
    path = "/api/v1/auth/keys",
    responses(
        (status = 200, description = "Known keys", body = ApiKeysListResponse)
    ),
    tag = "Authentication"
)]
pub async fn list_api_keys(State(state): State<Arc<AppState>>) -> Json<ApiKeysListResponse> {
    Json(ApiKeysListResponse {
        keys: state.api_key_store.list_keys(),
    })
}

/// Revoke an API key.
#[utoipa::path(
    delete,
    path = "/api/v1/auth/keys/{key_id}",
    params(
        ("key_id" = String, Path, description = "Key identifier")
    ),
    responses(
        (status = 200, description = "Key revoked"),
        (status = 404, description = "Key not found")
    ),
    tag = "Authentication"
)]
pub async fn delete_api_key(
    State(state): State<Arc<AppState>>,
    Path(key_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if state.api_key_store.delete_key(&key_id) {
        Ok(Json(serde_json::json!({
            "message": format!("API key {} revoked", key_id)
        })))
    } else {
        Err(ApiError::NotFound(format!("API key {}", key_id)))
    }
}
