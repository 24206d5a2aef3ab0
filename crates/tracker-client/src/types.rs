//! Request and response types for the Trade Tracker API.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(test)]
mod tests;

/// Option contract type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    /// Call option.
    Call,
    /// Put option.
    Put,
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "call"),
            Self::Put => write!(f, "put"),
        }
    }
}

/// Trade lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    /// Trade is open with contracts remaining.
    Open,
    /// Trade is fully closed and settled.
    Closed,
    /// Trade entry was rejected by price validation.
    Rejected,
}

impl std::fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// Settled trade outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Positive net P&L.
    Win,
    /// Negative net P&L.
    Loss,
    /// Zero net P&L.
    Breakeven,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Win => write!(f, "win"),
            Self::Loss => write!(f, "loss"),
            Self::Breakeven => write!(f, "breakeven"),
        }
    }
}

/// API key permission level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Read-only access.
    Read,
    /// Trading operations.
    Trade,
    /// Administrative operations.
    Admin,
}

// ============================================================================
// Health & Stats
// ============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Global statistics response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalStatsResponse {
    /// Total trades ever recorded.
    pub total_trades: usize,
    /// Currently open trades.
    pub open_trades: usize,
    /// Fully closed trades.
    pub closed_trades: usize,
    /// Rejected trades.
    pub rejected_trades: usize,
    /// Total closing fills.
    pub total_fills: usize,
    /// Distinct users with recorded trades.
    pub user_count: usize,
}

// ============================================================================
// Trades
// ============================================================================

/// Option instrument description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    /// Underlying symbol.
    pub underlying: String,
    /// Strike price.
    pub strike: Decimal,
    /// Call or put.
    pub option_type: OptionType,
    /// Expiry date.
    pub expiry: NaiveDate,
}

/// A closing fill applied against a trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillInfo {
    /// Fill identifier.
    pub fill_id: Uuid,
    /// Contracts closed by this fill.
    pub contracts: u32,
    /// Fill price per contract.
    pub price: Decimal,
    /// Notional value of this fill.
    pub notional: Decimal,
    /// Reference price at fill time.
    pub reference_price: Decimal,
    /// Fill timestamp.
    pub filled_at: DateTime<Utc>,
}

/// Full trade state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeInfo {
    /// Trade identifier.
    pub trade_id: Uuid,
    /// Owning user.
    pub user_id: String,
    /// Traded instrument.
    pub instrument: Instrument,
    /// Entry price per contract.
    pub entry_price: Decimal,
    /// Contracts at entry.
    pub contracts: u32,
    /// Contracts not yet closed.
    pub remaining_contracts: u32,
    /// Lifecycle status.
    pub status: TradeStatus,
    /// Total buy notional.
    pub buy_notional: Decimal,
    /// Total sell notional.
    pub sell_notional: Decimal,
    /// Net P&L, set when fully closed.
    pub net_pnl: Option<Decimal>,
    /// Outcome, set when fully closed.
    pub outcome: Option<Outcome>,
    /// Reference price at entry.
    pub entry_reference_price: Decimal,
    /// Open timestamp.
    pub opened_at: DateTime<Utc>,
    /// Close timestamp, set when fully closed.
    pub closed_at: Option<DateTime<Utc>>,
    /// Closing fills, oldest first.
    pub fills: Vec<FillInfo>,
}

/// Request to open a trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenTradeRequest {
    /// Owning user.
    pub user_id: String,
    /// Underlying symbol.
    pub underlying: String,
    /// Strike price.
    pub strike: Decimal,
    /// Call or put.
    pub option_type: OptionType,
    /// Expiry date.
    pub expiry: NaiveDate,
    /// Entry price per contract.
    pub price: Decimal,
    /// Number of contracts.
    pub contracts: u32,
}

/// Response to opening a trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenTradeResponse {
    /// Trade identifier.
    pub trade_id: Uuid,
    /// Resulting status, `open` or `rejected`.
    pub status: TradeStatus,
    /// Reference price used for validation.
    pub reference_price: Decimal,
    /// Human-readable message.
    pub message: String,
}

/// Request to apply a closing fill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseFillRequest {
    /// Contracts to close.
    pub contracts: u32,
    /// Fill price per contract.
    pub price: Decimal,
}

/// Response to applying a closing fill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseFillResponse {
    /// Trade identifier.
    pub trade_id: Uuid,
    /// Fill identifier.
    pub fill_id: Uuid,
    /// Trade status after the fill.
    pub status: TradeStatus,
    /// Contracts still open.
    pub remaining_contracts: u32,
    /// Net P&L, set when the trade closed.
    pub net_pnl: Option<Decimal>,
    /// Outcome, set when the trade closed.
    pub outcome: Option<Outcome>,
    /// Human-readable message.
    pub message: String,
}

/// Query filters for listing trades.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListTradesQuery {
    /// Filter by owning user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Filter by status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Filter by outcome.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    /// Filter by underlying.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underlying: Option<String>,
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Page offset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

/// Paginated trade listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeListResponse {
    /// Trades on this page, newest first.
    pub trades: Vec<TradeInfo>,
    /// Total matching trades.
    pub total: usize,
    /// Page size applied.
    pub limit: u32,
    /// Page offset applied.
    pub offset: u32,
}

/// Fills for one trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillsListResponse {
    /// Trade identifier.
    pub trade_id: Uuid,
    /// Fills, oldest first.
    pub fills: Vec<FillInfo>,
}

// ============================================================================
// Statistics
// ============================================================================

/// Per-user performance statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStatsResponse {
    /// User identifier.
    pub user_id: String,
    /// Currently open trades.
    pub open_trades: usize,
    /// Fully closed trades.
    pub closed_trades: usize,
    /// Winning trades.
    pub wins: usize,
    /// Losing trades.
    pub losses: usize,
    /// Breakeven trades.
    pub breakevens: usize,
    /// Wins over closed trades.
    pub win_rate: Decimal,
    /// Total net P&L across closed trades.
    pub net_pnl: Decimal,
    /// Total buy notional across closed trades.
    pub buy_notional: Decimal,
    /// Net P&L over buy notional.
    pub roi: Decimal,
    /// Consecutive wins ending at the most recent closed trade.
    pub current_streak: usize,
    /// Longest run of consecutive wins.
    pub longest_streak: usize,
}

/// One leaderboard row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Position, starting at 1.
    pub rank: usize,
    /// User identifier.
    pub user_id: String,
    /// Total net P&L.
    pub net_pnl: Decimal,
    /// Wins over closed trades.
    pub win_rate: Decimal,
    /// Fully closed trades.
    pub closed_trades: usize,
    /// Current win streak.
    pub current_streak: usize,
}

/// Ranked leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    /// Entries in rank order.
    pub entries: Vec<LeaderboardEntry>,
}

// ============================================================================
// Market
// ============================================================================

/// Trading session status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatusResponse {
    /// Whether the session is currently open.
    pub open: bool,
    /// Exchange timezone name.
    pub timezone: String,
    /// Session open for the current day, when trading today.
    pub opens_at: Option<DateTime<Utc>>,
    /// Session close for the current day, when trading today.
    pub closes_at: Option<DateTime<Utc>>,
}

/// Reference price for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferencePriceInfo {
    /// Underlying symbol.
    pub symbol: String,
    /// Latest price.
    pub price: Decimal,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Whether the price is within its staleness window.
    pub fresh: bool,
}

/// Request to ingest a reference price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertPriceRequest {
    /// Underlying symbol.
    pub symbol: String,
    /// Price to record.
    pub price: Decimal,
}

/// All known reference prices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricesListResponse {
    /// Prices sorted by symbol.
    pub prices: Vec<ReferencePriceInfo>,
}

// ============================================================================
// Follows
// ============================================================================

/// Request to create a follow purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFollowRequest {
    /// Follower user.
    pub follower_id: String,
    /// Leader user being followed.
    pub leader_id: String,
    /// Notification quota, server default when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_quota: Option<u32>,
    /// Entitlement duration in days, server default when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<i64>,
}

/// A follow purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowPurchaseInfo {
    /// Purchase identifier.
    pub purchase_id: Uuid,
    /// Follower user.
    pub follower_id: String,
    /// Leader user.
    pub leader_id: String,
    /// Notification quota at purchase.
    pub quota: u32,
    /// Notifications remaining.
    pub remaining: u32,
    /// Purchase timestamp.
    pub created_at: DateTime<Utc>,
    /// Entitlement expiry.
    pub expires_at: DateTime<Utc>,
}

/// Follow purchases for one follower.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowListResponse {
    /// Purchases, newest first.
    pub purchases: Vec<FollowPurchaseInfo>,
}

/// A copy-trade notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationInfo {
    /// Follower user.
    pub follower_id: String,
    /// Leader user.
    pub leader_id: String,
    /// The opened trade.
    pub trade_id: Uuid,
    /// Instrument symbol.
    pub symbol: String,
    /// Notification timestamp.
    pub sent_at: DateTime<Utc>,
}

/// Notifications for one follower.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsResponse {
    /// Notifications, newest first.
    pub notifications: Vec<NotificationInfo>,
}

// ============================================================================
// Authentication
// ============================================================================

/// Public API key metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyInfo {
    /// Key identifier.
    pub key_id: String,
    /// Owning user.
    pub user_id: String,
    /// Key name.
    pub name: String,
    /// Granted permissions.
    pub permissions: Vec<Permission>,
    /// Requests per minute.
    pub rate_limit: u32,
    /// Creation time, milliseconds since epoch.
    pub created_at: u64,
    /// Last use, milliseconds since epoch.
    pub last_used_at: Option<u64>,
}

/// Request to create an API key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApiKeyRequest {
    /// Owning user.
    pub user_id: String,
    /// Key name.
    pub name: String,
    /// Granted permissions.
    pub permissions: Vec<Permission>,
    /// Requests per minute, server default when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<u32>,
}

/// Response to creating an API key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApiKeyResponse {
    /// Key identifier.
    pub key_id: String,
    /// Raw API key, returned exactly once.
    pub api_key: String,
    /// Key metadata.
    pub info: ApiKeyInfo,
}

/// All known API keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeysListResponse {
    /// Key metadata.
    pub keys: Vec<ApiKeyInfo>,
}
