//! Request and response models for the REST API.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Option contract type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
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
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    /// Trade has remaining open contracts.
    Open,
    /// All contracts closed; P&L and outcome are frozen.
    Closed,
    /// Entry failed price validation. Terminal, kept for audit.
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

/// Resolved outcome of a fully closed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Net P&L was positive.
    Win,
    /// Net P&L was negative.
    Loss,
    /// Net P&L was exactly zero.
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

/// Option instrument descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Instrument {
    /// Underlying symbol (e.g., "SPY").
    pub underlying: String,
    /// Strike price in dollars.
    pub strike: Decimal,
    /// Call or put.
    pub option_type: OptionType,
    /// Contract expiry date.
    pub expiry: NaiveDate,
}

impl Instrument {
    /// Compact symbol form: "{underlying}-{expiry}-{strike}-{C|P}".
    pub fn symbol(&self) -> String {
        let style_char = match self.option_type {
            OptionType::Call => "C",
            OptionType::Put => "P",
        };
        format!(
            "{}-{}-{}-{}",
            self.underlying,
            self.expiry.format("%Y%m%d"),
            self.strike,
            style_char
        )
    }
}

/// A recorded closing (sell) fill against a trade.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FillInfo {
    /// Unique fill identifier.
    pub fill_id: Uuid,
    /// Contracts closed by this fill.
    pub contracts: u32,
    /// Fill price per contract.
    pub price: Decimal,
    /// Notional value (contracts x price x 100).
    pub notional: Decimal,
    /// Reference price captured at fill time.
    pub reference_price: Decimal,
    /// Fill timestamp.
    pub filled_at: DateTime<Utc>,
}

/// Full trade state as tracked by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TradeInfo {
    /// Unique trade identifier.
    pub trade_id: Uuid,
    /// Owning user.
    pub user_id: String,
    /// Instrument descriptor.
    pub instrument: Instrument,
    /// Opening fill price per contract.
    pub entry_price: Decimal,
    /// Total contracts opened.
    pub contracts: u32,
    /// Contracts still open.
    pub remaining_contracts: u32,
    /// Lifecycle status.
    pub status: TradeStatus,
    /// Accumulated buy-side notional.
    pub buy_notional: Decimal,
    /// Accumulated sell-side notional.
    pub sell_notional: Decimal,
    /// Net P&L, set once when the trade fully closes.
    pub net_pnl: Option<Decimal>,
    /// Outcome, set once when the trade fully closes.
    pub outcome: Option<Outcome>,
    /// Reference price captured at entry.
    pub entry_reference_price: Decimal,
    /// Opening timestamp.
    pub opened_at: DateTime<Utc>,
    /// Closing timestamp, set when the trade fully closes.
    pub closed_at: Option<DateTime<Utc>>,
    /// Closing fills recorded against this trade.
    pub fills: Vec<FillInfo>,
}

/// Request to open a trade.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct OpenTradeRequest {
    /// Owning user.
    pub user_id: String,
    /// Underlying symbol.
    pub underlying: String,
    /// Strike price in dollars.
    pub strike: Decimal,
    /// Call or put.
    pub option_type: OptionType,
    /// Contract expiry date (YYYY-MM-DD).
    pub expiry: NaiveDate,
    /// Entry price per contract.
    pub price: Decimal,
    /// Number of contracts.
    pub contracts: u32,
}

/// Response after a trade-open attempt.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OpenTradeResponse {
    /// The created trade identifier.
    pub trade_id: Uuid,
    /// Resulting status: `open`, or `rejected` when the entry price
    /// failed reference validation.
    pub status: TradeStatus,
    /// Reference price used for validation.
    pub reference_price: Decimal,
    /// Descriptive message.
    pub message: String,
}

/// Request to submit a closing fill.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CloseFillRequest {
    /// Contracts to close.
    pub contracts: u32,
    /// Fill price per contract.
    pub price: Decimal,
}

/// Response after a closing fill.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CloseFillResponse {
    /// Parent trade identifier.
    pub trade_id: Uuid,
    /// The recorded fill identifier.
    pub fill_id: Uuid,
    /// Trade status after the fill.
    pub status: TradeStatus,
    /// Contracts still open after the fill.
    pub remaining_contracts: u32,
    /// Net P&L, present only when the trade fully closed.
    pub net_pnl: Option<Decimal>,
    /// Outcome, present only when the trade fully closed.
    pub outcome: Option<Outcome>,
    /// Descriptive message.
    pub message: String,
}

/// Query parameters for listing trades.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct TradeListQuery {
    /// Filter by owning user.
    pub user_id: Option<String>,
    /// Filter by status ("open", "closed", "rejected").
    pub status: Option<String>,
    /// Filter by outcome ("win", "loss", "breakeven").
    pub outcome: Option<String>,
    /// Filter by underlying symbol.
    pub underlying: Option<String>,
    /// Maximum results to return.
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Results to skip.
    #[serde(default)]
    pub offset: u32,
}

fn default_limit() -> u32 {
    100
}

/// Paginated trade list.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TradeListResponse {
    /// Matching trades (newest first).
    pub trades: Vec<TradeInfo>,
    /// Total matches before pagination.
    pub total: usize,
    /// Applied limit.
    pub limit: u32,
    /// Applied offset.
    pub offset: u32,
}

/// List of fills for one trade.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FillsListResponse {
    /// Parent trade identifier.
    pub trade_id: Uuid,
    /// Recorded fills, oldest first.
    pub fills: Vec<FillInfo>,
}

/// Aggregated per-user performance statistics.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserStatsResponse {
    /// User identifier.
    pub user_id: String,
    /// Trades currently open.
    pub open_trades: usize,
    /// Fully closed trades.
    pub closed_trades: usize,
    /// Closed trades resolved as wins.
    pub wins: usize,
    /// Closed trades resolved as losses.
    pub losses: usize,
    /// Closed trades resolved as breakeven.
    pub breakevens: usize,
    /// Wins / closed trades (0 when no closed trades).
    pub win_rate: Decimal,
    /// Sum of net P&L over closed trades.
    pub net_pnl: Decimal,
    /// Sum of buy notional over closed trades.
    pub buy_notional: Decimal,
    /// Net P&L / buy notional (0 when no notional).
    pub roi: Decimal,
    /// Consecutive wins counting back from the most recent closed trade.
    pub current_streak: usize,
    /// Longest run of consecutive wins in the closed history.
    pub longest_streak: usize,
}

/// One ranked leaderboard row.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardEntry {
    /// Rank, starting at 1.
    pub rank: usize,
    /// User identifier.
    pub user_id: String,
    /// Total net P&L over closed trades.
    pub net_pnl: Decimal,
    /// Win rate over closed trades.
    pub win_rate: Decimal,
    /// Number of closed trades.
    pub closed_trades: usize,
    /// Current win streak.
    pub current_streak: usize,
}

/// Query parameters for the leaderboard.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LeaderboardQuery {
    /// Maximum entries to return.
    #[serde(default = "default_leaderboard_limit")]
    pub limit: u32,
}

fn default_leaderboard_limit() -> u32 {
    25
}

/// Ranked leaderboard.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardResponse {
    /// Ranked entries, best P&L first.
    pub entries: Vec<LeaderboardEntry>,
}

/// Market session status.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionStatusResponse {
    /// Whether the market is currently open.
    pub open: bool,
    /// Exchange timezone name.
    pub timezone: String,
    /// Today's session open (UTC), absent on non-trading days.
    pub opens_at: Option<DateTime<Utc>>,
    /// Today's session close (UTC), absent on non-trading days.
    pub closes_at: Option<DateTime<Utc>>,
}

/// Latest reference price for a symbol.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReferencePriceInfo {
    /// Underlying symbol.
    pub symbol: String,
    /// Latest price.
    pub price: Decimal,
    /// When the price was last updated.
    pub updated_at: DateTime<Utc>,
    /// Whether the quote is within the staleness window.
    pub fresh: bool,
}

/// Request to ingest a reference price.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct InsertPriceRequest {
    /// Underlying symbol.
    pub symbol: String,
    /// Price in dollars.
    pub price: Decimal,
}

/// All known reference prices.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PricesListResponse {
    /// Known quotes.
    pub prices: Vec<ReferencePriceInfo>,
}

/// Global service statistics.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GlobalStatsResponse {
    /// Total trades ever recorded (all statuses).
    pub total_trades: usize,
    /// Trades currently open.
    pub open_trades: usize,
    /// Fully closed trades.
    pub closed_trades: usize,
    /// Trades rejected at entry.
    pub rejected_trades: usize,
    /// Total closing fills recorded.
    pub total_fills: usize,
    /// Distinct users with at least one trade.
    pub user_count: usize,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

// ============================================================================
// Follow entitlements
// ============================================================================

/// Request to create a follow purchase.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateFollowRequest {
    /// The paying user who will receive notifications.
    pub follower_id: String,
    /// The user being followed.
    pub leader_id: String,
    /// Notification quota; defaults from config when absent.
    pub notification_quota: Option<u32>,
    /// Entitlement duration in days; defaults from config when absent.
    pub duration_days: Option<i64>,
}

/// A follow purchase entitlement.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FollowPurchaseInfo {
    /// Unique purchase identifier.
    pub purchase_id: Uuid,
    /// The paying user.
    pub follower_id: String,
    /// The followed user.
    pub leader_id: String,
    /// Total notification quota purchased.
    pub quota: u32,
    /// Notifications remaining.
    pub remaining: u32,
    /// Purchase timestamp.
    pub created_at: DateTime<Utc>,
    /// Entitlement expiry.
    pub expires_at: DateTime<Utc>,
}

/// Follow purchases for one follower.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FollowListResponse {
    /// Purchases, newest first.
    pub purchases: Vec<FollowPurchaseInfo>,
}

/// A copy-trade notification produced when a followed leader opens a trade.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationInfo {
    /// Receiving follower.
    pub follower_id: String,
    /// The leader who opened the trade.
    pub leader_id: String,
    /// The opened trade.
    pub trade_id: Uuid,
    /// Instrument symbol of the opened trade.
    pub symbol: String,
    /// When the notification was produced.
    pub sent_at: DateTime<Utc>,
}

/// Notifications received by one follower.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NotificationsResponse {
    /// Notifications, newest first.
    pub notifications: Vec<NotificationInfo>,
}

// ============================================================================
// Authentication
// ============================================================================

/// Permission granted to an API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Read-only access.
    Read,
    /// Trade submission.
    Trade,
    /// Full access, including key management.
    Admin,
}

/// Public API key metadata (never includes the key itself).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiKeyInfo {
    /// Key identifier.
    pub key_id: String,
    /// Owning user.
    pub user_id: String,
    /// Human-readable name.
    pub name: String,
    /// Granted permissions.
    pub permissions: Vec<Permission>,
    /// Rate limit in requests per minute.
    pub rate_limit: u32,
    /// Creation timestamp in milliseconds.
    pub created_at: u64,
    /// Last used timestamp in milliseconds.
    pub last_used_at: Option<u64>,
}

/// Request to create an API key.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateApiKeyRequest {
    /// Owning user.
    pub user_id: String,
    /// Human-readable name.
    pub name: String,
    /// Granted permissions.
    pub permissions: Vec<Permission>,
    /// Rate limit in requests per minute.
    pub rate_limit: Option<u32>,
}

/// Response with the newly created key. The raw key is returned exactly once.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateApiKeyResponse {
    /// Key identifier.
    pub key_id: String,
    /// The raw API key.
    pub api_key: String,
    /// Key metadata.
    pub info: ApiKeyInfo,
}

/// List of API keys.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiKeysListResponse {
    /// Known keys.
    pub keys: Vec<ApiKeyInfo>,
}
