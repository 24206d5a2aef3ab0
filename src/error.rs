//! Error types for the REST API.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::TradeStatus;


/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
    /// Error code.
    pub code: String,
}

/// Rate limit error response body.
#[derive(Debug, Serialize)]
pub struct RateLimitErrorResponse {
    /// Error message.
    pub error: String,
    /// Error code.
    pub code: String,
    /// Maximum requests allowed.
    pub limit: u32,
    /// Remaining requests.
    pub remaining: u32,
    /// Unix timestamp when the rate limit resets.
    pub reset: u64,
    /// Seconds until reset.
    pub retry_after: u64,
}

/// API error types.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Trade not found.
    #[error("Trade not found: {0}")]
    TradeNotFound(Uuid),

    /// The trade is not open, so fills cannot be applied.
    #[error("Trade {trade_id} is {status}, fills are only accepted against open trades")]
    TradeNotOpen {
        /// Trade identifier.
        trade_id: Uuid,
        /// Current status.
        status: TradeStatus,
    },

    /// Fill requests more contracts than remain open.
    #[error("Requested {requested} contracts but only {remaining} remain open")]
    Oversell {
        /// Contracts requested.
        requested: u32,
        /// Contracts remaining.
        remaining: u32,
    },

    /// Price deviates more than the tolerance band from the reference.
    #[error("Price {price} is outside the tolerance band around reference {reference}")]
    PriceOutOfBand {
        /// Submitted price.
        price: Decimal,
        /// Reference price.
        reference: Decimal,
    },

    /// No fresh reference price is available for the symbol.
    #[error("No reference price available for {0}")]
    NoReferencePrice(String),

    /// The market session is closed.
    #[error("Market is closed")]
    MarketClosed,

    /// An identical active follow purchase already exists.
    #[error("Active follow purchase already exists: {follower_id} -> {leader_id}")]
    DuplicateFollow {
        /// The paying user.
        follower_id: String,
        /// The followed user.
        leader_id: String,
    },

    /// Invalid request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimitExceeded {
        /// Maximum requests allowed.
        limit: u32,
        /// Remaining requests (always 0 when exceeded).
        remaining: u32,
        /// Unix timestamp when the rate limit resets.
        reset: u64,
        /// Seconds until reset.
        retry_after: u64,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::RateLimitExceeded {
                limit,
                remaining,
                reset,
                retry_after,
            } => {
                let body = Json(RateLimitErrorResponse {
                    error: "Rate limit exceeded".to_string(),
                    code: "RATE_LIMIT_EXCEEDED".to_string(),
                    limit: *limit,
                    remaining: *remaining,
                    reset: *reset,
                    retry_after: *retry_after,
                });

                (
                    StatusCode::TOO_MANY_REQUESTS,
                    [
                        ("X-RateLimit-Limit", limit.to_string()),
                        ("X-RateLimit-Remaining", remaining.to_string()),
                        ("X-RateLimit-Reset", reset.to_string()),
                        ("Retry-After", retry_after.to_string()),
                    ],
                    body,
                )
                    .into_response()
            }
            _ => {
                let (status, code) = match &self {
                    ApiError::TradeNotFound(_) => (StatusCode::NOT_FOUND, "TRADE_NOT_FOUND"),
                    ApiError::TradeNotOpen { .. } => (StatusCode::CONFLICT, "TRADE_NOT_OPEN"),
                    ApiError::Oversell { .. } => (StatusCode::CONFLICT, "OVERSELL"),
                    ApiError::PriceOutOfBand { .. } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "PRICE_OUT_OF_BAND")
                    }
                    ApiError::NoReferencePrice(_) => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "NO_REFERENCE_PRICE")
                    }
                    ApiError::MarketClosed => (StatusCode::CONFLICT, "MARKET_CLOSED"),
                    ApiError::DuplicateFollow { .. } => (StatusCode::CONFLICT, "DUPLICATE_FOLLOW"),
                    ApiError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
                    ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                    ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
                    ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
                    ApiError::RateLimitExceeded { .. } => unreachable!(),
                };

                let body = Json(ErrorResponse {
                    error: self.to_string(),
                    code: code.to_string(),
                });

                (status, body).into_response()
            }
        }
    }
}

impl From<crate::settlement::LedgerError> for ApiError {
    fn from(err: crate::settlement::LedgerError) -> Self {
        use crate::settlement::LedgerError;
        match err {
            LedgerError::TradeNotFound(trade_id) => ApiError::TradeNotFound(trade_id),
            LedgerError::TradeNotOpen { trade_id, status } => {
                ApiError::TradeNotOpen { trade_id, status }
            }
            LedgerError::Oversell {
                requested,
                remaining,
            } => ApiError::Oversell {
                requested,
                remaining,
            },
            LedgerError::PriceOutOfBand { price, reference } => {
                ApiError::PriceOutOfBand { price, reference }
            }
            LedgerError::InvalidQuantity => {
                ApiError::InvalidRequest("contracts must be positive".to_string())
            }
            LedgerError::InvalidPrice => {
                ApiError::InvalidRequest("price must be positive".to_string())
            }
        }
    }
}

impl From<crate::follows::FollowError> for ApiError {
    fn from(err: crate::follows::FollowError) -> Self {
        use crate::follows::FollowError;
        match err {
            FollowError::DuplicateActive {
                follower_id,
                leader_id,
            } => ApiError::DuplicateFollow {
                follower_id,
                leader_id,
            },
            FollowError::SelfFollow(user_id) => {
                ApiError::InvalidRequest(format!("user {user_id} cannot follow themselves"))
            }
            FollowError::InvalidQuota => {
                ApiError::InvalidRequest("notification quota must be positive".to_string())
            }
        }
    }
}
