//! Audit-trail row types and queries.
//!
//! The database is a write-mostly audit sink: trades are upserted on every
//! state change, fills are append-only. All reads the API serves come from
//! the in-memory ledger.

use crate::models::{FillInfo, TradeInfo};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Trade audit row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TradeRow {
    /// Trade identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: String,
    /// Underlying symbol.
    pub underlying: String,
    /// Strike price.
    pub strike: Decimal,
    /// "call" or "put".
    pub option_type: String,
    /// Contract expiry.
    pub expiry: NaiveDate,
    /// Entry price per contract.
    pub entry_price: Decimal,
    /// Total contracts.
    pub contracts: i32,
    /// Contracts still open.
    pub remaining_contracts: i32,
    /// "open", "closed" or "rejected".
    pub status: String,
    /// Accumulated buy notional.
    pub buy_notional: Decimal,
    /// Accumulated sell notional.
    pub sell_notional: Decimal,
    /// Net P&L once closed.
    pub net_pnl: Option<Decimal>,
    /// "win", "loss" or "breakeven" once closed.
    pub outcome: Option<String>,
    /// Reference price at entry.
    pub entry_reference_price: Decimal,
    /// Opening timestamp.
    pub opened_at: DateTime<Utc>,
    /// Closing timestamp once closed.
    pub closed_at: Option<DateTime<Utc>>,
}

/// Fill audit row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FillRow {
    /// Fill identifier.
    pub id: Uuid,
    /// Parent trade.
    pub trade_id: Uuid,
    /// Contracts closed.
    pub contracts: i32,
    /// Fill price per contract.
    pub price: Decimal,
    /// Notional value.
    pub notional: Decimal,
    /// Reference price at fill time.
    pub reference_price: Decimal,
    /// Fill timestamp.
    pub filled_at: DateTime<Utc>,
}

/// Upserts the current state of a trade into the audit table.
pub async fn upsert_trade(pool: &PgPool, trade: &TradeInfo) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO trades (
            id, user_id, underlying, strike, option_type, expiry,
            entry_price, contracts, remaining_contracts, status,
            buy_notional, sell_notional, net_pnl, outcome,
            entry_reference_price, opened_at, closed_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        ON CONFLICT (id) DO UPDATE SET
            remaining_contracts = EXCLUDED.remaining_contracts,
            status = EXCLUDED.status,
            sell_notional = EXCLUDED.sell_notional,
            net_pnl = EXCLUDED.net_pnl,
            outcome = EXCLUDED.outcome,
            closed_at = EXCLUDED.closed_at
        "#,
    )
    .bind(trade.trade_id)
    .bind(&trade.user_id)
    .bind(&trade.instrument.underlying)
    .bind(trade.instrument.strike)
    .bind(trade.instrument.option_type.to_string())
    .bind(trade.instrument.expiry)
    .bind(trade.entry_price)
    .bind(trade.contracts as i32)
    .bind(trade.remaining_contracts as i32)
    .bind(trade.status.to_string())
    .bind(trade.buy_notional)
    .bind(trade.sell_notional)
    .bind(trade.net_pnl)
    .bind(trade.outcome.map(|o| o.to_string()))
    .bind(trade.entry_reference_price)
    .bind(trade.opened_at)
    .bind(trade.closed_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Appends a fill to the audit table.
pub async fn insert_fill(
    pool: &PgPool,
    trade_id: Uuid,
    fill: &FillInfo,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO trade_fills (
            id, trade_id, contracts, price, notional, reference_price, filled_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(fill.fill_id)
    .bind(trade_id)
    .bind(fill.contracts as i32)
    .bind(fill.price)
    .bind(fill.notional)
    .bind(fill.reference_price)
    .bind(fill.filled_at)
    .execute(pool)
    .await?;

    Ok(())
}
