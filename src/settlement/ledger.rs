//! In-memory trade ledger and lifecycle state machine.
//!
//! High-performance trade storage using DashMap for lock-free concurrency:
//! - Trade opening with reference-price validation
//! - Closing fill application with oversell protection
//! - Settlement (P&L and outcome) at full closure
//! - Filtered queries with pagination

use crate::models::{FillInfo, Instrument, Outcome, TradeInfo, TradeListQuery, TradeStatus};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Standard option contract multiplier.
pub const CONTRACT_MULTIPLIER: Decimal = dec!(100);

/// Default tolerance band around the reference price (5%).
pub const DEFAULT_TOLERANCE: Decimal = dec!(0.05);

/// Errors produced by the trade lifecycle state machine.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// No trade with the given id.
    #[error("trade not found: {0}")]
    TradeNotFound(Uuid),

    /// Fills are only accepted against open trades.
    #[error("trade {trade_id} is {status}")]
    TradeNotOpen {
        /// Trade identifier.
        trade_id: Uuid,
        /// Current status.
        status: TradeStatus,
    },

    /// Fill requests more contracts than remain open.
    #[error("requested {requested} contracts, {remaining} remaining")]
    Oversell {
        /// Contracts requested.
        requested: u32,
        /// Contracts remaining.
        remaining: u32,
    },

    /// Fill price outside the tolerance band around the reference.
    #[error("price {price} outside band around reference {reference}")]
    PriceOutOfBand {
        /// Submitted price.
        price: Decimal,
        /// Reference price.
        reference: Decimal,
    },

    /// Contract count must be positive.
    #[error("contract count must be positive")]
    InvalidQuantity,

    /// Price must be positive.
    #[error("price must be positive")]
    InvalidPrice,
}

/// Aggregate counts over the ledger.
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerCounts {
    /// All trades regardless of status.
    pub total_trades: usize,
    /// Trades currently open.
    pub open_trades: usize,
    /// Fully closed trades.
    pub closed_trades: usize,
    /// Trades rejected at entry.
    pub rejected_trades: usize,
    /// Closing fills recorded.
    pub total_fills: usize,
    /// Distinct users with at least one trade.
    pub user_count: usize,
}

/// In-memory trade ledger with DashMap for concurrent access.
pub struct TradeLedger {
    trades: Arc<DashMap<Uuid, TradeInfo>>,
    tolerance: Decimal,
}

impl Default for TradeLedger {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

impl TradeLedger {
    /// Creates a new ledger with the given tolerance band (fraction of the
    /// reference price, e.g. 0.05 for +/-5%).
    pub fn new(tolerance: Decimal) -> Self {
        Self {
            trades: Arc::new(DashMap::new()),
            tolerance,
        }
    }

    /// Returns whether `price` lies within the tolerance band around
    /// `reference`. A non-positive reference can never validate a price.
    pub fn within_band(&self, price: Decimal, reference: Decimal) -> bool {
        if reference <= Decimal::ZERO {
            return false;
        }
        (price - reference).abs() <= reference * self.tolerance
    }

    /// Opens a trade.
    ///
    /// An entry price outside the tolerance band does not fail the call:
    /// the trade is stored with status `Rejected` so the attempt remains
    /// auditable. Rejected trades are terminal and never accept fills.
    pub fn open_trade(
        &self,
        user_id: &str,
        instrument: Instrument,
        price: Decimal,
        contracts: u32,
        reference_price: Decimal,
        now: DateTime<Utc>,
    ) -> Result<TradeInfo, LedgerError> {
        if contracts == 0 {
            return Err(LedgerError::InvalidQuantity);
        }
        if price <= Decimal::ZERO {
            return Err(LedgerError::InvalidPrice);
        }

        let accepted = self.within_band(price, reference_price);
        let trade_id = Uuid::new_v4();

        let trade = TradeInfo {
            trade_id,
            user_id: user_id.to_string(),
            instrument,
            entry_price: price,
            contracts,
            remaining_contracts: contracts,
            status: if accepted {
                TradeStatus::Open
            } else {
                TradeStatus::Rejected
            },
            buy_notional: if accepted {
                Decimal::from(contracts) * price * CONTRACT_MULTIPLIER
            } else {
                Decimal::ZERO
            },
            sell_notional: Decimal::ZERO,
            net_pnl: None,
            outcome: None,
            entry_reference_price: reference_price,
            opened_at: now,
            closed_at: None,
            fills: Vec::new(),
        };

        if accepted {
            info!(
                "Opened trade {} for {}: {} x{} @ {}",
                trade_id,
                user_id,
                trade.instrument.symbol(),
                contracts,
                price
            );
        } else {
            info!(
                "Rejected trade {} for {}: entry {} outside band around {}",
                trade_id, user_id, price, reference_price
            );
        }

        self.trades.insert(trade_id, trade.clone());
        Ok(trade)
    }

    /// Applies a closing (sell) fill to an open trade.
    ///
    /// When the fill brings `remaining_contracts` to exactly zero the trade
    /// transitions to `Closed` and `net_pnl`/`outcome` are computed and
    /// frozen. That transition happens exactly once per trade.
    pub fn close_fill(
        &self,
        trade_id: Uuid,
        contracts: u32,
        price: Decimal,
        reference_price: Decimal,
        now: DateTime<Utc>,
    ) -> Result<(TradeInfo, FillInfo), LedgerError> {
        if contracts == 0 {
            return Err(LedgerError::InvalidQuantity);
        }
        if price <= Decimal::ZERO {
            return Err(LedgerError::InvalidPrice);
        }

        let mut entry = self
            .trades
            .get_mut(&trade_id)
            .ok_or(LedgerError::TradeNotFound(trade_id))?;
        let trade = entry.value_mut();

        if trade.status != TradeStatus::Open {
            return Err(LedgerError::TradeNotOpen {
                trade_id,
                status: trade.status,
            });
        }
        if contracts > trade.remaining_contracts {
            return Err(LedgerError::Oversell {
                requested: contracts,
                remaining: trade.remaining_contracts,
            });
        }
        if !self.within_band(price, reference_price) {
            return Err(LedgerError::PriceOutOfBand {
                price,
                reference: reference_price,
            });
        }

        let notional = Decimal::from(contracts) * price * CONTRACT_MULTIPLIER;
        let fill = FillInfo {
            fill_id: Uuid::new_v4(),
            contracts,
            price,
            notional,
            reference_price,
            filled_at: now,
        };

        trade.fills.push(fill.clone());
        trade.remaining_contracts -= contracts;
        trade.sell_notional += notional;

        if trade.remaining_contracts == 0 {
            let net_pnl = trade.sell_notional - trade.buy_notional;
            trade.status = TradeStatus::Closed;
            trade.closed_at = Some(now);
            trade.net_pnl = Some(net_pnl);
            trade.outcome = Some(if net_pnl > Decimal::ZERO {
                Outcome::Win
            } else if net_pnl < Decimal::ZERO {
                Outcome::Loss
            } else {
                Outcome::Breakeven
            });
            info!(
                "Trade {} closed: net_pnl={} outcome={:?}",
                trade_id, net_pnl, trade.outcome
            );
        } else {
            debug!(
                "Trade {} partial close: {} contracts remaining",
                trade_id, trade.remaining_contracts
            );
        }

        Ok((trade.clone(), fill))
    }

    /// Gets a trade by id.
    pub fn get_trade(&self, trade_id: Uuid) -> Option<TradeInfo> {
        self.trades.get(&trade_id).map(|entry| entry.value().clone())
    }

    /// Lists trades with optional filters and pagination, newest first.
    pub fn list_trades(&self, query: &TradeListQuery) -> (Vec<TradeInfo>, usize) {
        let mut filtered: Vec<TradeInfo> = self
            .trades
            .iter()
            .filter_map(|entry| {
                let trade = entry.value();

                if let Some(ref user_id) = query.user_id {
                    if &trade.user_id != user_id {
                        return None;
                    }
                }
                if let Some(ref status) = query.status {
                    if trade.status.to_string() != status.to_lowercase() {
                        return None;
                    }
                }
                if let Some(ref outcome) = query.outcome {
                    match trade.outcome {
                        Some(o) if o.to_string() == outcome.to_lowercase() => {}
                        _ => return None,
                    }
                }
                if let Some(ref underlying) = query.underlying {
                    if &trade.instrument.underlying != underlying {
                        return None;
                    }
                }

                Some(trade.clone())
            })
            .collect();

        filtered.sort_by(|a, b| {
            b.opened_at
                .cmp(&a.opened_at)
                .then_with(|| b.trade_id.cmp(&a.trade_id))
        });

        let total = filtered.len();
        let page: Vec<TradeInfo> = filtered
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect();

        (page, total)
    }

    /// Returns all trades for one user.
    pub fn trades_for_user(&self, user_id: &str) -> Vec<TradeInfo> {
        self.trades
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Returns a snapshot of every trade.
    pub fn all_trades(&self) -> Vec<TradeInfo> {
        self.trades
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Computes aggregate counts over the ledger.
    pub fn counts(&self) -> LedgerCounts {
        let mut counts = LedgerCounts::default();
        let mut users = HashSet::new();

        for entry in self.trades.iter() {
            let trade = entry.value();
            counts.total_trades += 1;
            counts.total_fills += trade.fills.len();
            users.insert(trade.user_id.clone());
            match trade.status {
                TradeStatus::Open => counts.open_trades += 1,
                TradeStatus::Closed => counts.closed_trades += 1,
                TradeStatus::Rejected => counts.rejected_trades += 1,
            }
        }

        counts.user_count = users.len();
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OptionType;
    use chrono::NaiveDate;

    fn spy_call() -> Instrument {
        Instrument {
            underlying: "SPY".to_string(),
            strike: dec!(450),
            option_type: OptionType::Call,
            expiry: NaiveDate::from_ymd_opt(2026, 12, 18).unwrap(),
        }
    }

    fn ledger() -> TradeLedger {
        TradeLedger::default()
    }

    fn open(ledger: &TradeLedger, price: Decimal, contracts: u32, reference: Decimal) -> TradeInfo {
        ledger
            .open_trade("alice", spy_call(), price, contracts, reference, Utc::now())
            .expect("open should succeed")
    }

    #[test]
    fn test_open_trade_within_band() {
        let ledger = ledger();
        let trade = open(&ledger, dec!(2.50), 10, dec!(2.45));

        assert_eq!(trade.status, TradeStatus::Open);
        assert_eq!(trade.remaining_contracts, 10);
        // 10 x 2.50 x 100
        assert_eq!(trade.buy_notional, dec!(2500.0));
        assert!(trade.net_pnl.is_none());
        assert!(trade.outcome.is_none());
    }

    #[test]
    fn test_open_trade_outside_band_is_stored_rejected() {
        let ledger = ledger();
        let trade = open(&ledger, dec!(3.00), 10, dec!(2.00));

        assert_eq!(trade.status, TradeStatus::Rejected);
        assert_eq!(trade.buy_notional, Decimal::ZERO);
        // Audit trail: the rejected trade is retrievable.
        let stored = ledger.get_trade(trade.trade_id).unwrap();
        assert_eq!(stored.status, TradeStatus::Rejected);
    }

    #[test]
    fn test_open_trade_at_exact_band_boundary_accepted() {
        let ledger = ledger();
        // 2.10 is exactly +5% of 2.00
        let trade = open(&ledger, dec!(2.10), 1, dec!(2.00));
        assert_eq!(trade.status, TradeStatus::Open);

        // And exactly -5%
        let trade = open(&ledger, dec!(1.90), 1, dec!(2.00));
        assert_eq!(trade.status, TradeStatus::Open);
    }

    #[test]
    fn test_open_trade_zero_reference_rejected() {
        let ledger = ledger();
        let trade = open(&ledger, dec!(2.00), 1, Decimal::ZERO);
        assert_eq!(trade.status, TradeStatus::Rejected);
    }

    #[test]
    fn test_open_trade_invalid_inputs() {
        let ledger = ledger();
        let err = ledger
            .open_trade("alice", spy_call(), dec!(2.00), 0, dec!(2.00), Utc::now())
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidQuantity));

        let err = ledger
            .open_trade("alice", spy_call(), dec!(0), 5, dec!(2.00), Utc::now())
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidPrice));
    }

    #[test]
    fn test_partial_then_full_close() {
        let ledger = ledger();
        let trade = open(&ledger, dec!(2.00), 10, dec!(2.00));

        let (after, fill) = ledger
            .close_fill(trade.trade_id, 4, dec!(2.50), dec!(2.50), Utc::now())
            .unwrap();
        assert_eq!(after.status, TradeStatus::Open);
        assert_eq!(after.remaining_contracts, 6);
        assert_eq!(fill.notional, dec!(1000.0));
        assert!(after.net_pnl.is_none());

        let (closed, _) = ledger
            .close_fill(trade.trade_id, 6, dec!(2.50), dec!(2.50), Utc::now())
            .unwrap();
        assert_eq!(closed.status, TradeStatus::Closed);
        assert_eq!(closed.remaining_contracts, 0);
        // sell 10 x 2.50 x 100 = 2500, buy 10 x 2.00 x 100 = 2000
        assert_eq!(closed.net_pnl, Some(dec!(500.0)));
        assert_eq!(closed.outcome, Some(Outcome::Win));
        assert!(closed.closed_at.is_some());
        assert_eq!(closed.fills.len(), 2);
    }

    #[test]
    fn test_loss_and_breakeven_outcomes() {
        let ledger = ledger();

        let trade = open(&ledger, dec!(2.00), 5, dec!(2.00));
        let (closed, _) = ledger
            .close_fill(trade.trade_id, 5, dec!(1.90), dec!(1.90), Utc::now())
            .unwrap();
        assert_eq!(closed.outcome, Some(Outcome::Loss));
        assert_eq!(closed.net_pnl, Some(dec!(-50.0)));

        let trade = open(&ledger, dec!(2.00), 5, dec!(2.00));
        let (closed, _) = ledger
            .close_fill(trade.trade_id, 5, dec!(2.00), dec!(2.00), Utc::now())
            .unwrap();
        assert_eq!(closed.outcome, Some(Outcome::Breakeven));
        assert_eq!(closed.net_pnl, Some(dec!(0.0)));
    }

    #[test]
    fn test_oversell_rejected() {
        let ledger = ledger();
        let trade = open(&ledger, dec!(2.00), 3, dec!(2.00));

        let err = ledger
            .close_fill(trade.trade_id, 4, dec!(2.00), dec!(2.00), Utc::now())
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Oversell {
                requested: 4,
                remaining: 3
            }
        ));

        // Trade untouched after the rejected fill.
        let stored = ledger.get_trade(trade.trade_id).unwrap();
        assert_eq!(stored.remaining_contracts, 3);
        assert!(stored.fills.is_empty());
    }

    #[test]
    fn test_fill_against_closed_trade_rejected() {
        let ledger = ledger();
        let trade = open(&ledger, dec!(2.00), 2, dec!(2.00));
        ledger
            .close_fill(trade.trade_id, 2, dec!(2.00), dec!(2.00), Utc::now())
            .unwrap();

        let err = ledger
            .close_fill(trade.trade_id, 1, dec!(2.00), dec!(2.00), Utc::now())
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::TradeNotOpen {
                status: TradeStatus::Closed,
                ..
            }
        ));
    }

    #[test]
    fn test_fill_against_rejected_trade_rejected() {
        let ledger = ledger();
        let trade = open(&ledger, dec!(5.00), 2, dec!(2.00));
        assert_eq!(trade.status, TradeStatus::Rejected);

        let err = ledger
            .close_fill(trade.trade_id, 1, dec!(2.00), dec!(2.00), Utc::now())
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::TradeNotOpen {
                status: TradeStatus::Rejected,
                ..
            }
        ));
    }

    #[test]
    fn test_fill_price_out_of_band_rejected() {
        let ledger = ledger();
        let trade = open(&ledger, dec!(2.00), 2, dec!(2.00));

        let err = ledger
            .close_fill(trade.trade_id, 1, dec!(2.50), dec!(2.00), Utc::now())
            .unwrap_err();
        assert!(matches!(err, LedgerError::PriceOutOfBand { .. }));
    }

    #[test]
    fn test_fill_unknown_trade() {
        let ledger = ledger();
        let err = ledger
            .close_fill(Uuid::new_v4(), 1, dec!(2.00), dec!(2.00), Utc::now())
            .unwrap_err();
        assert!(matches!(err, LedgerError::TradeNotFound(_)));
    }

    #[test]
    fn test_pnl_frozen_after_close() {
        let ledger = ledger();
        let trade = open(&ledger, dec!(2.00), 2, dec!(2.00));
        ledger
            .close_fill(trade.trade_id, 2, dec!(2.10), dec!(2.10), Utc::now())
            .unwrap();

        let first = ledger.get_trade(trade.trade_id).unwrap();
        // Further fill attempts fail and do not perturb settled values.
        let _ = ledger.close_fill(trade.trade_id, 1, dec!(2.10), dec!(2.10), Utc::now());
        let second = ledger.get_trade(trade.trade_id).unwrap();
        assert_eq!(first.net_pnl, second.net_pnl);
        assert_eq!(first.outcome, second.outcome);
        assert_eq!(first.closed_at, second.closed_at);
    }

    #[test]
    fn test_list_trades_filters_and_pagination() {
        let ledger = ledger();
        for i in 0..5 {
            let price = dec!(2.00) + Decimal::from(i) * dec!(0.01);
            ledger
                .open_trade("alice", spy_call(), price, 1, price, Utc::now())
                .unwrap();
        }
        let trade = ledger
            .open_trade("bob", spy_call(), dec!(2.00), 1, dec!(2.00), Utc::now())
            .unwrap();
        ledger
            .close_fill(trade.trade_id, 1, dec!(2.05), dec!(2.05), Utc::now())
            .unwrap();

        let query = TradeListQuery {
            user_id: Some("alice".to_string()),
            status: None,
            outcome: None,
            underlying: None,
            limit: 3,
            offset: 0,
        };
        let (page, total) = ledger.list_trades(&query);
        assert_eq!(total, 5);
        assert_eq!(page.len(), 3);
        assert!(page.iter().all(|t| t.user_id == "alice"));

        let query = TradeListQuery {
            user_id: None,
            status: Some("closed".to_string()),
            outcome: Some("win".to_string()),
            underlying: Some("SPY".to_string()),
            limit: 100,
            offset: 0,
        };
        let (page, total) = ledger.list_trades(&query);
        assert_eq!(total, 1);
        assert_eq!(page[0].user_id, "bob");
    }

    #[test]
    fn test_counts() {
        let ledger = ledger();
        open(&ledger, dec!(2.00), 2, dec!(2.00));
        open(&ledger, dec!(9.00), 2, dec!(2.00)); // rejected
        let trade = ledger
            .open_trade("bob", spy_call(), dec!(2.00), 1, dec!(2.00), Utc::now())
            .unwrap();
        ledger
            .close_fill(trade.trade_id, 1, dec!(2.00), dec!(2.00), Utc::now())
            .unwrap();

        let counts = ledger.counts();
        assert_eq!(counts.total_trades, 3);
        assert_eq!(counts.open_trades, 1);
        assert_eq!(counts.closed_trades, 1);
        assert_eq!(counts.rejected_trades, 1);
        assert_eq!(counts.total_fills, 1);
        assert_eq!(counts.user_count, 2);
    }
}
