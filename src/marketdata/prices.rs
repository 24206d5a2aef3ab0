//! Latest reference price per symbol with a staleness window.
//!
//! Fill validation must compare against a price captured "at the moment of
//! the fill attempt"; a quote older than the TTL no longer qualifies and
//! is treated as absent.

use crate::models::ReferencePriceInfo;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy)]
struct Quote {
    price: Decimal,
    updated_at: DateTime<Utc>,
}

/// Concurrent store of the latest reference price per underlying symbol.
pub struct ReferencePriceStore {
    quotes: DashMap<String, Quote>,
    ttl: Duration,
}

impl ReferencePriceStore {
    /// Creates a store whose quotes go stale after `ttl_secs`.
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            quotes: DashMap::new(),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    /// Records a new reference price for a symbol.
    pub fn set_price(&self, symbol: &str, price: Decimal, now: DateTime<Utc>) {
        self.quotes.insert(
            symbol.to_string(),
            Quote {
                price,
                updated_at: now,
            },
        );
    }

    /// Latest price for a symbol if it is still within the staleness
    /// window; `None` for unknown or stale symbols.
    pub fn get_fresh(&self, symbol: &str, now: DateTime<Utc>) -> Option<Decimal> {
        let quote = self.quotes.get(symbol)?;
        if now - quote.updated_at > self.ttl {
            return None;
        }
        Some(quote.price)
    }

    /// Latest quote for a symbol regardless of freshness.
    pub fn get(&self, symbol: &str, now: DateTime<Utc>) -> Option<ReferencePriceInfo> {
        self.quotes.get(symbol).map(|quote| ReferencePriceInfo {
            symbol: symbol.to_string(),
            price: quote.price,
            updated_at: quote.updated_at,
            fresh: now - quote.updated_at <= self.ttl,
        })
    }

    /// Snapshot of all known quotes, sorted by symbol.
    pub fn all(&self, now: DateTime<Utc>) -> Vec<ReferencePriceInfo> {
        let mut prices: Vec<ReferencePriceInfo> = self
            .quotes
            .iter()
            .map(|entry| ReferencePriceInfo {
                symbol: entry.key().clone(),
                price: entry.value().price,
                updated_at: entry.value().updated_at,
                fresh: now - entry.value().updated_at <= self.ttl,
            })
            .collect();
        prices.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        prices
    }
}
