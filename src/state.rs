//! Application state management.

use crate::auth::ApiKeyStore;
use crate::config::Config;
use crate::db::DatabasePool;
use crate::follows::FollowRegistry;
use crate::marketdata::{PriceSimulator, ReferencePriceStore};
use crate::settlement::{MarketCalendar, TradeLedger};
use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The trade ledger.
    pub ledger: Arc<TradeLedger>,
    /// Reference price store.
    pub prices: Arc<ReferencePriceStore>,
    /// Trading session calendar.
    pub calendar: MarketCalendar,
    /// Follow purchase registry.
    pub follows: Arc<FollowRegistry>,
    /// API key store.
    pub api_key_store: Arc<ApiKeyStore>,
    /// Optional database pool for the audit trail.
    pub db: Option<DatabasePool>,
    /// Price simulator, present when enabled in config.
    pub price_simulator: Option<Arc<PriceSimulator>>,
    /// Application configuration.
    pub config: Config,
}

impl AppState {
    /// Creates application state from configuration.
    ///
    /// # Errors
    /// Returns error when the market session configuration is invalid.
    pub fn from_config(
        config: Config,
        db: Option<DatabasePool>,
    ) -> Result<Self, crate::config::ConfigError> {
        let calendar = config.market.calendar()?;
        let prices = Arc::new(ReferencePriceStore::new(config.settlement.price_ttl_secs));
        let ledger = Arc::new(TradeLedger::new(config.settlement.tolerance()));

        let price_simulator = if config.simulation.enabled {
            let simulator = Arc::new(PriceSimulator::new(
                Arc::clone(&prices),
                config.simulation.clone(),
            ));
            simulator.publish_initial_prices();
            Some(simulator)
        } else {
            None
        };

        Ok(Self {
            ledger,
            prices,
            calendar,
            follows: Arc::new(FollowRegistry::new()),
            api_key_store: Arc::new(ApiKeyStore::new()),
            db,
            price_simulator,
            config,
        })
    }

    /// Creates application state with defaults and no database.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(Config::default(), None)
            .expect("default configuration is valid")
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = AppState::new();
        assert!(state.db.is_none());
        assert!(state.price_simulator.is_none());
        assert_eq!(state.ledger.counts().total_trades, 0);
    }

    #[test]
    fn test_state_with_simulation() {
        let config = Config::parse(
            r#"
[simulation]
enabled = true

[[simulation.assets]]
symbol = "SPY"
initial_price = 450.0
volatility = 0.2
"#,
        )
        .unwrap();

        let state = AppState::from_config(config, None).unwrap();
        assert!(state.price_simulator.is_some());
        // Seed price published at startup.
        assert!(
            state
                .prices
                .get_fresh("SPY", chrono::Utc::now())
                .is_some()
        );
    }
}
