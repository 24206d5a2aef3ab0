//! Development-mode reference price feed.
//!
//! Drives the reference price store with a geometric Brownian walk per
//! configured symbol so the service can run without an external market
//! data feed.

use crate::config::{SimAssetConfig, SimulationConfig};
use crate::marketdata::ReferencePriceStore;
use chrono::Utc;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info};

/// One standard-normal sample via Box-Muller.
fn standard_normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Geometric Brownian price walker feeding the reference price store.
pub struct PriceSimulator {
    store: Arc<ReferencePriceStore>,
    config: SimulationConfig,
    state: Mutex<SimulatorState>,
}

struct SimulatorState {
    prices: HashMap<String, f64>,
    rng: StdRng,
}

impl PriceSimulator {
    /// Creates a simulator seeding each asset at its configured initial
    /// price.
    pub fn new(store: Arc<ReferencePriceStore>, config: SimulationConfig) -> Self {
        let prices = config
            .assets
            .iter()
            .map(|asset| (asset.symbol.clone(), asset.initial_price))
            .collect();

        Self {
            store,
            config,
            state: Mutex::new(SimulatorState {
                prices,
                rng: StdRng::from_entropy(),
            }),
        }
    }

    /// Advances one asset one step and returns the new price.
    fn step(&self, asset: &SimAssetConfig) -> f64 {
        let mut state = self.state.lock();
        let z = standard_normal(&mut state.rng);
        let current = state
            .prices
            .get(&asset.symbol)
            .copied()
            .unwrap_or(asset.initial_price);

        // One step of the interval length, annualized parameters.
        let dt = self.config.interval_ms as f64 / (365.0 * 24.0 * 3600.0 * 1000.0);
        let next = (current
            * ((asset.drift - 0.5 * asset.volatility * asset.volatility) * dt
                + asset.volatility * dt.sqrt() * z)
                .exp())
        .max(0.01);

        state.prices.insert(asset.symbol.clone(), next);
        next
    }

    /// Publishes the seed prices into the store. Called once at startup so
    /// validation works before the first tick.
    pub fn publish_initial_prices(&self) {
        let now = Utc::now();
        for asset in &self.config.assets {
            if let Ok(price) = Decimal::try_from(asset.initial_price) {
                self.store.set_price(&asset.symbol, price.round_dp(2), now);
            }
        }
    }

    /// Runs the simulation loop, updating the store every tick.
    pub async fn run(self: Arc<Self>) {
        if !self.config.enabled {
            info!("Price simulation disabled");
            return;
        }

        info!(
            "Starting price simulation: {} assets, {}ms interval",
            self.config.assets.len(),
            self.config.interval_ms
        );

        let mut ticker = interval(Duration::from_millis(self.config.interval_ms));

        loop {
            ticker.tick().await;

            let now = Utc::now();
            for asset in &self.config.assets {
                let next = self.step(asset);
                if let Ok(price) = Decimal::try_from(next) {
                    self.store.set_price(&asset.symbol, price.round_dp(2), now);
                    debug!("Price update: {} = {:.2}", asset.symbol, next);
                }
            }
        }
    }
}
