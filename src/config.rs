//! Configuration module for loading and parsing TOML configuration files.

use crate::settlement::MarketCalendar;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse TOML configuration.
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// Invalid configuration value.
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Market session configuration.
    pub market: MarketConfig,
    /// Settlement validation configuration.
    pub settlement: SettlementConfig,
    /// Price simulation configuration.
    pub simulation: SimulationConfig,
    /// Follow entitlement defaults.
    pub follows: FollowConfig,
    /// Audit database pool settings.
    pub database: DatabaseConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port number to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Market session configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Session open in exchange-local time, "HH:MM".
    pub open: String,
    /// Session close in exchange-local time, "HH:MM" ("24:00" for midnight).
    pub close: String,
    /// Whether Saturday and Sunday are closed.
    pub weekdays_only: bool,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            open: "09:30".to_string(),
            close: "16:00".to_string(),
            weekdays_only: true,
        }
    }
}

/// Parses "HH:MM" into minutes after midnight. "24:00" maps to 1440.
fn parse_session_time(value: &str) -> Option<u32> {
    let (hours, minutes) = value.split_once(':')?;
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if hours > 24 || minutes > 59 || (hours == 24 && minutes != 0) {
        return None;
    }
    Some(hours * 60 + minutes)
}

impl MarketConfig {
    /// Builds the trading calendar from this configuration.
    ///
    /// # Errors
    /// Returns error for unparseable or inverted session times.
    pub fn calendar(&self) -> Result<MarketCalendar, ConfigError> {
        let open = parse_session_time(&self.open).ok_or_else(|| {
            ConfigError::InvalidValue(format!("market.open not HH:MM: {}", self.open))
        })?;
        let close = parse_session_time(&self.close).ok_or_else(|| {
            ConfigError::InvalidValue(format!("market.close not HH:MM: {}", self.close))
        })?;
        if open >= close {
            return Err(ConfigError::InvalidValue(
                "market.open must be before market.close".to_string(),
            ));
        }
        Ok(MarketCalendar::new(open, close, self.weekdays_only))
    }
}

/// Settlement validation configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SettlementConfig {
    /// Tolerance band around the reference price in basis points.
    pub tolerance_bps: u32,
    /// Reference price staleness window in seconds.
    pub price_ttl_secs: i64,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            tolerance_bps: 500,
            price_ttl_secs: 300,
        }
    }
}

impl SettlementConfig {
    /// Tolerance as a fraction of the reference price.
    #[must_use]
    pub fn tolerance(&self) -> Decimal {
        Decimal::from(self.tolerance_bps) / Decimal::from(10_000u32)
    }
}

/// Price simulation configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Whether the simulated reference feed is enabled.
    pub enabled: bool,
    /// Update interval in milliseconds.
    pub interval_ms: u64,
    /// Simulated assets.
    pub assets: Vec<SimAssetConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_ms: 1000,
            assets: Vec::new(),
        }
    }
}

/// Simulated asset configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SimAssetConfig {
    /// Asset symbol (e.g., "SPY").
    pub symbol: String,
    /// Initial price in dollars.
    pub initial_price: f64,
    /// Annualized volatility (0.0 to 5.0).
    pub volatility: f64,
    /// Drift (expected annual return).
    #[serde(default)]
    pub drift: f64,
}

/// Follow entitlement defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FollowConfig {
    /// Default notification quota per purchase.
    pub default_quota: u32,
    /// Default entitlement duration in days.
    pub default_duration_days: i64,
}

impl Default for FollowConfig {
    fn default() -> Self {
        Self {
            default_quota: 10,
            default_duration_days: 30,
        }
    }
}

/// Audit database pool settings. Only consulted when `DATABASE_URL` is set.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Maximum connections held by the pool.
    pub max_connections: u32,
    /// Seconds to wait for a free connection before giving up.
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout_secs: 5,
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file.
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Arguments
    /// * `content` - TOML content as string.
    ///
    /// # Errors
    /// Returns error if content cannot be parsed.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.market.calendar()?;

        if self.settlement.tolerance_bps == 0 || self.settlement.tolerance_bps > 10_000 {
            return Err(ConfigError::InvalidValue(
                "settlement.tolerance_bps must be between 1 and 10000".to_string(),
            ));
        }
        if self.settlement.price_ttl_secs <= 0 {
            return Err(ConfigError::InvalidValue(
                "settlement.price_ttl_secs must be positive".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "database.max_connections must be positive".to_string(),
            ));
        }
        if self.database.acquire_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "database.acquire_timeout_secs must be positive".to_string(),
            ));
        }
        if self.follows.default_quota == 0 {
            return Err(ConfigError::InvalidValue(
                "follows.default_quota must be positive".to_string(),
            ));
        }
        if self.follows.default_duration_days <= 0 {
            return Err(ConfigError::InvalidValue(
                "follows.default_duration_days must be positive".to_string(),
            ));
        }

        for asset in &self.simulation.assets {
            if asset.symbol.is_empty() {
                return Err(ConfigError::InvalidValue(
                    "asset symbol cannot be empty".to_string(),
                ));
            }
            if asset.initial_price <= 0.0 {
                return Err(ConfigError::InvalidValue(format!(
                    "asset {} initial_price must be positive",
                    asset.symbol
                )));
            }
            if asset.volatility <= 0.0 || asset.volatility > 5.0 {
                return Err(ConfigError::InvalidValue(format!(
                    "asset {} volatility must be between 0 and 5",
                    asset.symbol
                )));
            }
        }

        Ok(())
    }
}
