//! HTTP client for the Trade Tracker API.

use crate::error::Error;
use crate::types::*;
use reqwest::Client;
use std::time::Duration;
use uuid::Uuid;


/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API (e.g., "http://localhost:8080").
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for the Trade Tracker API.
#[derive(Debug, Clone)]
pub struct TrackerClient {
    client: Client,
    base_url: String,
}

impl TrackerClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Creates a new client with default configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        Self::new(ClientConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        })
    }

    // ========================================================================
    // Health & Stats
    // ========================================================================

    /// Performs a health check.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn health_check(&self) -> Result<HealthResponse, Error> {
        let url = format!("{}/health", self.base_url);
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    /// Gets global statistics.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_global_stats(&self) -> Result<GlobalStatsResponse, Error> {
        let url = format!("{}/api/v1/stats", self.base_url);
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    /// Gets statistics for one user.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_user_stats(&self, user_id: &str) -> Result<UserStatsResponse, Error> {
        let url = format!("{}/api/v1/users/{}/stats", self.base_url, user_id);
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    /// Gets the company leaderboard.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_leaderboard(&self, limit: Option<u32>) -> Result<LeaderboardResponse, Error> {
        let url = match limit {
            Some(limit) => format!("{}/api/v1/leaderboard?limit={}", self.base_url, limit),
            None => format!("{}/api/v1/leaderboard", self.base_url),
        };
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Trades
    // ========================================================================

    /// Opens a trade.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn open_trade(&self, request: &OpenTradeRequest) -> Result<OpenTradeResponse, Error> {
        let url = format!("{}/api/v1/trades", self.base_url);
        let resp = self.client.post(&url).json(request).send().await?;
        self.handle_response(resp).await
    }

    /// Lists trades matching the given filters.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_trades(&self, query: &ListTradesQuery) -> Result<TradeListResponse, Error> {
        let qs = serde_urlencoded::to_string(query)?;
        let url = if qs.is_empty() {
            format!("{}/api/v1/trades", self.base_url)
        } else {
            format!("{}/api/v1/trades?{}", self.base_url, qs)
        };
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    /// Gets one trade including its fills.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_trade(&self, trade_id: Uuid) -> Result<TradeInfo, Error> {
        let url = format!("{}/api/v1/trades/{}", self.base_url, trade_id);
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    /// Applies a closing fill against an open trade.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn close_fill(
        &self,
        trade_id: Uuid,
        request: &CloseFillRequest,
    ) -> Result<CloseFillResponse, Error> {
        let url = format!("{}/api/v1/trades/{}/fills", self.base_url, trade_id);
        let resp = self.client.post(&url).json(request).send().await?;
        self.handle_response(resp).await
    }

    /// Lists fills for one trade.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_fills(&self, trade_id: Uuid) -> Result<FillsListResponse, Error> {
        let url = format!("{}/api/v1/trades/{}/fills", self.base_url, trade_id);
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Market
    // ========================================================================

    /// Gets the current trading session status.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_session_status(&self) -> Result<SessionStatusResponse, Error> {
        let url = format!("{}/api/v1/market/session", self.base_url);
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    /// Gets all known reference prices.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_all_prices(&self) -> Result<PricesListResponse, Error> {
        let url = format!("{}/api/v1/prices", self.base_url);
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    /// Gets the latest reference price for a symbol.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_price(&self, symbol: &str) -> Result<ReferencePriceInfo, Error> {
        let url = format!("{}/api/v1/prices/{}", self.base_url, symbol);
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    /// Ingests a reference price.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn insert_price(
        &self,
        request: &InsertPriceRequest,
    ) -> Result<ReferencePriceInfo, Error> {
        let url = format!("{}/api/v1/prices", self.base_url);
        let resp = self.client.post(&url).json(request).send().await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Follows
    // ========================================================================

    /// Creates a follow purchase.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn create_follow(
        &self,
        request: &CreateFollowRequest,
    ) -> Result<FollowPurchaseInfo, Error> {
        let url = format!("{}/api/v1/follows", self.base_url);
        let resp = self.client.post(&url).json(request).send().await?;
        self.handle_response(resp).await
    }

    /// Lists follow purchases for a follower.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_follows(&self, user_id: &str) -> Result<FollowListResponse, Error> {
        let url = format!("{}/api/v1/follows/{}", self.base_url, user_id);
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    /// Lists copy-trade notifications received by a follower.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_notifications(&self, user_id: &str) -> Result<NotificationsResponse, Error> {
        let url = format!(
            "{}/api/v1/follows/{}/notifications",
            self.base_url, user_id
        );
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Authentication
    // ========================================================================

    /// Creates an API key.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn create_api_key(
        &self,
        request: &CreateApiKeyRequest,
    ) -> Result<CreateApiKeyResponse, Error> {
        let url = format!("{}/api/v1/auth/keys", self.base_url);
        let resp = self.client.post(&url).json(request).send().await?;
        self.handle_response(resp).await
    }

    /// Lists API keys.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_api_keys(&self) -> Result<ApiKeysListResponse, Error> {
        let url = format!("{}/api/v1/auth/keys", self.base_url);
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    /// Revokes an API key.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn delete_api_key(&self, key_id: &str) -> Result<(), Error> {
        let url = format!("{}/api/v1/auth/keys/{}", self.base_url, key_id);
        let resp = self.client.delete(&url).send().await?;
        self.handle_empty_response(resp).await
    }

    // ========================================================================
    // Internal
    // ========================================================================

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();

        if status.is_success() {
            Ok(resp.json().await?)
        } else if status.as_u16() == 404 {
            let text = resp.text().await.unwrap_or_default();
            Err(Error::NotFound(text))
        } else {
            let text = resp.text().await.unwrap_or_default();
            Err(Error::Api {
                status: status.as_u16(),
                message: text,
            })
        }
    }

    async fn handle_empty_response(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();

        if status.is_success() {
            Ok(())
        } else if status.as_u16() == 404 {
            let text = resp.text().await.unwrap_or_default();
            Err(Error::NotFound(text))
        } else {
            let text = resp.text().await.unwrap_or_default();
            Err(Error::Api {
                status: status.as_u16(),
                message: text,
            })
        }
    }
}
