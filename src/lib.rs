//! # Trade Tracker Backend - REST API Server
//!
//! A REST API backend for tracking options-trading performance across a
//! company of traders. Built with [Axum](https://crates.io/crates/axum) for
//! async HTTP handling and provides OpenAPI/Swagger documentation via
//! [utoipa](https://crates.io/crates/utoipa).
//!
//! ## Key Features
//!
//! - **Trade Lifecycle**: Open trades, apply partial or complete closing
//!   fills, and settle net P&L when a position is fully closed.
//!
//! - **Price Reconciliation**: Every fill price is validated against a fresh
//!   reference price within a configurable tolerance band.
//!
//! - **Session Gating**: Trading operations are only accepted while the
//!   exchange session (America/New_York) is open.
//!
//! - **Performance Statistics**: Win rate, ROI, win streaks, and a company
//!   leaderboard ranked by net P&L.
//!
//! - **Follow Entitlements**: Quota-bounded copy-trade notifications from
//!   leader traders to their followers.
//!
//! - **OpenAPI Documentation**: Auto-generated Swagger UI for API exploration
//!   and testing at `/swagger-ui/`.
//!
//! - **Structured Logging**: Request tracing with `tower-http` for debugging
//!   and monitoring.
//!
//! - **Thread-Safe State**: Shared application state using `Arc` and
//!   `DashMap` for concurrent request handling.
//!
//! ## Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Route handlers, middleware, and router configuration |
//! | [`auth`] | API key management and rate limiting |
//! | [`config`] | TOML configuration loading and validation |
//! | [`db`] | Optional PostgreSQL audit trail |
//! | [`error`] | API error types with `IntoResponse` implementation |
//! | [`follows`] | Follow purchases and copy-trade notifications |
//! | [`marketdata`] | Reference price store and simulated price feed |
//! | [`models`] | Request/response DTOs with OpenAPI schemas |
//! | [`settlement`] | Trade ledger, session calendar, and statistics |
//! | [`state`] | Application state management |
//!
//! ## API Endpoints
//!
//! ### Health & Statistics
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/api/v1/stats` | Global statistics |
//! | GET | `/api/v1/leaderboard` | Company leaderboard |
//! | GET | `/api/v1/users/{user_id}/stats` | Per-user statistics |
//!
//! ### Trades
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/v1/trades` | Open a trade |
//! | GET | `/api/v1/trades` | List trades with filters |
//! | GET | `/api/v1/trades/{trade_id}` | Get trade detail |
//! | POST | `/api/v1/trades/{trade_id}/fills` | Apply a closing fill |
//! | GET | `/api/v1/trades/{trade_id}/fills` | List fills |
//!
//! ### Market
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/v1/market/session` | Session status |
//! | GET | `/api/v1/prices` | All reference prices |
//! | POST | `/api/v1/prices` | Ingest a reference price |
//! | GET | `/api/v1/prices/{symbol}` | Latest price for a symbol |
//!
//! ### Follows
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/v1/follows` | Create a follow purchase |
//! | GET | `/api/v1/follows/{user_id}` | List purchases for a follower |
//! | GET | `/api/v1/follows/{user_id}/notifications` | Copy-trade notifications |
//!
//! ### Authentication
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/v1/auth/keys` | Create an API key |
//! | GET | `/api/v1/auth/keys` | List API keys |
//! | DELETE | `/api/v1/auth/keys/{key_id}` | Revoke an API key |
//!
//! ## Example Usage
//!
//! ### Starting the Server
//!
//! ```bash
//! # Development mode
//! cargo run
//!
//! # With a configuration file
//! TRACKER_CONFIG=config.toml cargo run
//!
//! # With the PostgreSQL audit trail enabled
//! DATABASE_URL=postgres://localhost/tracker cargo run
//! ```
//!
//! ### API Requests
//!
//! ```bash
//! # Ingest a reference price
//! curl -X POST http://localhost:8080/api/v1/prices \
//!   -H "Content-Type: application/json" \
//!   -d '{"symbol": "SPY", "price": "450.25"}'
//!
//! # Open a trade
//! curl -X POST http://localhost:8080/api/v1/trades \
//!   -H "Content-Type: application/json" \
//!   -d '{"user_id": "alice", "underlying": "SPY", "strike": "450",
//!        "option_type": "call", "expiry": "2026-03-20",
//!        "price": "450.00", "contracts": 10}'
//!
//! # Close half the position
//! curl -X POST http://localhost:8080/api/v1/trades/{trade_id}/fills \
//!   -H "Content-Type: application/json" \
//!   -d '{"contracts": 5, "price": "455.00"}'
//!
//! # Check the leaderboard
//! curl http://localhost:8080/api/v1/leaderboard
//! ```
//!
//! ## Swagger UI
//!
//! Once the server is running, access the interactive API documentation at:
//!
//! ```text
//! http://localhost:8080/swagger-ui/
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod follows;
pub mod marketdata;
pub mod models;
pub mod settlement;
pub mod state;
