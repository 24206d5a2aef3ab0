//! HTTP client library for the Trade Tracker API.
//!
//! This crate provides a typed HTTP client for interacting with the Trade
//! Tracker backend API. It supports all REST endpoints.
//!
//! # Example
//!
//! ```no_run
//! use tracker_client::{ClientConfig, TrackerClient};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tracker_client::Error> {
//!     let client = TrackerClient::new(ClientConfig {
//!         base_url: "http://localhost:8080".into(),
//!         timeout: Duration::from_secs(30),
//!     })?;
//!
//!     // Check health
//!     let health = client.health_check().await?;
//!     println!("Status: {}", health.status);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::{ClientConfig, TrackerClient};
pub use error::Error;
pub use types::*;
