//! Configuration module for the Zephyre catalog gateway
//!
//! Handles loading environment variables and application configuration.

use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Base URL for the upstream aggregation API
    pub upstream_base_url: String,
    /// Base URL for the upstream schedule feed
    pub schedule_base_url: String,
    /// API key sent with every upstream request
    pub upstream_api_key: String,
    /// Report relay configuration
    pub relay: RelayConfig,
}

/// Configuration for the report relay collaborator
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Webhook URL of the messaging-bot process, if configured
    pub webhook_url: Option<String>,
    /// Upper bound on a single delivery attempt
    pub delivery_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// # Panics
    /// Panics if `PORT` is set to a non-numeric value
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("PORT must be a valid number"),
            upstream_base_url: env::var("UPSTREAM_BASE_URL")
                .unwrap_or_else(|_| "https://api.maelyn.sbs/api/otakudesu".to_string()),
            schedule_base_url: env::var("SCHEDULE_BASE_URL")
                .unwrap_or_else(|_| "https://api.maelyn.sbs/api/jadwal/anime".to_string()),
            upstream_api_key: env::var("UPSTREAM_API_KEY").unwrap_or_default(),
            relay: RelayConfig {
                webhook_url: env::var("REPORT_WEBHOOK_URL").ok(),
                delivery_timeout: Duration::from_secs(
                    env::var("REPORT_TIMEOUT_SECS")
                        .ok()
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(15),
                ),
            },
        }
    }
}
