//! Report relay toward the messaging-bot process
//!
//! User reports are forwarded to a separately running bot over its local
//! webhook. Delivery is best effort: the bot may be offline or mid-restart,
//! so a failed or timed-out delivery is logged and reported back to the
//! caller as a note, never as a request failure.

use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::RelayConfig;

/// Errors raised by one delivery attempt
#[derive(Error, Debug)]
pub enum RelayError {
    /// No webhook URL is configured
    #[error("Report relay is not configured")]
    Unconfigured,

    /// The bot did not answer within the delivery timeout
    #[error("Report delivery timed out after {0:?}")]
    Timeout(Duration),

    /// Connection or protocol error while delivering
    #[error("Failed to deliver report: {0}")]
    Delivery(String),

    /// The bot answered with a non-success status
    #[error("Bot rejected the report with status {0}")]
    Rejected(u16),
}

/// Client for the messaging-bot webhook
#[derive(Clone)]
pub struct ReportRelay {
    client: Client,
    webhook_url: Option<String>,
    delivery_timeout: Duration,
}

impl ReportRelay {
    /// Build a relay from configuration.
    pub fn new(config: &RelayConfig) -> Self {
        let client = Client::builder()
            .timeout(config.delivery_timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            webhook_url: config.webhook_url.clone(),
            delivery_timeout: config.delivery_timeout,
        }
    }

    /// Whether a webhook URL is configured
    pub fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }

    /// Deliver one report message to the bot.
    ///
    /// The attempt is bounded by the configured delivery timeout so a hung
    /// bot cannot stall the calling request.
    pub async fn deliver(&self, message: &str) -> Result<(), RelayError> {
        let url = self.webhook_url.as_deref().ok_or(RelayError::Unconfigured)?;

        let response = self
            .client
            .post(url)
            .json(&json!({ "message": message }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    warn!("Report delivery timed out after {:?}", self.delivery_timeout);
                    RelayError::Timeout(self.delivery_timeout)
                } else {
                    warn!("Report delivery failed: {}", e);
                    RelayError::Delivery(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Bot rejected report with status {}", status);
            return Err(RelayError::Rejected(status.as_u16()));
        }

        info!("Report delivered to bot");
        Ok(())
    }
}
