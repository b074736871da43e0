//! Enphase Enlighten v4 monitoring client.

use serde::{Deserialize, Serialize};

use crate::config::EnphaseConfig;

/// Errors from the Enphase API layer.
#[derive(Debug, thiserror::Error)]
pub enum EnphaseError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The system id is unknown to Enphase or not shared with our token.
    #[error("Enphase system '{0}' not found")]
    SystemNotFound(String),

    /// Enphase returned any other non-2xx status code.
    #[error("Enphase API error ({status}): {body}")]
    ApiError { status: u16, body: String },
}

/// Subset of `GET /api/v4/systems/{id}/summary` that the dashboard shows.
///
/// Power is in watts, energy in watt-hours, timestamps in Unix seconds.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemSummary {
    pub system_id: Option<i64>,
    pub status: Option<String>,
    pub current_power: Option<i64>,
    pub energy_today: Option<i64>,
    pub energy_lifetime: Option<i64>,
    pub size_w: Option<i64>,
    pub modules: Option<i64>,
    pub last_report_at: Option<i64>,
    pub operational_at: Option<i64>,
}

/// HTTP client for the Enphase API.
pub struct EnphaseClient {
    client: reqwest::Client,
    config: EnphaseConfig,
}

impl EnphaseClient {
    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn new(client: reqwest::Client, config: EnphaseConfig) -> Self {
        Self { client, config }
    }

    /// Fetch the live summary of one system.
    pub async fn system_summary(&self, system_id: &str) -> Result<SystemSummary, EnphaseError> {
        let response = self
            .client
            .get(summary_url(&self.config.base_url, system_id))
            .query(&[("key", self.config.api_key.as_str())])
            .bearer_auth(&self.config.access_token)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(EnphaseError::SystemNotFound(system_id.to_string()));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(EnphaseError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<SystemSummary>().await?)
    }
}

fn summary_url(base_url: &str, system_id: &str) -> String {
    format!(
        "{}/api/v4/systems/{}/summary",
        base_url.trim_end_matches('/'),
        system_id.trim()
    )
}
