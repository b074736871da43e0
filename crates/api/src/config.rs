use std::path::PathBuf;

use solarfy_core::billing::Plan;
use solarfy_core::project_image::DEFAULT_MAX_IMAGE_BYTES;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. Integrations
/// that need credentials are `None` unless their variables are set.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long background tasks get to drain on shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Root directory for uploaded project images (default: `./uploads`).
    pub upload_dir: PathBuf,
    /// Largest accepted upload in bytes, images and CSVs alike (default: 10 MiB).
    pub max_upload_bytes: usize,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    pub stripe: Option<StripeConfig>,
    pub enphase: Option<EnphaseConfig>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:3001`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    /// | `UPLOAD_DIR`           | `./uploads`                |
    /// | `MAX_UPLOAD_BYTES`     | `10485760`                 |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3001".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let upload_dir = PathBuf::from(
            std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".into()),
        );

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .ok()
            .map(|v| v.parse().expect("MAX_UPLOAD_BYTES must be a valid usize"))
            .unwrap_or(DEFAULT_MAX_IMAGE_BYTES);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            upload_dir,
            max_upload_bytes,
            jwt: JwtConfig::from_env(),
            stripe: StripeConfig::from_env(),
            enphase: EnphaseConfig::from_env(),
        }
    }
}

/// Stripe Checkout and webhook settings.
#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    /// Signing secret for `POST /billing/webhook`.
    pub webhook_secret: Option<String>,
    pub starter_price_id: Option<String>,
    pub professional_price_id: Option<String>,
    pub enterprise_price_id: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
    pub api_base: String,
}

impl StripeConfig {
    /// Returns `None` when `STRIPE_SECRET_KEY` is not set.
    ///
    /// | Env Var                        | Default                                  |
    /// |--------------------------------|------------------------------------------|
    /// | `STRIPE_SECRET_KEY`            | --                                       |
    /// | `STRIPE_WEBHOOK_SECRET`        | --                                       |
    /// | `STRIPE_PRICE_STARTER`         | --                                       |
    /// | `STRIPE_PRICE_PROFESSIONAL`    | --                                       |
    /// | `STRIPE_PRICE_ENTERPRISE`      | --                                       |
    /// | `STRIPE_SUCCESS_URL`           | `http://localhost:3001/billing?success=1`|
    /// | `STRIPE_CANCEL_URL`            | `http://localhost:3001/billing`          |
    pub fn from_env() -> Option<Self> {
        let secret_key = std::env::var("STRIPE_SECRET_KEY").ok().filter(|s| !s.is_empty())?;
        Some(Self {
            secret_key,
            webhook_secret: std::env::var("STRIPE_WEBHOOK_SECRET").ok(),
            starter_price_id: std::env::var("STRIPE_PRICE_STARTER").ok(),
            professional_price_id: std::env::var("STRIPE_PRICE_PROFESSIONAL").ok(),
            enterprise_price_id: std::env::var("STRIPE_PRICE_ENTERPRISE").ok(),
            success_url: std::env::var("STRIPE_SUCCESS_URL")
                .unwrap_or_else(|_| "http://localhost:3001/billing?success=1".into()),
            cancel_url: std::env::var("STRIPE_CANCEL_URL")
                .unwrap_or_else(|_| "http://localhost:3001/billing".into()),
            api_base: "https://api.stripe.com".into(),
        })
    }

    /// Configured Stripe price for `plan`.
    pub fn price_for(&self, plan: Plan) -> Option<&str> {
        match plan {
            Plan::Starter => self.starter_price_id.as_deref(),
            Plan::Professional => self.professional_price_id.as_deref(),
            Plan::Enterprise => self.enterprise_price_id.as_deref(),
        }
    }
}

/// Enphase Enlighten v4 API credentials.
#[derive(Debug, Clone)]
pub struct EnphaseConfig {
    pub api_key: String,
    pub access_token: String,
    pub base_url: String,
}

impl EnphaseConfig {
    /// Returns `None` unless both `ENPHASE_API_KEY` and `ENPHASE_ACCESS_TOKEN`
    /// are set. `ENPHASE_BASE_URL` defaults to the public API host.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("ENPHASE_API_KEY").ok()?;
        let access_token = std::env::var("ENPHASE_ACCESS_TOKEN").ok()?;
        Some(Self {
            api_key,
            access_token,
            base_url: std::env::var("ENPHASE_BASE_URL")
                .unwrap_or_else(|_| "https://api.enphaseenergy.com".into()),
        })
    }
}
