use std::env;

use chrono::Duration;
use log::*;
use sps_common::Secret;
use stripe_tools::StripeConfig;

use crate::errors::ServerError;

const DEFAULT_SPS_HOST: &str = "127.0.0.1";
const DEFAULT_SPS_PORT: u16 = 8360;
const DEFAULT_WEBHOOK_TOLERANCE_SECS: i64 = 300;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Processor credentials and webhook parameters.
    pub stripe: StripeServerConfig,
}

impl ServerConfig {
    /// Loads the server configuration from environment variables.
    ///
    /// The processor credentials have no usable defaults; a missing `STRIPE_SECRET_KEY` or
    /// `STRIPE_WEBHOOK_SECRET` is an error, and the caller is expected to abort startup.
    pub fn try_from_env() -> Result<Self, ServerError> {
        let host = env::var("SPS_HOST").ok().unwrap_or_else(|| DEFAULT_SPS_HOST.into());
        let port = env::var("SPS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SPS_PORT. {e} Using the default, {DEFAULT_SPS_PORT}, instead."
                    );
                    DEFAULT_SPS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SPS_PORT);
        let database_url = payment_engine::db_url();
        let stripe = StripeServerConfig::try_from_env()?;
        Ok(Self { host, port, database_url, stripe })
    }
}

//---------------------------------------  StripeServerConfig  --------------------------------------------------------
#[derive(Clone, Debug)]
pub struct StripeServerConfig {
    /// Base URL for the processor's REST API. Overridable so tests can point at a local stand-in.
    pub api_base: String,
    /// The confidential API key used to authenticate intent-creation calls.
    pub secret_key: Secret<String>,
    /// The shared secret the processor signs webhook deliveries with.
    pub webhook_secret: Secret<String>,
    /// Webhook signatures with timestamps outside this window are rejected as stale.
    pub webhook_tolerance: Duration,
}

impl StripeServerConfig {
    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret_key = env::var("STRIPE_SECRET_KEY")
            .map_err(|e| ServerError::ConfigurationError(format!("{e} [STRIPE_SECRET_KEY]")))?;
        let webhook_secret = env::var("STRIPE_WEBHOOK_SECRET")
            .map_err(|e| ServerError::ConfigurationError(format!("{e} [STRIPE_WEBHOOK_SECRET]")))?;
        let api_base =
            env::var("STRIPE_API_BASE").ok().unwrap_or_else(|| stripe_tools::DEFAULT_STRIPE_API_BASE.to_string());
        let webhook_tolerance = configure_webhook_tolerance();
        Ok(Self {
            api_base,
            secret_key: Secret::new(secret_key),
            webhook_secret: Secret::new(webhook_secret),
            webhook_tolerance,
        })
    }

    /// The client-side configuration for [`stripe_tools::StripeApi`].
    pub fn stripe_api_config(&self) -> StripeConfig {
        StripeConfig { api_base: self.api_base.clone(), secret_key: self.secret_key.clone() }
    }
}

fn configure_webhook_tolerance() -> Duration {
    env::var("SPS_WEBHOOK_TOLERANCE")
        .map_err(|_| {
            info!(
                "🪛️ SPS_WEBHOOK_TOLERANCE is not set. Using the default value of \
                 {DEFAULT_WEBHOOK_TOLERANCE_SECS} s."
            )
        })
        .and_then(|s| {
            s.parse::<i64>()
                .map(Duration::seconds)
                .map_err(|e| warn!("🪛️ Invalid configuration value for SPS_WEBHOOK_TOLERANCE. {e}"))
        })
        .ok()
        .unwrap_or(Duration::seconds(DEFAULT_WEBHOOK_TOLERANCE_SECS))
}
