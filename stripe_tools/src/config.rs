use log::*;
use sps_common::Secret;

pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";

#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Base URL for the Stripe REST API. Overridable so tests can point the client at a local
    /// stand-in server.
    pub api_base: String,
    pub secret_key: Secret<String>,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self { api_base: DEFAULT_STRIPE_API_BASE.to_string(), secret_key: Secret::default() }
    }
}

impl StripeConfig {
    pub fn new(secret_key: Secret<String>) -> Self {
        Self { secret_key, ..Default::default() }
    }

    pub fn new_from_env_or_default() -> Self {
        let api_base = std::env::var("STRIPE_API_BASE").unwrap_or_else(|_| DEFAULT_STRIPE_API_BASE.to_string());
        let secret_key = Secret::new(std::env::var("STRIPE_SECRET_KEY").unwrap_or_else(|_| {
            warn!("STRIPE_SECRET_KEY not set. Calls against the payment API will be rejected.");
            String::default()
        }));
        Self { api_base, secret_key }
    }
}
