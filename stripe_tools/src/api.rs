use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client,
};
use serde::de::DeserializeOwned;
use sps_common::MinorUnits;

use crate::{config::StripeConfig, data_objects::PaymentIntent, StripeApiError};

/// Calls against the payment API are bounded by this timeout; an expired call surfaces as a
/// [`StripeApiError::RequestError`].
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The payment-processor operations the server consumes. Handlers are generic over this trait so
/// that endpoint tests can substitute a mock for the live client.
#[allow(async_fn_in_trait)]
pub trait PaymentProvider {
    /// Ask the processor to create a payment intent for the given amount and currency. Returns
    /// the intent record, including the processor-assigned id and the client secret the payer's
    /// client uses to complete authorization.
    async fn create_payment_intent(&self, amount: MinorUnits, currency: &str) -> Result<PaymentIntent, StripeApiError>;
}

#[derive(Clone)]
pub struct StripeApi {
    config: StripeConfig,
    client: Arc<Client>,
}

impl StripeApi {
    pub fn new(config: StripeConfig) -> Result<Self, StripeApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        let bearer = format!("Bearer {}", config.secret_key.reveal());
        let mut val =
            HeaderValue::from_str(&bearer).map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        val.set_sensitive(true);
        headers.insert(AUTHORIZATION, val);
        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_base)
    }

    /// Send a form-encoded POST (the encoding Stripe's REST API expects) and deserialize the JSON
    /// response, or capture the error body on a non-2xx status.
    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, StripeApiError> {
        let url = self.url(path);
        trace!("Sending payment API request: {url}");
        let response =
            self.client.post(url).form(params).send().await.map_err(|e| StripeApiError::RequestError(e.to_string()))?;
        if response.status().is_success() {
            trace!("Payment API request successful. {}", response.status());
            response.json::<T>().await.map_err(|e| StripeApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| StripeApiError::RequestError(e.to_string()))?;
            Err(StripeApiError::ApiError { status, message })
        }
    }
}

impl PaymentProvider for StripeApi {
    async fn create_payment_intent(&self, amount: MinorUnits, currency: &str) -> Result<PaymentIntent, StripeApiError> {
        let params = [("amount", amount.value().to_string()), ("currency", currency.to_string())];
        debug!("Creating payment intent for {amount} {currency}");
        let intent = self.post_form::<PaymentIntent>("/v1/payment_intents", &params).await?;
        info!("Created payment intent {} ({})", intent.id, intent.status);
        Ok(intent)
    }
}
