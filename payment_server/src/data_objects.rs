use serde::{Deserialize, Serialize};
use sps_common::MinorUnits;

use crate::errors::ServerError;

/// The payment initiation request body. The shape is checked by deserialization; the value
/// constraints are checked by [`Self::validate`] before anything else happens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntentRequest {
    pub amount: i64,
    pub currency: String,
}

impl PaymentIntentRequest {
    /// The amount must be a positive integer in minor currency units, and the currency a 3-letter
    /// ISO code (normalized to lowercase). Anything else is a client error, and no call or write
    /// may happen.
    pub fn validate(&self) -> Result<(MinorUnits, String), ServerError> {
        if self.amount <= 0 {
            return Err(ServerError::InvalidRequestBody(format!(
                "amount must be a positive integer, got {}",
                self.amount
            )));
        }
        let currency = self.currency.trim().to_ascii_lowercase();
        if currency.len() != 3 || !currency.bytes().all(|b| b.is_ascii_lowercase()) {
            return Err(ServerError::InvalidRequestBody(format!(
                "currency must be a 3-letter ISO code, got {:?}",
                self.currency
            )));
        }
        Ok((MinorUnits::from(self.amount), currency))
    }
}

/// The successful initiation response. The client secret is opaque to this system; the payer's
/// client uses it to complete authorization directly with the processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

/// The webhook acknowledgment body, returned for every event that was processed without error,
/// whether or not it mutated state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub status: String,
}

impl WebhookAck {
    pub fn success() -> Self {
        Self { status: "success".to_string() }
    }
}
