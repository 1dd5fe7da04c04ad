use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The slice of Stripe's payment-intent object that this system consumes. Unknown fields in the
/// API response are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    #[serde(default)]
    pub client_secret: String,
    pub status: String,
}

/// A webhook event envelope, as delivered by the processor. `data.object` carries the
/// event-type-specific payload and is left as raw JSON until the event type is known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventData {
    pub object: Value,
}

impl Event {
    /// Deserialize the embedded object into a payment intent. Only meaningful for
    /// `payment_intent.*` events.
    pub fn payment_intent(&self) -> Result<PaymentIntent, serde_json::Error> {
        serde_json::from_value(self.data.object.clone())
    }
}
