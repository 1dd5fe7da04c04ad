use thiserror::Error;

#[derive(Debug, Error)]
pub enum StripeApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Request to the payment API failed: {0}")]
    RequestError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Payment API call failed. Error {status}. {message}")]
    ApiError { status: u16, message: String },
}

#[derive(Debug, Clone, Error)]
pub enum WebhookError {
    #[error("The signature header is malformed: {0}")]
    MalformedHeader(String),
    #[error("The payload signature does not match")]
    SignatureMismatch,
    #[error("The signature timestamp is outside the tolerance window ({0}s old)")]
    StaleTimestamp(i64),
    #[error("Could not deserialize the event payload: {0}")]
    InvalidPayload(String),
}
