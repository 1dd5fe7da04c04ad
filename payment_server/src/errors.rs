use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use payment_engine::PaymentStoreError;
use stripe_tools::{StripeApiError, WebhookError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("The payment processor could not complete the request. {0}")]
    UpstreamError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read the webhook payload. {0}")]
    PayloadReadError(String),
    #[error("The webhook payload exceeds the maximum size of {0} bytes")]
    PayloadTooLarge(usize),
    #[error("Webhook signature invalid or not provided. {0}")]
    AuthenticityError(String),
    #[error("The payment was not found. {0}")]
    PaymentNotFound(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticityError(_) => StatusCode::BAD_REQUEST,
            Self::PaymentNotFound(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::PayloadReadError(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UpstreamError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<PaymentStoreError> for ServerError {
    fn from(e: PaymentStoreError) -> Self {
        match &e {
            PaymentStoreError::PaymentNotFound(_) => Self::PaymentNotFound(e.to_string()),
            PaymentStoreError::PaymentAlreadyExists(_) => Self::BackendError(e.to_string()),
            PaymentStoreError::DatabaseError(msg) => Self::BackendError(format!("Database error: {msg}")),
        }
    }
}

impl From<StripeApiError> for ServerError {
    fn from(e: StripeApiError) -> Self {
        Self::UpstreamError(e.to_string())
    }
}

impl From<WebhookError> for ServerError {
    fn from(e: WebhookError) -> Self {
        Self::AuthenticityError(e.to_string())
    }
}
