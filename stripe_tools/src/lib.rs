mod api;
mod config;
mod error;
mod webhook;

mod data_objects;

pub use api::{PaymentProvider, StripeApi};
pub use config::{StripeConfig, DEFAULT_STRIPE_API_BASE};
pub use data_objects::{Event, EventData, PaymentIntent};
pub use error::{StripeApiError, WebhookError};
pub use webhook::{WebhookVerifier, STRIPE_SIGNATURE_HEADER};
