//! Traits that a database backend must implement to serve the payment server.

mod payment_store;

pub use payment_store::{PaymentStore, PaymentStoreError};
