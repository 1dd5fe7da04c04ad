use thiserror::Error;

use crate::db_types::{NewPayment, Payment};

/// This trait defines the behaviour of backends supporting the payment server.
///
/// This behaviour includes:
/// * Recording payments as the initiation flow creates intents with the processor.
/// * Reconciling payments when the processor reports settlement via webhook.
#[allow(async_fn_in_trait)]
pub trait PaymentStore {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Insert a brand-new payment record and return the stored row.
    ///
    /// The processor assigns a fresh id on every successful intent creation, so an existing row
    /// with the same `processor_payment_id` indicates a fault upstream of the store; the insert
    /// fails with [`PaymentStoreError::PaymentAlreadyExists`] rather than overwrite anything.
    async fn insert_payment(&self, payment: NewPayment) -> Result<Payment, PaymentStoreError>;

    /// Fetch the payment record carrying the given processor payment id, if one exists.
    async fn fetch_payment_by_processor_id(&self, processor_id: &str) -> Result<Option<Payment>, PaymentStoreError>;

    /// Apply the `Succeeded` status to the payment carrying the given processor payment id and
    /// return the updated row.
    ///
    /// The write is issued even when the row is already `Succeeded`: the processor delivers
    /// settlement events at least once, and re-applying the same terminal status must converge on
    /// the same end state without error.
    ///
    /// Fails with [`PaymentStoreError::PaymentNotFound`] if no row matches, which the caller must
    /// surface rather than swallow: it signals a reconciliation gap.
    async fn confirm_payment(&self, processor_id: &str) -> Result<Payment, PaymentStoreError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), PaymentStoreError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum PaymentStoreError {
    #[error("We have an internal database engine error (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("Cannot insert payment, since it already exists for processor payment id {0}")]
    PaymentAlreadyExists(String),
    #[error("No payment exists for processor payment id {0}")]
    PaymentNotFound(String),
}

impl From<sqlx::Error> for PaymentStoreError {
    fn from(e: sqlx::Error) -> Self {
        PaymentStoreError::DatabaseError(e.to_string())
    }
}
