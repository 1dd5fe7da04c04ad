use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewPayment, Payment},
    traits::{PaymentStore, PaymentStoreError},
};

/// `PaymentFlowApi` is the primary API for recording and reconciling payments in response to
/// intent-creation calls and processor webhook events.
pub struct PaymentFlowApi<B> {
    db: B,
}

impl<B> Debug for PaymentFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentFlowApi")
    }
}

impl<B> PaymentFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> PaymentFlowApi<B>
where B: PaymentStore
{
    /// Record a payment whose intent the processor has just accepted.
    ///
    /// This should be a brand-new payment; the processor assigns a fresh payment id on every
    /// intent creation, so a duplicate here is an error rather than an upsert.
    pub async fn process_new_payment(&self, payment: NewPayment) -> Result<Payment, PaymentStoreError> {
        let payment = self.db.insert_payment(payment).await?;
        debug!(
            "💳️ Payment [{}] recorded with id {} and status {}",
            payment.processor_payment_id, payment.id, payment.status
        );
        Ok(payment)
    }

    /// Reconcile a payment against a settlement notification from the processor.
    ///
    /// The same notification may be delivered more than once; re-confirming an already-succeeded
    /// payment re-applies the same status and is not an error. A notification for a payment this
    /// system never recorded fails with [`PaymentStoreError::PaymentNotFound`].
    pub async fn confirm_payment(&self, processor_id: &str) -> Result<Payment, PaymentStoreError> {
        let payment = self.db.confirm_payment(processor_id).await?;
        debug!("💳️ Payment [{}] reconciled with status {}", payment.processor_payment_id, payment.status);
        Ok(payment)
    }
}
