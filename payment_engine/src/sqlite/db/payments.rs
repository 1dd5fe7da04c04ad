use sqlx::SqliteConnection;

use crate::{
    db_types::{NewPayment, Payment, PaymentStatus},
    traits::PaymentStoreError,
};

/// Inserts a new payment into the database using the given connection. This is not atomic. You
/// can embed this call inside a transaction if you need to ensure atomicity, and pass `&mut *tx`
/// as the connection argument.
///
/// The unique index on `processor_payment_id` rejects duplicates, surfaced as
/// [`PaymentStoreError::PaymentAlreadyExists`].
pub async fn insert_payment(payment: NewPayment, conn: &mut SqliteConnection) -> Result<Payment, PaymentStoreError> {
    let processor_payment_id = payment.processor_payment_id.clone();
    let payment = sqlx::query_as(
        r#"
            INSERT INTO payments (
                amount,
                currency,
                processor_payment_id,
                status
            ) VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(payment.amount)
    .bind(payment.currency)
    .bind(payment.processor_payment_id)
    .bind(payment.status)
    .fetch_one(conn)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(de) = &e {
            if de.is_unique_violation() {
                return PaymentStoreError::PaymentAlreadyExists(processor_payment_id);
            }
        }
        PaymentStoreError::from(e)
    })?;
    Ok(payment)
}

/// Returns the payments table entry for the corresponding `processor_payment_id`
pub async fn fetch_payment_by_processor_id(
    processor_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    let payment = sqlx::query_as("SELECT * FROM payments WHERE processor_payment_id = $1")
        .bind(processor_id)
        .fetch_optional(conn)
        .await?;
    Ok(payment)
}

/// Applies the `Succeeded` status to the row matching `processor_payment_id`, returning the
/// updated row, or `None` when no row matches.
///
/// The write is unconditional: re-applying `Succeeded` to an already-succeeded row converges on
/// the same end state, which is what makes redelivered settlement notifications safe.
pub async fn mark_payment_succeeded(
    processor_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    let payment = sqlx::query_as(
        r#"
            UPDATE payments
            SET status = $1, updated_at = CURRENT_TIMESTAMP
            WHERE processor_payment_id = $2
            RETURNING *;
        "#,
    )
    .bind(PaymentStatus::Succeeded)
    .bind(processor_id)
    .fetch_optional(conn)
    .await?;
    Ok(payment)
}
