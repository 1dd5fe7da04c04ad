//! `SqliteDatabase` is a concrete implementation of a payment server backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements the [`PaymentStore`] trait.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{new_pool, payments};
use crate::{
    db_types::{NewPayment, Payment},
    traits::{PaymentStore, PaymentStoreError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database connection pool for the given URL.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, PaymentStoreError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date. Called once at startup, before the server accepts requests.
    pub async fn run_migrations(&self) -> Result<(), PaymentStoreError> {
        sqlx::migrate!("./src/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| PaymentStoreError::DatabaseError(e.to_string()))?;
        info!("🗃️ Migrations complete");
        Ok(())
    }
}

impl PaymentStore for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_payment(&self, payment: NewPayment) -> Result<Payment, PaymentStoreError> {
        let mut conn = self.pool.acquire().await?;
        let payment = payments::insert_payment(payment, &mut conn).await?;
        debug!("🗃️ Payment [{}] inserted with id {}", payment.processor_payment_id, payment.id);
        Ok(payment)
    }

    async fn fetch_payment_by_processor_id(&self, processor_id: &str) -> Result<Option<Payment>, PaymentStoreError> {
        let mut conn = self.pool.acquire().await?;
        let payment = payments::fetch_payment_by_processor_id(processor_id, &mut conn).await?;
        Ok(payment)
    }

    async fn confirm_payment(&self, processor_id: &str) -> Result<Payment, PaymentStoreError> {
        let mut conn = self.pool.acquire().await?;
        match payments::mark_payment_succeeded(processor_id, &mut conn).await? {
            Some(payment) => {
                debug!("🗃️ Payment [{}] marked as {}", payment.processor_payment_id, payment.status);
                Ok(payment)
            },
            None => Err(PaymentStoreError::PaymentNotFound(processor_id.to_string())),
        }
    }

    async fn close(&mut self) -> Result<(), PaymentStoreError> {
        self.pool.close().await;
        Ok(())
    }
}
