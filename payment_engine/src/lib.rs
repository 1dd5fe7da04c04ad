//! Payment Engine
//!
//! The persistence backend for the payment server. It owns the payment records created by the
//! initiation flow and reconciled by the webhook flow.
//!
//! The crate is divided into two main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend. You
//!    should never need to access the database directly; use the [`PaymentFlowApi`] instead. The
//!    exception is the data types used in the database, which are defined in the `db_types`
//!    module and are public.
//! 2. The public API ([`PaymentFlowApi`]), generic over the [`PaymentStore`] trait. A backend
//!    implements the trait in order to serve the payment server.
#[cfg(feature = "sqlite")]
mod sqlite;

pub mod db_types;
mod flow_api;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::{create_database_if_missing, db_url, SqliteDatabase};

pub use flow_api::PaymentFlowApi;
pub use traits::{PaymentStore, PaymentStoreError};
