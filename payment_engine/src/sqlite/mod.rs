//! SQLite database module for the Payment Engine.

mod sqlite_impl;

pub mod db;
pub use db::{create_database_if_missing, db_url};
pub use sqlite_impl::SqliteDatabase;
