//! # SQLite Database methods
//!
//! This module contains "low-level" SQLite database interactions.
//!
//! All these interactions are maintained by simple functions (rather than stateful structs) that
//! accept a `&mut SqliteConnection` argument. Callers can obtain a connection from a pool, or
//! create an atomic transaction as the need arises and call through to the functions without any
//! other changes.
use std::env;

use log::info;
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Error as SqlxError, Sqlite, SqlitePool};

pub mod payments;

const SQLITE_DB_URL: &str = "sqlite://data/payments.db";

pub fn db_url() -> String {
    let result = env::var("SPS_DATABASE_URL").unwrap_or_else(|_| {
        info!("SPS_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await?;
    Ok(pool)
}

/// Create the database if it does not exist yet. The original deployment stores payments in a
/// file-backed SQLite database that is created on first startup.
pub async fn create_database_if_missing(url: &str) -> Result<(), SqlxError> {
    if !Sqlite::database_exists(url).await.unwrap_or(false) {
        Sqlite::create_database(url).await?;
        info!("Created Sqlite database {url}");
    }
    Ok(())
}
