//! # Payment server
//! This module hosts the HTTP surface of the payment server. It is responsible for:
//! Accepting payment initiation requests and forwarding them to the payment processor.
//! Listening for incoming webhook notifications from the processor and reconciling the local
//! payment records they refer to.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more
//! information. The processor credentials are required; startup aborts without them.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/create-payment-intent`: Creates a payment intent with the processor and records it.
//! * `/webhook`: The webhook route for receiving signed settlement events from the processor.

pub mod config;
pub mod data_objects;
pub mod errors;

pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
