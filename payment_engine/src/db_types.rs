use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

pub use sps_common::MinorUnits;

//--------------------------------------   PaymentStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// The payment has been recorded locally; the processor has not reported settlement yet.
    #[default]
    Created,
    /// The processor has reported successful settlement for this payment.
    Succeeded,
}

impl PaymentStatus {
    /// Collapse the processor's status vocabulary onto the two states this system tracks. Only
    /// "succeeded" is ever reconciled; every other processor status means the intent is still
    /// awaiting settlement.
    pub fn from_processor_status(status: &str) -> Self {
        if status == "succeeded" {
            PaymentStatus::Succeeded
        } else {
            PaymentStatus::Created
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Created => write!(f, "Created"),
            PaymentStatus::Succeeded => write!(f, "Succeeded"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid payment status: {0}")]
pub struct PaymentStatusParseError(String);

impl FromStr for PaymentStatus {
    type Err = PaymentStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Created" | "created" => Ok(PaymentStatus::Created),
            "Succeeded" | "succeeded" => Ok(PaymentStatus::Succeeded),
            _ => Err(PaymentStatusParseError(s.to_string())),
        }
    }
}

impl From<String> for PaymentStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid payment status: {value}. But this conversion cannot fail. Defaulting to Created");
            PaymentStatus::Created
        })
    }
}

//--------------------------------------     NewPayment      ---------------------------------------------------------
/// A payment record as it leaves the initiation flow, before the store has assigned an id and
/// timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPayment {
    pub amount: MinorUnits,
    pub currency: String,
    pub processor_payment_id: String,
    pub status: PaymentStatus,
}

impl NewPayment {
    pub fn new(amount: MinorUnits, currency: String, processor_payment_id: String, status: PaymentStatus) -> Self {
        Self { amount, currency, processor_payment_id, status }
    }
}

//--------------------------------------      Payment        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub amount: MinorUnits,
    pub currency: String,
    /// Assigned by the processor at intent-creation time. Unique, and immutable once set.
    pub processor_payment_id: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
