use std::fmt::Display;

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

//--------------------------------------     MinorUnits      ---------------------------------------------------------
/// A payment amount in minor currency units (cents, pence, etc.), as the processor's API expects
/// it. Stored in the database as a plain integer column.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct MinorUnits(i64);

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in minor currency units: {0}")]
pub struct MinorUnitsConversionError(String);

impl From<i64> for MinorUnits {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for MinorUnits {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for MinorUnits {}

impl TryFrom<u64> for MinorUnits {
    type Error = MinorUnitsConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(MinorUnitsConversionError(format!("Value {} is too large to convert to MinorUnits", value)))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for MinorUnits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl MinorUnits {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }
}
