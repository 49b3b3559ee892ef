//! Money amounts.
//!
//! Credits and prices are stored and summed as integer euro cents
//! ([`Cents`]), so ledger balances are exact in any order. JSON bodies carry
//! euros as decimal numbers; the [`euros`] and [`euros_opt`] serde modules
//! convert at that edge.

use crate::error::CoreError;

/// Amount in euro cents.
pub type Cents = i64;

/// Largest accepted amount, in euros, on input.
pub const MAX_EUROS: f64 = 1_000_000_000.0;

/// Convert a euro amount to cents, rounding to the nearest cent.
pub fn from_euros(euros: f64) -> Result<Cents, CoreError> {
    if !euros.is_finite() {
        return Err(CoreError::Validation("Amount must be a finite number".into()));
    }
    if euros.abs() > MAX_EUROS {
        return Err(CoreError::Validation(format!(
            "Amount must not exceed {MAX_EUROS} in magnitude"
        )));
    }
    Ok((euros * 100.0).round() as Cents)
}

pub fn to_euros(cents: Cents) -> f64 {
    cents as f64 / 100.0
}

/// `percent` of `amount`, rounded half away from zero to whole cents.
pub fn percent_of(amount: Cents, percent: i64) -> Cents {
    let scaled = amount * percent;
    let half = if scaled < 0 { -50 } else { 50 };
    (scaled + half) / 100
}

/// Serde adapter: a [`Cents`] field read and written as euros.
pub mod euros {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Cents;

    pub fn serialize<S: Serializer>(cents: &Cents, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(super::to_euros(*cents))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Cents, D::Error> {
        let euros = f64::deserialize(deserializer)?;
        super::from_euros(euros).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for `Option<Cents>`. Pair with `#[serde(default)]`.
pub mod euros_opt {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Cents;

    pub fn serialize<S: Serializer>(cents: &Option<Cents>, serializer: S) -> Result<S::Ok, S::Error> {
        match cents {
            Some(c) => serializer.serialize_some(&super::to_euros(*c)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Cents>, D::Error> {
        Option::<f64>::deserialize(deserializer)?
            .map(super::from_euros)
            .transpose()
            .map_err(serde::de::Error::custom)
    }
}
