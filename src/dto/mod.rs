//! Request payloads for creating, patching and deleting records.
//!
//! Create payloads convert into a fresh `ActiveModel`; update payloads are applied
//! onto an `ActiveModel` loaded from storage so that untouched columns stay
//! `Unchanged`.

pub mod buyers;
pub mod catalog;
pub mod inventory;
pub mod orders;
pub mod patch;
pub mod purchasing;
pub mod suppliers;

pub use buyers::*;
pub use catalog::*;
pub use inventory::*;
pub use orders::*;
pub use patch::Patch;
pub use purchasing::*;
pub use suppliers::*;

use crate::errors::ServiceError;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use validator::{Validate, ValidationError};

/// Converts a validated create payload into an insertable active model
pub trait CreateTransfer<A> {
    fn into_active_model(self) -> A;
}

/// Applies a validated update payload onto an active model
pub trait UpdateTransfer<A> {
    fn apply(self, active: &mut A);
}

/// Deserializes `value` into `T` and runs its validation rules
pub fn from_json<T>(value: serde_json::Value) -> Result<T, ServiceError>
where
    T: DeserializeOwned + Validate,
{
    let payload: T = serde_json::from_value(value)?;
    payload.validate()?;
    Ok(payload)
}

/// For update fields whose column is NOT NULL: a missing key stays `None`
/// through `#[serde(default)]`, an explicit `null` is rejected.
pub fn non_null<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

pub(crate) fn validate_non_negative_decimal(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(ValidationError::new("decimal_min_zero"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[derive(Debug, Deserialize, Validate)]
    #[serde(deny_unknown_fields)]
    struct Probe {
        #[serde(default, deserialize_with = "non_null")]
        #[validate(length(min = 1))]
        name: Option<String>,
    }

    #[test]
    fn non_null_accepts_absent_and_value() {
        let absent: Probe = from_json(serde_json::json!({})).unwrap();
        assert_eq!(absent.name, None);

        let present: Probe = from_json(serde_json::json!({ "name": "x" })).unwrap();
        assert_eq!(present.name.as_deref(), Some("x"));
    }

    #[test]
    fn non_null_rejects_explicit_null() {
        let err = from_json::<Probe>(serde_json::json!({ "name": null })).unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }

    #[test]
    fn from_json_runs_validation() {
        let err = from_json::<Probe>(serde_json::json!({ "name": "" })).unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }

    #[test]
    fn negative_money_is_rejected() {
        assert!(validate_non_negative_decimal(&dec!(0)).is_ok());
        assert!(validate_non_negative_decimal(&dec!(-0.01)).is_err());
    }
}
