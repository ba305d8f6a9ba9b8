use super::{non_null, CreateTransfer, Patch, UpdateTransfer};
use crate::entities::{inventory_movement, stock_record, MovementType};
use chrono::{DateTime, Utc};
use sea_orm::{NotSet, Set};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

const MAX_ORDER_ID_LEN: usize = 50;

// Stock records

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateStockRecord {
    pub model_id: i32,
    pub stock_quantity: i32,
}

impl CreateTransfer<stock_record::ActiveModel> for CreateStockRecord {
    fn into_active_model(self) -> stock_record::ActiveModel {
        stock_record::ActiveModel {
            model_id: Set(self.model_id),
            stock_quantity: Set(self.stock_quantity),
            last_updated: NotSet,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateStockRecord {
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub stock_quantity: Option<i32>,
}

impl UpdateTransfer<stock_record::ActiveModel> for UpdateStockRecord {
    fn apply(self, active: &mut stock_record::ActiveModel) {
        if let Some(quantity) = self.stock_quantity {
            active.stock_quantity = Set(quantity);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DeleteStockRecord {
    pub model_id: i32,
}

// Inventory movements

/// One stock change.
///
/// `quantity` is a positive magnitude for `purchase`, `outbound` and `return`;
/// an `adjust` carries its own sign and may not be zero.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "validate_movement_quantity"))]
pub struct CreateInventoryMovement {
    pub model_id: i32,
    #[serde(default)]
    #[validate(length(min = 1, max = 50))]
    pub order_id: Option<String>,
    pub movement_type: MovementType,
    pub quantity: i32,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub note: Option<String>,
}

fn validate_movement_quantity(movement: &CreateInventoryMovement) -> Result<(), ValidationError> {
    let valid = match movement.movement_type {
        MovementType::Adjust => movement.quantity != 0,
        _ => movement.quantity >= 1,
    };
    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("quantity");
        err.message = Some(
            format!(
                "invalid quantity {} for a '{}' movement",
                movement.quantity, movement.movement_type
            )
            .into(),
        );
        Err(err)
    }
}

impl CreateInventoryMovement {
    pub fn signed_delta(&self) -> i32 {
        self.movement_type.signed_delta(self.quantity)
    }
}

impl CreateTransfer<inventory_movement::ActiveModel> for CreateInventoryMovement {
    fn into_active_model(self) -> inventory_movement::ActiveModel {
        inventory_movement::ActiveModel {
            movement_id: NotSet,
            model_id: Set(self.model_id),
            order_id: Set(self.order_id),
            movement_type: Set(self.movement_type),
            quantity: Set(self.quantity),
            created_at: NotSet,
            note: Set(self.note),
        }
    }
}

/// Corrects a ledger row. Does not touch the stock record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "validate_movement_patch"))]
pub struct UpdateInventoryMovement {
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub movement_type: Option<MovementType>,
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub quantity: Option<i32>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub order_id: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub note: Patch<String>,
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

fn validate_movement_patch(patch: &UpdateInventoryMovement) -> Result<(), ValidationError> {
    if patch.quantity == Some(0) {
        return Err(ValidationError::new("quantity"));
    }
    if let Some(order_id) = patch.order_id.as_value() {
        if order_id.is_empty() || order_id.chars().count() > MAX_ORDER_ID_LEN {
            return Err(ValidationError::new("order_id"));
        }
    }
    Ok(())
}

impl UpdateTransfer<inventory_movement::ActiveModel> for UpdateInventoryMovement {
    fn apply(self, active: &mut inventory_movement::ActiveModel) {
        if let Some(movement_type) = self.movement_type {
            active.movement_type = Set(movement_type);
        }
        if let Some(quantity) = self.quantity {
            active.quantity = Set(quantity);
        }
        self.order_id.apply_to(&mut active.order_id);
        self.note.apply_to(&mut active.note);
        if let Some(created_at) = self.created_at {
            active.created_at = Set(created_at);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DeleteInventoryMovement {
    pub movement_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::from_json;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("purchase", 5, true)]
    #[case("outbound", 2, true)]
    #[case("return", 1, true)]
    #[case("adjust", -3, true)]
    #[case("outbound", -2, false)]
    #[case("purchase", 0, false)]
    #[case("adjust", 0, false)]
    fn movement_quantity_rules(#[case] kind: &str, #[case] quantity: i32, #[case] ok: bool) {
        let result = from_json::<CreateInventoryMovement>(json!({
            "model_id": 1,
            "movement_type": kind,
            "quantity": quantity
        }));
        assert_eq!(result.is_ok(), ok, "{} {}", kind, quantity);
    }

    #[test]
    fn unknown_movement_type_is_rejected() {
        let result = from_json::<CreateInventoryMovement>(json!({
            "model_id": 1,
            "movement_type": "transfer",
            "quantity": 1
        }));
        assert!(result.is_err());
    }

    #[test]
    fn outbound_movement_reduces_stock() {
        let movement: CreateInventoryMovement = from_json(json!({
            "model_id": 1,
            "order_id": "ORD-1001",
            "movement_type": "outbound",
            "quantity": 2,
            "note": "shipped"
        }))
        .unwrap();
        assert_eq!(movement.signed_delta(), -2);
    }

    #[test]
    fn patch_can_clear_the_order_reference() {
        let patch: UpdateInventoryMovement = from_json(json!({ "order_id": null })).unwrap();
        let mut active = inventory_movement::ActiveModel {
            order_id: sea_orm::Unchanged(Some("ORD-1".into())),
            ..Default::default()
        };
        patch.apply(&mut active);
        assert_eq!(active.order_id, Set(None));
        assert!(!active.note.is_set());
    }

    #[test]
    fn patch_rejects_overlong_order_reference() {
        let patch = UpdateInventoryMovement {
            order_id: Patch::Value("O".repeat(51)),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }
}
