use super::{non_null, validate_non_negative_decimal, CreateTransfer, UpdateTransfer};
use crate::entities::{purchase_batch, purchase_item, PurchaseBatchStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{NotSet, Set};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

// Purchase batches

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreatePurchaseBatch {
    pub supplier_id: i32,
    pub status: PurchaseBatchStatus,
}

impl CreateTransfer<purchase_batch::ActiveModel> for CreatePurchaseBatch {
    fn into_active_model(self) -> purchase_batch::ActiveModel {
        purchase_batch::ActiveModel {
            batch_id: NotSet,
            supplier_id: Set(self.supplier_id),
            created_at: NotSet,
            status: Set(self.status),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdatePurchaseBatch {
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub supplier_id: Option<i32>,
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<PurchaseBatchStatus>,
    /// Back-dates a batch that was recorded late
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl UpdateTransfer<purchase_batch::ActiveModel> for UpdatePurchaseBatch {
    fn apply(self, active: &mut purchase_batch::ActiveModel) {
        if let Some(supplier_id) = self.supplier_id {
            active.supplier_id = Set(supplier_id);
        }
        if let Some(status) = self.status {
            active.status = Set(status);
        }
        if let Some(created_at) = self.created_at {
            active.created_at = Set(created_at);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DeletePurchaseBatch {
    pub batch_id: i32,
}

/// Batch header plus its lines, stored together
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "validate_has_lines"))]
pub struct CreatePurchaseBatchWithItems {
    pub supplier_id: i32,
    pub status: PurchaseBatchStatus,
    #[validate]
    pub items: Vec<PurchaseLine>,
}

fn validate_has_lines(batch: &CreatePurchaseBatchWithItems) -> Result<(), ValidationError> {
    if batch.items.is_empty() {
        let mut err = ValidationError::new("items");
        err.message = Some("a purchase batch needs at least one line".into());
        return Err(err);
    }
    Ok(())
}

impl CreatePurchaseBatchWithItems {
    pub fn into_parts(self) -> (CreatePurchaseBatch, Vec<PurchaseLine>) {
        (
            CreatePurchaseBatch {
                supplier_id: self.supplier_id,
                status: self.status,
            },
            self.items,
        )
    }
}

/// A purchase item before its batch exists
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PurchaseLine {
    pub model_id: i32,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[validate(custom = "validate_non_negative_decimal")]
    pub unit_cost: Decimal,
}

impl PurchaseLine {
    pub fn for_batch(self, batch_id: i32) -> CreatePurchaseItem {
        CreatePurchaseItem {
            batch_id,
            model_id: self.model_id,
            quantity: self.quantity,
            unit_cost: self.unit_cost,
        }
    }
}

// Purchase items

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreatePurchaseItem {
    pub batch_id: i32,
    pub model_id: i32,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[validate(custom = "validate_non_negative_decimal")]
    pub unit_cost: Decimal,
}

impl CreateTransfer<purchase_item::ActiveModel> for CreatePurchaseItem {
    fn into_active_model(self) -> purchase_item::ActiveModel {
        purchase_item::ActiveModel {
            item_id: NotSet,
            batch_id: Set(self.batch_id),
            model_id: Set(self.model_id),
            quantity: Set(self.quantity),
            unit_cost: Set(self.unit_cost),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdatePurchaseItem {
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub model_id: Option<i32>,
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(range(min = 1))]
    pub quantity: Option<i32>,
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(custom = "validate_non_negative_decimal")]
    pub unit_cost: Option<Decimal>,
}

impl UpdateTransfer<purchase_item::ActiveModel> for UpdatePurchaseItem {
    fn apply(self, active: &mut purchase_item::ActiveModel) {
        if let Some(model_id) = self.model_id {
            active.model_id = Set(model_id);
        }
        if let Some(quantity) = self.quantity {
            active.quantity = Set(quantity);
        }
        if let Some(unit_cost) = self.unit_cost {
            active.unit_cost = Set(unit_cost);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DeletePurchaseItem {
    pub item_id: i32,
}
