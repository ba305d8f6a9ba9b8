use super::{non_null, validate_non_negative_decimal, CreateTransfer, Patch, UpdateTransfer};
use crate::entities::{order, order_item, OrderStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{NotSet, Set};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

// Orders

/// New order together with its lines.
///
/// `order_id` is chosen by the caller; see `OrderService::generate_order_id`
/// for a ready-made scheme.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "validate_has_items"))]
pub struct CreateOrder {
    #[validate(length(min = 1, max = 50))]
    pub order_id: String,
    pub buyer_id: i32,
    #[validate(custom = "validate_non_negative_decimal")]
    pub product_total_price: Decimal,
    #[validate(custom = "validate_non_negative_decimal")]
    pub shipping_fee: Decimal,
    #[validate(custom = "validate_non_negative_decimal")]
    pub total_paid: Decimal,
    pub order_status: OrderStatus,
    #[serde(default)]
    pub payment_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub shipped_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[validate]
    pub order_items: Vec<OrderLine>,
}

fn validate_has_items(order: &CreateOrder) -> Result<(), ValidationError> {
    if order.order_items.is_empty() {
        let mut err = ValidationError::new("order_items");
        err.message = Some("an order needs at least one item".into());
        return Err(err);
    }
    Ok(())
}

impl CreateOrder {
    /// Splits the payload into the order row and its item rows
    pub fn into_parts(self) -> (order::ActiveModel, Vec<order_item::ActiveModel>) {
        let order_id = self.order_id.clone();
        let items = self
            .order_items
            .iter()
            .cloned()
            .map(|line| line.for_order(order_id.clone()).into_active_model())
            .collect();
        let order = order::ActiveModel {
            order_id: Set(self.order_id),
            buyer_id: Set(self.buyer_id),
            product_total_price: Set(self.product_total_price),
            shipping_fee: Set(self.shipping_fee),
            total_paid: Set(self.total_paid),
            order_status: Set(self.order_status),
            cancel_reason: Set(None),
            return_refund_status: Set(None),
            created_at: NotSet,
            payment_time: Set(self.payment_time),
            shipped_at: Set(self.shipped_at),
            completed_at: Set(self.completed_at),
        };
        (order, items)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateOrder {
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub order_status: Option<OrderStatus>,
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(custom = "validate_non_negative_decimal")]
    pub product_total_price: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(custom = "validate_non_negative_decimal")]
    pub shipping_fee: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(custom = "validate_non_negative_decimal")]
    pub total_paid: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub cancel_reason: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub return_refund_status: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub payment_time: Patch<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub shipped_at: Patch<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub completed_at: Patch<DateTime<Utc>>,
}

impl UpdateTransfer<order::ActiveModel> for UpdateOrder {
    fn apply(self, active: &mut order::ActiveModel) {
        if let Some(status) = self.order_status {
            active.order_status = Set(status);
        }
        if let Some(price) = self.product_total_price {
            active.product_total_price = Set(price);
        }
        if let Some(fee) = self.shipping_fee {
            active.shipping_fee = Set(fee);
        }
        if let Some(total) = self.total_paid {
            active.total_paid = Set(total);
        }
        self.cancel_reason.apply_to(&mut active.cancel_reason);
        self.return_refund_status
            .apply_to(&mut active.return_refund_status);
        self.payment_time.apply_to(&mut active.payment_time);
        self.shipped_at.apply_to(&mut active.shipped_at);
        self.completed_at.apply_to(&mut active.completed_at);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DeleteOrder {
    #[validate(length(min = 1, max = 50))]
    pub order_id: String,
}

// Order items

/// An order item before its order exists
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "validate_line_returns"))]
pub struct OrderLine {
    pub product_id: i32,
    pub model_id: i32,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub returned_quantity: i32,
    #[validate(custom = "validate_non_negative_decimal")]
    pub sold_price: Decimal,
    #[validate(custom = "validate_non_negative_decimal")]
    pub total_price: Decimal,
}

fn validate_line_returns(line: &OrderLine) -> Result<(), ValidationError> {
    check_returned_quantity(line.quantity, line.returned_quantity)
}

pub(crate) fn check_returned_quantity(
    quantity: i32,
    returned_quantity: i32,
) -> Result<(), ValidationError> {
    if returned_quantity > quantity {
        let mut err = ValidationError::new("returned_quantity");
        err.message = Some(
            format!(
                "returned_quantity {} exceeds quantity {}",
                returned_quantity, quantity
            )
            .into(),
        );
        return Err(err);
    }
    Ok(())
}

impl OrderLine {
    pub fn for_order(self, order_id: String) -> CreateOrderItem {
        CreateOrderItem {
            order_id,
            product_id: self.product_id,
            model_id: self.model_id,
            quantity: self.quantity,
            returned_quantity: self.returned_quantity,
            sold_price: self.sold_price,
            total_price: self.total_price,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "validate_item_returns"))]
pub struct CreateOrderItem {
    #[validate(length(min = 1, max = 50))]
    pub order_id: String,
    pub product_id: i32,
    pub model_id: i32,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub returned_quantity: i32,
    #[validate(custom = "validate_non_negative_decimal")]
    pub sold_price: Decimal,
    #[validate(custom = "validate_non_negative_decimal")]
    pub total_price: Decimal,
}

fn validate_item_returns(item: &CreateOrderItem) -> Result<(), ValidationError> {
    check_returned_quantity(item.quantity, item.returned_quantity)
}

impl CreateTransfer<order_item::ActiveModel> for CreateOrderItem {
    fn into_active_model(self) -> order_item::ActiveModel {
        order_item::ActiveModel {
            item_id: NotSet,
            order_id: Set(self.order_id),
            product_id: Set(self.product_id),
            model_id: Set(self.model_id),
            quantity: Set(self.quantity),
            returned_quantity: Set(self.returned_quantity),
            sold_price: Set(self.sold_price),
            total_price: Set(self.total_price),
        }
    }
}

/// Partial change to an order item; `returned_quantity` is re-checked against
/// the stored quantity when applied by `OrderService::update_item`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateOrderItem {
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
    #[validate(range(min = 0))]
    pub returned_quantity: Option<i32>,
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(custom = "validate_non_negative_decimal")]
    pub sold_price: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(custom = "validate_non_negative_decimal")]
    pub total_price: Option<Decimal>,
}

impl UpdateTransfer<order_item::ActiveModel> for UpdateOrderItem {
    fn apply(self, active: &mut order_item::ActiveModel) {
        if let Some(quantity) = self.quantity {
            active.quantity = Set(quantity);
        }
        if let Some(returned) = self.returned_quantity {
            active.returned_quantity = Set(returned);
        }
        if let Some(price) = self.sold_price {
            active.sold_price = Set(price);
        }
        if let Some(total) = self.total_price {
            active.total_price = Set(total);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DeleteOrderItem {
    pub item_id: i32,
}
