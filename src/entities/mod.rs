//! Persistent record definitions, one module per table.

pub mod buyer;
pub mod category;
pub mod inventory_movement;
pub mod order;
pub mod order_item;
pub mod product;
pub mod product_model;
pub mod purchase_batch;
pub mod purchase_item;
pub mod stock_record;
pub mod supplier;

pub use inventory_movement::MovementType;
pub use order::OrderStatus;
pub use product::ProductStatus;
pub use purchase_batch::PurchaseBatchStatus;

pub use buyer::Entity as Buyer;
pub use category::Entity as Category;
pub use inventory_movement::Entity as InventoryMovement;
pub use order::Entity as Order;
pub use order_item::Entity as OrderItem;
pub use product::Entity as Product;
pub use product_model::Entity as ProductModel;
pub use purchase_batch::Entity as PurchaseBatch;
pub use purchase_item::Entity as PurchaseItem;
pub use stock_record::Entity as StockRecord;
pub use supplier::Entity as Supplier;

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;
    use std::str::FromStr;

    #[test]
    fn order_status_round_trips_through_its_literal() {
        for status in OrderStatus::iter() {
            assert_eq!(OrderStatus::from_str(status.as_str()), Ok(status));
        }
        assert_eq!(OrderStatus::iter().count(), 6);
        assert!(OrderStatus::from_str("refunded").is_err());
    }

    #[test]
    fn product_status_uses_hyphenated_out_of_stock() {
        assert_eq!(ProductStatus::OutOfStock.as_str(), "out-of-stock");
        assert_eq!(
            serde_json::to_value(ProductStatus::OutOfStock).unwrap(),
            serde_json::json!("out-of-stock")
        );
        assert!(ProductStatus::from_str("out_of_stock").is_err());
    }

    #[test]
    fn movement_type_direction() {
        assert_eq!(MovementType::Purchase.signed_delta(5), 5);
        assert_eq!(MovementType::Return.signed_delta(2), 2);
        assert_eq!(MovementType::Outbound.signed_delta(3), -3);
        assert_eq!(MovementType::Adjust.signed_delta(-4), -4);
    }

    #[test]
    fn serde_literals_match_storage_literals() {
        for status in PurchaseBatchStatus::iter() {
            assert_eq!(
                serde_json::to_value(status).unwrap(),
                serde_json::json!(status.as_str())
            );
        }
        for kind in MovementType::iter() {
            assert_eq!(
                serde_json::to_value(kind).unwrap(),
                serde_json::json!(kind.as_str())
            );
        }
        for status in OrderStatus::iter() {
            assert_eq!(
                serde_json::to_value(status).unwrap(),
                serde_json::json!(status.as_str())
            );
        }
    }
}
