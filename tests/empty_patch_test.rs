mod common;

use rust_decimal_macros::dec;
use serde_json::json;
use shop_backoffice::{
    dto::{
        from_json, CreateInventoryMovement, CreateOrder, CreatePurchaseBatchWithItems,
        CreateStockRecord, OrderLine, PurchaseLine,
    },
    entities::{MovementType, OrderStatus, PurchaseBatchStatus},
};

fn empty<T>() -> T
where
    T: serde::de::DeserializeOwned + validator::Validate,
{
    from_json(json!({})).unwrap()
}

#[tokio::test]
async fn party_and_catalog_updates_with_empty_payload_change_nothing() {
    let app = common::TestDb::new().await;
    let services = &app.services;
    let supplier = app.supplier("Acme").await;
    let buyer = app.buyer("buyer-01").await;
    let parent = app.category("Home", None).await;
    let category = app.category("Lamps", Some(parent.category_id)).await;
    let product = app.product("Desk Lamp", category.category_id).await;
    let model = app.model(product.product_id, "LAMP-1", dec!(10)).await;

    let same = services
        .suppliers
        .update_supplier(supplier.supplier_id, empty())
        .await
        .unwrap();
    assert_eq!(same, supplier);
    assert_eq!(
        services.suppliers.get_supplier(supplier.supplier_id).await.unwrap(),
        Some(supplier)
    );

    let same = services.buyers.update_buyer(buyer.buyer_id, empty()).await.unwrap();
    assert_eq!(same, buyer);
    assert_eq!(services.buyers.get_buyer(buyer.buyer_id).await.unwrap(), Some(buyer));

    let same = services
        .catalog
        .update_category(category.category_id, empty())
        .await
        .unwrap();
    assert_eq!(same, category);
    assert_eq!(same.parent_id, Some(parent.category_id));

    let same = services
        .catalog
        .update_product(product.product_id, empty())
        .await
        .unwrap();
    assert_eq!(same, product);

    let same = services
        .catalog
        .update_product_model(model.model_id, empty())
        .await
        .unwrap();
    assert_eq!(same, model);
    assert_eq!(
        services.catalog.get_product_model(model.model_id).await.unwrap(),
        Some(model)
    );
}

#[tokio::test]
async fn purchasing_and_inventory_updates_with_empty_payload_change_nothing() {
    let app = common::TestDb::new().await;
    let services = &app.services;
    let supplier = app.supplier("Acme").await;
    let model = app.catalog_with_model("LAMP-2", dec!(10)).await;

    let (batch, items) = services
        .purchasing
        .create_batch_with_items(CreatePurchaseBatchWithItems {
            supplier_id: supplier.supplier_id,
            status: PurchaseBatchStatus::Draft,
            items: vec![PurchaseLine {
                model_id: model.model_id,
                quantity: 3,
                unit_cost: dec!(4),
            }],
        })
        .await
        .unwrap();

    let same = services
        .purchasing
        .update_batch(batch.batch_id, empty())
        .await
        .unwrap();
    assert_eq!(same, batch);

    let same = services
        .purchasing
        .update_item(items[0].item_id, empty())
        .await
        .unwrap();
    assert_eq!(same, items[0]);
    assert_eq!(
        services.purchasing.get_item(items[0].item_id).await.unwrap(),
        Some(items[0].clone())
    );

    let stock = services
        .inventory
        .create_stock_record(CreateStockRecord {
            model_id: model.model_id,
            stock_quantity: 9,
        })
        .await
        .unwrap();
    let same = services
        .inventory
        .update_stock_record(model.model_id, empty())
        .await
        .unwrap();
    assert_eq!(same, stock);

    let (movement, _) = services
        .inventory
        .record_movement(CreateInventoryMovement {
            model_id: model.model_id,
            order_id: None,
            movement_type: MovementType::Adjust,
            quantity: -1,
            note: Some("count".into()),
        })
        .await
        .unwrap();
    let same = services
        .inventory
        .update_movement(movement.movement_id, empty())
        .await
        .unwrap();
    assert_eq!(same, movement);
    assert_eq!(
        services.inventory.get_movement(movement.movement_id).await.unwrap(),
        Some(movement)
    );
}

#[tokio::test]
async fn order_updates_with_empty_payload_change_nothing() {
    let app = common::TestDb::new().await;
    let services = &app.services;
    let buyer = app.buyer("buyer-02").await;
    let model = app.catalog_with_model("LAMP-3", dec!(10)).await;

    let created = services
        .orders
        .create_order(CreateOrder {
            order_id: "ORD-NOOP".into(),
            buyer_id: buyer.buyer_id,
            product_total_price: dec!(10),
            shipping_fee: dec!(0),
            total_paid: dec!(10),
            order_status: OrderStatus::Pending,
            payment_time: None,
            shipped_at: None,
            completed_at: None,
            order_items: vec![OrderLine {
                product_id: model.product_id,
                model_id: model.model_id,
                quantity: 1,
                returned_quantity: 0,
                sold_price: dec!(10),
                total_price: dec!(10),
            }],
        })
        .await
        .unwrap();

    let same = services
        .orders
        .update_order("ORD-NOOP", empty())
        .await
        .unwrap();
    assert_eq!(same, created.order);

    let item = created.items[0].clone();
    let same = services
        .orders
        .update_item(item.item_id, empty())
        .await
        .unwrap();
    assert_eq!(same, item);
    assert_eq!(
        services.orders.get_order("ORD-NOOP").await.unwrap(),
        Some(created.order)
    );
}
