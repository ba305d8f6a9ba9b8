mod common;

use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, Set,
};
use shop_backoffice::{
    entities::{
        category, inventory_movement, order, order_item, product_model, stock_record, Buyer,
        Category, InventoryMovement, MovementType, Order, OrderItem, OrderStatus, Product,
        ProductModel, StockRecord,
    },
    errors::ServiceError,
};

#[tokio::test]
async fn order_with_one_item_links_by_order_id() {
    let app = common::TestDb::new().await;
    let db = app.db();
    let buyer = app.buyer("alice@example.test").await;
    let model = app.catalog_with_model("SKU-1", dec!(9.99)).await;

    order::ActiveModel {
        order_id: Set("ORD-1001".to_string()),
        buyer_id: Set(buyer.buyer_id),
        product_total_price: Set(dec!(19.98)),
        shipping_fee: Set(dec!(0)),
        total_paid: Set(dec!(19.98)),
        order_status: Set(OrderStatus::Pending),
        cancel_reason: Set(None),
        return_refund_status: Set(None),
        payment_time: Set(None),
        shipped_at: Set(None),
        completed_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert order");

    order_item::ActiveModel {
        order_id: Set("ORD-1001".to_string()),
        product_id: Set(model.product_id),
        model_id: Set(model.model_id),
        quantity: Set(2),
        returned_quantity: Set(0),
        sold_price: Set(dec!(9.99)),
        total_price: Set(dec!(19.98)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert order item");

    assert_eq!(Order::find().count(db).await.unwrap(), 1);
    assert_eq!(OrderItem::find().count(db).await.unwrap(), 1);

    let stored = Order::find_by_id("ORD-1001".to_string())
        .one(db)
        .await
        .unwrap()
        .expect("order stored");
    assert_eq!(stored.order_status, OrderStatus::Pending);

    let items = stored.find_related(OrderItem).all(db).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].order_id, "ORD-1001");
    assert_eq!(items[0].quantity, 2);
    assert_eq!(items[0].total_price.round_dp(2), dec!(19.98));

    let owner = stored.find_related(Buyer).one(db).await.unwrap();
    assert_eq!(owner.map(|b| b.buyer_id), Some(buyer.buyer_id));
}

#[tokio::test]
async fn duplicate_sku_violates_unique_constraint() {
    let app = common::TestDb::new().await;
    let db = app.db();
    let model = app.catalog_with_model("DUP-1", dec!(5)).await;

    let err = product_model::ActiveModel {
        product_id: Set(model.product_id),
        model_name: Set("Second".into()),
        sku: Set("DUP-1".into()),
        original_price: Set(dec!(5)),
        promo_price: Set(dec!(5)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect_err("duplicate sku must fail");

    assert!(matches!(
        ServiceError::from(err),
        ServiceError::Conflict(_)
    ));
}

#[tokio::test]
async fn foreign_keys_are_enforced() {
    let app = common::TestDb::new().await;
    let db = app.db();

    let err = stock_record::ActiveModel {
        model_id: Set(404),
        stock_quantity: Set(1),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect_err("stock record for a missing model must fail");

    assert!(matches!(
        ServiceError::from(err),
        ServiceError::InvalidReference(_)
    ));
}

#[tokio::test]
async fn stock_record_shares_the_model_key() {
    let app = common::TestDb::new().await;
    let db = app.db();
    let model = app.catalog_with_model("STOCK-1", dec!(1)).await;

    let record = stock_record::ActiveModel {
        model_id: Set(model.model_id),
        stock_quantity: Set(7),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert stock record");
    assert_eq!(record.model_id, model.model_id);
    assert!(record.last_updated <= Utc::now());

    let via_model = model.find_related(StockRecord).one(db).await.unwrap();
    assert_eq!(via_model.map(|s| s.stock_quantity), Some(7));

    let second = stock_record::ActiveModel {
        model_id: Set(model.model_id),
        stock_quantity: Set(1),
        ..Default::default()
    }
    .insert(db)
    .await;
    assert!(second.is_err(), "a model has at most one stock record");
}

#[tokio::test]
async fn movement_may_reference_an_order_or_none() {
    let app = common::TestDb::new().await;
    let db = app.db();
    let model = app.catalog_with_model("MOVE-1", dec!(1)).await;

    let movement = inventory_movement::ActiveModel {
        model_id: Set(model.model_id),
        order_id: Set(None),
        movement_type: Set(MovementType::Adjust),
        quantity: Set(-2),
        note: Set(Some("stocktake".into())),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert movement");
    assert_eq!(movement.signed_delta(), -2);
    assert!(movement.find_related(Order).one(db).await.unwrap().is_none());

    let orphan = inventory_movement::ActiveModel {
        model_id: Set(model.model_id),
        order_id: Set(Some("ORD-MISSING".into())),
        movement_type: Set(MovementType::Outbound),
        quantity: Set(1),
        note: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await;
    assert!(orphan.is_err());

    let count = InventoryMovement::find()
        .filter(inventory_movement::Column::ModelId.eq(model.model_id))
        .count(db)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn category_tree_relations() {
    let app = common::TestDb::new().await;
    let db = app.db();
    let root = app.category("Home", None).await;
    let child = app.category("Lamps", Some(root.category_id)).await;
    app.product("Desk Lamp", child.category_id).await;

    let parent = child
        .find_linked(category::ParentLink)
        .one(db)
        .await
        .unwrap()
        .expect("child has a parent");
    assert_eq!(parent.category_id, root.category_id);
    assert!(parent.is_root());

    assert!(root
        .find_linked(category::ParentLink)
        .one(db)
        .await
        .unwrap()
        .is_none());

    let products = child.find_related(Product).all(db).await.unwrap();
    assert_eq!(products.len(), 1);
}

#[tokio::test]
async fn entity_layer_accepts_category_cycles() {
    let app = common::TestDb::new().await;
    let db = app.db();
    let a = app.category("A", None).await;
    let b = app.category("B", Some(a.category_id)).await;

    // Self-parent
    let mut active: category::ActiveModel = a.clone().into();
    active.parent_id = Set(Some(a.category_id));
    active.update(db).await.expect("self-parent is storable");

    // Two-node cycle
    let mut active: category::ActiveModel = Category::find_by_id(a.category_id)
        .one(db)
        .await
        .unwrap()
        .unwrap()
        .into();
    active.parent_id = Set(Some(b.category_id));
    let a = active.update(db).await.expect("cycle is storable");
    assert_eq!(a.parent_id, Some(b.category_id));

    // The service refuses to walk it
    let err = app
        .services
        .catalog
        .category_path(a.category_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidOperation(_)));
}

#[tokio::test]
async fn model_belongs_to_product() {
    let app = common::TestDb::new().await;
    let db = app.db();
    let model = app.catalog_with_model("REL-1", dec!(3)).await;

    let product = model.find_related(Product).one(db).await.unwrap();
    assert_eq!(product.map(|p| p.product_id), Some(model.product_id));

    let listed = ProductModel::find()
        .filter(product_model::Column::Sku.eq("REL-1"))
        .one(db)
        .await
        .unwrap();
    assert_eq!(listed.map(|m| m.model_id), Some(model.model_id));
}
