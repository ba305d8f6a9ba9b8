use assert_matches::assert_matches;
use rstest::rstest;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use shop_backoffice::{
    dto::{
        from_json, CreateBuyer, CreateCategory, CreateInventoryMovement, CreateOrder,
        CreateOrderItem, CreateProduct, CreateProductModel, CreatePurchaseBatch,
        CreatePurchaseBatchWithItems, CreatePurchaseItem, CreateStockRecord, CreateSupplier,
    },
    errors::ServiceError,
};
use validator::Validate;

fn parse<T: DeserializeOwned + Validate>(payload: Value) -> Result<(), ServiceError> {
    from_json::<T>(payload).map(|_| ())
}

type Parser = fn(Value) -> Result<(), ServiceError>;

fn order_line() -> Value {
    json!({
        "product_id": 1,
        "model_id": 1,
        "quantity": 2,
        "sold_price": "10.00",
        "total_price": "20.00"
    })
}

#[rstest]
#[case::supplier(
    parse::<CreateSupplier>,
    json!({ "supplier_name": "Acme", "contact_info": "acme@test" }),
    "contact_info"
)]
#[case::buyer(parse::<CreateBuyer>, json!({ "buyer_account": "b-1" }), "buyer_account")]
#[case::category(
    parse::<CreateCategory>,
    json!({ "category_name": "Lamps", "parent_id": null }),
    "category_name"
)]
#[case::product(
    parse::<CreateProduct>,
    json!({
        "product_name": "Desk Lamp",
        "category_id": 1,
        "listed_date": "2024-05-01T10:00:00Z",
        "status": "active"
    }),
    "listed_date"
)]
#[case::product_model(
    parse::<CreateProductModel>,
    json!({
        "product_id": 1,
        "model_name": "Brass",
        "sku": "LAMP-BR",
        "original_price": "39.90",
        "promo_price": "34.90"
    }),
    "sku"
)]
#[case::purchase_batch(
    parse::<CreatePurchaseBatch>,
    json!({ "supplier_id": 1, "status": "draft" }),
    "supplier_id"
)]
#[case::purchase_batch_with_items(
    parse::<CreatePurchaseBatchWithItems>,
    json!({
        "supplier_id": 1,
        "status": "draft",
        "items": [{ "model_id": 1, "quantity": 3, "unit_cost": "2.50" }]
    }),
    "items"
)]
#[case::purchase_item(
    parse::<CreatePurchaseItem>,
    json!({ "batch_id": 1, "model_id": 1, "quantity": 3, "unit_cost": "2.50" }),
    "unit_cost"
)]
#[case::stock_record(
    parse::<CreateStockRecord>,
    json!({ "model_id": 1, "stock_quantity": 5 }),
    "stock_quantity"
)]
#[case::inventory_movement(
    parse::<CreateInventoryMovement>,
    json!({ "model_id": 1, "movement_type": "purchase", "quantity": 5 }),
    "movement_type"
)]
#[case::order(
    parse::<CreateOrder>,
    json!({
        "order_id": "ORD-1001",
        "buyer_id": 1,
        "product_total_price": "20.00",
        "shipping_fee": "5.00",
        "total_paid": "25.00",
        "order_status": "pending",
        "order_items": [order_line()]
    }),
    "order_status"
)]
#[case::order_item(
    parse::<CreateOrderItem>,
    {
        let mut item = order_line();
        item["order_id"] = json!("ORD-1001");
        item
    },
    "order_id"
)]
fn create_payload_requires_every_mandatory_key(
    #[case] parser: Parser,
    #[case] complete: Value,
    #[case] required: &str,
) {
    parser(complete.clone()).unwrap();

    let mut partial = complete;
    partial
        .as_object_mut()
        .and_then(|fields| fields.remove(required))
        .unwrap();
    assert_matches!(parser(partial), Err(ServiceError::ValidationError(_)));
}

#[rstest]
#[case::supplier(parse::<CreateSupplier>, json!({ "supplier_id": 7, "supplier_name": "Acme", "contact_info": "x" }))]
#[case::stock_record(parse::<CreateStockRecord>, json!({ "model_id": 1, "stock_quantity": 5, "last_updated": "2024-05-01T10:00:00Z" }))]
#[case::movement(parse::<CreateInventoryMovement>, json!({ "movement_id": 3, "model_id": 1, "movement_type": "purchase", "quantity": 5 }))]
fn create_payload_rejects_server_assigned_columns(#[case] parser: Parser, #[case] payload: Value) {
    assert_matches!(parser(payload), Err(ServiceError::ValidationError(_)));
}
