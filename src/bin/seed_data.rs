//! Seed data script - populates the database with a small demo back office
//!
//! Run with: cargo run --bin seed-data
//!
//! This creates:
//! - 2 suppliers and 2 buyers
//! - a two-level category tree with 2 products and 3 product models
//! - one confirmed purchase batch, received into stock through the movement ledger
//! - 2 orders, one of them shipped

use rust_decimal_macros::dec;
use shop_backoffice::{
    config::{init_tracing, load_config},
    db,
    dto::{
        CreateBuyer, CreateCategory, CreateInventoryMovement, CreateOrder, CreateProduct,
        CreateProductModel, CreatePurchaseBatchWithItems, CreateSupplier, OrderLine,
        PurchaseLine,
    },
    entities::{MovementType, OrderStatus, ProductStatus, PurchaseBatchStatus},
    services::{BackofficeServices, OrderService},
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = load_config()?;
    init_tracing(config.log_level(), config.log_json);
    config.auto_migrate = true;

    info!("=== Shop back office seed data ===");
    let pool = Arc::new(db::establish_connection_from_app_config(&config).await?);
    let services = BackofficeServices::new(pool.clone());

    info!("Creating suppliers and buyers...");
    let acme = services
        .suppliers
        .create_supplier(CreateSupplier {
            supplier_name: "Acme Lighting".into(),
            contact_info: "orders@acme-lighting.test".into(),
        })
        .await?;
    services
        .suppliers
        .create_supplier(CreateSupplier {
            supplier_name: "Northwind Textiles".into(),
            contact_info: "+44 20 7946 0000".into(),
        })
        .await?;
    let alice = services
        .buyers
        .create_buyer(CreateBuyer {
            buyer_account: "alice@example.test".into(),
        })
        .await?;
    let bob = services
        .buyers
        .create_buyer(CreateBuyer {
            buyer_account: "bob@example.test".into(),
        })
        .await?;

    info!("Creating catalog...");
    let home = services
        .catalog
        .create_category(CreateCategory {
            category_name: "Home".into(),
            parent_id: None,
        })
        .await?;
    let lamps = services
        .catalog
        .create_category(CreateCategory {
            category_name: "Lamps".into(),
            parent_id: Some(home.category_id),
        })
        .await?;
    let desk_lamp = services
        .catalog
        .create_product(CreateProduct {
            product_name: "Desk Lamp".into(),
            category_id: lamps.category_id,
            listed_date: chrono::Utc::now(),
            status: ProductStatus::Active,
        })
        .await?;
    let floor_lamp = services
        .catalog
        .create_product(CreateProduct {
            product_name: "Floor Lamp".into(),
            category_id: lamps.category_id,
            listed_date: chrono::Utc::now(),
            status: ProductStatus::Active,
        })
        .await?;

    let mut models = Vec::new();
    for (product_id, name, sku, price, promo) in [
        (desk_lamp.product_id, "Brass", "LAMP-DESK-BR", dec!(39.90), dec!(34.90)),
        (desk_lamp.product_id, "Black", "LAMP-DESK-BK", dec!(39.90), dec!(39.90)),
        (floor_lamp.product_id, "Oak", "LAMP-FLOOR-OAK", dec!(129.00), dec!(119.00)),
    ] {
        let model = services
            .catalog
            .create_product_model(CreateProductModel {
                product_id,
                model_name: name.into(),
                sku: sku.into(),
                original_price: price,
                promo_price: promo,
            })
            .await?;
        models.push(model);
    }
    info!("  Created {} product models", models.len());

    info!("Purchasing and receiving stock...");
    let (batch, items) = services
        .purchasing
        .create_batch_with_items(CreatePurchaseBatchWithItems {
            supplier_id: acme.supplier_id,
            status: PurchaseBatchStatus::Draft,
            items: models
                .iter()
                .map(|m| PurchaseLine {
                    model_id: m.model_id,
                    quantity: 20,
                    unit_cost: m.original_price / dec!(2),
                })
                .collect(),
        })
        .await?;
    services.purchasing.confirm_batch(batch.batch_id).await?;
    for item in &items {
        services
            .inventory
            .record_movement(CreateInventoryMovement {
                model_id: item.model_id,
                order_id: None,
                movement_type: MovementType::Purchase,
                quantity: item.quantity,
                note: Some(format!("Received with batch {}", batch.batch_id)),
            })
            .await?;
    }

    info!("Creating orders...");
    for (buyer_id, model, quantity) in [
        (alice.buyer_id, &models[0], 2),
        (bob.buyer_id, &models[2], 1),
    ] {
        let total = model.promo_price * rust_decimal::Decimal::from(quantity);
        let order = services
            .orders
            .create_order(CreateOrder {
                order_id: OrderService::generate_order_id(),
                buyer_id,
                product_total_price: total,
                shipping_fee: dec!(0),
                total_paid: total,
                order_status: OrderStatus::Confirmed,
                payment_time: Some(chrono::Utc::now()),
                shipped_at: None,
                completed_at: None,
                order_items: vec![OrderLine {
                    product_id: model.product_id,
                    model_id: model.model_id,
                    quantity,
                    returned_quantity: 0,
                    sold_price: model.promo_price,
                    total_price: total,
                }],
            })
            .await?;
        services
            .inventory
            .record_movement(CreateInventoryMovement {
                model_id: model.model_id,
                order_id: Some(order.order.order_id.clone()),
                movement_type: MovementType::Outbound,
                quantity,
                note: None,
            })
            .await?;
        info!("  Created order {}", order.order.order_id);
    }

    let orders = services.orders.list_orders().await?;
    if let Some(latest) = orders.first() {
        services
            .orders
            .update_order_status(&latest.order.order_id, OrderStatus::Shipped, None)
            .await?;
    }

    info!("Seed data complete");
    drop(services);
    if let Ok(pool) = Arc::try_unwrap(pool) {
        db::close_pool(pool).await?;
    }
    Ok(())
}
