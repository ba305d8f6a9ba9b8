#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use shop_backoffice::{
    db::{self, DbConfig, DbPool},
    dto::{
        CreateBuyer, CreateCategory, CreateProduct, CreateProductModel, CreateSupplier,
    },
    entities::{buyer, category, product, product_model, supplier, ProductStatus},
    services::BackofficeServices,
};

/// Services over a private, fully migrated in-memory SQLite database
pub struct TestDb {
    pub pool: Arc<DbPool>,
    pub services: BackofficeServices,
}

impl TestDb {
    pub async fn new() -> Self {
        let pool = db::establish_connection_with_config(&DbConfig::in_memory_sqlite())
            .await
            .expect("failed to open in-memory database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations");
        let pool = Arc::new(pool);
        let services = BackofficeServices::new(pool.clone());
        Self { pool, services }
    }

    pub fn db(&self) -> &DbPool {
        &self.pool
    }

    pub async fn supplier(&self, name: &str) -> supplier::Model {
        self.services
            .suppliers
            .create_supplier(CreateSupplier {
                supplier_name: name.to_string(),
                contact_info: format!("{}@suppliers.test", name.to_lowercase()),
            })
            .await
            .expect("create supplier")
    }

    pub async fn buyer(&self, account: &str) -> buyer::Model {
        self.services
            .buyers
            .create_buyer(CreateBuyer {
                buyer_account: account.to_string(),
            })
            .await
            .expect("create buyer")
    }

    pub async fn category(&self, name: &str, parent_id: Option<i32>) -> category::Model {
        self.services
            .catalog
            .create_category(CreateCategory {
                category_name: name.to_string(),
                parent_id,
            })
            .await
            .expect("create category")
    }

    pub async fn product(&self, name: &str, category_id: i32) -> product::Model {
        self.services
            .catalog
            .create_product(CreateProduct {
                product_name: name.to_string(),
                category_id,
                listed_date: Utc::now(),
                status: ProductStatus::Active,
            })
            .await
            .expect("create product")
    }

    pub async fn model(&self, product_id: i32, sku: &str, price: Decimal) -> product_model::Model {
        self.services
            .catalog
            .create_product_model(CreateProductModel {
                product_id,
                model_name: format!("{} model", sku),
                sku: sku.to_string(),
                original_price: price,
                promo_price: price,
            })
            .await
            .expect("create product model")
    }

    /// Category, product and one model priced at `price`
    pub async fn catalog_with_model(&self, sku: &str, price: Decimal) -> product_model::Model {
        let category = self.category("General", None).await;
        let product = self.product("Widget", category.category_id).await;
        self.model(product.product_id, sku, price).await
    }
}
