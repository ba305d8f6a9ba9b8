use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240424_000001_create_parties_tables::Migration),
            Box::new(m20240424_000002_create_catalog_tables::Migration),
            Box::new(m20240424_000003_create_orders_tables::Migration),
            Box::new(m20240424_000004_create_purchasing_tables::Migration),
            Box::new(m20240424_000005_create_inventory_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20240424_000001_create_parties_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240424_000001_create_parties_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Suppliers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Suppliers::SupplierId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Suppliers::SupplierName).string().not_null())
                        .col(ColumnDef::new(Suppliers::ContactInfo).string().not_null())
                        .col(
                            ColumnDef::new(Suppliers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Buyers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Buyers::BuyerId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Buyers::BuyerAccount).string().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Buyers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Suppliers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Suppliers {
        Table,
        SupplierId,
        SupplierName,
        ContactInfo,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub enum Buyers {
        Table,
        BuyerId,
        BuyerAccount,
    }
}

mod m20240424_000002_create_catalog_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240424_000002_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Self-referencing tree; acyclicity is not a storage constraint
            manager
                .create_table(
                    Table::create()
                        .table(Categories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Categories::CategoryId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Categories::CategoryName)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Categories::ParentId).integer().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_categories_parent_id")
                                .from(Categories::Table, Categories::ParentId)
                                .to(Categories::Table, Categories::CategoryId),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Products::ProductId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Products::ProductName).string().not_null())
                        .col(ColumnDef::new(Products::CategoryId).integer().not_null())
                        .col(
                            ColumnDef::new(Products::ListedDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Products::Status).text().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_products_category_id")
                                .from(Products::Table, Products::CategoryId)
                                .to(Categories::Table, Categories::CategoryId),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ProductModels::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductModels::ModelId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(ProductModels::ProductId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductModels::ModelName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductModels::Sku)
                                .string_len(100)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(ProductModels::OriginalPrice)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductModels::PromoPrice)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductModels::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_product_models_product_id")
                                .from(ProductModels::Table, ProductModels::ProductId)
                                .to(Products::Table, Products::ProductId),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_category_id")
                        .table(Products::Table)
                        .col(Products::CategoryId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_product_models_product_id")
                        .table(ProductModels::Table)
                        .col(ProductModels::ProductId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductModels::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Categories::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Categories {
        Table,
        CategoryId,
        CategoryName,
        ParentId,
    }

    #[derive(DeriveIden)]
    pub enum Products {
        Table,
        ProductId,
        ProductName,
        CategoryId,
        ListedDate,
        Status,
    }

    #[derive(DeriveIden)]
    pub enum ProductModels {
        Table,
        ModelId,
        ProductId,
        ModelName,
        Sku,
        OriginalPrice,
        PromoPrice,
        CreatedAt,
    }
}

mod m20240424_000003_create_orders_tables {
    use super::m20240424_000001_create_parties_tables::Buyers;
    use super::m20240424_000002_create_catalog_tables::{ProductModels, Products};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240424_000003_create_orders_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // order_id is supplied by the caller, never generated by the database
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Orders::OrderId)
                                .string_len(50)
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Orders::BuyerId).integer().not_null())
                        .col(
                            ColumnDef::new(Orders::ProductTotalPrice)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::ShippingFee)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::TotalPaid)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Orders::OrderStatus).text().not_null())
                        .col(ColumnDef::new(Orders::CancelReason).string().null())
                        .col(ColumnDef::new(Orders::ReturnRefundStatus).string().null())
                        .col(
                            ColumnDef::new(Orders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(
                            ColumnDef::new(Orders::PaymentTime)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Orders::ShippedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Orders::CompletedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_buyer_id")
                                .from(Orders::Table, Orders::BuyerId)
                                .to(Buyers::Table, Buyers::BuyerId),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderItems::ItemId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(OrderItems::OrderId).string_len(50).not_null())
                        .col(ColumnDef::new(OrderItems::ProductId).integer().not_null())
                        .col(ColumnDef::new(OrderItems::ModelId).integer().not_null())
                        .col(ColumnDef::new(OrderItems::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(OrderItems::ReturnedQuantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(OrderItems::SoldPrice)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderItems::TotalPrice)
                                .decimal()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_order_id")
                                .from(OrderItems::Table, OrderItems::OrderId)
                                .to(Orders::Table, Orders::OrderId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_product_id")
                                .from(OrderItems::Table, OrderItems::ProductId)
                                .to(Products::Table, Products::ProductId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_model_id")
                                .from(OrderItems::Table, OrderItems::ModelId)
                                .to(ProductModels::Table, ProductModels::ModelId),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_buyer_id")
                        .table(Orders::Table)
                        .col(Orders::BuyerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_created_at")
                        .table(Orders::Table)
                        .col(Orders::CreatedAt)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_items_order_id")
                        .table(OrderItems::Table)
                        .col(OrderItems::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Orders {
        Table,
        OrderId,
        BuyerId,
        ProductTotalPrice,
        ShippingFee,
        TotalPaid,
        OrderStatus,
        CancelReason,
        ReturnRefundStatus,
        CreatedAt,
        PaymentTime,
        ShippedAt,
        CompletedAt,
    }

    #[derive(DeriveIden)]
    pub enum OrderItems {
        Table,
        ItemId,
        OrderId,
        ProductId,
        ModelId,
        Quantity,
        ReturnedQuantity,
        SoldPrice,
        TotalPrice,
    }
}

mod m20240424_000004_create_purchasing_tables {
    use super::m20240424_000001_create_parties_tables::Suppliers;
    use super::m20240424_000002_create_catalog_tables::ProductModels;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240424_000004_create_purchasing_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PurchaseBatches::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseBatches::BatchId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(PurchaseBatches::SupplierId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseBatches::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(ColumnDef::new(PurchaseBatches::Status).text().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_batches_supplier_id")
                                .from(PurchaseBatches::Table, PurchaseBatches::SupplierId)
                                .to(Suppliers::Table, Suppliers::SupplierId),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PurchaseItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseItems::ItemId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(PurchaseItems::BatchId).integer().not_null())
                        .col(ColumnDef::new(PurchaseItems::ModelId).integer().not_null())
                        .col(ColumnDef::new(PurchaseItems::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(PurchaseItems::UnitCost)
                                .decimal()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_items_batch_id")
                                .from(PurchaseItems::Table, PurchaseItems::BatchId)
                                .to(PurchaseBatches::Table, PurchaseBatches::BatchId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_items_model_id")
                                .from(PurchaseItems::Table, PurchaseItems::ModelId)
                                .to(ProductModels::Table, ProductModels::ModelId),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_items_batch_id")
                        .table(PurchaseItems::Table)
                        .col(PurchaseItems::BatchId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PurchaseBatches::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum PurchaseBatches {
        Table,
        BatchId,
        SupplierId,
        CreatedAt,
        Status,
    }

    #[derive(DeriveIden)]
    pub enum PurchaseItems {
        Table,
        ItemId,
        BatchId,
        ModelId,
        Quantity,
        UnitCost,
    }
}

mod m20240424_000005_create_inventory_tables {
    use super::m20240424_000002_create_catalog_tables::ProductModels;
    use super::m20240424_000003_create_orders_tables::Orders;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240424_000005_create_inventory_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Shares its primary key with product_models (one-to-one)
            manager
                .create_table(
                    Table::create()
                        .table(StockRecords::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockRecords::ModelId)
                                .integer()
                                .not_null()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(StockRecords::StockQuantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(StockRecords::LastUpdated)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_records_model_id")
                                .from(StockRecords::Table, StockRecords::ModelId)
                                .to(ProductModels::Table, ProductModels::ModelId),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(InventoryMovements::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryMovements::MovementId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(InventoryMovements::ModelId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryMovements::OrderId)
                                .string_len(50)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventoryMovements::MovementType)
                                .text()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryMovements::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryMovements::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(ColumnDef::new(InventoryMovements::Note).string().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventory_movements_model_id")
                                .from(InventoryMovements::Table, InventoryMovements::ModelId)
                                .to(ProductModels::Table, ProductModels::ModelId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventory_movements_order_id")
                                .from(InventoryMovements::Table, InventoryMovements::OrderId)
                                .to(Orders::Table, Orders::OrderId),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_movements_model_id")
                        .table(InventoryMovements::Table)
                        .col(InventoryMovements::ModelId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryMovements::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(StockRecords::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum StockRecords {
        Table,
        ModelId,
        StockQuantity,
        LastUpdated,
    }

    #[derive(DeriveIden)]
    pub enum InventoryMovements {
        Table,
        MovementId,
        ModelId,
        OrderId,
        MovementType,
        Quantity,
        CreatedAt,
        Note,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectionTrait, Database};

    #[test]
    fn migrations_are_ordered_by_foreign_key_dependencies() {
        let names: Vec<String> = Migrator::migrations()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "m20240424_000001_create_parties_tables",
                "m20240424_000002_create_catalog_tables",
                "m20240424_000003_create_orders_tables",
                "m20240424_000004_create_purchasing_tables",
                "m20240424_000005_create_inventory_tables",
            ]
        );
    }

    #[tokio::test]
    async fn schema_applies_and_rolls_back_on_sqlite() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db.execute_unprepared(
            "INSERT INTO suppliers (supplier_name, contact_info) VALUES ('Acme', 'acme@test')",
        )
        .await
        .unwrap();

        Migrator::down(&db, None).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        assert_eq!(Migrator::get_pending_migrations(&db).await.unwrap().len(), 0);
    }
}
