use super::{not_found, validate_input};
use crate::{
    db::DbPool,
    dto::{
        CreatePurchaseBatch, CreatePurchaseBatchWithItems, CreatePurchaseItem, CreateTransfer,
        DeletePurchaseBatch, DeletePurchaseItem, UpdatePurchaseBatch, UpdatePurchaseItem,
        UpdateTransfer,
    },
    entities::{
        category, product, product_model, purchase_batch, purchase_item, supplier, Category,
        Product, ProductModel, PurchaseBatch, PurchaseBatchStatus, PurchaseItem, Supplier,
    },
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// One purchase item joined with everything needed to display it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseLineView {
    pub item_id: i32,
    pub batch_id: i32,
    pub supplier_name: Option<String>,
    pub product_name: Option<String>,
    pub category_name: Option<String>,
    pub model_name: Option<String>,
    pub sku: Option<String>,
    pub quantity: i32,
    pub unit_cost: Decimal,
    pub line_total: Decimal,
    pub ordered_at: Option<DateTime<Utc>>,
    pub batch_status: Option<PurchaseBatchStatus>,
}

/// Purchase batches and their items
#[derive(Clone)]
pub struct PurchasingService {
    db_pool: Arc<DbPool>,
}

impl PurchasingService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    // Batches

    #[instrument(skip(self))]
    pub async fn create_batch(
        &self,
        input: CreatePurchaseBatch,
    ) -> Result<purchase_batch::Model, ServiceError> {
        validate_input(&input)?;
        let db = &*self.db_pool;
        let batch = input.into_active_model().insert(db).await?;
        info!(batch_id = batch.batch_id, "Purchase batch created");
        Ok(batch)
    }

    /// Stores a batch header and all of its lines atomically
    #[instrument(skip(self))]
    pub async fn create_batch_with_items(
        &self,
        input: CreatePurchaseBatchWithItems,
    ) -> Result<(purchase_batch::Model, Vec<purchase_item::Model>), ServiceError> {
        validate_input(&input)?;
        let db = &*self.db_pool;
        let (header, lines) = input.into_parts();

        let txn = db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let batch = header.into_active_model().insert(&txn).await?;
        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let item = line
                .for_batch(batch.batch_id)
                .into_active_model()
                .insert(&txn)
                .await?;
            items.push(item);
        }

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        info!(
            batch_id = batch.batch_id,
            items = items.len(),
            "Purchase batch created with items"
        );
        Ok((batch, items))
    }

    /// Moves a draft batch to `confirmed`
    #[instrument(skip(self))]
    pub async fn confirm_batch(
        &self,
        batch_id: i32,
    ) -> Result<purchase_batch::Model, ServiceError> {
        let db = &*self.db_pool;
        let batch = PurchaseBatch::find_by_id(batch_id)
            .one(db)
            .await?
            .ok_or_else(|| not_found("Purchase batch", batch_id))?;

        if batch.status != PurchaseBatchStatus::Draft {
            return Err(ServiceError::InvalidStatus(format!(
                "Purchase batch {} is already {}",
                batch_id, batch.status
            )));
        }

        let mut active: purchase_batch::ActiveModel = batch.into();
        active.status = Set(PurchaseBatchStatus::Confirmed);
        let batch = active.update(db).await?;
        info!(batch_id, "Purchase batch confirmed");
        Ok(batch)
    }

    #[instrument(skip(self))]
    pub async fn update_batch(
        &self,
        batch_id: i32,
        input: UpdatePurchaseBatch,
    ) -> Result<purchase_batch::Model, ServiceError> {
        validate_input(&input)?;
        let db = &*self.db_pool;
        let existing = PurchaseBatch::find_by_id(batch_id)
            .one(db)
            .await?
            .ok_or_else(|| not_found("Purchase batch", batch_id))?;

        let mut active: purchase_batch::ActiveModel = existing.clone().into();
        input.apply(&mut active);
        if !active.is_changed() {
            return Ok(existing);
        }
        Ok(active.update(db).await?)
    }

    /// Deletes a batch and its lines in one transaction
    #[instrument(skip(self))]
    pub async fn delete_batch(&self, input: DeletePurchaseBatch) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        PurchaseItem::delete_many()
            .filter(purchase_item::Column::BatchId.eq(input.batch_id))
            .exec(&txn)
            .await?;
        let result = PurchaseBatch::delete_by_id(input.batch_id)
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(not_found("Purchase batch", input.batch_id));
        }

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_batch(
        &self,
        batch_id: i32,
    ) -> Result<Option<purchase_batch::Model>, ServiceError> {
        let db = &*self.db_pool;
        Ok(PurchaseBatch::find_by_id(batch_id).one(db).await?)
    }

    /// Batches newest first, each with its supplier
    #[instrument(skip(self))]
    pub async fn list_batches(
        &self,
    ) -> Result<Vec<(purchase_batch::Model, Option<supplier::Model>)>, ServiceError> {
        let db = &*self.db_pool;
        Ok(PurchaseBatch::find()
            .find_also_related(Supplier)
            .order_by_desc(purchase_batch::Column::CreatedAt)
            .order_by_desc(purchase_batch::Column::BatchId)
            .all(db)
            .await?)
    }

    /// Lines of one batch
    #[instrument(skip(self))]
    pub async fn batch_items(
        &self,
        batch_id: i32,
    ) -> Result<Vec<purchase_item::Model>, ServiceError> {
        let db = &*self.db_pool;
        let batch = PurchaseBatch::find_by_id(batch_id)
            .one(db)
            .await?
            .ok_or_else(|| not_found("Purchase batch", batch_id))?;
        Ok(batch
            .find_related(PurchaseItem)
            .order_by_asc(purchase_item::Column::ItemId)
            .all(db)
            .await?)
    }

    /// Sum of `unit_cost * quantity` over the batch
    #[instrument(skip(self))]
    pub async fn batch_total(&self, batch_id: i32) -> Result<Decimal, ServiceError> {
        let items = self.batch_items(batch_id).await?;
        Ok(items.iter().map(purchase_item::Model::line_total).sum())
    }

    /// Every purchase item flattened with its batch, supplier, model, product
    /// and category names
    #[instrument(skip(self))]
    pub async fn purchase_lines(&self) -> Result<Vec<PurchaseLineView>, ServiceError> {
        let db = &*self.db_pool;
        let rows = PurchaseItem::find()
            .find_also_related(PurchaseBatch)
            .order_by_asc(purchase_item::Column::ItemId)
            .all(db)
            .await?;

        let suppliers: HashMap<i32, supplier::Model> = Supplier::find()
            .all(db)
            .await?
            .into_iter()
            .map(|s| (s.supplier_id, s))
            .collect();
        let models: HashMap<i32, product_model::Model> = ProductModel::find()
            .all(db)
            .await?
            .into_iter()
            .map(|m| (m.model_id, m))
            .collect();
        let products: HashMap<i32, product::Model> = Product::find()
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.product_id, p))
            .collect();
        let categories: HashMap<i32, category::Model> = Category::find()
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.category_id, c))
            .collect();

        Ok(rows
            .into_iter()
            .map(|(item, batch)| {
                let model = models.get(&item.model_id);
                let product = model.and_then(|m| products.get(&m.product_id));
                let category = product.and_then(|p| categories.get(&p.category_id));
                let supplier = batch
                    .as_ref()
                    .and_then(|b| suppliers.get(&b.supplier_id));
                PurchaseLineView {
                    item_id: item.item_id,
                    batch_id: item.batch_id,
                    supplier_name: supplier.map(|s| s.supplier_name.clone()),
                    product_name: product.map(|p| p.product_name.clone()),
                    category_name: category.map(|c| c.category_name.clone()),
                    model_name: model.map(|m| m.model_name.clone()),
                    sku: model.map(|m| m.sku.clone()),
                    quantity: item.quantity,
                    unit_cost: item.unit_cost,
                    line_total: item.line_total(),
                    ordered_at: batch.as_ref().map(|b| b.created_at),
                    batch_status: batch.as_ref().map(|b| b.status),
                }
            })
            .collect())
    }

    // Items

    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        input: CreatePurchaseItem,
    ) -> Result<purchase_item::Model, ServiceError> {
        validate_input(&input)?;
        let db = &*self.db_pool;
        Ok(input.into_active_model().insert(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_item(
        &self,
        item_id: i32,
    ) -> Result<Option<purchase_item::Model>, ServiceError> {
        let db = &*self.db_pool;
        Ok(PurchaseItem::find_by_id(item_id).one(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn update_item(
        &self,
        item_id: i32,
        input: UpdatePurchaseItem,
    ) -> Result<purchase_item::Model, ServiceError> {
        validate_input(&input)?;
        let db = &*self.db_pool;
        let existing = PurchaseItem::find_by_id(item_id)
            .one(db)
            .await?
            .ok_or_else(|| not_found("Purchase item", item_id))?;

        let mut active: purchase_item::ActiveModel = existing.clone().into();
        input.apply(&mut active);
        if !active.is_changed() {
            return Ok(existing);
        }
        Ok(active.update(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_item(&self, input: DeletePurchaseItem) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let result = PurchaseItem::delete_by_id(input.item_id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(not_found("Purchase item", input.item_id));
        }
        Ok(())
    }
}
