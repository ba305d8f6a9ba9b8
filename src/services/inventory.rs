use super::{not_found, validate_input};
use crate::{
    db::DbPool,
    dto::{
        CreateInventoryMovement, CreateStockRecord, CreateTransfer, DeleteInventoryMovement,
        DeleteStockRecord, UpdateInventoryMovement, UpdateStockRecord, UpdateTransfer,
    },
    entities::{
        inventory_movement, product, product_model, stock_record, InventoryMovement, Product,
        ProductModel, StockRecord,
    },
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Stock record joined with its model and product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockStatus {
    pub model_id: i32,
    pub stock_quantity: i32,
    pub last_updated: DateTime<Utc>,
    pub model: Option<product_model::Model>,
    pub product: Option<product::Model>,
}

/// Comparison between a model's stock record and its movement ledger.
///
/// Nothing is corrected; the report only describes the drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    pub model_id: i32,
    /// `None` when the model has no stock record yet
    pub recorded_quantity: Option<i32>,
    /// Sum of signed movement deltas
    pub ledger_quantity: i64,
    pub movement_count: usize,
}

impl ReconciliationReport {
    /// Recorded minus ledger quantity, counting a missing record as zero
    pub fn discrepancy(&self) -> i64 {
        i64::from(self.recorded_quantity.unwrap_or(0)) - self.ledger_quantity
    }

    pub fn is_consistent(&self) -> bool {
        self.discrepancy() == 0
    }
}

/// Stock records and the inventory movement ledger
#[derive(Clone)]
pub struct InventoryService {
    db_pool: Arc<DbPool>,
}

impl InventoryService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Appends a movement to the ledger and applies its signed delta to the
    /// model's stock record (creating it when absent), atomically. Stock is
    /// allowed to go negative.
    #[instrument(skip(self), fields(model_id = input.model_id, movement_type = %input.movement_type))]
    pub async fn record_movement(
        &self,
        input: CreateInventoryMovement,
    ) -> Result<(inventory_movement::Model, stock_record::Model), ServiceError> {
        validate_input(&input)?;
        let db = &*self.db_pool;
        let delta = input.signed_delta();
        let model_id = input.model_id;

        let txn = db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let movement = input.into_active_model().insert(&txn).await?;
        let stock = apply_stock_delta(&txn, model_id, delta).await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        counter!("backoffice.inventory.movements_recorded", 1);
        if stock.stock_quantity < 0 {
            warn!(
                model_id,
                stock_quantity = stock.stock_quantity,
                "Stock went negative"
            );
        }
        info!(
            movement_id = movement.movement_id,
            delta,
            stock_quantity = stock.stock_quantity,
            "Inventory movement recorded"
        );
        Ok((movement, stock))
    }

    /// Corrects a ledger row without touching the stock record; run
    /// [`InventoryService::reconcile`] afterwards to see the effect
    #[instrument(skip(self))]
    pub async fn update_movement(
        &self,
        movement_id: i32,
        input: UpdateInventoryMovement,
    ) -> Result<inventory_movement::Model, ServiceError> {
        validate_input(&input)?;
        let db = &*self.db_pool;
        let existing = InventoryMovement::find_by_id(movement_id)
            .one(db)
            .await?
            .ok_or_else(|| not_found("Inventory movement", movement_id))?;

        let mut active: inventory_movement::ActiveModel = existing.clone().into();
        input.apply(&mut active);
        if !active.is_changed() {
            return Ok(existing);
        }
        Ok(active.update(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_movement(
        &self,
        input: DeleteInventoryMovement,
    ) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let result = InventoryMovement::delete_by_id(input.movement_id)
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(not_found("Inventory movement", input.movement_id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_movement(
        &self,
        movement_id: i32,
    ) -> Result<Option<inventory_movement::Model>, ServiceError> {
        let db = &*self.db_pool;
        Ok(InventoryMovement::find_by_id(movement_id).one(db).await?)
    }

    /// Whole ledger, newest first, each row with its product model
    #[instrument(skip(self))]
    pub async fn list_movements(
        &self,
    ) -> Result<Vec<(inventory_movement::Model, Option<product_model::Model>)>, ServiceError>
    {
        let db = &*self.db_pool;
        Ok(InventoryMovement::find()
            .find_also_related(ProductModel)
            .order_by_desc(inventory_movement::Column::CreatedAt)
            .order_by_desc(inventory_movement::Column::MovementId)
            .all(db)
            .await?)
    }

    /// Ledger of one model, newest first
    #[instrument(skip(self))]
    pub async fn movements_for_model(
        &self,
        model_id: i32,
    ) -> Result<Vec<inventory_movement::Model>, ServiceError> {
        let db = &*self.db_pool;
        Ok(InventoryMovement::find()
            .filter(inventory_movement::Column::ModelId.eq(model_id))
            .order_by_desc(inventory_movement::Column::CreatedAt)
            .order_by_desc(inventory_movement::Column::MovementId)
            .all(db)
            .await?)
    }

    /// Movements tied to an order
    #[instrument(skip(self))]
    pub async fn movements_for_order(
        &self,
        order_id: &str,
    ) -> Result<Vec<inventory_movement::Model>, ServiceError> {
        let db = &*self.db_pool;
        Ok(InventoryMovement::find()
            .filter(inventory_movement::Column::OrderId.eq(order_id))
            .order_by_asc(inventory_movement::Column::MovementId)
            .all(db)
            .await?)
    }

    // Stock records

    #[instrument(skip(self))]
    pub async fn create_stock_record(
        &self,
        input: CreateStockRecord,
    ) -> Result<stock_record::Model, ServiceError> {
        validate_input(&input)?;
        let db = &*self.db_pool;
        if StockRecord::find_by_id(input.model_id).one(db).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Product model {} already has a stock record",
                input.model_id
            )));
        }
        Ok(input.into_active_model().insert(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn update_stock_record(
        &self,
        model_id: i32,
        input: UpdateStockRecord,
    ) -> Result<stock_record::Model, ServiceError> {
        validate_input(&input)?;
        let db = &*self.db_pool;
        let existing = StockRecord::find_by_id(model_id)
            .one(db)
            .await?
            .ok_or_else(|| not_found("Stock record", model_id))?;

        let mut active: stock_record::ActiveModel = existing.clone().into();
        input.apply(&mut active);
        if !active.is_changed() {
            return Ok(existing);
        }
        Ok(active.update(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_stock_record(&self, input: DeleteStockRecord) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let result = StockRecord::delete_by_id(input.model_id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(not_found("Stock record", input.model_id));
        }
        Ok(())
    }

    /// Overwrites the on-hand quantity, creating the record when absent
    #[instrument(skip(self))]
    pub async fn set_stock(
        &self,
        model_id: i32,
        quantity: i32,
    ) -> Result<stock_record::Model, ServiceError> {
        let db = &*self.db_pool;
        let record = match StockRecord::find_by_id(model_id).one(db).await? {
            Some(existing) => {
                let mut active: stock_record::ActiveModel = existing.into();
                active.stock_quantity = Set(quantity);
                active.update(db).await?
            }
            None => {
                stock_record::ActiveModel {
                    model_id: Set(model_id),
                    stock_quantity: Set(quantity),
                    ..Default::default()
                }
                .insert(db)
                .await?
            }
        };
        Ok(record)
    }

    /// Shifts the on-hand quantity by `delta` without writing a ledger row
    #[instrument(skip(self))]
    pub async fn adjust_stock(
        &self,
        model_id: i32,
        delta: i32,
    ) -> Result<stock_record::Model, ServiceError> {
        let db = &*self.db_pool;
        apply_stock_delta(db, model_id, delta).await
    }

    #[instrument(skip(self))]
    pub async fn get_stock(
        &self,
        model_id: i32,
    ) -> Result<Option<stock_record::Model>, ServiceError> {
        let db = &*self.db_pool;
        Ok(StockRecord::find_by_id(model_id).one(db).await?)
    }

    /// Every stock record with its model and product
    #[instrument(skip(self))]
    pub async fn stock_status(&self) -> Result<Vec<StockStatus>, ServiceError> {
        let db = &*self.db_pool;
        let rows = StockRecord::find()
            .find_also_related(ProductModel)
            .order_by_asc(stock_record::Column::ModelId)
            .all(db)
            .await?;
        let products: HashMap<i32, product::Model> = Product::find()
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.product_id, p))
            .collect();

        Ok(rows
            .into_iter()
            .map(|(stock, model)| {
                let product = model
                    .as_ref()
                    .and_then(|m| products.get(&m.product_id))
                    .cloned();
                StockStatus {
                    model_id: stock.model_id,
                    stock_quantity: stock.stock_quantity,
                    last_updated: stock.last_updated,
                    model,
                    product,
                }
            })
            .collect())
    }

    /// Compares the stock record of `model_id` with the sum of its movements
    #[instrument(skip(self))]
    pub async fn reconcile(&self, model_id: i32) -> Result<ReconciliationReport, ServiceError> {
        let db = &*self.db_pool;
        if ProductModel::find_by_id(model_id).one(db).await?.is_none() {
            return Err(not_found("Product model", model_id));
        }
        let stock = StockRecord::find_by_id(model_id).one(db).await?;
        let movements = InventoryMovement::find()
            .filter(inventory_movement::Column::ModelId.eq(model_id))
            .all(db)
            .await?;

        let report = ReconciliationReport {
            model_id,
            recorded_quantity: stock.map(|s| s.stock_quantity),
            ledger_quantity: movements.iter().map(|m| i64::from(m.signed_delta())).sum(),
            movement_count: movements.len(),
        };
        if !report.is_consistent() {
            warn!(
                model_id,
                discrepancy = report.discrepancy(),
                "Stock record disagrees with movement ledger"
            );
        }
        Ok(report)
    }
}

/// Adds `delta` to the stock record of `model_id`, inserting it if missing
async fn apply_stock_delta<C>(
    db: &C,
    model_id: i32,
    delta: i32,
) -> Result<stock_record::Model, ServiceError>
where
    C: ConnectionTrait,
{
    match StockRecord::find_by_id(model_id).one(db).await? {
        Some(existing) => {
            let quantity = existing.stock_quantity.checked_add(delta).ok_or_else(|| {
                ServiceError::InvalidOperation(format!(
                    "Stock of model {} would overflow",
                    model_id
                ))
            })?;
            let mut active: stock_record::ActiveModel = existing.into();
            active.stock_quantity = Set(quantity);
            Ok(active.update(db).await?)
        }
        None => Ok(stock_record::ActiveModel {
            model_id: Set(model_id),
            stock_quantity: Set(delta),
            ..Default::default()
        }
        .insert(db)
        .await?),
    }
}
