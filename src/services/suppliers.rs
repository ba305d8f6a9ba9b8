use super::{not_found, validate_input};
use crate::{
    db::DbPool,
    dto::{CreateSupplier, CreateTransfer, DeleteSupplier, UpdateSupplier, UpdateTransfer},
    entities::{purchase_batch, supplier, PurchaseBatch, Supplier},
    errors::ServiceError,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, QuerySelect,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// Service for managing suppliers
#[derive(Clone)]
pub struct SupplierService {
    db_pool: Arc<DbPool>,
}

impl SupplierService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Creates a new supplier
    #[instrument(skip(self))]
    pub async fn create_supplier(
        &self,
        input: CreateSupplier,
    ) -> Result<supplier::Model, ServiceError> {
        validate_input(&input)?;
        let db = &*self.db_pool;
        let supplier = input.into_active_model().insert(db).await?;
        info!(supplier_id = supplier.supplier_id, "Supplier created");
        Ok(supplier)
    }

    /// Applies a partial update; an empty patch returns the stored row untouched
    #[instrument(skip(self))]
    pub async fn update_supplier(
        &self,
        supplier_id: i32,
        input: UpdateSupplier,
    ) -> Result<supplier::Model, ServiceError> {
        validate_input(&input)?;
        let db = &*self.db_pool;
        let existing = Supplier::find_by_id(supplier_id)
            .one(db)
            .await?
            .ok_or_else(|| not_found("Supplier", supplier_id))?;

        let mut active: supplier::ActiveModel = existing.clone().into();
        input.apply(&mut active);
        if !active.is_changed() {
            return Ok(existing);
        }
        Ok(active.update(db).await?)
    }

    /// Deletes a supplier
    #[instrument(skip(self))]
    pub async fn delete_supplier(&self, input: DeleteSupplier) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let result = Supplier::delete_by_id(input.supplier_id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(not_found("Supplier", input.supplier_id));
        }
        info!(supplier_id = input.supplier_id, "Supplier deleted");
        Ok(())
    }

    /// Gets a supplier by ID
    #[instrument(skip(self))]
    pub async fn get_supplier(
        &self,
        supplier_id: i32,
    ) -> Result<Option<supplier::Model>, ServiceError> {
        let db = &*self.db_pool;
        Ok(Supplier::find_by_id(supplier_id).one(db).await?)
    }

    /// Finds suppliers whose name contains `name`
    #[instrument(skip(self))]
    pub async fn find_suppliers_by_name(
        &self,
        name: &str,
    ) -> Result<Vec<supplier::Model>, ServiceError> {
        let db = &*self.db_pool;
        Ok(Supplier::find()
            .filter(supplier::Column::SupplierName.contains(name))
            .order_by_asc(supplier::Column::SupplierName)
            .all(db)
            .await?)
    }

    /// Lists suppliers ordered by name
    #[instrument(skip(self))]
    pub async fn list_suppliers(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<supplier::Model>, ServiceError> {
        let db = &*self.db_pool;
        Ok(Supplier::find()
            .order_by_asc(supplier::Column::SupplierName)
            .limit(limit)
            .offset(offset)
            .all(db)
            .await?)
    }

    /// Purchase batches placed with a supplier, newest first
    #[instrument(skip(self))]
    pub async fn batches_for_supplier(
        &self,
        supplier_id: i32,
    ) -> Result<Vec<purchase_batch::Model>, ServiceError> {
        let db = &*self.db_pool;
        let supplier = Supplier::find_by_id(supplier_id)
            .one(db)
            .await?
            .ok_or_else(|| not_found("Supplier", supplier_id))?;
        Ok(supplier
            .find_related(PurchaseBatch)
            .order_by_desc(purchase_batch::Column::CreatedAt)
            .all(db)
            .await?)
    }
}
