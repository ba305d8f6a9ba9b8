use super::{not_found, validate_input};
use crate::{
    db::DbPool,
    dto::{
        CreateCategory, CreateProduct, CreateProductModel, CreateTransfer, DeleteCategory,
        DeleteProduct, DeleteProductModel, Patch, UpdateCategory, UpdateProduct,
        UpdateProductModel, UpdateTransfer,
    },
    entities::{
        category, inventory_movement, order_item, product, product_model, purchase_item,
        stock_record, Category, InventoryMovement, OrderItem, Product, ProductModel,
        PurchaseItem, StockRecord,
    },
    errors::ServiceError,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Categories, products and product models
#[derive(Clone)]
pub struct CatalogService {
    db_pool: Arc<DbPool>,
}

impl CatalogService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    // Categories

    /// Creates a category; a `parent_id` must name an existing category
    #[instrument(skip(self))]
    pub async fn create_category(
        &self,
        input: CreateCategory,
    ) -> Result<category::Model, ServiceError> {
        validate_input(&input)?;
        let db = &*self.db_pool;
        if let Some(parent_id) = input.parent_id {
            ensure_category_exists(db, parent_id).await?;
        }
        let category = input.into_active_model().insert(db).await?;
        info!(category_id = category.category_id, "Category created");
        Ok(category)
    }

    /// Renames and/or re-parents a category, refusing to create a cycle
    #[instrument(skip(self))]
    pub async fn update_category(
        &self,
        category_id: i32,
        input: UpdateCategory,
    ) -> Result<category::Model, ServiceError> {
        validate_input(&input)?;
        let db = &*self.db_pool;
        let existing = Category::find_by_id(category_id)
            .one(db)
            .await?
            .ok_or_else(|| not_found("Category", category_id))?;

        if let Patch::Value(new_parent) = input.parent_id {
            ensure_acyclic_parent(db, category_id, new_parent).await?;
        }

        let mut active: category::ActiveModel = existing.clone().into();
        input.apply(&mut active);
        if !active.is_changed() {
            return Ok(existing);
        }
        Ok(active.update(db).await?)
    }

    /// Deletes a category. Children or products still attached make this an
    /// `InvalidReference`.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, input: DeleteCategory) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let result = Category::delete_by_id(input.category_id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(not_found("Category", input.category_id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_category(
        &self,
        category_id: i32,
    ) -> Result<Option<category::Model>, ServiceError> {
        let db = &*self.db_pool;
        Ok(Category::find_by_id(category_id).one(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<category::Model>, ServiceError> {
        let db = &*self.db_pool;
        Ok(Category::find()
            .order_by_asc(category::Column::CategoryName)
            .all(db)
            .await?)
    }

    /// Categories without a parent
    #[instrument(skip(self))]
    pub async fn root_categories(&self) -> Result<Vec<category::Model>, ServiceError> {
        let db = &*self.db_pool;
        Ok(Category::find()
            .filter(category::Column::ParentId.is_null())
            .order_by_asc(category::Column::CategoryName)
            .all(db)
            .await?)
    }

    /// Direct children of a category
    #[instrument(skip(self))]
    pub async fn child_categories(
        &self,
        category_id: i32,
    ) -> Result<Vec<category::Model>, ServiceError> {
        let db = &*self.db_pool;
        ensure_category_exists(db, category_id).await?;
        Ok(Category::find()
            .filter(category::Column::ParentId.eq(category_id))
            .order_by_asc(category::Column::CategoryName)
            .all(db)
            .await?)
    }

    /// Chain of categories from the root down to `category_id`
    #[instrument(skip(self))]
    pub async fn category_path(
        &self,
        category_id: i32,
    ) -> Result<Vec<category::Model>, ServiceError> {
        let db = &*self.db_pool;
        let mut current = Category::find_by_id(category_id)
            .one(db)
            .await?
            .ok_or_else(|| not_found("Category", category_id))?;

        let mut seen = HashSet::from([current.category_id]);
        let mut path = vec![current.clone()];
        while !current.is_root() {
            let parent = current
                .find_linked(category::ParentLink)
                .one(db)
                .await?
                .ok_or_else(|| {
                    ServiceError::InternalError(format!(
                        "Category {} points at a missing parent",
                        current.category_id
                    ))
                })?;
            if !seen.insert(parent.category_id) {
                warn!(category_id, "Category tree contains a cycle");
                return Err(ServiceError::InvalidOperation(format!(
                    "Category {} is part of a cycle",
                    parent.category_id
                )));
            }
            path.push(parent.clone());
            current = parent;
        }
        path.reverse();
        Ok(path)
    }

    // Products

    #[instrument(skip(self))]
    pub async fn create_product(
        &self,
        input: CreateProduct,
    ) -> Result<product::Model, ServiceError> {
        validate_input(&input)?;
        let db = &*self.db_pool;
        let product = input.into_active_model().insert(db).await?;
        info!(product_id = product.product_id, "Product created");
        Ok(product)
    }

    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        product_id: i32,
        input: UpdateProduct,
    ) -> Result<product::Model, ServiceError> {
        validate_input(&input)?;
        let db = &*self.db_pool;
        let existing = Product::find_by_id(product_id)
            .one(db)
            .await?
            .ok_or_else(|| not_found("Product", product_id))?;

        let mut active: product::ActiveModel = existing.clone().into();
        input.apply(&mut active);
        if !active.is_changed() {
            return Ok(existing);
        }
        Ok(active.update(db).await?)
    }

    /// Deletes a product that no model or order item references
    #[instrument(skip(self))]
    pub async fn delete_product(&self, input: DeleteProduct) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let result = Product::delete_by_id(input.product_id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(not_found("Product", input.product_id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_product(
        &self,
        product_id: i32,
    ) -> Result<Option<product::Model>, ServiceError> {
        let db = &*self.db_pool;
        Ok(Product::find_by_id(product_id).one(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<product::Model>, ServiceError> {
        let db = &*self.db_pool;
        Ok(Product::find()
            .order_by_asc(product::Column::ProductId)
            .all(db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn products_in_category(
        &self,
        category_id: i32,
    ) -> Result<Vec<product::Model>, ServiceError> {
        let db = &*self.db_pool;
        let category = Category::find_by_id(category_id)
            .one(db)
            .await?
            .ok_or_else(|| not_found("Category", category_id))?;
        Ok(category
            .find_related(Product)
            .order_by_asc(product::Column::ProductName)
            .all(db)
            .await?)
    }

    // Product models

    /// Creates a product model. The SKU is checked up front so the caller gets a
    /// readable `Conflict`; the unique index still decides under concurrent inserts.
    #[instrument(skip(self))]
    pub async fn create_product_model(
        &self,
        input: CreateProductModel,
    ) -> Result<product_model::Model, ServiceError> {
        validate_input(&input)?;
        let db = &*self.db_pool;
        ensure_unique_sku(db, &input.sku, None).await?;
        let model = input.into_active_model().insert(db).await?;
        info!(model_id = model.model_id, sku = %model.sku, "Product model created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn update_product_model(
        &self,
        model_id: i32,
        input: UpdateProductModel,
    ) -> Result<product_model::Model, ServiceError> {
        validate_input(&input)?;
        let db = &*self.db_pool;
        let existing = ProductModel::find_by_id(model_id)
            .one(db)
            .await?
            .ok_or_else(|| not_found("Product model", model_id))?;

        if let Some(sku) = input.sku.as_deref() {
            if sku != existing.sku {
                ensure_unique_sku(db, sku, Some(model_id)).await?;
            }
        }

        let mut active: product_model::ActiveModel = existing.clone().into();
        input.apply(&mut active);
        if !active.is_changed() {
            return Ok(existing);
        }
        Ok(active.update(db).await?)
    }

    /// Deletes a single product model together with its dependent rows
    #[instrument(skip(self))]
    pub async fn delete_product_model(
        &self,
        input: DeleteProductModel,
    ) -> Result<(), ServiceError> {
        let deleted = self.delete_product_models(&[input.model_id]).await?;
        if deleted == 0 {
            return Err(not_found("Product model", input.model_id));
        }
        Ok(())
    }

    /// Deletes product models and everything that references them (purchase
    /// items, order items, inventory movements, stock records) in one
    /// transaction. Returns the number of models removed.
    #[instrument(skip(self))]
    pub async fn delete_product_models(&self, model_ids: &[i32]) -> Result<u64, ServiceError> {
        if model_ids.is_empty() {
            return Ok(0);
        }
        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let ids = model_ids.to_vec();
        PurchaseItem::delete_many()
            .filter(purchase_item::Column::ModelId.is_in(ids.clone()))
            .exec(&txn)
            .await?;
        OrderItem::delete_many()
            .filter(order_item::Column::ModelId.is_in(ids.clone()))
            .exec(&txn)
            .await?;
        InventoryMovement::delete_many()
            .filter(inventory_movement::Column::ModelId.is_in(ids.clone()))
            .exec(&txn)
            .await?;
        StockRecord::delete_many()
            .filter(stock_record::Column::ModelId.is_in(ids.clone()))
            .exec(&txn)
            .await?;
        let result = ProductModel::delete_many()
            .filter(product_model::Column::ModelId.is_in(ids))
            .exec(&txn)
            .await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        info!(deleted = result.rows_affected, "Product models deleted");
        Ok(result.rows_affected)
    }

    #[instrument(skip(self))]
    pub async fn get_product_model(
        &self,
        model_id: i32,
    ) -> Result<Option<product_model::Model>, ServiceError> {
        let db = &*self.db_pool;
        Ok(ProductModel::find_by_id(model_id).one(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn find_model_by_sku(
        &self,
        sku: &str,
    ) -> Result<Option<product_model::Model>, ServiceError> {
        let db = &*self.db_pool;
        Ok(ProductModel::find()
            .filter(product_model::Column::Sku.eq(sku))
            .one(db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn list_product_models(&self) -> Result<Vec<product_model::Model>, ServiceError> {
        let db = &*self.db_pool;
        Ok(ProductModel::find()
            .order_by_asc(product_model::Column::ModelId)
            .all(db)
            .await?)
    }

    /// Models of one product, oldest first
    #[instrument(skip(self))]
    pub async fn models_for_product(
        &self,
        product_id: i32,
    ) -> Result<Vec<product_model::Model>, ServiceError> {
        let db = &*self.db_pool;
        let product = Product::find_by_id(product_id)
            .one(db)
            .await?
            .ok_or_else(|| not_found("Product", product_id))?;
        Ok(product
            .find_related(ProductModel)
            .order_by_asc(product_model::Column::CreatedAt)
            .order_by_asc(product_model::Column::ModelId)
            .all(db)
            .await?)
    }
}

async fn ensure_category_exists<C>(db: &C, category_id: i32) -> Result<(), ServiceError>
where
    C: ConnectionTrait,
{
    let exists = Category::find_by_id(category_id).count(db).await? > 0;
    if !exists {
        return Err(ServiceError::InvalidReference(format!(
            "Category {} does not exist",
            category_id
        )));
    }
    Ok(())
}

/// Walks up from `new_parent` and fails if `category_id` is found on the way
async fn ensure_acyclic_parent<C>(
    db: &C,
    category_id: i32,
    new_parent: i32,
) -> Result<(), ServiceError>
where
    C: ConnectionTrait,
{
    if new_parent == category_id {
        return Err(ServiceError::InvalidOperation(format!(
            "Category {} cannot be its own parent",
            category_id
        )));
    }

    let mut seen = HashSet::new();
    let mut cursor = Some(new_parent);
    while let Some(id) = cursor {
        if id == category_id {
            return Err(ServiceError::InvalidOperation(format!(
                "Moving category {} under {} would create a cycle",
                category_id, new_parent
            )));
        }
        if !seen.insert(id) {
            // Pre-existing loop above the new parent that does not include us
            return Err(ServiceError::InvalidOperation(format!(
                "Category {} sits on an existing cycle",
                id
            )));
        }
        let node = Category::find_by_id(id).one(db).await?.ok_or_else(|| {
            ServiceError::InvalidReference(format!("Category {} does not exist", id))
        })?;
        cursor = node.parent_id;
    }
    Ok(())
}

async fn ensure_unique_sku<C>(
    db: &C,
    sku: &str,
    exclude_model_id: Option<i32>,
) -> Result<(), ServiceError>
where
    C: ConnectionTrait,
{
    let mut query = ProductModel::find().filter(product_model::Column::Sku.eq(sku));
    if let Some(model_id) = exclude_model_id {
        query = query.filter(product_model::Column::ModelId.ne(model_id));
    }
    if query.count(db).await? > 0 {
        return Err(ServiceError::Conflict(format!(
            "SKU '{}' is already in use",
            sku
        )));
    }
    Ok(())
}
