use super::{not_found, validate_input};
use crate::{
    db::DbPool,
    dto::{CreateBuyer, CreateTransfer, DeleteBuyer, UpdateBuyer, UpdateTransfer},
    entities::{buyer, order, Buyer, Order},
    errors::ServiceError,
};
use sea_orm::{ActiveModelTrait, EntityTrait, ModelTrait, QueryOrder, QuerySelect};
use std::sync::Arc;
use tracing::{info, instrument};

/// Service for managing buyer accounts
#[derive(Clone)]
pub struct BuyerService {
    db_pool: Arc<DbPool>,
}

impl BuyerService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn create_buyer(&self, input: CreateBuyer) -> Result<buyer::Model, ServiceError> {
        validate_input(&input)?;
        let db = &*self.db_pool;
        let buyer = input.into_active_model().insert(db).await?;
        info!(buyer_id = buyer.buyer_id, "Buyer created");
        Ok(buyer)
    }

    #[instrument(skip(self))]
    pub async fn update_buyer(
        &self,
        buyer_id: i32,
        input: UpdateBuyer,
    ) -> Result<buyer::Model, ServiceError> {
        validate_input(&input)?;
        let db = &*self.db_pool;
        let existing = Buyer::find_by_id(buyer_id)
            .one(db)
            .await?
            .ok_or_else(|| not_found("Buyer", buyer_id))?;

        let mut active: buyer::ActiveModel = existing.clone().into();
        input.apply(&mut active);
        if !active.is_changed() {
            return Ok(existing);
        }
        Ok(active.update(db).await?)
    }

    /// Fails with `InvalidReference` while orders still point at the buyer
    #[instrument(skip(self))]
    pub async fn delete_buyer(&self, input: DeleteBuyer) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let result = Buyer::delete_by_id(input.buyer_id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(not_found("Buyer", input.buyer_id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_buyer(&self, buyer_id: i32) -> Result<Option<buyer::Model>, ServiceError> {
        let db = &*self.db_pool;
        Ok(Buyer::find_by_id(buyer_id).one(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn list_buyers(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<buyer::Model>, ServiceError> {
        let db = &*self.db_pool;
        Ok(Buyer::find()
            .order_by_asc(buyer::Column::BuyerId)
            .limit(limit)
            .offset(offset)
            .all(db)
            .await?)
    }

    /// A buyer's orders, newest first
    #[instrument(skip(self))]
    pub async fn orders_for_buyer(&self, buyer_id: i32) -> Result<Vec<order::Model>, ServiceError> {
        let db = &*self.db_pool;
        let buyer = Buyer::find_by_id(buyer_id)
            .one(db)
            .await?
            .ok_or_else(|| not_found("Buyer", buyer_id))?;
        Ok(buyer
            .find_related(Order)
            .order_by_desc(order::Column::CreatedAt)
            .all(db)
            .await?)
    }
}
