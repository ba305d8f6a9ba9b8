use super::{not_found, validate_input};
use crate::{
    db::DbPool,
    dto::{
        check_returned_quantity, CreateOrder, CreateOrderItem, CreateTransfer, DeleteOrder,
        DeleteOrderItem, UpdateOrder, UpdateOrderItem, UpdateTransfer,
    },
    entities::{
        buyer, inventory_movement, order, order_item, Buyer, InventoryMovement, Order,
        OrderItem, OrderStatus,
    },
    errors::ServiceError,
};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use metrics::counter;
use rand::Rng;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// An order with its buyer and line items
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderWithItems {
    pub order: order::Model,
    pub buyer: Option<buyer::Model>,
    pub items: Vec<order_item::Model>,
}

/// Sales aggregated over one UTC calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySales {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub quantity: i64,
}

/// Daily sales series of a single product
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSales {
    pub product_id: i32,
    pub data: Vec<DailySales>,
}

/// Orders, their items and sales figures
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
}

impl OrderService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Builds an identifier of the form `ORD` + `YYYYMMDDHHMMSS` (UTC) + four
    /// random digits. Uniqueness is still enforced by the primary key.
    pub fn generate_order_id() -> String {
        let suffix: u16 = rand::thread_rng().gen_range(1000..10000);
        format!("ORD{}{}", Utc::now().format("%Y%m%d%H%M%S"), suffix)
    }

    /// Inserts an order and its items in one transaction
    #[instrument(skip(self), fields(order_id = %input.order_id))]
    pub async fn create_order(&self, input: CreateOrder) -> Result<OrderWithItems, ServiceError> {
        validate_input(&input)?;
        let db = &*self.db_pool;

        if Order::find_by_id(input.order_id.clone())
            .count(db)
            .await?
            > 0
        {
            return Err(ServiceError::Conflict(format!(
                "Order {} already exists",
                input.order_id
            )));
        }

        let (header, lines) = input.into_parts();
        let txn = db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let order = header.insert(&txn).await?;
        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            items.push(line.insert(&txn).await?);
        }
        let buyer = order.find_related(Buyer).one(&txn).await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        counter!("backoffice.orders.created", 1);
        info!(
            order_id = %order.order_id,
            items = items.len(),
            "Order created"
        );
        Ok(OrderWithItems {
            order,
            buyer,
            items,
        })
    }

    /// Sets the order status and its side effects: `shipped` stamps `shipped_at`,
    /// `delivered` stamps `completed_at`, `canceled` stores a given reason
    #[instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        cancel_reason: Option<String>,
    ) -> Result<order::Model, ServiceError> {
        let db = &*self.db_pool;
        let existing = Order::find_by_id(order_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| not_found("Order", order_id))?;

        let now = Utc::now();
        let mut active: order::ActiveModel = existing.into();
        active.order_status = Set(status);
        match status {
            OrderStatus::Shipped => active.shipped_at = Set(Some(now)),
            OrderStatus::Delivered => active.completed_at = Set(Some(now)),
            _ => {}
        }
        match cancel_reason.filter(|r| !r.trim().is_empty()) {
            Some(reason) if status == OrderStatus::Canceled => {
                active.cancel_reason = Set(Some(reason));
            }
            Some(_) => debug!("Ignoring cancel reason for status {}", status),
            None => {}
        }

        let order = active.update(db).await?;
        info!(order_id, status = %status, "Order status updated");
        Ok(order)
    }

    /// Applies a partial update; an empty patch returns the stored row untouched
    #[instrument(skip(self))]
    pub async fn update_order(
        &self,
        order_id: &str,
        input: UpdateOrder,
    ) -> Result<order::Model, ServiceError> {
        validate_input(&input)?;
        let db = &*self.db_pool;
        let existing = Order::find_by_id(order_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| not_found("Order", order_id))?;

        let mut active: order::ActiveModel = existing.clone().into();
        input.apply(&mut active);
        if !active.is_changed() {
            return Ok(existing);
        }
        Ok(active.update(db).await?)
    }

    /// Deletes an order with its items. Inventory movements that referenced the
    /// order stay in the ledger with `order_id` cleared.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, input: DeleteOrder) -> Result<(), ServiceError> {
        validate_input(&input)?;
        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        InventoryMovement::update_many()
            .col_expr(
                inventory_movement::Column::OrderId,
                Expr::value(Option::<String>::None),
            )
            .filter(inventory_movement::Column::OrderId.eq(input.order_id.as_str()))
            .exec(&txn)
            .await?;
        OrderItem::delete_many()
            .filter(order_item::Column::OrderId.eq(input.order_id.as_str()))
            .exec(&txn)
            .await?;
        let result = Order::delete_by_id(input.order_id.clone())
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(not_found("Order", &input.order_id));
        }

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;
        info!(order_id = %input.order_id, "Order deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: &str) -> Result<Option<order::Model>, ServiceError> {
        let db = &*self.db_pool;
        Ok(Order::find_by_id(order_id.to_string()).one(db).await?)
    }

    /// One order with its buyer and items
    #[instrument(skip(self))]
    pub async fn order_with_items(&self, order_id: &str) -> Result<OrderWithItems, ServiceError> {
        let db = &*self.db_pool;
        let (order, buyer) = Order::find_by_id(order_id.to_string())
            .find_also_related(Buyer)
            .one(db)
            .await?
            .ok_or_else(|| not_found("Order", order_id))?;
        let items = order
            .find_related(OrderItem)
            .order_by_asc(order_item::Column::ItemId)
            .all(db)
            .await?;
        Ok(OrderWithItems {
            order,
            buyer,
            items,
        })
    }

    /// All orders newest first, each with buyer and items
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<OrderWithItems>, ServiceError> {
        let db = &*self.db_pool;
        let rows = Order::find()
            .find_also_related(Buyer)
            .order_by_desc(order::Column::CreatedAt)
            .order_by_desc(order::Column::OrderId)
            .all(db)
            .await?;

        let order_ids: Vec<String> = rows.iter().map(|(o, _)| o.order_id.clone()).collect();
        let mut items_by_order = group_items(db, order_ids).await?;

        Ok(rows
            .into_iter()
            .map(|(order, buyer)| {
                let items = items_by_order.remove(&order.order_id).unwrap_or_default();
                OrderWithItems {
                    order,
                    buyer,
                    items,
                }
            })
            .collect())
    }

    /// Orders currently in `status`, newest first
    #[instrument(skip(self))]
    pub async fn orders_by_status(
        &self,
        status: OrderStatus,
    ) -> Result<Vec<order::Model>, ServiceError> {
        let db = &*self.db_pool;
        Ok(Order::find()
            .filter(order::Column::OrderStatus.eq(status))
            .order_by_desc(order::Column::CreatedAt)
            .all(db)
            .await?)
    }

    // Items

    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        input: CreateOrderItem,
    ) -> Result<order_item::Model, ServiceError> {
        validate_input(&input)?;
        let db = &*self.db_pool;
        Ok(input.into_active_model().insert(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_item(&self, item_id: i32) -> Result<Option<order_item::Model>, ServiceError> {
        let db = &*self.db_pool;
        Ok(OrderItem::find_by_id(item_id).one(db).await?)
    }

    /// Patches an item; the resulting `returned_quantity` may not exceed `quantity`
    #[instrument(skip(self))]
    pub async fn update_item(
        &self,
        item_id: i32,
        input: UpdateOrderItem,
    ) -> Result<order_item::Model, ServiceError> {
        validate_input(&input)?;
        let db = &*self.db_pool;
        let existing = OrderItem::find_by_id(item_id)
            .one(db)
            .await?
            .ok_or_else(|| not_found("Order item", item_id))?;

        let quantity = input.quantity.unwrap_or(existing.quantity);
        let returned = input.returned_quantity.unwrap_or(existing.returned_quantity);
        check_returned_quantity(quantity, returned)
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let mut active: order_item::ActiveModel = existing.clone().into();
        input.apply(&mut active);
        if !active.is_changed() {
            return Ok(existing);
        }
        Ok(active.update(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_item(&self, input: DeleteOrderItem) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let result = OrderItem::delete_by_id(input.item_id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(not_found("Order item", input.item_id));
        }
        Ok(())
    }

    // Sales figures

    /// Paid amount and sold quantity per day from `start` to `end` inclusive,
    /// with zero entries for days without orders
    #[instrument(skip(self))]
    pub async fn daily_sales(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailySales>, ServiceError> {
        let (from, until) = day_bounds(start, end)?;
        let db = &*self.db_pool;
        let orders = orders_between(db, from, until).await?;
        let order_ids = orders.iter().map(|o| o.order_id.clone()).collect();
        let items_by_order = group_items(db, order_ids).await?;

        let mut series = empty_series(start, end);
        for order in &orders {
            if let Some(point) = series.get_mut(&order.created_at.date_naive()) {
                point.amount += order.total_paid;
                point.quantity += items_by_order
                    .get(&order.order_id)
                    .map(|items| items.iter().map(|i| i64::from(i.quantity)).sum::<i64>())
                    .unwrap_or(0);
            }
        }
        Ok(series.into_values().collect())
    }

    /// Per requested product, item revenue and quantity per day from `start` to
    /// `end` inclusive. A repeated id gets its own copy of the series.
    #[instrument(skip(self))]
    pub async fn product_sales(
        &self,
        product_ids: &[i32],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ProductSales>, ServiceError> {
        if product_ids.is_empty() {
            return Err(ServiceError::InvalidInput(
                "at least one product id is required".to_string(),
            ));
        }
        let (from, until) = day_bounds(start, end)?;
        let db = &*self.db_pool;
        let orders = orders_between(db, from, until).await?;
        let order_days: HashMap<String, NaiveDate> = orders
            .iter()
            .map(|o| (o.order_id.clone(), o.created_at.date_naive()))
            .collect();

        let items = OrderItem::find()
            .filter(order_item::Column::OrderId.is_in(order_days.keys().cloned()))
            .filter(order_item::Column::ProductId.is_in(product_ids.to_vec()))
            .all(db)
            .await?;

        let mut per_product: BTreeMap<i32, BTreeMap<NaiveDate, DailySales>> = product_ids
            .iter()
            .map(|id| (*id, empty_series(start, end)))
            .collect();
        for item in items {
            let day = order_days.get(&item.order_id);
            let point = day.and_then(|d| {
                per_product
                    .get_mut(&item.product_id)
                    .and_then(|series| series.get_mut(d))
            });
            if let Some(point) = point {
                point.amount += item.total_price;
                point.quantity += i64::from(item.quantity);
            }
        }

        Ok(product_ids
            .iter()
            .map(|id| ProductSales {
                product_id: *id,
                data: per_product
                    .get(id)
                    .map(|series| series.values().cloned().collect())
                    .unwrap_or_default(),
            })
            .collect())
    }
}

async fn group_items<C>(
    db: &C,
    order_ids: Vec<String>,
) -> Result<HashMap<String, Vec<order_item::Model>>, ServiceError>
where
    C: sea_orm::ConnectionTrait,
{
    if order_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let items = OrderItem::find()
        .filter(order_item::Column::OrderId.is_in(order_ids))
        .order_by_asc(order_item::Column::ItemId)
        .all(db)
        .await?;
    let mut grouped: HashMap<String, Vec<order_item::Model>> = HashMap::new();
    for item in items {
        grouped.entry(item.order_id.clone()).or_default().push(item);
    }
    Ok(grouped)
}

async fn orders_between<C>(
    db: &C,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
) -> Result<Vec<order::Model>, ServiceError>
where
    C: sea_orm::ConnectionTrait,
{
    Ok(Order::find()
        .filter(order::Column::CreatedAt.gte(from))
        .filter(order::Column::CreatedAt.lt(until))
        .order_by_asc(order::Column::CreatedAt)
        .all(db)
        .await?)
}

/// Longest series `daily_sales` and `product_sales` will build
pub const MAX_SALES_SPAN_DAYS: i64 = 5 * 366;

/// Half-open UTC range covering the days `start..=end`
fn day_bounds(
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(DateTime<Utc>, DateTime<Utc>), ServiceError> {
    if start > end {
        return Err(ServiceError::InvalidInput(format!(
            "start date {} is after end date {}",
            start, end
        )));
    }
    if (end - start).num_days() >= MAX_SALES_SPAN_DAYS {
        return Err(ServiceError::InvalidInput(format!(
            "sales range {}..{} exceeds {} days",
            start, end, MAX_SALES_SPAN_DAYS
        )));
    }
    let after_end = end
        .succ_opt()
        .ok_or_else(|| ServiceError::InvalidInput(format!("end date {} is out of range", end)))?;
    let midnight = NaiveTime::default();
    Ok((
        Utc.from_utc_datetime(&start.and_time(midnight)),
        Utc.from_utc_datetime(&after_end.and_time(midnight)),
    ))
}

fn empty_series(start: NaiveDate, end: NaiveDate) -> BTreeMap<NaiveDate, DailySales> {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|date| {
            (
                date,
                DailySales {
                    date,
                    amount: Decimal::ZERO,
                    quantity: 0,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_order_id_has_expected_shape() {
        let id = OrderService::generate_order_id();
        assert!(id.starts_with("ORD"));
        assert_eq!(id.len(), 3 + 14 + 4);
        assert!(id[3..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn day_bounds_rejects_reversed_range() {
        let start = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert!(matches!(
            day_bounds(start, end),
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[test]
    fn day_bounds_caps_the_span() {
        let start = NaiveDate::from_ymd_opt(1, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(9999, 12, 31).unwrap();
        assert!(matches!(
            day_bounds(start, end),
            Err(ServiceError::InvalidInput(_))
        ));

        let last_allowed = start + chrono::Duration::days(MAX_SALES_SPAN_DAYS - 1);
        assert!(day_bounds(start, last_allowed).is_ok());
        assert!(day_bounds(start, last_allowed + chrono::Duration::days(1)).is_err());
    }

    #[test]
    fn empty_series_covers_every_day() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 27).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let series = empty_series(start, end);
        assert_eq!(series.len(), 4);
        assert!(series.values().all(|p| p.amount.is_zero() && p.quantity == 0));
    }
}
