//! Async operations over the back-office tables.
//!
//! Every service validates its transfer objects before touching storage and
//! maps storage failures through `ServiceError::from(DbErr)`, so uniqueness and
//! foreign key violations surface as `Conflict` and `InvalidReference`.

pub mod buyers;
pub mod catalog;
pub mod inventory;
pub mod orders;
pub mod purchasing;
pub mod suppliers;

pub use buyers::BuyerService;
pub use catalog::CatalogService;
pub use inventory::{InventoryService, ReconciliationReport, StockStatus};
pub use orders::{DailySales, OrderService, OrderWithItems, ProductSales, MAX_SALES_SPAN_DAYS};
pub use purchasing::{PurchaseLineView, PurchasingService};
pub use suppliers::SupplierService;

use crate::db::DbPool;
use crate::errors::ServiceError;
use std::sync::Arc;
use validator::Validate;

/// All services sharing one connection pool
#[derive(Clone)]
pub struct BackofficeServices {
    pub suppliers: SupplierService,
    pub buyers: BuyerService,
    pub catalog: CatalogService,
    pub purchasing: PurchasingService,
    pub inventory: InventoryService,
    pub orders: OrderService,
}

impl BackofficeServices {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self {
            suppliers: SupplierService::new(db.clone()),
            buyers: BuyerService::new(db.clone()),
            catalog: CatalogService::new(db.clone()),
            purchasing: PurchasingService::new(db.clone()),
            inventory: InventoryService::new(db.clone()),
            orders: OrderService::new(db),
        }
    }
}

pub(crate) fn validate_input<T: Validate>(input: &T) -> Result<(), ServiceError> {
    input
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))
}

pub(crate) fn not_found(entity: &str, id: impl std::fmt::Display) -> ServiceError {
    ServiceError::NotFound(format!("{} {} not found", entity, id))
}
