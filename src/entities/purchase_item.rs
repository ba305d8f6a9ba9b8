use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One line of a purchase batch
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub item_id: i32,
    pub batch_id: i32,
    pub model_id: i32,
    pub quantity: i32,
    pub unit_cost: Decimal,
}

impl Model {
    /// Cost of the whole line
    pub fn line_total(&self) -> Decimal {
        self.unit_cost * Decimal::from(self.quantity)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::purchase_batch::Entity",
        from = "Column::BatchId",
        to = "super::purchase_batch::Column::BatchId"
    )]
    PurchaseBatch,
    #[sea_orm(
        belongs_to = "super::product_model::Entity",
        from = "Column::ModelId",
        to = "super::product_model::Column::ModelId"
    )]
    ProductModel,
}

impl Related<super::purchase_batch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseBatch.def()
    }
}

impl Related<super::product_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductModel.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
