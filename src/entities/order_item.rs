use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub item_id: i32,
    pub order_id: String,
    pub product_id: i32,
    pub model_id: i32,
    pub quantity: i32,
    pub returned_quantity: i32,
    pub sold_price: Decimal,
    pub total_price: Decimal,
}

impl Model {
    /// Units that were sold and not returned
    pub fn kept_quantity(&self) -> i32 {
        self.quantity - self.returned_quantity
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::OrderId"
    )]
    Order,
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::ProductId"
    )]
    Product,
    #[sea_orm(
        belongs_to = "super::product_model::Entity",
        from = "Column::ModelId",
        to = "super::product_model::Column::ModelId"
    )]
    ProductModel,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::product_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductModel.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
