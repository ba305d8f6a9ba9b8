use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of stock change recorded in the movement ledger
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    #[sea_orm(string_value = "purchase")]
    Purchase,
    #[sea_orm(string_value = "outbound")]
    Outbound,
    #[sea_orm(string_value = "return")]
    Return,
    #[sea_orm(string_value = "adjust")]
    Adjust,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Purchase => "purchase",
            MovementType::Outbound => "outbound",
            MovementType::Return => "return",
            MovementType::Adjust => "adjust",
        }
    }

    /// Stock delta produced by a movement of this type.
    ///
    /// `purchase`, `outbound` and `return` carry a positive magnitude and the type
    /// picks the direction; `adjust` carries its own sign.
    pub fn signed_delta(&self, quantity: i32) -> i32 {
        match self {
            MovementType::Purchase | MovementType::Return => quantity,
            MovementType::Outbound => -quantity,
            MovementType::Adjust => quantity,
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "purchase" => Ok(MovementType::Purchase),
            "outbound" => Ok(MovementType::Outbound),
            "return" => Ok(MovementType::Return),
            "adjust" => Ok(MovementType::Adjust),
            other => Err(format!("unknown movement type '{}'", other)),
        }
    }
}

/// Ledger row describing one change to a model's stock
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_movements")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub movement_id: i32,
    pub model_id: i32,
    pub order_id: Option<String>,
    pub movement_type: MovementType,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub note: Option<String>,
}

impl Model {
    pub fn signed_delta(&self) -> i32 {
        self.movement_type.signed_delta(self.quantity)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product_model::Entity",
        from = "Column::ModelId",
        to = "super::product_model::Column::ModelId"
    )]
    ProductModel,
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::OrderId"
    )]
    Order,
}

impl Related<super::product_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductModel.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        if insert && matches!(active_model.created_at, ActiveValue::NotSet) {
            active_model.created_at = Set(Utc::now());
        }
        Ok(active_model)
    }
}
