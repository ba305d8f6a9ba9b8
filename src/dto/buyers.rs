use super::{non_null, CreateTransfer, UpdateTransfer};
use crate::entities::buyer;
use sea_orm::{NotSet, Set};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateBuyer {
    #[validate(length(min = 1, max = 255))]
    pub buyer_account: String,
}

impl CreateTransfer<buyer::ActiveModel> for CreateBuyer {
    fn into_active_model(self) -> buyer::ActiveModel {
        buyer::ActiveModel {
            buyer_id: NotSet,
            buyer_account: Set(self.buyer_account),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateBuyer {
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(length(min = 1, max = 255))]
    pub buyer_account: Option<String>,
}

impl UpdateTransfer<buyer::ActiveModel> for UpdateBuyer {
    fn apply(self, active: &mut buyer::ActiveModel) {
        if let Some(account) = self.buyer_account {
            active.buyer_account = Set(account);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DeleteBuyer {
    pub buyer_id: i32,
}
