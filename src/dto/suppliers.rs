use super::{non_null, CreateTransfer, UpdateTransfer};
use crate::entities::supplier;
use sea_orm::{NotSet, Set};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateSupplier {
    #[validate(length(min = 1, max = 255))]
    pub supplier_name: String,
    #[validate(length(min = 1, max = 255))]
    pub contact_info: String,
}

impl CreateTransfer<supplier::ActiveModel> for CreateSupplier {
    fn into_active_model(self) -> supplier::ActiveModel {
        supplier::ActiveModel {
            supplier_id: NotSet,
            supplier_name: Set(self.supplier_name),
            contact_info: Set(self.contact_info),
            created_at: NotSet,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateSupplier {
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(length(min = 1, max = 255))]
    pub supplier_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(length(min = 1, max = 255))]
    pub contact_info: Option<String>,
}

impl UpdateTransfer<supplier::ActiveModel> for UpdateSupplier {
    fn apply(self, active: &mut supplier::ActiveModel) {
        if let Some(name) = self.supplier_name {
            active.supplier_name = Set(name);
        }
        if let Some(contact_info) = self.contact_info {
            active.contact_info = Set(contact_info);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DeleteSupplier {
    pub supplier_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::from_json;
    use crate::errors::ServiceError;
    use serde_json::json;

    #[test]
    fn create_requires_every_field() {
        let err = from_json::<CreateSupplier>(json!({ "supplier_name": "Acme" })).unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(msg) if msg.contains("contact_info")));
    }

    #[test]
    fn create_rejects_server_assigned_columns() {
        let result = from_json::<CreateSupplier>(json!({
            "supplier_name": "Acme",
            "contact_info": "ops@acme.test",
            "created_at": "2024-04-24T00:00:00Z"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn empty_update_leaves_model_unchanged() {
        let mut active = supplier::ActiveModel {
            supplier_id: sea_orm::Unchanged(1),
            supplier_name: sea_orm::Unchanged("Acme".into()),
            contact_info: sea_orm::Unchanged("ops@acme.test".into()),
            created_at: sea_orm::Unchanged(chrono::Utc::now()),
        };
        UpdateSupplier::default().apply(&mut active);
        assert!(!sea_orm::ActiveModelTrait::is_changed(&active));

        UpdateSupplier {
            contact_info: Some("sales@acme.test".into()),
            ..Default::default()
        }
        .apply(&mut active);
        assert!(active.contact_info.is_set());
        assert!(!active.supplier_name.is_set());
    }
}
