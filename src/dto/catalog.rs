use super::{non_null, validate_non_negative_decimal, CreateTransfer, Patch, UpdateTransfer};
use crate::entities::{category, product, product_model, ProductStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{NotSet, Set};
use serde::{Deserialize, Serialize};
use validator::Validate;

// Categories

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 255))]
    pub category_name: String,
    /// Omitted or `null` creates a root category
    #[serde(default)]
    pub parent_id: Option<i32>,
}

impl CreateTransfer<category::ActiveModel> for CreateCategory {
    fn into_active_model(self) -> category::ActiveModel {
        category::ActiveModel {
            category_id: NotSet,
            category_name: Set(self.category_name),
            parent_id: Set(self.parent_id),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateCategory {
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(length(min = 1, max = 255))]
    pub category_name: Option<String>,
    /// `null` detaches the category and makes it a root
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub parent_id: Patch<i32>,
}

impl UpdateTransfer<category::ActiveModel> for UpdateCategory {
    fn apply(self, active: &mut category::ActiveModel) {
        if let Some(name) = self.category_name {
            active.category_name = Set(name);
        }
        self.parent_id.apply_to(&mut active.parent_id);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DeleteCategory {
    pub category_id: i32,
}

// Products

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 255))]
    pub product_name: String,
    pub category_id: i32,
    pub listed_date: DateTime<Utc>,
    pub status: ProductStatus,
}

impl CreateTransfer<product::ActiveModel> for CreateProduct {
    fn into_active_model(self) -> product::ActiveModel {
        product::ActiveModel {
            product_id: NotSet,
            product_name: Set(self.product_name),
            category_id: Set(self.category_id),
            listed_date: Set(self.listed_date),
            status: Set(self.status),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateProduct {
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(length(min = 1, max = 255))]
    pub product_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub category_id: Option<i32>,
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub listed_date: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<ProductStatus>,
}

impl UpdateTransfer<product::ActiveModel> for UpdateProduct {
    fn apply(self, active: &mut product::ActiveModel) {
        if let Some(name) = self.product_name {
            active.product_name = Set(name);
        }
        if let Some(category_id) = self.category_id {
            active.category_id = Set(category_id);
        }
        if let Some(listed_date) = self.listed_date {
            active.listed_date = Set(listed_date);
        }
        if let Some(status) = self.status {
            active.status = Set(status);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DeleteProduct {
    pub product_id: i32,
}

// Product models

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateProductModel {
    pub product_id: i32,
    #[validate(length(min = 1, max = 255))]
    pub model_name: String,
    #[validate(length(min = 1, max = 100))]
    pub sku: String,
    #[validate(custom = "validate_non_negative_decimal")]
    pub original_price: Decimal,
    #[validate(custom = "validate_non_negative_decimal")]
    pub promo_price: Decimal,
}

impl CreateTransfer<product_model::ActiveModel> for CreateProductModel {
    fn into_active_model(self) -> product_model::ActiveModel {
        product_model::ActiveModel {
            model_id: NotSet,
            product_id: Set(self.product_id),
            model_name: Set(self.model_name),
            sku: Set(self.sku),
            original_price: Set(self.original_price),
            promo_price: Set(self.promo_price),
            created_at: NotSet,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateProductModel {
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(length(min = 1, max = 255))]
    pub model_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(length(min = 1, max = 100))]
    pub sku: Option<String>,
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(custom = "validate_non_negative_decimal")]
    pub original_price: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(custom = "validate_non_negative_decimal")]
    pub promo_price: Option<Decimal>,
}

impl UpdateTransfer<product_model::ActiveModel> for UpdateProductModel {
    fn apply(self, active: &mut product_model::ActiveModel) {
        if let Some(name) = self.model_name {
            active.model_name = Set(name);
        }
        if let Some(sku) = self.sku {
            active.sku = Set(sku);
        }
        if let Some(price) = self.original_price {
            active.original_price = Set(price);
        }
        if let Some(price) = self.promo_price {
            active.promo_price = Set(price);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DeleteProductModel {
    pub model_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::from_json;
    use crate::errors::ServiceError;
    use rstest::rstest;
    use serde_json::json;

    fn product_payload(status: &str) -> serde_json::Value {
        json!({
            "product_name": "Desk Lamp",
            "category_id": 1,
            "listed_date": "2024-04-24T09:00:00Z",
            "status": status
        })
    }

    #[rstest]
    #[case("active", ProductStatus::Active)]
    #[case("inactive", ProductStatus::Inactive)]
    #[case("out-of-stock", ProductStatus::OutOfStock)]
    fn product_status_accepts_documented_literals(
        #[case] literal: &str,
        #[case] expected: ProductStatus,
    ) {
        let payload: CreateProduct = from_json(product_payload(literal)).unwrap();
        assert_eq!(payload.status, expected);
    }

    #[rstest]
    #[case("Active")]
    #[case("out_of_stock")]
    #[case("archived")]
    #[case("")]
    fn product_status_rejects_other_strings(#[case] literal: &str) {
        let err = from_json::<CreateProduct>(product_payload(literal)).unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }

    #[test]
    fn negative_price_fails_validation() {
        let err = from_json::<CreateProductModel>(json!({
            "product_id": 1,
            "model_name": "Brass",
            "sku": "LAMP-BR",
            "original_price": "-1.00",
            "promo_price": "0"
        }))
        .unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }

    #[test]
    fn overlong_sku_fails_validation() {
        let patch = UpdateProductModel {
            sku: Some("X".repeat(101)),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn update_category_parent_tri_state() {
        let absent: UpdateCategory = from_json(json!({ "category_name": "Lighting" })).unwrap();
        assert!(absent.parent_id.is_absent());

        let detach: UpdateCategory = from_json(json!({ "parent_id": null })).unwrap();
        assert_eq!(detach.parent_id, Patch::Null);

        let mut active = category::ActiveModel {
            category_id: sea_orm::Unchanged(4),
            category_name: sea_orm::Unchanged("Lamps".into()),
            parent_id: sea_orm::Unchanged(Some(2)),
        };
        detach.apply(&mut active);
        assert_eq!(active.parent_id, Set(None));
        assert_eq!(active.category_name, sea_orm::Unchanged("Lamps".to_string()));
    }

    #[test]
    fn update_rejects_null_for_required_column() {
        assert!(from_json::<UpdateProduct>(json!({ "product_name": null })).is_err());
        assert!(from_json::<UpdateProduct>(json!({ "status": null })).is_err());
    }

    #[test]
    fn create_category_parent_is_optional() {
        let root: CreateCategory = from_json(json!({ "category_name": "Home" })).unwrap();
        assert_eq!(root.parent_id, None);
        let child: CreateCategory =
            from_json(json!({ "category_name": "Lamps", "parent_id": 1 })).unwrap();
        assert_eq!(child.parent_id, Some(1));
    }
}
