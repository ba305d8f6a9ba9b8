mod common;

use assert_matches::assert_matches;
use rust_decimal_macros::dec;
use shop_backoffice::{
    dto::{
        CreatePurchaseBatch, CreatePurchaseBatchWithItems, CreatePurchaseItem,
        DeletePurchaseBatch, DeletePurchaseItem, PurchaseLine, UpdatePurchaseItem,
    },
    entities::PurchaseBatchStatus,
    errors::ServiceError,
};

#[tokio::test]
async fn batch_with_items_is_stored_and_totalled() {
    let app = common::TestDb::new().await;
    let supplier = app.supplier("Acme").await;
    let lamp = app.catalog_with_model("PUR-LAMP", dec!(30)).await;
    let bulb = app.model(lamp.product_id, "PUR-BULB", dec!(3)).await;
    let purchasing = &app.services.purchasing;

    let (batch, items) = purchasing
        .create_batch_with_items(CreatePurchaseBatchWithItems {
            supplier_id: supplier.supplier_id,
            status: PurchaseBatchStatus::Draft,
            items: vec![
                PurchaseLine {
                    model_id: lamp.model_id,
                    quantity: 4,
                    unit_cost: dec!(12.50),
                },
                PurchaseLine {
                    model_id: bulb.model_id,
                    quantity: 10,
                    unit_cost: dec!(1),
                },
            ],
        })
        .await
        .unwrap();
    assert_eq!(batch.status, PurchaseBatchStatus::Draft);
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| i.batch_id == batch.batch_id));

    let total = purchasing.batch_total(batch.batch_id).await.unwrap();
    assert_eq!(total.round_dp(2), dec!(60));

    let lines = purchasing.purchase_lines().await.unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].supplier_name.as_deref(), Some("Acme"));
    assert_eq!(lines[0].sku.as_deref(), Some("PUR-LAMP"));
    assert_eq!(lines[0].category_name.as_deref(), Some("General"));
    assert_eq!(lines[0].line_total.round_dp(2), dec!(50));
    assert_eq!(lines[1].batch_status, Some(PurchaseBatchStatus::Draft));

    let listed = purchasing.list_batches().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(
        listed[0].1.as_ref().map(|s| s.supplier_id),
        Some(supplier.supplier_id)
    );
}

#[tokio::test]
async fn batch_without_lines_is_invalid() {
    let app = common::TestDb::new().await;
    let supplier = app.supplier("Acme").await;
    let err = app
        .services
        .purchasing
        .create_batch_with_items(CreatePurchaseBatchWithItems {
            supplier_id: supplier.supplier_id,
            status: PurchaseBatchStatus::Draft,
            items: vec![],
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn bad_line_rolls_back_the_whole_batch() {
    let app = common::TestDb::new().await;
    let supplier = app.supplier("Acme").await;
    let model = app.catalog_with_model("PUR-OK", dec!(2)).await;
    let purchasing = &app.services.purchasing;

    let err = purchasing
        .create_batch_with_items(CreatePurchaseBatchWithItems {
            supplier_id: supplier.supplier_id,
            status: PurchaseBatchStatus::Draft,
            items: vec![
                PurchaseLine {
                    model_id: model.model_id,
                    quantity: 1,
                    unit_cost: dec!(1),
                },
                PurchaseLine {
                    model_id: 31337,
                    quantity: 1,
                    unit_cost: dec!(1),
                },
            ],
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidReference(_));
    assert!(purchasing.list_batches().await.unwrap().is_empty());
    assert!(purchasing.purchase_lines().await.unwrap().is_empty());
}

#[tokio::test]
async fn batches_confirm_once() {
    let app = common::TestDb::new().await;
    let supplier = app.supplier("Acme").await;
    let purchasing = &app.services.purchasing;

    let batch = purchasing
        .create_batch(CreatePurchaseBatch {
            supplier_id: supplier.supplier_id,
            status: PurchaseBatchStatus::Draft,
        })
        .await
        .unwrap();

    let confirmed = purchasing.confirm_batch(batch.batch_id).await.unwrap();
    assert_eq!(confirmed.status, PurchaseBatchStatus::Confirmed);

    assert_matches!(
        purchasing.confirm_batch(batch.batch_id).await,
        Err(ServiceError::InvalidStatus(_))
    );
    assert_matches!(
        purchasing.confirm_batch(batch.batch_id + 100).await,
        Err(ServiceError::NotFound(_))
    );

    let batches = app
        .services
        .suppliers
        .batches_for_supplier(supplier.supplier_id)
        .await
        .unwrap();
    assert_eq!(batches.len(), 1);
}

#[tokio::test]
async fn items_are_managed_individually() {
    let app = common::TestDb::new().await;
    let supplier = app.supplier("Acme").await;
    let model = app.catalog_with_model("PUR-ITEM", dec!(2)).await;
    let purchasing = &app.services.purchasing;

    let batch = purchasing
        .create_batch(CreatePurchaseBatch {
            supplier_id: supplier.supplier_id,
            status: PurchaseBatchStatus::Draft,
        })
        .await
        .unwrap();
    let item = purchasing
        .add_item(CreatePurchaseItem {
            batch_id: batch.batch_id,
            model_id: model.model_id,
            quantity: 2,
            unit_cost: dec!(3),
        })
        .await
        .unwrap();

    let updated = purchasing
        .update_item(
            item.item_id,
            UpdatePurchaseItem {
                quantity: Some(5),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.quantity, 5);
    assert_eq!(
        purchasing.batch_total(batch.batch_id).await.unwrap().round_dp(2),
        dec!(15)
    );

    assert_matches!(
        purchasing
            .update_item(
                item.item_id,
                UpdatePurchaseItem {
                    quantity: Some(0),
                    ..Default::default()
                },
            )
            .await,
        Err(ServiceError::ValidationError(_))
    );

    purchasing
        .delete_item(DeletePurchaseItem {
            item_id: item.item_id,
        })
        .await
        .unwrap();
    assert!(purchasing.batch_items(batch.batch_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_batch_removes_its_items() {
    let app = common::TestDb::new().await;
    let supplier = app.supplier("Acme").await;
    let model = app.catalog_with_model("PUR-DEL", dec!(2)).await;
    let purchasing = &app.services.purchasing;

    let (batch, _) = purchasing
        .create_batch_with_items(CreatePurchaseBatchWithItems {
            supplier_id: supplier.supplier_id,
            status: PurchaseBatchStatus::Confirmed,
            items: vec![PurchaseLine {
                model_id: model.model_id,
                quantity: 1,
                unit_cost: dec!(1),
            }],
        })
        .await
        .unwrap();

    purchasing
        .delete_batch(DeletePurchaseBatch {
            batch_id: batch.batch_id,
        })
        .await
        .unwrap();
    assert!(purchasing.get_batch(batch.batch_id).await.unwrap().is_none());
    assert!(purchasing.purchase_lines().await.unwrap().is_empty());
    assert_matches!(
        purchasing
            .delete_batch(DeletePurchaseBatch {
                batch_id: batch.batch_id,
            })
            .await,
        Err(ServiceError::NotFound(_))
    );
}
