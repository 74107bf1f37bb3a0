mod common;

use assert_matches::assert_matches;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use common::spawn_app;
use tradebook_api::{
    entities::enums::PaymentStatus,
    entities::{cash_movement, payment, product, purchase, stock_movement},
    errors::ServiceError,
    services::orders::LineItemInput,
    services::payments::RecordPaymentRequest,
    services::purchases::CreatePurchaseRequest,
};

fn line(product_id: Uuid, quantity: rust_decimal::Decimal, unit_price: i64) -> LineItemInput {
    LineItemInput {
        product_id,
        quantity,
        unit_price,
        currency_id: None,
    }
}

#[tokio::test]
async fn purchase_increases_stock_and_pays_outward() {
    let app = spawn_app().await;
    let supplier = app.seed_supplier("Northside Wholesale").await;
    let prod = app.seed_basic_product("Widget", dec!(4)).await;

    let details = app
        .services
        .purchases
        .create_purchase(CreatePurchaseRequest {
            supplier_id: Some(supplier.id),
            date: None,
            items: vec![line(prod.id, dec!(10), 800)],
            paid_amount: 8000,
            note: None,
            recorded_by: Uuid::new_v4(),
        })
        .await
        .expect("purchase creation should succeed");

    assert_eq!(details.purchase.total, 8000);
    assert_eq!(details.purchase.due_amount, 0);
    assert_eq!(details.purchase.status, PaymentStatus::Paid);

    // Stock goes up, no availability check applies.
    let refreshed = product::Entity::find_by_id(prod.id)
        .one(&*app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(refreshed.quantity, dec!(14));

    let movements = stock_movement::Entity::find()
        .filter(stock_movement::Column::ProductId.eq(prod.id))
        .all(&*app.db)
        .await
        .unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].direction, "in");
    assert_eq!(movements[0].quantity, dec!(10));

    // Purchase payments leave the till.
    let payments = payment::Entity::find()
        .filter(payment::Column::PayableId.eq(details.purchase.id))
        .all(&*app.db)
        .await
        .unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].direction, "out");
    assert_eq!(payments[0].payable_type, "purchase");

    let mirrors = cash_movement::Entity::find()
        .filter(cash_movement::Column::SourceId.eq(payments[0].id))
        .all(&*app.db)
        .await
        .unwrap();
    assert_eq!(mirrors.len(), 1);
    assert_eq!(mirrors[0].direction, "out");
    assert_eq!(mirrors[0].amount, 8000);
}

#[tokio::test]
async fn partial_purchase_settles_over_multiple_payments() {
    let app = spawn_app().await;
    let prod = app.seed_basic_product("Widget", dec!(0)).await;

    let details = app
        .services
        .purchases
        .create_purchase(CreatePurchaseRequest {
            supplier_id: None,
            date: None,
            items: vec![line(prod.id, dec!(5), 1000)],
            paid_amount: 0,
            note: None,
            recorded_by: Uuid::new_v4(),
        })
        .await
        .unwrap();
    assert_eq!(details.purchase.status, PaymentStatus::Unpaid);
    assert_eq!(details.purchase.due_amount, 5000);

    let first = app
        .services
        .payments
        .record_purchase_payment(
            details.purchase.id,
            RecordPaymentRequest {
                amount: 2000,
                note: None,
                recorded_by: Uuid::new_v4(),
            },
        )
        .await
        .unwrap();
    assert_eq!(first.purchase.status, PaymentStatus::Partial);
    assert_eq!(first.purchase.due_amount, 3000);

    let second = app
        .services
        .payments
        .record_purchase_payment(
            details.purchase.id,
            RecordPaymentRequest {
                amount: 3000,
                note: None,
                recorded_by: Uuid::new_v4(),
            },
        )
        .await
        .unwrap();
    assert_eq!(second.purchase.status, PaymentStatus::Paid);
    assert_eq!(second.purchase.paid_amount, 5000);
    assert_eq!(second.purchase.due_amount, 0);
}

#[tokio::test]
async fn unknown_product_rolls_back_the_purchase() {
    let app = spawn_app().await;
    let prod = app.seed_basic_product("Widget", dec!(1)).await;

    let err = app
        .services
        .purchases
        .create_purchase(CreatePurchaseRequest {
            supplier_id: None,
            date: None,
            items: vec![line(prod.id, dec!(2), 100), line(Uuid::new_v4(), dec!(1), 100)],
            paid_amount: 0,
            note: None,
            recorded_by: Uuid::new_v4(),
        })
        .await
        .expect_err("unknown product must fail");
    assert_matches!(err, ServiceError::NotFound(_));

    assert_eq!(purchase::Entity::find().count(&*app.db).await.unwrap(), 0);
    let unchanged = product::Entity::find_by_id(prod.id)
        .one(&*app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.quantity, dec!(1));
}
