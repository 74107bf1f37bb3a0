mod common;

use assert_matches::assert_matches;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use common::spawn_app;
use tradebook_api::{
    entities::enums::PaymentStatus,
    entities::{cash_movement, order, order_item, payment, product, stock_movement},
    errors::ServiceError,
    services::orders::{CreateOrderRequest, LineItemInput, OrderListFilter},
    services::payments::RecordPaymentRequest,
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
async fn order_lifecycle_posts_all_ledgers() {
    let app = spawn_app().await;
    let customer = app.seed_customer("Acme Retail").await;
    let prod = app.seed_basic_product("Widget", dec!(20)).await;

    let details = app
        .services
        .orders
        .create_order(CreateOrderRequest {
            customer_id: Some(customer.id),
            date: None,
            items: vec![line(prod.id, dec!(5), 1000)],
            paid_amount: 3000,
            note: Some("counter sale".to_string()),
            recorded_by: Uuid::new_v4(),
        })
        .await
        .expect("order creation should succeed");

    assert_eq!(details.order.total, 5000);
    assert_eq!(details.order.paid_amount, 3000);
    assert_eq!(details.order.due_amount, 2000);
    assert_eq!(details.order.status, PaymentStatus::Partial);
    assert_eq!(details.items.len(), 1);
    assert_eq!(details.items[0].line_total, 5000);
    assert_eq!(details.payments.len(), 1);
    assert_eq!(details.payments[0].amount, 3000);

    // Stock decremented and mirrored by exactly one `out` movement.
    let refreshed = product::Entity::find_by_id(prod.id)
        .one(&*app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(refreshed.quantity, dec!(15));

    let movements = stock_movement::Entity::find()
        .filter(stock_movement::Column::ProductId.eq(prod.id))
        .all(&*app.db)
        .await
        .unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].direction, "out");
    assert_eq!(movements[0].quantity, dec!(5));
    assert_eq!(movements[0].source_id, details.items[0].id);

    // Initial payment mirrored 1:1 into the cash ledger.
    let mirrors = cash_movement::Entity::find()
        .filter(cash_movement::Column::SourceId.eq(details.payments[0].id))
        .all(&*app.db)
        .await
        .unwrap();
    assert_eq!(mirrors.len(), 1);
    assert_eq!(mirrors[0].direction, "in");
    assert_eq!(mirrors[0].amount, 3000);

    // Settling the remainder flips the derived status to paid.
    let outcome = app
        .services
        .payments
        .record_order_payment(
            details.order.id,
            RecordPaymentRequest {
                amount: 2000,
                note: None,
                recorded_by: Uuid::new_v4(),
            },
        )
        .await
        .expect("payment should succeed");
    assert_eq!(outcome.order.paid_amount, 5000);
    assert_eq!(outcome.order.due_amount, 0);
    assert_eq!(outcome.order.status, PaymentStatus::Paid);

    let payment_count = payment::Entity::find()
        .filter(payment::Column::PayableId.eq(details.order.id))
        .count(&*app.db)
        .await
        .unwrap();
    assert_eq!(payment_count, 2);
}

#[tokio::test]
async fn insufficient_stock_rolls_back_everything() {
    let app = spawn_app().await;
    let plenty = app.seed_basic_product("Plenty", dec!(50)).await;
    let scarce = app
        .seed_product(
            "Scarce",
            plenty.unit_id,
            plenty.currency_id,
            dec!(3),
            None,
            None,
        )
        .await;

    let err = app
        .services
        .orders
        .create_order(CreateOrderRequest {
            customer_id: None,
            date: None,
            items: vec![line(plenty.id, dec!(2), 500), line(scarce.id, dec!(10), 700)],
            paid_amount: 0,
            note: None,
            recorded_by: Uuid::new_v4(),
        })
        .await
        .expect_err("should fail on the scarce line");
    assert_matches!(
        err,
        ServiceError::InsufficientStock {
            product_id,
            ..
        } if product_id == scarce.id
    );

    // The first line must not have landed either.
    assert_eq!(order::Entity::find().count(&*app.db).await.unwrap(), 0);
    assert_eq!(order_item::Entity::find().count(&*app.db).await.unwrap(), 0);
    assert_eq!(
        stock_movement::Entity::find().count(&*app.db).await.unwrap(),
        0
    );
    let unchanged = product::Entity::find_by_id(plenty.id)
        .one(&*app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.quantity, dec!(50));
}

#[tokio::test]
async fn currency_mismatch_aborts_the_order() {
    let app = spawn_app().await;
    let prod = app.seed_basic_product("Widget", dec!(10)).await;
    let other = app.seed_currency("EUR").await;

    let err = app
        .services
        .orders
        .create_order(CreateOrderRequest {
            customer_id: None,
            date: None,
            items: vec![LineItemInput {
                product_id: prod.id,
                quantity: dec!(1),
                unit_price: 100,
                currency_id: Some(other.id),
            }],
            paid_amount: 0,
            note: None,
            recorded_by: Uuid::new_v4(),
        })
        .await
        .expect_err("mismatched currency must be rejected");
    assert_matches!(err, ServiceError::CurrencyMismatch { .. });
    assert_eq!(order::Entity::find().count(&*app.db).await.unwrap(), 0);
}

#[tokio::test]
async fn invalid_requests_are_rejected_before_any_write() {
    let app = spawn_app().await;
    let prod = app.seed_basic_product("Widget", dec!(10)).await;
    let recorded_by = Uuid::new_v4();

    let empty = CreateOrderRequest {
        customer_id: None,
        date: None,
        items: vec![],
        paid_amount: 0,
        note: None,
        recorded_by,
    };
    assert_matches!(
        app.services.orders.create_order(empty).await,
        Err(ServiceError::ValidationError(_))
    );

    let negative_paid = CreateOrderRequest {
        customer_id: None,
        date: None,
        items: vec![line(prod.id, dec!(1), 100)],
        paid_amount: -1,
        note: None,
        recorded_by,
    };
    assert_matches!(
        app.services.orders.create_order(negative_paid).await,
        Err(ServiceError::ValidationError(_))
    );

    let zero_quantity = CreateOrderRequest {
        customer_id: None,
        date: None,
        items: vec![line(prod.id, dec!(0), 100)],
        paid_amount: 0,
        note: None,
        recorded_by,
    };
    assert_matches!(
        app.services.orders.create_order(zero_quantity).await,
        Err(ServiceError::ValidationError(_))
    );
    assert_eq!(order::Entity::find().count(&*app.db).await.unwrap(), 0);
}

#[tokio::test]
async fn zero_total_order_stays_unpaid() {
    let app = spawn_app().await;
    let prod = app.seed_basic_product("Sample", dec!(5)).await;

    let details = app
        .services
        .orders
        .create_order(CreateOrderRequest {
            customer_id: None,
            date: None,
            items: vec![line(prod.id, dec!(1), 0)],
            paid_amount: 0,
            note: Some("free sample".to_string()),
            recorded_by: Uuid::new_v4(),
        })
        .await
        .unwrap();
    assert_eq!(details.order.total, 0);
    assert_eq!(details.order.status, PaymentStatus::Unpaid);
}

#[tokio::test]
async fn list_orders_filters_by_customer() {
    let app = spawn_app().await;
    let prod = app.seed_basic_product("Widget", dec!(100)).await;
    let alice = app.seed_customer("Alice").await;
    let bob = app.seed_customer("Bob").await;
    let recorded_by = Uuid::new_v4();

    for customer_id in [alice.id, alice.id, bob.id] {
        app.services
            .orders
            .create_order(CreateOrderRequest {
                customer_id: Some(customer_id),
                date: None,
                items: vec![line(prod.id, dec!(1), 100)],
                paid_amount: 0,
                note: None,
                recorded_by,
            })
            .await
            .unwrap();
    }

    let listing = app
        .services
        .orders
        .list_orders(
            1,
            10,
            OrderListFilter {
                customer_id: Some(alice.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(listing.total, 2);
    assert!(listing
        .orders
        .iter()
        .all(|o| o.customer_id == Some(alice.id)));
}
