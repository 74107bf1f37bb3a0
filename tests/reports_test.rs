mod common;

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use uuid::Uuid;

use common::spawn_app;
use tradebook_api::{
    services::orders::{CreateOrderRequest, LineItemInput},
    services::purchases::CreatePurchaseRequest,
    services::reports::DateRange,
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
async fn customer_balances_include_inactive_customers_with_zeros() {
    let app = spawn_app().await;
    let alice = app.seed_customer("Alice").await;
    let bob = app.seed_customer("Bob").await;
    let prod = app.seed_basic_product("Widget", dec!(100)).await;

    app.services
        .orders
        .create_order(CreateOrderRequest {
            customer_id: Some(alice.id),
            date: None,
            items: vec![line(prod.id, dec!(5), 1000)],
            paid_amount: 3000,
            note: None,
            recorded_by: Uuid::new_v4(),
        })
        .await
        .unwrap();

    let rows = app
        .services
        .reports
        .customer_balances(DateRange::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);

    // Highest balance first.
    assert_eq!(rows[0].customer_id, alice.id);
    assert_eq!(rows[0].total_sold, 5000);
    assert_eq!(rows[0].total_received, 3000);
    assert_eq!(rows[0].balance_due, 2000);

    assert_eq!(rows[1].customer_id, bob.id);
    assert_eq!(rows[1].total_sold, 0);
    assert_eq!(rows[1].total_received, 0);
    assert_eq!(rows[1].balance_due, 0);

    let owing = app
        .services
        .reports
        .owing_customers(DateRange::default())
        .await
        .unwrap();
    assert_eq!(owing.len(), 1);
    assert_eq!(owing[0].customer_id, alice.id);
}

#[tokio::test]
async fn supplier_balances_mirror_the_purchase_side() {
    let app = spawn_app().await;
    let supplier = app.seed_supplier("Northside Wholesale").await;
    let prod = app.seed_basic_product("Widget", dec!(0)).await;

    app.services
        .purchases
        .create_purchase(CreatePurchaseRequest {
            supplier_id: Some(supplier.id),
            date: None,
            items: vec![line(prod.id, dec!(10), 800)],
            paid_amount: 5000,
            note: None,
            recorded_by: Uuid::new_v4(),
        })
        .await
        .unwrap();

    let rows = app
        .services
        .reports
        .supplier_balances(DateRange::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].total_bought, 8000);
    assert_eq!(rows[0].total_paid, 5000);
    assert_eq!(rows[0].balance_payable, 3000);

    let owed = app
        .services
        .reports
        .owed_suppliers(DateRange::default())
        .await
        .unwrap();
    assert_eq!(owed.len(), 1);
}

#[tokio::test]
async fn date_range_limits_document_sums() {
    let app = spawn_app().await;
    let alice = app.seed_customer("Alice").await;
    let prod = app.seed_basic_product("Widget", dec!(100)).await;
    let recorded_by = Uuid::new_v4();

    for (date, price) in [
        (NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(), 1000),
        (NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(), 2000),
    ] {
        app.services
            .orders
            .create_order(CreateOrderRequest {
                customer_id: Some(alice.id),
                date: Some(date),
                items: vec![line(prod.id, dec!(1), price)],
                paid_amount: 0,
                note: None,
                recorded_by,
            })
            .await
            .unwrap();
    }

    let range = DateRange {
        from: NaiveDate::from_ymd_opt(2025, 2, 1),
        to: None,
    };
    let rows = app.services.reports.customer_balances(range).await.unwrap();
    assert_eq!(rows[0].total_sold, 2000);

    let metrics = app.services.reports.dashboard_metrics(range).await.unwrap();
    assert_eq!(metrics.total_sold, 2000);
    assert_eq!(metrics.ar_due, 2000);
}

#[tokio::test]
async fn dashboard_aggregates_both_sides_and_inventory() {
    let app = spawn_app().await;
    let prod = app.seed_basic_product("Widget", dec!(10)).await;
    let recorded_by = Uuid::new_v4();

    app.services
        .orders
        .create_order(CreateOrderRequest {
            customer_id: None,
            date: None,
            items: vec![line(prod.id, dec!(5), 1000)],
            paid_amount: 3000,
            note: None,
            recorded_by,
        })
        .await
        .unwrap();
    app.services
        .purchases
        .create_purchase(CreatePurchaseRequest {
            supplier_id: None,
            date: None,
            items: vec![line(prod.id, dec!(10), 800)],
            paid_amount: 4000,
            note: None,
            recorded_by,
        })
        .await
        .unwrap();

    let metrics = app
        .services
        .reports
        .dashboard_metrics(DateRange::default())
        .await
        .unwrap();
    assert_eq!(metrics.total_sold, 5000);
    assert_eq!(metrics.total_bought, 8000);
    assert_eq!(metrics.ar_due, 2000);
    assert_eq!(metrics.ap_due, 4000);
    assert_eq!(metrics.cash_in, 3000);
    assert_eq!(metrics.cash_out, 4000);
    // 10 - 5 + 10 on hand at the seeded buy price of 800.
    assert_eq!(metrics.inventory_value, 12000);
}

#[tokio::test]
async fn outstanding_queues_only_list_documents_with_due() {
    let app = spawn_app().await;
    let prod = app.seed_basic_product("Widget", dec!(100)).await;
    let recorded_by = Uuid::new_v4();

    let settled = app
        .services
        .orders
        .create_order(CreateOrderRequest {
            customer_id: None,
            date: None,
            items: vec![line(prod.id, dec!(1), 1000)],
            paid_amount: 1000,
            note: None,
            recorded_by,
        })
        .await
        .unwrap();
    let open = app
        .services
        .orders
        .create_order(CreateOrderRequest {
            customer_id: None,
            date: None,
            items: vec![line(prod.id, dec!(1), 1000)],
            paid_amount: 400,
            note: None,
            recorded_by,
        })
        .await
        .unwrap();

    let queue = app.services.reports.outstanding_orders(1, 10).await.unwrap();
    assert_eq!(queue.total, 1);
    assert_eq!(queue.orders[0].id, open.order.id);
    assert_ne!(queue.orders[0].id, settled.order.id);

    let payable = app
        .services
        .reports
        .outstanding_purchases(1, 10)
        .await
        .unwrap();
    assert_eq!(payable.total, 0);
}
