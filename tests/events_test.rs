mod common;

use std::sync::Arc;

use rust_decimal_macros::dec;
use tokio::sync::mpsc;
use uuid::Uuid;

use common::spawn_app;
use tradebook_api::{
    events::{Event, EventSender},
    services::orders::{CreateOrderRequest, LineItemInput, OrderService},
};

#[tokio::test]
async fn selling_out_emits_a_stock_depleted_event() {
    let app = spawn_app().await;
    let prod = app.seed_basic_product("Widget", dec!(3)).await;

    let (tx, mut rx) = mpsc::channel(8);
    let orders = OrderService::new(app.db.clone(), Some(Arc::new(EventSender::new(tx))));

    let details = orders
        .create_order(CreateOrderRequest {
            customer_id: None,
            date: None,
            items: vec![LineItemInput {
                product_id: prod.id,
                quantity: dec!(3),
                unit_price: 1000,
                currency_id: None,
            }],
            paid_amount: 0,
            note: None,
            recorded_by: Uuid::new_v4(),
        })
        .await
        .unwrap();

    match rx.recv().await {
        Some(Event::OrderCreated(id)) => assert_eq!(id, details.order.id),
        other => panic!("expected order created event, got {:?}", other),
    }
    match rx.recv().await {
        Some(Event::StockDepleted {
            product_id,
            remaining,
        }) => {
            assert_eq!(product_id, prod.id);
            assert_eq!(remaining, dec!(0));
        }
        other => panic!("expected stock depleted event, got {:?}", other),
    }
}
