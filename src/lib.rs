//! Back-office bookkeeping API: products and stock, sale orders, purchases,
//! payments with cash/stock ledgers, and AR/AP reporting.

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    orders::OrderService, payments::PaymentService, purchases::PurchaseService,
    reports::ReportService,
};

/// All services, constructed once and shared through [`AppState`].
#[derive(Clone)]
pub struct AppServices {
    pub orders: OrderService,
    pub purchases: PurchaseService,
    pub payments: PaymentService,
    pub reports: ReportService,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            orders: OrderService::new(db.clone(), event_sender.clone()),
            purchases: PurchaseService::new(db.clone(), event_sender.clone()),
            payments: PaymentService::new(db.clone(), event_sender),
            reports: ReportService::new(db),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: Arc<AppConfig>,
    pub services: AppServices,
}

impl AppState {
    pub fn new(db: Arc<DbPool>, config: AppConfig, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            services: AppServices::new(db.clone(), event_sender),
            db,
            config: Arc::new(config),
        }
    }
}

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds the full application router.
pub fn app_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/orders",
            post(handlers::orders::create_order).get(handlers::orders::list_orders),
        )
        .route("/orders/:id", get(handlers::orders::get_order))
        .route(
            "/orders/:id/payments",
            post(handlers::payments::record_order_payment),
        )
        .route(
            "/purchases",
            post(handlers::purchases::create_purchase).get(handlers::purchases::list_purchases),
        )
        .route("/purchases/:id", get(handlers::purchases::get_purchase))
        .route(
            "/purchases/:id/payments",
            post(handlers::payments::record_purchase_payment),
        )
        .route(
            "/payments/receivable",
            get(handlers::payments::outstanding_orders),
        )
        .route(
            "/payments/payable",
            get(handlers::payments::outstanding_purchases),
        )
        .route("/reports/ar", get(handlers::reports::accounts_receivable))
        .route("/reports/ar/owing", get(handlers::reports::owing_customers))
        .route("/reports/ap", get(handlers::reports::accounts_payable))
        .route("/reports/ap/owing", get(handlers::reports::owed_suppliers))
        .route("/reports/dashboard", get(handlers::reports::dashboard));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
