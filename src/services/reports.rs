use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, PaginatorTrait};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::enums::{MovementDirection, PayableKind},
    entities::{customer, order, payment, product, purchase, supplier},
    errors::ServiceError,
    services::{orders, purchases},
};

/// Per-customer accounts-receivable line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerBalance {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub total_sold: i64,
    pub total_received: i64,
    pub balance_due: i64,
}

/// Per-supplier accounts-payable line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierBalance {
    pub supplier_id: Uuid,
    pub supplier_name: String,
    pub total_bought: i64,
    pub total_paid: i64,
    pub balance_payable: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub total_sold: i64,
    pub total_bought: i64,
    pub ar_due: i64,
    pub ap_due: i64,
    pub cash_in: i64,
    pub cash_out: i64,
    /// Current snapshot of `Σ quantity × default_buy_price`; never
    /// date-filtered.
    pub inventory_value: i64,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

/// Read-only aggregations over documents, payments and stock. No state is
/// mutated on this path.
#[derive(Clone)]
pub struct ReportService {
    db_pool: Arc<DbPool>,
}

impl ReportService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Per-customer AR balances over an optional document-date range.
    /// Customers with no orders in range still appear with zero sums
    /// (left-join semantics), ordered by balance due, highest first.
    #[instrument(skip(self))]
    pub async fn customer_balances(
        &self,
        range: DateRange,
    ) -> Result<Vec<CustomerBalance>, ServiceError> {
        let db = &*self.db_pool;

        let customers = customer::Entity::find()
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let mut query = order::Entity::find();
        if let Some(from) = range.from {
            query = query.filter(order::Column::Date.gte(from));
        }
        if let Some(to) = range.to {
            query = query.filter(order::Column::Date.lte(to));
        }
        let orders = query.all(db).await.map_err(ServiceError::DatabaseError)?;

        let received_by_order =
            self.paid_sums_for(PayableKind::Order, orders.iter().map(|o| o.id).collect())
                .await?;

        let mut sold_by_customer: HashMap<Uuid, i64> = HashMap::new();
        let mut received_by_customer: HashMap<Uuid, i64> = HashMap::new();
        for order_row in &orders {
            let Some(customer_id) = order_row.customer_id else {
                continue;
            };
            *sold_by_customer.entry(customer_id).or_default() += order_row.total;
            *received_by_customer.entry(customer_id).or_default() += received_by_order
                .get(&order_row.id)
                .copied()
                .unwrap_or_default();
        }

        let mut rows: Vec<CustomerBalance> = customers
            .into_iter()
            .map(|c| {
                let total_sold = sold_by_customer.get(&c.id).copied().unwrap_or_default();
                let total_received = received_by_customer
                    .get(&c.id)
                    .copied()
                    .unwrap_or_default();
                CustomerBalance {
                    customer_id: c.id,
                    customer_name: c.name,
                    total_sold,
                    total_received,
                    balance_due: total_sold - total_received,
                }
            })
            .collect();
        rows.sort_by(|a, b| b.balance_due.cmp(&a.balance_due));
        Ok(rows)
    }

    /// Customers who still owe, strictly positive balances only.
    #[instrument(skip(self))]
    pub async fn owing_customers(
        &self,
        range: DateRange,
    ) -> Result<Vec<CustomerBalance>, ServiceError> {
        let rows = self.customer_balances(range).await?;
        Ok(rows.into_iter().filter(|r| r.balance_due > 0).collect())
    }

    /// Per-supplier AP balances; mirror of [`customer_balances`].
    #[instrument(skip(self))]
    pub async fn supplier_balances(
        &self,
        range: DateRange,
    ) -> Result<Vec<SupplierBalance>, ServiceError> {
        let db = &*self.db_pool;

        let suppliers = supplier::Entity::find()
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let mut query = purchase::Entity::find();
        if let Some(from) = range.from {
            query = query.filter(purchase::Column::Date.gte(from));
        }
        if let Some(to) = range.to {
            query = query.filter(purchase::Column::Date.lte(to));
        }
        let purchases = query.all(db).await.map_err(ServiceError::DatabaseError)?;

        let paid_by_purchase = self
            .paid_sums_for(
                PayableKind::Purchase,
                purchases.iter().map(|p| p.id).collect(),
            )
            .await?;

        let mut bought_by_supplier: HashMap<Uuid, i64> = HashMap::new();
        let mut paid_by_supplier: HashMap<Uuid, i64> = HashMap::new();
        for purchase_row in &purchases {
            let Some(supplier_id) = purchase_row.supplier_id else {
                continue;
            };
            *bought_by_supplier.entry(supplier_id).or_default() += purchase_row.total;
            *paid_by_supplier.entry(supplier_id).or_default() += paid_by_purchase
                .get(&purchase_row.id)
                .copied()
                .unwrap_or_default();
        }

        let mut rows: Vec<SupplierBalance> = suppliers
            .into_iter()
            .map(|s| {
                let total_bought = bought_by_supplier.get(&s.id).copied().unwrap_or_default();
                let total_paid = paid_by_supplier.get(&s.id).copied().unwrap_or_default();
                SupplierBalance {
                    supplier_id: s.id,
                    supplier_name: s.name,
                    total_bought,
                    total_paid,
                    balance_payable: total_bought - total_paid,
                }
            })
            .collect();
        rows.sort_by(|a, b| b.balance_payable.cmp(&a.balance_payable));
        Ok(rows)
    }

    /// Suppliers who are still owed, strictly positive balances only.
    #[instrument(skip(self))]
    pub async fn owed_suppliers(
        &self,
        range: DateRange,
    ) -> Result<Vec<SupplierBalance>, ServiceError> {
        let rows = self.supplier_balances(range).await?;
        Ok(rows.into_iter().filter(|r| r.balance_payable > 0).collect())
    }

    /// Aggregate dashboard figures. Document sums and outstanding AR/AP are
    /// filtered by document date, cash flow by payment date; inventory value
    /// is always the current snapshot.
    #[instrument(skip(self))]
    pub async fn dashboard_metrics(
        &self,
        range: DateRange,
    ) -> Result<DashboardMetrics, ServiceError> {
        let db = &*self.db_pool;

        let mut order_query = order::Entity::find();
        if let Some(from) = range.from {
            order_query = order_query.filter(order::Column::Date.gte(from));
        }
        if let Some(to) = range.to {
            order_query = order_query.filter(order::Column::Date.lte(to));
        }
        let orders = order_query
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let mut purchase_query = purchase::Entity::find();
        if let Some(from) = range.from {
            purchase_query = purchase_query.filter(purchase::Column::Date.gte(from));
        }
        if let Some(to) = range.to {
            purchase_query = purchase_query.filter(purchase::Column::Date.lte(to));
        }
        let purchases = purchase_query
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let total_sold = orders.iter().map(|o| o.total).sum();
        let total_bought = purchases.iter().map(|p| p.total).sum();
        // due_amount is max(0, total - paid), so summing it gives the
        // outstanding figure directly.
        let ar_due = orders.iter().map(|o| o.due_amount).sum();
        let ap_due = purchases.iter().map(|p| p.due_amount).sum();

        let payment_rows = payment::Entity::find()
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let mut cash_in = 0i64;
        let mut cash_out = 0i64;
        for payment_row in &payment_rows {
            if !range.contains(payment_row.paid_at.date_naive()) {
                continue;
            }
            match payment_row.direction.parse::<MovementDirection>() {
                Ok(MovementDirection::In) => cash_in += payment_row.amount,
                Ok(MovementDirection::Out) => cash_out += payment_row.amount,
                Err(_) => {
                    return Err(ServiceError::InternalError(format!(
                        "Payment {} carries unknown direction '{}'",
                        payment_row.id, payment_row.direction
                    )))
                }
            }
        }

        let products = product::Entity::find()
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let mut inventory_value = Decimal::ZERO;
        for product_row in &products {
            if let Some(buy_price) = product_row.default_buy_price {
                inventory_value += product_row.quantity * Decimal::from(buy_price);
            }
        }
        let inventory_value = {
            use rust_decimal::prelude::ToPrimitive;
            use rust_decimal::RoundingStrategy;
            inventory_value
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_i64()
                .ok_or_else(|| {
                    ServiceError::InternalError("Inventory value out of range".to_string())
                })?
        };

        Ok(DashboardMetrics {
            total_sold,
            total_bought,
            ar_due,
            ap_due,
            cash_in,
            cash_out,
            inventory_value,
            from: range.from,
            to: range.to,
        })
    }

    /// Orders that still carry a due amount, newest first.
    #[instrument(skip(self))]
    pub async fn outstanding_orders(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<orders::OrderListResponse, ServiceError> {
        let db = &*self.db_pool;
        let paginator = order::Entity::find()
            .filter(order::Column::DueAmount.gt(0))
            .order_by_desc(order::Column::CreatedAt)
            .paginate(db, per_page.max(1));

        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let rows = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;
        let orders = rows
            .into_iter()
            .map(orders::model_to_response)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(orders::OrderListResponse {
            orders,
            total,
            page,
            per_page,
        })
    }

    /// Purchases that still carry a due amount, newest first.
    #[instrument(skip(self))]
    pub async fn outstanding_purchases(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<purchases::PurchaseListResponse, ServiceError> {
        let db = &*self.db_pool;
        let paginator = purchase::Entity::find()
            .filter(purchase::Column::DueAmount.gt(0))
            .order_by_desc(purchase::Column::CreatedAt)
            .paginate(db, per_page.max(1));

        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let rows = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;
        let purchases = rows
            .into_iter()
            .map(purchases::model_to_response)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(purchases::PurchaseListResponse {
            purchases,
            total,
            page,
            per_page,
        })
    }

    /// Per-document payment sums, matching-direction only, for a set of
    /// document ids of one kind.
    async fn paid_sums_for(
        &self,
        kind: PayableKind,
        ids: Vec<Uuid>,
    ) -> Result<HashMap<Uuid, i64>, ServiceError> {
        let mut sums = HashMap::new();
        if ids.is_empty() {
            return Ok(sums);
        }
        let db = &*self.db_pool;
        let direction = kind.payment_direction();
        let rows = payment::Entity::find()
            .filter(payment::Column::PayableType.eq(kind.to_string()))
            .filter(payment::Column::Direction.eq(direction.to_string()))
            .filter(payment::Column::PayableId.is_in(ids))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        for row in rows {
            *sums.entry(row.payable_id).or_default() += row.amount;
        }
        Ok(sums)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_range_bounds_are_inclusive() {
        let range = DateRange {
            from: NaiveDate::from_ymd_opt(2025, 9, 1),
            to: NaiveDate::from_ymd_opt(2025, 9, 30),
        };
        assert!(range.contains(NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()));
        assert!(range.contains(NaiveDate::from_ymd_opt(2025, 9, 30).unwrap()));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2025, 8, 31).unwrap()));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()));
    }

    #[test]
    fn open_range_contains_everything() {
        let range = DateRange::default();
        assert!(range.contains(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()));
    }
}
