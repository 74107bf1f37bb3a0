//! Domain enums stored as strings in the database.
//!
//! Status, direction and polymorphic-kind columns are plain strings at the
//! persistence layer; these types give them a single parse/format point and
//! hold the derivation rules for a document's payment fields.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Payment status of an order or purchase document.
///
/// Derived, never hand-edited: always recomputed from the payment rows.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
}

impl PaymentStatus {
    /// Derives the status from a document total and its cumulative paid amount.
    ///
    /// `paid` of zero is always `Unpaid`; `Paid` additionally requires a
    /// positive total, so a zero-total document never reports as settled.
    pub fn derive(total: i64, paid: i64) -> Self {
        if paid == 0 {
            PaymentStatus::Unpaid
        } else if total > 0 && paid >= total {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Partial
        }
    }
}

/// Remaining due on a document given its total and cumulative paid amount.
pub fn due_amount(total: i64, paid: i64) -> i64 {
    (total - paid).max(0)
}

/// Direction of a cash or stock movement.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MovementDirection {
    In,
    Out,
}

/// Kind half of the polymorphic `(payable_type, payable_id)` pair on payments.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PayableKind {
    Order,
    Purchase,
}

impl PayableKind {
    /// Payment direction fixed by document type: sales collect cash,
    /// purchases pay it out.
    pub fn payment_direction(self) -> MovementDirection {
        match self {
            PayableKind::Order => MovementDirection::In,
            PayableKind::Purchase => MovementDirection::Out,
        }
    }
}

/// Kind half of the polymorphic `(source_type, source_id)` pair on stock
/// movements: the line item that caused the inventory change.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StockSourceKind {
    OrderItem,
    PurchaseItem,
}

/// Source kind of a cash movement. Only payments feed the cash ledger today.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CashSourceKind {
    Payment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_unpaid_when_nothing_paid() {
        assert_eq!(PaymentStatus::derive(5000, 0), PaymentStatus::Unpaid);
        assert_eq!(PaymentStatus::derive(0, 0), PaymentStatus::Unpaid);
    }

    #[test]
    fn status_partial_when_underpaid() {
        assert_eq!(PaymentStatus::derive(5000, 3000), PaymentStatus::Partial);
        assert_eq!(PaymentStatus::derive(5000, 4999), PaymentStatus::Partial);
    }

    #[test]
    fn status_paid_requires_positive_total() {
        assert_eq!(PaymentStatus::derive(5000, 5000), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::derive(5000, 6000), PaymentStatus::Paid);
        // A zero-total document can never be "paid".
        assert_eq!(PaymentStatus::derive(0, 100), PaymentStatus::Partial);
    }

    #[test]
    fn due_amount_never_negative() {
        assert_eq!(due_amount(5000, 3000), 2000);
        assert_eq!(due_amount(5000, 5000), 0);
        assert_eq!(due_amount(5000, 7000), 0);
    }

    #[test]
    fn enums_round_trip_through_strings() {
        assert_eq!(PaymentStatus::Partial.to_string(), "partial");
        assert_eq!("paid".parse::<PaymentStatus>().ok(), Some(PaymentStatus::Paid));
        assert_eq!(MovementDirection::Out.to_string(), "out");
        assert_eq!(PayableKind::Purchase.to_string(), "purchase");
        assert_eq!(StockSourceKind::OrderItem.to_string(), "order_item");
        assert_eq!(
            "purchase_item".parse::<StockSourceKind>().ok(),
            Some(StockSourceKind::PurchaseItem)
        );
    }

    #[test]
    fn payment_direction_is_fixed_by_document_type() {
        assert_eq!(
            PayableKind::Order.payment_direction(),
            MovementDirection::In
        );
        assert_eq!(
            PayableKind::Purchase.payment_direction(),
            MovementDirection::Out
        );
    }
}
