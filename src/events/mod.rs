//! In-process event channel.
//!
//! Services emit events after their transaction commits; delivery is
//! best-effort and never affects the outcome of the originating request.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Events emitted by the document and payment services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    OrderCreated(Uuid),
    PurchaseCreated(Uuid),
    PaymentRecorded {
        payment_id: Uuid,
        payable_type: String,
        payable_id: Uuid,
        amount: i64,
    },
    /// A sale consumed the last units of a product.
    StockDepleted {
        product_id: Uuid,
        remaining: Decimal,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Consumes events off the channel. Spawned once at startup; today this only
/// logs, which keeps a single place to attach downstream consumers.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::OrderCreated(id) => info!(order_id = %id, "event: order created"),
            Event::PurchaseCreated(id) => info!(purchase_id = %id, "event: purchase created"),
            Event::PaymentRecorded {
                payment_id,
                payable_type,
                payable_id,
                amount,
            } => info!(
                payment_id = %payment_id,
                payable_type = %payable_type,
                payable_id = %payable_id,
                amount = amount,
                "event: payment recorded"
            ),
            Event::StockDepleted {
                product_id,
                remaining,
            } => warn!(product_id = %product_id, remaining = %remaining, "event: stock depleted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_event() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);
        sender
            .send(Event::OrderCreated(Uuid::new_v4()))
            .await
            .expect("send should succeed");
        assert!(matches!(rx.recv().await, Some(Event::OrderCreated(_))));
    }

    #[tokio::test]
    async fn send_fails_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        assert!(sender
            .send(Event::PurchaseCreated(Uuid::new_v4()))
            .await
            .is_err());
    }
}
