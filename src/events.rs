use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::entities::loyalty_transaction::TransactionType;

/// Domain events published after a successful commit. Delivery is
/// best-effort: a full or closed channel never fails the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    CheckoutCompleted {
        tenant_id: i64,
        customer_id: i64,
        invoice_id: i64,
        booking_id: Option<i64>,
        total: Decimal,
    },
    LoyaltyLedgerRecorded {
        tenant_id: i64,
        customer_id: i64,
        transaction_type: TransactionType,
        points: i64,
    },
    MembershipActivated {
        tenant_id: i64,
        customer_id: i64,
        plan_id: i64,
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

    /// Sends an event, logging instead of erroring when nobody listens.
    pub async fn send(&self, event: Event) {
        if let Err(e) = self.sender.send(event).await {
            warn!(error = %e, "event channel closed, dropping event");
        }
    }
}

/// Create a channel pair plus a logging consumer task. The returned
/// receiver is consumed by the spawned task.
pub fn spawn_event_logger(buffer: usize) -> EventSender {
    let (tx, mut rx) = mpsc::channel(buffer);
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            info!(?event, "domain event");
        }
    });
    EventSender::new(tx)
}
