use crate::services::payhere::{PaymentStatus, VerifiedNotification};
use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap, DashSet};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

/// Latest known payment state for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaymentRecord {
    pub order_id: String,
    pub payment_id: String,
    pub status: PaymentStatus,
    pub status_code: String,
    pub amount: String,
    pub currency: String,
    pub method: String,
    pub updated_at: DateTime<Utc>,
}

impl PaymentRecord {
    fn from_notification(notification: &VerifiedNotification) -> Self {
        Self {
            order_id: notification.order_id.clone(),
            payment_id: notification.payment_id.clone(),
            status: notification.status,
            status_code: notification.status_code.clone(),
            amount: notification.amount.clone(),
            currency: notification.currency.clone(),
            method: notification.method.clone(),
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerOutcome {
    /// The notification changed the order's record.
    Applied(PaymentRecord),
    /// Same order and status code were already delivered.
    Duplicate,
    /// The order already reached a final status this one may not replace.
    Stale { current: PaymentStatus },
}

/// In-process store of verified payment notifications.
///
/// The gateway retries deliveries, so each `order_id + status_code` pair is
/// applied at most once. Nothing is evicted: both maps grow with the number
/// of orders seen by the process, a handful of delivery keys per order.
#[derive(Debug, Default)]
pub struct PaymentLedger {
    records: DashMap<String, PaymentRecord>,
    delivered: DashSet<String>,
}

impl PaymentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn delivery_key(notification: &VerifiedNotification) -> String {
        format!("{}:{}", notification.order_id, notification.status_code)
    }

    /// Once an order is final the only accepted change is a chargeback of a
    /// successful payment.
    fn accepts_transition(current: PaymentStatus, incoming: PaymentStatus) -> bool {
        !current.is_terminal()
            || (current == PaymentStatus::Success && incoming == PaymentStatus::ChargedBack)
    }

    pub fn apply(&self, notification: &VerifiedNotification) -> LedgerOutcome {
        let key = Self::delivery_key(notification);
        if !self.delivered.insert(key) {
            debug!(order_id = %notification.order_id, "duplicate notification delivery");
            return LedgerOutcome::Duplicate;
        }

        match self.records.entry(notification.order_id.clone()) {
            Entry::Occupied(mut existing) => {
                let current = existing.get().status;
                if !Self::accepts_transition(current, notification.status) {
                    return LedgerOutcome::Stale { current };
                }
                let record = PaymentRecord::from_notification(notification);
                existing.insert(record.clone());
                LedgerOutcome::Applied(record)
            }
            Entry::Vacant(slot) => {
                let record = PaymentRecord::from_notification(notification);
                slot.insert(record.clone());
                LedgerOutcome::Applied(record)
            }
        }
    }

    pub fn get(&self, order_id: &str) -> Option<PaymentRecord> {
        self.records.get(order_id).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
