/// Notification Broadcaster
///
/// Fan-out of payment events to every connected dashboard. The channel is a
/// bounded `tokio::sync::broadcast`: each WebSocket connection holds its own
/// receiver, and a receiver that falls more than `capacity` events behind
/// skips the ones it missed.
///
/// Nothing here is persisted. A payment notice changes no stored record,
/// including the membership's `payment_status`.
///
/// # Wire format
///
/// Events serialize as `{"event": <name>, "data": <payload>}`:
///
/// ```json
/// {"event": "update_dashboard", "data": {"tenant": "t@x.com", "amount": 500, "message": "t@x.com paid $500"}}
/// ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::error::{ServiceError, ServiceResult};

/// Default number of events buffered per subscriber
pub const DEFAULT_BROADCAST_CAPACITY: usize = 100;

/// Payment announcement sent after `/pay`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentNotice {
    pub tenant: String,
    /// Amount exactly as submitted (number or string)
    pub amount: Value,
    pub message: String,
}

impl PaymentNotice {
    fn new(tenant: &str, amount: Value) -> Self {
        let shown = match &amount {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        Self {
            tenant: tenant.to_string(),
            message: format!("{} paid ${}", tenant, shown),
            amount,
        }
    }
}

/// Server-to-dashboard event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum DashboardEvent {
    /// A tenant submitted a payment through `/pay`
    UpdateDashboard(PaymentNotice),

    /// A client-emitted `rent_payment`, relayed verbatim
    PaymentUpdate(Value),
}

/// Broadcast hub shared by the payment endpoint and WebSocket connections
#[derive(Debug, Clone)]
pub struct PaymentBroadcaster {
    sender: broadcast::Sender<DashboardEvent>,
}

impl Default for PaymentBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_BROADCAST_CAPACITY)
    }
}

impl PaymentBroadcaster {
    /// Creates a hub buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.sender.subscribe()
    }

    /// Number of connected dashboards
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Validates a payment and announces it to every dashboard
    ///
    /// An empty email, or an amount that is missing, zero or an empty string,
    /// is a `Validation` error. Booleans, arrays and objects are rejected too.
    pub async fn submit_payment(&self, tenant_email: &str, amount: &Value) -> ServiceResult<PaymentNotice> {
        let tenant_email = tenant_email.trim();
        if tenant_email.is_empty() || is_blank_amount(amount) {
            return Err(ServiceError::Validation("Missing payment info".to_string()));
        }

        if !matches!(amount, Value::Number(_) | Value::String(_)) {
            return Err(ServiceError::Validation(
                "Amount must be a number or a string".to_string(),
            ));
        }

        let notice = PaymentNotice::new(tenant_email, amount.clone());
        let delivered = self.publish(DashboardEvent::UpdateDashboard(notice.clone()));
        info!(tenant = %notice.tenant, amount = %notice.amount, delivered, "Payment broadcast");

        Ok(notice)
    }

    /// Re-broadcasts a client `rent_payment` payload as `payment_update`
    pub fn relay(&self, data: Value) -> usize {
        let delivered = self.publish(DashboardEvent::PaymentUpdate(data));
        debug!(delivered, "Relayed rent payment");
        delivered
    }

    fn publish(&self, event: DashboardEvent) -> usize {
        // Err only means nobody is listening
        self.sender.send(event).unwrap_or(0)
    }
}

fn is_blank_amount(amount: &Value) -> bool {
    match amount {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}
