use std::sync::Arc;

use super::value_objects::Order;

// ============================================================================
// Collaborator Ports
// ============================================================================
//
// The processor only talks to persistence and notification through these
// traits. Concrete adapters live in `crate::store` and `crate::messaging`.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store is not connected")]
    NotConnected,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Failed to write order {id}: {reason}")]
    Write { id: i64, reason: String },

    #[error("Order snapshot encoding failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Invalid recipient address: {0}")]
    InvalidRecipient(String),

    #[error("Delivery to {recipient} rejected: {reason}")]
    Rejected { recipient: String, reason: String },
}

/// Order persistence backend.
#[mockall::automock]
pub trait OrderStore {
    /// Side-effect-free connectivity query.
    fn is_connected(&self) -> bool;

    fn connect(&self) -> Result<(), StoreError>;

    fn save(&self, order: &Order) -> Result<(), StoreError>;

    fn get_by_id(&self, id: i64) -> Result<Option<Order>, StoreError>;
}

/// Outbound customer notification.
#[mockall::automock]
pub trait Notifier {
    fn send_order_confirmation(&self, customer_email: &str, order_id: i64) -> Result<(), NotifyError>;
}

impl<T: OrderStore + ?Sized> OrderStore for Arc<T> {
    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn connect(&self) -> Result<(), StoreError> {
        (**self).connect()
    }

    fn save(&self, order: &Order) -> Result<(), StoreError> {
        (**self).save(order)
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Order>, StoreError> {
        (**self).get_by_id(id)
    }
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn send_order_confirmation(&self, customer_email: &str, order_id: i64) -> Result<(), NotifyError> {
        (**self).send_order_confirmation(customer_email, order_id)
    }
}
