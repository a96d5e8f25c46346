use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::config::StoreConfig;
use crate::domain::order::{Order, OrderStore, StoreError};

// ============================================================================
// In-Memory Order Store
// ============================================================================
//
// Process-local stand-in for a real backend. Keeps a JSON snapshot of each
// saved order so reads never alias the caller's record.
//
// Failure injection:
// - `refuse_connections`: connect() fails
// - `failing_order_ids`: save() fails for those ids
//
// ============================================================================

#[derive(Debug, Clone)]
pub struct StoredOrder {
    pub snapshot: String,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    connected: AtomicBool,
    refuse_connections: bool,
    failing_order_ids: HashSet<i64>,
    orders: Mutex<HashMap<i64, StoredOrder>>,
    connect_attempts: AtomicUsize,
    save_attempts: AtomicUsize,
}

impl InMemoryOrderStore {
    /// A disconnected store that accepts connections and writes.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connected() -> Self {
        Self {
            connected: AtomicBool::new(true),
            ..Self::default()
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            connected: AtomicBool::new(config.start_connected),
            refuse_connections: config.refuse_connections,
            failing_order_ids: config.failing_order_ids.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn refusing_connections(mut self) -> Self {
        self.refuse_connections = true;
        self
    }

    pub fn with_failing_order(mut self, id: i64) -> Self {
        self.failing_order_ids.insert(id);
        self
    }

    pub fn len(&self) -> usize {
        self.orders().len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders().is_empty()
    }

    pub fn connect_attempts(&self) -> usize {
        self.connect_attempts.load(Ordering::SeqCst)
    }

    pub fn save_attempts(&self) -> usize {
        self.save_attempts.load(Ordering::SeqCst)
    }

    pub fn stored(&self, id: i64) -> Option<StoredOrder> {
        self.orders().get(&id).cloned()
    }

    // A panic mid-insert cannot leave the map half-written.
    fn orders(&self) -> MutexGuard<'_, HashMap<i64, StoredOrder>> {
        self.orders.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl OrderStore for InMemoryOrderStore {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn connect(&self) -> Result<(), StoreError> {
        self.connect_attempts.fetch_add(1, Ordering::SeqCst);

        if self.refuse_connections {
            tracing::warn!("In-memory store refused connection");
            return Err(StoreError::Connection("connection refused".to_string()));
        }

        self.connected.store(true, Ordering::SeqCst);
        tracing::debug!("In-memory store connected");
        Ok(())
    }

    fn save(&self, order: &Order) -> Result<(), StoreError> {
        self.save_attempts.fetch_add(1, Ordering::SeqCst);

        if !self.is_connected() {
            return Err(StoreError::NotConnected);
        }
        if self.failing_order_ids.contains(&order.id) {
            return Err(StoreError::Write {
                id: order.id,
                reason: "write rejected by store".to_string(),
            });
        }

        let stored = StoredOrder {
            snapshot: serde_json::to_string(order)?,
            saved_at: Utc::now(),
        };
        self.orders().insert(order.id, stored);

        tracing::debug!(order_id = order.id, "Order saved");
        Ok(())
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Order>, StoreError> {
        match self.stored(id) {
            Some(stored) => Ok(Some(serde_json::from_str(&stored.snapshot)?)),
            None => Ok(None),
        }
    }
}
