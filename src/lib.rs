pub mod config;
pub mod domain;
pub mod messaging;
pub mod metrics;
pub mod store;

pub use domain::order::{
    Money, Notifier, NotifyError, Order, OrderError, OrderProcessor, OrderStore, StoreError,
    NOTIFICATION_THRESHOLD,
};
