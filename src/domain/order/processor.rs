use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use crate::metrics::Metrics;

use super::errors::OrderError;
use super::ports::{Notifier, OrderStore, StoreError};
use super::value_objects::{Money, Order};

// ============================================================================
// Order Processor
// ============================================================================
//
// Orchestrates: amount gate → store connectivity → save → notify → mark
//
// Persistence is the operation of record. Any store failure yields `false`;
// notification is best-effort and never changes the result.
//
// ============================================================================

/// Orders strictly above this amount get a confirmation email.
pub const NOTIFICATION_THRESHOLD: Money = Money::from_units(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Processed,
    RejectedAmount,
    StoreFailure,
}

impl Outcome {
    fn label(self) -> &'static str {
        match self {
            Outcome::Processed => "processed",
            Outcome::RejectedAmount => "rejected_amount",
            Outcome::StoreFailure => "store_failure",
        }
    }
}

/// Stateless between calls: each run depends only on the order passed in
/// and on what the collaborators report.
pub struct OrderProcessor<S, N> {
    store: S,
    notifier: N,
    metrics: Option<Arc<Metrics>>,
}

impl<S: OrderStore, N: Notifier> OrderProcessor<S, N> {
    pub fn new(store: S, notifier: N) -> Self {
        Self {
            store,
            notifier,
            metrics: None,
        }
    }

    /// Build from collaborators resolved at runtime.
    pub fn try_new(store: Option<S>, notifier: Option<N>) -> Result<Self, OrderError> {
        let store = store.ok_or(OrderError::InvalidArgument { name: "store" })?;
        let notifier = notifier.ok_or(OrderError::InvalidArgument { name: "notifier" })?;
        Ok(Self::new(store, notifier))
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Process an order that may be absent.
    ///
    /// Returns `Err(InvalidArgument)` only when `order` is `None`. Otherwise
    /// `Ok(false)` means either a non-positive amount or a store failure;
    /// the two are deliberately indistinguishable.
    pub fn process_order(&self, order: Option<&mut Order>) -> Result<bool, OrderError> {
        let order = order.ok_or(OrderError::InvalidArgument { name: "order" })?;
        Ok(self.process(order))
    }

    pub fn process(&self, order: &mut Order) -> bool {
        let span = tracing::info_span!(
            "process_order",
            order_id = order.id,
            correlation_id = %Uuid::new_v4()
        );
        let _entered = span.enter();
        let started = Instant::now();

        let outcome = self.run(order);

        if let Some(metrics) = &self.metrics {
            metrics.record_order_outcome(outcome.label(), started.elapsed().as_secs_f64());
        }

        outcome == Outcome::Processed
    }

    fn run(&self, order: &mut Order) -> Outcome {
        if !order.total_amount.is_positive() {
            tracing::info!(
                amount = %order.total_amount,
                "Order rejected: amount must be greater than zero"
            );
            return Outcome::RejectedAmount;
        }

        if let Err(error) = self.ensure_connected().and_then(|()| self.store.save(order)) {
            tracing::error!(error = %error, "Database failure while saving order");
            return Outcome::StoreFailure;
        }

        self.send_confirmation_if_needed(order);
        order.is_processed = true;

        tracing::info!(amount = %order.total_amount, "Order processed");
        Outcome::Processed
    }

    /// Connect once if the store reports it is offline. Not re-checked.
    fn ensure_connected(&self) -> Result<(), StoreError> {
        if self.store.is_connected() {
            return Ok(());
        }

        tracing::debug!("Store offline, connecting");
        self.store.connect()
    }

    fn send_confirmation_if_needed(&self, order: &Order) {
        if order.total_amount <= NOTIFICATION_THRESHOLD {
            self.record_notification("skipped");
            return;
        }

        match self
            .notifier
            .send_order_confirmation(&order.customer_email, order.id)
        {
            Ok(()) => {
                tracing::debug!(recipient = %order.customer_email, "Confirmation sent");
                self.record_notification("sent");
            }
            Err(error) => {
                tracing::warn!(
                    recipient = %order.customer_email,
                    error = %error,
                    "Confirmation failed, continuing"
                );
                self.record_notification("failed");
            }
        }
    }

    fn record_notification(&self, result: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.record_notification(result);
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::ports::{MockNotifier, MockOrderStore, NotifyError};
    use mockall::Sequence;

    fn connected_store() -> MockOrderStore {
        let mut store = MockOrderStore::new();
        store.expect_is_connected().return_const(true);
        store
    }

    fn order(id: i64, email: &str, units: i64) -> Order {
        Order::new(id, email, Money::from_units(units))
    }

    #[test]
    fn test_absent_order_is_invalid_argument() {
        let processor = OrderProcessor::new(MockOrderStore::new(), MockNotifier::new());

        let result = processor.process_order(None);

        assert_eq!(result, Err(OrderError::InvalidArgument { name: "order" }));
    }

    #[test]
    fn test_try_new_requires_store() {
        let result = OrderProcessor::try_new(None::<MockOrderStore>, Some(MockNotifier::new()));
        assert!(matches!(result, Err(OrderError::InvalidArgument { name: "store" })));
    }

    #[test]
    fn test_try_new_requires_notifier() {
        let result = OrderProcessor::try_new(Some(MockOrderStore::new()), None::<MockNotifier>);
        assert!(matches!(result, Err(OrderError::InvalidArgument { name: "notifier" })));
    }

    #[test]
    fn test_try_new_reports_store_before_notifier() {
        let result = OrderProcessor::<MockOrderStore, MockNotifier>::try_new(None, None);
        assert!(matches!(result, Err(OrderError::InvalidArgument { name: "store" })));
    }

    #[test]
    fn test_zero_amount_returns_false_without_interaction() {
        let processor = OrderProcessor::new(MockOrderStore::new(), MockNotifier::new());
        let mut order = order(0, "", 0);

        assert_eq!(processor.process_order(Some(&mut order)), Ok(false));
        assert!(!order.is_processed);
    }

    #[test]
    fn test_negative_amount_returns_false_without_interaction() {
        let processor = OrderProcessor::new(MockOrderStore::new(), MockNotifier::new());
        let mut order = order(0, "", -50);

        assert!(!processor.process(&mut order));
        assert!(!order.is_processed);
    }

    #[test]
    fn test_order_over_threshold_is_saved_and_confirmed() {
        let mut order = order(1, "test@mail.com", 150);
        let expected = order.clone();

        let mut store = connected_store();
        store.expect_connect().never();
        store
            .expect_save()
            .withf(move |saved: &Order| *saved == expected)
            .times(1)
            .returning(|_| Ok(()));

        let mut notifier = MockNotifier::new();
        notifier
            .expect_send_order_confirmation()
            .withf(|email: &str, id: &i64| email == "test@mail.com" && *id == 1)
            .times(1)
            .returning(|_, _| Ok(()));

        let processor = OrderProcessor::new(store, notifier);

        assert!(processor.process(&mut order));
        assert!(order.is_processed);
    }

    #[test]
    fn test_order_exactly_at_threshold_is_not_confirmed() {
        let mut store = connected_store();
        store.expect_save().times(1).returning(|_| Ok(()));
        let mut notifier = MockNotifier::new();
        notifier.expect_send_order_confirmation().never();

        let processor = OrderProcessor::new(store, notifier);
        let mut order = order(2, "customer@mail.com", 100);

        assert!(processor.process(&mut order));
        assert!(order.is_processed);
    }

    #[test]
    fn test_order_one_cent_over_threshold_is_confirmed() {
        let mut store = connected_store();
        store.expect_save().times(1).returning(|_| Ok(()));
        let mut notifier = MockNotifier::new();
        notifier
            .expect_send_order_confirmation()
            .times(1)
            .returning(|_, _| Ok(()));

        let processor = OrderProcessor::new(store, notifier);
        let mut order = Order::new(3, "customer@mail.com", Money::from_cents(10_001));

        assert!(processor.process(&mut order));
    }

    #[test]
    fn test_order_under_threshold_is_not_confirmed() {
        let mut store = connected_store();
        store.expect_save().times(1).returning(|_| Ok(()));
        let mut notifier = MockNotifier::new();
        notifier.expect_send_order_confirmation().never();

        let processor = OrderProcessor::new(store, notifier);
        let mut order = order(3, "customer@mail.com", 99);

        assert!(processor.process(&mut order));
        assert!(order.is_processed);
    }

    #[test]
    fn test_disconnected_store_connects_once_before_save() {
        let mut seq = Sequence::new();
        let mut store = MockOrderStore::new();
        store
            .expect_is_connected()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(false);
        store
            .expect_connect()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));
        store
            .expect_save()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let processor = OrderProcessor::new(store, MockNotifier::new());
        let mut order = order(0, "", 50);

        assert!(processor.process(&mut order));
        assert!(order.is_processed);
    }

    #[test]
    fn test_connected_store_is_not_reconnected() {
        let mut store = connected_store();
        store.expect_connect().never();
        store.expect_save().times(1).returning(|_| Ok(()));

        let processor = OrderProcessor::new(store, MockNotifier::new());
        let mut order = order(0, "", 50);

        assert!(processor.process(&mut order));
    }

    #[test]
    fn test_save_failure_returns_false_and_skips_notification() {
        let mut store = connected_store();
        store.expect_save().times(1).returning(|order: &Order| {
            Err(StoreError::Write {
                id: order.id,
                reason: "disk full".to_string(),
            })
        });
        let mut notifier = MockNotifier::new();
        notifier.expect_send_order_confirmation().never();

        let processor = OrderProcessor::new(store, notifier);
        let mut order = order(0, "", 200);

        assert_eq!(processor.process_order(Some(&mut order)), Ok(false));
        assert!(!order.is_processed);
    }

    #[test]
    fn test_connect_failure_returns_false_without_save() {
        let mut store = MockOrderStore::new();
        store.expect_is_connected().return_const(false);
        store
            .expect_connect()
            .times(1)
            .returning(|| Err(StoreError::Connection("refused".to_string())));
        store.expect_save().never();
        let mut notifier = MockNotifier::new();
        notifier.expect_send_order_confirmation().never();

        let processor = OrderProcessor::new(store, notifier);
        let mut order = order(5, "x@mail.com", 500);

        assert!(!processor.process(&mut order));
        assert!(!order.is_processed);
    }

    #[test]
    fn test_notification_failure_still_marks_processed() {
        let mut store = connected_store();
        store.expect_save().times(1).returning(|_| Ok(()));
        let mut notifier = MockNotifier::new();
        notifier
            .expect_send_order_confirmation()
            .withf(|email: &str, id: &i64| email == "test@mail.com" && *id == 4)
            .times(1)
            .returning(|email, _| {
                Err(NotifyError::Rejected {
                    recipient: email.to_string(),
                    reason: "mailbox unavailable".to_string(),
                })
            });

        let processor = OrderProcessor::new(store, notifier);
        let mut order = order(4, "test@mail.com", 150);

        assert_eq!(processor.process_order(Some(&mut order)), Ok(true));
        assert!(order.is_processed);
    }

    #[test]
    fn test_metrics_record_outcomes() {
        let metrics = Arc::new(Metrics::new().unwrap());

        let mut store = connected_store();
        store.expect_save().returning(|order: &Order| {
            if order.id == 9 {
                Err(StoreError::NotConnected)
            } else {
                Ok(())
            }
        });
        let mut notifier = MockNotifier::new();
        notifier
            .expect_send_order_confirmation()
            .returning(|email, _| Err(NotifyError::InvalidRecipient(email.to_string())));

        let processor = OrderProcessor::new(store, notifier).with_metrics(metrics.clone());

        processor.process(&mut order(1, "a@mail.com", 150));
        processor.process(&mut order(2, "b@mail.com", 20));
        processor.process(&mut order(3, "c@mail.com", -1));
        processor.process(&mut order(9, "d@mail.com", 300));

        assert_eq!(metrics.orders_processed_count("processed"), 2);
        assert_eq!(metrics.orders_processed_count("rejected_amount"), 1);
        assert_eq!(metrics.orders_processed_count("store_failure"), 1);
        assert_eq!(metrics.notification_count("failed"), 1);
        assert_eq!(metrics.notification_count("skipped"), 1);
        assert_eq!(metrics.notification_count("sent"), 0);
    }

    #[test]
    fn test_processor_over_shared_collaborators() {
        let mut store = connected_store();
        store.expect_save().times(2).returning(|_| Ok(()));
        let store = Arc::new(store);

        let processor = OrderProcessor::new(Arc::clone(&store), Arc::new(MockNotifier::new()));

        assert!(processor.process(&mut order(1, "a@mail.com", 10)));
        assert!(processor.process(&mut order(2, "b@mail.com", 10)));
        assert!(Arc::ptr_eq(processor.store(), &store));
    }
}
