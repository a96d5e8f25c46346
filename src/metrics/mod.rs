use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};

// ============================================================================
// Metrics Module - Prometheus metrics for order processing
// ============================================================================
//
// Provides metrics for:
// - Processing outcomes (processed, rejected amount, store failure)
// - Confirmation notifications (sent, failed, skipped)
// - Processing latency
//
// Recording is side-channel only and never feeds back into the workflow.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub orders_processed: IntCounterVec,
    pub notifications: IntCounterVec,
    pub processing_duration: Histogram,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let orders_processed = IntCounterVec::new(
            Opts::new("orders_processed_total", "Orders handled by the processor, by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(orders_processed.clone()))?;

        let notifications = IntCounterVec::new(
            Opts::new("order_notifications_total", "Order confirmation notifications, by result"),
            &["result"],
        )?;
        registry.register(Box::new(notifications.clone()))?;

        let processing_duration = Histogram::with_opts(
            HistogramOpts::new("order_processing_duration_seconds", "Order processing duration")
                .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        )?;
        registry.register(Box::new(processing_duration.clone()))?;

        Ok(Self {
            registry,
            orders_processed,
            notifications,
            processing_duration,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_order_outcome(&self, outcome: &str, duration_secs: f64) {
        self.orders_processed.with_label_values(&[outcome]).inc();
        self.processing_duration.observe(duration_secs);
    }

    pub fn record_notification(&self, result: &str) {
        self.notifications.with_label_values(&[result]).inc();
    }

    pub fn orders_processed_count(&self, outcome: &str) -> u64 {
        self.orders_processed.with_label_values(&[outcome]).get()
    }

    pub fn notification_count(&self, result: &str) -> u64 {
        self.notifications.with_label_values(&[result]).get()
    }

    /// Prometheus text exposition of every registered metric.
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
