use std::fs;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use order_processing::config::AppConfig;
use order_processing::messaging::EmailNotifier;
use order_processing::metrics::Metrics;
use order_processing::store::InMemoryOrderStore;
use order_processing::{Order, OrderProcessor, OrderStore};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;

    // RUST_LOG overrides the configured filter
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .init();

    tracing::info!("🚀 Starting order processing run");

    // === 1. Load orders ===
    let path = &config.input.orders_path;
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read orders from {}", path))?;
    let mut orders: Vec<Order> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse orders in {}", path))?;
    tracing::info!(count = orders.len(), path = %path, "Loaded orders");

    // === 2. Wire collaborators ===
    let store = Arc::new(InMemoryOrderStore::from_config(&config.store));
    let notifier = Arc::new(EmailNotifier::from_config(&config.notifier));
    let metrics = Arc::new(Metrics::new()?);

    let processor = OrderProcessor::new(Arc::clone(&store), Arc::clone(&notifier))
        .with_metrics(Arc::clone(&metrics));

    // === 3. Process ===
    let mut processed = 0usize;
    let mut rejected = 0usize;

    for order in orders.iter_mut() {
        if processor.process(order) {
            processed += 1;
        } else {
            rejected += 1;
            tracing::warn!(
                order_id = order.id,
                amount = %order.total_amount,
                "Order not processed"
            );
        }
    }

    // === 4. Read back what was persisted ===
    for order in orders.iter().filter(|o| o.is_processed) {
        match store.get_by_id(order.id) {
            Ok(Some(stored)) => tracing::debug!(
                order_id = stored.id,
                amount = %stored.total_amount,
                "Persisted order verified"
            ),
            Ok(None) => tracing::warn!(order_id = order.id, "Processed order missing from store"),
            Err(e) => tracing::warn!(order_id = order.id, error = %e, "Failed to read back order"),
        }
    }

    tracing::info!(
        processed,
        rejected,
        stored = store.len(),
        notifications = notifier.sent().len(),
        "✅ Run complete"
    );

    if config.metrics.enabled {
        println!("{}", metrics.render()?);
    }

    Ok(())
}
