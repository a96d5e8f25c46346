use serde::Deserialize;
use std::env;

/// Application settings for the `order-processing` binary.
///
/// Every key has a default, so every configuration file is optional.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub input: InputConfig,
    pub store: StoreConfig,
    pub notifier: NotifierConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives; `RUST_LOG` wins when set.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,order_processing=debug".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InputConfig {
    pub orders_path: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            orders_path: "data/orders.json".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StoreConfig {
    pub start_connected: bool,
    pub refuse_connections: bool,
    /// Saves for these order ids fail with a write error.
    pub failing_order_ids: Vec<i64>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            start_connected: true,
            refuse_connections: false,
            failing_order_ids: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NotifierConfig {
    pub sender: String,
    pub blocked_domains: Vec<String>,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            sender: "orders@localhost".to_string(),
            blocked_domains: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            // Per-environment overrides, e.g. config/test.toml
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `ORDERS__STORE__START_CONNECTED=false`
            .add_source(
                config::Environment::with_prefix("ORDERS")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("store.failing_order_ids")
                    .with_list_parse_key("notifier.blocked_domains"),
            )
            .build()?
            .try_deserialize()
    }

    pub fn from_toml(text: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
