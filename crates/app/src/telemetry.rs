//! Tracing and metrics setup for the binary.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

use crate::config::{Config, LogFormat};

/// Installs the global tracing subscriber.
///
/// An unparsable `RUST_LOG` directive falls back to `info`.
pub fn init_tracing(config: &Config) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    }
}

/// Installs the global Prometheus recorder and describes the shop's metrics.
pub fn install_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    metrics::describe_counter!(
        "event_log_events_published_total",
        "Events appended to the log, by topic"
    );
    metrics::describe_counter!(
        "event_log_handler_failures_total",
        "Subscriber failures that aborted a dispatch"
    );
    metrics::describe_counter!(
        "repository_replays_total",
        "Aggregates rebuilt from their history"
    );
    metrics::describe_counter!("kitchen_orders_received_total", "Paid orders sent to the kitchen");
    metrics::describe_counter!("kitchen_orders_assembled_total", "Kitchen orders fully assembled");
    metrics::describe_counter!("delivery_orders_created_total", "Orders handed to delivery");
    metrics::describe_histogram!(
        "shop_order_duration_seconds",
        "Time to drive one order from payment to delivery"
    );

    Ok(handle)
}
