//! Metrics for observability.
//!
//! The runtime records through the [`metrics`] facade, so nothing is
//! collected unless a recorder is installed. [`install_recorder`] installs a
//! Prometheus recorder and returns a handle that renders the exposition text.
//!
//! Recorded metrics:
//! - `store.actions.total` / `store.actions.rejected`
//! - `store.reducer.duration_seconds`
//! - `store.effects.executed` (labelled by effect `type`)
//! - `persistence.writes.total` / `persistence.writes.failed` / `persistence.writes.superseded`
//! - `persistence.write.duration_seconds`
//!
//! # Example
//!
//! ```rust,no_run
//! use taskpad_runtime::metrics::install_recorder;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let handle = install_recorder()?;
//! println!("{}", handle.render());
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use thiserror::Error;

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Install the Prometheus recorder and describe all runtime metrics.
///
/// # Errors
///
/// Returns [`MetricsError::Install`] if a global recorder is already installed.
pub fn install_recorder() -> Result<PrometheusHandle, MetricsError> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            &[0.000_01, 0.000_1, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0],
        )
        .map_err(|e| MetricsError::Build(e.to_string()))?
        .install_recorder()
        .map_err(|e| MetricsError::Install(e.to_string()))?;

    register_metrics();
    tracing::info!("Prometheus metrics recorder installed");
    Ok(handle)
}

/// Describe every metric the runtime records.
///
/// Safe to call repeatedly; descriptions go to whichever recorder is current.
pub fn register_metrics() {
    describe_counter!("store.actions.total", "Actions reduced by a store");
    describe_counter!(
        "store.actions.rejected",
        "Actions rejected because the store was shutting down"
    );
    describe_histogram!(
        "store.reducer.duration_seconds",
        "Time spent inside the reducer per action"
    );
    describe_counter!("store.effects.executed", "Effects started, by effect type");
    describe_counter!("persistence.writes.total", "Storage writes attempted");
    describe_counter!("persistence.writes.failed", "Storage writes that failed");
    describe_counter!(
        "persistence.writes.superseded",
        "Pending writes replaced by a newer state before being written"
    );
    describe_counter!(
        "persistence.loads.total",
        "Startup loads of the persisted state, by outcome"
    );
    describe_histogram!(
        "persistence.write.duration_seconds",
        "Time spent writing one state blob"
    );
}
