//! Tracing subscriber initialization for binaries embedding the compiler
//!
//! The compiler itself only emits `tracing` spans and events; whoever hosts
//! it (a controller, a CLI, a test harness) decides where they go. This
//! module provides the standard setup:
//! - `EnvFilter` driven by `RUST_LOG`, with a sensible default
//! - JSON structured logs with span context, or compact text for local runs

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Environment variable selecting the log format (`json` or `text`)
pub const LOG_FORMAT_ENV: &str = "TRELLIS_LOG_FORMAT";

/// Filter used when `RUST_LOG` is not set
const DEFAULT_FILTER: &str = "info,trellis_common=debug,trellis_topology=debug";

/// Errors that can occur during telemetry initialization
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to initialize tracing subscriber
    #[error("failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Configuration for telemetry initialization
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name recorded on the root span (e.g., "trellis-topology")
    pub service_name: String,

    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "trellis".to_string(),
            json: json_from_env(std::env::var(LOG_FORMAT_ENV).ok().as_deref()),
        }
    }
}

/// JSON is the default; only an explicit `text` opts out
fn json_from_env(value: Option<&str>) -> bool {
    !matches!(value, Some(v) if v.eq_ignore_ascii_case("text"))
}

/// Initialize the global tracing subscriber
///
/// # Example
///
/// ```ignore
/// use trellis_common::telemetry::{init_telemetry, TelemetryConfig};
///
/// init_telemetry(TelemetryConfig::default())?;
/// ```
pub fn init_telemetry(config: TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (json_layer, text_layer) = if config.json {
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .with_file(false)
            .with_line_number(false);
        (Some(layer), None)
    } else {
        let layer = tracing_subscriber::fmt::layer().compact().with_target(true);
        (None, Some(layer))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .map_err(|e: tracing_subscriber::util::TryInitError| {
            TelemetryError::SubscriberInit(e.to_string())
        })?;

    tracing::info!(service = %config.service_name, json = config.json, "telemetry initialized");
    Ok(())
}
