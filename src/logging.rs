//! # Structured Logging Module
//!
//! Environment-aware structured logging for the listener, dispatch and store
//! paths. Console output is human-readable by default and JSON lines when
//! `logging.json` is set; `RUST_LOG` always wins over the configured level.

use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{detect_environment, LoggingConfig};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
pub fn init_structured_logging(config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = detect_environment();
        let log_level = config
            .level
            .clone()
            .unwrap_or_else(|| get_log_level(&environment));

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

        let layer = if config.json {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(true)
                .with_filter(filter)
                .boxed()
        };

        // A global subscriber may already be installed by the embedding process
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        }

        tracing::info!(
            pid = std::process::id(),
            environment = %environment,
            level = %log_level,
            json = config.json,
            "STRUCTURED LOGGING: Initialized"
        );
    });
}

/// Get log level based on environment
pub fn get_log_level(environment: &str) -> String {
    match environment {
        "test" => "debug".to_string(),
        "development" => "debug".to_string(),
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log structured data for document store operations
pub fn log_store_operation(
    operation: &str,
    store: &str,
    collection: &str,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        store = %store,
        collection = %collection,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "STORE_OPERATION"
    );
}

/// Log structured data for listener lifecycle operations
pub fn log_listener_operation(operation: &str, tag: &str, status: &str, details: Option<&str>) {
    tracing::info!(
        operation = %operation,
        listener_tag = %tag,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "LISTENER_OPERATION"
    );
}

/// Log structured data for event dispatch
pub fn log_dispatch_operation(
    event: &str,
    routing_key: &str,
    handler_count: usize,
    duration_ms: u64,
    status: &str,
) {
    tracing::debug!(
        event = %event,
        routing_key = %routing_key,
        handler_count = handler_count,
        duration_ms = duration_ms,
        status = %status,
        timestamp = %Utc::now().to_rfc3339(),
        "DISPATCH_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "ERROR"
    );
}
