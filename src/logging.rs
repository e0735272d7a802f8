//! # Structured Logging Module
//!
//! Subscriber setup for the classifier and dispatcher entry points. Output is
//! human-readable by default and switches to JSON lines when `logging.json` is set,
//! which is what log aggregation expects in deployed environments. `RUST_LOG` always
//! wins over the environment-derived default level.

use crate::config::{ConfigManager, LoggingConfig};
use std::process;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static SUBSCRIBER_INSTALLED: OnceLock<()> = OnceLock::new();

/// Plain-text logging with the environment's default level
pub fn init_structured_logging() {
    init_structured_logging_with(&LoggingConfig::default());
}

/// Install the global subscriber; later calls are no-ops
pub fn init_structured_logging_with(config: &LoggingConfig) {
    SUBSCRIBER_INSTALLED.get_or_init(|| {
        let environment = ConfigManager::detect_environment();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive(&environment)));

        let layer = if config.json {
            fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .with_ansi(false)
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_filter(filter)
                .boxed()
        };

        // The host runtime may have installed its own subscriber
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Tracing subscriber already installed, keeping it");
        }

        tracing::info!(
            pid = process::id(),
            environment = %environment,
            json = config.json,
            "🔧 Logging initialized"
        );
    });
}

/// Default filter directive: quieter in production, crate-level debug elsewhere
fn default_directive(environment: &str) -> &'static str {
    match environment {
        "production" | "prod" => "info",
        "test" => "warn,account_lifecycle=debug",
        _ => "info,account_lifecycle=debug",
    }
}
