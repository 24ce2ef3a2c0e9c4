//! Logging infrastructure - structured tracing for the marshaling engine
//!
//! Design: Uses `tracing` for structured, contextual logging with
//! configurable levels, zero cost when disabled, and optional JSON output.

use once_cell::sync::OnceCell;
use std::io;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Global logging state
static LOGGER_INITIALIZED: OnceCell<()> = OnceCell::new();

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default log level
    pub level: Level,
    /// Enable JSON format (vs human-readable)
    pub json_format: bool,
    /// Show span events (enter/exit)
    pub show_spans: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            show_spans: false,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // VARCALL_LOG_LEVEL: trace, debug, info, warn, error
        if let Ok(level_str) = std::env::var("VARCALL_LOG_LEVEL") {
            config.level = match level_str.to_lowercase().as_str() {
                "trace" => Level::TRACE,
                "debug" => Level::DEBUG,
                "info" => Level::INFO,
                "warn" => Level::WARN,
                "error" => Level::ERROR,
                _ => Level::INFO,
            };
        }

        // VARCALL_LOG_JSON: enable JSON format
        config.json_format = std::env::var("VARCALL_LOG_JSON").is_ok();

        // VARCALL_LOG_SPANS: show span events
        config.show_spans = std::env::var("VARCALL_LOG_SPANS").is_ok();

        config
    }

    /// Create benchmark-friendly config (errors only)
    pub fn quiet() -> Self {
        Self {
            level: Level::ERROR,
            json_format: false,
            show_spans: false,
        }
    }
}

/// Initialize logging with configuration from the environment
pub fn init() {
    init_with_config(LogConfig::from_env());
}

/// Initialize logging with custom configuration (idempotent)
pub fn init_with_config(config: LogConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("varcall={}", config.level.as_str().to_lowercase()))
        });

        let span_events = if config.show_spans {
            FmtSpan::ENTER | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        let registry = tracing_subscriber::registry().with(env_filter);
        if config.json_format {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(io::stdout)
                        .with_span_events(span_events),
                )
                .init();
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_writer(io::stdout)
                        .with_span_events(span_events)
                        .with_target(true),
                )
                .init();
        }
    });
}

/// Check if logging is initialized
pub fn is_initialized() -> bool {
    LOGGER_INITIALIZED.get().is_some()
}

/// Log a completed native call
#[inline]
pub fn log_native_call(records: usize, status: u32) {
    tracing::trace!(
        event = "native_call",
        records = records,
        status = status,
        "native formatter returned"
    );
}

/// Log a rejected argument kind
#[inline]
pub fn log_unsupported_type(kind: &'static str) {
    tracing::warn!(
        event = "unsupported_type",
        kind = kind,
        "no encoder registered for kind"
    );
}
