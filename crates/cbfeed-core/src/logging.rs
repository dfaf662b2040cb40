//! Logging initialization using the `tracing` ecosystem.
//!
//! Provides:
//! - Console output (human-readable, or one JSON object per line)
//! - File output (daily rotation via `tracing-appender`)
//! - Configurable log level via env var `RUST_LOG` or explicit parameter

use std::str::FromStr;

use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format for console and file layers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Initialize the global tracing subscriber.
///
/// Should be called once at program start. After this, all `tracing::info!()`
/// etc. macros will produce output.
///
/// # Parameters
///
/// - `log_level`: default level if `RUST_LOG` env var is not set (e.g. `"info"`)
/// - `log_dir`: optional directory for daily-rotating log files
/// - `module_name`: used as the log file prefix (e.g. `"cbfeed"`)
/// - `format`: text or JSON lines
pub fn init_logging(log_level: &str, log_dir: Option<&str>, module_name: &str, format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let json = format == LogFormat::Json;
    let console_layer = fmt::layer().with_target(true).with_thread_ids(true).with_ansi(!json);
    let console_layer = if json { console_layer.json().boxed() } else { console_layer.boxed() };

    let file_layer = log_dir.map(|dir| {
        let file_appender = tracing_appender::rolling::daily(dir, module_name);
        let layer = fmt::layer()
            .with_writer(file_appender)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true);
        if json { layer.json().boxed() } else { layer.boxed() }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();
}
