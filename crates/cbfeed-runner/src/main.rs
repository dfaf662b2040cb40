//! # cbfeed-runner
//!
//! Connects to the exchange feed, tracks last traded prices for the
//! configured products and logs them periodically.
//!
//! # Usage
//!
//! ```bash
//! cbfeed-runner config.json --log-level info --json-logs
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use cbfeed_core::logging::{LogFormat, init_logging};
use cbfeed_md::dispatch::handlers::{self, HandlerList};
use cbfeed_md::{FeedClient, FeedSession, PriceTracker, SharedHandler};
use clap::Parser;
use tracing::{info, warn};

/// Streaming market-data client.
#[derive(Parser)]
#[command(name = "cbfeed-runner", about = "Streaming market-data client")]
struct Cli {
    /// Configuration file path (JSON).
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Optional log directory for file output; overrides the config.
    #[arg(long)]
    log_dir: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load configuration
    let config = cbfeed_core::config::load_config(&cli.config)?;

    // 2. Initialize logging
    let log_dir = cli.log_dir.clone().or_else(|| config.log_path());
    let format = if cli.json_logs { LogFormat::Json } else { LogFormat::Text };
    init_logging(&cli.log_level, log_dir.as_deref(), &config.module_name(), format);

    info!(
        "cbfeed-runner starting: config={}, endpoint={}, products={}",
        cli.config.display(),
        config.effective_endpoint(),
        config.product_ids.len(),
    );

    // 3. Wire handlers
    let tracker = Arc::new(PriceTracker::new());
    let report_tracker = tracker.clone();
    let report = move |_: &str| {
        for product_id in report_tracker.tracked_product_ids() {
            if let Some(record) = report_tracker.record(&product_id) {
                info!("[price] {product_id} = {} (seq {})", record.price, record.sequence);
            }
        }
    };

    let printer: SharedHandler = Arc::new(handlers::pretty_print);
    let handler_list = HandlerList::new()
        .by_type("error", vec![printer.clone()])
        .by_type("subscriptions", vec![printer])
        .shared(handlers::timed(config.effective_report_interval(), Arc::new(report)))
        .build()?;

    // 4. Connect and subscribe
    let session = FeedSession::builder()
        .with_trackers([tracker])
        .with_handlers(handler_list)
        .with_channels(config.effective_channels())
        .with_products(config.product_ids.clone())
        .with_ping_interval(config.effective_ping_interval())
        .with_outbound_capacity(config.effective_outbound_capacity())
        .with_max_message_size(config.effective_max_message_size())
        .with_extra_headers(config.extra_headers.clone().unwrap_or_default())
        .connect(config.effective_endpoint())
        .await?;

    info!("session open, press Ctrl+C to stop");

    // 5. Run until Ctrl+C or the server drops us
    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("shutdown signal received");
            session.close();
        }
        _ = session.closed() => {
            warn!("session closed by the remote side");
        }
    }

    info!("stopped, goodbye");
    Ok(())
}
