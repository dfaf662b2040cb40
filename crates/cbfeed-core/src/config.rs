//! Configuration parsing for the feed runner.
//!
//! Settings are read from a single JSON file. Everything except the product
//! list is optional and falls back to a default via the `effective_*`
//! accessors.
//!
//! # Example config
//!
//! ```json
//! {
//!   "Feed": { "module_name": "cbfeed", "log_path": "/tmp/log" },
//!   "endpoint": "wss://ws-feed.exchange.coinbase.com",
//!   "product_ids": ["ETH-USD", "BTC-USD"],
//!   "channels": ["ticker", "heartbeat"],
//!   "ping_interval_sec": 30,
//!   "max_message_size_kb": 16384,
//!   "report_interval_ms": 5000
//! }
//! ```

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::types::{Channel, ChannelType, ProductId};

/// Public market-data endpoint.
pub const DEFAULT_ENDPOINT: &str = "wss://ws-feed.exchange.coinbase.com";

/// Default bound of the outbound (client to exchange) message queue.
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 64;

/// Top-level application config, deserialized from a JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Module metadata (name, log path).
    #[serde(rename = "Feed")]
    pub feed: Option<ModuleMeta>,

    /// WebSocket URL; defaults to [`DEFAULT_ENDPOINT`].
    pub endpoint: Option<String>,

    /// Products subscribed on every channel that is not scoped itself.
    #[serde(default)]
    pub product_ids: Vec<ProductId>,

    /// Channel names; defaults to `ticker` + `heartbeat`.
    pub channels: Option<Vec<ChannelType>>,

    /// Client keep-alive ping interval in seconds; `0` disables pings.
    pub ping_interval_sec: Option<u64>,

    /// Outbound queue bound (default: 64).
    pub outbound_capacity: Option<usize>,

    /// Largest inbound message in KiB; unset keeps the transport default.
    pub max_message_size_kb: Option<usize>,

    /// How often the runner logs tracked prices, in milliseconds.
    pub report_interval_ms: Option<u64>,

    /// Extra HTTP headers for the WebSocket handshake.
    pub extra_headers: Option<HashMap<String, String>>,
}

/// Module metadata block.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleMeta {
    pub module_name: Option<String>,
    pub log_path: Option<String>,
}

impl AppConfig {
    pub fn effective_endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    pub fn effective_channels(&self) -> Vec<Channel> {
        match &self.channels {
            Some(names) if !names.is_empty() => names.iter().copied().map(Channel::from).collect(),
            _ => vec![Channel::TICKER, Channel::HEARTBEAT],
        }
    }

    /// `None` when keep-alive pings are disabled.
    pub fn effective_ping_interval(&self) -> Option<Duration> {
        match self.ping_interval_sec.unwrap_or(30) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn effective_outbound_capacity(&self) -> usize {
        self.outbound_capacity.filter(|&n| n > 0).unwrap_or(DEFAULT_OUTBOUND_CAPACITY)
    }

    /// Inbound message limit in bytes. `0` is treated as unset.
    pub fn effective_max_message_size(&self) -> Option<usize> {
        self.max_message_size_kb.filter(|&kb| kb > 0).map(|kb| kb.saturating_mul(1024))
    }

    pub fn effective_report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms.unwrap_or(5_000))
    }

    /// Returns the module name, defaulting to `cbfeed`.
    pub fn module_name(&self) -> String {
        self.feed.as_ref().and_then(|m| m.module_name.clone()).unwrap_or_else(|| "cbfeed".to_string())
    }

    /// Returns the log path.
    pub fn log_path(&self) -> Option<String> {
        self.feed.as_ref().and_then(|m| m.log_path.clone())
    }
}

/// Load and parse a JSON config file.
pub fn load_config(path: &std::path::Path) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}
