//! Enumerations used by feed messages and subscriptions.
//!
//! All enums serialize to the lowercase names used on the wire.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Order flags
// ---------------------------------------------------------------------------

/// Buy or sell side of an order or trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderSide {
    type Err = String;

    /// Case-insensitive, so `BUY` and `buy` both parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("buy") {
            Ok(Self::Buy)
        } else if s.eq_ignore_ascii_case("sell") {
            Ok(Self::Sell)
        } else {
            Err(format!("unknown order side {s:?}"))
        }
    }
}

/// Order type carried by `received` messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Limit,
    Market,
    Stop,
}

/// Stop direction carried by `activate` messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStop {
    Loss,
    Entry,
}

// ---------------------------------------------------------------------------
// Channels
// ---------------------------------------------------------------------------

/// Named subscription stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    Heartbeat,
    Status,
    Ticker,
    Level2,
    User,
    Matches,
    Full,
}

impl ChannelType {
    pub const ALL: [ChannelType; 7] = [
        Self::Heartbeat,
        Self::Status,
        Self::Ticker,
        Self::Level2,
        Self::User,
        Self::Matches,
        Self::Full,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Heartbeat => "heartbeat",
            Self::Status => "status",
            Self::Ticker => "ticker",
            Self::Level2 => "level2",
            Self::User => "user",
            Self::Matches => "matches",
            Self::Full => "full",
        }
    }

    /// Whether the exchange only streams this channel for named products.
    pub fn requires_product(&self) -> bool {
        matches!(self, Self::Ticker | Self::Level2 | Self::Matches | Self::Full)
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
