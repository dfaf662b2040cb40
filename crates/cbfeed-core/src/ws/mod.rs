//! WebSocket transport: one connection task per session.

pub mod client;

pub use client::{CloseReason, OnCloseCallback, OnMessageCallback, WsConnConfig, WsConnection};
