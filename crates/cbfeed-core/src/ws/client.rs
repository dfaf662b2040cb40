//! Single WebSocket connection with ping keep-alive.
//!
//! [`WsConnection::connect`] performs the handshake and then hands the
//! stream to a tokio task that:
//! 1. Reads frames and forwards text to a callback.
//! 2. Answers server pings and sends optional keep-alive pings.
//! 3. Drains the bounded outbound queue.
//! 4. Reports why it stopped through a one-shot `on_close` callback.
//!
//! There is no reconnect: once the task ends the connection is spent.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use crate::error::FeedError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Callback invoked for each received text message, on the connection task.
pub type OnMessageCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Callback invoked exactly once when the connection task ends.
pub type OnCloseCallback = Box<dyn FnOnce(CloseReason) + Send>;

/// Why a connection task stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// [`WsConnection::shutdown`] was called or the handle was dropped.
    Local,
    /// The server sent a close frame or ended the stream.
    Remote(Option<String>),
    /// A transport read or write failed.
    Error(String),
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("closed locally"),
            Self::Remote(Some(reason)) => write!(f, "closed by server: {reason}"),
            Self::Remote(None) => f.write_str("closed by server"),
            Self::Error(e) => write!(f, "transport error: {e}"),
        }
    }
}

/// Configuration for a single WebSocket connection.
#[derive(Debug, Clone)]
pub struct WsConnConfig {
    /// Full WebSocket URL (e.g. `wss://ws-feed.exchange.coinbase.com`).
    pub url: String,
    /// Extra HTTP headers for the handshake.
    pub extra_headers: HashMap<String, String>,
    /// Interval between keep-alive ping frames.
    pub ping_interval: Option<Duration>,
    /// Bound of the outbound message queue.
    pub outbound_capacity: usize,
    /// Largest inbound message (and frame) accepted, in bytes. `None` keeps
    /// the tungstenite defaults. A larger message ends the connection.
    pub max_message_size: Option<usize>,
    /// Connection identifier used in log lines.
    pub id: usize,
}

impl WsConnConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            extra_headers: HashMap::new(),
            ping_interval: None,
            outbound_capacity: 64,
            max_message_size: None,
            id: 0,
        }
    }
}

/// Handle to a live connection task.
///
/// Dropping the handle stops the task, same as [`shutdown`](Self::shutdown).
pub struct WsConnection {
    id: usize,
    outbound_tx: mpsc::Sender<String>,
    shutdown_tx: watch::Sender<bool>,
    task: tokio::task::JoinHandle<()>,
}

impl WsConnection {
    /// Perform the handshake and start the connection task.
    pub async fn connect(
        config: WsConnConfig,
        on_text: OnMessageCallback,
        on_close: OnCloseCallback,
    ) -> Result<Self, FeedError> {
        info!("[ws-{}] connecting to {}", config.id, config.url);
        let stream = connect_ws(&config).await?;
        info!("[ws-{}] connected", config.id);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (outbound_tx, outbound_rx) = mpsc::channel::<String>(config.outbound_capacity.max(1));
        let id = config.id;

        let task = tokio::spawn(async move {
            let reason = connection_loop(stream, &config, on_text, outbound_rx, shutdown_rx).await;
            info!("[ws-{}] {reason}", config.id);
            on_close(reason);
        });

        Ok(Self { id, outbound_tx, shutdown_tx, task })
    }

    /// Queue a text frame without waiting. Fails if the queue is full or the
    /// task has ended.
    pub fn try_send(&self, text: String) -> Result<(), mpsc::error::TrySendError<String>> {
        self.outbound_tx.try_send(text)
    }

    /// Signal the task to send a close frame and stop. Never blocks.
    pub fn shutdown(&self) {
        debug!("[ws-{}] shutdown requested", self.id);
        let _ = self.shutdown_tx.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl fmt::Debug for WsConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WsConnection").field("id", &self.id).field("finished", &self.is_finished()).finish()
    }
}

/// Read/write loop for one established stream.
async fn connection_loop(
    stream: WsStream,
    config: &WsConnConfig,
    on_text: OnMessageCallback,
    mut outbound_rx: mpsc::Receiver<String>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> CloseReason {
    let conn_id = config.id;
    let (mut ws_write, mut ws_read) = stream.split();

    let ping_interval = config.ping_interval.map(|d| {
        let mut interval = tokio::time::interval(d);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        interval
    });

    tokio::pin! {
        let ping_tick = async {
            if let Some(mut interval) = ping_interval {
                // The first tick completes immediately.
                interval.tick().await;
                loop {
                    interval.tick().await;
                }
            } else {
                std::future::pending::<()>().await
            }
        };
    }

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                let _ = ws_write.close().await;
                return CloseReason::Local;
            }

            msg = ws_read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        on_text(text.as_str());
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(e) = ws_write.send(Message::Pong(data)).await {
                            error!("[ws-{conn_id}] pong send error: {e}");
                            return CloseReason::Error(e.to_string());
                        }
                    }
                    Some(Ok(Message::Binary(data))) => {
                        debug!("[ws-{conn_id}] ignoring {} byte binary frame", data.len());
                    }
                    Some(Ok(Message::Close(frame))) => {
                        warn!("[ws-{conn_id}] received close frame");
                        return CloseReason::Remote(frame.map(|f| f.reason.to_string()).filter(|r| !r.is_empty()));
                    }
                    Some(Err(e)) => {
                        error!("[ws-{conn_id}] read error: {e}");
                        return CloseReason::Error(e.to_string());
                    }
                    None => {
                        warn!("[ws-{conn_id}] stream ended");
                        return CloseReason::Remote(None);
                    }
                    _ => {} // Pong, Frame
                }
            }

            Some(msg) = outbound_rx.recv() => {
                debug!("[ws-{conn_id}] sending: {msg}");
                if let Err(e) = ws_write.send(Message::Text(msg.into())).await {
                    error!("[ws-{conn_id}] send error: {e}");
                    return CloseReason::Error(e.to_string());
                }
            }

            _ = &mut ping_tick => {
                if let Err(e) = ws_write.send(Message::Ping(Default::default())).await {
                    error!("[ws-{conn_id}] ping send error: {e}");
                    return CloseReason::Error(e.to_string());
                }
            }
        }
    }
}

/// Establish a (possibly TLS) WebSocket connection.
async fn connect_ws(config: &WsConnConfig) -> Result<WsStream, FeedError> {
    let ws_err = |e: &dyn fmt::Display| FeedError::WebSocket(format!("{}: {e}", config.url));

    let url = url::Url::parse(&config.url).map_err(|e| FeedError::Config(format!("invalid endpoint {}: {e}", config.url)))?;
    if !matches!(url.scheme(), "ws" | "wss") {
        return Err(FeedError::Config(format!("endpoint must be ws:// or wss://, got {}", config.url)));
    }

    let mut request = url.as_str().into_client_request().map_err(|e| ws_err(&e))?;
    for (key, value) in &config.extra_headers {
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| ws_err(&e))?;
        let value = HeaderValue::from_str(value).map_err(|e| ws_err(&e))?;
        request.headers_mut().insert(name, value);
    }

    let ws_config = config
        .max_message_size
        .map(|limit| WebSocketConfig::default().max_message_size(Some(limit)).max_frame_size(Some(limit)));

    let (stream, _response) =
        tokio_tungstenite::connect_async_with_config(request, ws_config, false).await.map_err(|e| ws_err(&e))?;
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    /// Echo server that accepts one connection.
    async fn echo_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            while let Some(Ok(msg)) = ws.next().await {
                if msg.is_close() {
                    break;
                }
                if msg.is_text() {
                    ws.send(msg).await.unwrap();
                }
            }
        });
        format!("ws://{addr}")
    }

    #[tokio::test]
    async fn echoes_text_and_reports_local_close() {
        let url = echo_server().await;
        let (text_tx, mut text_rx) = mpsc::unbounded_channel::<String>();
        let (close_tx, close_rx) = tokio::sync::oneshot::channel();

        let on_text: OnMessageCallback = Arc::new(move |t: &str| {
            let _ = text_tx.send(t.to_string());
        });
        let on_close: OnCloseCallback = Box::new(move |reason| {
            let _ = close_tx.send(reason);
        });

        let conn = WsConnection::connect(WsConnConfig::new(url), on_text, on_close).await.unwrap();
        conn.try_send(r#"{"type":"heartbeat"}"#.to_string()).unwrap();

        let echoed = tokio::time::timeout(Duration::from_secs(5), text_rx.recv()).await.unwrap().unwrap();
        assert_eq!(echoed, r#"{"type":"heartbeat"}"#);

        conn.shutdown();
        let reason = tokio::time::timeout(Duration::from_secs(5), close_rx).await.unwrap().unwrap();
        assert_eq!(reason, CloseReason::Local);
    }

    #[tokio::test]
    async fn oversized_message_ends_the_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            ws.send(Message::Text("x".repeat(100).into())).await.unwrap();
            ws.send(Message::Text("y".repeat(4096).into())).await.unwrap();
            while let Some(Ok(_)) = ws.next().await {}
        });

        let (text_tx, mut text_rx) = mpsc::unbounded_channel::<usize>();
        let (close_tx, close_rx) = tokio::sync::oneshot::channel();
        let mut config = WsConnConfig::new(format!("ws://{addr}"));
        config.max_message_size = Some(1024);

        let _conn = WsConnection::connect(
            config,
            Arc::new(move |t: &str| {
                let _ = text_tx.send(t.len());
            }),
            Box::new(move |reason| {
                let _ = close_tx.send(reason);
            }),
        )
        .await
        .unwrap();

        let reason = tokio::time::timeout(Duration::from_secs(5), close_rx).await.unwrap().unwrap();
        assert!(matches!(reason, CloseReason::Error(_)), "{reason:?}");
        assert_eq!(text_rx.recv().await, Some(100));
        assert_eq!(text_rx.recv().await, None);
    }

    #[tokio::test]
    async fn connect_failure_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = WsConnection::connect(
            WsConnConfig::new(format!("ws://{addr}")),
            Arc::new(|_: &str| {}),
            Box::new(|_| {}),
        )
        .await;
        assert!(matches!(result, Err(FeedError::WebSocket(_))));
    }

    #[tokio::test]
    async fn non_websocket_endpoint_is_a_config_error() {
        for url in ["https://example.test/feed", "not a url"] {
            let result = WsConnection::connect(WsConnConfig::new(url), Arc::new(|_: &str| {}), Box::new(|_| {})).await;
            assert!(matches!(result, Err(FeedError::Config(_))), "{url}");
        }
    }

    #[test]
    fn close_reason_display() {
        assert_eq!(CloseReason::Remote(Some("bye".into())).to_string(), "closed by server: bye");
        assert_eq!(CloseReason::Local.to_string(), "closed locally");
    }
}
