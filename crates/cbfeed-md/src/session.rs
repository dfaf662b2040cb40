//! Feed session: one WebSocket connection plus the dispatch root.
//!
//! # Lifecycle
//!
//! ```text
//!          open()                 handshake ok
//! Closed ─────────► Connecting ─────────────► Open
//!   ▲                   │                      │
//!   └───────────────────┴──────────────────────┘
//!     handshake failed / close() / remote close / transport error
//! ```
//!
//! Every inbound text frame is passed once to the root
//! [`AggregatedHandler`] on the connection task. Outbound messages are
//! encoded on the caller's thread and queued without waiting. There is no
//! automatic reconnect; a closed session may be opened again.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use cbfeed_core::codec::FeedCodec;
use cbfeed_core::config::DEFAULT_OUTBOUND_CAPACITY;
use cbfeed_core::error::FeedError;
use cbfeed_core::message::FeedMessage;
use cbfeed_core::subscription::Subscription;
use cbfeed_core::types::{Channel, ProductId};
use cbfeed_core::ws::{CloseReason, OnCloseCallback, OnMessageCallback, WsConnConfig, WsConnection};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::dispatch::{AggregatedHandler, MessageHandler, SharedHandler};
use crate::tracking::{Tracker, tracker_handler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Connecting,
    Open,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Closed => "closed",
            Self::Connecting => "connecting",
            Self::Open => "open",
        })
    }
}

/// Client-side operations on a streaming feed.
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Connect to `endpoint`. Only valid from [`SessionState::Closed`].
    async fn open(&self, endpoint: &str) -> Result<(), FeedError>;

    /// Stop the connection. Never blocks; safe to call from a handler.
    fn close(&self);

    /// Encode `message` and queue it for sending.
    fn send_message(&self, message: &FeedMessage) -> Result<(), FeedError>;

    /// Register a handler after all handlers given at construction.
    fn add_handler(&self, handler: SharedHandler);

    fn state(&self) -> SessionState;
}

// ---------------------------------------------------------------------------
// FeedSession
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct ConnOptions {
    extra_headers: HashMap<String, String>,
    ping_interval: Option<Duration>,
    outbound_capacity: usize,
    max_message_size: Option<usize>,
}

struct Inner {
    state: SessionState,
    state_tx: watch::Sender<SessionState>,
    /// Bumped on every `open`, so callbacks from an earlier connection
    /// cannot touch a later one.
    generation: u64,
    connection: Option<WsConnection>,
}

impl Inner {
    fn set_state(&mut self, state: SessionState) {
        self.state = state;
        self.state_tx.send_replace(state);
    }
}

pub struct FeedSession {
    codec: Arc<FeedCodec>,
    root: Arc<AggregatedHandler>,
    subscription: Subscription,
    options: ConnOptions,
    inner: Arc<Mutex<Inner>>,
}

impl FeedSession {
    pub fn builder() -> FeedSessionBuilder {
        FeedSessionBuilder::new()
    }

    /// Codec used for outbound messages; share it with decoding consumers.
    pub fn codec(&self) -> &Arc<FeedCodec> {
        &self.codec
    }

    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    /// Send the configured subscribe request.
    pub fn subscribe(&self) -> Result<(), FeedError> {
        self.send_message(&self.subscription.subscribe_message()?)
    }

    /// Send the matching unsubscribe request.
    pub fn unsubscribe(&self) -> Result<(), FeedError> {
        self.send_message(&self.subscription.unsubscribe_message()?)
    }

    /// Receiver that observes every state transition.
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.lock().state_tx.subscribe()
    }

    /// Resolve once the session is [`SessionState::Closed`], whether by
    /// [`close`](FeedClient::close), a remote close or a transport error.
    pub async fn closed(&self) {
        let mut state = self.watch_state();
        let _ = state.wait_for(|s| *s == SessionState::Closed).await;
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock_inner(&self.inner)
    }
}

fn lock_inner(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl FeedClient for FeedSession {
    async fn open(&self, endpoint: &str) -> Result<(), FeedError> {
        let generation = {
            let mut inner = self.lock();
            if inner.state != SessionState::Closed {
                warn!("[session] open({endpoint}) ignored: session is {}", inner.state);
                return Err(FeedError::Session(format!("cannot open a session that is {}", inner.state)));
            }
            inner.set_state(SessionState::Connecting);
            inner.generation += 1;
            inner.generation
        };

        let config = WsConnConfig {
            url: endpoint.to_string(),
            extra_headers: self.options.extra_headers.clone(),
            ping_interval: self.options.ping_interval,
            outbound_capacity: self.options.outbound_capacity,
            max_message_size: self.options.max_message_size,
            id: generation as usize,
        };

        let root = Arc::clone(&self.root);
        let on_text: OnMessageCallback = Arc::new(move |text: &str| root.on_message(text));

        let weak = Arc::downgrade(&self.inner);
        let on_close: OnCloseCallback = Box::new(move |reason: CloseReason| {
            let Some(inner) = weak.upgrade() else { return };
            let mut inner = lock_inner(&inner);
            if inner.generation == generation && inner.state != SessionState::Closed {
                info!("[session] connection {generation} ended: {reason}");
                inner.set_state(SessionState::Closed);
                inner.connection = None;
            }
        });

        match WsConnection::connect(config, on_text, on_close).await {
            Ok(connection) => {
                let mut inner = self.lock();
                if inner.generation == generation && inner.state == SessionState::Connecting {
                    inner.set_state(SessionState::Open);
                    inner.connection = Some(connection);
                    info!("[session] open: {endpoint}");
                    Ok(())
                } else {
                    connection.shutdown();
                    warn!("[session] connection to {endpoint} closed before it opened");
                    Err(FeedError::Session("session closed while connecting".into()))
                }
            }
            Err(e) => {
                error!("[session] failed to open {endpoint}: {e}");
                let mut inner = self.lock();
                if inner.generation == generation {
                    inner.set_state(SessionState::Closed);
                }
                Err(e)
            }
        }
    }

    fn close(&self) {
        let mut inner = self.lock();
        match inner.state {
            SessionState::Closed => warn!("[session] close() on a closed session"),
            SessionState::Connecting | SessionState::Open => {
                info!("[session] closing ({})", inner.state);
                inner.set_state(SessionState::Closed);
                if let Some(connection) = inner.connection.take() {
                    connection.shutdown();
                }
            }
        }
    }

    fn send_message(&self, message: &FeedMessage) -> Result<(), FeedError> {
        let text = self.codec.encode(message)?;

        let inner = self.lock();
        let connection = match (&inner.state, &inner.connection) {
            (SessionState::Open, Some(connection)) => connection,
            (state, _) => return Err(FeedError::Session(format!("cannot send while {state}"))),
        };
        match connection.try_send(text) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                warn!("[session] outbound queue full, dropping {} message", message.message_type());
                Ok(())
            }
            Err(TrySendError::Closed(_)) => Err(FeedError::Session("connection task has stopped".into())),
        }
    }

    fn add_handler(&self, handler: SharedHandler) {
        self.root.add(handler);
    }

    fn state(&self) -> SessionState {
        self.lock().state
    }
}

impl fmt::Debug for FeedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedSession")
            .field("state", &self.state())
            .field("handlers", &self.root.len())
            .field("subscription", &self.subscription)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Assembles a [`FeedSession`] from handlers, trackers and a subscription.
pub struct FeedSessionBuilder {
    codec: Option<Arc<FeedCodec>>,
    handlers: Vec<SharedHandler>,
    subscription: Subscription,
    options: ConnOptions,
}

impl FeedSessionBuilder {
    pub fn new() -> Self {
        Self {
            codec: None,
            handlers: Vec::new(),
            subscription: Subscription::new(),
            options: ConnOptions {
                extra_headers: HashMap::new(),
                ping_interval: None,
                outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
                max_message_size: None,
            },
        }
    }

    pub fn with_codec(mut self, codec: Arc<FeedCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Handlers are invoked in the order they are added.
    pub fn with_handlers<I>(mut self, handlers: I) -> Self
    where
        I: IntoIterator<Item = SharedHandler>,
    {
        self.handlers.extend(handlers);
        self
    }

    pub fn with_trackers<T, I>(mut self, trackers: I) -> Self
    where
        T: Tracker + ?Sized + 'static,
        I: IntoIterator<Item = Arc<T>>,
    {
        self.handlers.extend(trackers.into_iter().map(tracker_handler));
        self
    }

    pub fn with_channels<I>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = Channel>,
    {
        self.subscription = self.subscription.with_channels(channels);
        self
    }

    pub fn with_products<I>(mut self, product_ids: I) -> Self
    where
        I: IntoIterator<Item = ProductId>,
    {
        self.subscription = self.subscription.with_products(product_ids);
        self
    }

    pub fn with_ping_interval(mut self, interval: Option<Duration>) -> Self {
        self.options.ping_interval = interval;
        self
    }

    pub fn with_outbound_capacity(mut self, capacity: usize) -> Self {
        self.options.outbound_capacity = capacity.max(1);
        self
    }

    /// Cap inbound message size in bytes. Deep order-book snapshots can be
    /// several megabytes.
    pub fn with_max_message_size(mut self, max_message_size: Option<usize>) -> Self {
        self.options.max_message_size = max_message_size;
        self
    }

    pub fn with_extra_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.options.extra_headers.extend(headers);
        self
    }

    /// Build an unopened session.
    pub fn build(self) -> FeedSession {
        FeedSession {
            codec: self.codec.unwrap_or_default(),
            root: Arc::new(AggregatedHandler::with_handlers(self.handlers)),
            subscription: self.subscription,
            options: self.options,
            inner: Arc::new(Mutex::new(Inner {
                state: SessionState::Closed,
                state_tx: watch::channel(SessionState::Closed).0,
                generation: 0,
                connection: None,
            })),
        }
    }

    /// Build, open and send the initial subscribe request if any channels
    /// were configured.
    pub async fn connect(self, endpoint: &str) -> Result<FeedSession, FeedError> {
        let session = self.build();
        session.open(endpoint).await?;
        if session.subscription.is_empty() {
            warn!("[session] no channels configured; nothing subscribed");
        } else if let Err(e) = session.subscribe() {
            session.close();
            return Err(e);
        }
        Ok(session)
    }
}

impl Default for FeedSessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
