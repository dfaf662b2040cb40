//! Bridge from raw frames to typed [`FeedMessage`] consumers.

use std::sync::Arc;

use cbfeed_core::codec::FeedCodec;
use cbfeed_core::message::FeedMessage;
use tracing::warn;

use super::MessageHandler;

/// Decodes each frame with a shared codec and passes the result to
/// `callback`. Frames that fail to decode are logged and dropped; later
/// frames are unaffected.
pub struct DecodingHandler<F> {
    codec: Arc<FeedCodec>,
    callback: F,
}

impl<F> DecodingHandler<F>
where
    F: Fn(FeedMessage) + Send + Sync,
{
    pub fn new(codec: Arc<FeedCodec>, callback: F) -> Self {
        Self { codec, callback }
    }
}

impl<F> MessageHandler for DecodingHandler<F>
where
    F: Fn(FeedMessage) + Send + Sync,
{
    fn on_message(&self, message: &str) {
        match self.codec.decode(message) {
            Ok(decoded) => (self.callback)(decoded),
            Err(e) => warn!("[decode] dropping message: {e}"),
        }
    }
}
