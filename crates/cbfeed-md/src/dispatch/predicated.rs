//! Predicate-gated forwarding.

use cbfeed_core::json_util::tag_is;

use super::{MessageHandler, SharedHandler};

/// Forwards a message to its child only when `predicate(message)` holds.
pub struct PredicatedHandler<P> {
    predicate: P,
    handler: SharedHandler,
}

impl<P> PredicatedHandler<P>
where
    P: Fn(&str) -> bool + Send + Sync,
{
    pub fn new(predicate: P, handler: SharedHandler) -> Self {
        Self { predicate, handler }
    }
}

impl<P> MessageHandler for PredicatedHandler<P>
where
    P: Fn(&str) -> bool + Send + Sync,
{
    fn on_message(&self, message: &str) {
        if (self.predicate)(message) {
            self.handler.on_message(message);
        }
    }
}

/// Predicate matching messages whose top-level `type` field equals `tag`.
/// Only the tag is deserialized; the rest of the frame is skipped.
pub fn type_is(tag: &str) -> impl Fn(&str) -> bool + Send + Sync + use<> {
    let tag = tag.to_string();
    move |message: &str| tag_is(message, &tag)
}
