//! JSON codec for [`FeedMessage`].
//!
//! Decoding is two-phase: the top-level `type` discriminator is read into a
//! borrowed header that skips every other field, then the registered decoder
//! for that tag runs a full serde parse of the variant struct. The registry is built once from a
//! static table; a [`FeedCodec`] is immutable afterwards and is shared
//! between the session and its consumers behind an `Arc`.

use ahash::AHashMap;

use crate::error::{DecodeError, FeedError};
use crate::json_util::message_tag;
use crate::message::*;

/// Decoder for one registered variant.
pub type DecodeFn = fn(&str) -> serde_json::Result<FeedMessage>;

fn decoder<T: Message>(text: &str) -> serde_json::Result<FeedMessage> {
    serde_json::from_str::<T>(text).map(Into::into)
}

fn entry<T: Message>() -> (MessageType, DecodeFn) {
    (T::MESSAGE_TYPE, decoder::<T>)
}

fn decoder_table() -> [(MessageType, DecodeFn); 14] {
    [
        entry::<SubscribeMessage>(),
        entry::<UnsubscribeMessage>(),
        entry::<SubscriptionsMessage>(),
        entry::<ErrorMessage>(),
        entry::<TickerMessage>(),
        entry::<HeartbeatMessage>(),
        entry::<SnapshotMessage>(),
        entry::<L2UpdateMessage>(),
        entry::<ReceivedOrderMessage>(),
        entry::<OpenedOrderMessage>(),
        entry::<ClosedOrderMessage>(),
        entry::<MatchedOrderMessage>(),
        entry::<ChangedOrderMessage>(),
        entry::<ActivatedOrderMessage>(),
    ]
}

/// Encoder/decoder between [`FeedMessage`] and JSON text frames.
#[derive(Clone)]
pub struct FeedCodec {
    registry: AHashMap<&'static str, DecodeFn>,
}

impl FeedCodec {
    pub fn new() -> Self {
        let registry = decoder_table().into_iter().map(|(message_type, decode)| (message_type.as_str(), decode)).collect();
        Self { registry }
    }

    /// Serialize `message` with its `type` field injected and absent fields
    /// omitted. Validation runs first; nothing is produced on failure.
    pub fn encode(&self, message: &FeedMessage) -> Result<String, FeedError> {
        message.validate()?;
        serde_json::to_string(message).map_err(FeedError::Encode)
    }

    /// Resolve the variant from the `type` field and decode it.
    pub fn decode(&self, text: &str) -> Result<FeedMessage, DecodeError> {
        let tag = message_tag(text).map_err(DecodeError::InvalidJson)?.ok_or(DecodeError::MissingDiscriminator)?;
        let tag = tag.as_ref();
        let decode = self.registry.get(tag).ok_or_else(|| DecodeError::UnknownDiscriminator(tag.to_string()))?;
        decode(text).map_err(|source| DecodeError::Malformed { message_type: tag.to_string(), source })
    }

    /// Tags this codec can decode.
    pub fn message_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.registry.keys().copied()
    }

    pub fn is_registered(&self, tag: &str) -> bool {
        self.registry.contains_key(tag)
    }
}

impl Default for FeedCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FeedCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedCodec").field("message_types", &self.registry.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;
    use chrono::{DateTime, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    // -----------------------------------------------------------------------
    // Field fill strategies
    // -----------------------------------------------------------------------

    enum Mode {
        Absent,
        Present,
        Random(u64),
    }

    struct Fill(Mode);

    impl Fill {
        fn coin(&mut self) -> bool {
            match &mut self.0 {
                Mode::Absent => false,
                Mode::Present => true,
                Mode::Random(state) => {
                    // xorshift64
                    *state ^= *state << 13;
                    *state ^= *state >> 7;
                    *state ^= *state << 17;
                    *state & 1 == 1
                }
            }
        }

        fn opt<T>(&mut self, value: T) -> Option<T> {
            self.coin().then_some(value)
        }

        fn list<T>(&mut self, values: Vec<T>) -> Vec<T> {
            if self.coin() { values } else { Vec::new() }
        }
    }

    fn eth_usd() -> ProductId {
        "ETH-USD".parse().unwrap()
    }

    fn dec(text: &str) -> Decimal {
        text.parse().unwrap()
    }

    fn ts() -> DateTime<Utc> {
        "2022-10-19T23:28:22.061769Z".parse().unwrap()
    }

    fn meta(f: &mut Fill) -> MessageMeta {
        MessageMeta { sequence: f.opt(37_475_248_783), time: f.opt(ts()), product_id: f.opt(eth_usd()) }
    }

    fn order(f: &mut Fill) -> OrderFields {
        OrderFields {
            side: f.opt(OrderSide::Sell),
            order_id: f.opt(Uuid::from_u128(0xd50ec984_77a8_460a_b958_66f114b0de9b)),
            size: f.opt(dec("1.34")),
            price: f.opt(dec("502.1")),
            remaining_size: f.opt(dec("0.50")),
        }
    }

    fn every_variant(f: &mut Fill) -> Vec<FeedMessage> {
        let btc_usd: ProductId = "BTC-USD".parse().unwrap();
        vec![
            SubscribeMessage {
                meta: meta(f),
                product_ids: f.list(vec![eth_usd()]),
                channels: vec![Channel::TICKER.with_products([btc_usd]), Channel::HEARTBEAT],
            }
            .into(),
            UnsubscribeMessage { meta: meta(f), product_ids: f.list(vec![eth_usd()]), channels: vec![Channel::LEVEL2] }
                .into(),
            SubscriptionsMessage { meta: meta(f), channels: f.list(vec![Channel::FULL.with_products([eth_usd()])]) }
                .into(),
            ErrorMessage { meta: meta(f), message: f.opt("Failed to subscribe".into()), reason: f.opt("bad".into()) }
                .into(),
            TickerMessage {
                meta: meta(f),
                trade_id: f.opt(370_843_401),
                price: f.opt(dec("1285.22")),
                side: f.opt(OrderSide::Buy),
                last_size: f.opt(dec("11.4396987")),
                best_bid: f.opt(dec("1285.04")),
                best_ask: f.opt(dec("1285.27")),
                open_24h: f.opt(dec("1310.79")),
                volume_24h: f.opt(dec("245532.79269678")),
                low_24h: f.opt(dec("1280.52")),
                high_24h: f.opt(dec("1313.8")),
            }
            .into(),
            HeartbeatMessage { meta: meta(f), last_trade_id: f.opt(20) }.into(),
            SnapshotMessage {
                meta: meta(f),
                bids: f.list(vec![L2OrderTuple::level(dec("10101.10"), dec("0.45054140"))]),
                asks: f.list(vec![L2OrderTuple::level(dec("10102.55"), dec("0.57753524"))]),
            }
            .into(),
            L2UpdateMessage {
                meta: meta(f),
                changes: f.list(vec![L2OrderTuple::sided(OrderSide::Buy, dec("10101.80000000"), dec("0.162567"))]),
            }
            .into(),
            ReceivedOrderMessage {
                meta: meta(f),
                order: order(f),
                order_type: f.opt(OrderType::Limit),
                client_oid: f.opt("d50ec974-76a2-454b-66f1-35c1f2d3e1a4".into()),
                funds: f.opt(dec("3000.234")),
            }
            .into(),
            OpenedOrderMessage { meta: meta(f), order: order(f) }.into(),
            ClosedOrderMessage { meta: meta(f), order: order(f), reason: f.opt("filled".into()) }.into(),
            MatchedOrderMessage {
                meta: meta(f),
                order: order(f),
                trade_id: f.opt(10),
                maker_order_id: f.opt(Uuid::from_u128(0xac928c66_ca53_498f_9c13_a110027a60e8)),
                taker_order_id: f.opt(Uuid::from_u128(0x132fb6ae_456b_4654_b4e0_d681ac05cea1)),
                taker_user_id: f.opt("5844eceecf7e803e259d0365".into()),
                taker_profile_id: f.opt("765d1549-9660-4be2-97d4-fa2d65fa3352".into()),
                taker_fee_rate: f.opt(dec("0.005")),
                maker_user_id: f.opt("5f8a07f17b7a102330be40a3".into()),
                maker_profile_id: f.opt("7aa6b75c-0ff1-11eb-adc1-0242ac120002".into()),
                maker_fee_rate: f.opt(dec("0.001")),
                user_id: f.opt("5844eceecf7e803e259d0365".into()),
                profile_id: f.opt("765d1549-9660-4be2-97d4-fa2d65fa3352".into()),
            }
            .into(),
            ChangedOrderMessage { meta: meta(f), order: order(f), new_size: f.opt(dec("5.23512")), old_size: f.opt(dec("12.234412")) }
                .into(),
            ActivatedOrderMessage {
                meta: meta(f),
                order: order(f),
                timestamp: f.opt(dec("1483736448.299000")),
                user_id: f.opt("12".into()),
                stop_type: f.opt(OrderStop::Entry),
                stop_price: f.opt(dec("80")),
                funds: f.opt(dec("1.2")),
                is_private: f.opt(true),
            }
            .into(),
        ]
    }

    fn assert_round_trips(messages: Vec<FeedMessage>) {
        let codec = FeedCodec::new();
        for message in messages {
            let text = codec.encode(&message).unwrap();
            let decoded = codec.decode(&text).unwrap_or_else(|e| panic!("{text}: {e}"));
            assert_eq!(decoded, message, "{text}");
        }
    }

    // -----------------------------------------------------------------------
    // Round trips
    // -----------------------------------------------------------------------

    #[test]
    fn every_variant_is_registered() {
        let codec = FeedCodec::new();
        assert_eq!(codec.message_types().count(), MessageType::ALL.len());
        for t in MessageType::ALL {
            assert!(codec.is_registered(t.as_str()), "{t}");
        }
        assert!(!codec.is_registered("close"));
    }

    #[test]
    fn round_trip_all_fields_absent() {
        let messages = every_variant(&mut Fill(Mode::Absent));
        assert_eq!(messages.len(), MessageType::ALL.len());
        assert_round_trips(messages);
    }

    #[test]
    fn round_trip_all_fields_present() {
        assert_round_trips(every_variant(&mut Fill(Mode::Present)));
    }

    #[test]
    fn round_trip_random_field_assignments() {
        for seed in 1..=64u64 {
            let seed = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15);
            assert_round_trips(every_variant(&mut Fill(Mode::Random(seed))));
        }
    }

    // -----------------------------------------------------------------------
    // Wire shape
    // -----------------------------------------------------------------------

    #[test]
    fn absent_fields_are_omitted() {
        let codec = FeedCodec::new();
        let ticker: FeedMessage = TickerMessage { price: Some(dec("1.5")), ..Default::default() }.into();
        assert_eq!(codec.encode(&ticker).unwrap(), r#"{"type":"ticker","price":"1.5"}"#);
    }

    #[test]
    fn subscribe_wire_shape() {
        let codec = FeedCodec::new();
        let subscribe: FeedMessage =
            SubscribeMessage { product_ids: vec![eth_usd()], channels: vec![Channel::TICKER], ..Default::default() }
                .into();
        let text = codec.encode(&subscribe).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"type": "subscribe", "product_ids": ["ETH-USD"], "channels": [{"name": "ticker"}]})
        );
    }

    #[test]
    fn encode_rejects_subscribe_without_channels() {
        let codec = FeedCodec::new();
        let subscribe: FeedMessage = SubscribeMessage { product_ids: vec![eth_usd()], ..Default::default() }.into();
        assert!(matches!(codec.encode(&subscribe), Err(FeedError::Validation(_))));
    }

    #[test]
    fn decodes_exchange_ticker() {
        let text = r#"{"type":"ticker","sequence":37475248783,"product_id":"ETH-USD","price":"1285.22","open_24h":"1310.79","volume_24h":"245532.79269678","low_24h":"1280.52","high_24h":"1313.8","volume_30d":"9788783.60117027","best_bid":"1285.04","best_bid_size":"0.46688654","best_ask":"1285.27","best_ask_size":"1.56637040","side":"buy","time":"2022-10-19T23:28:22.061769Z","trade_id":370843401,"last_size":"11.4396987"}"#;
        let message = FeedCodec::new().decode(text).unwrap();
        let ticker = message.as_ticker().unwrap();
        assert_eq!(message.sequence(), Some(37_475_248_783));
        assert_eq!(message.product_id(), Some(&eth_usd()));
        assert_eq!(message.time(), Some(ts()));
        assert_eq!(ticker.price, Some(dec("1285.22")));
        assert_eq!(ticker.side, Some(OrderSide::Buy));
        assert_eq!(ticker.trade_id, Some(370_843_401));
    }

    #[test]
    fn decodes_done_order() {
        let text = r#"{"type":"done","time":"2014-11-07T08:19:27.028459Z","product_id":"BTC-USD","sequence":10,"price":"200.2","order_id":"d50ec984-77a8-460a-b958-66f114b0de9b","reason":"filled","side":"sell","remaining_size":"0"}"#;
        match FeedCodec::new().decode(text).unwrap() {
            FeedMessage::Closed(done) => {
                assert_eq!(done.reason.as_deref(), Some("filled"));
                assert_eq!(done.order.side, Some(OrderSide::Sell));
                assert_eq!(done.order.remaining_size, Some(Decimal::ZERO));
                assert_eq!(done.meta.sequence, Some(10));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn null_fields_read_as_absent() {
        let text = r#"{"type":"heartbeat","sequence":null,"last_trade_id":null}"#;
        let message = FeedCodec::new().decode(text).unwrap();
        assert_eq!(message, FeedMessage::from(HeartbeatMessage::default()));
    }

    // -----------------------------------------------------------------------
    // Errors
    // -----------------------------------------------------------------------

    #[test]
    fn unknown_discriminator_does_not_poison_codec() {
        let codec = FeedCodec::new();
        match codec.decode(r#"{"type":"unknown_thing","x":1}"#) {
            Err(DecodeError::UnknownDiscriminator(tag)) => assert_eq!(tag, "unknown_thing"),
            other => panic!("unexpected {other:?}"),
        }
        let message = codec.decode(r#"{"type":"heartbeat","last_trade_id":1}"#).unwrap();
        assert_eq!(message.message_type(), MessageType::Heartbeat);
    }

    #[test]
    fn missing_discriminator() {
        let codec = FeedCodec::new();
        assert!(matches!(codec.decode(r#"{"price":"1"}"#), Err(DecodeError::MissingDiscriminator)));
        assert!(matches!(codec.decode("not json"), Err(DecodeError::InvalidJson(_))));
        assert!(matches!(codec.decode(r#"{"type":5}"#), Err(DecodeError::InvalidJson(_))));
    }

    #[test]
    fn nested_type_fields_are_ignored() {
        let codec = FeedCodec::new();
        let text = r#"{"channels":[{"name":"ticker","type":"spot","product_ids":["ETH-USD"]}],"type":"subscriptions"}"#;
        let message = codec.decode(text).unwrap();
        assert_eq!(message.message_type(), MessageType::Subscriptions);

        let text = r#"{"extra":{"type":"match","price":"0"},"type":"ticker","sequence":3,"price":"7"}"#;
        let ticker = codec.decode(text).unwrap();
        assert_eq!(ticker.as_ticker().and_then(|t| t.price), Some(Decimal::from(7)));
    }

    #[test]
    fn malformed_fields_name_the_variant() {
        let codec = FeedCodec::new();
        match codec.decode(r#"{"type":"ticker","sequence":"abc"}"#) {
            Err(DecodeError::Malformed { message_type, .. }) => assert_eq!(message_type, "ticker"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            codec.decode(r#"{"type":"snapshot","bids":[["1"]]}"#),
            Err(DecodeError::Malformed { .. })
        ));
    }
}
