//! Order-book level tuples.
//!
//! Level-2 snapshots and updates carry price levels as positional string
//! arrays. Plain level-2 sends `[price, size]`; `l2update` changes carry the
//! side first: `[side, price, size]`. Arity alone decides the shape.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::enums::OrderSide;

/// One order-book level: optional side, price and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct L2OrderTuple {
    pub side: Option<OrderSide>,
    pub price: Decimal,
    pub size: Decimal,
}

impl L2OrderTuple {
    /// Level without a side (`[price, size]` on the wire).
    pub fn level(price: Decimal, size: Decimal) -> Self {
        Self { side: None, price, size }
    }

    /// Level with a side (`[side, price, size]` on the wire).
    pub fn sided(side: OrderSide, price: Decimal, size: Decimal) -> Self {
        Self { side: Some(side), price, size }
    }

    /// Number of elements in the wire array.
    pub fn arity(&self) -> usize {
        if self.side.is_some() { 3 } else { 2 }
    }
}

impl Serialize for L2OrderTuple {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.arity()))?;
        if let Some(side) = self.side {
            seq.serialize_element(side.as_str())?;
        }
        seq.serialize_element(&self.price.to_string())?;
        seq.serialize_element(&self.size.to_string())?;
        seq.end()
    }
}

impl<'de> Deserialize<'de> for L2OrderTuple {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(TupleVisitor)
    }
}

struct TupleVisitor;

impl<'de> Visitor<'de> for TupleVisitor {
    type Value = L2OrderTuple;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array of [price, size] or [side, price, size] strings")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut items: Vec<String> = Vec::with_capacity(3);
        while let Some(item) = seq.next_element::<String>()? {
            if items.len() == 3 {
                return Err(de::Error::invalid_length(4, &self));
            }
            items.push(item);
        }

        match items.as_slice() {
            [price, size] => Ok(L2OrderTuple::level(parse_decimal(price)?, parse_decimal(size)?)),
            [side, price, size] => {
                let side = side.parse::<OrderSide>().map_err(de::Error::custom)?;
                Ok(L2OrderTuple::sided(side, parse_decimal(price)?, parse_decimal(size)?))
            }
            other => Err(de::Error::invalid_length(other.len(), &self)),
        }
    }
}

fn parse_decimal<E: de::Error>(text: &str) -> Result<Decimal, E> {
    Decimal::from_str(text).map_err(|e| E::custom(format!("invalid decimal {text:?}: {e}")))
}
