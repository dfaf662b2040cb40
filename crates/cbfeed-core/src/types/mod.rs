//! Value types shared by messages and subscriptions: product ids, order
//! flags, channels and order-book tuples.

pub mod channel;
pub mod enums;
pub mod order_book;
pub mod product;

pub use channel::*;
pub use enums::*;
pub use order_book::*;
pub use product::*;
