//! Database module for the optional PostgreSQL audit sink.

mod pool;
mod records;

pub use pool::DatabasePool;
pub use records::{FillRow, TradeRow, insert_fill, upsert_trade};
