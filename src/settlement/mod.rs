//! Trade settlement engine: lifecycle state machine, session gating and
//! performance aggregation.

mod ledger;
mod session;
mod stats;

pub use ledger::{CONTRACT_MULTIPLIER, DEFAULT_TOLERANCE, LedgerCounts, LedgerError, TradeLedger};
pub use session::{EXCHANGE_TZ, MarketCalendar};
pub use stats::{current_streak, leaderboard, longest_streak, user_stats};
