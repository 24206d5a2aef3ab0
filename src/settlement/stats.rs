//! Streak, ROI and leaderboard aggregation over closed trades.
//!
//! Only fully closed trades contribute; open and rejected trades never
//! enter the aggregates. Closed history is ordered by resolution time
//! descending, ties broken by trade id descending so the ordering is
//! total and deterministic.

use crate::models::{LeaderboardEntry, Outcome, TradeInfo, TradeStatus, UserStatsResponse};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Decimal places for win rate and ROI figures.
const RATIO_DP: u32 = 4;

/// Counts consecutive wins from the front of a most-recent-first outcome
/// sequence. Zero when the most recent closed trade is not a win.
pub fn current_streak(outcomes: &[Outcome]) -> usize {
    outcomes
        .iter()
        .take_while(|o| **o == Outcome::Win)
        .count()
}

/// Longest run of consecutive wins anywhere in the sequence.
pub fn longest_streak(outcomes: &[Outcome]) -> usize {
    let mut longest = 0;
    let mut run = 0;
    for outcome in outcomes {
        if *outcome == Outcome::Win {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    longest
}

/// Closed trades sorted most-recent-first (closed_at desc, trade id desc).
fn closed_history(trades: &[TradeInfo]) -> Vec<&TradeInfo> {
    let mut closed: Vec<&TradeInfo> = trades
        .iter()
        .filter(|t| t.status == TradeStatus::Closed)
        .collect();
    closed.sort_by(|a, b| {
        b.closed_at
            .cmp(&a.closed_at)
            .then_with(|| b.trade_id.cmp(&a.trade_id))
    });
    closed
}

fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        (numerator / denominator).round_dp(RATIO_DP)
    }
}

/// Computes per-user aggregates over the given trades (which must all
/// belong to `user_id`; callers filter first).
pub fn user_stats(user_id: &str, trades: &[TradeInfo]) -> UserStatsResponse {
    let open_trades = trades
        .iter()
        .filter(|t| t.status == TradeStatus::Open)
        .count();

    let closed = closed_history(trades);
    let outcomes: Vec<Outcome> = closed.iter().filter_map(|t| t.outcome).collect();

    let wins = outcomes.iter().filter(|o| **o == Outcome::Win).count();
    let losses = outcomes.iter().filter(|o| **o == Outcome::Loss).count();
    let breakevens = outcomes
        .iter()
        .filter(|o| **o == Outcome::Breakeven)
        .count();

    let net_pnl: Decimal = closed.iter().filter_map(|t| t.net_pnl).sum();
    let buy_notional: Decimal = closed.iter().map(|t| t.buy_notional).sum();

    UserStatsResponse {
        user_id: user_id.to_string(),
        open_trades,
        closed_trades: closed.len(),
        wins,
        losses,
        breakevens,
        win_rate: ratio(Decimal::from(wins as u64), Decimal::from(closed.len() as u64)),
        net_pnl,
        buy_notional,
        roi: ratio(net_pnl, buy_notional),
        current_streak: current_streak(&outcomes),
        longest_streak: longest_streak(&outcomes),
    }
}

/// Builds the company leaderboard over all trades.
///
/// One entry per user with at least one closed trade, ranked by total net
/// P&L descending; ties by win rate descending, then user id ascending.
pub fn leaderboard(trades: &[TradeInfo], limit: usize) -> Vec<LeaderboardEntry> {
    let mut by_user: HashMap<&str, Vec<TradeInfo>> = HashMap::new();
    for trade in trades {
        by_user
            .entry(trade.user_id.as_str())
            .or_default()
            .push(trade.clone());
    }

    let mut entries: Vec<LeaderboardEntry> = by_user
        .iter()
        .filter_map(|(user_id, user_trades)| {
            let stats = user_stats(user_id, user_trades);
            if stats.closed_trades == 0 {
                return None;
            }
            Some(LeaderboardEntry {
                rank: 0,
                user_id: stats.user_id,
                net_pnl: stats.net_pnl,
                win_rate: stats.win_rate,
                closed_trades: stats.closed_trades,
                current_streak: stats.current_streak,
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        b.net_pnl
            .cmp(&a.net_pnl)
            .then_with(|| b.win_rate.cmp(&a.win_rate))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    entries.truncate(limit);

    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i + 1;
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Instrument, OptionType};
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 7, 15, minute, 0).unwrap()
    }

    fn closed_trade(user: &str, pnl: Decimal, closed_at: DateTime<Utc>) -> TradeInfo {
        let outcome = if pnl > Decimal::ZERO {
            Outcome::Win
        } else if pnl < Decimal::ZERO {
            Outcome::Loss
        } else {
            Outcome::Breakeven
        };
        TradeInfo {
            trade_id: Uuid::new_v4(),
            user_id: user.to_string(),
            instrument: Instrument {
                underlying: "SPY".to_string(),
                strike: dec!(450),
                option_type: OptionType::Call,
                expiry: NaiveDate::from_ymd_opt(2026, 12, 18).unwrap(),
            },
            entry_price: dec!(2.00),
            contracts: 1,
            remaining_contracts: 0,
            status: TradeStatus::Closed,
            buy_notional: dec!(200),
            sell_notional: dec!(200) + pnl,
            net_pnl: Some(pnl),
            outcome: Some(outcome),
            entry_reference_price: dec!(2.00),
            opened_at: closed_at,
            closed_at: Some(closed_at),
            fills: Vec::new(),
        }
    }

    fn open_trade(user: &str) -> TradeInfo {
        let mut trade = closed_trade(user, dec!(0), ts(0));
        trade.status = TradeStatus::Open;
        trade.remaining_contracts = 1;
        trade.sell_notional = Decimal::ZERO;
        trade.net_pnl = None;
        trade.outcome = None;
        trade.closed_at = None;
        trade
    }

    #[test]
    fn test_current_streak_from_most_recent() {
        use Outcome::*;
        assert_eq!(current_streak(&[Win, Win, Loss, Win]), 2);
        assert_eq!(current_streak(&[Loss, Win, Win]), 0);
        assert_eq!(current_streak(&[Breakeven, Win]), 0);
        assert_eq!(current_streak(&[Win, Win, Win]), 3);
        assert_eq!(current_streak(&[]), 0);
    }

    #[test]
    fn test_longest_streak_anywhere() {
        use Outcome::*;
        assert_eq!(longest_streak(&[Win, Loss, Win, Win, Win, Loss, Win]), 3);
        assert_eq!(longest_streak(&[Loss, Breakeven, Loss]), 0);
        assert_eq!(longest_streak(&[Win, Win]), 2);
        assert_eq!(longest_streak(&[]), 0);
    }

    #[test]
    fn test_breakeven_breaks_streak() {
        use Outcome::*;
        assert_eq!(longest_streak(&[Win, Breakeven, Win, Win]), 2);
    }

    #[test]
    fn test_user_stats_aggregates() {
        // Minute order: 1=win, 2=loss, 3=win, 4=win (most recent)
        let trades = vec![
            closed_trade("alice", dec!(100), ts(1)),
            closed_trade("alice", dec!(-50), ts(2)),
            closed_trade("alice", dec!(30), ts(3)),
            closed_trade("alice", dec!(20), ts(4)),
            open_trade("alice"),
        ];

        let stats = user_stats("alice", &trades);
        assert_eq!(stats.open_trades, 1);
        assert_eq!(stats.closed_trades, 4);
        assert_eq!(stats.wins, 3);
        assert_eq!(stats.losses, 1);
        assert_eq!(stats.breakevens, 0);
        assert_eq!(stats.win_rate, dec!(0.75));
        assert_eq!(stats.net_pnl, dec!(100));
        assert_eq!(stats.buy_notional, dec!(800));
        assert_eq!(stats.roi, dec!(0.125));
        // Most recent two (minutes 4, 3) are wins; minute 2 is a loss.
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.longest_streak, 2);
    }

    #[test]
    fn test_user_stats_empty() {
        let stats = user_stats("nobody", &[]);
        assert_eq!(stats.closed_trades, 0);
        assert_eq!(stats.win_rate, Decimal::ZERO);
        assert_eq!(stats.roi, Decimal::ZERO);
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.longest_streak, 0);
    }

    #[test]
    fn test_streak_tiebreak_on_equal_timestamps_is_deterministic() {
        // Two trades share a closed_at; ordering falls back to trade id
        // descending, so repeated computation gives the same answer.
        let t = ts(5);
        let trades = vec![
            closed_trade("alice", dec!(10), t),
            closed_trade("alice", dec!(-10), t),
        ];
        let first = user_stats("alice", &trades);
        for _ in 0..10 {
            let again = user_stats("alice", &trades);
            assert_eq!(first.current_streak, again.current_streak);
        }
    }

    #[test]
    fn test_leaderboard_ranking() {
        let mut trades = vec![
            closed_trade("alice", dec!(100), ts(1)),
            closed_trade("bob", dec!(300), ts(2)),
            closed_trade("carol", dec!(-20), ts(3)),
            open_trade("dave"), // no closed trades, excluded
        ];
        trades.push(closed_trade("alice", dec!(50), ts(4)));

        let entries = leaderboard(&trades, 10);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].user_id, "bob");
        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[0].net_pnl, dec!(300));
        assert_eq!(entries[1].user_id, "alice");
        assert_eq!(entries[1].net_pnl, dec!(150));
        assert_eq!(entries[2].user_id, "carol");
        assert_eq!(entries[2].rank, 3);
    }

    #[test]
    fn test_leaderboard_limit_and_tiebreak() {
        let trades = vec![
            closed_trade("zed", dec!(100), ts(1)),
            closed_trade("amy", dec!(100), ts(2)),
        ];
        // Equal pnl and win rate: user id ascending breaks the tie.
        let entries = leaderboard(&trades, 10);
        assert_eq!(entries[0].user_id, "amy");
        assert_eq!(entries[1].user_id, "zed");

        let entries = leaderboard(&trades, 1);
        assert_eq!(entries.len(), 1);
    }
}
