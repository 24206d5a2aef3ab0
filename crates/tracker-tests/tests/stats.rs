//! User statistics and leaderboard integration tests.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracker_client::{
    CloseFillRequest, InsertPriceRequest, OpenTradeRequest, OptionType, TrackerClient,
};
use tracker_tests::{spawn_test_server, unique_user};

/// Opens a one-contract trade and closes it at the given exit price.
async fn round_trip(
    client: &TrackerClient,
    user: &str,
    entry: Decimal,
    exit: Decimal,
) {
    client
        .insert_price(&InsertPriceRequest {
            symbol: "SPY".to_string(),
            price: entry,
        })
        .await
        .expect("Failed to seed entry price");

    let opened = client
        .open_trade(&OpenTradeRequest {
            user_id: user.to_string(),
            underlying: "SPY".to_string(),
            strike: dec!(450),
            option_type: OptionType::Call,
            expiry: NaiveDate::from_ymd_opt(2026, 12, 18).expect("valid date"),
            price: entry,
            contracts: 1,
        })
        .await
        .expect("Failed to open trade");

    client
        .insert_price(&InsertPriceRequest {
            symbol: "SPY".to_string(),
            price: exit,
        })
        .await
        .expect("Failed to seed exit price");

    client
        .close_fill(
            opened.trade_id,
            &CloseFillRequest {
                contracts: 1,
                price: exit,
            },
        )
        .await
        .expect("Failed to close trade");
}

#[tokio::test]
async fn test_user_stats_aggregation() {
    let server = spawn_test_server().await;
    let user = unique_user("stats");

    // Win, loss, win, win
    round_trip(&server.client, &user, dec!(100), dec!(110)).await;
    round_trip(&server.client, &user, dec!(100), dec!(95)).await;
    round_trip(&server.client, &user, dec!(100), dec!(104)).await;
    round_trip(&server.client, &user, dec!(100), dec!(102)).await;

    let stats = server
        .client
        .get_user_stats(&user)
        .await
        .expect("Failed to get stats");

    assert_eq!(stats.closed_trades, 4);
    assert_eq!(stats.wins, 3);
    assert_eq!(stats.losses, 1);
    assert_eq!(stats.breakevens, 0);
    assert_eq!(stats.win_rate, dec!(0.75));
    // 1000 - 500 + 400 + 200, at one contract and the 100x multiplier
    assert_eq!(stats.net_pnl, dec!(1100));
    assert_eq!(stats.current_streak, 2);
    assert_eq!(stats.longest_streak, 2);
}

#[tokio::test]
async fn test_breakeven_breaks_streak() {
    let server = spawn_test_server().await;
    let user = unique_user("breakeven");

    round_trip(&server.client, &user, dec!(100), dec!(105)).await;
    round_trip(&server.client, &user, dec!(100), dec!(105)).await;
    round_trip(&server.client, &user, dec!(100), dec!(100)).await;

    let stats = server
        .client
        .get_user_stats(&user)
        .await
        .expect("Failed to get stats");

    assert_eq!(stats.wins, 2);
    assert_eq!(stats.breakevens, 1);
    assert_eq!(stats.current_streak, 0);
    assert_eq!(stats.longest_streak, 2);
}

#[tokio::test]
async fn test_stats_for_unknown_user_are_zero() {
    let server = spawn_test_server().await;

    let stats = server
        .client
        .get_user_stats("nobody")
        .await
        .expect("Failed to get stats");

    assert_eq!(stats.closed_trades, 0);
    assert_eq!(stats.net_pnl, dec!(0));
    assert_eq!(stats.win_rate, dec!(0));
    assert_eq!(stats.roi, dec!(0));
}

#[tokio::test]
async fn test_leaderboard_ranks_by_net_pnl() {
    let server = spawn_test_server().await;
    let winner = unique_user("winner");
    let loser = unique_user("loser");

    round_trip(&server.client, &winner, dec!(100), dec!(110)).await;
    round_trip(&server.client, &loser, dec!(100), dec!(96)).await;

    let board = server
        .client
        .get_leaderboard(None)
        .await
        .expect("Failed to get leaderboard");

    assert_eq!(board.entries.len(), 2);
    assert_eq!(board.entries[0].rank, 1);
    assert_eq!(board.entries[0].user_id, winner);
    assert_eq!(board.entries[0].net_pnl, dec!(1000));
    assert_eq!(board.entries[1].rank, 2);
    assert_eq!(board.entries[1].user_id, loser);

    let top_one = server
        .client
        .get_leaderboard(Some(1))
        .await
        .expect("Failed to limit leaderboard");
    assert_eq!(top_one.entries.len(), 1);
    assert_eq!(top_one.entries[0].user_id, winner);
}

#[tokio::test]
async fn test_leaderboard_excludes_users_without_closed_trades() {
    let server = spawn_test_server().await;
    let user = unique_user("openonly");

    server
        .client
        .insert_price(&InsertPriceRequest {
            symbol: "SPY".to_string(),
            price: dec!(450),
        })
        .await
        .expect("Failed to seed price");

    server
        .client
        .open_trade(&OpenTradeRequest {
            user_id: user.clone(),
            underlying: "SPY".to_string(),
            strike: dec!(450),
            option_type: OptionType::Put,
            expiry: NaiveDate::from_ymd_opt(2026, 12, 18).expect("valid date"),
            price: dec!(450),
            contracts: 1,
        })
        .await
        .expect("Failed to open trade");

    let board = server
        .client
        .get_leaderboard(None)
        .await
        .expect("Failed to get leaderboard");

    assert!(board.entries.iter().all(|e| e.user_id != user));
}
