//! Follow purchase and notification integration tests.

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use tracker_client::{
    CreateFollowRequest, Error, InsertPriceRequest, OpenTradeRequest, OptionType, TrackerClient,
};
use tracker_tests::{spawn_test_server, unique_user};

async fn open_leader_trade(client: &TrackerClient, leader: &str) {
    client
        .insert_price(&InsertPriceRequest {
            symbol: "SPY".to_string(),
            price: dec!(450),
        })
        .await
        .expect("Failed to seed price");

    client
        .open_trade(&OpenTradeRequest {
            user_id: leader.to_string(),
            underlying: "SPY".to_string(),
            strike: dec!(450),
            option_type: OptionType::Call,
            expiry: NaiveDate::from_ymd_opt(2026, 12, 18).expect("valid date"),
            price: dec!(450),
            contracts: 1,
        })
        .await
        .expect("Failed to open trade");
}

#[tokio::test]
async fn test_create_and_list_follow() {
    let server = spawn_test_server().await;
    let follower = unique_user("follower");
    let leader = unique_user("leader");

    let purchase = server
        .client
        .create_follow(&CreateFollowRequest {
            follower_id: follower.clone(),
            leader_id: leader.clone(),
            notification_quota: Some(5),
            duration_days: Some(30),
        })
        .await
        .expect("Failed to create follow");

    assert_eq!(purchase.quota, 5);
    assert_eq!(purchase.remaining, 5);

    let listed = server
        .client
        .list_follows(&follower)
        .await
        .expect("Failed to list follows");

    assert_eq!(listed.purchases.len(), 1);
    assert_eq!(listed.purchases[0].leader_id, leader);
}

#[tokio::test]
async fn test_duplicate_active_follow_rejected() {
    let server = spawn_test_server().await;
    let follower = unique_user("dup_follower");
    let leader = unique_user("dup_leader");

    let request = CreateFollowRequest {
        follower_id: follower,
        leader_id: leader,
        notification_quota: Some(5),
        duration_days: Some(30),
    };

    server
        .client
        .create_follow(&request)
        .await
        .expect("First purchase should succeed");

    let result = server.client.create_follow(&request).await;

    match result {
        Err(Error::Api { status, .. }) => assert_eq!(status, 409),
        other => panic!("Expected 409, got {:?}", other),
    }
}

#[tokio::test]
async fn test_self_follow_rejected() {
    let server = spawn_test_server().await;
    let user = unique_user("narcissist");

    let result = server
        .client
        .create_follow(&CreateFollowRequest {
            follower_id: user.clone(),
            leader_id: user,
            notification_quota: Some(5),
            duration_days: Some(30),
        })
        .await;

    match result {
        Err(Error::Api { status, .. }) => assert_eq!(status, 400),
        other => panic!("Expected 400, got {:?}", other),
    }
}

#[tokio::test]
async fn test_notifications_bounded_by_quota() {
    let server = spawn_test_server().await;
    let follower = unique_user("quota_follower");
    let leader = unique_user("quota_leader");

    server
        .client
        .create_follow(&CreateFollowRequest {
            follower_id: follower.clone(),
            leader_id: leader.clone(),
            notification_quota: Some(2),
            duration_days: Some(30),
        })
        .await
        .expect("Failed to create follow");

    // Three opens, but only two notifications fit the quota
    for _ in 0..3 {
        open_leader_trade(&server.client, &leader).await;
    }

    let notifications = server
        .client
        .list_notifications(&follower)
        .await
        .expect("Failed to list notifications");

    assert_eq!(notifications.notifications.len(), 2);
    assert!(
        notifications
            .notifications
            .iter()
            .all(|n| n.leader_id == leader)
    );

    let purchases = server
        .client
        .list_follows(&follower)
        .await
        .expect("Failed to list follows");
    assert_eq!(purchases.purchases[0].remaining, 0);
}

#[tokio::test]
async fn test_rejected_trade_sends_no_notification() {
    let server = spawn_test_server().await;
    let follower = unique_user("silent_follower");
    let leader = unique_user("silent_leader");

    server
        .client
        .create_follow(&CreateFollowRequest {
            follower_id: follower.clone(),
            leader_id: leader.clone(),
            notification_quota: Some(5),
            duration_days: Some(30),
        })
        .await
        .expect("Failed to create follow");

    server
        .client
        .insert_price(&InsertPriceRequest {
            symbol: "QQQ".to_string(),
            price: dec!(400),
        })
        .await
        .expect("Failed to seed price");

    // Entry is outside the band, so the trade is stored as rejected
    server
        .client
        .open_trade(&OpenTradeRequest {
            user_id: leader,
            underlying: "QQQ".to_string(),
            strike: dec!(400),
            option_type: OptionType::Call,
            expiry: NaiveDate::from_ymd_opt(2026, 12, 18).expect("valid date"),
            price: dec!(425),
            contracts: 1,
        })
        .await
        .expect("Open request should succeed");

    let notifications = server
        .client
        .list_notifications(&follower)
        .await
        .expect("Failed to list notifications");

    assert!(notifications.notifications.is_empty());
}
