//! Health check and global statistics tests.

use tracker_tests::spawn_test_server;

#[tokio::test]
async fn test_health_check() {
    let server = spawn_test_server().await;

    let health = server
        .client
        .health_check()
        .await
        .expect("Health check failed");

    assert_eq!(health.status, "healthy");
    assert!(!health.version.is_empty());
}

#[tokio::test]
async fn test_global_stats_start_empty() {
    let server = spawn_test_server().await;

    let stats = server
        .client
        .get_global_stats()
        .await
        .expect("Failed to get stats");

    assert_eq!(stats.total_trades, 0);
    assert_eq!(stats.open_trades, 0);
    assert_eq!(stats.closed_trades, 0);
    assert_eq!(stats.rejected_trades, 0);
    assert_eq!(stats.total_fills, 0);
    assert_eq!(stats.user_count, 0);
}
