//! Unit tests for types module.

use super::*;
use std::str::FromStr;

// ============================================================================
// Enum Tests
// ============================================================================

#[test]
fn test_option_type_display() {
    assert_eq!(format!("{}", OptionType::Call), "call");
    assert_eq!(format!("{}", OptionType::Put), "put");
}

#[test]
fn test_option_type_serialization() {
    assert_eq!(serde_json::to_string(&OptionType::Call).unwrap(), "\"call\"");
    assert_eq!(serde_json::to_string(&OptionType::Put).unwrap(), "\"put\"");
}

#[test]
fn test_trade_status_display() {
    assert_eq!(format!("{}", TradeStatus::Open), "open");
    assert_eq!(format!("{}", TradeStatus::Closed), "closed");
    assert_eq!(format!("{}", TradeStatus::Rejected), "rejected");
}

#[test]
fn test_trade_status_deserialization() {
    let open: TradeStatus = serde_json::from_str("\"open\"").unwrap();
    let closed: TradeStatus = serde_json::from_str("\"closed\"").unwrap();

    assert_eq!(open, TradeStatus::Open);
    assert_eq!(closed, TradeStatus::Closed);
}

#[test]
fn test_outcome_display() {
    assert_eq!(format!("{}", Outcome::Win), "win");
    assert_eq!(format!("{}", Outcome::Loss), "loss");
    assert_eq!(format!("{}", Outcome::Breakeven), "breakeven");
}

#[test]
fn test_permission_serialization() {
    assert_eq!(serde_json::to_string(&Permission::Read).unwrap(), "\"read\"");
    assert_eq!(
        serde_json::to_string(&Permission::Trade).unwrap(),
        "\"trade\""
    );
    assert_eq!(
        serde_json::to_string(&Permission::Admin).unwrap(),
        "\"admin\""
    );
}

// ============================================================================
// Request Serialization Tests
// ============================================================================

#[test]
fn test_open_trade_request_roundtrip() {
    let request = OpenTradeRequest {
        user_id: "alice".to_string(),
        underlying: "SPY".to_string(),
        strike: Decimal::from_str("450").unwrap(),
        option_type: OptionType::Call,
        expiry: NaiveDate::from_ymd_opt(2026, 3, 20).unwrap(),
        price: Decimal::from_str("450.25").unwrap(),
        contracts: 10,
    };

    let json = serde_json::to_string(&request).unwrap();
    let parsed: OpenTradeRequest = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.user_id, "alice");
    assert_eq!(parsed.contracts, 10);
    assert_eq!(parsed.option_type, OptionType::Call);
}

#[test]
fn test_create_follow_request_omits_none() {
    let request = CreateFollowRequest {
        follower_id: "bob".to_string(),
        leader_id: "alice".to_string(),
        notification_quota: None,
        duration_days: None,
    };

    let json = serde_json::to_string(&request).unwrap();

    assert!(!json.contains("notification_quota"));
    assert!(!json.contains("duration_days"));
}

#[test]
fn test_trade_info_deserialization() {
    let json = r#"{
        "trade_id": "00000000-0000-0000-0000-000000000001",
        "user_id": "alice",
        "instrument": {
            "underlying": "SPY",
            "strike": "450",
            "option_type": "call",
            "expiry": "2026-03-20"
        },
        "entry_price": "450.00",
        "contracts": 10,
        "remaining_contracts": 0,
        "status": "closed",
        "buy_notional": "450000",
        "sell_notional": "455000",
        "net_pnl": "5000",
        "outcome": "win",
        "entry_reference_price": "450.10",
        "opened_at": "2026-01-07T15:00:00Z",
        "closed_at": "2026-01-07T16:00:00Z",
        "fills": []
    }"#;

    let trade: TradeInfo = serde_json::from_str(json).unwrap();

    assert_eq!(trade.status, TradeStatus::Closed);
    assert_eq!(trade.outcome, Some(Outcome::Win));
    assert_eq!(trade.net_pnl, Some(Decimal::from_str("5000").unwrap()));
    assert_eq!(trade.instrument.underlying, "SPY");
}
