//! Follow purchases and copy-trade notification quotas.
//!
//! A follow purchase entitles one user to a bounded number of copy-trade
//! notifications from another. Payment processing is out of scope; the
//! registry tracks entitlements and produces queryable notification
//! records when a followed leader opens a trade.

use crate::models::{FollowPurchaseInfo, NotificationInfo, TradeInfo};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::info;
use uuid::Uuid;

/// Errors from follow purchase management.
#[derive(Debug, thiserror::Error)]
pub enum FollowError {
    /// An active purchase for the same pair already exists.
    #[error("active follow purchase already exists: {follower_id} -> {leader_id}")]
    DuplicateActive {
        /// The paying user.
        follower_id: String,
        /// The followed user.
        leader_id: String,
    },

    /// A user cannot follow themselves.
    #[error("user {0} cannot follow themselves")]
    SelfFollow(String),

    /// Quota must be positive.
    #[error("notification quota must be positive")]
    InvalidQuota,
}

/// Registry of follow purchases and the notifications they produced.
#[derive(Default)]
pub struct FollowRegistry {
    purchases: DashMap<Uuid, FollowPurchaseInfo>,
    /// Latest purchase per (follower, leader) pair. The entry lock makes
    /// the duplicate check and insert atomic for a given pair.
    active_pairs: DashMap<(String, String), Uuid>,
    /// Notifications keyed by follower, newest appended last.
    notifications: DashMap<String, Vec<NotificationInfo>>,
}

impl FollowRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn is_active(purchase: &FollowPurchaseInfo, now: DateTime<Utc>) -> bool {
        purchase.remaining > 0 && purchase.expires_at > now
    }

    /// Creates a follow purchase. Rejects a duplicate active purchase for
    /// the same follower/leader pair.
    pub fn create(
        &self,
        follower_id: &str,
        leader_id: &str,
        quota: u32,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<FollowPurchaseInfo, FollowError> {
        if follower_id == leader_id {
            return Err(FollowError::SelfFollow(follower_id.to_string()));
        }
        if quota == 0 {
            return Err(FollowError::InvalidQuota);
        }

        let purchase = FollowPurchaseInfo {
            purchase_id: Uuid::new_v4(),
            follower_id: follower_id.to_string(),
            leader_id: leader_id.to_string(),
            quota,
            remaining: quota,
            created_at: now,
            expires_at,
        };

        // Hold the pair entry across the duplicate check and both inserts
        // so two concurrent purchases for the same pair cannot both pass.
        let pair = (follower_id.to_string(), leader_id.to_string());
        match self.active_pairs.entry(pair) {
            Entry::Occupied(mut slot) => {
                let still_active = self
                    .purchases
                    .get(slot.get())
                    .is_some_and(|p| Self::is_active(p.value(), now));
                if still_active {
                    return Err(FollowError::DuplicateActive {
                        follower_id: follower_id.to_string(),
                        leader_id: leader_id.to_string(),
                    });
                }
                self.purchases.insert(purchase.purchase_id, purchase.clone());
                slot.insert(purchase.purchase_id);
            }
            Entry::Vacant(slot) => {
                self.purchases.insert(purchase.purchase_id, purchase.clone());
                slot.insert(purchase.purchase_id);
            }
        }

        info!(
            "Follow purchase {}: {} -> {} ({} notifications until {})",
            purchase.purchase_id, follower_id, leader_id, quota, expires_at
        );
        Ok(purchase)
    }

    /// Lists purchases where the user is the follower, newest first.
    pub fn purchases_for_follower(&self, follower_id: &str) -> Vec<FollowPurchaseInfo> {
        let mut purchases: Vec<FollowPurchaseInfo> = self
            .purchases
            .iter()
            .filter(|entry| entry.value().follower_id == follower_id)
            .map(|entry| entry.value().clone())
            .collect();
        purchases.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        purchases
    }

    /// Produces a notification for every active purchase targeting the
    /// leader of the opened trade, decrementing each purchase's remaining
    /// quota. Exhausted or expired purchases are skipped. Returns the
    /// number of followers notified.
    pub fn notify_trade_opened(&self, trade: &TradeInfo, now: DateTime<Utc>) -> usize {
        let mut notified = 0;

        for mut entry in self.purchases.iter_mut() {
            let purchase = entry.value_mut();
            if purchase.leader_id != trade.user_id || !Self::is_active(purchase, now) {
                continue;
            }

            purchase.remaining -= 1;
            let notification = NotificationInfo {
                follower_id: purchase.follower_id.clone(),
                leader_id: purchase.leader_id.clone(),
                trade_id: trade.trade_id,
                symbol: trade.instrument.symbol(),
                sent_at: now,
            };
            self.notifications
                .entry(purchase.follower_id.clone())
                .or_default()
                .push(notification);
            notified += 1;
        }

        if notified > 0 {
            info!(
                "Trade {} by {} notified {} followers",
                trade.trade_id, trade.user_id, notified
            );
        }
        notified
    }

    /// Notifications received by one follower, newest first.
    pub fn notifications_for(&self, follower_id: &str) -> Vec<NotificationInfo> {
        let mut notifications = self
            .notifications
            .get(follower_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();
        notifications.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        notifications
    }
}
