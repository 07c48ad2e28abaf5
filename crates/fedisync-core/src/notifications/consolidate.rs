use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::{Account, Notification, NotificationType, Status};

/// Grouping key: notifications of the same type about the same target
/// collapse into one digest row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConsolidationKey {
    pub kind: String,
    pub target_id: String,
}

/// One rendered notification row standing for one or more raw notifications.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidatedNotification {
    /// Id of the representative (first) notification of the group
    pub id: String,
    pub key: ConsolidationKey,
    pub kind: Option<NotificationType>,
    pub created_at: DateTime<Utc>,
    /// Acting accounts in arrival order, each account once
    pub accounts: Vec<Account>,
    pub status: Option<Status>,
}

impl ConsolidatedNotification {
    pub fn account_ids(&self) -> Vec<&str> {
        self.accounts.iter().map(|a| a.id.as_str()).collect()
    }
}

/// Collapse a flat notification list into digest rows, most recent first.
///
/// Each group takes its id, timestamp and status from its first notification
/// in `notifications` order. Rows with equal timestamps are ordered by
/// representative id, highest first, so the output is reproducible.
pub fn consolidate(notifications: &[Notification]) -> Vec<ConsolidatedNotification> {
    let mut groups: HashMap<ConsolidationKey, Vec<&Notification>> = HashMap::new();
    for notification in notifications {
        let key = ConsolidationKey {
            kind: notification.kind.clone(),
            target_id: notification.target_id().to_string(),
        };
        groups.entry(key).or_default().push(notification);
    }

    let mut entries: Vec<ConsolidatedNotification> = groups
        .into_iter()
        .map(|(key, members)| {
            let representative = members[0];
            let mut accounts: Vec<Account> = Vec::with_capacity(members.len());
            for member in &members {
                if !accounts.iter().any(|a| a.id == member.account.id) {
                    accounts.push(member.account.clone());
                }
            }
            ConsolidatedNotification {
                id: representative.id.clone(),
                key,
                kind: representative.supported_type(),
                created_at: representative.created_at,
                accounts,
                status: representative.status.clone(),
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    entries
}
