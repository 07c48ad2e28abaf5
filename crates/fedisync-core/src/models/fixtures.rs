//! Builders shared by the unit tests of this crate.

use chrono::{DateTime, TimeZone, Utc};

use super::{Account, Notification, Status, Visibility};

pub fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

pub fn account(id: &str) -> Account {
    Account {
        id: id.to_string(),
        acct: format!("{}@example.social", id),
        username: id.to_string(),
        display_name: String::new(),
        avatar: String::new(),
    }
}

pub fn status(id: &str, author: &str, secs: i64) -> Status {
    Status {
        id: id.to_string(),
        account: account(author),
        created_at: ts(secs),
        content: format!("<p>status {}</p>", id),
        visibility: Visibility::Public,
        in_reply_to_id: None,
        reblog: None,
        replies_count: 0,
        reblogs_count: 0,
        favourites_count: 0,
    }
}

/// `count` statuses with ids `{prefix}{n}`, newest first
pub fn statuses(prefix: &str, count: usize) -> Vec<Status> {
    (0..count)
        .map(|n| status(&format!("{}{}", prefix, n), "author", -(n as i64)))
        .collect()
}

pub fn notification(id: &str, kind: &str, target: Option<&str>, actor: &str, secs: i64) -> Notification {
    Notification {
        id: id.to_string(),
        kind: kind.to_string(),
        created_at: ts(secs),
        account: account(actor),
        status: target.map(|s| status(s, "me", 0)),
    }
}
