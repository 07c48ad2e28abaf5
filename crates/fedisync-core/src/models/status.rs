use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Account, FeedItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Unlisted,
    Private,
    Direct,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub id: String,
    pub account: Account,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub in_reply_to_id: Option<String>,
    /// Boosted status, boxed since it nests the same type
    #[serde(default)]
    pub reblog: Option<Box<Status>>,
    #[serde(default)]
    pub replies_count: u32,
    #[serde(default)]
    pub reblogs_count: u32,
    #[serde(default)]
    pub favourites_count: u32,
}

impl FeedItem for Status {
    fn id(&self) -> &str {
        &self.id
    }

    fn author_id(&self) -> &str {
        &self.account.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn parent_id(&self) -> Option<&str> {
        self.in_reply_to_id.as_deref()
    }

    fn reblog_id(&self) -> Option<&str> {
        self.reblog.as_ref().map(|s| s.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reblog() {
        let json = r#"{
            "id": "110",
            "created_at": "2023-02-17T10:20:54.000Z",
            "account": {"id": "a1", "acct": "alice"},
            "visibility": "unlisted",
            "reblog": {
                "id": "99",
                "created_at": "2023-02-16T08:00:00.000Z",
                "account": {"id": "b2", "acct": "bob@remote.example"},
                "content": "<p>hello</p>",
                "in_reply_to_id": "98"
            }
        }"#;
        let status: Status = serde_json::from_str(json).unwrap();

        assert_eq!(status.author_id(), "a1");
        assert_eq!(status.visibility, Visibility::Unlisted);
        assert_eq!(status.reblog_id(), Some("99"));
        assert_eq!(status.parent_id(), None);
        assert_eq!(status.reblog.as_ref().unwrap().parent_id(), Some("98"));
    }
}
