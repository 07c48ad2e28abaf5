use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Account, FeedItem, Status};

/// Notification kinds this client knows how to render.
///
/// The server may send kinds outside this set; those stay available through
/// [`Notification::kind`] but have no `NotificationType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Follow,
    FollowRequest,
    Mention,
    Reblog,
    Favourite,
    Poll,
    Status,
    Update,
}

impl NotificationType {
    pub const ALL: [NotificationType; 8] = [
        NotificationType::Follow,
        NotificationType::FollowRequest,
        NotificationType::Mention,
        NotificationType::Reblog,
        NotificationType::Favourite,
        NotificationType::Poll,
        NotificationType::Status,
        NotificationType::Update,
    ];

    /// Wire name, as used in the `type` field and `exclude_types[]`
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Follow => "follow",
            NotificationType::FollowRequest => "follow_request",
            NotificationType::Mention => "mention",
            NotificationType::Reblog => "reblog",
            NotificationType::Favourite => "favourite",
            NotificationType::Poll => "poll",
            NotificationType::Status => "status",
            NotificationType::Update => "update",
        }
    }

    pub fn from_wire(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == s)
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    /// Raw `type` string from the server
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: DateTime<Utc>,
    /// Account that performed the action
    pub account: Account,
    #[serde(default)]
    pub status: Option<Status>,
}

impl Notification {
    pub fn supported_type(&self) -> Option<NotificationType> {
        NotificationType::from_wire(&self.kind)
    }

    /// Id of what the notification is about: the status when there is one,
    /// otherwise the acting account (follows, follow requests).
    pub fn target_id(&self) -> &str {
        self.status
            .as_ref()
            .map(|s| s.id.as_str())
            .unwrap_or(&self.account.id)
    }
}

impl FeedItem for Notification {
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
        self.status.as_ref().map(|s| s.id.as_str())
    }
}
