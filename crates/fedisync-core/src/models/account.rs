use serde::{Deserialize, Serialize};

/// Remote account as returned by `/api/v1/accounts/:id` and embedded in
/// statuses and notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub acct: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub avatar: String,
}

impl Account {
    /// Name to show in lists: display name, falling back to `acct` when blank
    pub fn safe_display_name(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.acct
        } else {
            &self.display_name
        }
    }
}
