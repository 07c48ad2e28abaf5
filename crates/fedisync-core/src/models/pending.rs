use super::FeedItem;

/// An item the local user submitted that the feed has not delivered yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEntry {
    pub item_id: String,
    pub author_id: String,
}

impl PendingEntry {
    pub fn new(item_id: impl Into<String>, author_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            author_id: author_id.into(),
        }
    }

    pub fn from_item<T: FeedItem>(item: &T) -> Self {
        Self::new(item.id(), item.author_id())
    }
}
