use chrono::{DateTime, Utc};

/// What the pagination engine needs to know about an item in a feed.
///
/// Everything else about the item is opaque to the core. Identity is `id`:
/// two items with the same id are the same item, whatever their payload.
pub trait FeedItem: Clone + Send + Sync + 'static {
    fn id(&self) -> &str;

    fn author_id(&self) -> &str;

    fn created_at(&self) -> DateTime<Utc>;

    /// Item this one replies to or refers to, if any
    fn parent_id(&self) -> Option<&str> {
        None
    }

    /// Original item when this one is a boost
    fn reblog_id(&self) -> Option<&str> {
        None
    }
}
