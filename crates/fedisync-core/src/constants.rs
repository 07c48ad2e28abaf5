//! Protocol and storage constants shared across modules.

/// Default page size of the Mastodon list endpoints. Used as the "has more"
/// threshold: a page with fewer items ends pagination.
pub const PAGE_SIZE: usize = 15;

/// Most recent items kept per session in the timeline cache
pub const MAX_CACHE_ITEMS: usize = 400;

/// SQLite file holding the timeline cache, inside the data dir
pub const CACHE_DB_FILE: &str = "timeline_cache.db";

/// Key prefix of the last-seen cursor, suffixed with the session key
pub const LAST_SEEN_KEY_PREFIX: &str = "timeline-last-seen-";

// REST endpoints issued through `FeedSource::post_action`
pub mod endpoints {
    pub const NOTIFICATIONS_CLEAR: &str = "/api/v1/notifications/clear";
}

// Streaming API event names
pub mod stream_events {
    pub const UPDATE: &str = "update";
    pub const STATUS_UPDATE: &str = "status.update";
    pub const NOTIFICATION: &str = "notification";
    pub const DELETE: &str = "delete";
}
