//! Notification-specific feed behavior: digest consolidation and the
//! type filter.

pub mod consolidate;
pub mod feed;

pub use consolidate::{consolidate, ConsolidatedNotification, ConsolidationKey};
pub use feed::{query_types, NotificationsFeed};
