pub mod config;
pub mod constants;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod notifications;
pub mod runtime;
pub mod store;
pub mod streaming;

pub use config::CoreConfig;
pub use error::{FeedError, StorageError};
pub use fetcher::{
    statuses_by_account, CacheBinding, FeedSource, Fetcher, NextPageState, PageQuery, PagedFeed,
    PagingState,
};
pub use notifications::{consolidate, ConsolidatedNotification, NotificationsFeed};
pub use runtime::{forward_events, FeedCommand, FeedHandle, FeedRuntime};
pub use store::{Database, PendingLedger, TimelineCache};
