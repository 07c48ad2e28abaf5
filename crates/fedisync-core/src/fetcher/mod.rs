//! Pagination engine shared by every fetchable feed.
//!
//! A feed moves through [`PagingState`]: `Loading` until the first page lands,
//! then `Display` with the ordered items and where pagination stands, or
//! `Error` when the last operation failed. Failures never touch the items
//! already held, so retrying an operation picks up where it left off.

pub mod grouped;
pub mod paged;
pub mod source;

#[cfg(test)]
pub(crate) mod testing;

use std::future::Future;

use crate::error::FeedError;
use crate::models::FeedItem;

pub use grouped::statuses_by_account;
pub use paged::{CacheBinding, PagedFeed};
pub use source::{FeedSource, PageQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPageState {
    None,
    HasNextPage,
    LoadingNextPage,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PagingState<T> {
    Loading,
    Display {
        items: Vec<T>,
        next_page: NextPageState,
    },
    Error(FeedError),
}

impl<T> PagingState<T> {
    pub fn items(&self) -> Option<&[T]> {
        match self {
            PagingState::Display { items, .. } => Some(items),
            PagingState::Loading | PagingState::Error(_) => None,
        }
    }

    pub fn next_page(&self) -> Option<NextPageState> {
        match self {
            PagingState::Display { next_page, .. } => Some(*next_page),
            PagingState::Loading | PagingState::Error(_) => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, PagingState::Loading)
    }

    pub fn error(&self) -> Option<&FeedError> {
        match self {
            PagingState::Error(e) => Some(e),
            PagingState::Loading | PagingState::Display { .. } => None,
        }
    }
}

/// Contract every paginated feed implements.
///
/// Operations on one feed must be serialized by the caller; the
/// [`crate::runtime`] owner task does that. Fetch operations return the items
/// that newly arrived so the caller can reconcile pending submissions.
pub trait Fetcher: Send + 'static {
    type Item: FeedItem;

    fn state(&self) -> PagingState<Self::Item>;

    /// First page when empty, otherwise everything newer than the head
    fn fetch_initial(&mut self) -> impl Future<Output = Result<Vec<Self::Item>, FeedError>> + Send;

    /// Page older than the current tail; no-op on an empty feed
    fn fetch_next_page(&mut self) -> impl Future<Output = Result<Vec<Self::Item>, FeedError>> + Send;

    /// Enter the in-flight state of `fetch_initial` without awaiting the
    /// network, so an owner can publish it before the request goes out.
    fn begin_fetch_initial(&mut self) {}

    /// In-flight counterpart of `fetch_next_page`, see `begin_fetch_initial`
    fn begin_fetch_next_page(&mut self) {}

    /// Merge a live-pushed item. Returns whether the item was inserted.
    fn handle_event(&mut self, item: Self::Item) -> bool;

    /// One item per author, see [`statuses_by_account`]
    fn statuses_by_account_state(&self) -> PagingState<Self::Item> {
        statuses_by_account(&self.state())
    }
}
