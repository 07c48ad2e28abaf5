use crate::config::CoreConfig;
use crate::constants::endpoints;
use crate::error::FeedError;
use crate::fetcher::{CacheBinding, FeedSource, Fetcher, PagedFeed, PagingState};
use crate::models::{Notification, NotificationType};

use super::{consolidate, ConsolidatedNotification};

/// `exclude_types[]` for a type selection.
///
/// The API can only exclude, so showing one type means excluding every other
/// known type. No selection excludes nothing.
pub fn query_types(selected: Option<NotificationType>) -> Option<Vec<String>> {
    selected.map(|selected| {
        NotificationType::ALL
            .iter()
            .filter(|kind| **kind != selected)
            .map(|kind| kind.as_str().to_string())
            .collect()
    })
}

/// Notification feed: paginated like any feed, plus a type filter that
/// applies to requests and to live-merged notifications alike.
pub struct NotificationsFeed<S> {
    inner: PagedFeed<Notification, S>,
    selected_type: Option<NotificationType>,
}

impl<S: FeedSource<Notification>> NotificationsFeed<S> {
    pub fn new(source: S, config: &CoreConfig) -> Self {
        Self {
            inner: PagedFeed::new(source, config),
            selected_type: None,
        }
    }

    pub fn with_cache(self, binding: CacheBinding) -> Self {
        Self {
            inner: self.inner.with_cache(binding),
            selected_type: self.selected_type,
        }
    }

    pub fn feed(&self) -> &PagedFeed<Notification, S> {
        &self.inner
    }

    pub fn notifications(&self) -> &[Notification] {
        self.inner.items()
    }

    pub fn selected_type(&self) -> Option<NotificationType> {
        self.selected_type
    }

    /// Change the type filter. A change empties the list so the next
    /// `fetch_initial` loads a first page under the new filter.
    ///
    /// Returns whether the selection changed.
    pub fn set_selected_type(&mut self, selected: Option<NotificationType>) -> bool {
        if self.selected_type == selected {
            return false;
        }
        self.selected_type = selected;
        self.inner.reset();
        self.inner.set_exclude_types(query_types(selected));
        tracing::debug!(selected = ?selected, "notifications: type filter changed");
        true
    }

    fn matches_filter(&self, notification: &Notification) -> bool {
        match self.selected_type {
            Some(selected) => notification.kind == selected.as_str(),
            None => true,
        }
    }

    /// Digest rows for the current list
    pub fn consolidated(&self) -> Vec<ConsolidatedNotification> {
        consolidate(self.inner.items())
    }

    /// Dismiss every notification server-side. Best effort: failures are
    /// logged and otherwise ignored.
    pub async fn clear(&self) {
        if let Err(e) = self
            .inner
            .source()
            .post_action(endpoints::NOTIFICATIONS_CLEAR)
            .await
        {
            tracing::warn!(error = %e, "notifications: clear failed");
        }
    }
}

impl<S: FeedSource<Notification>> Fetcher for NotificationsFeed<S> {
    type Item = Notification;

    fn state(&self) -> PagingState<Notification> {
        self.inner.state()
    }

    async fn fetch_initial(&mut self) -> Result<Vec<Notification>, FeedError> {
        self.inner.fetch_initial().await
    }

    async fn fetch_next_page(&mut self) -> Result<Vec<Notification>, FeedError> {
        self.inner.fetch_next_page().await
    }

    fn begin_fetch_initial(&mut self) {
        self.inner.begin_fetch_initial()
    }

    fn begin_fetch_next_page(&mut self) {
        self.inner.begin_fetch_next_page()
    }

    fn handle_event(&mut self, item: Notification) -> bool {
        if !self.matches_filter(&item) {
            return false;
        }
        self.inner.handle_event(item)
    }
}
