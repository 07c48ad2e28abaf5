use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{FeedSource, Fetcher, NextPageState, PageQuery, PagingState};
use crate::config::CoreConfig;
use crate::error::FeedError;
use crate::models::FeedItem;
use crate::store::TimelineCache;

/// Where a feed reads its cold-start items from and writes fetched ones to.
#[derive(Clone)]
pub struct CacheBinding {
    pub cache: TimelineCache,
    pub session_key: String,
}

impl CacheBinding {
    pub fn new(cache: TimelineCache, session_key: impl Into<String>) -> Self {
        Self {
            cache,
            session_key: session_key.into(),
        }
    }
}

/// Tag of the current state; the items live beside it in `PagedFeed`.
#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Loading,
    Display(NextPageState),
    Error(FeedError),
}

/// Generic paginated feed over a [`FeedSource`].
pub struct PagedFeed<T, S> {
    source: S,
    items: Vec<T>,
    phase: Phase,
    page_size: usize,
    exclude_types: Option<Vec<String>>,
    cache: Option<CacheBinding>,
    restored_from_cache: bool,
    /// Set once a first page has landed from the server
    initial_loaded: bool,
    /// Live items received before the first page, replayed after it
    queued_events: Vec<T>,
}

impl<T, S> PagedFeed<T, S>
where
    T: FeedItem + Serialize + DeserializeOwned,
    S: FeedSource<T>,
{
    pub fn new(source: S, config: &CoreConfig) -> Self {
        Self {
            source,
            items: Vec::new(),
            phase: Phase::Loading,
            page_size: config.page_size,
            exclude_types: None,
            cache: None,
            restored_from_cache: false,
            initial_loaded: false,
            queued_events: Vec::new(),
        }
    }

    pub fn with_cache(mut self, binding: CacheBinding) -> Self {
        self.cache = Some(binding);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|i| i.id() == id)
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Types left out of every request from now on
    pub fn set_exclude_types(&mut self, exclude_types: Option<Vec<String>>) {
        self.exclude_types = exclude_types;
    }

    /// Drop everything held in memory so the next `fetch_initial` loads a
    /// fresh first page. The cache is not touched.
    pub fn reset(&mut self) {
        self.items.clear();
        self.queued_events.clear();
        self.phase = Phase::Loading;
        self.initial_loaded = false;
        // A reset feed has a different shape (e.g. a new filter), so the
        // cached generation no longer applies to it.
        self.restored_from_cache = true;
    }

    // ===== Last seen cursor =====

    pub fn remember_last_seen(&self, ids: &[String]) {
        if let Some(binding) = &self.cache {
            binding.cache.set_last_seen(&binding.session_key, ids);
        }
    }

    /// Items above the newest one the user is known to have seen.
    /// Zero when nothing was remembered or none of it is loaded.
    pub fn unread_count(&self) -> usize {
        let Some(binding) = &self.cache else {
            return 0;
        };
        let Some(seen) = binding.cache.get_last_seen(&binding.session_key) else {
            return 0;
        };
        let seen: HashSet<&str> = seen.iter().map(String::as_str).collect();
        self.items
            .iter()
            .position(|item| seen.contains(item.id()))
            .unwrap_or(0)
    }

    // ===== Operations =====

    /// Restores a cold start from the cache, and shows `Loading` when there
    /// is still nothing to display. Idempotent.
    pub fn begin_fetch_initial(&mut self) {
        if self.items.is_empty() {
            self.restore_from_cache();
        }
        if self.items.is_empty() {
            self.phase = Phase::Loading;
        }
    }

    pub async fn fetch_initial(&mut self) -> Result<Vec<T>, FeedError> {
        self.begin_fetch_initial();

        let mut arrived = if self.items.is_empty() {
            self.fetch_first_page().await?
        } else {
            self.fetch_newer().await?
        };
        self.initial_loaded = true;
        arrived.extend(self.replay_queued_events());

        self.persist();
        Ok(arrived)
    }

    async fn fetch_first_page(&mut self) -> Result<Vec<T>, FeedError> {
        let query = self.query(None, None);
        let page = match self.source.fetch_page(query).await {
            Ok(page) => page,
            Err(e) => return Err(self.fail(e)),
        };

        let next_page = self.next_page_after(page.len());
        self.items = dedupe(page, &HashSet::new());
        self.phase = Phase::Display(if self.items.is_empty() {
            NextPageState::None
        } else {
            next_page
        });
        tracing::debug!(count = self.items.len(), "feed: first page loaded");
        Ok(self.items.clone())
    }

    /// Refresh-newer: everything since the current head, prepended in server order
    async fn fetch_newer(&mut self) -> Result<Vec<T>, FeedError> {
        let since_id = self.items[0].id().to_string();
        let query = self.query(Some(since_id), None);
        let page = match self.source.fetch_page(query).await {
            Ok(page) => page,
            Err(e) => return Err(self.fail(e)),
        };

        let known: HashSet<String> = self.items.iter().map(|i| i.id().to_string()).collect();
        let fresh = dedupe(page, &known);
        let mut merged = fresh.clone();
        merged.append(&mut self.items);
        self.items = merged;

        // Measured on the whole list: a short refresh says nothing about
        // whether older pages remain below the tail.
        self.phase = Phase::Display(self.next_page_after(self.items.len()));
        tracing::debug!(count = fresh.len(), total = self.items.len(), "feed: refreshed newer");
        Ok(fresh)
    }

    pub fn begin_fetch_next_page(&mut self) {
        if !self.items.is_empty() {
            self.phase = Phase::Display(NextPageState::LoadingNextPage);
        }
    }

    pub async fn fetch_next_page(&mut self) -> Result<Vec<T>, FeedError> {
        let Some(last) = self.items.last() else {
            return Ok(Vec::new());
        };
        let max_id = last.id().to_string();

        self.begin_fetch_next_page();
        let query = self.query(None, Some(max_id));
        let page = match self.source.fetch_page(query).await {
            Ok(page) => page,
            Err(e) => return Err(self.fail(e)),
        };

        let next_page = self.next_page_after(page.len());
        let known: HashSet<String> = self.items.iter().map(|i| i.id().to_string()).collect();
        let older = dedupe(page, &known);
        self.items.extend(older.iter().cloned());
        self.phase = Phase::Display(next_page);
        tracing::debug!(count = older.len(), total = self.items.len(), "feed: next page loaded");

        self.persist();
        Ok(older)
    }

    pub fn handle_event(&mut self, item: T) -> bool {
        if self.contains(item.id()) {
            return false;
        }
        if self.items.is_empty() && !self.initial_loaded {
            if self.queued_events.iter().any(|q| q.id() == item.id()) {
                return false;
            }
            // Bounded while the first load keeps failing; oldest go first
            if self.queued_events.len() >= self.page_size.max(1) {
                let dropped = self.queued_events.remove(0);
                tracing::debug!(id = dropped.id(), "feed: queue full, dropped oldest live item");
            }
            tracing::debug!(id = item.id(), "feed: queued live item until first page");
            self.queued_events.push(item);
            return false;
        }

        self.items.insert(0, item);
        // More may still exist below the tail
        self.phase = Phase::Display(NextPageState::HasNextPage);
        true
    }

    pub fn state(&self) -> PagingState<T> {
        match &self.phase {
            Phase::Loading => PagingState::Loading,
            Phase::Display(next_page) => PagingState::Display {
                items: self.items.clone(),
                next_page: *next_page,
            },
            Phase::Error(e) => PagingState::Error(e.clone()),
        }
    }

    // ===== Helpers =====

    fn query(&self, since_id: Option<String>, max_id: Option<String>) -> PageQuery {
        PageQuery {
            since_id,
            max_id,
            exclude_types: self.exclude_types.clone(),
        }
    }

    fn next_page_after(&self, count: usize) -> NextPageState {
        if count < self.page_size {
            NextPageState::None
        } else {
            NextPageState::HasNextPage
        }
    }

    fn fail(&mut self, e: FeedError) -> FeedError {
        tracing::warn!(error = %e, "feed: fetch failed");
        self.phase = Phase::Error(e.clone());
        e
    }

    fn restore_from_cache(&mut self) {
        if self.restored_from_cache {
            return;
        }
        self.restored_from_cache = true;
        let Some(binding) = self.shared_cache().cloned() else {
            return;
        };

        let mut cached: Vec<T> = binding.cache.read_items(&binding.session_key);
        if cached.is_empty() {
            return;
        }
        // Cache read order is not chronological
        cached.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        self.items = dedupe(cached, &HashSet::new());
        self.phase = Phase::Display(self.next_page_after(self.items.len()));
        tracing::info!(
            session_key = %binding.session_key,
            count = self.items.len(),
            "feed: restored from cache"
        );
    }

    fn replay_queued_events(&mut self) -> Vec<T> {
        std::mem::take(&mut self.queued_events)
            .into_iter()
            .filter_map(|item| {
                let inserted = item.clone();
                self.handle_event(item).then_some(inserted)
            })
            .collect()
    }

    /// Cache binding for the unfiltered list. A list narrowed by
    /// `exclude_types` is a subset and must neither replace nor be
    /// restored as the session's cached generation.
    fn shared_cache(&self) -> Option<&CacheBinding> {
        match self.exclude_types {
            Some(_) => None,
            None => self.cache.as_ref(),
        }
    }

    fn persist(&self) {
        if let Some(binding) = self.shared_cache() {
            binding.cache.write(&binding.session_key, &self.items);
        }
    }
}

/// Keep the first occurrence of each id not already in `known`
fn dedupe<T: FeedItem>(items: Vec<T>, known: &HashSet<String>) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| !known.contains(item.id()) && seen.insert(item.id().to_string()))
        .collect()
}

impl<T, S> Fetcher for PagedFeed<T, S>
where
    T: FeedItem + Serialize + DeserializeOwned,
    S: FeedSource<T>,
{
    type Item = T;

    fn state(&self) -> PagingState<T> {
        PagedFeed::state(self)
    }

    async fn fetch_initial(&mut self) -> Result<Vec<T>, FeedError> {
        PagedFeed::fetch_initial(self).await
    }

    async fn fetch_next_page(&mut self) -> Result<Vec<T>, FeedError> {
        PagedFeed::fetch_next_page(self).await
    }

    fn begin_fetch_initial(&mut self) {
        PagedFeed::begin_fetch_initial(self)
    }

    fn begin_fetch_next_page(&mut self) {
        PagedFeed::begin_fetch_next_page(self)
    }

    fn handle_event(&mut self, item: T) -> bool {
        PagedFeed::handle_event(self, item)
    }
}
