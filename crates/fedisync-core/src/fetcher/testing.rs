//! Scripted remote source for unit tests.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Semaphore;

use super::{FeedSource, PageQuery};
use crate::error::FeedError;

/// Answers page requests from a queue of canned responses and records every
/// request it sees. An exhausted script answers with an empty page.
#[derive(Clone)]
pub struct ScriptedSource<T> {
    responses: Arc<Mutex<VecDeque<Result<Vec<T>, FeedError>>>>,
    queries: Arc<Mutex<Vec<PageQuery>>>,
    actions: Arc<Mutex<Vec<String>>>,
    fail_actions: bool,
    /// When set, each page request waits for one permit
    gate: Option<Arc<Semaphore>>,
}

impl<T> ScriptedSource<T> {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            queries: Arc::new(Mutex::new(Vec::new())),
            actions: Arc::new(Mutex::new(Vec::new())),
            fail_actions: false,
            gate: None,
        }
    }

    pub fn failing_actions() -> Self {
        Self {
            fail_actions: true,
            ..Self::new()
        }
    }

    /// Source whose page requests stay in flight until the returned
    /// semaphore is given a permit per request.
    pub fn gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let source = Self {
            gate: Some(gate.clone()),
            ..Self::new()
        };
        (source, gate)
    }

    pub fn push_ok(&self, page: Vec<T>) {
        self.responses.lock().push_back(Ok(page));
    }

    pub fn push_err(&self, error: FeedError) {
        self.responses.lock().push_back(Err(error));
    }

    pub fn queries(&self) -> Vec<PageQuery> {
        self.queries.lock().clone()
    }

    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().clone()
    }
}

impl<T: Send + Sync + 'static> FeedSource<T> for ScriptedSource<T> {
    fn fetch_page(&self, query: PageQuery) -> impl Future<Output = Result<Vec<T>, FeedError>> + Send {
        self.queries.lock().push(query);
        let response = self.responses.lock().pop_front().unwrap_or_else(|| Ok(Vec::new()));
        let gate = self.gate.clone();
        async move {
            if let Some(gate) = gate {
                if let Ok(permit) = gate.acquire().await {
                    permit.forget();
                }
            }
            response
        }
    }

    fn post_action(&self, endpoint: &str) -> impl Future<Output = Result<(), FeedError>> + Send {
        self.actions.lock().push(endpoint.to_string());
        let result = if self.fail_actions {
            Err(FeedError::transport("action rejected"))
        } else {
            Ok(())
        };
        async move { result }
    }
}
