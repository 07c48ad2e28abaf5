//! Single-owner task per feed.
//!
//! The feed and its pending ledger are moved into one tokio task. Everything
//! else talks to them through a [`FeedHandle`], whose commands are applied
//! strictly in arrival order. That order is what serializes
//! `fetch_initial`, `fetch_next_page` and live events against each other:
//! an event pushed while a fetch is in flight waits in the channel and is
//! merged once the fetch has settled.
//!
//! Fetches publish twice: once with the in-flight state (`Loading`,
//! `LoadingNextPage`) before the request goes out, and once settled.

use futures::{Stream, StreamExt};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::error::FeedError;
use crate::fetcher::{Fetcher, PagingState};
use crate::store::PendingLedger;
use crate::streaming::StreamEvent;

type Reply = oneshot::Sender<Result<(), FeedError>>;

pub enum FeedCommand<F: Fetcher> {
    FetchInitial { reply: Option<Reply> },
    FetchNextPage { reply: Option<Reply> },
    /// Live-pushed item
    Event(F::Item),
    /// Locally submitted item awaiting confirmation
    RecordPending(F::Item),
    ClearPending { author_id: String },
    SuspendPending(bool),
    /// Feed-specific reconfiguration (e.g. the notification type filter)
    With(Box<dyn FnOnce(&mut F) + Send>),
    Shutdown,
}

pub struct FeedHandle<F: Fetcher> {
    command_tx: mpsc::UnboundedSender<FeedCommand<F>>,
    state_rx: watch::Receiver<PagingState<F::Item>>,
    pending_rx: watch::Receiver<usize>,
}

impl<F: Fetcher> Clone for FeedHandle<F> {
    fn clone(&self) -> Self {
        Self {
            command_tx: self.command_tx.clone(),
            state_rx: self.state_rx.clone(),
            pending_rx: self.pending_rx.clone(),
        }
    }
}

impl<F: Fetcher> FeedHandle<F> {
    pub fn send(&self, command: FeedCommand<F>) -> Result<(), FeedError> {
        self.command_tx.send(command).map_err(|_| FeedError::Closed)
    }

    async fn request(
        &self,
        make: impl FnOnce(Option<Reply>) -> FeedCommand<F>,
    ) -> Result<(), FeedError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(make(Some(reply_tx)))?;
        reply_rx.await.map_err(|_| FeedError::Closed)?
    }

    /// Runs `fetch_initial` and waits for it to settle
    pub async fn fetch_initial(&self) -> Result<(), FeedError> {
        self.request(|reply| FeedCommand::FetchInitial { reply }).await
    }

    pub async fn fetch_next_page(&self) -> Result<(), FeedError> {
        self.request(|reply| FeedCommand::FetchNextPage { reply }).await
    }

    pub fn push_event(&self, item: F::Item) -> Result<(), FeedError> {
        self.send(FeedCommand::Event(item))
    }

    pub fn record_pending(&self, item: F::Item) -> Result<(), FeedError> {
        self.send(FeedCommand::RecordPending(item))
    }

    pub fn clear_pending(&self, author_id: impl Into<String>) -> Result<(), FeedError> {
        self.send(FeedCommand::ClearPending {
            author_id: author_id.into(),
        })
    }

    pub fn suspend_pending(&self, suspended: bool) -> Result<(), FeedError> {
        self.send(FeedCommand::SuspendPending(suspended))
    }

    /// Run `f` on the feed inside its owner task; the published state is
    /// refreshed afterwards.
    pub fn with(&self, f: impl FnOnce(&mut F) + Send + 'static) -> Result<(), FeedError> {
        self.send(FeedCommand::With(Box::new(f)))
    }

    pub fn shutdown(&self) -> Result<(), FeedError> {
        self.send(FeedCommand::Shutdown)
    }

    /// Latest published state
    pub fn state(&self) -> PagingState<F::Item> {
        self.state_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PagingState<F::Item>> {
        self.state_rx.clone()
    }

    pub fn pending_count(&self) -> usize {
        *self.pending_rx.borrow()
    }

    pub fn subscribe_pending(&self) -> watch::Receiver<usize> {
        self.pending_rx.clone()
    }
}

pub struct FeedRuntime<F: Fetcher> {
    feed: F,
    ledger: PendingLedger,
    command_rx: mpsc::UnboundedReceiver<FeedCommand<F>>,
    state_tx: watch::Sender<PagingState<F::Item>>,
    pending_tx: watch::Sender<usize>,
}

impl<F: Fetcher> FeedRuntime<F> {
    /// Move `feed` and `ledger` into a new owner task on the current tokio
    /// runtime.
    pub fn spawn(feed: F, ledger: PendingLedger) -> (FeedHandle<F>, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(feed.state());
        let (pending_tx, pending_rx) = watch::channel(ledger.count());

        let runtime = FeedRuntime {
            feed,
            ledger,
            command_rx,
            state_tx,
            pending_tx,
        };
        let task = tokio::spawn(runtime.run());

        let handle = FeedHandle {
            command_tx,
            state_rx,
            pending_rx,
        };
        (handle, task)
    }

    async fn run(mut self) {
        tracing::debug!("feed runtime started");
        while let Some(command) = self.command_rx.recv().await {
            match command {
                FeedCommand::FetchInitial { reply } => {
                    self.feed.begin_fetch_initial();
                    self.publish();
                    let result = self.feed.fetch_initial().await;
                    self.settle(result, reply);
                }
                FeedCommand::FetchNextPage { reply } => {
                    self.feed.begin_fetch_next_page();
                    self.publish();
                    let result = self.feed.fetch_next_page().await;
                    self.settle(result, reply);
                }
                FeedCommand::Event(item) => {
                    // Only items the feed shows confirm a submission; a queued
                    // item confirms once the first page replays it.
                    if self.feed.handle_event(item.clone()) {
                        self.ledger.remove_through(&item);
                    }
                }
                FeedCommand::RecordPending(item) => {
                    self.ledger.record(&item);
                }
                FeedCommand::ClearPending { author_id } => {
                    self.ledger.remove_all(&author_id);
                }
                FeedCommand::SuspendPending(suspended) => {
                    self.ledger.disable_update = suspended;
                }
                FeedCommand::With(f) => {
                    f(&mut self.feed);
                }
                FeedCommand::Shutdown => break,
            }
            self.publish();
        }
        tracing::debug!("feed runtime stopped");
    }

    fn settle(&mut self, result: Result<Vec<F::Item>, FeedError>, reply: Option<Reply>) {
        let result = result.map(|arrived| {
            for item in &arrived {
                self.ledger.remove_through(item);
            }
        });
        // Publish before replying so a caller awaiting the fetch sees its outcome
        self.publish();
        if let Some(reply) = reply {
            let _ = reply.send(result);
        }
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.feed.state());
        self.pending_tx.send_replace(self.ledger.count());
    }
}

/// Pipe a live event stream into a feed. `select` picks the events the feed
/// consumes (e.g. [`StreamEvent::into_status`]); the rest are dropped.
///
/// Returns when the stream ends or the feed runtime has stopped.
pub async fn forward_events<F, St, Sel>(handle: FeedHandle<F>, events: St, select: Sel)
where
    F: Fetcher,
    St: Stream<Item = StreamEvent>,
    Sel: Fn(StreamEvent) -> Option<F::Item>,
{
    futures::pin_mut!(events);
    while let Some(event) = events.next().await {
        let Some(item) = select(event) else {
            continue;
        };
        if handle.push_event(item).is_err() {
            tracing::debug!("forward_events: feed runtime gone, stopping");
            break;
        }
    }
}
