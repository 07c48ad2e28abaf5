use crate::models::{FeedItem, PendingEntry};

/// Callback fired once each time confirmed entries are actually removed
pub type ConfirmFeedback = Box<dyn Fn() + Send>;

/// Sub-store for locally submitted items awaiting server confirmation.
/// In-memory only, owned by the feed runtime that shows the composer.
#[derive(Default)]
pub struct PendingLedger {
    entries: Vec<PendingEntry>,
    /// Suspends every mutation while a bulk operation is in progress
    pub disable_update: bool,
    on_confirmed: Option<ConfirmFeedback>,
}

impl std::fmt::Debug for PendingLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingLedger")
            .field("entries", &self.entries)
            .field("disable_update", &self.disable_update)
            .finish()
    }
}

impl PendingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feedback(on_confirmed: ConfirmFeedback) -> Self {
        Self {
            on_confirmed: Some(on_confirmed),
            ..Self::default()
        }
    }

    // ===== Getters =====

    pub fn entries(&self) -> &[PendingEntry] {
        &self.entries
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn has(&self, author_id: &str) -> bool {
        self.entries.iter().any(|e| e.author_id == author_id)
    }

    // ===== Mutations =====

    pub fn record<T: FeedItem>(&mut self, item: &T) {
        if self.disable_update {
            return;
        }
        self.entries.push(PendingEntry::from_item(item));
    }

    /// `item` arrived from the server: drop its entry and every entry recorded
    /// before it, since the feed lands submissions in order.
    ///
    /// Returns whether anything was removed.
    pub fn remove_through<T: FeedItem>(&mut self, item: &T) -> bool {
        if self.disable_update {
            return false;
        }
        let Some(index) = self.entries.iter().position(|e| e.item_id == item.id()) else {
            return false;
        };

        self.entries.drain(..=index);
        tracing::debug!(item_id = item.id(), remaining = self.entries.len(), "pending: confirmed");
        if let Some(feedback) = &self.on_confirmed {
            feedback();
        }
        true
    }

    pub fn remove_all(&mut self, author_id: &str) {
        if self.disable_update {
            return;
        }
        self.entries.retain(|e| e.author_id != author_id);
    }
}
