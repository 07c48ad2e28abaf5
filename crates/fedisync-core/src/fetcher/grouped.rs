use std::collections::HashSet;

use super::{NextPageState, PagingState};
use crate::models::FeedItem;

/// Reduce a display state to the first item of each distinct author, in the
/// order authors first appear.
///
/// The grouped view never paginates on its own, so `next_page` is always
/// `None`. Loading and error states pass through unchanged.
pub fn statuses_by_account<T: FeedItem>(state: &PagingState<T>) -> PagingState<T> {
    match state {
        PagingState::Loading | PagingState::Error(_) => state.clone(),
        PagingState::Display { items, .. } => {
            let mut seen_authors = HashSet::new();
            let firsts = items
                .iter()
                .filter(|item| seen_authors.insert(item.author_id().to_string()))
                .cloned()
                .collect();
            PagingState::Display {
                items: firsts,
                next_page: NextPageState::None,
            }
        }
    }
}
