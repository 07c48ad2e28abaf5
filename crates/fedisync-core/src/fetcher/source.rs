use std::future::Future;

use crate::error::FeedError;

/// Cursor and filter parameters of one page request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    /// Only items newer than this id
    pub since_id: Option<String>,
    /// Only items older than this id
    pub max_id: Option<String>,
    /// Notification types the server must leave out
    pub exclude_types: Option<Vec<String>>,
}

impl PageQuery {
    /// Query-string pairs in the shape the REST API expects
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(since_id) = &self.since_id {
            pairs.push(("since_id".to_string(), since_id.clone()));
        }
        if let Some(max_id) = &self.max_id {
            pairs.push(("max_id".to_string(), max_id.clone()));
        }
        if let Some(types) = &self.exclude_types {
            for kind in types {
                pairs.push(("exclude_types[]".to_string(), kind.clone()));
            }
        }
        pairs
    }
}

/// Remote paged API behind a feed. Implemented by the HTTP client; no
/// timeout or retry is applied on this side.
pub trait FeedSource<T>: Send + Sync + 'static {
    fn fetch_page(&self, query: PageQuery) -> impl Future<Output = Result<Vec<T>, FeedError>> + Send;

    fn post_action(&self, endpoint: &str) -> impl Future<Output = Result<(), FeedError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page_has_no_parameters() {
        assert!(PageQuery::default().query_pairs().is_empty());
    }

    #[test]
    fn test_cursor_and_exclusions_shape() {
        let query = PageQuery {
            since_id: None,
            max_id: Some("109".to_string()),
            exclude_types: Some(vec!["follow".to_string(), "poll".to_string()]),
        };

        assert_eq!(
            query.query_pairs(),
            vec![
                ("max_id".to_string(), "109".to_string()),
                ("exclude_types[]".to_string(), "follow".to_string()),
                ("exclude_types[]".to_string(), "poll".to_string()),
            ]
        );
    }
}
