pub mod db;
pub mod pending_ledger;
pub mod timeline_cache;

pub use db::Database;
pub use pending_ledger::{ConfirmFeedback, PendingLedger};
pub use timeline_cache::{CacheRecord, TimelineCache};
