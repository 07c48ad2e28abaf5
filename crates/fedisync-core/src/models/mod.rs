pub mod account;
pub mod feed_item;
pub mod notification;
pub mod pending;
pub mod status;

#[cfg(test)]
pub(crate) mod fixtures;

pub use account::Account;
pub use feed_item::FeedItem;
pub use notification::{Notification, NotificationType};
pub use pending::PendingEntry;
pub use status::{Status, Visibility};
