//! Tableside Client - admin notification feed
//!
//! Polls the notification server for the badge count, loads the dropdown
//! list on demand and marks notifications as seen with optimistic updates.

pub mod config;
pub mod display;
pub mod error;
pub mod feed;
pub mod http;
pub mod poller;

pub use config::ClientConfig;
pub use display::{FeedRow, display_text};
pub use error::{ClientError, ClientResult};
pub use feed::{ListState, NotificationFeed, SEEN_FAILED_ALERT};
pub use http::{FeedApi, NetworkFeedApi};
pub use poller::CountPoller;
