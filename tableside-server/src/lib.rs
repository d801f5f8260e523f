//! Tableside notification server
//!
//! Turns table-side guest events (waiter calls, valet requests, table
//! notes) into tenant-scoped staff notifications and serves the admin feed.

pub mod api;
pub mod config;
pub mod db;
pub mod directory;
pub mod error;
pub mod logger;
pub mod middleware;
pub mod notifications;
pub mod state;
pub mod tenant;

pub use config::Config;
pub use state::AppState;
