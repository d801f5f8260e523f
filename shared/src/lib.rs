//! Shared types for Tableside
//!
//! Domain models, the unified error system and small utilities used by
//! both the notification server and the admin feed client.

pub mod error;
pub mod models;
pub mod util;

pub use error::{ApiResponse, AppError, ErrorCode};
