//! Staff notifications: type-specific construction and the create/suppress policy

pub mod builders;
pub mod policy;

pub use builders::{ValetInput, normalize_valet_table_id};
pub use policy::{NotificationOutcome, NotificationPolicy, PolicyWindows, SuppressReason};
