//! Domain models shared by the server and the feed client

pub mod event;
pub mod notification;
pub mod table;

pub use event::EventAccepted;
pub use notification::{
    MarkAllSeen, NewNotification, Notification, NotificationCountResponse, NotificationList,
    NotificationPriority, NotificationStatus, NotificationType, Pagination, StatusCounts,
    StatusUpdate, StatusUpdated, UnknownVariant,
};
pub use table::TableInfo;
