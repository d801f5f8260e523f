//! Notification dropdown state
//!
//! Holds the badge count and the open dropdown's list. "Seen" is applied
//! optimistically: the row disappears and the badge drops before the
//! server answers, and both are restored if the request fails.

use shared::models::Notification;

use crate::display::FeedRow;
use crate::http::FeedApi;

pub const SEEN_FAILED_ALERT: &str = "Failed to mark as seen.";

/// What the dropdown body shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListState {
    /// Never loaded
    #[default]
    Idle,
    Ready,
    Empty,
    /// Last load failed
    Error,
}

pub struct NotificationFeed<A: FeedApi> {
    api: A,
    badge: i64,
    open: bool,
    items: Vec<Notification>,
    state: ListState,
    alert: Option<String>,
}

impl<A: FeedApi> NotificationFeed<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            badge: 0,
            open: false,
            items: Vec::new(),
            state: ListState::Idle,
            alert: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Badge text; `None` hides the badge
    pub fn badge(&self) -> Option<i64> {
        (self.badge > 0).then_some(self.badge)
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn list_state(&self) -> ListState {
        self.state
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn rows(&self) -> Vec<FeedRow> {
        self.items.iter().map(FeedRow::from).collect()
    }

    /// Pending alert for the user, cleared on read
    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    /// Refresh the badge from the count endpoint
    ///
    /// Failures keep the previous badge and are only logged.
    pub async fn refresh_count(&mut self) {
        match self.api.count().await {
            Ok(counts) => self.badge = counts.new.max(0),
            Err(e) => tracing::warn!(error = %e, "Notification count refresh failed"),
        }
    }

    /// Open the dropdown and load its list
    ///
    /// The feed has a single dropdown; opening it again just reloads.
    pub async fn open(&mut self) {
        self.open = true;
        self.load_list().await;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub async fn toggle(&mut self) {
        if self.open {
            self.close();
        } else {
            self.open().await;
        }
    }

    async fn load_list(&mut self) {
        self.items.clear();
        match self.api.list_new().await {
            Ok(mut items) => {
                items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
                self.state = if items.is_empty() {
                    ListState::Empty
                } else {
                    ListState::Ready
                };
                self.items = items;
            }
            Err(e) => {
                tracing::error!(error = %e, "Notification list load failed");
                self.state = ListState::Error;
            }
        }
    }

    /// Mark one notification as seen
    ///
    /// Returns `false` when the server rejected the update, in which case
    /// the row and badge are back where they were and an alert is pending.
    pub async fn mark_seen(&mut self, id: i64) -> bool {
        let Some(index) = self.items.iter().position(|n| n.id == id) else {
            return false;
        };
        let removed = self.items.remove(index);
        let previous_badge = self.badge;
        self.badge = (self.badge - 1).max(0);
        if self.items.is_empty() {
            self.state = ListState::Empty;
        }

        match self.api.mark_seen(id).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(notification_id = id, error = %e, "Mark as seen failed");
                self.items.insert(index, removed);
                self.badge = previous_badge;
                self.state = ListState::Ready;
                self.alert = Some(SEEN_FAILED_ALERT.to_string());
                false
            }
        }
    }
}
