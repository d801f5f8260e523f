//! Background badge refresh

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::feed::NotificationFeed;
use crate::http::FeedApi;

/// Refreshes a feed's badge on a fixed interval until stopped
///
/// The first refresh happens immediately.
pub struct CountPoller {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl CountPoller {
    pub fn spawn<A>(feed: Arc<Mutex<NotificationFeed<A>>>, every: Duration) -> Self
    where
        A: FeedApi + 'static,
    {
        let (shutdown, mut stop) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        feed.lock().await.refresh_count().await;
                    }
                    _ = stop.changed() => break,
                }
            }
            tracing::debug!("Count poller stopped");
        });
        Self { shutdown, handle }
    }

    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "Count poller task failed");
        }
    }
}
