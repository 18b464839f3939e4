// Topic feed - Bridges store subscriptions onto a bounded channel for streaming clients
use crate::application::telemetry_store::{SubscriberHandle, TelemetryStore};
use crate::domain::telemetry::{Topic, TopicUpdate};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Live subscription for one topic. Dropping it unsubscribes.
pub struct TopicFeed {
    store: TelemetryStore,
    topic: Topic,
    handler: SubscriberHandle,
}

impl TopicFeed {
    /// Subscribes to `topic` and returns the feed together with its receiving end.
    /// The current snapshot is queued first so a new client starts with full state.
    pub fn open(
        store: &TelemetryStore,
        topic: Topic,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<TopicUpdate>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let _ = tx.try_send(store.snapshot(topic));

        let handler: SubscriberHandle = Arc::new(move |update: &TopicUpdate| {
            if let Err(TrySendError::Full(_)) = tx.try_send(update.clone()) {
                tracing::warn!(topic = %update.topic(), "stream client lagging, dropping update");
            }
        });
        store.subscribe(topic, handler.clone());
        tracing::debug!(%topic, "topic feed opened");

        let feed = Self {
            store: store.clone(),
            topic,
            handler,
        };
        (feed, rx)
    }
}

impl Drop for TopicFeed {
    fn drop(&mut self) {
        self.store.unsubscribe(self.topic, &self.handler);
        tracing::debug!(topic = %self.topic, "topic feed closed");
    }
}
