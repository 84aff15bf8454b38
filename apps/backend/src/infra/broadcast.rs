//! Event fan-out abstraction.
//!
//! The engine only knows `publish` / `publish_to_user`; the in-process bus
//! below serves single-node deployments and tests. A broker-backed
//! implementation (e.g. Redis pub/sub) can replace it without touching the
//! services.

use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::debug;

use crate::events::GameEvent;

pub trait EventPublisher: Send + Sync {
    /// Deliver to every subscriber of a topic. Publishing to a topic with
    /// no subscribers is a no-op, never an error.
    fn publish(&self, topic: &str, event: GameEvent);

    /// Deliver to one user's private channel.
    fn publish_to_user(&self, user_key: &str, channel: &str, event: GameEvent);
}

const CHANNEL_CAPACITY: usize = 256;

/// Tokio-broadcast-backed bus keyed by topic string.
#[derive(Default)]
pub struct InProcessEventBus {
    topics: DashMap<String, broadcast::Sender<GameEvent>>,
}

impl InProcessEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a topic, creating it lazily.
    pub fn subscribe(&self, topic: &str) -> broadcast::Receiver<GameEvent> {
        self.topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Subscribe to a user's private channel.
    pub fn subscribe_user(&self, user_key: &str, channel: &str) -> broadcast::Receiver<GameEvent> {
        self.subscribe(&user_channel_key(user_key, channel))
    }

    fn send(&self, key: &str, event: GameEvent) {
        if let Some(sender) = self.topics.get(key) {
            // A send error only means nobody is listening right now.
            let delivered = sender.send(event).unwrap_or(0);
            debug!(topic = %key, delivered, "event published");
        } else {
            debug!(topic = %key, "event dropped, no subscribers");
        }
    }
}

fn user_channel_key(user_key: &str, channel: &str) -> String {
    format!("user/{user_key}/{channel}")
}

impl EventPublisher for InProcessEventBus {
    fn publish(&self, topic: &str, event: GameEvent) {
        self.send(topic, event);
    }

    fn publish_to_user(&self, user_key: &str, channel: &str, event: GameEvent) {
        self.send(&user_channel_key(user_key, channel), event);
    }
}
