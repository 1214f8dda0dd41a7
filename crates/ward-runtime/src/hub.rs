use serde_json::Value;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 256;

/// Process-wide fan-out of normalized session snapshots to `/ws/sessions`
/// subscribers (spec §4.5 "Broadcast model"). A lagging or dropped
/// receiver is the subscriber's problem, not the publisher's — broadcasts
/// are best-effort; durability lives entirely in C1.
pub struct Hub {
    sender: broadcast::Sender<Value>,
}

impl Default for Hub {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Best-effort; a channel with zero live subscribers still succeeds
    /// (the `Err` case only means nobody is listening right now).
    pub fn publish(&self, session_snapshot: Value) {
        let _ = self.sender.send(session_snapshot);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Value> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn subscriber_receives_published_snapshot() {
        let hub = Hub::new();
        let mut rx = hub.subscribe();
        hub.publish(json!({"session_id": "s1"}));
        let received = rx.recv().await.unwrap();
        assert_eq!(received, json!({"session_id": "s1"}));
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_does_not_panic() {
        let hub = Hub::new();
        hub.publish(json!({"session_id": "s1"}));
    }
}
