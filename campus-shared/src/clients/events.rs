use std::sync::Mutex;

use serde::Serialize;
use uuid::Uuid;

use crate::clients::rabbitmq::RabbitMQClient;
use crate::types::Event;

/// Destination for domain events.
#[axum::async_trait]
pub trait EventSink: Send + Sync {
    async fn dispatch(&self, routing_key: &str, event: Event<serde_json::Value>) -> anyhow::Result<()>;

    /// Whether the sink can currently accept events.
    fn is_ready(&self) -> bool {
        true
    }
}

#[axum::async_trait]
impl EventSink for RabbitMQClient {
    async fn dispatch(&self, routing_key: &str, event: Event<serde_json::Value>) -> anyhow::Result<()> {
        RabbitMQClient::publish(self, routing_key, &event).await?;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.is_connected()
    }
}

/// Discards every event. Used when no broker is configured.
pub struct NoopSink;

#[axum::async_trait]
impl EventSink for NoopSink {
    async fn dispatch(&self, routing_key: &str, event: Event<serde_json::Value>) -> anyhow::Result<()> {
        tracing::debug!(routing_key = %routing_key, event_id = %event.id, "event dropped, no broker");
        Ok(())
    }
}

/// Keeps published events in memory.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(String, Event<serde_json::Value>)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routing_keys(&self) -> Vec<String> {
        self.lock().iter().map(|(key, _)| key.clone()).collect()
    }

    pub fn events_for(&self, routing_key: &str) -> Vec<Event<serde_json::Value>> {
        self.lock()
            .iter()
            .filter(|(key, _)| key == routing_key)
            .map(|(_, event)| event.clone())
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(String, Event<serde_json::Value>)>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[axum::async_trait]
impl EventSink for RecordingSink {
    async fn dispatch(&self, routing_key: &str, event: Event<serde_json::Value>) -> anyhow::Result<()> {
        self.lock().push((routing_key.to_string(), event));
        Ok(())
    }
}

/// Wraps `data` in an envelope and publishes it. Failures are logged, not returned.
pub async fn emit<T: Serialize>(
    sink: &dyn EventSink,
    source: &str,
    routing_key: &str,
    user_id: Uuid,
    data: T,
) {
    let data = match serde_json::to_value(data) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(error = %e, routing_key = %routing_key, "failed to serialize event payload");
            return;
        }
    };
    let event = Event::new(source, routing_key, data).with_user(user_id);

    if let Err(e) = sink.dispatch(routing_key, event).await {
        tracing::error!(error = %e, routing_key = %routing_key, "failed to publish event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::event::{payloads, routing_keys};

    #[tokio::test]
    async fn emit_wraps_payload_in_envelope() {
        let sink = RecordingSink::new();
        let user = Uuid::new_v4();
        let payload = payloads::MatchCreated {
            match_id: Uuid::new_v4(),
            user1_id: user,
            user2_id: Uuid::new_v4(),
        };

        emit(&sink, "campus-dating", routing_keys::DATING_MATCH_CREATED, user, payload.clone()).await;

        let events = sink.events_for(routing_keys::DATING_MATCH_CREATED);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].source, "campus-dating");
        assert_eq!(events[0].event_type, routing_keys::DATING_MATCH_CREATED);
        assert_eq!(events[0].user_id, Some(user));
        assert_eq!(events[0].data["match_id"], payload.match_id.to_string());
    }

    #[tokio::test]
    async fn noop_sink_accepts_everything() {
        let sink = NoopSink;
        assert!(sink.is_ready());
        emit(&sink, "campus-wallet", routing_keys::WALLET_GOAL_CREATED, Uuid::new_v4(), 1).await;
    }
}
