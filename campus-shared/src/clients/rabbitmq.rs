use lapin::options::{BasicPublishOptions, ConfirmSelectOptions, ExchangeDeclareOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind};
use serde::Serialize;

use crate::types::Event;

/// Topic exchange every campus service publishes to.
pub const EXCHANGE_NAME: &str = "campus.events";

const PERSISTENT: u8 = 2;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("event could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("broker error: {0}")]
    Broker(#[from] lapin::Error),
    #[error("broker rejected event {0}")]
    Rejected(uuid::Uuid),
}

/// A confirm-mode channel on the campus exchange.
#[derive(Clone)]
pub struct RabbitMQClient {
    channel: Channel,
}

impl RabbitMQClient {
    /// Opens a connection named after `service`, declares the exchange and
    /// switches the channel into publisher-confirm mode.
    pub async fn connect(url: &str, service: &str) -> Result<Self, lapin::Error> {
        let properties = ConnectionProperties::default().with_connection_name(service.to_string().into());
        let conn = Connection::connect(url, properties).await?;
        let channel = conn.create_channel().await?;

        let durable = ExchangeDeclareOptions { durable: true, ..Default::default() };
        channel
            .exchange_declare(EXCHANGE_NAME, ExchangeKind::Topic, durable, FieldTable::default())
            .await?;
        channel.confirm_select(ConfirmSelectOptions::default()).await?;

        tracing::info!(exchange = EXCHANGE_NAME, service, "broker channel ready");
        Ok(Self { channel })
    }

    /// Publishes `event` and waits for the broker's ack.
    pub async fn publish<T: Serialize>(&self, routing_key: &str, event: &Event<T>) -> Result<(), PublishError> {
        let body = serde_json::to_vec(event)?;

        let confirmation = self
            .channel
            .basic_publish(
                EXCHANGE_NAME,
                routing_key,
                BasicPublishOptions::default(),
                &body,
                message_properties(event),
            )
            .await?
            .await?;
        if confirmation.is_nack() {
            return Err(PublishError::Rejected(event.id));
        }

        tracing::debug!(routing_key, event_id = %event.id, bytes = body.len(), "event acked");
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.channel.status().connected()
    }
}

/// AMQP properties mirroring the envelope, so consumers can route and dedupe
/// without decoding the body.
fn message_properties<T: Serialize>(event: &Event<T>) -> BasicProperties {
    let mut props = BasicProperties::default()
        .with_content_type("application/json".into())
        .with_delivery_mode(PERSISTENT)
        .with_message_id(event.id.to_string().into())
        .with_type(event.event_type.clone().into())
        .with_app_id(event.source.clone().into())
        .with_timestamp(event.timestamp.timestamp().max(0) as u64);
    if let Some(correlation_id) = event.correlation_id {
        props = props.with_correlation_id(correlation_id.to_string().into());
    }
    props
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::event::routing_keys;

    #[test]
    fn properties_carry_envelope_metadata() {
        let correlation = uuid::Uuid::new_v4();
        let event = Event::new("campus-wallet", routing_keys::WALLET_GOAL_CREATED, 7).with_correlation(correlation);

        let props = message_properties(&event);

        let id = event.id.to_string();
        let correlation = correlation.to_string();
        assert_eq!(props.message_id().as_ref().map(|s| s.as_str()), Some(id.as_str()));
        assert_eq!(props.kind().as_ref().map(|s| s.as_str()), Some(routing_keys::WALLET_GOAL_CREATED));
        assert_eq!(props.app_id().as_ref().map(|s| s.as_str()), Some("campus-wallet"));
        assert_eq!(props.correlation_id().as_ref().map(|s| s.as_str()), Some(correlation.as_str()));
        assert_eq!(*props.delivery_mode(), Some(PERSISTENT));
        assert_eq!(*props.timestamp(), Some(event.timestamp.timestamp() as u64));
    }

    #[test]
    fn correlation_is_optional() {
        let event = Event::new("campus-dating", routing_keys::DATING_SWIPE_RECORDED, ());
        assert!(message_properties(&event).correlation_id().is_none());
    }
}
