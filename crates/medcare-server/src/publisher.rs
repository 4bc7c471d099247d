//! The publisher the server actually runs with.

use medcare_amqp::AmqpPublisher;
use medcare_core::event::{EventPublisher, UserCreationEvent};

use crate::config::BrokerConfig;

pub enum Publisher {
  Amqp(AmqpPublisher),
  /// No broker configured: events are logged and dropped.
  Disabled,
}

impl Publisher {
  /// Connect to the configured broker, or run without one when there is
  /// none.
  pub async fn connect(broker: Option<&BrokerConfig>) -> medcare_amqp::Result<Self> {
    match broker {
      Some(cfg) => {
        let amqp = AmqpPublisher::connect(&cfg.url, cfg.queues.clone()).await?;
        Ok(Publisher::Amqp(amqp))
      }
      None => {
        tracing::warn!("no [broker] configured, user-creation events are only logged");
        Ok(Publisher::Disabled)
      }
    }
  }
}

impl EventPublisher for Publisher {
  type Error = medcare_amqp::Error;

  async fn publish(&self, event: UserCreationEvent) -> Result<(), Self::Error> {
    match self {
      Publisher::Amqp(p) => p.publish(event).await,
      Publisher::Disabled => {
        tracing::info!(
          role = %event.role,
          person_id = event.person_id,
          username = %event.username,
          "user-creation event dropped, no broker"
        );
        Ok(())
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use medcare_core::entity::Role;

  use super::*;

  #[tokio::test]
  async fn without_broker_events_are_accepted_and_dropped() {
    let publisher = Publisher::connect(None).await.unwrap();
    assert!(matches!(publisher, Publisher::Disabled));

    for id in 0..1_000 {
      publisher
        .publish(UserCreationEvent::new(Role::Patient, id, "p@email.com"))
        .await
        .unwrap();
    }
    assert!(matches!(publisher, Publisher::Disabled));
  }
}
