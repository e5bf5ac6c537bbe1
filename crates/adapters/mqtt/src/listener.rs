//! Shadow listener — drives the client's event loop, (re)subscribing to the
//! shadow topics on every connection and handing each parsed event to a
//! [`ShadowEventHandler`].
//!
//! Each message is handled on its own task: one slow handler (a confirmation
//! echo, a weather lookup) never holds up the next delivery.

use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, Packet, Publish, QoS};

use gardenhub_app::ports::ShadowEventHandler;
use gardenhub_domain::shadow::ShadowEvent;

use crate::config::MqttConfig;
use crate::error::MqttError;

/// Accepts topic subscriptions without waiting on the event loop.
trait Subscriber {
    fn subscribe_topic(&self, topic: &str) -> Result<(), MqttError>;
}

impl Subscriber for AsyncClient {
    // The caller is the task polling the event loop, so a blocking send on a
    // full request queue would never complete.
    fn subscribe_topic(&self, topic: &str) -> Result<(), MqttError> {
        self.try_subscribe(topic, QoS::AtLeastOnce)?;
        Ok(())
    }
}

pub struct ShadowListener<H> {
    handler: Arc<H>,
    topics: [String; 2],
    reconnect_delay: Duration,
}

impl<H> ShadowListener<H>
where
    H: ShadowEventHandler + 'static,
{
    #[must_use]
    pub fn new(handler: Arc<H>, config: &MqttConfig) -> Self {
        Self {
            handler,
            topics: [config.desired_topic.clone(), config.reported_topic.clone()],
            reconnect_delay: config.reconnect_delay(),
        }
    }

    /// Parse a publish received on one of the shadow topics.
    ///
    /// Returns `Ok(None)` for topics this listener does not own.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::PayloadParse`] for a malformed envelope.
    pub fn decode(&self, publish: &Publish) -> Result<Option<ShadowEvent>, MqttError> {
        if !self.topics.iter().any(|topic| *topic == publish.topic) {
            return Ok(None);
        }
        Ok(Some(ShadowEvent::from_slice(&publish.payload)?))
    }

    /// Drive `eventloop` forever.
    ///
    /// The broker drops subscriptions with the clean session, so every
    /// `ConnAck` subscribes `client` to the shadow topics again. Connection
    /// errors are logged and retried after the reconnect delay; rumqttc
    /// reconnects on the next poll.
    pub async fn run(self, client: AsyncClient, mut eventloop: EventLoop) {
        loop {
            match eventloop.poll().await {
                Ok(event) => self.on_event(&client, event),
                Err(err) => {
                    tracing::warn!(error = %err, "MQTT connection error, retrying");
                    tokio::time::sleep(self.reconnect_delay).await;
                }
            }
        }
    }

    fn on_event<S: Subscriber>(&self, subscriber: &S, event: Event) {
        match event {
            Event::Incoming(Packet::Publish(publish)) => self.dispatch(&publish),
            Event::Incoming(Packet::ConnAck(_)) => {
                tracing::info!("connected to MQTT broker");
                if let Err(err) = self.subscribe(subscriber) {
                    tracing::error!(error = %err, "subscribing to shadow topics failed");
                }
            }
            _ => {}
        }
    }

    fn subscribe<S: Subscriber>(&self, subscriber: &S) -> Result<(), MqttError> {
        for topic in &self.topics {
            subscriber.subscribe_topic(topic)?;
            tracing::info!(topic = %topic, "subscribed to shadow topic");
        }
        Ok(())
    }

    fn dispatch(&self, publish: &Publish) {
        let event = match self.decode(publish) {
            Ok(Some(event)) => event,
            Ok(None) => return,
            Err(err) => {
                tracing::warn!(
                    topic = %publish.topic,
                    error = %err,
                    "dropping malformed shadow payload"
                );
                return;
            }
        };

        let handler = Arc::clone(&self.handler);
        tokio::spawn(async move {
            if let Err(err) = handler.handle(event).await {
                tracing::warn!(
                    action = %event.action(),
                    device_id = %event.device_id(),
                    error = %err,
                    "shadow event handling failed"
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connect;
    use gardenhub_domain::error::GardenHubError;
    use gardenhub_domain::id::DeviceId;
    use rumqttc::{ConnAck, ConnectReturnCode};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<ShadowEvent>>,
    }

    impl ShadowEventHandler for Recorder {
        async fn handle(&self, event: ShadowEvent) -> Result<(), GardenHubError> {
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }

    fn listener() -> (ShadowListener<Recorder>, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        (
            ShadowListener::new(Arc::clone(&recorder), &MqttConfig::default()),
            recorder,
        )
    }

    #[test]
    fn should_decode_reported_event_from_reported_topic() {
        let (listener, _) = listener();
        let event = ShadowEvent::reported(DeviceId::new(), true);
        let publish = Publish::new("device/reported", QoS::AtLeastOnce, event.to_vec());

        assert_eq!(listener.decode(&publish).unwrap(), Some(event));
    }

    #[test]
    fn should_ignore_foreign_topics() {
        let (listener, _) = listener();
        let event = ShadowEvent::reported(DeviceId::new(), true);
        let publish = Publish::new("device/notifications", QoS::AtLeastOnce, event.to_vec());

        assert_eq!(listener.decode(&publish).unwrap(), None);
    }

    #[test]
    fn should_reject_malformed_payload() {
        let (listener, _) = listener();
        let publish = Publish::new("device/desired", QoS::AtLeastOnce, b"{\"state\":{}}".to_vec());

        assert!(matches!(
            listener.decode(&publish),
            Err(MqttError::PayloadParse(_))
        ));
    }

    #[tokio::test]
    async fn should_hand_decoded_events_to_handler() {
        let (listener, recorder) = listener();
        let event = ShadowEvent::desired(DeviceId::new(), false);

        listener.dispatch(&Publish::new("device/desired", QoS::AtLeastOnce, event.to_vec()));
        tokio::task::yield_now().await;

        assert_eq!(*recorder.events.lock().unwrap(), vec![event]);
    }

    #[derive(Default)]
    struct RecordingSubscriber {
        topics: Mutex<Vec<String>>,
    }

    impl Subscriber for RecordingSubscriber {
        fn subscribe_topic(&self, topic: &str) -> Result<(), MqttError> {
            self.topics.lock().unwrap().push(topic.to_string());
            Ok(())
        }
    }

    fn connack() -> Event {
        Event::Incoming(Packet::ConnAck(ConnAck::new(
            ConnectReturnCode::Success,
            false,
        )))
    }

    #[test]
    fn should_subscribe_on_every_connack() {
        let (listener, _) = listener();
        let subscriber = RecordingSubscriber::default();

        listener.on_event(&subscriber, connack());
        listener.on_event(&subscriber, Event::Incoming(Packet::PingResp));
        listener.on_event(&subscriber, connack());

        assert_eq!(
            *subscriber.topics.lock().unwrap(),
            vec![
                "device/desired",
                "device/reported",
                "device/desired",
                "device/reported"
            ]
        );
    }

    #[tokio::test]
    async fn should_route_incoming_publish_to_handler() {
        let (listener, recorder) = listener();
        let subscriber = RecordingSubscriber::default();
        let event = ShadowEvent::reported(DeviceId::new(), true);

        listener.on_event(
            &subscriber,
            Event::Incoming(Packet::Publish(Publish::new(
                "device/reported",
                QoS::AtLeastOnce,
                event.to_vec(),
            ))),
        );
        tokio::task::yield_now().await;

        assert_eq!(*recorder.events.lock().unwrap(), vec![event]);
        assert!(subscriber.topics.lock().unwrap().is_empty());
    }

    #[test]
    fn should_queue_subscriptions_on_live_client() {
        let (listener, _) = listener();
        let (client, _eventloop) = connect(&MqttConfig::default());

        listener.subscribe(&client).unwrap();
    }

    #[test]
    fn should_fail_subscription_when_event_loop_is_gone() {
        let (listener, _) = listener();
        let (client, eventloop) = connect(&MqttConfig::default());
        drop(eventloop);

        assert!(matches!(
            listener.subscribe(&client),
            Err(MqttError::Client(_))
        ));
    }
}
