//! MQTT over TLS [`FeedTransport`] built on `rumqttc`.
//!
//! Every `connect` spawns one event loop task for that connection. Its outcomes are forwarded
//! as [`TransportEvent`]s over an mpsc channel that the UI loop drains. Retries are owned by the
//! [`FeedSession`](stockdock_core::FeedSession): the task stops polling after its first error.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS, Transport};
use stockdock_core::{FeedConfig, FeedTransport, TransportError, TransportEvent};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Upper bound on flushing the DISCONNECT packet of a closed connection.
const DISCONNECT_FLUSH: Duration = Duration::from_millis(500);

/// Handle to the connection currently owned by the transport.
#[derive(Debug)]
struct MqttLink {
    client: AsyncClient,
    // Cleared on disconnect so the task of a closed connection delivers nothing further
    live: Arc<AtomicBool>,
    shutdown: mpsc::Sender<()>,
}

/// [`FeedTransport`] speaking MQTT 3.1.1 over TLS with server certificate verification.
#[derive(Debug)]
pub struct MqttTransport {
    events: mpsc::Sender<TransportEvent>,
    link: Option<MqttLink>,
}

impl MqttTransport {
    /// Create a transport and the receiver its [`TransportEvent`]s are delivered on.
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<TransportEvent>) {
        let (events, events_rx) = mpsc::channel(buffer);
        (Self { events, link: None }, events_rx)
    }

    /// Determine if a connection is currently owned, established or not.
    pub fn is_linked(&self) -> bool {
        self.link.is_some()
    }

    fn link(&self) -> Result<&MqttLink, TransportError> {
        self.link.as_ref().ok_or(TransportError::NotConnected)
    }

    fn close_link(&mut self) -> Result<(), TransportError> {
        let Some(link) = self.link.take() else {
            return Ok(());
        };

        link.live.store(false, Ordering::Release);
        let result = link
            .client
            .try_disconnect()
            .map_err(|error| TransportError::Disconnect(error.to_string()));
        let _ = link.shutdown.try_send(());
        result
    }
}

impl FeedTransport for MqttTransport {
    fn connect(&mut self, config: &FeedConfig) -> Result<(), TransportError> {
        let connect_error = |reason: String| TransportError::Connect {
            host: config.host.clone(),
            port: config.port,
            reason,
        };

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|error| connect_error(error.to_string()))?;

        if let Err(error) = self.close_link() {
            debug!(%error, "previous MQTT connection did not close cleanly");
        }

        let mut options = mqtt_options(config);
        options.set_transport(Transport::tls_with_default_config());

        let (client, eventloop) = AsyncClient::new(options, config.request_capacity);
        let live = Arc::new(AtomicBool::new(true));
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        info!("Connecting to MQTT broker at {}:{}", config.host, config.port);
        runtime.spawn(run_event_loop(
            eventloop,
            Endpoint {
                host: config.host.clone(),
                port: config.port,
            },
            Arc::clone(&live),
            self.events.clone(),
            shutdown_rx,
        ));

        self.link = Some(MqttLink {
            client,
            live,
            shutdown: shutdown_tx,
        });
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        self.link()?
            .client
            .try_subscribe(topic, QoS::AtMostOnce)
            .map_err(|error| TransportError::Subscribe {
                topic: topic.to_string(),
                reason: error.to_string(),
            })
    }

    fn unsubscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        self.link()?
            .client
            .try_unsubscribe(topic)
            .map_err(|error| TransportError::Unsubscribe {
                topic: topic.to_string(),
                reason: error.to_string(),
            })
    }

    fn disconnect(&mut self) -> Result<(), TransportError> {
        self.close_link()
    }
}

impl Drop for MqttTransport {
    fn drop(&mut self) {
        let _ = self.close_link();
    }
}

/// Connection options for `config`, without the TLS transport layer.
pub fn mqtt_options(config: &FeedConfig) -> MqttOptions {
    let mut options = MqttOptions::new(config.client_id.clone(), config.host.clone(), config.port);
    options
        .set_keep_alive(config.keep_alive)
        .set_credentials(config.username.clone(), config.password.clone())
        .set_clean_session(true);
    options
}

#[derive(Debug, Clone)]
struct Endpoint {
    host: String,
    port: u16,
}

/// Poll one connection until it fails, the broker closes it or the transport shuts it down.
async fn run_event_loop(
    mut eventloop: EventLoop,
    endpoint: Endpoint,
    live: Arc<AtomicBool>,
    events: mpsc::Sender<TransportEvent>,
    mut shutdown: mpsc::Receiver<()>,
) {
    let mut established = false;

    loop {
        let polled = tokio::select! {
            _ = shutdown.recv() => {
                flush_disconnect(&mut eventloop).await;
                break;
            }
            polled = eventloop.poll() => polled,
        };

        let event = match polled {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                established = true;
                info!("Connected to MQTT broker at {}:{}", endpoint.host, endpoint.port);
                TransportEvent::Connected
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                TransportEvent::Message(publish.payload.to_vec())
            }
            Ok(Event::Incoming(Packet::Disconnect)) => TransportEvent::Disconnected(Some(
                TransportError::Closed("broker sent DISCONNECT".to_string()),
            )),
            Ok(_) => continue,
            Err(error) if established => {
                TransportEvent::Disconnected(Some(TransportError::Closed(error.to_string())))
            }
            Err(error) => TransportEvent::ConnectFailed(TransportError::Connect {
                host: endpoint.host.clone(),
                port: endpoint.port,
                reason: error.to_string(),
            }),
        };

        let finished = !matches!(
            event,
            TransportEvent::Connected | TransportEvent::Message(_)
        );

        if !live.load(Ordering::Acquire) {
            break;
        }
        if events.send(event).await.is_err() {
            warn!("Transport event receiver dropped, stopping MQTT event loop");
            break;
        }
        if finished {
            break;
        }
    }

    debug!(host = %endpoint.host, "MQTT event loop stopped");
}

/// Drive the event loop until the queued DISCONNECT has been written, or give up.
async fn flush_disconnect(eventloop: &mut EventLoop) {
    let flushed = tokio::time::timeout(DISCONNECT_FLUSH, async {
        loop {
            match eventloop.poll().await {
                Ok(Event::Outgoing(Outgoing::Disconnect)) | Err(_) => break,
                Ok(_) => {}
            }
        }
    })
    .await;

    if flushed.is_err() {
        debug!("timed out flushing MQTT DISCONNECT");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mqtt_options_from_feed_config() {
        let config = FeedConfig::new("broker.local", 8883)
            .with_client_id("kiosk-7")
            .with_credentials("user", "pass");

        let options = mqtt_options(&config);

        assert_eq!(
            options.broker_address(),
            ("broker.local".to_string(), 8883)
        );
        assert_eq!(options.client_id(), "kiosk-7");
        assert_eq!(options.keep_alive(), Duration::from_secs(60));
        assert!(options.clean_session());
    }

    #[test]
    fn test_requests_without_connection() {
        let (mut transport, _events) = MqttTransport::new(8);

        assert_eq!(
            transport.subscribe("topic"),
            Err(TransportError::NotConnected)
        );
        assert_eq!(
            transport.unsubscribe("topic"),
            Err(TransportError::NotConnected)
        );
        assert_eq!(transport.disconnect(), Ok(()));
        assert!(!transport.is_linked());
    }

    #[test]
    fn test_connect_outside_runtime_is_reported() {
        let (mut transport, _events) = MqttTransport::new(8);
        let config = FeedConfig::new("broker.local", 8883);

        let result = transport.connect(&config);

        assert!(matches!(
            result,
            Err(TransportError::Connect { ref host, port: 8883, .. }) if host == "broker.local"
        ));
        assert!(!transport.is_linked());
    }
}
