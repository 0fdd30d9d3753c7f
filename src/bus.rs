//! MQTT glue: broker URL parsing, client construction, publishing, and
//! the delivery loop feeding inbound telecommands to the link counters.

use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, ClientError, Event, EventLoop, MqttOptions, Packet, QoS, Transport};
use thiserror::Error;
use tokio::sync::watch;
use tokio::time;
use tracing::{debug, info, warn};

use crate::config::{SimulatorConfig, TopicConfig};
use crate::stats::LinkStats;

const MQTT_CHANNEL_CAPACITY: usize = 16;
const RECONNECT_PAUSE: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum BusError {
    #[error("broker URL {0:?} must start with tcp://, ssl:// or tls://")]
    UnsupportedScheme(String),
    #[error("broker URL {0:?} is missing a port")]
    MissingPort(String),
    #[error("invalid broker port {0:?}")]
    InvalidPort(String),
    #[error("MQTT client error: {0}")]
    Client(#[from] ClientError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerAddr {
    pub host: String,
    pub port: u16,
    pub tls: bool,
}

pub fn parse_broker_url(url: &str) -> Result<BrokerAddr, BusError> {
    let (rest, tls) = if let Some(rest) = url.strip_prefix("tcp://") {
        (rest, false)
    } else if let Some(rest) = url
        .strip_prefix("ssl://")
        .or_else(|| url.strip_prefix("tls://"))
    {
        (rest, true)
    } else {
        return Err(BusError::UnsupportedScheme(url.to_string()));
    };

    let (host, port) = rest
        .rsplit_once(':')
        .ok_or_else(|| BusError::MissingPort(url.to_string()))?;
    let port = port
        .parse::<u16>()
        .map_err(|_| BusError::InvalidPort(port.to_string()))?;

    Ok(BrokerAddr {
        host: host.to_string(),
        port,
        tls,
    })
}

/// Cloneable publish handle; the paired [`EventLoop`] must be driven by
/// [`run_delivery_loop`] for any traffic to flow.
#[derive(Debug, Clone)]
pub struct BusClient {
    client: AsyncClient,
}

impl BusClient {
    pub fn connect(config: &SimulatorConfig) -> Result<(Self, EventLoop), BusError> {
        let addr = parse_broker_url(&config.broker)?;
        info!(
            "connecting to broker {} on port {} (TLS: {})",
            addr.host, addr.port, addr.tls
        );

        let client_id = format!("linksim-{}", std::process::id());
        let mut options = MqttOptions::new(client_id, addr.host, addr.port);
        options.set_keep_alive(Duration::from_secs(60));
        options.set_clean_session(true);
        if addr.tls {
            options.set_transport(Transport::tls_with_default_config());
        }

        let (client, event_loop) = AsyncClient::new(options, MQTT_CHANNEL_CAPACITY);
        Ok((Self { client }, event_loop))
    }

    /// Fire-and-forget publish; no delivery acknowledgment is awaited.
    pub async fn publish(&self, topic: &str, payload: impl Into<Vec<u8>>) -> Result<(), BusError> {
        self.client
            .publish(topic, QoS::AtMostOnce, false, payload.into())
            .await?;
        Ok(())
    }

    pub async fn subscribe(&self, topic: &str) -> Result<(), BusError> {
        self.client.subscribe(topic, QoS::ExactlyOnce).await?;
        Ok(())
    }

    pub async fn disconnect(&self) {
        if let Err(e) = self.client.disconnect().await {
            debug!("MQTT disconnect failed: {}", e);
        }
    }
}

/// Drive the MQTT event loop until shutdown, dispatching inbound
/// telecommand messages to the counters.
///
/// The handlers only store the payload and bump a counter, so the
/// deliverer is never blocked.
pub async fn run_delivery_loop(
    mut event_loop: EventLoop,
    topics: TopicConfig,
    stats: Arc<LinkStats>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            event = event_loop.poll() => match event {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    info!("connected to MQTT broker");
                }
                Ok(Event::Incoming(Packet::SubAck(_))) => {
                    debug!("telecommand subscription acknowledged");
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    let payload = publish.payload.to_vec();
                    if publish.topic == topics.tc_packet {
                        debug!("received {}-byte TC packet", payload.len());
                        stats.record_tc_packet(payload);
                    } else if publish.topic == topics.tc_frame {
                        debug!("received {}-byte TC frame", payload.len());
                        stats.record_tc_frame(payload);
                    } else {
                        debug!("ignoring message on unexpected topic {}", publish.topic);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("MQTT connection error: {}", e);
                    // The event loop reconnects on the next poll; pace the retries.
                    time::sleep(RECONNECT_PAUSE).await;
                }
            },
            _ = shutdown.changed() => break,
        }
    }
    debug!("delivery loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tcp_broker() {
        let addr = parse_broker_url("tcp://test.mosquitto.org:1883").unwrap();
        assert_eq!(
            addr,
            BrokerAddr {
                host: "test.mosquitto.org".to_string(),
                port: 1883,
                tls: false,
            }
        );
    }

    #[test]
    fn test_parse_tls_brokers() {
        assert!(parse_broker_url("ssl://broker.example:8883").unwrap().tls);
        assert!(parse_broker_url("tls://broker.example:8883").unwrap().tls);
    }

    #[test]
    fn test_rejects_unknown_scheme() {
        assert!(matches!(
            parse_broker_url("mqtt://broker.example:1883"),
            Err(BusError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_rejects_missing_or_bad_port() {
        assert!(matches!(
            parse_broker_url("tcp://broker.example"),
            Err(BusError::MissingPort(_))
        ));
        assert!(matches!(
            parse_broker_url("tcp://broker.example:ninety"),
            Err(BusError::InvalidPort(_))
        ));
    }
}
