//! Simulator configuration and topic constants.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BROKER: &str = "tcp://test.mosquitto.org:1883";
pub const DEFAULT_FIXTURE: &str = "testdata.ccsds";
pub const DEFAULT_PACKET_INTERVAL_MS: u64 = 1000;

pub const TM_PACKET_TOPIC: &str = "yamcs-tm-packets";
pub const TC_PACKET_TOPIC: &str = "yamcs-tc-packets";
pub const TM_FRAME_TOPIC: &str = "yamcs-tm-frames";
pub const TC_FRAME_TOPIC: &str = "yamcs-tc-frames";

#[derive(Debug, Clone)]
pub struct TopicConfig {
    pub tm_packet: String,
    pub tc_packet: String,
    pub tm_frame: String,
    pub tc_frame: String,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            tm_packet: TM_PACKET_TOPIC.to_string(),
            tc_packet: TC_PACKET_TOPIC.to_string(),
            tm_frame: TM_FRAME_TOPIC.to_string(),
            tc_frame: TC_FRAME_TOPIC.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Broker address with a `tcp://`, `ssl://` or `tls://` scheme.
    pub broker: String,
    /// Recorded CCSDS packet file replayed as telemetry.
    pub fixture: PathBuf,
    /// Pause between telemetry packets; emulates link cadence.
    pub packet_interval: Duration,
    pub topics: TopicConfig,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            broker: DEFAULT_BROKER.to_string(),
            fixture: PathBuf::from(DEFAULT_FIXTURE),
            packet_interval: Duration::from_millis(DEFAULT_PACKET_INTERVAL_MS),
            topics: TopicConfig::default(),
        }
    }
}
