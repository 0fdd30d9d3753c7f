//! Telemetry producer: replays the recorded packet stream onto the bus,
//! one packet per interval, framing each packet on the way out.

use std::io::Read;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::time;
use tracing::{debug, error, info, warn};

use crate::bus::BusClient;
use crate::config::SimulatorConfig;
use crate::frame;
use crate::leaf::LeafEnvelope;
use crate::source::PacketSource;
use crate::stats::LinkStats;

/// Run the producer loop until the fixture is exhausted or shutdown is
/// signaled.
///
/// Per iteration: publish the raw packet, then attempt a transfer frame
/// with the current TM-frame count as sequence number. A packet too
/// large for the frame only skips frame emission; the raw publish has
/// already happened. Stream truncation is terminal.
pub async fn run<R: Read>(
    mut source: PacketSource<R>,
    bus: BusClient,
    config: SimulatorConfig,
    stats: Arc<LinkStats>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        if *shutdown.borrow() {
            break;
        }

        let packet = match source.next_packet() {
            Ok(Some(packet)) => packet,
            Ok(None) => {
                info!(
                    "packet stream exhausted after {} packets",
                    source.packets_read()
                );
                break;
            }
            Err(e) => {
                error!("telemetry stream read failed: {}", e);
                break;
            }
        };

        if let Err(e) = bus.publish(&config.topics.tm_packet, packet.clone()).await {
            error!("failed to publish TM packet: {}", e);
            break;
        }
        stats.record_tm_packet();

        match frame::build_frame(&packet, stats.tm_frame_count() as u32) {
            Ok(frame) => match LeafEnvelope::wrap(&frame).to_json() {
                Ok(json) => {
                    debug!("sending frame {}", json);
                    if let Err(e) = bus.publish(&config.topics.tm_frame, json).await {
                        error!("failed to publish TM frame: {}", e);
                        break;
                    }
                    stats.record_tm_frame();
                }
                Err(e) => warn!("failed to encode frame envelope: {}", e),
            },
            Err(e) => {
                warn!("skipping frame for {}-byte packet: {}", packet.len(), e);
            }
        }

        tokio::select! {
            _ = time::sleep(config.packet_interval) => {}
            _ = shutdown.changed() => break,
        }
    }
    debug!("telemetry producer stopped");
}
