//! Simulator orchestration: wires the packet source, the bus client,
//! the producer task and the delivery task together, and owns
//! cooperative shutdown.

use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::bus::{self, BusClient, BusError};
use crate::config::SimulatorConfig;
use crate::producer;
use crate::source::PacketSource;
use crate::stats::{LinkStats, StatsSnapshot};

#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("cannot open packet fixture {path}: {source}")]
    Fixture {
        path: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    Bus(#[from] BusError),
}

pub struct Simulator {
    config: SimulatorConfig,
    stats: Arc<LinkStats>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    bus: Option<BusClient>,
    tasks: Vec<JoinHandle<()>>,
}

impl Simulator {
    pub fn new(config: SimulatorConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            config,
            stats: Arc::new(LinkStats::new()),
            shutdown_tx,
            shutdown_rx,
            bus: None,
            tasks: Vec::new(),
        }
    }

    pub fn stats(&self) -> Arc<LinkStats> {
        Arc::clone(&self.stats)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Open the fixture, connect to the broker, subscribe to the
    /// telecommand topics and spawn the producer and delivery tasks.
    ///
    /// An unreadable fixture or a malformed broker URL fails here,
    /// before anything is spawned.
    pub async fn start(&mut self) -> Result<(), SimulatorError> {
        let file = File::open(&self.config.fixture).map_err(|e| SimulatorError::Fixture {
            path: self.config.fixture.display().to_string(),
            source: e,
        })?;
        let source = PacketSource::new(BufReader::new(file));

        let (bus, event_loop) = BusClient::connect(&self.config)?;
        bus.subscribe(&self.config.topics.tc_packet).await?;
        bus.subscribe(&self.config.topics.tc_frame).await?;

        self.tasks.push(tokio::spawn(bus::run_delivery_loop(
            event_loop,
            self.config.topics.clone(),
            Arc::clone(&self.stats),
            self.shutdown_rx.clone(),
        )));
        self.tasks.push(tokio::spawn(producer::run(
            source,
            bus.clone(),
            self.config.clone(),
            Arc::clone(&self.stats),
            self.shutdown_rx.clone(),
        )));
        self.bus = Some(bus);

        info!(
            "simulator started: replaying {} every {:?}",
            self.config.fixture.display(),
            self.config.packet_interval
        );
        Ok(())
    }

    /// Signal both tasks to stop and wait for them to finish. Publishes
    /// still queued with the transport when the loop stops are lost,
    /// which is acceptable for an emulated link.
    pub async fn shutdown(mut self) {
        if let Some(bus) = self.bus.take() {
            bus.disconnect().await;
        }
        let _ = self.shutdown_tx.send(true);
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                warn!("task did not shut down cleanly: {}", e);
            }
        }
        info!("simulator stopped");
    }
}
