//! Link counters shared between the telemetry producer, the inbound
//! telecommand delivery task and the status reporter.
//!
//! Each counter is written by exactly one task and read by the status
//! reporter, so independent atomics are enough; there is no cross-field
//! invariant to protect.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde::Serialize;

#[derive(Debug, Default)]
pub struct LinkStats {
    tm_packets: AtomicU64,
    tm_frames: AtomicU64,
    tc_packets: AtomicU64,
    tc_frames: AtomicU64,
    last_tc: Mutex<Option<Vec<u8>>>,
}

impl LinkStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_tm_packet(&self) {
        self.tm_packets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tm_frame(&self) {
        self.tm_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tc_packet(&self, payload: Vec<u8>) {
        self.tc_packets.fetch_add(1, Ordering::Relaxed);
        self.store_last_tc(payload);
    }

    pub fn record_tc_frame(&self, payload: Vec<u8>) {
        self.tc_frames.fetch_add(1, Ordering::Relaxed);
        self.store_last_tc(payload);
    }

    pub fn tm_packet_count(&self) -> u64 {
        self.tm_packets.load(Ordering::Relaxed)
    }

    pub fn tm_frame_count(&self) -> u64 {
        self.tm_frames.load(Ordering::Relaxed)
    }

    pub fn tc_packet_count(&self) -> u64 {
        self.tc_packets.load(Ordering::Relaxed)
    }

    pub fn tc_frame_count(&self) -> u64 {
        self.tc_frames.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let last_tc_hex = self
            .last_tc
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_deref()
            .map(hex::encode);

        StatsSnapshot {
            tm_packets: self.tm_packet_count(),
            tm_frames: self.tm_frame_count(),
            tc_packets: self.tc_packet_count(),
            tc_frames: self.tc_frame_count(),
            last_tc_hex,
        }
    }

    fn store_last_tc(&self, payload: Vec<u8>) {
        let mut guard = self
            .last_tc
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(payload);
    }
}

/// Point-in-time copy of all counters, used for status reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub tm_packets: u64,
    pub tm_frames: u64,
    pub tc_packets: u64,
    pub tc_frames: u64,
    pub last_tc_hex: Option<String>,
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sent: {} TM packets and {} TM frames. Received: {} TC packets and {} TC frames. Last TC: {}",
            self.tm_packets,
            self.tm_frames,
            self.tc_packets,
            self.tc_frames,
            self.last_tc_hex.as_deref().unwrap_or("None")
        )
    }
}
