//! # CCSDS Link Simulator
//!
//! Emulates a spacecraft telemetry/telecommand link for ground-system
//! testing: recorded CCSDS space packets are read from a fixture file,
//! wrapped in fixed-length AOS transfer frames, and published over MQTT,
//! while telecommand packets and frames arriving on the same broker are
//! counted and recorded.
//!
//! ## Quick start
//!
//! ```rust
//! use linksim::frame::{build_frame, AOS_FRAME_LENGTH};
//! use linksim::packet::make_idle;
//!
//! let packet = make_idle(32).unwrap();
//! let frame = build_frame(&packet, 0).unwrap();
//! assert_eq!(frame.len(), AOS_FRAME_LENGTH);
//! ```
//!
//! ## Architecture
//!
//! - [`packet`] - space packet header codec and idle packet synthesizer
//! - [`source`] - packet source iterating the recorded stream
//! - [`frame`] - AOS transfer frame builder
//! - [`leaf`] - JSON envelope used on the frame topics
//! - [`stats`] - shared TM/TC counters and status snapshot
//! - [`bus`] - MQTT client glue and inbound delivery loop
//! - [`simulator`] - orchestration and shutdown

pub mod bus;
pub mod config;
pub mod frame;
pub mod leaf;
pub mod packet;
pub mod producer;
pub mod simulator;
pub mod source;
pub mod stats;

// Re-export main public types for convenience
pub use config::SimulatorConfig;
pub use simulator::Simulator;
pub use stats::{LinkStats, StatsSnapshot};
