//! AOS transfer frame construction.
//!
//! Every frame is exactly [`AOS_FRAME_LENGTH`] bytes: an 8-byte fixed
//! header (6-byte primary header plus 2-byte M_PDU header), the real
//! packet, and an idle packet filling the remaining data zone.

use static_assertions::const_assert;
use thiserror::Error;

use crate::packet::{self, PacketError};

/// Fixed total frame length mandated by the emulated downlink.
pub const AOS_FRAME_LENGTH: usize = 1115;

/// Primary header (6 bytes) plus M_PDU header (2 bytes).
pub const AOS_HEADER_LEN: usize = 8;

/// AOS transfer frame version number (2-bit field, value 01).
pub const AOS_VERSION: u8 = 0b01;

pub const SPACECRAFT_ID: u8 = 29;
pub const VIRTUAL_CHANNEL_ID: u8 = 1;

// The frame must always have room for the header and a minimal idle packet.
const_assert!(AOS_HEADER_LEN + packet::MIN_PACKET_LEN <= AOS_FRAME_LENGTH);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("packet of {packet_len} bytes does not fit in a {frame_len}-byte frame")]
    PacketTooLarge {
        packet_len: usize,
        frame_len: usize,
    },
    #[error("buffer of {0} bytes is too short for an 8-byte frame header")]
    HeaderTruncated(usize),
    #[error(transparent)]
    Packet(#[from] PacketError),
}

/// Decoded AOS primary header fields, used by downlink consumers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub version: u8,
    pub spacecraft_id: u8,
    pub virtual_channel_id: u8,
    pub frame_seq: u32,
}

/// Build one transfer frame around `packet_data`.
///
/// The caller owns sequence advancement; `frame_seq` is written into the
/// 24-bit frame sequence count field as supplied. Fails with
/// [`FrameError::PacketTooLarge`] when the packet plus header exceeds the
/// frame, and with an idle-length error when the leftover data zone is
/// too small for a minimal idle packet. Both are per-packet failures; no
/// partial frame is ever returned.
pub fn build_frame(packet_data: &[u8], frame_seq: u32) -> Result<Vec<u8>, FrameError> {
    let needed = packet_data.len() + AOS_HEADER_LEN;
    if needed > AOS_FRAME_LENGTH {
        return Err(FrameError::PacketTooLarge {
            packet_len: packet_data.len(),
            frame_len: AOS_FRAME_LENGTH,
        });
    }

    let mut frame = vec![0u8; AOS_FRAME_LENGTH];

    // Version (2 bits), spacecraft id (8 bits), virtual channel id (6 bits).
    let word = (u16::from(AOS_VERSION) << 14)
        | (u16::from(SPACECRAFT_ID) << 6)
        | u16::from(VIRTUAL_CHANNEL_ID & 0x3F);
    frame[0..2].copy_from_slice(&word.to_be_bytes());

    // 24-bit frame sequence count: high byte, then low 16 bits.
    frame[2] = (frame_seq >> 16) as u8;
    frame[3..5].copy_from_slice(&((frame_seq & 0xFFFF) as u16).to_be_bytes());

    // Byte 5 is the signaling field and bytes 6..8 the M_PDU header; both
    // stay zero, meaning the packet starts at offset 0 of the data zone.

    frame[AOS_HEADER_LEN..needed].copy_from_slice(packet_data);

    let idle = packet::make_idle(AOS_FRAME_LENGTH - needed)?;
    frame[needed..].copy_from_slice(&idle);

    Ok(frame)
}

pub fn decode_header(frame: &[u8]) -> Result<FrameHeader, FrameError> {
    if frame.len() < AOS_HEADER_LEN {
        return Err(FrameError::HeaderTruncated(frame.len()));
    }

    let word = u16::from_be_bytes([frame[0], frame[1]]);
    let frame_seq =
        (u32::from(frame[2]) << 16) | u32::from(u16::from_be_bytes([frame[3], frame[4]]));

    Ok(FrameHeader {
        version: (word >> 14) as u8,
        spacecraft_id: ((word >> 6) & 0xFF) as u8,
        virtual_channel_id: (word & 0x3F) as u8,
        frame_seq,
    })
}
