//! CCSDS space packet primitives: primary header encode/decode and the
//! idle packet synthesizer used to pad transfer frames.

use thiserror::Error;

/// Size of the CCSDS primary header in bytes.
pub const PRIMARY_HEADER_LEN: usize = 6;

/// Smallest viable packet: primary header plus one data byte. The CCSDS
/// data-length field counts data bytes minus one, so an empty data field
/// cannot be expressed.
pub const MIN_PACKET_LEN: usize = 7;

/// Reserved APID marking idle (filler) packets.
pub const IDLE_APID: u16 = 0x7FF;

/// Sequence flags value for a standalone (unsegmented) packet.
pub const SEQ_FLAGS_STANDALONE: u8 = 0b11;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketError {
    #[error("idle packet length {0} is below the 7-byte minimum")]
    IdleTooShort(usize),
    #[error("buffer of {0} bytes is too short for a 6-byte primary header")]
    HeaderTruncated(usize),
}

/// Decoded CCSDS primary header fields.
///
/// Big-endian bit layout over 6 bytes: version (3) / type (1) /
/// secondary-header flag (1) / APID (11), then sequence flags (2) /
/// sequence count (14), then the 16-bit data-length field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    pub version: u8,
    pub packet_type: u8,
    pub sec_header: bool,
    pub apid: u16,
    pub seq_flags: u8,
    pub seq_count: u16,
    pub data_length: u16,
}

impl PacketHeader {
    pub fn encode(&self) -> [u8; PRIMARY_HEADER_LEN] {
        let word0 = (u16::from(self.version & 0x07) << 13)
            | (u16::from(self.packet_type & 0x01) << 12)
            | (u16::from(self.sec_header) << 11)
            | (self.apid & 0x7FF);
        let word1 = (u16::from(self.seq_flags & 0x03) << 14) | (self.seq_count & 0x3FFF);

        let mut buf = [0u8; PRIMARY_HEADER_LEN];
        buf[0..2].copy_from_slice(&word0.to_be_bytes());
        buf[2..4].copy_from_slice(&word1.to_be_bytes());
        buf[4..6].copy_from_slice(&self.data_length.to_be_bytes());
        buf
    }

    pub fn decode(buf: &[u8]) -> Result<Self, PacketError> {
        if buf.len() < PRIMARY_HEADER_LEN {
            return Err(PacketError::HeaderTruncated(buf.len()));
        }

        let word0 = u16::from_be_bytes([buf[0], buf[1]]);
        let word1 = u16::from_be_bytes([buf[2], buf[3]]);
        let data_length = u16::from_be_bytes([buf[4], buf[5]]);

        Ok(Self {
            version: (word0 >> 13) as u8,
            packet_type: ((word0 >> 12) & 0x01) as u8,
            sec_header: (word0 >> 11) & 0x01 != 0,
            apid: word0 & 0x7FF,
            seq_flags: (word1 >> 14) as u8,
            seq_count: word1 & 0x3FFF,
            data_length,
        })
    }

    /// Total packet length in bytes implied by the data-length field.
    /// The field counts data bytes minus one, hence the +7 instead of +6.
    pub fn total_length(&self) -> usize {
        usize::from(self.data_length) + MIN_PACKET_LEN
    }
}

/// Synthesize an idle packet of exactly `length` bytes.
///
/// The header carries the reserved idle APID, standalone sequence flags
/// and a zero sequence count; the data field is all-zero filler. The
/// output depends only on `length`, so repeated calls are byte-identical.
pub fn make_idle(length: usize) -> Result<Vec<u8>, PacketError> {
    if length < MIN_PACKET_LEN {
        return Err(PacketError::IdleTooShort(length));
    }
    debug_assert!(
        length <= usize::from(u16::MAX) + MIN_PACKET_LEN,
        "idle packet length {} overflows the 16-bit data-length field",
        length
    );

    let header = PacketHeader {
        version: 0,
        packet_type: 0,
        sec_header: false,
        apid: IDLE_APID,
        seq_flags: SEQ_FLAGS_STANDALONE,
        seq_count: 0,
        data_length: (length - MIN_PACKET_LEN) as u16,
    };

    let mut packet = vec![0u8; length];
    packet[..PRIMARY_HEADER_LEN].copy_from_slice(&header.encode());
    Ok(packet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_decode_known_bytes() {
        // Bytes from a real SNPP CrIS telemetry packet.
        let buf = [0x0d, 0x59, 0xd2, 0xab, 0x0a, 0x8f];
        let header = PacketHeader::decode(&buf).unwrap();

        assert_eq!(header.version, 0);
        assert_eq!(header.packet_type, 0);
        assert!(header.sec_header);
        assert_eq!(header.apid, 1369);
        assert_eq!(header.seq_flags, 3);
        assert_eq!(header.seq_count, 4779);
        assert_eq!(header.data_length, 2703);
        assert_eq!(header.total_length(), 2710);
    }

    #[test]
    fn test_header_encode_decode_roundtrip() {
        let header = PacketHeader {
            version: 0,
            packet_type: 1,
            sec_header: false,
            apid: 0x123,
            seq_flags: SEQ_FLAGS_STANDALONE,
            seq_count: 0x1FFF,
            data_length: 99,
        };
        let decoded = PacketHeader::decode(&header.encode()).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn test_header_decode_truncated() {
        let result = PacketHeader::decode(&[0x00, 0x01, 0x02]);
        assert_eq!(result, Err(PacketError::HeaderTruncated(3)));
    }

    #[test]
    fn test_make_idle_minimum_length() {
        let packet = make_idle(7).unwrap();
        assert_eq!(packet.len(), 7);

        let header = PacketHeader::decode(&packet).unwrap();
        assert_eq!(header.apid, IDLE_APID);
        assert_eq!(header.seq_flags, SEQ_FLAGS_STANDALONE);
        assert_eq!(header.seq_count, 0);
        assert_eq!(header.data_length, 0);
        assert_eq!(packet[6], 0);
    }

    #[test]
    fn test_make_idle_encodes_length() {
        let packet = make_idle(1097).unwrap();
        assert_eq!(packet.len(), 1097);

        let header = PacketHeader::decode(&packet).unwrap();
        assert_eq!(header.data_length, 1090);
        assert!(packet[PRIMARY_HEADER_LEN..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_make_idle_is_deterministic() {
        assert_eq!(make_idle(64).unwrap(), make_idle(64).unwrap());
    }

    #[test]
    fn test_make_idle_rejects_short_lengths() {
        for length in 0..7 {
            assert_eq!(make_idle(length), Err(PacketError::IdleTooShort(length)));
        }
    }
}
