//! Packet source iterating a recorded CCSDS byte stream.

use std::io::Read;

use thiserror::Error;

use crate::packet::{MIN_PACKET_LEN, PRIMARY_HEADER_LEN};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error reading packet stream: {0}")]
    Io(#[from] std::io::Error),
    #[error("packet stream truncated: header declares a {expected}-byte packet but only {actual} bytes were available")]
    Truncated { expected: usize, actual: usize },
}

/// Reads complete space packets off a byte stream positioned at a packet
/// boundary.
#[derive(Debug)]
pub struct PacketSource<R> {
    reader: R,
    packets_read: u64,
}

impl<R: Read> PacketSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            packets_read: 0,
        }
    }

    /// Read the next packet: 6 header bytes, then the `data_length + 1`
    /// body bytes the header announces.
    ///
    /// Returns `Ok(None)` once fewer than 6 header bytes remain. A body
    /// cut short by end-of-stream is a `Truncated` error; the fixture is
    /// corrupt and the caller is expected to stop.
    pub fn next_packet(&mut self) -> Result<Option<Vec<u8>>, SourceError> {
        let mut header = [0u8; PRIMARY_HEADER_LEN];
        let mut filled = 0;
        while filled < PRIMARY_HEADER_LEN {
            let n = self.reader.read(&mut header[filled..])?;
            if n == 0 {
                // End of stream, possibly with a few stray trailing bytes.
                return Ok(None);
            }
            filled += n;
        }

        let data_length = usize::from(u16::from_be_bytes([header[4], header[5]]));
        let total = data_length + MIN_PACKET_LEN;

        let mut packet = vec![0u8; total];
        packet[..PRIMARY_HEADER_LEN].copy_from_slice(&header);

        let mut have = PRIMARY_HEADER_LEN;
        while have < total {
            let n = self.reader.read(&mut packet[have..])?;
            if n == 0 {
                return Err(SourceError::Truncated {
                    expected: total,
                    actual: have,
                });
            }
            have += n;
        }

        self.packets_read += 1;
        Ok(Some(packet))
    }

    pub fn packets_read(&self) -> u64 {
        self.packets_read
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::PacketHeader;
    use std::io::Cursor;

    fn encode_packet(apid: u16, seq_count: u16, data: &[u8]) -> Vec<u8> {
        assert!(!data.is_empty());
        let header = PacketHeader {
            version: 0,
            packet_type: 0,
            sec_header: false,
            apid,
            seq_flags: 0b11,
            seq_count,
            data_length: (data.len() - 1) as u16,
        };
        let mut packet = header.encode().to_vec();
        packet.extend_from_slice(data);
        packet
    }

    #[test]
    fn test_reads_packets_in_order() {
        let first = encode_packet(100, 1, &[0xAA; 12]);
        let second = encode_packet(101, 2, &[0xBB; 3]);
        let mut stream = first.clone();
        stream.extend_from_slice(&second);

        let mut source = PacketSource::new(Cursor::new(stream));
        assert_eq!(source.next_packet().unwrap(), Some(first));
        assert_eq!(source.next_packet().unwrap(), Some(second));
        assert_eq!(source.next_packet().unwrap(), None);
        assert_eq!(source.packets_read(), 2);
    }

    #[test]
    fn test_empty_stream_is_end() {
        let mut source = PacketSource::new(Cursor::new(Vec::new()));
        assert!(source.next_packet().unwrap().is_none());
    }

    #[test]
    fn test_partial_header_is_end_of_stream() {
        let packet = encode_packet(7, 0, &[1, 2, 3, 4]);
        let mut stream = packet.clone();
        stream.extend_from_slice(&[0x00, 0x01, 0x02]); // stray trailing bytes

        let mut source = PacketSource::new(Cursor::new(stream));
        assert_eq!(source.next_packet().unwrap(), Some(packet));
        assert!(source.next_packet().unwrap().is_none());
    }

    #[test]
    fn test_truncated_body_is_an_error() {
        let mut packet = encode_packet(7, 0, &[0xCC; 40]);
        packet.truncate(20); // header promises 46 bytes

        let mut source = PacketSource::new(Cursor::new(packet));
        match source.next_packet() {
            Err(SourceError::Truncated { expected, actual }) => {
                assert_eq!(expected, 46);
                assert_eq!(actual, 20);
            }
            other => panic!("expected Truncated error, got {:?}", other),
        }
    }
}
