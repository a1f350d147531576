//! Stream reassembly
//!
//! Turns an arbitrarily fragmented or coalesced byte stream into whole
//! MQTT packets. Partial packets accumulate in a single growable buffer;
//! oversized packets are consumed and discarded without ever being
//! buffered in full.

use bytes::{Bytes, BytesMut};

use crate::codec::{expected_packet_len, MAX_PACKET_SIZE, MIN_BUFFER_CAPACITY};

/// Packet reassembly buffer
#[derive(Debug, Default)]
pub struct Assembler {
    buf: BytesMut,
    /// Bytes of an oversized packet still to be discarded
    skip: usize,
}

impl Assembler {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
            skip: 0,
        }
    }

    /// Append incoming bytes, discarding any that belong to an oversized
    /// packet currently being skipped.
    pub fn feed(&mut self, mut data: &[u8]) {
        if self.skip > 0 {
            let n = self.skip.min(data.len());
            self.skip -= n;
            data = &data[n..];
            if data.is_empty() {
                return;
            }
        }

        self.reserve(data.len());
        self.buf.extend_from_slice(data);
    }

    /// Peel off the next complete packet, if one is buffered.
    ///
    /// Oversized packets (declared total above [`MAX_PACKET_SIZE`]) are
    /// consumed here without being returned.
    pub fn next_frame(&mut self) -> Option<Bytes> {
        loop {
            let expected = expected_packet_len(&self.buf)?;

            if expected > MAX_PACKET_SIZE {
                if self.buf.len() >= expected {
                    let _ = self.buf.split_to(expected);
                    continue;
                }
                // The rest of the packet has not arrived yet; discard it
                // as it streams in.
                self.skip = expected - self.buf.len();
                self.buf.clear();
                return None;
            }

            if self.buf.len() < expected {
                return None;
            }

            return Some(self.buf.split_to(expected).freeze());
        }
    }

    /// Drop all buffered bytes and any pending oversize skip.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.skip = 0;
    }

    /// Number of buffered partial-packet bytes
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Grow by doubling, lower-bounded by the requested headroom and the
    /// minimum capacity.
    fn reserve(&mut self, additional: usize) {
        let needed = self.buf.len() + additional;
        if self.buf.capacity() >= needed {
            return;
        }
        let target = needed.max(self.buf.capacity() * 2).max(MIN_BUFFER_CAPACITY);
        self.buf.reserve(target - self.buf.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_packet_roundtrip() {
        let mut asm = Assembler::new();
        asm.feed(&[0xD0, 0x00]);
        assert_eq!(asm.next_frame().as_deref(), Some(&[0xD0, 0x00][..]));
        assert!(asm.next_frame().is_none());
        assert!(asm.is_empty());
    }

    #[test]
    fn test_fragmented_packet() {
        let mut asm = Assembler::new();
        asm.feed(&[0x20]);
        assert!(asm.next_frame().is_none());
        asm.feed(&[0x02, 0x00]);
        assert!(asm.next_frame().is_none());
        assert_eq!(asm.len(), 3);
        asm.feed(&[0x00]);
        assert_eq!(
            asm.next_frame().as_deref(),
            Some(&[0x20, 0x02, 0x00, 0x00][..])
        );
    }

    #[test]
    fn test_coalesced_packets() {
        let mut asm = Assembler::new();
        asm.feed(&[0xD0, 0x00, 0x40, 0x02, 0x00, 0x01]);
        assert_eq!(asm.next_frame().as_deref(), Some(&[0xD0, 0x00][..]));
        assert_eq!(
            asm.next_frame().as_deref(),
            Some(&[0x40, 0x02, 0x00, 0x01][..])
        );
        assert!(asm.next_frame().is_none());
    }

    #[test]
    fn test_oversize_packet_skipped() {
        // Declared remaining length of 256 KiB
        let mut asm = Assembler::new();
        asm.feed(&[0x30, 0x80, 0x80, 0x10]);
        assert!(asm.next_frame().is_none());
        assert!(asm.is_empty());

        // Stream the body through in chunks; nothing is buffered.
        let chunk = vec![0u8; 64 * 1024];
        for _ in 0..4 {
            asm.feed(&chunk);
            assert!(asm.next_frame().is_none());
            assert!(asm.is_empty());
        }

        // The next packet parses normally.
        asm.feed(&[0xD0, 0x00]);
        assert_eq!(asm.next_frame().as_deref(), Some(&[0xD0, 0x00][..]));
    }

    #[test]
    fn test_oversize_packet_in_one_feed() {
        let total = 4 + 256 * 1024;
        let mut data = vec![0u8; total + 2];
        data[0] = 0x30;
        data[1] = 0x80;
        data[2] = 0x80;
        data[3] = 0x10;
        data[total] = 0xD0;
        data[total + 1] = 0x00;

        let mut asm = Assembler::new();
        asm.feed(&data);
        assert_eq!(asm.next_frame().as_deref(), Some(&[0xD0, 0x00][..]));
        assert!(asm.next_frame().is_none());
    }

    #[test]
    fn test_malformed_remaining_length_stalls() {
        let mut asm = Assembler::new();
        asm.feed(&[0x30, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]);
        assert!(asm.next_frame().is_none());
        asm.clear();
        assert!(asm.is_empty());
    }

    #[test]
    fn test_clear_drops_skip_state() {
        let mut asm = Assembler::new();
        asm.feed(&[0x30, 0x80, 0x80, 0x10]);
        assert!(asm.next_frame().is_none());
        asm.clear();
        asm.feed(&[0xD0, 0x00]);
        assert_eq!(asm.next_frame().as_deref(), Some(&[0xD0, 0x00][..]));
    }
}
