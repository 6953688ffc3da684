//! Byte-stream framing and deframing using COBS + CRC32
//!
//! Wire packet format:
//! * encoded region: `COBS(frame || crc32_be)` — guaranteed zero-free
//! * terminator: a single `0x00` delimiter
//!
//! The framer is agnostic to the contents of `frame`; it only validates the
//! CRC and hands back the decoded frame bytes.

use emlink_core::{Error, CRC_SIZE};
use emlink_wire::{cobs, crc};

/// Builds a complete wire packet from a frame.
///
/// Computes CRC32 over `frame`, COBS-encodes `frame || crc32_be` into
/// `packet` in a single pass, appends the `0x00` delimiter and returns the
/// total packet length. Fails with [`Error::InvalidParameter`] when `packet`
/// cannot hold the encoding.
pub fn create_packet(frame: &[u8], packet: &mut [u8]) -> Result<usize, Error> {
    if packet.len() < 2 {
        return Err(Error::InvalidParameter);
    }

    let crc = crc::crc32_iso_hdlc(frame);

    let mut encoder = cobs::Encoder::new(packet)?;
    encoder.push_slice(frame)?;
    encoder.push_slice(&crc.to_be_bytes())?;
    let encoded_len = encoder.finish();

    if encoded_len >= packet.len() {
        return Err(Error::InvalidParameter);
    }
    packet[encoded_len] = 0x00;
    Ok(encoded_len + 1)
}

/// Stateful deframer of a byte stream into validated frame spans.
///
/// Feed incoming bytes through [`process_byte`](Framer::process_byte). When
/// a delimiter completes a packet, the buffered bytes are COBS-decoded in
/// place, the CRC32 trailer is verified and the frame is returned borrowing
/// the internal receive buffer — it is valid only until the next call.
///
/// Any failure resets the accumulation state, so the stream resynchronizes
/// at the next delimiter on its own.
pub struct Framer<const MAX_PACKET_SIZE: usize> {
    rx_buffer: [u8; MAX_PACKET_SIZE],
    rx_index: usize,
}

impl<const MAX_PACKET_SIZE: usize> Framer<MAX_PACKET_SIZE> {
    pub const fn new() -> Self {
        Self {
            rx_buffer: [0; MAX_PACKET_SIZE],
            rx_index: 0,
        }
    }

    /// Processes one incoming byte from the transport.
    ///
    /// Returns `Ok(Some(frame))` when `byte` completed a valid packet,
    /// `Ok(None)` while accumulating (stray delimiters on an empty buffer
    /// are tolerated so stream start-up is silent).
    pub fn process_byte(&mut self, byte: u8) -> Result<Option<&[u8]>, Error> {
        if byte == 0x00 {
            if self.rx_index == 0 {
                return Ok(None);
            }

            let encoded_len = self.rx_index;
            self.rx_index = 0;

            let decoded_len = cobs::decode_in_place(&mut self.rx_buffer[..encoded_len])
                .map_err(|err| {
                    warn!("cobs decode failed after {} encoded bytes", encoded_len);
                    err
                })?;

            if decoded_len < CRC_SIZE {
                return Err(Error::FrameHeaderSize);
            }
            let frame_len = decoded_len - CRC_SIZE;

            let mut crc_bytes = [0u8; CRC_SIZE];
            crc_bytes.copy_from_slice(&self.rx_buffer[frame_len..decoded_len]);
            let received_crc = u32::from_be_bytes(crc_bytes);

            let computed_crc = crc::crc32_iso_hdlc(&self.rx_buffer[..frame_len]);
            if received_crc != computed_crc {
                warn!("crc mismatch: received {:x}, computed {:x}", received_crc, computed_crc);
                return Err(Error::CrcMismatch);
            }

            return Ok(Some(&self.rx_buffer[..frame_len]));
        }

        if self.rx_index >= MAX_PACKET_SIZE {
            // Overflow: drop the packet and resync on the next delimiter.
            self.rx_index = 0;
            return Err(Error::FrameTooLarge);
        }
        self.rx_buffer[self.rx_index] = byte;
        self.rx_index += 1;
        Ok(None)
    }
}

impl<const MAX_PACKET_SIZE: usize> Default for Framer<MAX_PACKET_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}
