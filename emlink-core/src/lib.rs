//! Emlink protocol core data types
//!
//! This crate provides basic definitions shared by the other Emlink crates:
//! the closed error set of the protocol stack and the compile-time buffer
//! size calculators. Emlink users should not depend on this crate directly.
//! Use the `emlink::core` reexport instead.
#![no_std]

/// Frame header size in bytes: version(1) + msg_id(1) + msg_hash(4) + len(2).
pub const FRAME_HEADER_SIZE: usize = 8;

/// Size of the CRC32 trailer appended to a frame before COBS encoding.
pub const CRC_SIZE: usize = 4;

/// Default protocol version carried in the frame header.
pub const PROTOCOL_VERSION: u8 = 1;

/// Errors returned by fallible operations across the stack.
///
/// One closed set is shared by the link layer (Framer), the application
/// layer (Router) and the integration layer (Node); `Ok(())` plays the role
/// of a success code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Incoming packet grew beyond the framer's `MAX_PACKET_SIZE`.
    FrameTooLarge,
    /// Invalid COBS structure: embedded zero or truncated group.
    CobsDecodeFailed,
    /// CRC32 over the decoded frame does not match the trailer.
    CrcMismatch,
    /// Decoded frame is shorter than the fixed header.
    FrameHeaderSize,
    /// Version byte mismatched the expected protocol version, or a typed
    /// handler rejected the schema hash.
    MsgVersionMismatch,
    /// No handler registered for this message id.
    MsgIdUnknown,
    /// The `len` header field disagrees with the actual frame size.
    MsgLengthMismatch,
    /// Undersized buffer, oversized payload, or a full registration table.
    InvalidParameter,
    /// The transport rejected a write.
    TransportError,
}

/// Worst-case COBS expansion for `n` input bytes, delimiter not included.
///
/// The incremental encoder opens a fresh group after every 254 consecutive
/// non-zero bytes, so an input that is an exact multiple of 254 costs one
/// group byte more than the textbook `ceil(n/254)` bound.
pub const fn cobs_max_overhead(n: usize) -> usize {
    n / 254 + 1
}

/// Maximum frame size for a given maximum payload size.
pub const fn max_frame_size(max_payload_size: usize) -> usize {
    FRAME_HEADER_SIZE + max_payload_size
}

/// Maximum wire packet size for a given maximum payload size.
///
/// Packet = `COBS(frame || crc32) || 0x00`.
pub const fn max_packet_size(max_payload_size: usize) -> usize {
    let encoded = max_frame_size(max_payload_size) + CRC_SIZE;
    encoded + cobs_max_overhead(encoded) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overhead_covers_block_boundaries() {
        // One group byte per started 254-byte block, plus the group the
        // encoder opens after a full block.
        assert_eq!(cobs_max_overhead(0), 1);
        assert_eq!(cobs_max_overhead(1), 1);
        assert_eq!(cobs_max_overhead(253), 1);
        assert_eq!(cobs_max_overhead(254), 2);
        assert_eq!(cobs_max_overhead(255), 2);
        assert_eq!(cobs_max_overhead(508), 3);
    }

    #[test]
    fn test_packet_size_bound() {
        // Textbook lower bound: ceil((frame + 4) * 255/254) + 1.
        for payload in 0usize..1024 {
            let n = max_frame_size(payload) + CRC_SIZE;
            let bound = n.div_ceil(254) + n + 1;
            assert!(max_packet_size(payload) >= bound);
        }
    }

    #[test]
    fn test_frame_size() {
        assert_eq!(max_frame_size(0), FRAME_HEADER_SIZE);
        assert_eq!(max_frame_size(32), 40);
    }
}
