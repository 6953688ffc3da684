//! Contract implemented by schema-generated message types

use emlink_core::Error;

/// A payload struct with a canonical fixed-size encoding.
///
/// Implementations are normally emitted by the schema generator; the trait
/// only assumes what any generated type provides: a schema hash, the exact
/// encoded size, and cursor-based encode/decode.
///
/// `decode` is permissive: it reads exactly [`PAYLOAD_SIZE`](Self::PAYLOAD_SIZE)
/// leading bytes, ignores anything after them and fails on underflow. A
/// strict caller can reject trailing bytes itself by decoding through a
/// [`Reader`](crate::Reader) and checking
/// [`fully_consumed`](crate::Reader::fully_consumed).
pub trait Message: Sized {
    /// FNV-1a fingerprint of the canonicalized schema definition.
    const MSG_HASH: u32;

    /// Exact encoded payload size in bytes.
    const PAYLOAD_SIZE: usize;

    /// Encodes into `out` and returns the number of bytes written.
    fn encode(&self, out: &mut [u8]) -> Result<usize, Error>;

    /// Decodes from the leading bytes of `payload`.
    fn decode(payload: &[u8]) -> Result<Self, Error>;
}

/// 32-bit FNV-1a over `bytes`.
///
/// The schema hash is FNV-1a over the canonicalized schema text (comments
/// and all ASCII whitespace stripped); canonicalization is the generator's
/// job, this function hashes the bytes it is given. `const` so generated
/// code can evaluate hashes at compile time.
pub const fn fnv1a_32(bytes: &[u8]) -> u32 {
    let mut hash: u32 = 2_166_136_261;
    let mut index = 0;
    while index < bytes.len() {
        hash ^= bytes[index] as u32;
        hash = hash.wrapping_mul(16_777_619);
        index += 1;
    }
    hash
}
