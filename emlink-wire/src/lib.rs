//! Wire-level building blocks for the Emlink stack
//!
//! This crate provides the canonical payload encoding (big-endian, padding
//! free) together with the byte-stream primitives the link layer is built
//! from:
//!
//! * [`Writer`] / [`Reader`] — cursor-based encoder/decoder over
//!   caller-supplied byte slices, for every supported [`Scalar`] type.
//! * [`cobs`] — incremental Consistent Overhead Byte Stuffing encoder and an
//!   in-place decoder.
//! * [`crc`] — CRC-32/ISO-HDLC over arbitrary byte ranges.
//! * [`Message`] — the contract implemented by schema-generated payload
//!   types.
//!
//! Nothing in this crate allocates; every buffer is supplied by the caller.
#![no_std]

pub mod cobs;
pub mod crc;
mod cursor;
mod message;

pub use cursor::{Reader, Scalar, Writer};
pub use message::{fnv1a_32, Message};
