//! Protocol frame build/parse and dispatch by message id
//!
//! Frame format (logical):
//! `version(1) | msg_id(1) | msg_hash(4) | len(2) | payload(len)`
//!
//! Multi-byte fields are big-endian. `msg_hash` is the schema fingerprint of
//! the payload struct; the router treats it as opaque for raw handlers and
//! gates on it for typed ones. Incoming frames are assumed to have passed
//! CRC validation already (normally performed by the
//! [`Framer`](crate::framer::Framer)).

use core::marker::PhantomData;

use emlink_core::{Error, FRAME_HEADER_SIZE};
use emlink_wire::Message;

/// A receiver of routed payloads.
///
/// This is the raw dispatch shape: the handler sees the payload bytes and
/// the schema hash, and performs its own decoding. Any
/// `FnMut(&[u8], u32) -> Result<(), Error>` closure is a handler; receivers
/// with state implement the trait directly. For automatic hash checking and
/// decoding, wrap a typed callback in [`TypedHandler`].
pub trait Handler {
    fn on_payload(&mut self, payload: &[u8], msg_hash: u32) -> Result<(), Error>;
}

impl<F> Handler for F
where
    F: FnMut(&[u8], u32) -> Result<(), Error>,
{
    fn on_payload(&mut self, payload: &[u8], msg_hash: u32) -> Result<(), Error> {
        self(payload, msg_hash)
    }
}

/// Adapter turning a typed callback into a [`Handler`].
///
/// Before invoking the callback it
/// 1. checks the frame's schema hash against `M::MSG_HASH`
///    (mismatch: [`Error::MsgVersionMismatch`]), then
/// 2. decodes the payload (failure: [`Error::InvalidParameter`]).
///
/// The adapter lives wherever the caller puts it — typically the stack frame
/// or static that owns the rest of the receiver state. Nothing is boxed.
pub struct TypedHandler<M, F> {
    callback: F,
    _message: PhantomData<M>,
}

impl<M, F> TypedHandler<M, F>
where
    M: Message,
    F: FnMut(&M) -> Result<(), Error>,
{
    pub fn new(callback: F) -> Self {
        Self {
            callback,
            _message: PhantomData,
        }
    }
}

impl<M, F> Handler for TypedHandler<M, F>
where
    M: Message,
    F: FnMut(&M) -> Result<(), Error>,
{
    fn on_payload(&mut self, payload: &[u8], msg_hash: u32) -> Result<(), Error> {
        if msg_hash != M::MSG_HASH {
            return Err(Error::MsgVersionMismatch);
        }
        let message = M::decode(payload).map_err(|_| Error::InvalidParameter)?;
        (self.callback)(&message)
    }
}

struct Slot<'a> {
    msg_id: u8,
    handler: &'a mut dyn Handler,
}

/// Builds protocol frames and dispatches validated frames by `msg_id`.
///
/// Handler slots hold `&mut` borrows of caller-owned receivers, so a
/// registered receiver outliving the router is a compile-time guarantee
/// rather than a usage rule.
pub struct Router<'a, const MAX_HANDLERS: usize> {
    expected_version: u8,
    handlers: [Option<Slot<'a>>; MAX_HANDLERS],
}

impl<'a, const MAX_HANDLERS: usize> Router<'a, MAX_HANDLERS> {
    pub fn new(expected_version: u8) -> Self {
        Self {
            expected_version,
            handlers: [const { None }; MAX_HANDLERS],
        }
    }

    pub fn expected_version(&self) -> u8 {
        self.expected_version
    }

    /// Builds a protocol frame in network byte order.
    ///
    /// Returns the frame length, `8 + payload.len()`. Fails with
    /// [`Error::InvalidParameter`] if the payload exceeds 65535 bytes or
    /// `out` is too small.
    pub fn build_frame(
        &self,
        msg_id: u8,
        msg_hash: u32,
        payload: &[u8],
        out: &mut [u8],
    ) -> Result<usize, Error> {
        if payload.len() > usize::from(u16::MAX) {
            return Err(Error::InvalidParameter);
        }
        let needed = FRAME_HEADER_SIZE + payload.len();
        if out.len() < needed {
            return Err(Error::InvalidParameter);
        }

        out[0] = self.expected_version;
        out[1] = msg_id;
        out[2..6].copy_from_slice(&msg_hash.to_be_bytes());
        out[6..8].copy_from_slice(&(payload.len() as u16).to_be_bytes());
        out[FRAME_HEADER_SIZE..needed].copy_from_slice(payload);
        Ok(needed)
    }

    /// Registers a handler for a message id.
    ///
    /// An existing entry for `msg_id` is replaced; otherwise the first free
    /// slot is claimed. Fails with [`Error::InvalidParameter`] when the
    /// table is full.
    pub fn register_handler(
        &mut self,
        msg_id: u8,
        handler: &'a mut dyn Handler,
    ) -> Result<(), Error> {
        for slot in self.handlers.iter_mut().flatten() {
            if slot.msg_id == msg_id {
                slot.handler = handler;
                return Ok(());
            }
        }

        for slot in self.handlers.iter_mut() {
            if slot.is_none() {
                *slot = Some(Slot { msg_id, handler });
                return Ok(());
            }
        }

        Err(Error::InvalidParameter)
    }

    /// Parses a complete, CRC-validated frame and dispatches its payload.
    ///
    /// The payload span aliases framer-owned storage; it is only valid
    /// during dispatch, which the borrow of `frame` encodes.
    pub fn on_packet(&mut self, frame: &[u8]) -> Result<(), Error> {
        if frame.len() < FRAME_HEADER_SIZE {
            return Err(Error::FrameHeaderSize);
        }

        let version = frame[0];
        if version != self.expected_version {
            return Err(Error::MsgVersionMismatch);
        }

        let msg_id = frame[1];
        let mut hash_bytes = [0u8; 4];
        hash_bytes.copy_from_slice(&frame[2..6]);
        let msg_hash = u32::from_be_bytes(hash_bytes);
        let payload_len = usize::from(u16::from_be_bytes([frame[6], frame[7]]));

        if frame.len() != FRAME_HEADER_SIZE + payload_len {
            return Err(Error::MsgLengthMismatch);
        }
        let payload = &frame[FRAME_HEADER_SIZE..];

        for slot in self.handlers.iter_mut().flatten() {
            if slot.msg_id == msg_id {
                return slot.handler.on_payload(payload, msg_hash);
            }
        }

        warn!("no handler for msg id {}", msg_id);
        Err(Error::MsgIdUnknown)
    }
}
