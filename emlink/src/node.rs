//! High-level integration: Framer + Router + user transport
//!
//! [`Node`] is the primary integration object for application use:
//!
//! * RX: drain bytes from the transport, feed them through the framer, and
//!   dispatch complete frames via the router.
//! * TX: build a frame, wrap it into a COBS+CRC32 packet, write it to the
//!   transport.
//!
//! ## Sizing
//!
//! Buffer sizes are compile-time parameters. Stable Rust cannot derive one
//! const generic from another, so callers compute the frame and packet sizes
//! from the maximum payload size with the `emlink-core` `const fn`s:
//!
//! ```
//! use emlink::core::{max_frame_size, max_packet_size};
//! use emlink::node::Node;
//!
//! const MAX_PAYLOAD: usize = 64;
//! type AppNode<'a, T> =
//!     Node<'a, T, { max_frame_size(MAX_PAYLOAD) }, { max_packet_size(MAX_PAYLOAD) }, 8>;
//! ```
//!
//! The packet/frame size relation is asserted at monomorphization time, so a
//! mis-derived pair fails the build rather than truncating traffic.

use emlink_core::{cobs_max_overhead, Error, CRC_SIZE, FRAME_HEADER_SIZE, PROTOCOL_VERSION};
use emlink_wire::Message;

use crate::framer::{create_packet, Framer};
use crate::router::{Handler, Router};
use crate::transport::Transport;

/// Integrates a [`Framer`] and a [`Router`] with a user-provided transport.
///
/// Buffer lifetime / reentrancy:
/// * payload spans handed to handlers alias the framer's receive buffer and
///   are only valid during the dispatch call, which their borrow encodes;
/// * `poll()` and `publish()` use internal fixed-size buffers and are not
///   re-entrant, which `&mut self` encodes.
pub struct Node<
    'a,
    T,
    const MAX_FRAME_SIZE: usize,
    const MAX_PACKET_SIZE: usize,
    const MAX_HANDLERS: usize,
> where
    T: Transport,
{
    transport: T,
    framer: Framer<MAX_PACKET_SIZE>,
    router: Router<'a, MAX_HANDLERS>,
    tx_frame: [u8; MAX_FRAME_SIZE],
    tx_packet: [u8; MAX_PACKET_SIZE],
}

impl<'a, T, const MAX_FRAME_SIZE: usize, const MAX_PACKET_SIZE: usize, const MAX_HANDLERS: usize>
    Node<'a, T, MAX_FRAME_SIZE, MAX_PACKET_SIZE, MAX_HANDLERS>
where
    T: Transport,
{
    /// Creates a node expecting the default protocol version.
    pub fn new(transport: T) -> Self {
        Self::with_version(transport, PROTOCOL_VERSION)
    }

    /// Creates a node expecting (and stamping) `expected_version`.
    pub fn with_version(transport: T, expected_version: u8) -> Self {
        const {
            assert!(
                MAX_FRAME_SIZE >= FRAME_HEADER_SIZE,
                "MAX_FRAME_SIZE must cover the 8-byte frame header"
            );
            assert!(
                MAX_PACKET_SIZE
                    >= MAX_FRAME_SIZE
                        + CRC_SIZE
                        + cobs_max_overhead(MAX_FRAME_SIZE + CRC_SIZE)
                        + 1,
                "MAX_PACKET_SIZE must cover the worst-case encoding of a full frame"
            );
        }

        Self {
            transport,
            framer: Framer::new(),
            router: Router::new(expected_version),
            tx_frame: [0; MAX_FRAME_SIZE],
            tx_packet: [0; MAX_PACKET_SIZE],
        }
    }

    pub fn transport(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn router(&mut self) -> &mut Router<'a, MAX_HANDLERS> {
        &mut self.router
    }

    /// Registers a handler for a message id; see
    /// [`Router::register_handler`].
    pub fn register_handler(
        &mut self,
        msg_id: u8,
        handler: &'a mut dyn Handler,
    ) -> Result<(), Error> {
        self.router.register_handler(msg_id, handler)
    }

    /// Drains available bytes from the transport through the framer and
    /// dispatches complete frames.
    ///
    /// Intended to be called periodically from the main loop. Returns the
    /// number of errors encountered (framing, CRC or dispatch); processing
    /// continues past errors so one corrupted packet never starves the
    /// receiver.
    pub fn poll(&mut self) -> usize {
        let mut errors = 0;
        while let Some(byte) = self.transport.read() {
            match self.framer.process_byte(byte) {
                Ok(None) => {}
                Ok(Some(frame)) => {
                    if self.router.on_packet(frame).is_err() {
                        errors += 1;
                    }
                }
                Err(_) => errors += 1,
            }
        }
        errors
    }

    /// Builds a frame around `payload`, packs it and writes it to the
    /// transport.
    pub fn publish(&mut self, msg_id: u8, msg_hash: u32, payload: &[u8]) -> Result<(), Error> {
        let frame_len = self
            .router
            .build_frame(msg_id, msg_hash, payload, &mut self.tx_frame)?;
        let packet_len = create_packet(&self.tx_frame[..frame_len], &mut self.tx_packet)?;

        trace!("publishing msg {}: {} packet bytes", msg_id, packet_len);
        if !self.transport.write(&self.tx_packet[..packet_len]) {
            return Err(Error::TransportError);
        }
        Ok(())
    }

    /// Encodes a typed message and publishes it under `msg_id`.
    ///
    /// The payload is encoded into an internal scratch buffer first; like
    /// the rest of the node, this is not re-entrant.
    pub fn publish_msg<M: Message>(&mut self, msg_id: u8, message: &M) -> Result<(), Error> {
        let payload_capacity = MAX_FRAME_SIZE - FRAME_HEADER_SIZE;
        let payload_len = message.encode(&mut self.tx_packet[..payload_capacity])?;

        // Same pipeline as `publish`, spelled out so the payload can borrow
        // one scratch buffer while the frame is built in the other.
        let frame_len = self.router.build_frame(
            msg_id,
            M::MSG_HASH,
            &self.tx_packet[..payload_len],
            &mut self.tx_frame,
        )?;
        let packet_len = create_packet(&self.tx_frame[..frame_len], &mut self.tx_packet)?;

        if !self.transport.write(&self.tx_packet[..packet_len]) {
            return Err(Error::TransportError);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Loopback;
    use emlink_core::{max_frame_size, max_packet_size};

    const MAX_PAYLOAD: usize = 32;
    const MAX_FRAME: usize = max_frame_size(MAX_PAYLOAD);
    const MAX_PACKET: usize = max_packet_size(MAX_PAYLOAD);

    type TestNode<'a, T> = Node<'a, T, MAX_FRAME, MAX_PACKET, 4>;

    #[test]
    fn test_publish_rejects_oversized_payload() {
        let link = Loopback::<128>::new();
        let (end_a, _end_b) = link.split();
        let mut node: TestNode<'_, _> = Node::new(end_a);

        let payload = [0u8; MAX_PAYLOAD + 1];
        assert_eq!(
            node.publish(1, 0, &payload),
            Err(Error::InvalidParameter)
        );
    }

    #[test]
    fn test_publish_maps_transport_failure() {
        // Queue too small for any packet.
        let link = Loopback::<4>::new();
        let (end_a, _end_b) = link.split();
        let mut node: TestNode<'_, _> = Node::new(end_a);

        assert_eq!(node.publish(1, 0, &[1, 2, 3]), Err(Error::TransportError));
    }

    #[test]
    fn test_poll_on_idle_transport() {
        let link = Loopback::<16>::new();
        let (end_a, _end_b) = link.split();
        let mut node: TestNode<'_, _> = Node::new(end_a);

        assert_eq!(node.poll(), 0);
    }
}
