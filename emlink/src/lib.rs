//! # Emlink
//!
//! This library turns application-level message structs into self-delimiting,
//! integrity-checked wire packets over arbitrary byte-stream transports
//! (UART, TCP, UDP, loopback), and recovers and dispatches them at the
//! receiver. It targets freestanding environments: every buffer is sized at
//! compile time, there is no heap, no threads, and no OS facility beyond the
//! caller-supplied transport.
//!
//! ## Architecture
//!
//! ```text
//!  publish(msg)                                     handler(msg)
//!       │                                                ▲
//!       ▼                                                │
//!  ┌────────┐  frame   ┌────────┐  packet  ┌───────────┐ │
//!  │ Router ├─────────►│ Framer ├─────────►│ Transport │ │
//!  └────────┘          └────────┘          └─────┬─────┘ │
//!       ▲                   ▲                    │ bytes │
//!       │ frame             │ byte               ▼       │
//!       └───────────────────┴──────────── Node::poll ────┘
//! ```
//!
//! Components:
//! * _Framer_ is the link layer: it COBS-encodes a frame plus its CRC32 into
//!   a zero-terminated wire packet, and statefully reassembles and validates
//!   packets from an incoming byte stream.
//! * _Router_ is the application layer: it builds the 8-byte-header protocol
//!   frames and dispatches validated frames to one of a fixed set of handler
//!   slots, keyed by message id and gated by schema hash.
//! * _Node_ composes a Framer, a Router and a user-supplied
//!   [`Transport`](transport::Transport) into a single receive/transmit
//!   engine driven by `poll()` and `publish()`.
//!
//! The canonical payload encoding and the COBS/CRC primitives live in
//! [`emlink_wire`], re-exported here as [`wire`].
//!
//! ## Example
//!
//! ```
//! use emlink::core::{max_frame_size, max_packet_size, Error};
//! use emlink::node::Node;
//! use emlink::transport::Loopback;
//!
//! const MAX_PAYLOAD: usize = 32;
//! const MAX_FRAME: usize = max_frame_size(MAX_PAYLOAD);
//! const MAX_PACKET: usize = max_packet_size(MAX_PAYLOAD);
//!
//! let link = Loopback::<256>::new();
//! let (end_a, end_b) = link.split();
//!
//! let mut sensor: Node<_, MAX_FRAME, MAX_PACKET, 4> = Node::new(end_a);
//! let mut controller: Node<_, MAX_FRAME, MAX_PACKET, 4> = Node::new(end_b);
//!
//! let mut on_telemetry = |payload: &[u8], msg_hash: u32| -> Result<(), Error> {
//!     assert_eq!(payload, [0x10, 0x00, 0x20]);
//!     assert_eq!(msg_hash, 0xaabb_ccdd);
//!     Ok(())
//! };
//! controller.register_handler(9, &mut on_telemetry)?;
//!
//! sensor.publish(9, 0xaabb_ccdd, &[0x10, 0x00, 0x20])?;
//! assert_eq!(controller.poll(), 0);
//! # Ok::<(), Error>(())
//! ```
//!
//! ## Concurrency model
//!
//! Single-threaded, cooperative, caller-driven. No operation suspends; the
//! caller owns the cadence of `poll()` and `publish()`. Frames handed to
//! handlers borrow the Framer's receive buffer and are only valid for the
//! duration of the call — the borrow checker enforces what the equivalent
//! C implementations can only document. Independent nodes, each with their
//! own transport, may live on different threads; a single node is not
//! thread-safe, which `&mut self` encodes.
//!
//! ## Limitations
//!
//! * One wire packet carries exactly one frame; there is no reassembly
//!   above COBS.
//! * CRC32 protects against bit corruption, not forgery.
//! * Handlers must not re-enter `poll()` or `publish()`.
#![no_std]

pub use emlink_core as core;
pub use emlink_wire as wire;

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod framer;
pub mod node;
pub mod router;
pub mod transport;
