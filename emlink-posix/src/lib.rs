//! Host-side transports for the Emlink stack
//!
//! These adapters implement [`emlink::transport::Transport`] on top of the
//! standard library's networking types, playing the role the hardware
//! peripheral drivers play on embedded targets: non-blocking byte reads for
//! `Node::poll()`, all-or-nothing writes for `Node::publish()`.

mod tcp;
mod udp;

pub use tcp::TcpTransport;
pub use udp::UdpTransport;
