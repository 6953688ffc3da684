use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use emlink::transport::Transport;

/// UDP datagram transport.
///
/// UDP is datagram-based while the stack consumes a byte stream, so each
/// received datagram is buffered internally and served byte by byte. The
/// COBS framing survives datagram boundaries either way; they just do not
/// need to map 1:1 onto packets.
pub struct UdpTransport {
    socket: UdpSocket,
    destination: Option<SocketAddr>,
    rx_buffer: [u8; 4096],
    rx_len: usize,
    rx_index: usize,
}

impl UdpTransport {
    /// Binds a local socket and switches it to non-blocking mode.
    pub fn bind<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_nonblocking(true)?;
        Ok(Self {
            socket,
            destination: None,
            rx_buffer: [0; 4096],
            rx_len: 0,
            rx_index: 0,
        })
    }

    /// Sets the default destination for `write`.
    pub fn set_destination(&mut self, addr: SocketAddr) {
        self.destination = Some(addr);
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

impl Transport for UdpTransport {
    fn read(&mut self) -> Option<u8> {
        // Serve bytes buffered from the previous datagram first.
        if self.rx_index < self.rx_len {
            let byte = self.rx_buffer[self.rx_index];
            self.rx_index += 1;
            return Some(byte);
        }

        match self.socket.recv_from(&mut self.rx_buffer) {
            Ok((len, _sender)) if len > 0 => {
                self.rx_len = len;
                self.rx_index = 1;
                Some(self.rx_buffer[0])
            }
            _ => None,
        }
    }

    fn write(&mut self, bytes: &[u8]) -> bool {
        let Some(destination) = self.destination else {
            return false;
        };
        match self.socket.send_to(bytes, destination) {
            Ok(sent) => sent == bytes.len(),
            Err(_) => false,
        }
    }
}
