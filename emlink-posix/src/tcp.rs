use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};

use emlink::transport::Transport;

/// TCP byte-stream transport.
///
/// The socket is switched to non-blocking mode so `read` never stalls
/// `Node::poll()`. Writes retry on `WouldBlock` until the whole packet is
/// out, preserving the transport contract of "`true` iff every byte was
/// accepted".
pub struct TcpTransport {
    stream: TcpStream,
}

impl TcpTransport {
    /// Connects to a peer and switches the stream to non-blocking mode.
    pub fn connect<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        let stream = TcpStream::connect(addr)?;
        Self::from_stream(stream)
    }

    /// Wraps an already-established stream (e.g. one accepted from a
    /// listener) and switches it to non-blocking mode.
    pub fn from_stream(stream: TcpStream) -> io::Result<Self> {
        stream.set_nonblocking(true)?;
        Ok(Self { stream })
    }

    pub fn stream(&self) -> &TcpStream {
        &self.stream
    }
}

impl Transport for TcpTransport {
    fn read(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        match self.stream.read(&mut byte) {
            Ok(1) => Some(byte[0]),
            // 0 bytes means EOF (peer closed); poll() just wants "is there a
            // byte now", so both EOF and WouldBlock read as "no".
            Ok(_) => None,
            Err(_) => None,
        }
    }

    fn write(&mut self, bytes: &[u8]) -> bool {
        let mut written = 0;
        while written < bytes.len() {
            match self.stream.write(&bytes[written..]) {
                Ok(0) => return false,
                Ok(count) => written += count,
                Err(err)
                    if err.kind() == io::ErrorKind::WouldBlock
                        || err.kind() == io::ErrorKind::Interrupted =>
                {
                    continue;
                }
                Err(_) => return false,
            }
        }
        true
    }
}
