//! Transport interface and the in-memory loopback link
//!
//! A transport is whatever the embedder has: a UART, a TCP socket, a DMA
//! ring. The stack only needs non-blocking byte reads and an all-or-nothing
//! write.

use core::cell::RefCell;

use heapless::Deque;

/// Byte-stream transport supplied by the embedder.
pub trait Transport {
    /// Pulls one byte if one is available right now. Never blocks.
    fn read(&mut self) -> Option<u8>;

    /// Writes `bytes`; returns `true` iff every byte was accepted.
    fn write(&mut self, bytes: &[u8]) -> bool;
}

/// A pair of fixed-capacity byte queues forming a bidirectional in-memory
/// link.
///
/// [`split`](Loopback::split) yields two connected [`LoopbackEnd`]
/// transports: what one end writes, the other reads. Single-threaded and
/// allocation-free; useful for tests, demos and intra-device loopback.
pub struct Loopback<const N: usize> {
    a_to_b: RefCell<Deque<u8, N>>,
    b_to_a: RefCell<Deque<u8, N>>,
}

impl<const N: usize> Loopback<N> {
    pub const fn new() -> Self {
        Self {
            a_to_b: RefCell::new(Deque::new()),
            b_to_a: RefCell::new(Deque::new()),
        }
    }

    pub fn split(&self) -> (LoopbackEnd<'_, N>, LoopbackEnd<'_, N>) {
        (
            LoopbackEnd {
                rx: &self.b_to_a,
                tx: &self.a_to_b,
            },
            LoopbackEnd {
                rx: &self.a_to_b,
                tx: &self.b_to_a,
            },
        )
    }
}

impl<const N: usize> Default for Loopback<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// One end of a [`Loopback`] link.
pub struct LoopbackEnd<'a, const N: usize> {
    rx: &'a RefCell<Deque<u8, N>>,
    tx: &'a RefCell<Deque<u8, N>>,
}

impl<const N: usize> Transport for LoopbackEnd<'_, N> {
    fn read(&mut self) -> Option<u8> {
        self.rx.borrow_mut().pop_front()
    }

    fn write(&mut self, bytes: &[u8]) -> bool {
        let mut queue = self.tx.borrow_mut();
        // All-or-nothing: reject instead of queueing a torn packet.
        if queue.capacity() - queue.len() < bytes.len() {
            return false;
        }
        for &byte in bytes {
            // Capacity was checked above.
            if queue.push_back(byte).is_err() {
                return false;
            }
        }
        true
    }
}
