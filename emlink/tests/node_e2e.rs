//! End-to-end scenarios over the in-memory loopback link.

use core::cell::RefCell;

use emlink::core::{max_frame_size, max_packet_size, Error};
use emlink::framer::create_packet;
use emlink::node::Node;
use emlink::router::{Router, TypedHandler};
use emlink::transport::{Loopback, Transport};
use emlink::wire::{Message, Reader, Writer};

const MAX_PAYLOAD: usize = 32;
const MAX_FRAME: usize = max_frame_size(MAX_PAYLOAD);
const MAX_PACKET: usize = max_packet_size(MAX_PAYLOAD);

type TestNode<'a, T> = Node<'a, T, MAX_FRAME, MAX_PACKET, 4>;

#[test]
fn test_happy_path() {
    let link = Loopback::<256>::new();
    let (end_a, end_b) = link.split();

    let mut publisher: TestNode<'_, _> = Node::new(end_a);
    let mut subscriber: TestNode<'_, _> = Node::new(end_b);

    let received = RefCell::new(Vec::new());
    let mut on_msg = |payload: &[u8], msg_hash: u32| -> Result<(), Error> {
        received.borrow_mut().push((msg_hash, payload.to_vec()));
        Ok(())
    };
    subscriber.register_handler(9, &mut on_msg).unwrap();

    publisher.publish(9, 0xaabb_ccdd, &[0x10, 0x00, 0x20]).unwrap();
    assert_eq!(subscriber.poll(), 0);

    let received = received.borrow();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0], (0xaabb_ccdd, vec![0x10, 0x00, 0x20]));
}

#[test]
fn test_empty_payload_round_trip() {
    let link = Loopback::<256>::new();
    let (end_a, end_b) = link.split();

    let mut publisher: TestNode<'_, _> = Node::new(end_a);
    let mut subscriber: TestNode<'_, _> = Node::new(end_b);

    let hits = RefCell::new(0usize);
    let mut on_msg = |payload: &[u8], _: u32| -> Result<(), Error> {
        assert!(payload.is_empty());
        *hits.borrow_mut() += 1;
        Ok(())
    };
    subscriber.register_handler(1, &mut on_msg).unwrap();

    publisher.publish(1, 0, &[]).unwrap();
    assert_eq!(subscriber.poll(), 0);
    assert_eq!(*hits.borrow(), 1);
}

#[test]
fn test_version_reject() {
    let link = Loopback::<256>::new();
    let (end_a, end_b) = link.split();

    // The peer speaks version 2; the subscriber expects 1.
    let mut publisher: TestNode<'_, _> = Node::with_version(end_a, 2);
    let mut subscriber: TestNode<'_, _> = Node::new(end_b);

    let hits = RefCell::new(0usize);
    let mut on_msg = |_: &[u8], _: u32| -> Result<(), Error> {
        *hits.borrow_mut() += 1;
        Ok(())
    };
    subscriber.register_handler(9, &mut on_msg).unwrap();

    publisher.publish(9, 0, &[1, 2, 3]).unwrap();
    assert_eq!(subscriber.poll(), 1);
    assert_eq!(*hits.borrow(), 0);
}

#[test]
fn test_length_mismatch() {
    let link = Loopback::<256>::new();
    let (mut wire, end_b) = link.split();

    let mut subscriber: TestNode<'_, _> = Node::new(end_b);
    let hits = RefCell::new(0usize);
    let mut on_msg = |_: &[u8], _: u32| -> Result<(), Error> {
        *hits.borrow_mut() += 1;
        Ok(())
    };
    subscriber.register_handler(9, &mut on_msg).unwrap();

    // Build a frame whose len field claims 1 while carrying 3 payload bytes.
    // The CRC is computed over the corrupted frame, so only the router can
    // notice.
    let router = Router::<'_, 1>::new(1);
    let mut frame = [0u8; MAX_FRAME];
    let frame_len = router.build_frame(9, 0, &[9, 8, 7], &mut frame).unwrap();
    frame[7] = 0x01;

    let mut packet = [0u8; MAX_PACKET];
    let packet_len = create_packet(&frame[..frame_len], &mut packet).unwrap();
    assert!(wire.write(&packet[..packet_len]));

    assert_eq!(subscriber.poll(), 1);
    assert_eq!(*hits.borrow(), 0);
}

#[test]
fn test_crc_corruption_then_resync() {
    let link = Loopback::<256>::new();
    let (mut wire, end_b) = link.split();

    let mut subscriber: TestNode<'_, _> = Node::new(end_b);
    let received = RefCell::new(Vec::new());
    let mut on_msg = |payload: &[u8], _: u32| -> Result<(), Error> {
        received.borrow_mut().push(payload.to_vec());
        Ok(())
    };
    subscriber.register_handler(9, &mut on_msg).unwrap();

    let router = Router::<'_, 1>::new(1);
    let mut frame = [0u8; MAX_FRAME];
    let frame_len = router.build_frame(9, 0, &[0x11, 0x22, 0x33], &mut frame).unwrap();
    let mut packet = [0u8; MAX_PACKET];
    let packet_len = create_packet(&frame[..frame_len], &mut packet).unwrap();

    // Flip one bit of a non-delimiter byte in transit.
    let mut corrupted = packet;
    corrupted[1] ^= 0x40;
    assert_ne!(corrupted[1], 0x00);
    assert!(wire.write(&corrupted[..packet_len]));
    assert_eq!(subscriber.poll(), 1);
    assert!(received.borrow().is_empty());

    // The stream resynchronized; the clean packet still goes through.
    assert!(wire.write(&packet[..packet_len]));
    assert_eq!(subscriber.poll(), 0);
    assert_eq!(received.borrow().as_slice(), &[vec![0x11, 0x22, 0x33]]);
}

// Hand-expanded generator output for:
//
//   struct Setpoint {
//       uint32_t val;
//   };
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Setpoint {
    val: u32,
}

impl Message for Setpoint {
    const MSG_HASH: u32 = 0xaa55_aa55;
    const PAYLOAD_SIZE: usize = 4;

    fn encode(&self, out: &mut [u8]) -> Result<usize, Error> {
        let mut writer = Writer::new(out);
        writer.write(self.val)?;
        Ok(writer.bytes_written())
    }

    fn decode(payload: &[u8]) -> Result<Self, Error> {
        let mut reader = Reader::new(payload);
        Ok(Self { val: reader.read()? })
    }
}

#[test]
fn test_typed_dispatch() {
    let link = Loopback::<256>::new();
    let (end_a, end_b) = link.split();

    let mut publisher: TestNode<'_, _> = Node::new(end_a);
    let mut subscriber: TestNode<'_, _> = Node::new(end_b);

    let seen = RefCell::new(Vec::new());
    let mut handler = TypedHandler::new(|msg: &Setpoint| -> Result<(), Error> {
        seen.borrow_mut().push(*msg);
        Ok(())
    });
    subscriber.register_handler(10, &mut handler).unwrap();

    publisher.publish_msg(10, &Setpoint { val: 0x1234_5678 }).unwrap();
    assert_eq!(subscriber.poll(), 0);
    assert_eq!(seen.borrow().as_slice(), &[Setpoint { val: 0x1234_5678 }]);

    // The same payload under hash 0 is rejected before the handler runs.
    let mut payload = [0u8; Setpoint::PAYLOAD_SIZE];
    Setpoint { val: 0x1234_5678 }.encode(&mut payload).unwrap();
    publisher.publish(10, 0, &payload).unwrap();
    assert_eq!(subscriber.poll(), 1);
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn test_unknown_id_counts_error() {
    let link = Loopback::<256>::new();
    let (end_a, end_b) = link.split();

    let mut publisher: TestNode<'_, _> = Node::new(end_a);
    let mut subscriber: TestNode<'_, _> = Node::new(end_b);

    publisher.publish(42, 0, &[1]).unwrap();
    assert_eq!(subscriber.poll(), 1);
}

#[test]
fn test_loopback_stress() {
    const COUNT: usize = 1000;

    let link = Loopback::<256>::new();
    let (end_a, end_b) = link.split();

    let mut publisher: TestNode<'_, _> = Node::new(end_a);
    let mut subscriber: TestNode<'_, _> = Node::new(end_b);

    let received = RefCell::new(Vec::new());
    let mut on_0 = |p: &[u8], h: u32| -> Result<(), Error> {
        received.borrow_mut().push((0u8, h, p.to_vec()));
        Ok(())
    };
    let mut on_1 = |p: &[u8], h: u32| -> Result<(), Error> {
        received.borrow_mut().push((1u8, h, p.to_vec()));
        Ok(())
    };
    let mut on_2 = |p: &[u8], h: u32| -> Result<(), Error> {
        received.borrow_mut().push((2u8, h, p.to_vec()));
        Ok(())
    };
    let mut on_3 = |p: &[u8], h: u32| -> Result<(), Error> {
        received.borrow_mut().push((3u8, h, p.to_vec()));
        Ok(())
    };
    subscriber.register_handler(0, &mut on_0).unwrap();
    subscriber.register_handler(1, &mut on_1).unwrap();
    subscriber.register_handler(2, &mut on_2).unwrap();
    subscriber.register_handler(3, &mut on_3).unwrap();

    let mut expected = Vec::new();
    for index in 0..COUNT {
        let msg_id = (index % 4) as u8;
        let msg_hash = (index as u32).wrapping_mul(0x9e37_79b9);
        let len = index % (MAX_PAYLOAD + 1);
        // Payload pattern with plenty of embedded zeros.
        let payload: Vec<u8> = (0..len)
            .map(|offset| {
                if (index + offset) % 5 == 0 {
                    0x00
                } else {
                    (index + offset) as u8
                }
            })
            .collect();

        publisher.publish(msg_id, msg_hash, &payload).unwrap();
        assert_eq!(subscriber.poll(), 0);
        expected.push((msg_id, msg_hash, payload));
    }

    assert_eq!(*received.borrow(), expected);
}
