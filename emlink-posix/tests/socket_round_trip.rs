//! Round trips over real sockets on localhost.

use std::cell::RefCell;
use std::net::TcpListener;
use std::thread;
use std::time::{Duration, Instant};

use emlink::core::{max_frame_size, max_packet_size, Error};
use emlink::node::Node;
use emlink_posix::{TcpTransport, UdpTransport};

const MAX_PAYLOAD: usize = 32;
const MAX_FRAME: usize = max_frame_size(MAX_PAYLOAD);
const MAX_PACKET: usize = max_packet_size(MAX_PAYLOAD);

type HostNode<'a, T> = Node<'a, T, MAX_FRAME, MAX_PACKET, 4>;

#[test]
fn test_tcp_round_trip() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let client = TcpTransport::connect(addr).unwrap();
    let (accepted, _) = listener.accept().unwrap();
    let server = TcpTransport::from_stream(accepted).unwrap();

    let mut publisher: HostNode<'_, _> = Node::new(client);
    let mut subscriber: HostNode<'_, _> = Node::new(server);

    let received = RefCell::new(Vec::new());
    let mut on_msg = |payload: &[u8], msg_hash: u32| -> Result<(), Error> {
        received.borrow_mut().push((msg_hash, payload.to_vec()));
        Ok(())
    };
    subscriber.register_handler(9, &mut on_msg).unwrap();

    publisher.publish(9, 0xdead_beef, &[1, 0, 2, 0, 3]).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while received.borrow().is_empty() {
        assert!(Instant::now() < deadline, "timed out waiting for the frame");
        subscriber.poll();
        thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(received.borrow()[0], (0xdead_beef, vec![1, 0, 2, 0, 3]));
}

#[test]
fn test_udp_round_trip() {
    let mut sender = UdpTransport::bind("127.0.0.1:0").unwrap();
    let receiver = UdpTransport::bind("127.0.0.1:0").unwrap();
    sender.set_destination(receiver.local_addr().unwrap());

    let mut publisher: HostNode<'_, _> = Node::new(sender);
    let mut subscriber: HostNode<'_, _> = Node::new(receiver);

    let received = RefCell::new(Vec::new());
    let mut on_msg = |payload: &[u8], _: u32| -> Result<(), Error> {
        received.borrow_mut().push(payload.to_vec());
        Ok(())
    };
    subscriber.register_handler(3, &mut on_msg).unwrap();

    publisher.publish(3, 0, &[0xab, 0x00, 0xcd]).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while received.borrow().is_empty() {
        assert!(Instant::now() < deadline, "timed out waiting for the frame");
        subscriber.poll();
        thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(received.borrow()[0], vec![0xab, 0x00, 0xcd]);
}
