//! Simulates a sensor node publishing readings over TCP.
//!
//! Publishes a `SensorReading` twice a second and listens for `LedState`
//! commands from the peer.
//!
//! Usage: `tcp_sensor <ip:port>`

use std::env;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use emlink::core::{max_frame_size, max_packet_size, Error};
use emlink::node::Node;
use emlink::router::TypedHandler;
use emlink::wire::{fnv1a_32, Message, Reader, Writer};
use emlink_posix::TcpTransport;

const MAX_PAYLOAD: usize = 128;
const MAX_FRAME: usize = max_frame_size(MAX_PAYLOAD);
const MAX_PACKET: usize = max_packet_size(MAX_PAYLOAD);

const MSG_SENSOR_ID: u8 = 10;
const MSG_LED_ID: u8 = 11;

// Hand-expanded generator output for:
//
//   struct SensorReading {
//       uint8_t sensor_id;
//       float value;
//   };
#[derive(Debug, Clone, Copy)]
struct SensorReading {
    sensor_id: u8,
    value: f32,
}

impl Message for SensorReading {
    const MSG_HASH: u32 = fnv1a_32(b"structSensorReading{uint8_tsensor_id;floatvalue;};");
    const PAYLOAD_SIZE: usize = 5;

    fn encode(&self, out: &mut [u8]) -> Result<usize, Error> {
        let mut writer = Writer::new(out);
        writer.write(self.sensor_id)?;
        writer.write(self.value)?;
        Ok(writer.bytes_written())
    }

    fn decode(payload: &[u8]) -> Result<Self, Error> {
        let mut reader = Reader::new(payload);
        Ok(Self {
            sensor_id: reader.read()?,
            value: reader.read()?,
        })
    }
}

//   struct LedState {
//       bool on;
//       uint8_t brightness;
//   };
#[derive(Debug, Clone, Copy)]
struct LedState {
    on: bool,
    brightness: u8,
}

impl Message for LedState {
    const MSG_HASH: u32 = fnv1a_32(b"structLedState{boolon;uint8_tbrightness;};");
    const PAYLOAD_SIZE: usize = 2;

    fn encode(&self, out: &mut [u8]) -> Result<usize, Error> {
        let mut writer = Writer::new(out);
        writer.write(self.on)?;
        writer.write(self.brightness)?;
        Ok(writer.bytes_written())
    }

    fn decode(payload: &[u8]) -> Result<Self, Error> {
        let mut reader = Reader::new(payload);
        Ok(Self {
            on: reader.read()?,
            brightness: reader.read()?,
        })
    }
}

fn main() -> ExitCode {
    let Some(addr) = env::args().nth(1) else {
        eprintln!("usage: tcp_sensor <ip:port>");
        return ExitCode::FAILURE;
    };

    println!("Connecting to {addr}...");
    let transport = match TcpTransport::connect(addr.as_str()) {
        Ok(transport) => transport,
        Err(err) => {
            eprintln!("connection failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut on_led = TypedHandler::new(|led: &LedState| -> Result<(), Error> {
        println!("LED update: on={} brightness={}", led.on, led.brightness);
        Ok(())
    });

    let mut node: Node<'_, _, MAX_FRAME, MAX_PACKET, 4> = Node::new(transport);
    node.register_handler(MSG_LED_ID, &mut on_led).unwrap();

    let mut t = 0.0f32;
    loop {
        node.poll();

        // Simple simulated wave, 25 +/- 10.
        let reading = SensorReading {
            sensor_id: 101,
            value: t.sin() * 10.0 + 25.0,
        };
        t += 0.1;

        match node.publish_msg(MSG_SENSOR_ID, &reading) {
            Ok(()) => println!("sent SensorReading: {:.2}", reading.value),
            Err(err) => println!("failed to send: {err:?}"),
        }

        thread::sleep(Duration::from_millis(500));
    }
}
