//! # Nanolink Driver
//!
//! `nanolink` is the host-side driver for an Arduino Nano 33 BLE sensor node.
//! The node streams small checksummed report frames (ambient light, temperature,
//! soil moisture, motion, actuator acknowledgements) and accepts upstream value
//! frames in the same framing. This crate provides the frame codec, the stream
//! channel, and typed access to the readings.
//!
//! Every frame on the wire is `[id, payload.., checksum]`, where the trailing
//! byte is the additive checksum (byte sum modulo 256) of everything before it.

extern crate byteorder;
extern crate log;

pub mod base;
mod checksum;
pub mod ids;
mod internals;
mod parsers;
mod protocol;
pub mod types;
pub mod utils;

pub use crate::base::{Channel, Error, Message, Result};
pub use crate::checksum::{checksum_of, Checksum};
pub use crate::protocol::NanolinkHostProtocol;
pub use crate::types::{Actuator, SensorReading};

use crate::internals::*;
use crate::parsers::report_parser::parse_report;
use byteorder::{ByteOrder, LittleEndian};
use log::{trace, warn};
use std::io::{Read, Write};
use std::time::Duration;

/// Represents a connection to and control interface for a sensor node.
///
/// This struct provides methods to grab typed readings from the node's report
/// stream and to push confirmed telemetry values back upstream.
///
/// It requires a `Channel` configured with `NanolinkHostProtocol` for communication.
#[derive(Debug)]
pub struct NanolinkDevice<T: ?Sized> {
    channel: Channel<NanolinkHostProtocol, T>,
}

impl<T: ?Sized> NanolinkDevice<T>
where
    T: Read + Write,
{
    /// Constructs a new `NanolinkDevice` using an existing `Channel`.
    ///
    /// # Arguments
    ///
    /// * `channel` - A `Channel` instance configured with `NanolinkHostProtocol` and
    ///   connected to the node's communication stream (e.g., a serial bridge to the BLE adapter).
    ///
    /// # Example
    /// ```ignore
    /// # use nanolink::{Channel, NanolinkDevice, NanolinkHostProtocol};
    /// let serial_port = serialport::new("/dev/ttyACM0", 115200).open()?;
    /// let channel = Channel::new(NanolinkHostProtocol::new(), serial_port);
    /// let mut node = NanolinkDevice::new(channel);
    /// ```
    pub fn new(channel: Channel<NanolinkHostProtocol, T>) -> NanolinkDevice<T> {
        trace!("Creating new NanolinkDevice");
        NanolinkDevice { channel }
    }

    /// Constructs a new `NanolinkDevice` directly from a communication stream.
    ///
    /// This is a convenience method that creates the `Channel` and
    /// `NanolinkHostProtocol` internally.
    ///
    /// # Arguments
    ///
    /// * `stream` - A boxed `Read + Write` object representing the communication stream.
    pub fn with_stream(stream: Box<T>) -> NanolinkDevice<T> {
        NanolinkDevice::<T>::new(Channel::new(NanolinkHostProtocol::new(), stream))
    }

    /// Grabs the next typed reading from the node's report stream.
    /// Uses the default timeout (`NANOLINK_DEFAULT_TIMEOUT`).
    pub fn grab_reading(&mut self) -> Result<SensorReading> {
        self.grab_reading_with_timeout(NANOLINK_DEFAULT_TIMEOUT)
    }

    /// Grabs the next typed reading with a specified timeout.
    ///
    /// Corrupt frames are dropped by the decoder and do not surface here; the
    /// call returns the next frame that verifies, or times out.
    ///
    /// # Arguments
    ///
    /// * `timeout` - The maximum duration to wait for a valid frame.
    pub fn grab_reading_with_timeout(&mut self, timeout: Duration) -> Result<SensorReading> {
        match self.channel.read_until(timeout) {
            Ok(Some(msg)) => parse_report(&msg),
            Ok(None) => {
                warn!("No frame decoded before timeout");
                Err(Error::OperationTimeout)
            }
            Err(e) => Err(e),
        }
    }

    /// Sends one confirmed telemetry value back to the node.
    ///
    /// # Arguments
    ///
    /// * `sensor_id` - The destination ID on the node (see [`crate::ids`]).
    /// * `value` - The value to echo, written as a little-endian u16.
    pub fn send_value(&mut self, sensor_id: u8, value: u16) -> Result<()> {
        trace!(
            "Sending upstream value {} for source {:02X}",
            value,
            sensor_id
        );
        let mut payload = [0; 2];
        LittleEndian::write_u16(&mut payload, value);

        self.channel.write(&Message::with_data(sensor_id, &payload))?;
        Ok(())
    }

    /// Sends a batch of confirmed telemetry values upstream in MTU-sized chunks.
    ///
    /// # Arguments
    ///
    /// * `values` - Pairs of destination ID and value, sent back to back.
    pub fn send_values(&mut self, values: &[(u8, u16)]) -> Result<()> {
        let mut messages = Vec::with_capacity(values.len());
        for (sensor_id, value) in values {
            let mut payload = [0; 2];
            LittleEndian::write_u16(&mut payload, *value);
            messages.push(Message::with_data(*sensor_id, &payload));
        }

        self.channel
            .write_all_chunked(&messages, NANOLINK_UPSTREAM_CHUNK_SIZE)?;
        Ok(())
    }
}
