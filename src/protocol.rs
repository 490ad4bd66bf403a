use crate::base::{Error, Message, ProtocolDecoder, ProtocolEncoder, Result};
use crate::checksum::{checksum_of, Checksum};
use crate::ids;
use log::{error, trace};
use std::cmp::min;
use std::io::Write;

/// Upstream frames always carry one little-endian u16 value.
const UPSTREAM_PAYLOAD_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq)]
enum DecodeStatus {
    WaitFrameId,
    ReceiveFrame,
}

/// The implementation of the host side of the node link framing.
///
/// This struct handles encoding upstream value frames (`Message` -> bytes) and
/// decoding node reports (bytes -> `Message`). Every frame on the wire is
/// `[id, payload.., checksum]`: the payload length is fixed by the source ID
/// and the trailing byte is the additive checksum of all preceding bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct NanolinkHostProtocol {
    status: DecodeStatus,
    frame: Vec<u8>,
    frame_len: usize,
}

impl NanolinkHostProtocol {
    /// Creates a new `NanolinkHostProtocol` instance in its initial state.
    pub fn new() -> NanolinkHostProtocol {
        NanolinkHostProtocol {
            status: DecodeStatus::WaitFrameId,
            frame: Vec::new(),
            frame_len: 0,
        }
    }

    fn start_wait_frame_id(&mut self) {
        self.status = DecodeStatus::WaitFrameId;
        self.frame.clear();
        self.frame_len = 0;
    }

    fn start_receive_frame(&mut self, sensor_id: u8, frame_len: usize) {
        trace!(
            "Decoder state -> ReceiveFrame (id: {:02X}, len: {})",
            sensor_id,
            frame_len
        );
        self.status = DecodeStatus::ReceiveFrame;
        self.frame.clear();
        self.frame.reserve(frame_len);
        self.frame.push(sensor_id);
        self.frame_len = frame_len;
    }

    /// Verifies the trailing checksum and unpacks the finished frame.
    ///
    /// A frame whose checksum does not match is dropped so decoding can
    /// continue at the next byte boundary; this link has no sync bytes to
    /// re-lock onto, so failing the whole stream would stall it.
    fn finish_frame(&mut self) -> Option<Message> {
        let (body, tail) = self.frame.split_at(self.frame_len - 1);
        let expected = checksum_of(body);
        let received = tail[0];

        if received != expected {
            error!(
                "Checksum mismatch for source {:02X}: expected {:02X}, got {:02X}, dropping frame",
                body[0], expected, received
            );
            return None;
        }

        Some(Message::with_data(body[0], &body[1..]))
    }
}

impl Default for NanolinkHostProtocol {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolDecoder for NanolinkHostProtocol {
    /// Decodes bytes from the input buffer according to the node link framing.
    ///
    /// Maintains internal state so a frame may arrive split across any number
    /// of reads. Returns the number of bytes consumed and an optional decoded
    /// `Message`. Bytes that are not a known source ID, and frames whose
    /// checksum does not verify, are consumed and discarded.
    fn decode(&mut self, buf: &[u8]) -> Result<(usize, Option<Message>)> {
        if buf.is_empty() {
            return Ok((0, None));
        }

        let mut i = 0;
        while i < buf.len() {
            match self.status {
                DecodeStatus::WaitFrameId => {
                    let sensor_id = buf[i];
                    i += 1;
                    match ids::frame_len(sensor_id) {
                        Some(frame_len) => self.start_receive_frame(sensor_id, frame_len),
                        None => error!("Unknown source id {:02X}, skipping byte", sensor_id),
                    }
                }
                DecodeStatus::ReceiveFrame => {
                    let bytes_to_read = self.frame_len - self.frame.len();
                    let bytes_actual_read = min(bytes_to_read, buf.len() - i);
                    self.frame.extend_from_slice(&buf[i..i + bytes_actual_read]);
                    i += bytes_actual_read;

                    if self.frame.len() == self.frame_len {
                        let msg = self.finish_frame();
                        self.start_wait_frame_id();
                        if msg.is_some() {
                            return Ok((i, msg));
                        }
                    }
                }
            }
        }

        Ok((i, None))
    }

    /// Resets the decoder's internal state, typically after a communication error.
    fn reset_decoder(&mut self) {
        trace!("Resetting decoder state");
        self.start_wait_frame_id();
    }
}

impl ProtocolEncoder for NanolinkHostProtocol {
    /// Encodes an upstream value frame into the provided byte buffer.
    ///
    /// Writes the destination ID, the payload, and the additive checksum of
    /// everything before it.
    fn encode(&mut self, msg: &Message, bytes: &mut [u8]) -> Result<usize> {
        let encoded_size = self.estimate_encoded_size(msg)?;
        if encoded_size > bytes.len() {
            error!(
                "Buffer too small: required {}, available {}",
                encoded_size,
                bytes.len()
            );
            return Err(Error::BufferTooSmall);
        }

        bytes[0] = msg.sensor_id;
        bytes[1..1 + msg.data.len()].clone_from_slice(&msg.data);

        let mut checksum = Checksum::new();
        checksum.push_slice(&bytes[0..1 + msg.data.len()]);
        bytes[1 + msg.data.len()] = checksum.checksum();

        trace!(
            "Encoded upstream frame: id={:02X}, checksum={:02X}",
            msg.sensor_id,
            bytes[1 + msg.data.len()]
        );
        Ok(encoded_size)
    }

    /// Estimates the size needed to encode an upstream value frame.
    fn estimate_encoded_size(&mut self, msg: &Message) -> Result<usize> {
        if msg.data.len() != UPSTREAM_PAYLOAD_LEN {
            return Err(Error::OperationFail {
                description: "upstream frames carry exactly one little-endian u16 value"
                    .to_owned(),
            });
        }

        // ID + payload + checksum
        Ok(2 + msg.data.len())
    }

    /// Encodes an upstream frame and writes it directly to a `Write` target.
    fn write_to(&mut self, msg: &Message, dest: &mut impl Write) -> Result<usize> {
        let encoded_size = self.estimate_encoded_size(msg)?;
        let mut buf = vec![0; encoded_size];
        let encoded_size = self.encode(msg, &mut buf[0..encoded_size])?;
        match dest.write_all(&buf[0..encoded_size]) {
            Ok(()) => Ok(encoded_size),
            Err(err) => {
                error!("IO error during write_all: {}", err);
                Err(err.into())
            }
        }
    }

    /// Resets the encoder's internal state (a no-op for this framing).
    fn reset_encoder(&mut self) {}
}

#[cfg(test)]
mod tests {
    use crate::base::{Message, ProtocolDecoder, ProtocolEncoder, Result};
    use crate::ids::*;
    use crate::protocol::NanolinkHostProtocol;

    fn encode<T: ProtocolEncoder>(protocol: &mut T, msg: &Message) -> Result<Vec<u8>> {
        let encoded_bytes = protocol.estimate_encoded_size(msg)?;
        let mut buf = vec![0; encoded_bytes];
        let encoded_bytes = protocol.encode(msg, &mut buf[0..encoded_bytes])?;
        buf.truncate(encoded_bytes);
        Ok(buf)
    }

    #[test]
    fn protocol_encode() {
        let mut protocol = NanolinkHostProtocol::new();

        assert_eq!(
            encode(
                &mut protocol,
                &Message::with_data(NANOLINK_ID_TEMPERATURE, &[0x02, 0x01])
            )
            .unwrap()
            .as_slice(),
            [0x05, 0x02, 0x01, 0x08]
        );

        // The checksum byte is the low byte of the frame sum.
        assert_eq!(
            encode(
                &mut protocol,
                &Message::with_data(NANOLINK_ID_SOIL_MOISTURE, &[0xFF, 0xFF])
            )
            .unwrap()
            .as_slice(),
            [0x06, 0xFF, 0xFF, 0x04]
        );
    }

    #[test]
    fn encode_rejects_non_value_payloads() {
        let mut protocol = NanolinkHostProtocol::new();

        assert!(encode(&mut protocol, &Message::new(NANOLINK_ID_SERVO)).is_err());
        assert!(encode(
            &mut protocol,
            &Message::with_data(NANOLINK_ID_SERVO, &[0x01, 0x02, 0x03])
        )
        .is_err());
    }

    #[test]
    fn decode_value_frame() {
        let mut protocol = NanolinkHostProtocol::new();

        let (consumed, msg) = protocol
            .decode(&[NANOLINK_ID_AMBIENT_LIGHT, 0xFF, 0x03, 0x03])
            .unwrap();
        assert_eq!(consumed, 4);
        assert_eq!(
            msg,
            Some(Message::with_data(NANOLINK_ID_AMBIENT_LIGHT, &[0xFF, 0x03]))
        );
    }

    #[test]
    fn decode_status_frame() {
        let mut protocol = NanolinkHostProtocol::new();

        let (consumed, msg) = protocol.decode(&[NANOLINK_ID_SERVO, 0x01, 0x03]).unwrap();
        assert_eq!(consumed, 3);
        assert_eq!(msg, Some(Message::with_data(NANOLINK_ID_SERVO, &[0x01])));
    }

    #[test]
    fn decode_across_split_buffers() {
        let mut protocol = NanolinkHostProtocol::new();
        let frame = [NANOLINK_ID_TEMPERATURE, 0x09, 0x02, 0x10];

        for byte in &frame[..3] {
            let (consumed, msg) = protocol.decode(std::slice::from_ref(byte)).unwrap();
            assert_eq!(consumed, 1);
            assert_eq!(msg, None);
        }

        let (consumed, msg) = protocol.decode(&frame[3..]).unwrap();
        assert_eq!(consumed, 1);
        assert_eq!(
            msg,
            Some(Message::with_data(NANOLINK_ID_TEMPERATURE, &[0x09, 0x02]))
        );
    }

    #[test]
    fn decode_drops_corrupt_frame_and_recovers() {
        let mut protocol = NanolinkHostProtocol::new();

        // First frame carries a wrong checksum; the PIR frame behind it must
        // still come out.
        let (consumed, msg) = protocol
            .decode(&[
                NANOLINK_ID_AMBIENT_LIGHT,
                0xFF,
                0x03,
                0x00,
                NANOLINK_ID_PIR,
                0x01,
                0x04,
            ])
            .unwrap();
        assert_eq!(consumed, 7);
        assert_eq!(msg, Some(Message::with_data(NANOLINK_ID_PIR, &[0x01])));
    }

    #[test]
    fn decode_skips_unknown_source_ids() {
        let mut protocol = NanolinkHostProtocol::new();

        let (consumed, msg) = protocol
            .decode(&[0xEE, 0xBA, NANOLINK_ID_TEMPERATURE, 0x09, 0x02, 0x10])
            .unwrap();
        assert_eq!(consumed, 6);
        assert_eq!(
            msg,
            Some(Message::with_data(NANOLINK_ID_TEMPERATURE, &[0x09, 0x02]))
        );
    }

    #[test]
    fn decode_empty_buffer() {
        let mut protocol = NanolinkHostProtocol::new();
        assert_eq!(protocol.decode(&[]).unwrap(), (0, None));
    }
}
