use crate::base::error::{Error, Result};
use crate::base::message::Message;
use crate::base::ring_byte_buffer::RingByteBuffer;
use crate::base::traits::{ProtocolDecoder, ProtocolEncoder};
use log::{error, trace};
use std::io;
use std::time::{Duration, Instant};

const DEFAULT_CHANNEL_READ_BUFFER_SIZE: usize = 1024;

/// Channel encodes and decodes frames with a protocol, and sends and receives bytes via a stream.
///
/// # Examples
/// ```ignore
/// let mut channel = Channel::new(
///     NanolinkHostProtocol::new(),
///     serial_port
/// );
///
/// channel.write(&Message::with_data(NANOLINK_ID_PUMP, &[0x01, 0x00])).unwrap();
/// ```
#[derive(Debug)]
pub struct Channel<P, T: ?Sized> {
    protocol: P,
    stream: Box<T>,
    read_buffer: RingByteBuffer,
}

impl<P, T: ?Sized> Channel<P, T>
where
    P: ProtocolDecoder + ProtocolEncoder,
    T: io::Read + io::Write,
{
    /// Creates a new `Channel` to read and write frames.
    ///
    /// # Example
    /// ```ignore
    /// let channel = Channel::new(
    ///     NanolinkHostProtocol::new(),
    ///     serial_port
    /// );
    /// ```
    pub fn new(protocol: P, stream: Box<T>) -> Channel<P, T> {
        Channel::with_read_buffer_size(protocol, stream, DEFAULT_CHANNEL_READ_BUFFER_SIZE)
    }

    /// Creates a new `Channel` with a non-default ring buffer capacity.
    ///
    /// # Arguments
    ///
    /// * `read_buffer_size` - Capacity of the staging buffer between the stream and the decoder.
    pub fn with_read_buffer_size(
        protocol: P,
        stream: Box<T>,
        read_buffer_size: usize,
    ) -> Channel<P, T> {
        trace!("Creating new Channel with buffer size {}", read_buffer_size);
        let mut chn = Channel {
            protocol,
            stream,
            read_buffer: RingByteBuffer::with_capacity(read_buffer_size),
        };

        chn.reset();
        chn
    }

    /// Resets the channel status.
    /// This function is usually used to reset the protocol encoder and decoder after a communication error.
    pub fn reset(&mut self) {
        trace!("Resetting Channel protocol encoder and decoder");
        self.protocol.reset_encoder();
        self.protocol.reset_decoder();
    }

    /// Reads the next frame from the channel.
    ///
    /// Returns `Ok(None)` when the stream currently has no complete frame to offer.
    ///
    /// # Example
    /// ```ignore
    /// if let Some(msg) = channel.read().unwrap() {
    ///     println!("{:?}", msg);
    /// }
    /// ```
    pub fn read(&mut self) -> Result<Option<Message>> {
        loop {
            self.read_buffer.read_from(&mut self.stream)?;

            if self.read_buffer.is_empty() {
                return Ok(None);
            }

            match self.protocol.decode(self.read_buffer.current_read_slice()) {
                Ok((decoded_bytes, msg_option)) => {
                    if decoded_bytes > 0 {
                        self.read_buffer.skip_bytes(decoded_bytes);
                    }

                    if let Some(msg) = msg_option {
                        trace!(
                            "Decoded frame: id={:02X}, data_len={}",
                            msg.sensor_id,
                            msg.data.len()
                        );
                        return Ok(Some(msg));
                    }

                    if decoded_bytes == 0 {
                        // Decoder needs more data than the stream has right now.
                        return Ok(None);
                    }
                }
                Err(e) => {
                    error!("Protocol decode error: {:?}", e);
                    self.protocol.reset_decoder();
                    return Err(e);
                }
            }
        }
    }

    /// Reads frames until one is decoded or the timeout expires.
    ///
    /// # Example
    /// ```ignore
    /// channel.read_until(Duration::from_secs(1));
    /// ```
    pub fn read_until(&mut self, timeout: Duration) -> Result<Option<Message>> {
        trace!("Channel read_until called with timeout {:?}", timeout);
        let start = Instant::now();

        loop {
            if !self.read_buffer.is_empty() {
                match self.protocol.decode(self.read_buffer.current_read_slice()) {
                    Ok((decoded_bytes, msg_option)) => {
                        if decoded_bytes > 0 {
                            self.read_buffer.skip_bytes(decoded_bytes);
                        }
                        if let Some(msg) = msg_option {
                            return Ok(Some(msg));
                        }
                    }
                    Err(e) => {
                        error!("Protocol decode error: {:?}", e);
                        self.protocol.reset_decoder();
                        return Err(e);
                    }
                }
            }

            if start.elapsed() >= timeout {
                trace!("Overall timeout reached waiting for a frame");
                return Err(Error::OperationTimeout);
            }

            // The stream should be configured with a short read timeout so this
            // never blocks for the entire remaining duration.
            self.read_buffer.read_from(&mut self.stream)?;
        }
    }

    /// Writes a frame to the channel.
    ///
    /// # Example
    /// ```ignore
    /// channel.write(&Message::with_data(NANOLINK_ID_SERVO, &[0x01, 0x00])).unwrap();
    /// ```
    pub fn write(&mut self, msg: &Message) -> Result<usize> {
        trace!(
            "Channel write called: id={:02X}, data_len={}",
            msg.sensor_id,
            msg.data.len()
        );
        let written = self.protocol.write_to(msg, &mut self.stream)?;
        self.stream.flush()?;
        Ok(written)
    }

    /// Encodes a batch of frames into one buffer and writes it in bounded chunks.
    ///
    /// The node's BLE characteristic rejects writes longer than its MTU, so a
    /// batch of upstream frames has to be split into `max_chunk`-sized writes.
    /// Returns the total number of bytes written.
    ///
    /// # Arguments
    ///
    /// * `messages` - The frames to encode back to back.
    /// * `max_chunk` - The largest number of bytes per stream write. Must be non-zero.
    pub fn write_all_chunked(&mut self, messages: &[Message], max_chunk: usize) -> Result<usize> {
        if max_chunk == 0 {
            return Err(Error::OperationFail {
                description: "chunk size must be non-zero".to_owned(),
            });
        }
        if messages.is_empty() {
            return Ok(0);
        }

        let mut batch = Vec::new();
        for msg in messages {
            let encoded_size = self.protocol.estimate_encoded_size(msg)?;
            let start = batch.len();
            batch.resize(start + encoded_size, 0);
            let written = self.protocol.encode(msg, &mut batch[start..])?;
            batch.truncate(start + written);
        }

        let total_chunks = (batch.len() + max_chunk - 1) / max_chunk;
        trace!(
            "Sending upstream batch of {} bytes in {} chunks",
            batch.len(),
            total_chunks
        );
        for chunk in batch.chunks(max_chunk) {
            self.stream.write_all(chunk)?;
            self.stream.flush()?;
        }

        Ok(batch.len())
    }
}
