/// A single frame exchanged with the sensor node, minus its trailing checksum.
///
/// The checksum byte is produced and verified by the frame codec and never
/// stored here.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// The source or destination ID the frame belongs to (see [`crate::ids`]).
    pub sensor_id: u8,

    /// The frame payload: a little-endian u16 value or a single status byte,
    /// depending on the ID.
    pub data: Vec<u8>,
}

impl Message {
    /// Creates a new message with a sensor ID and no payload.
    ///
    /// # Arguments
    ///
    /// * `sensor_id` - The source or destination ID for the message.
    pub fn new(sensor_id: u8) -> Message {
        Message::with_data(sensor_id, &[])
    }

    /// Creates a new message with a sensor ID and payload data.
    ///
    /// # Arguments
    ///
    /// * `sensor_id` - The source or destination ID for the message.
    /// * `data` - A slice containing the payload data.
    #[inline]
    pub fn with_data(sensor_id: u8, data: &[u8]) -> Message {
        Message {
            sensor_id,
            data: data.to_vec(),
        }
    }
}
