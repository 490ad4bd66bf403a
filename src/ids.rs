// Report sources streamed by the node (node -> host)

/// Source ID of the DFR0022 ambient light module. Reports a raw 10-bit ADC value.
pub const NANOLINK_ID_AMBIENT_LIGHT: u8 = 0x01;

/// Source ID of the servo actuator. Reports a one-byte completion status.
pub const NANOLINK_ID_SERVO: u8 = 0x02;

/// Source ID of the PIR motion sensor. Reports a one-byte detection flag.
pub const NANOLINK_ID_PIR: u8 = 0x03;

/// Source ID of the speaker actuator. Reports a one-byte completion status.
pub const NANOLINK_ID_SPEAKER: u8 = 0x04;

/// Source ID of the temperature sensor. Reports a raw u16 value.
pub const NANOLINK_ID_TEMPERATURE: u8 = 0x05;

/// Source ID of the soil moisture probe. Reports a raw 10-bit ADC value.
pub const NANOLINK_ID_SOIL_MOISTURE: u8 = 0x06;

/// Source ID of the pump actuator. Reports a one-byte completion status.
pub const NANOLINK_ID_PUMP: u8 = 0x07;

// Frame geometry
//
// Every frame is `[id, payload.., checksum]` with the payload length fixed by
// the source ID: measurement sources carry a little-endian u16 value, actuator
// and event sources carry a single status byte.

/// Total frame length (ID + payload + checksum) for frames carrying a u16 value.
pub const NANOLINK_VALUE_FRAME_LEN: usize = 4;

/// Total frame length for frames carrying a single status byte.
pub const NANOLINK_STATUS_FRAME_LEN: usize = 3;

/// Returns the total frame length implied by a source ID, or `None` for IDs
/// this link does not define.
#[inline]
pub fn frame_len(sensor_id: u8) -> Option<usize> {
    match sensor_id {
        NANOLINK_ID_AMBIENT_LIGHT | NANOLINK_ID_TEMPERATURE | NANOLINK_ID_SOIL_MOISTURE => {
            Some(NANOLINK_VALUE_FRAME_LEN)
        }
        NANOLINK_ID_SERVO | NANOLINK_ID_PIR | NANOLINK_ID_SPEAKER | NANOLINK_ID_PUMP => {
            Some(NANOLINK_STATUS_FRAME_LEN)
        }
        _ => None,
    }
}

/// Payload length (frame length minus the ID and checksum bytes) for a source ID.
#[inline]
pub fn payload_len(sensor_id: u8) -> Option<usize> {
    frame_len(sensor_id).map(|len| len - 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_geometry() {
        assert_eq!(frame_len(NANOLINK_ID_AMBIENT_LIGHT), Some(4));
        assert_eq!(frame_len(NANOLINK_ID_TEMPERATURE), Some(4));
        assert_eq!(frame_len(NANOLINK_ID_SOIL_MOISTURE), Some(4));
        assert_eq!(frame_len(NANOLINK_ID_SERVO), Some(3));
        assert_eq!(frame_len(NANOLINK_ID_PIR), Some(3));
        assert_eq!(frame_len(NANOLINK_ID_SPEAKER), Some(3));
        assert_eq!(frame_len(NANOLINK_ID_PUMP), Some(3));
        assert_eq!(frame_len(0x7F), None);
        assert_eq!(payload_len(NANOLINK_ID_TEMPERATURE), Some(2));
        assert_eq!(payload_len(NANOLINK_ID_PUMP), Some(1));
        assert_eq!(payload_len(0x00), None);
    }
}
