use crate::base::{Error, Message, Result};
use crate::ids::{self, *};
use crate::types::{Actuator, SensorReading};
use crate::utils::scale_adc;
use byteorder::{ByteOrder, LittleEndian};
use log::trace;

/// Engineering value of a full-scale ambient light reading, in lux.
const LUX_FULL_SCALE: f32 = 6000.0;

/// Engineering value of a full-scale soil moisture reading, in percent.
const MOISTURE_FULL_SCALE: f32 = 100.0;

/// Converts a decoded frame into a typed sensor reading.
///
/// The frame's checksum has already been verified by the decoder; this step
/// validates the payload geometry and applies the per-sensor scaling.
pub fn parse_report(msg: &Message) -> Result<SensorReading> {
    let expected = match ids::payload_len(msg.sensor_id) {
        Some(len) => len,
        None => {
            return Err(Error::ProtocolError {
                description: format!("unknown source id: {:02X}", msg.sensor_id),
            })
        }
    };

    if msg.data.len() != expected {
        return Err(Error::ProtocolError {
            description: format!(
                "invalid payload length for source {:02X}: expected {}, got {}",
                msg.sensor_id,
                expected,
                msg.data.len()
            ),
        });
    }

    let reading = match msg.sensor_id {
        NANOLINK_ID_AMBIENT_LIGHT => {
            let raw = LittleEndian::read_u16(&msg.data);
            SensorReading::AmbientLight {
                lux: scale_adc(raw, LUX_FULL_SCALE),
            }
        }
        NANOLINK_ID_TEMPERATURE => SensorReading::Temperature {
            value: LittleEndian::read_u16(&msg.data),
        },
        NANOLINK_ID_SOIL_MOISTURE => {
            let raw = LittleEndian::read_u16(&msg.data);
            SensorReading::SoilMoisture {
                percent: scale_adc(raw, MOISTURE_FULL_SCALE),
            }
        }
        NANOLINK_ID_PIR => SensorReading::Motion {
            detected: msg.data[0] != 0,
        },
        NANOLINK_ID_SERVO => ack(Actuator::Servo, msg.data[0]),
        NANOLINK_ID_SPEAKER => ack(Actuator::Speaker, msg.data[0]),
        NANOLINK_ID_PUMP => ack(Actuator::Pump, msg.data[0]),
        other => {
            return Err(Error::ProtocolError {
                description: format!("unknown source id: {:02X}", other),
            })
        }
    };

    trace!(
        "Parsed report from source {:02X}: {:?}",
        msg.sensor_id,
        reading
    );
    Ok(reading)
}

fn ack(actuator: Actuator, status: u8) -> SensorReading {
    SensorReading::Ack {
        actuator,
        success: status == 1,
    }
}

#[cfg(test)]
mod tests {
    use super::parse_report;
    use crate::base::Message;
    use crate::ids::*;
    use crate::types::{Actuator, SensorReading};

    #[test]
    fn parses_full_scale_light_report() {
        let msg = Message::with_data(NANOLINK_ID_AMBIENT_LIGHT, &[0xFF, 0x03]);
        assert_eq!(
            parse_report(&msg).unwrap(),
            SensorReading::AmbientLight { lux: 6000.0 }
        );
    }

    #[test]
    fn parses_soil_moisture_percent() {
        let msg = Message::with_data(NANOLINK_ID_SOIL_MOISTURE, &[0xFF, 0x01]);
        match parse_report(&msg).unwrap() {
            SensorReading::SoilMoisture { percent } => {
                // raw 511 of 1023
                assert!((percent - 49.95).abs() < 0.01);
            }
            other => panic!("unexpected reading: {:?}", other),
        }
    }

    #[test]
    fn temperature_value_passes_through_unscaled() {
        let msg = Message::with_data(NANOLINK_ID_TEMPERATURE, &[0x34, 0x12]);
        assert_eq!(
            parse_report(&msg).unwrap(),
            SensorReading::Temperature { value: 0x1234 }
        );
    }

    #[test]
    fn parses_motion_flag() {
        let idle = Message::with_data(NANOLINK_ID_PIR, &[0x00]);
        let triggered = Message::with_data(NANOLINK_ID_PIR, &[0x02]);
        assert_eq!(
            parse_report(&idle).unwrap(),
            SensorReading::Motion { detected: false }
        );
        assert_eq!(
            parse_report(&triggered).unwrap(),
            SensorReading::Motion { detected: true }
        );
    }

    #[test]
    fn parses_actuator_acks() {
        let ok = Message::with_data(NANOLINK_ID_PUMP, &[0x01]);
        let failed = Message::with_data(NANOLINK_ID_SERVO, &[0x00]);
        assert_eq!(
            parse_report(&ok).unwrap(),
            SensorReading::Ack {
                actuator: Actuator::Pump,
                success: true
            }
        );
        assert_eq!(
            parse_report(&failed).unwrap(),
            SensorReading::Ack {
                actuator: Actuator::Servo,
                success: false
            }
        );
    }

    #[test]
    fn reading_reports_its_source_id() {
        let msg = Message::with_data(NANOLINK_ID_SPEAKER, &[0x01]);
        let reading = parse_report(&msg).unwrap();
        assert_eq!(reading.source_id(), NANOLINK_ID_SPEAKER);
    }

    #[test]
    fn rejects_wrong_payload_length() {
        let msg = Message::with_data(NANOLINK_ID_TEMPERATURE, &[0x01]);
        assert!(parse_report(&msg).is_err());
    }

    #[test]
    fn rejects_unknown_source_id() {
        let msg = Message::with_data(0xEE, &[0x01, 0x02]);
        assert!(parse_report(&msg).is_err());
    }
}
