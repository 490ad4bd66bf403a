use crate::ids::*;

/// The actuators on the sensor node that acknowledge commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actuator {
    /// The servo actuator.
    Servo,
    /// The speaker.
    Speaker,
    /// The irrigation pump.
    Pump,
}

impl Actuator {
    /// Returns the wire source ID of this actuator.
    #[inline]
    pub fn id(&self) -> u8 {
        match self {
            Actuator::Servo => NANOLINK_ID_SERVO,
            Actuator::Speaker => NANOLINK_ID_SPEAKER,
            Actuator::Pump => NANOLINK_ID_PUMP,
        }
    }
}

/// A decoded report from the sensor node.
///
/// Measurement variants carry values already rescaled to engineering units
/// where the node reports raw ADC counts; see the individual variants.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorReading {
    /// Ambient light level from the DFR0022 module, in lux.
    AmbientLight { lux: f32 },

    /// Temperature value as reported by the node (no rescaling applied).
    Temperature { value: u16 },

    /// Soil moisture as a percentage of the probe's full scale.
    SoilMoisture { percent: f32 },

    /// Motion detection flag from the PIR sensor.
    Motion { detected: bool },

    /// Completion report for an actuator command.
    Ack { actuator: Actuator, success: bool },
}

impl SensorReading {
    /// Returns the wire source ID this reading was decoded from.
    pub fn source_id(&self) -> u8 {
        match self {
            SensorReading::AmbientLight { .. } => NANOLINK_ID_AMBIENT_LIGHT,
            SensorReading::Temperature { .. } => NANOLINK_ID_TEMPERATURE,
            SensorReading::SoilMoisture { .. } => NANOLINK_ID_SOIL_MOISTURE,
            SensorReading::Motion { .. } => NANOLINK_ID_PIR,
            SensorReading::Ack { actuator, .. } => actuator.id(),
        }
    }
}
