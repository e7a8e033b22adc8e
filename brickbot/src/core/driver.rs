//! BrickDriver trait definition

use crate::core::types::{MotorPort, SensorPort, SensorType};
use crate::error::Result;

/// Hardware access trait for a two-motor brick controller
///
/// Every call may fail with a recoverable error; callers decide the
/// fallback policy per call site.
pub trait BrickDriver: Send {
    /// Read the current value of a sensor port
    fn get_sensor(&mut self, port: SensorPort) -> Result<f64>;

    /// Configure what is attached to a sensor port
    fn set_sensor_type(&mut self, port: SensorPort, sensor_type: SensorType) -> Result<()>;

    /// Read a motor encoder position (degrees)
    fn get_motor_encoder(&mut self, port: MotorPort) -> Result<i32>;

    /// Shift the encoder reference so that future reads drop by `value`
    fn offset_motor_encoder(&mut self, port: MotorPort, value: i32) -> Result<()>;

    /// Set motor power in percent (-100 to 100)
    fn set_motor_power(&mut self, port: MotorPort, percent: f64) -> Result<()>;

    /// Unconfigure sensors, disable motors and return control to the firmware
    fn reset_all(&mut self) -> Result<()>;

    /// Zero an encoder at its current position
    fn reset_encoder(&mut self, port: MotorPort) -> Result<()> {
        let current = self.get_motor_encoder(port)?;
        self.offset_motor_encoder(port, current)
    }
}
