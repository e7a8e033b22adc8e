//! Drive command translation
//!
//! Maps an abstract (motor1, motor2) power pair onto the two wheel ports.
//! Two calibrations exist and must stay separate: the default one trims a
//! left-motor bias, the odometry one scales both sides up and trims the
//! left side by one percent before scaling.

use crate::core::driver::BrickDriver;
use crate::core::types::{DriveCommand, MotorPort};
use crate::error::Result;

/// Left-motor bias removed by the default calibration (percent)
const DEFAULT_PRIMARY_TRIM: f64 = 2.0;

/// Left-motor bias removed by the odometry calibration (percent, before scaling)
const ODOMETRY_PRIMARY_TRIM: f64 = 1.0;

/// Power gain applied by the odometry calibration
const ODOMETRY_GAIN: f64 = 1.5;

/// Concrete power for the primary (left) and secondary (right) port
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortPowers {
    pub primary: f64,
    pub secondary: f64,
}

/// Default calibration: `(motor1 - 2, motor2)`
pub fn drive_default(motor1: f64, motor2: f64) -> PortPowers {
    PortPowers {
        primary: motor1 - DEFAULT_PRIMARY_TRIM,
        secondary: motor2,
    }
}

/// Odometry calibration: `(1.5 * (motor1 - 1), 1.5 * motor2)`
pub fn drive_odometry(motor1: f64, motor2: f64) -> PortPowers {
    PortPowers {
        primary: ODOMETRY_GAIN * (motor1 - ODOMETRY_PRIMARY_TRIM),
        secondary: ODOMETRY_GAIN * motor2,
    }
}

/// Which calibration a drive call goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Calibration {
    Default,
    Odometry,
}

impl Calibration {
    #[inline]
    pub fn translate(self, motor1: f64, motor2: f64) -> PortPowers {
        match self {
            Calibration::Default => drive_default(motor1, motor2),
            Calibration::Odometry => drive_odometry(motor1, motor2),
        }
    }
}

/// Wiring of the two wheel motors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Drivetrain {
    /// Port receiving the primary (motor1, left wheel) power
    pub primary: MotorPort,
    /// Port receiving the secondary (motor2, right wheel) power
    pub secondary: MotorPort,
}

impl Drivetrain {
    pub fn new(primary: MotorPort, secondary: MotorPort) -> Self {
        Self { primary, secondary }
    }

    /// Translate a power pair and write it to both ports
    pub fn drive(
        &self,
        driver: &mut dyn BrickDriver,
        calibration: Calibration,
        motor1: f64,
        motor2: f64,
    ) -> Result<PortPowers> {
        let powers = calibration.translate(motor1, motor2);
        log::trace!(
            "Drive {:?} ({:.1}, {:.1}) -> {}={:.1}, {}={:.1}",
            calibration,
            motor1,
            motor2,
            self.primary,
            powers.primary,
            self.secondary,
            powers.secondary
        );
        driver.set_motor_power(self.primary, powers.primary)?;
        driver.set_motor_power(self.secondary, powers.secondary)?;
        Ok(powers)
    }

    /// Drive a scripted command through the given calibration
    pub fn apply(
        &self,
        driver: &mut dyn BrickDriver,
        calibration: Calibration,
        command: DriveCommand,
    ) -> Result<PortPowers> {
        self.drive(driver, calibration, command.left_power, command.right_power)
    }

    /// Zero both wheel encoders at their current positions
    pub fn reset_encoders(&self, driver: &mut dyn BrickDriver) -> Result<()> {
        driver.reset_encoder(self.primary)?;
        driver.reset_encoder(self.secondary)
    }
}

impl Default for Drivetrain {
    fn default() -> Self {
        Self::new(MotorPort::C, MotorPort::B)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::mock::MockBrick;

    #[test]
    fn test_drive_default_trims_primary() {
        assert_eq!(
            drive_default(30.0, -30.0),
            PortPowers {
                primary: 28.0,
                secondary: -30.0
            }
        );
        assert_eq!(drive_default(2.0, 0.0).primary, 0.0);
    }

    #[test]
    fn test_drive_odometry_scaling() {
        assert_eq!(
            drive_odometry(1.0, 0.0),
            PortPowers {
                primary: 0.0,
                secondary: 0.0
            }
        );
        assert_eq!(
            drive_odometry(40.0, 40.0),
            PortPowers {
                primary: 58.5,
                secondary: 60.0
            }
        );
    }

    #[test]
    fn test_calibrations_differ() {
        assert_ne!(
            Calibration::Default.translate(40.0, 40.0),
            Calibration::Odometry.translate(40.0, 40.0)
        );
    }

    #[test]
    fn test_drivetrain_writes_ports() {
        let mut brick = MockBrick::default();
        let drivetrain = Drivetrain::default();

        drivetrain
            .drive(&mut brick, Calibration::Default, -30.0, 30.0)
            .unwrap();

        assert_eq!(brick.motor_power(MotorPort::C), -32.0);
        assert_eq!(brick.motor_power(MotorPort::B), 30.0);
    }
}
