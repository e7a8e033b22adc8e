//! Core data types shared by the drivers and the control loops.
//!
//! Key types:
//! - [`MotorPort`] / [`SensorPort`]: brick port identifiers
//! - [`Pose`]: robot position and heading in the odometry frame
//! - [`DriveCommand`]: one scripted (left, right) power pair
//! - [`WheelState`]: last encoder readings used for per-tick deltas

use serde::{Deserialize, Serialize};
use std::fmt;

/// Motor ports on the brick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotorPort {
    A,
    B,
    C,
    D,
}

impl MotorPort {
    /// All motor ports in hardware order
    pub const ALL: [MotorPort; 4] = [MotorPort::A, MotorPort::B, MotorPort::C, MotorPort::D];

    /// Zero-based index for per-port storage
    #[inline]
    pub fn index(self) -> usize {
        match self {
            MotorPort::A => 0,
            MotorPort::B => 1,
            MotorPort::C => 2,
            MotorPort::D => 3,
        }
    }
}

impl fmt::Display for MotorPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MotorPort::A => "A",
            MotorPort::B => "B",
            MotorPort::C => "C",
            MotorPort::D => "D",
        };
        write!(f, "port {}", name)
    }
}

/// Sensor ports on the brick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorPort {
    S1,
    S2,
    S3,
    S4,
}

impl SensorPort {
    /// Zero-based index for per-port storage
    #[inline]
    pub fn index(self) -> usize {
        match self {
            SensorPort::S1 => 0,
            SensorPort::S2 => 1,
            SensorPort::S3 => 2,
            SensorPort::S4 => 3,
        }
    }
}

impl fmt::Display for SensorPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sensor port {}", self.index() + 1)
    }
}

/// Sensor configuration that can be assigned to a sensor port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SensorType {
    /// Port unconfigured (firmware owns it)
    #[default]
    None,
    /// NXT light sensor with its LED on (reflected light)
    NxtLightOn,
    /// NXT light sensor with its LED off (ambient light)
    NxtLightOff,
}

/// 2D pose in the odometry frame
///
/// Origin and zero heading are wherever the robot stood when odometry
/// started. `theta` is in radians, counter-clockwise positive.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self { x, y, theta }
    }

    /// Heading in degrees
    #[inline]
    pub fn theta_degrees(&self) -> f64 {
        self.theta.to_degrees()
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x={:.4} y={:.4} theta={:.4}rad",
            self.x, self.y, self.theta
        )
    }
}

/// One scripted move: abstract power for the left and right wheel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct DriveCommand {
    pub left_power: f64,
    pub right_power: f64,
}

impl DriveCommand {
    pub fn new(left_power: f64, right_power: f64) -> Self {
        Self {
            left_power,
            right_power,
        }
    }
}

impl From<[f64; 2]> for DriveCommand {
    fn from(pair: [f64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

impl From<DriveCommand> for [f64; 2] {
    fn from(cmd: DriveCommand) -> Self {
        [cmd.left_power, cmd.right_power]
    }
}

impl From<(f64, f64)> for DriveCommand {
    fn from(pair: (f64, f64)) -> Self {
        Self::new(pair.0, pair.1)
    }
}

/// Last encoder readings (degrees) for each wheel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WheelState {
    pub prev_left_ticks: i32,
    pub prev_right_ticks: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drive_command_from_toml_pair() {
        #[derive(Deserialize)]
        struct Moves {
            moves: Vec<DriveCommand>,
        }

        let parsed: Moves = toml::from_str("moves = [[40.0, 40.0], [-20.0, 30.0]]").unwrap();
        assert_eq!(parsed.moves.len(), 2);
        assert_eq!(parsed.moves[1], DriveCommand::new(-20.0, 30.0));
    }

    #[test]
    fn test_port_display() {
        assert_eq!(MotorPort::C.to_string(), "port C");
        assert_eq!(SensorPort::S1.to_string(), "sensor port 1");
    }
}
