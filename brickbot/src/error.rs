//! Error types for brickbot

use crate::core::types::{MotorPort, SensorPort};

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// brickbot error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Sensor read or configuration failed
    #[error("Sensor error on {port}: {reason}")]
    Sensor {
        /// Sensor port that failed
        port: SensorPort,
        /// Failure description from the driver
        reason: String,
    },

    /// Motor encoder read or offset failed
    #[error("Encoder error on motor {port}: {reason}")]
    Encoder {
        /// Motor port that failed
        port: MotorPort,
        /// Failure description from the driver
        reason: String,
    },

    /// Motor power write failed
    #[error("Motor error on {port}: {reason}")]
    Motor {
        /// Motor port that failed
        port: MotorPort,
        /// Failure description from the driver
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown device type in configuration
    #[error("Unknown device type: {0}")]
    UnknownDevice(String),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Odometry started without any moves
    #[error("Move queue is empty")]
    EmptyMoveQueue,

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(e.to_string())
    }
}
