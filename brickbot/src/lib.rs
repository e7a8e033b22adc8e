//! brickbot - Light-trail following and dead-reckoning odometry
//!
//! Control loops for a two-motor brick controller with a light sensor.
//!
//! ## Modes
//!
//! - [`follow::LightFollower`]: steer along a light trail
//! - [`odometry::OdometryIntegrator`]: run scripted moves while integrating
//!   the pose with RK4
//! - [`mirror::EncoderMirror`]: one motor's power follows another's encoder
//!
//! Hardware is reached through [`core::driver::BrickDriver`]; the
//! [`devices::mock`] brick simulates it for hardware-free runs and tests.

pub mod config;
pub mod core;
pub mod devices;
pub mod drive;
pub mod error;
pub mod follow;
pub mod mirror;
pub mod odometry;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Error, Result};
