//! Light-trail following
//!
//! - [`classifier`]: reading -> [`PathState`]
//! - [`controller`]: tick-driven steering loop

pub mod classifier;
pub mod controller;

pub use classifier::{PathClassifier, PathState, SENSOR_FAULT_READING, classify, read_light};
pub use controller::{FollowSummary, FollowTick, LightFollower, PathRunCounter, steer};
