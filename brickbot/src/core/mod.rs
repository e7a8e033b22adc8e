//! Core abstractions shared by drivers and control loops.
//!
//! - [`driver::BrickDriver`]: Trait to implement for new hardware
//! - [`clock::Clock`]: Sleep source for tick-driven loops
//! - [`session::HardwareSession`]: Guaranteed hardware reset on exit
//! - [`types`]: Ports, poses and drive commands

pub mod clock;
pub mod driver;
pub mod session;
pub mod types;
