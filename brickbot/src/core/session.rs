//! Scoped ownership of the brick hardware.
//!
//! A [`HardwareSession`] owns the driver for the lifetime of one control
//! loop. Whatever way the loop ends (completed, failed, interrupted or
//! unwound), `reset_all` is issued exactly once: either through
//! [`HardwareSession::release`] or from `Drop`.

use crate::core::driver::BrickDriver;
use crate::error::Result;
use std::ops::{Deref, DerefMut};

/// Owner of the driver that resets the hardware once on exit
pub struct HardwareSession {
    driver: Box<dyn BrickDriver>,
    released: bool,
}

impl HardwareSession {
    /// Take ownership of a driver
    pub fn new(driver: Box<dyn BrickDriver>) -> Self {
        Self {
            driver,
            released: false,
        }
    }

    /// Whether `reset_all` has already been issued
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Reset the hardware now and report the outcome
    ///
    /// Calling this more than once is a no-op after the first call.
    pub fn release(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        log::info!("Resetting brick: motors off, sensors unconfigured");
        self.driver.reset_all()
    }
}

impl Deref for HardwareSession {
    type Target = dyn BrickDriver;

    fn deref(&self) -> &Self::Target {
        self.driver.as_ref()
    }
}

impl DerefMut for HardwareSession {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.driver.as_mut()
    }
}

impl Drop for HardwareSession {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            log::error!("Hardware reset failed: {}", e);
        }
    }
}
