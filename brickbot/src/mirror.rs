//! Encoder mirror: one motor's power follows another motor's position.
//!
//! Turning the source wheel by hand sets the target motor's power to
//! `position / divisor`, clamped to ±100. A failed encoder read stops the
//! target motor for that tick instead of ending the loop.

use crate::config::MirrorConfig;
use crate::core::clock::Clock;
use crate::core::driver::BrickDriver;
use crate::core::session::HardwareSession;
use crate::core::types::MotorPort;
use crate::error::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

const MAX_POWER_PERCENT: f64 = 100.0;

/// Power for an encoder position, clamped to the motor range
pub fn mirror_power(position: i32, divisor: f64) -> f64 {
    (position as f64 / divisor).clamp(-MAX_POWER_PERCENT, MAX_POWER_PERCENT)
}

/// Encoder-to-power mirror loop
pub struct EncoderMirror {
    session: HardwareSession,
    clock: Box<dyn Clock>,
    source: MotorPort,
    target: MotorPort,
    divisor: f64,
    tick_interval: Duration,
}

impl EncoderMirror {
    pub fn new(driver: Box<dyn BrickDriver>, clock: Box<dyn Clock>, config: &MirrorConfig) -> Self {
        Self {
            session: HardwareSession::new(driver),
            clock,
            source: config.source_motor,
            target: config.target_motor,
            divisor: config.divisor,
            tick_interval: config.tick_interval(),
        }
    }

    /// Zero the source encoder; a failure is logged and ignored
    pub fn start(&mut self) {
        if let Err(e) = self.session.reset_encoder(self.source) {
            log::warn!("Could not zero encoder on {}: {}", self.source, e);
        }
        log::info!(
            "Encoder mirror started: {} position drives {} power",
            self.source,
            self.target
        );
    }

    /// One tick: read, convert, write. Returns the power written.
    pub fn tick(&mut self) -> Result<f64> {
        let power = match self.session.get_motor_encoder(self.source) {
            Ok(position) => mirror_power(position, self.divisor),
            Err(e) => {
                log::warn!("Encoder read failed, stopping {} this tick: {}", self.target, e);
                0.0
            }
        };
        self.session.set_motor_power(self.target, power)?;
        Ok(power)
    }

    /// Mirror until `running` is cleared; returns the number of ticks
    pub fn run(mut self, running: &AtomicBool) -> Result<u64> {
        self.start();

        let mut ticks = 0u64;
        let mut result = Ok(());
        while running.load(Ordering::Relaxed) {
            if let Err(e) = self.tick() {
                log::error!("Encoder mirror failed: {}", e);
                result = Err(e);
                break;
            }
            ticks += 1;
            self.clock.sleep(self.tick_interval);
        }

        let released = self.session.release();
        result?;
        released?;
        log::info!("Encoder mirror stopped after {} ticks", ticks);
        Ok(ticks)
    }
}
