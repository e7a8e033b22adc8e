//! Clock abstraction used as the only suspension point of control loops

use std::time::Duration;

/// Sleep source for tick-driven loops
///
/// Real deployments sleep the thread; the simulated brick advances its
/// physics instead, which keeps loop tests deterministic.
pub trait Clock: Send {
    /// Block for `duration` (or advance simulated time by it)
    fn sleep(&mut self, duration: Duration);
}

/// Wall-clock implementation backed by `std::thread::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
