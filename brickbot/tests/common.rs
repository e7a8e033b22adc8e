//! Test utilities for brickbot control loops.

#![allow(dead_code)]

use brickbot::core::clock::Clock;
use brickbot::devices::mock::{MockBrick, MockClock};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Clock that clears a running flag after a fixed number of sleeps.
///
/// Stands in for Ctrl-C: the loop sees the flag at the end of the tick in
/// which the budget ran out.
pub struct InterruptAfter {
    inner: MockClock,
    remaining: usize,
    running: Arc<AtomicBool>,
}

impl InterruptAfter {
    pub fn new(brick: &MockBrick, sleeps: usize, running: Arc<AtomicBool>) -> Self {
        Self {
            inner: brick.clock(),
            remaining: sleeps,
            running,
        }
    }
}

impl Clock for InterruptAfter {
    fn sleep(&mut self, duration: Duration) {
        self.inner.sleep(duration);
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running.store(false, Ordering::Relaxed);
        }
    }
}

/// Fresh running flag set to true
pub fn running_flag() -> Arc<AtomicBool> {
    Arc::new(AtomicBool::new(true))
}
