//! Reactive light-following controller
//!
//! Each tick reads the light sensor, classifies the reading and steers:
//!
//! | State | Command (motor1, motor2) | Run counter |
//! |-------|--------------------------|-------------|
//! | OnPath | pivot left (-p, p) | +1 |
//! | Edge | forward (p, p) | unchanged |
//! | OffPath | pivot right (p, -p) | reported if > 10, then 0 |
//!
//! The counter only feeds the path-length diagnostic; it never affects
//! steering. Edge ticks deliberately keep the count so that the robot can
//! coast along the edge without losing the run length.

use super::classifier::{PathClassifier, PathState, read_light};
use crate::config::{FollowConfig, RobotConfig};
use crate::core::clock::Clock;
use crate::core::driver::BrickDriver;
use crate::core::session::HardwareSession;
use crate::core::types::{SensorPort, SensorType};
use crate::drive::{Calibration, Drivetrain, PortPowers};
use crate::error::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Consecutive on-path tick counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathRunCounter {
    consecutive_on_path: u32,
    report_above: u32,
}

impl PathRunCounter {
    pub fn new(report_above: u32) -> Self {
        Self {
            consecutive_on_path: 0,
            report_above,
        }
    }

    /// Current run length
    pub fn count(&self) -> u32 {
        self.consecutive_on_path
    }

    /// Feed one tick's state; returns the finished run length when it is reportable
    pub fn observe(&mut self, state: PathState) -> Option<u32> {
        match state {
            PathState::OnPath => {
                self.consecutive_on_path += 1;
                None
            }
            PathState::Edge => None,
            PathState::OffPath => {
                let run = self.consecutive_on_path;
                self.consecutive_on_path = 0;
                (run > self.report_above).then_some(run)
            }
        }
    }
}

/// Abstract (motor1, motor2) command for a path state
pub fn steer(state: PathState, power: f64) -> (f64, f64) {
    match state {
        PathState::OnPath => (-power, power),
        PathState::Edge => (power, power),
        PathState::OffPath => (power, -power),
    }
}

/// Outcome of a single controller tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowTick {
    /// Light reading used (fault sentinel if the read failed)
    pub reading: f64,
    /// Classified state
    pub state: PathState,
    /// Powers written to the wheel ports
    pub powers: PortPowers,
    /// Path run length reported on this tick
    pub reported_run: Option<u32>,
}

/// Totals for a completed light-following session
///
/// Fixed size: the loop runs until interrupted, so individual runs are
/// only logged, never collected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FollowSummary {
    /// Ticks executed
    pub ticks: u64,
    /// Number of path runs reported
    pub runs_reported: u64,
    /// Most recent reported run
    pub last_run: Option<u32>,
    /// Longest reported run
    pub longest_run: u32,
}

impl FollowSummary {
    fn record(&mut self, run: u32) {
        self.runs_reported += 1;
        self.last_run = Some(run);
        self.longest_run = self.longest_run.max(run);
    }
}

/// Light-following controller
pub struct LightFollower {
    session: HardwareSession,
    clock: Box<dyn Clock>,
    classifier: PathClassifier,
    counter: PathRunCounter,
    drivetrain: Drivetrain,
    light_port: SensorPort,
    pivot_power: f64,
    tick_interval: Duration,
}

impl LightFollower {
    /// Create a controller owning the driver
    pub fn new(
        driver: Box<dyn BrickDriver>,
        clock: Box<dyn Clock>,
        robot: &RobotConfig,
        config: &FollowConfig,
    ) -> Self {
        Self {
            session: HardwareSession::new(driver),
            clock,
            classifier: PathClassifier::from_config(config),
            counter: PathRunCounter::new(config.report_above),
            drivetrain: Drivetrain::new(robot.left_motor, robot.right_motor),
            light_port: robot.light_sensor,
            pivot_power: config.pivot_power,
            tick_interval: config.tick_interval(),
        }
    }

    /// Current consecutive on-path count
    pub fn consecutive_on_path(&self) -> u32 {
        self.counter.count()
    }

    /// Turn the light sensor LED on and zero the wheel encoders
    pub fn start(&mut self) -> Result<()> {
        self.session
            .set_sensor_type(self.light_port, SensorType::NxtLightOn)?;
        self.drivetrain.reset_encoders(&mut *self.session)?;
        log::info!(
            "Light follower started: light on {}, wheels on {} / {}",
            self.light_port,
            self.drivetrain.primary,
            self.drivetrain.secondary
        );
        Ok(())
    }

    /// Execute one control tick (without sleeping)
    pub fn tick(&mut self) -> Result<FollowTick> {
        let reading = read_light(&mut *self.session, self.light_port);
        let state = self.classifier.classify(reading);

        let reported_run = self.counter.observe(state);
        if let Some(run) = reported_run {
            log::info!("Path run: {}", run);
        }

        let (motor1, motor2) = steer(state, self.pivot_power);
        let powers =
            self.drivetrain
                .drive(&mut *self.session, Calibration::Default, motor1, motor2)?;

        log::trace!(
            "Follow tick: reading={:.0} state={:?} run={}",
            reading,
            state,
            self.counter.count()
        );

        Ok(FollowTick {
            reading,
            state,
            powers,
            reported_run,
        })
    }

    /// Follow the trail until `running` is cleared
    ///
    /// The hardware is reset exactly once when this returns, whether the
    /// loop was interrupted or failed.
    pub fn run(mut self, running: &AtomicBool) -> Result<FollowSummary> {
        let result = self.follow(running);
        let released = self.session.release();

        match result {
            Ok(summary) => {
                log::info!(
                    "Light follower stopped after {} ticks ({} runs reported, longest {})",
                    summary.ticks,
                    summary.runs_reported,
                    summary.longest_run
                );
                released.map(|_| summary)
            }
            Err(e) => {
                log::error!("Light follower failed: {}", e);
                if let Err(reset_err) = released {
                    log::error!("Hardware reset failed: {}", reset_err);
                }
                Err(e)
            }
        }
    }

    fn follow(&mut self, running: &AtomicBool) -> Result<FollowSummary> {
        self.start()?;

        let mut summary = FollowSummary::default();
        while running.load(Ordering::Relaxed) {
            let tick = self.tick()?;
            summary.ticks += 1;
            if let Some(run) = tick.reported_run {
                summary.record(run);
            }
            self.clock.sleep(self.tick_interval);
        }

        log::info!("Interrupt received, stopping light follower");
        Ok(summary)
    }
}
