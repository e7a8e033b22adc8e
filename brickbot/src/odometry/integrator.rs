//! Dead-reckoning odometry over a scripted move queue.
//!
//! # Tick
//!
//! ```text
//! 1. drive the current move through the odometry calibration
//! 2. read both encoders, delta / timestep -> wheel rad/s
//! 3. wheel rad/s -> (v, omega) -> one RK4 step
//! 4. commit pose and encoder readings, sleep one timestep
//! 5. after move_duration of ticks: report, brake, settle,
//!    then load the next move or finish
//! ```
//!
//! Finishing the last move is the only normal way out: the final pose is
//! reported (heading in degrees) and the hardware is reset. Encoder
//! readings are carried across the settle pause, so anything the wheels
//! do while braking lands in the first tick of the next move.

use super::kinematics::{RobotConstants, WheelVelocity, rk4_step};
use crate::config::{OdometryConfig, RobotConfig, require_positive};
use crate::core::clock::Clock;
use crate::core::driver::BrickDriver;
use crate::core::session::HardwareSession;
use crate::core::types::{DriveCommand, Pose, WheelState};
use crate::drive::{Calibration, Drivetrain};
use crate::error::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Brake command issued between moves (default calibration zeroes both ports)
const BRAKE_COMMAND: (f64, f64) = (2.0, 0.0);

/// Pose reported when a move finishes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveReport {
    /// Index of the move that finished
    pub index: usize,
    /// Pose at the end of the move
    pub pose: Pose,
}

/// Pose reported when the whole queue is done
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinalReport {
    pub pose: Pose,
    /// Final heading converted to degrees
    pub heading_degrees: f64,
}

impl FinalReport {
    fn new(pose: Pose) -> Self {
        Self {
            pose,
            heading_degrees: pose.theta_degrees(),
        }
    }
}

/// Result of one integrator tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// Pose advanced, current move still running
    Tick(Pose),
    /// A move finished and the next one is loaded
    MoveComplete(MoveReport),
    /// The last move finished; the hardware has been reset
    Finished {
        last_move: MoveReport,
        final_report: FinalReport,
    },
}

/// Everything an odometry session reported
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OdometryReport {
    /// One entry per finished move
    pub moves: Vec<MoveReport>,
    /// Present when the queue ran to completion
    pub final_report: Option<FinalReport>,
    /// Pose when the session ended
    pub pose: Pose,
    /// Ticks executed
    pub ticks: u64,
    /// Whether the session was stopped by an interrupt
    pub interrupted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running,
    Finished,
}

/// RK4 odometry integrator driving a move queue
pub struct OdometryIntegrator {
    session: HardwareSession,
    clock: Box<dyn Clock>,
    drivetrain: Drivetrain,
    constants: RobotConstants,
    timestep: f64,
    tick: Duration,
    move_duration: f64,
    settle: Duration,
    moves: Vec<DriveCommand>,
    move_index: usize,
    pose: Pose,
    wheels: WheelState,
    move_ticks: u32,
    phase: Phase,
}

impl OdometryIntegrator {
    /// Create an integrator owning the driver
    ///
    /// Rejects an empty move queue and non-finite or non-positive timing
    /// before touching the hardware.
    pub fn new(
        driver: Box<dyn BrickDriver>,
        clock: Box<dyn Clock>,
        robot: &RobotConfig,
        config: &OdometryConfig,
    ) -> Result<Self> {
        config.validate()?;
        require_positive("robot.wheel_radius", robot.wheel_radius)?;
        require_positive("robot.track_width", robot.track_width)?;
        let tick = Duration::try_from_secs_f64(config.timestep_secs).map_err(|e| {
            Error::InvalidParameter(format!("timestep {}: {}", config.timestep_secs, e))
        })?;
        let settle = Duration::try_from_secs_f64(config.settle_secs).map_err(|e| {
            Error::InvalidParameter(format!("settle time {}: {}", config.settle_secs, e))
        })?;

        Ok(Self {
            session: HardwareSession::new(driver),
            clock,
            drivetrain: Drivetrain::new(robot.left_motor, robot.right_motor),
            constants: RobotConstants::new(robot.wheel_radius, robot.track_width),
            timestep: config.timestep_secs,
            tick,
            move_duration: config.move_duration_secs,
            settle,
            moves: config.moves.clone(),
            move_index: 0,
            pose: Pose::default(),
            wheels: WheelState::default(),
            move_ticks: 0,
            phase: Phase::Idle,
        })
    }

    /// Current pose estimate
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Index of the move being executed
    pub fn move_index(&self) -> usize {
        self.move_index
    }

    /// Encoder readings from the last tick
    pub fn wheel_state(&self) -> WheelState {
        self.wheels
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Zero the encoders and reset the integration state
    pub fn start(&mut self) -> Result<()> {
        self.drivetrain.reset_encoders(&mut *self.session)?;
        self.move_index = 0;
        self.pose = Pose::default();
        self.wheels = WheelState::default();
        self.move_ticks = 0;
        self.phase = Phase::Running;

        log::info!(
            "Odometry started: {} moves, dt={}s, {}s per move (r={}, b={})",
            self.moves.len(),
            self.timestep,
            self.move_duration,
            self.constants.wheel_radius,
            self.constants.track_width
        );
        Ok(())
    }

    /// Execute one tick, including its sleep
    pub fn step(&mut self) -> Result<StepOutcome> {
        match self.phase {
            Phase::Idle => self.start()?,
            Phase::Running => {}
            Phase::Finished => {
                return Err(Error::Other("odometry move queue already finished".into()));
            }
        }

        let command = self.moves[self.move_index];
        self.drivetrain
            .apply(&mut *self.session, Calibration::Odometry, command)?;

        let left = self.session.get_motor_encoder(self.drivetrain.primary)?;
        let right = self.session.get_motor_encoder(self.drivetrain.secondary)?;

        let wheels = WheelVelocity::from_encoder_deltas(
            left.wrapping_sub(self.wheels.prev_left_ticks),
            right.wrapping_sub(self.wheels.prev_right_ticks),
            self.timestep,
        );
        let velocity = self.constants.body_velocity(wheels);
        self.pose = rk4_step(self.pose, velocity, self.timestep);
        self.wheels = WheelState {
            prev_left_ticks: left,
            prev_right_ticks: right,
        };

        log::trace!(
            "Odometry tick: enc=({}, {}) v={:.4} w={:.4} {}",
            left,
            right,
            velocity.linear,
            velocity.angular,
            self.pose
        );

        self.clock.sleep(self.tick);
        self.move_ticks += 1;

        if self.timestep * (self.move_ticks as f64) < self.move_duration {
            return Ok(StepOutcome::Tick(self.pose));
        }

        self.finish_move()
    }

    fn finish_move(&mut self) -> Result<StepOutcome> {
        self.move_ticks = 0;
        let report = MoveReport {
            index: self.move_index,
            pose: self.pose,
        };
        self.move_index += 1;

        log::info!(
            "Move {}/{} done: x={} y={} theta={}",
            self.move_index,
            self.moves.len(),
            self.pose.x,
            self.pose.y,
            self.pose.theta
        );

        self.drivetrain.drive(
            &mut *self.session,
            Calibration::Default,
            BRAKE_COMMAND.0,
            BRAKE_COMMAND.1,
        )?;
        self.clock.sleep(self.settle);

        if self.move_index < self.moves.len() {
            log::debug!(
                "Next move: ({}, {})",
                self.moves[self.move_index].left_power,
                self.moves[self.move_index].right_power
            );
            return Ok(StepOutcome::MoveComplete(report));
        }

        let final_report = FinalReport::new(self.pose);
        log::info!("Final X: {}", final_report.pose.x);
        log::info!("Final Y: {}", final_report.pose.y);
        log::info!("Final Theta: {}", final_report.heading_degrees);

        self.phase = Phase::Finished;
        self.session.release()?;

        Ok(StepOutcome::Finished {
            last_move: report,
            final_report,
        })
    }

    /// Run the whole move queue, or until `running` is cleared
    ///
    /// The hardware is reset exactly once when this returns. An encoder
    /// failure ends the session with an error.
    pub fn run(mut self, running: &AtomicBool) -> Result<OdometryReport> {
        let result = self.drive_moves(running);
        let released = self.session.release();

        match result {
            Ok(report) => released.map(|_| report),
            Err(e) => {
                log::error!(
                    "Odometry aborted during move {} at {}: {}",
                    self.move_index,
                    self.pose,
                    e
                );
                if let Err(reset_err) = released {
                    log::error!("Hardware reset failed: {}", reset_err);
                }
                Err(e)
            }
        }
    }

    fn drive_moves(&mut self, running: &AtomicBool) -> Result<OdometryReport> {
        self.start()?;

        let mut report = OdometryReport::default();
        loop {
            if !running.load(Ordering::Relaxed) {
                log::info!("Interrupt received, stopping odometry");
                report.interrupted = true;
                break;
            }

            let outcome = self.step()?;
            report.ticks += 1;
            match outcome {
                StepOutcome::Tick(_) => {}
                StepOutcome::MoveComplete(done) => report.moves.push(done),
                StepOutcome::Finished {
                    last_move,
                    final_report,
                } => {
                    report.moves.push(last_move);
                    report.final_report = Some(final_report);
                    break;
                }
            }
        }

        report.pose = self.pose;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::MotorPort;
    use crate::devices::mock::MockBrick;
    use approx::assert_relative_eq;

    fn integrator(brick: &MockBrick, moves: Vec<DriveCommand>) -> OdometryIntegrator {
        let config = OdometryConfig {
            moves,
            ..OdometryConfig::default()
        };
        OdometryIntegrator::new(
            Box::new(brick.clone()),
            Box::new(brick.clock()),
            &RobotConfig::default(),
            &config,
        )
        .unwrap()
    }

    #[test]
    fn test_empty_queue_rejected() {
        let brick = MockBrick::default();
        let config = OdometryConfig {
            moves: Vec::new(),
            ..OdometryConfig::default()
        };
        let result = OdometryIntegrator::new(
            Box::new(brick.clone()),
            Box::new(brick.clock()),
            &RobotConfig::default(),
            &config,
        );
        assert!(matches!(result, Err(Error::EmptyMoveQueue)));
        assert_eq!(brick.power_log().len(), 0);
    }

    #[test]
    fn test_non_finite_timing_rejected_before_hardware() {
        let brick = MockBrick::default();
        for (timestep, duration) in [(f64::NAN, 3.0), (f64::INFINITY, 3.0), (0.05, f64::NAN)] {
            let config = OdometryConfig {
                timestep_secs: timestep,
                move_duration_secs: duration,
                ..OdometryConfig::default()
            };
            let result = OdometryIntegrator::new(
                Box::new(brick.clone()),
                Box::new(brick.clock()),
                &RobotConfig::default(),
                &config,
            );
            assert!(matches!(result, Err(Error::Config(_))), "{} {}", timestep, duration);
        }
        assert_eq!(brick.power_log().len(), 0);
        assert_eq!(brick.reset_count(), 0);
    }

    #[test]
    fn test_start_zeroes_encoders() {
        let mut brick = MockBrick::default();
        brick.set_motor_power(MotorPort::C, 50.0).unwrap();
        brick.advance(1.0);
        brick.set_motor_power(MotorPort::C, 0.0).unwrap();

        let mut odom = integrator(&brick, vec![DriveCommand::new(1.0, 0.0)]);
        odom.start().unwrap();

        assert_eq!(brick.get_motor_encoder(MotorPort::C).unwrap(), 0);
        assert_eq!(odom.pose(), Pose::default());
        assert_eq!(odom.move_index(), 0);
    }

    #[test]
    fn test_first_tick_uses_odometry_calibration() {
        let brick = MockBrick::default();
        let mut odom = integrator(&brick, vec![DriveCommand::new(40.0, 40.0)]);

        let outcome = odom.step().unwrap();

        assert!(matches!(outcome, StepOutcome::Tick(_)));
        assert_eq!(brick.motor_power(MotorPort::C), 58.5);
        assert_eq!(brick.motor_power(MotorPort::B), 60.0);
        // Encoders were read before the first sleep
        assert_eq!(odom.pose(), Pose::default());
    }

    #[test]
    fn test_move_boundary_after_sixty_ticks() {
        let brick = MockBrick::default();
        let mut odom = integrator(
            &brick,
            vec![DriveCommand::new(41.0, 40.0), DriveCommand::new(1.0, 0.0)],
        );

        for _ in 0..59 {
            assert!(matches!(odom.step().unwrap(), StepOutcome::Tick(_)));
        }
        let outcome = odom.step().unwrap();

        match outcome {
            StepOutcome::MoveComplete(report) => {
                assert_eq!(report.index, 0);
                assert!(report.pose.x > 0.0);
            }
            other => panic!("expected MoveComplete, got {:?}", other),
        }
        assert_eq!(odom.move_index(), 1);
        // Brake leaves both wheels stopped
        assert_eq!(brick.motor_power(MotorPort::C), 0.0);
        assert_eq!(brick.motor_power(MotorPort::B), 0.0);
        assert_relative_eq!(brick.elapsed_secs(), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_step_after_finish_is_error() {
        let brick = MockBrick::default();
        let mut odom = integrator(&brick, vec![DriveCommand::new(1.0, 0.0)]);

        let mut finished = false;
        for _ in 0..60 {
            if let StepOutcome::Finished { .. } = odom.step().unwrap() {
                finished = true;
            }
        }

        assert!(finished);
        assert!(odom.is_finished());
        assert_eq!(brick.reset_count(), 1);
        assert!(odom.step().is_err());

        drop(odom);
        assert_eq!(brick.reset_count(), 1);
    }

    #[test]
    fn test_encoder_fault_mid_move_resets_once() {
        let brick = MockBrick::default();
        let mut odom = integrator(&brick, vec![DriveCommand::new(40.0, 40.0)]);

        for _ in 0..5 {
            odom.step().unwrap();
        }
        brick.fail_encoder(MotorPort::B, "spi timeout");

        let err = odom.step().unwrap_err();
        assert!(matches!(err, Error::Encoder { port: MotorPort::B, .. }));

        drop(odom);
        assert_eq!(brick.reset_count(), 1);
    }
}
