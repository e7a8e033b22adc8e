//! Differential-drive odometry
//!
//! - [`kinematics`]: wheel velocities, body velocities, RK4 step
//! - [`integrator`]: move queue state machine driving the hardware

pub mod integrator;
pub mod kinematics;

pub use integrator::{FinalReport, MoveReport, OdometryIntegrator, OdometryReport, StepOutcome};
pub use kinematics::{BodyVelocity, RobotConstants, WheelVelocity, rk4_step};
