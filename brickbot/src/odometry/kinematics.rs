//! Differential-drive kinematics and RK4 pose integration.
//!
//! # Model
//!
//! With wheel angular velocities `wl`, `wr` (rad/s), wheel radius `r` and
//! track width `b`:
//!
//! ```text
//! v     = r * (wl + wr) / 2
//! omega = r * (wr - wl) / b
//!
//! x'     = v * cos(theta)
//! y'     = v * sin(theta)
//! theta' = omega
//! ```
//!
//! # Integration
//!
//! One classical RK4 step per tick. `v` and `omega` come from a single
//! encoder sample and are held constant for all four stages; only the
//! heading used inside `cos`/`sin` moves between stages. Under this model
//! omega is exactly constant over the tick, so the theta update reduces to
//! `omega * dt`.

use crate::core::types::Pose;

/// Robot geometry used by the kinematic model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobotConstants {
    pub wheel_radius: f64,
    pub track_width: f64,
}

impl RobotConstants {
    pub fn new(wheel_radius: f64, track_width: f64) -> Self {
        Self {
            wheel_radius,
            track_width,
        }
    }

    /// Body velocities for the given wheel angular velocities
    pub fn body_velocity(&self, wheels: WheelVelocity) -> BodyVelocity {
        BodyVelocity {
            linear: self.wheel_radius * (wheels.left + wheels.right) / 2.0,
            angular: self.wheel_radius * (wheels.right - wheels.left) / self.track_width,
        }
    }
}

impl Default for RobotConstants {
    fn default() -> Self {
        Self::new(0.85, 6.1)
    }
}

/// Wheel angular velocities (rad/s)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelVelocity {
    pub left: f64,
    pub right: f64,
}

impl WheelVelocity {
    /// Angular velocities from encoder deltas in degrees over `dt` seconds
    pub fn from_encoder_deltas(left_degrees: i32, right_degrees: i32, dt: f64) -> Self {
        Self {
            left: (left_degrees as f64 / dt).to_radians(),
            right: (right_degrees as f64 / dt).to_radians(),
        }
    }
}

/// Linear and angular velocity of the robot body
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BodyVelocity {
    pub linear: f64,
    pub angular: f64,
}

/// State derivative (x', y', theta')
#[derive(Debug, Clone, Copy)]
struct Derivative {
    dx: f64,
    dy: f64,
    dtheta: f64,
}

#[inline]
fn derivative(velocity: BodyVelocity, theta: f64) -> Derivative {
    Derivative {
        dx: velocity.linear * theta.cos(),
        dy: velocity.linear * theta.sin(),
        dtheta: velocity.angular,
    }
}

/// Advance `pose` by one RK4 step of `dt` seconds
pub fn rk4_step(pose: Pose, velocity: BodyVelocity, dt: f64) -> Pose {
    let k0 = derivative(velocity, pose.theta);
    let k1 = derivative(velocity, pose.theta + (dt / 2.0) * k0.dtheta);
    let k2 = derivative(velocity, pose.theta + (dt / 2.0) * k1.dtheta);
    let k3 = derivative(velocity, pose.theta + dt * k2.dtheta);

    Pose {
        x: pose.x + (dt / 6.0) * (k0.dx + 2.0 * (k1.dx + k2.dx) + k3.dx),
        y: pose.y + (dt / 6.0) * (k0.dy + 2.0 * (k1.dy + k2.dy) + k3.dy),
        theta: pose.theta + (dt / 6.0) * (k0.dtheta + 2.0 * (k1.dtheta + k2.dtheta) + k3.dtheta),
    }
}
