//! Configuration for brickbot
//!
//! Loads configuration from a TOML file. Every field has a default, so an
//! empty file (or no file at all) gives the calibration the robot was
//! tuned with.

use crate::core::types::{DriveCommand, MotorPort, SensorPort};
use crate::devices::mock::SimulationConfig;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub robot: RobotConfig,
    #[serde(default)]
    pub follow: FollowConfig,
    #[serde(default)]
    pub odometry: OdometryConfig,
    #[serde(default)]
    pub mirror: MirrorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Device selection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// Device type (only "mock" ships with brickbot)
    #[serde(rename = "type", default = "default_device_type")]
    pub device_type: String,

    /// Human readable device name for logs
    #[serde(default = "default_device_name")]
    pub name: String,

    /// Simulated brick parameters
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            device_type: default_device_type(),
            name: default_device_name(),
            simulation: SimulationConfig::default(),
        }
    }
}

/// Robot physical constants and port wiring
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RobotConfig {
    /// Wheel radius (same length unit as `track_width`)
    #[serde(default = "default_wheel_radius")]
    pub wheel_radius: f64,

    /// Distance between the two wheel contact points
    #[serde(default = "default_track_width")]
    pub track_width: f64,

    /// Motor driving the left wheel ("motor1")
    #[serde(default = "default_left_motor")]
    pub left_motor: MotorPort,

    /// Motor driving the right wheel ("motor2")
    #[serde(default = "default_right_motor")]
    pub right_motor: MotorPort,

    /// Port the light sensor is plugged into
    #[serde(default = "default_light_sensor")]
    pub light_sensor: SensorPort,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            wheel_radius: default_wheel_radius(),
            track_width: default_track_width(),
            left_motor: default_left_motor(),
            right_motor: default_right_motor(),
            light_sensor: default_light_sensor(),
        }
    }
}

/// Light-following controller parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FollowConfig {
    /// Readings strictly above this are on the trail
    #[serde(default = "default_on_path_above")]
    pub on_path_above: f64,

    /// Readings from this value up to `on_path_above` (inclusive) are the trail edge
    #[serde(default = "default_edge_from")]
    pub edge_from: f64,

    /// Power used for pivots and forward motion
    #[serde(default = "default_pivot_power")]
    pub pivot_power: f64,

    /// Path runs longer than this many ticks are reported
    #[serde(default = "default_report_above")]
    pub report_above: u32,

    /// Tick interval in milliseconds
    #[serde(default = "default_follow_tick_ms")]
    pub tick_ms: u64,
}

impl Default for FollowConfig {
    fn default() -> Self {
        Self {
            on_path_above: default_on_path_above(),
            edge_from: default_edge_from(),
            pivot_power: default_pivot_power(),
            report_above: default_report_above(),
            tick_ms: default_follow_tick_ms(),
        }
    }
}

impl FollowConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

/// Odometry integrator parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OdometryConfig {
    /// Integration timestep (seconds)
    #[serde(default = "default_timestep_secs")]
    pub timestep_secs: f64,

    /// Simulated time each move is held (seconds)
    #[serde(default = "default_move_duration_secs")]
    pub move_duration_secs: f64,

    /// Brake pause between moves (seconds)
    #[serde(default = "default_settle_secs")]
    pub settle_secs: f64,

    /// Scripted (left, right) power pairs
    #[serde(default = "default_moves")]
    pub moves: Vec<DriveCommand>,
}

impl OdometryConfig {
    /// Reject a move queue or timing the integrator cannot run
    pub fn validate(&self) -> Result<()> {
        if self.moves.is_empty() {
            return Err(Error::EmptyMoveQueue);
        }
        require_positive("odometry.timestep_secs", self.timestep_secs)?;
        require_positive("odometry.move_duration_secs", self.move_duration_secs)?;
        if !(self.settle_secs.is_finite() && self.settle_secs >= 0.0) {
            return Err(Error::Config(format!(
                "odometry.settle_secs must be finite and not negative, got {}",
                self.settle_secs
            )));
        }
        Ok(())
    }
}

/// Finite and strictly positive; NaN and infinities are rejected
pub(crate) fn require_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "{} must be positive and finite, got {}",
            name, value
        )))
    }
}

impl Default for OdometryConfig {
    fn default() -> Self {
        Self {
            timestep_secs: default_timestep_secs(),
            move_duration_secs: default_move_duration_secs(),
            settle_secs: default_settle_secs(),
            moves: default_moves(),
        }
    }
}

/// Encoder mirror parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MirrorConfig {
    /// Motor whose encoder is read
    #[serde(default = "default_mirror_source")]
    pub source_motor: MotorPort,

    /// Motor whose power follows the encoder
    #[serde(default = "default_mirror_target")]
    pub target_motor: MotorPort,

    /// Encoder degrees per percent of power
    #[serde(default = "default_mirror_divisor")]
    pub divisor: f64,

    /// Tick interval in milliseconds
    #[serde(default = "default_mirror_tick_ms")]
    pub tick_ms: u64,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            source_motor: default_mirror_source(),
            target_motor: default_mirror_target(),
            divisor: default_mirror_divisor(),
            tick_ms: default_mirror_tick_ms(),
        }
    }
}

impl MirrorConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error); RUST_LOG overrides
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_device_type() -> String {
    "mock".to_string()
}
fn default_device_name() -> String {
    "Simulated brick".to_string()
}
fn default_wheel_radius() -> f64 {
    0.85
}
fn default_track_width() -> f64 {
    6.1
}
fn default_left_motor() -> MotorPort {
    MotorPort::C
}
fn default_right_motor() -> MotorPort {
    MotorPort::B
}
fn default_light_sensor() -> SensorPort {
    SensorPort::S1
}
fn default_on_path_above() -> f64 {
    2200.0
}
fn default_edge_from() -> f64 {
    2100.0
}
fn default_pivot_power() -> f64 {
    30.0
}
fn default_report_above() -> u32 {
    10
}
fn default_follow_tick_ms() -> u64 {
    20
}
fn default_timestep_secs() -> f64 {
    0.05
}
fn default_move_duration_secs() -> f64 {
    3.0
}
fn default_settle_secs() -> f64 {
    1.0
}
fn default_moves() -> Vec<DriveCommand> {
    vec![
        DriveCommand::new(40.0, 40.0),
        DriveCommand::new(-20.0, 30.0),
        DriveCommand::new(30.0, 30.0),
    ]
}
fn default_mirror_source() -> MotorPort {
    MotorPort::B
}
fn default_mirror_target() -> MotorPort {
    MotorPort::C
}
fn default_mirror_divisor() -> f64 {
    10.0
}
fn default_mirror_tick_ms() -> u64 {
    20
}
fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from a TOML file and validate it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Reject values the control loops cannot run with
    pub fn validate(&self) -> Result<()> {
        require_positive("robot.wheel_radius", self.robot.wheel_radius)?;
        require_positive("robot.track_width", self.robot.track_width)?;
        if self.robot.left_motor == self.robot.right_motor {
            return Err(Error::Config(
                "robot.left_motor and robot.right_motor must differ".into(),
            ));
        }
        if self.follow.edge_from > self.follow.on_path_above {
            return Err(Error::Config(
                "follow.edge_from must not exceed follow.on_path_above".into(),
            ));
        }
        self.odometry.validate()?;
        self.device.simulation.validate()?;
        if self.mirror.divisor == 0.0 {
            return Err(Error::Config("mirror.divisor must not be zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.device.device_type, "mock");
        assert_eq!(config.robot.wheel_radius, 0.85);
        assert_eq!(config.robot.track_width, 6.1);
        assert_eq!(config.robot.left_motor, MotorPort::C);
        assert_eq!(config.robot.right_motor, MotorPort::B);
        assert_eq!(config.follow.tick_interval(), Duration::from_millis(20));
        assert_eq!(config.odometry.moves.len(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.odometry.timestep_secs, 0.05);
        assert_eq!(config.odometry.move_duration_secs, 3.0);
        assert_eq!(config.follow.on_path_above, 2200.0);
        assert_eq!(config.follow.edge_from, 2100.0);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_content = r#"
[device]
type = "mock"
name = "Bench brick"

[device.simulation]
speed_factor = 0.0
random_seed = 7

[robot]
wheel_radius = 1.0
track_width = 5.0
left_motor = "A"
right_motor = "D"

[odometry]
moves = [[41.0, 40.0], [1.0, 0.0]]

[logging]
level = "debug"
"#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.device.name, "Bench brick");
        assert_eq!(config.device.simulation.random_seed, 7);
        assert_eq!(config.robot.left_motor, MotorPort::A);
        assert_eq!(config.odometry.moves[0], DriveCommand::new(41.0, 40.0));
        assert_eq!(config.logging.level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.odometry.moves.clear();
        assert!(matches!(config.validate(), Err(Error::EmptyMoveQueue)));

        let mut config = AppConfig::default();
        config.robot.track_width = 0.0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = AppConfig::default();
        config.follow.edge_from = 2300.0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        for value in [f64::NAN, f64::INFINITY, -1.0] {
            let mut config = AppConfig::default();
            config.odometry.timestep_secs = value;
            assert!(matches!(config.validate(), Err(Error::Config(_))), "{}", value);

            let mut config = AppConfig::default();
            config.odometry.move_duration_secs = value;
            assert!(matches!(config.validate(), Err(Error::Config(_))), "{}", value);

            let mut config = AppConfig::default();
            config.odometry.settle_secs = value;
            assert!(matches!(config.validate(), Err(Error::Config(_))), "{}", value);

            let mut config = AppConfig::default();
            config.robot.wheel_radius = value;
            assert!(matches!(config.validate(), Err(Error::Config(_))), "{}", value);
        }
    }

    #[test]
    fn test_non_finite_timing_from_toml_rejected() {
        for value in ["nan", "inf", "-inf"] {
            let toml_content = format!("[odometry]\ntimestep_secs = {}\n", value);
            let config: AppConfig = toml::from_str(&toml_content).unwrap();
            assert!(matches!(config.validate(), Err(Error::Config(_))), "{}", value);
        }

        let config: AppConfig = toml::from_str("[odometry]\nsettle_secs = inf\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_simulation_speed_factor_checked() {
        let mut config = AppConfig::default();
        config.device.simulation.speed_factor = 1e-300;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.device.simulation.speed_factor = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brickbot.toml");

        let mut config = AppConfig::default();
        config.odometry.moves = vec![DriveCommand::new(10.0, -10.0)];
        config.to_file(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.odometry.moves, config.odometry.moves);
        assert_eq!(loaded.robot.light_sensor, SensorPort::S1);
    }

    #[test]
    fn test_load_missing_file() {
        let result = AppConfig::load("/nonexistent/brickbot.toml");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
