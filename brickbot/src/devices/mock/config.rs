//! Mock device simulation configuration
//!
//! Every parameter has a default that matches an NXT/EV3 motor pair and an
//! NXT light sensor, so `[device.simulation]` can be left out entirely.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! SimulationConfig
//! ├── speed_factor, random_seed      # Simulation control
//! ├── MotorSimConfig                 # Encoder physics
//! │   └── degrees_per_sec_per_percent, slip_stddev
//! └── LightSimConfig                 # Light sensor
//!     └── pattern, ambient, noise_stddev, fault_rate
//! ```
//!
//! # Default Values
//!
//! | Parameter | Default | Source |
//! |-----------|---------|--------|
//! | degrees_per_sec_per_percent | 10.0 | ~170 rpm at full power |
//! | ambient | 1900 | Bare floor reading |
//! | pattern | trail crossing | Bench recording |

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Slowest accepted real-time factor other than 0
pub const MIN_SPEED_FACTOR: f64 = 0.01;

/// Encoder physics configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MotorSimConfig {
    /// Encoder degrees per second for each percent of motor power
    #[serde(default = "default_degrees_per_sec_per_percent")]
    pub degrees_per_sec_per_percent: f64,

    /// Wheel slip noise standard deviation (multiplicative, 0.0-1.0)
    #[serde(default)]
    pub slip_stddev: f64,
}

fn default_degrees_per_sec_per_percent() -> f64 {
    10.0
}

impl Default for MotorSimConfig {
    fn default() -> Self {
        Self {
            degrees_per_sec_per_percent: default_degrees_per_sec_per_percent(),
            slip_stddev: 0.0,
        }
    }
}

/// Light sensor simulation configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LightSimConfig {
    /// Readings cycled when nothing is queued
    #[serde(default = "default_light_pattern")]
    pub pattern: Vec<f64>,

    /// Reading used when the pattern is empty
    #[serde(default = "default_ambient")]
    pub ambient: f64,

    /// Gaussian noise added to every reading
    #[serde(default)]
    pub noise_stddev: f64,

    /// Probability that a read fails with a sensor error (0.0-1.0)
    #[serde(default)]
    pub fault_rate: f64,
}

fn default_ambient() -> f64 {
    1900.0
}

/// Floor, edge, a long run on the trail, edge, floor
fn default_light_pattern() -> Vec<f64> {
    let mut pattern = vec![1900.0, 1950.0, 2120.0, 2180.0];
    pattern.extend(std::iter::repeat_n(2350.0, 15));
    pattern.extend([2150.0, 2050.0, 1900.0, 1900.0]);
    pattern
}

impl Default for LightSimConfig {
    fn default() -> Self {
        Self {
            pattern: default_light_pattern(),
            ambient: default_ambient(),
            noise_stddev: 0.0,
            fault_rate: 0.0,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationConfig {
    /// Real-time factor for the simulation clock (2.0 = 2x speed, 0 = no real sleep)
    #[serde(default = "default_speed_factor")]
    pub speed_factor: f64,

    /// Random seed (0 = random each run)
    #[serde(default = "default_random_seed")]
    pub random_seed: u64,

    /// Encoder physics
    #[serde(default)]
    pub motors: MotorSimConfig,

    /// Light sensor
    #[serde(default)]
    pub light: LightSimConfig,
}

fn default_speed_factor() -> f64 {
    1.0
}
fn default_random_seed() -> u64 {
    42
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            speed_factor: default_speed_factor(),
            random_seed: default_random_seed(),
            motors: MotorSimConfig::default(),
            light: LightSimConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Noise-free configuration that never sleeps, for deterministic runs
    pub fn deterministic() -> Self {
        Self {
            speed_factor: 0.0,
            ..Self::default()
        }
    }

    /// Speed factor must be 0 or at least [`MIN_SPEED_FACTOR`]
    pub fn validate(&self) -> Result<()> {
        let speed = self.speed_factor;
        if speed == 0.0 || (speed.is_finite() && speed >= MIN_SPEED_FACTOR) {
            Ok(())
        } else {
            Err(Error::Config(format!(
                "device.simulation.speed_factor must be 0 or in [{}, inf), got {}",
                MIN_SPEED_FACTOR, speed
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_quiet() {
        let config = SimulationConfig::default();
        assert_eq!(config.motors.slip_stddev, 0.0);
        assert_eq!(config.light.fault_rate, 0.0);
        assert_eq!(config.light.pattern.len(), 23);
    }

    #[test]
    fn test_partial_toml() {
        let config: SimulationConfig = toml::from_str(
            r#"
speed_factor = 5.0

[light]
pattern = [2300.0, 1800.0]
"#,
        )
        .unwrap();

        assert_eq!(config.speed_factor, 5.0);
        assert_eq!(config.light.pattern, vec![2300.0, 1800.0]);
        assert_eq!(config.light.ambient, 1900.0);
        assert_eq!(config.motors.degrees_per_sec_per_percent, 10.0);
    }
}
