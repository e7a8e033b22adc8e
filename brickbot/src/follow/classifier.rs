//! Light-path classification
//!
//! Maps a reflected-light reading onto the trail:
//!
//! | Reading | State |
//! |---------|-------|
//! | `> 2200` | [`PathState::OnPath`] |
//! | `2100..=2200` | [`PathState::Edge`] |
//! | anything else (including the fault sentinel) | [`PathState::OffPath`] |

use crate::config::FollowConfig;
use crate::core::driver::BrickDriver;
use crate::core::types::SensorPort;

/// Reading substituted when the light sensor cannot be read
pub const SENSOR_FAULT_READING: f64 = -1.0;

/// Position of the light sensor relative to the trail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathState {
    OffPath,
    Edge,
    OnPath,
}

/// Threshold classifier for light readings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathClassifier {
    /// Readings strictly above this are on the trail
    on_path_above: f64,
    /// Lowest reading that still counts as the trail edge
    edge_from: f64,
}

impl PathClassifier {
    pub fn new(on_path_above: f64, edge_from: f64) -> Self {
        Self {
            on_path_above,
            edge_from,
        }
    }

    pub fn from_config(config: &FollowConfig) -> Self {
        Self::new(config.on_path_above, config.edge_from)
    }

    /// Classify one reading
    ///
    /// The upper threshold is exclusive for `OnPath`: a reading equal to
    /// it is `Edge`. NaN is `OffPath`.
    pub fn classify(&self, intensity: f64) -> PathState {
        if intensity > self.on_path_above {
            PathState::OnPath
        } else if intensity <= self.on_path_above && intensity >= self.edge_from {
            PathState::Edge
        } else {
            PathState::OffPath
        }
    }
}

impl Default for PathClassifier {
    fn default() -> Self {
        Self::new(2200.0, 2100.0)
    }
}

/// Classify with the default thresholds
pub fn classify(intensity: f64) -> PathState {
    PathClassifier::default().classify(intensity)
}

/// Read the light sensor, substituting [`SENSOR_FAULT_READING`] on failure
///
/// A failed read is logged and recovered here; it never reaches the loop.
pub fn read_light(driver: &mut dyn BrickDriver, port: SensorPort) -> f64 {
    match driver.get_sensor(port) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Light read failed, treating as off path: {}", e);
            SENSOR_FAULT_READING
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::SensorType;
    use crate::devices::mock::MockBrick;

    #[test]
    fn test_threshold_boundaries() {
        assert_eq!(classify(2201.0), PathState::OnPath);
        assert_eq!(classify(2200.0), PathState::Edge);
        assert_eq!(classify(2100.0), PathState::Edge);
        assert_eq!(classify(2099.0), PathState::OffPath);
        assert_eq!(classify(-1.0), PathState::OffPath);
    }

    #[test]
    fn test_fractional_readings() {
        assert_eq!(classify(2200.0001), PathState::OnPath);
        assert_eq!(classify(2099.999), PathState::OffPath);
        assert_eq!(classify(f64::NAN), PathState::OffPath);
    }

    #[test]
    fn test_custom_thresholds() {
        let classifier = PathClassifier::new(500.0, 400.0);
        assert_eq!(classifier.classify(501.0), PathState::OnPath);
        assert_eq!(classifier.classify(450.0), PathState::Edge);
        assert_eq!(classifier.classify(2201.0), PathState::OnPath);
        assert_eq!(classifier.classify(399.0), PathState::OffPath);
    }

    #[test]
    fn test_read_light_falls_back_on_fault() {
        let mut brick = MockBrick::default();
        brick
            .set_sensor_type(SensorPort::S1, SensorType::NxtLightOn)
            .unwrap();
        brick.push_light_readings(&[2300.0]);
        brick.inject_sensor_fault();

        assert_eq!(read_light(&mut brick, SensorPort::S1), SENSOR_FAULT_READING);
        assert_eq!(read_light(&mut brick, SensorPort::S1), 2300.0);
    }
}
