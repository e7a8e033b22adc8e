//! Device implementations

pub mod mock;

use crate::config::AppConfig;
use crate::core::clock::Clock;
use crate::core::driver::BrickDriver;
use crate::error::{Error, Result};
use mock::MockBrick;

/// A driver together with the clock its control loops should sleep on
pub struct Device {
    pub driver: Box<dyn BrickDriver>,
    pub clock: Box<dyn Clock>,
}

/// Create a device based on configuration
pub fn create_device(config: &AppConfig) -> Result<Device> {
    match config.device.device_type.as_str() {
        "mock" => {
            let brick = MockBrick::new(&config.device.simulation);
            let clock = brick.clock();
            Ok(Device {
                driver: Box::new(brick),
                clock: Box::new(clock),
            })
        }
        _ => Err(Error::UnknownDevice(config.device.device_type.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_mock_device() {
        let config = AppConfig::default();
        assert!(create_device(&config).is_ok());
    }

    #[test]
    fn test_unknown_device() {
        let mut config = AppConfig::default();
        config.device.device_type = "brickpi3".to_string();
        assert!(matches!(
            create_device(&config),
            Err(Error::UnknownDevice(name)) if name == "brickpi3"
        ));
    }
}
