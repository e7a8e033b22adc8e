//! Light sensor simulator for mock device
//!
//! Readings come from, in order of priority:
//! 1. values queued by a test or scenario
//! 2. the configured pattern, cycled forever
//! 3. the ambient floor value

use super::config::LightSimConfig;
use super::noise::NoiseGenerator;
use std::collections::VecDeque;

/// Reflected-light sensor simulator
pub struct LightSimulator {
    config: LightSimConfig,
    queued: VecDeque<f64>,
    pattern_pos: usize,
}

impl LightSimulator {
    pub fn new(config: &LightSimConfig) -> Self {
        Self {
            config: config.clone(),
            queued: VecDeque::new(),
            pattern_pos: 0,
        }
    }

    /// Queue readings to be returned before the pattern resumes
    pub fn push_readings(&mut self, readings: &[f64]) {
        self.queued.extend(readings);
    }

    /// Produce the next reading, or `None` when the simulated read fails
    pub fn read(&mut self, noise: &mut NoiseGenerator) -> Option<f64> {
        if noise.read_fails(self.config.fault_rate) {
            return None;
        }

        let base = if let Some(value) = self.queued.pop_front() {
            value
        } else if !self.config.pattern.is_empty() {
            let value = self.config.pattern[self.pattern_pos % self.config.pattern.len()];
            self.pattern_pos = (self.pattern_pos + 1) % self.config.pattern.len();
            value
        } else {
            self.config.ambient
        };

        Some(base + noise.jitter(self.config.noise_stddev))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config(pattern: Vec<f64>) -> LightSimConfig {
        LightSimConfig {
            pattern,
            noise_stddev: 0.0,
            fault_rate: 0.0,
            ..LightSimConfig::default()
        }
    }

    #[test]
    fn test_queue_before_pattern() {
        let mut noise = NoiseGenerator::new(42);
        let mut light = LightSimulator::new(&quiet_config(vec![2000.0, 2300.0]));
        light.push_readings(&[2150.0]);

        assert_eq!(light.read(&mut noise), Some(2150.0));
        assert_eq!(light.read(&mut noise), Some(2000.0));
        assert_eq!(light.read(&mut noise), Some(2300.0));
        assert_eq!(light.read(&mut noise), Some(2000.0));
    }

    #[test]
    fn test_ambient_without_pattern() {
        let mut noise = NoiseGenerator::new(42);
        let config = quiet_config(Vec::new());
        let ambient = config.ambient;
        let mut light = LightSimulator::new(&config);

        assert_eq!(light.read(&mut noise), Some(ambient));
    }

    #[test]
    fn test_fault_rate_one_always_fails() {
        let mut noise = NoiseGenerator::new(42);
        let mut config = quiet_config(vec![2300.0]);
        config.fault_rate = 1.0;
        let mut light = LightSimulator::new(&config);

        assert_eq!(light.read(&mut noise), None);
    }
}
