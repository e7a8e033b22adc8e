//! Encoder simulator for mock device
//!
//! Turns motor power into encoder degrees with configurable slip noise.

use super::noise::NoiseGenerator;

/// Single motor encoder driven by commanded power
pub struct EncoderSimulator {
    /// Encoder degrees per second for each percent of power
    degrees_per_sec_per_percent: f64,
    /// Multiplicative slip standard deviation
    slip_stddev: f64,
    /// Accumulated fractional degrees
    accumulator: f64,
    /// Whole degrees since power-on
    ticks: i32,
}

impl EncoderSimulator {
    /// Create new encoder simulator
    pub fn new(degrees_per_sec_per_percent: f64, slip_stddev: f64) -> Self {
        Self {
            degrees_per_sec_per_percent,
            slip_stddev,
            accumulator: 0.0,
            ticks: 0,
        }
    }

    /// Raw encoder count (degrees)
    #[inline]
    pub fn ticks(&self) -> i32 {
        self.ticks
    }

    /// Advance the encoder for `dt` seconds at `power` percent
    ///
    /// Returns the raw encoder count after the update.
    pub fn update(&mut self, power: f64, dt: f64, noise: &mut NoiseGenerator) -> i32 {
        let slip = noise.slip_factor(self.slip_stddev);
        self.accumulator += power * self.degrees_per_sec_per_percent * dt * slip;

        // Only whole degrees are reported, keep the fraction for later
        let whole = self.accumulator.trunc();
        self.accumulator -= whole;
        self.ticks = self.ticks.wrapping_add(whole as i32);

        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_forward_motion() {
        let mut noise = NoiseGenerator::new(42);
        let mut encoder = EncoderSimulator::new(10.0, 0.0);

        // 60% for one second in 50ms steps
        for _ in 0..20 {
            encoder.update(60.0, 0.05, &mut noise);
        }

        assert_eq!(encoder.ticks(), 600);
    }

    #[test]
    fn test_encoder_reverse_is_symmetric() {
        let mut noise = NoiseGenerator::new(42);
        let mut forward = EncoderSimulator::new(10.0, 0.0);
        let mut reverse = EncoderSimulator::new(10.0, 0.0);

        for _ in 0..37 {
            forward.update(13.7, 0.02, &mut noise);
            reverse.update(-13.7, 0.02, &mut noise);
        }

        assert_eq!(forward.ticks(), -reverse.ticks());
    }

    #[test]
    fn test_encoder_keeps_fraction() {
        let mut noise = NoiseGenerator::new(42);
        let mut encoder = EncoderSimulator::new(1.0, 0.0);

        // 0.4 degrees per step: nothing, nothing, then a whole degree
        assert_eq!(encoder.update(4.0, 0.1, &mut noise), 0);
        assert_eq!(encoder.update(4.0, 0.1, &mut noise), 0);
        assert_eq!(encoder.update(4.0, 0.1, &mut noise), 1);
    }

    #[test]
    fn test_encoder_slip_noise_varies() {
        let mut noise = NoiseGenerator::new(7);
        let mut encoder = EncoderSimulator::new(10.0, 0.05);

        for _ in 0..100 {
            encoder.update(50.0, 0.01, &mut noise);
        }

        // 500 degrees nominal, slip keeps it close
        assert!(encoder.ticks() > 450 && encoder.ticks() < 550, "ticks={}", encoder.ticks());
    }
}
