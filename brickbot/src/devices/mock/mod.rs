//! Mock brick for hardware-free runs and tests
//!
//! Simulates the part of a two-motor brick controller that the control
//! loops touch:
//!
//! | Component | Simulation Method |
//! |-----------|-------------------|
//! | Motor encoders | Power x degrees/s per percent, slip noise |
//! | Light sensor | Queued readings, cycled pattern, ambient floor |
//! | Faults | One-shot sensor faults, per-port encoder faults |
//!
//! # Time
//!
//! The simulation does not run on its own thread. Physics advance only
//! when a control loop sleeps on the [`MockClock`] returned by
//! [`MockBrick::clock`]. With `speed_factor = 0` nothing sleeps for real,
//! which makes complete odometry runs finish in microseconds in tests.
//!
//! ```toml
//! [device]
//! type = "mock"
//!
//! [device.simulation]
//! speed_factor = 1.0    # 2.0 = 2x speed, 0 = as fast as possible
//! random_seed = 42      # 0 = random each run
//!
//! [device.simulation.motors]
//! degrees_per_sec_per_percent = 10.0
//! slip_stddev = 0.01
//! ```
//!
//! # Sharing
//!
//! [`MockBrick`] is a cheap handle (`Arc` inside). Clone it before handing
//! it to a session to keep a handle for inspecting motor powers, reset
//! counts and encoder positions afterwards.

pub mod config;
mod encoder_sim;
mod light_sim;
mod noise;

pub use config::{LightSimConfig, MotorSimConfig, SimulationConfig};

use crate::core::clock::{Clock, SystemClock};
use crate::core::driver::BrickDriver;
use crate::core::types::{MotorPort, SensorPort, SensorType};
use crate::error::{Error, Result};

use encoder_sim::EncoderSimulator;
use light_sim::LightSimulator;
use noise::NoiseGenerator;

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Maximum magnitude accepted by `set_motor_power`
const MAX_POWER_PERCENT: f64 = 100.0;

struct MotorState {
    power: f64,
    offset: i32,
    encoder: EncoderSimulator,
    fault: Option<String>,
}

struct BrickState {
    speed_factor: f64,
    noise: NoiseGenerator,
    motors: [MotorState; 4],
    sensor_types: [SensorType; 4],
    light: LightSimulator,
    pending_sensor_faults: usize,
    power_log: Vec<(MotorPort, f64)>,
    reset_count: u32,
    elapsed_secs: f64,
}

impl BrickState {
    fn new(config: &SimulationConfig) -> Self {
        let motor = || MotorState {
            power: 0.0,
            offset: 0,
            encoder: EncoderSimulator::new(
                config.motors.degrees_per_sec_per_percent,
                config.motors.slip_stddev,
            ),
            fault: None,
        };

        Self {
            speed_factor: config.speed_factor,
            noise: NoiseGenerator::new(config.random_seed),
            motors: [motor(), motor(), motor(), motor()],
            sensor_types: [SensorType::None; 4],
            light: LightSimulator::new(&config.light),
            pending_sensor_faults: 0,
            power_log: Vec::new(),
            reset_count: 0,
            elapsed_secs: 0.0,
        }
    }

    fn advance(&mut self, dt: f64) {
        for motor in self.motors.iter_mut() {
            motor.encoder.update(motor.power, dt, &mut self.noise);
        }
        self.elapsed_secs += dt;
    }
}

/// Simulated brick controller
#[derive(Clone)]
pub struct MockBrick {
    state: Arc<Mutex<BrickState>>,
}

impl MockBrick {
    /// Create a simulated brick
    pub fn new(config: &SimulationConfig) -> Self {
        log::debug!(
            "MockBrick: speed_factor={}, seed={}, {:.1} deg/s per %",
            config.speed_factor,
            config.random_seed,
            config.motors.degrees_per_sec_per_percent
        );
        Self {
            state: Arc::new(Mutex::new(BrickState::new(config))),
        }
    }

    /// Clock that advances this brick's physics
    pub fn clock(&self) -> MockClock {
        MockClock {
            brick: self.clone(),
            wall: SystemClock,
        }
    }

    /// Advance the physics by `dt` seconds
    pub fn advance(&self, dt: f64) {
        self.state.lock().advance(dt);
    }

    /// Queue light readings returned before the configured pattern
    pub fn push_light_readings(&self, readings: &[f64]) {
        self.state.lock().light.push_readings(readings);
    }

    /// Make the next sensor read fail
    pub fn inject_sensor_fault(&self) {
        self.state.lock().pending_sensor_faults += 1;
    }

    /// Make every encoder read/offset on `port` fail until cleared
    pub fn fail_encoder(&self, port: MotorPort, reason: &str) {
        self.state.lock().motors[port.index()].fault = Some(reason.to_string());
    }

    /// Clear an encoder fault set by [`MockBrick::fail_encoder`]
    pub fn clear_encoder_fault(&self, port: MotorPort) {
        self.state.lock().motors[port.index()].fault = None;
    }

    /// Number of `reset_all` calls so far
    pub fn reset_count(&self) -> u32 {
        self.state.lock().reset_count
    }

    /// Current power of a motor
    pub fn motor_power(&self, port: MotorPort) -> f64 {
        self.state.lock().motors[port.index()].power
    }

    /// Raw encoder count, ignoring offsets
    pub fn raw_encoder(&self, port: MotorPort) -> i32 {
        self.state.lock().motors[port.index()].encoder.ticks()
    }

    /// Every power write so far, in order
    pub fn power_log(&self) -> Vec<(MotorPort, f64)> {
        self.state.lock().power_log.clone()
    }

    /// Configured type of a sensor port
    pub fn sensor_type(&self, port: SensorPort) -> SensorType {
        self.state.lock().sensor_types[port.index()]
    }

    /// Simulated seconds elapsed
    pub fn elapsed_secs(&self) -> f64 {
        self.state.lock().elapsed_secs
    }
}

impl Default for MockBrick {
    fn default() -> Self {
        Self::new(&SimulationConfig::deterministic())
    }
}

impl BrickDriver for MockBrick {
    fn get_sensor(&mut self, port: SensorPort) -> Result<f64> {
        let mut state = self.state.lock();

        if state.sensor_types[port.index()] == SensorType::None {
            return Err(Error::Sensor {
                port,
                reason: "sensor not configured".to_string(),
            });
        }
        if state.pending_sensor_faults > 0 {
            state.pending_sensor_faults -= 1;
            return Err(Error::Sensor {
                port,
                reason: "injected fault".to_string(),
            });
        }

        let BrickState { light, noise, .. } = &mut *state;
        light.read(noise).ok_or_else(|| Error::Sensor {
            port,
            reason: "invalid reading".to_string(),
        })
    }

    fn set_sensor_type(&mut self, port: SensorPort, sensor_type: SensorType) -> Result<()> {
        log::debug!("MockBrick: {} -> {:?}", port, sensor_type);
        self.state.lock().sensor_types[port.index()] = sensor_type;
        Ok(())
    }

    fn get_motor_encoder(&mut self, port: MotorPort) -> Result<i32> {
        let state = self.state.lock();
        let motor = &state.motors[port.index()];
        if let Some(reason) = &motor.fault {
            return Err(Error::Encoder {
                port,
                reason: reason.clone(),
            });
        }
        Ok(motor.encoder.ticks().wrapping_sub(motor.offset))
    }

    fn offset_motor_encoder(&mut self, port: MotorPort, value: i32) -> Result<()> {
        let mut state = self.state.lock();
        let motor = &mut state.motors[port.index()];
        if let Some(reason) = &motor.fault {
            return Err(Error::Encoder {
                port,
                reason: reason.clone(),
            });
        }
        motor.offset = motor.offset.wrapping_add(value);
        Ok(())
    }

    fn set_motor_power(&mut self, port: MotorPort, percent: f64) -> Result<()> {
        if percent.is_nan() {
            return Err(Error::InvalidParameter(format!(
                "motor power for {} is NaN",
                port
            )));
        }
        let power = percent.clamp(-MAX_POWER_PERCENT, MAX_POWER_PERCENT);

        let mut state = self.state.lock();
        state.motors[port.index()].power = power;
        state.power_log.push((port, power));
        Ok(())
    }

    fn reset_all(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        for motor in state.motors.iter_mut() {
            motor.power = 0.0;
        }
        state.sensor_types = [SensorType::None; 4];
        state.reset_count += 1;
        log::debug!("MockBrick: reset #{}", state.reset_count);
        Ok(())
    }
}

/// Clock that drives a [`MockBrick`]'s physics
pub struct MockClock {
    brick: MockBrick,
    wall: SystemClock,
}

impl Clock for MockClock {
    fn sleep(&mut self, duration: Duration) {
        self.brick.advance(duration.as_secs_f64());

        let speed_factor = self.brick.state.lock().speed_factor;
        if speed_factor > 0.0 {
            match Duration::try_from_secs_f64(duration.as_secs_f64() / speed_factor) {
                Ok(wall) => self.wall.sleep(wall),
                Err(e) => log::warn!("MockClock: skipping real sleep ({})", e),
            }
        }
    }
}
