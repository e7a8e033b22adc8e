//! brickbot - run one control loop on the brick
//!
//! ```text
//! brickbot [--config <path>] <follow|odometry|mirror>
//! ```
//!
//! Without a config file the built-in defaults are used, which select the
//! simulated brick. Ctrl-C stops the loop at the end of the current tick;
//! the brick is reset before the process exits.

use brickbot::config::AppConfig;
use brickbot::devices::create_device;
use brickbot::error::{Error, Result};
use brickbot::follow::LightFollower;
use brickbot::mirror::EncoderMirror;
use brickbot::odometry::OdometryIntegrator;
use std::env;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Control loop selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Follow,
    Odometry,
    Mirror,
}

impl Mode {
    fn parse(name: &str) -> Result<Self> {
        match name {
            "follow" | "follow-light" => Ok(Mode::Follow),
            "odometry" | "odom" => Ok(Mode::Odometry),
            "mirror" => Ok(Mode::Mirror),
            other => Err(Error::InvalidParameter(format!(
                "unknown mode '{}' (expected follow, odometry or mirror)",
                other
            ))),
        }
    }
}

/// Parse mode and optional config path from command line arguments.
///
/// Supports:
/// - `brickbot <mode>`
/// - `brickbot --config <path> <mode>` / `brickbot -c <path> <mode>`
fn parse_args() -> Result<(Mode, Option<String>)> {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut config_path = None;
    let mut mode = None;
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--config" || args[i] == "-c" {
            config_path = args.get(i + 1).cloned();
            if config_path.is_none() {
                return Err(Error::InvalidParameter(format!("{} needs a path", args[i])));
            }
            i += 2;
            continue;
        }
        if mode.is_none() && !args[i].starts_with('-') {
            mode = Some(Mode::parse(&args[i])?);
        }
        i += 1;
    }

    let mode = mode.ok_or_else(|| {
        Error::InvalidParameter("usage: brickbot [--config <path>] <follow|odometry|mirror>".into())
    })?;
    Ok((mode, config_path))
}

fn main() -> Result<()> {
    let (mode, config_path) = parse_args()?;

    let config = match &config_path {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    // Initialize logger
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!("brickbot v{} starting ({:?})", env!("CARGO_PKG_VERSION"), mode);
    match &config_path {
        Some(path) => log::info!("Using config: {}", path),
        None => log::info!("Using built-in defaults"),
    }
    log::info!(
        "Device: {} ({})",
        config.device.name,
        config.device.device_type
    );

    let device = create_device(&config)?;

    // Set up shutdown signal handler
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    match mode {
        Mode::Follow => {
            let follower =
                LightFollower::new(device.driver, device.clock, &config.robot, &config.follow);
            follower.run(&running)?;
        }
        Mode::Odometry => {
            let integrator = OdometryIntegrator::new(
                device.driver,
                device.clock,
                &config.robot,
                &config.odometry,
            )?;
            let report = integrator.run(&running)?;
            if report.interrupted {
                log::info!("Odometry interrupted after {} moves", report.moves.len());
            }
        }
        Mode::Mirror => {
            let mirror = EncoderMirror::new(device.driver, device.clock, &config.mirror);
            mirror.run(&running)?;
        }
    }

    log::info!("brickbot stopped");
    Ok(())
}
