//! Drives the robot around the configured track with a simple proportional
//! line follower.
//!
//! Usage: `pibot-sim [config.toml]`. Set `RUST_LOG=debug` to trace every step.

use std::path::PathBuf;

use anyhow::Context;
use pibot_sim::{load_config, Robot, SimError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Forward speed while the line is centred (%).
const CRUISE_SPEED: f64 = 40.0;
/// Speed difference per sensor imbalance (%).
const STEER_GAIN: f64 = 10.0;
/// Control period (s of simulated time).
const CONTROL_PERIOD: f64 = 0.05;
/// Readings below this are treated as the line.
const DARK_THRESHOLD: u16 = 512;
/// Give up after this long without seeing the line (s).
const LOST_LINE_LIMIT: f64 = 1.0;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = load_config(config_path.as_deref()).context("failed to load configuration")?;
    let mut robot = Robot::new(&config)
        .with_context(|| format!("failed to set up robot on {}", config.track_image.display()))?;

    info!("PiBot simulator started. Following the line...");
    match follow_line(&mut robot) {
        Ok(()) => info!("Lost the line, stopping."),
        Err(e) if e.is_terminal() => warn!("Run stopped early: {}", e),
        Err(e) => return Err(e.into()),
    }

    let report = robot.finish()?;
    info!(outcome = %report.outcome, path = %robot.output_image().display(), "Simulation complete");
    Ok(())
}

fn dark_count(readings: &[u16]) -> u32 {
    readings.iter().filter(|&&v| v < DARK_THRESHOLD).count() as u32
}

/// Steers toward whichever side sees more of the line until the line has been
/// out of sight for [`LOST_LINE_LIMIT`].
fn follow_line(robot: &mut Robot) -> Result<(), SimError> {
    let mut lost_for = 0.0;
    while lost_for < LOST_LINE_LIMIT {
        let left = dark_count(&robot.left_line_sensors());
        let right = dark_count(&robot.right_line_sensors());

        if left + right == 0 {
            lost_for += CONTROL_PERIOD;
        } else {
            lost_for = 0.0;
        }

        // More line on the left: speed up the left wheel to turn left.
        let turn = STEER_GAIN * (f64::from(left) - f64::from(right));
        robot.set_left_wheel_speed(CRUISE_SPEED + turn)?;
        robot.set_right_wheel_speed(CRUISE_SPEED - turn)?;
        robot.advance(CONTROL_PERIOD)?;
    }
    Ok(())
}
