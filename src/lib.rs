//! Simulator for a small two-wheeled line-following robot.
//!
//! A [`Robot`] sits on a grayscale track image. Programs steer it by setting
//! wheel speeds in percent, advancing simulated time and reading six
//! downward-facing line sensors. The traversed path is drawn onto a copy of
//! the track and saved when the run ends.

pub mod config;
pub mod error;
pub mod geometry;
pub mod render;
pub mod report;
pub mod robot;
pub mod sensors;
pub mod world;

pub use config::{load_config, SimConfig};
pub use error::SimError;
pub use geometry::{RobotGeometry, SensorOffset};
pub use report::RunReport;
pub use robot::{Robot, Side};
pub use sensors::SensorId;
pub use world::TerminationState;

pub use pibot_kinematics::{DifferentialDrive, Pose};
pub use pibot_track::{PixelPoint, TrackRaster};
