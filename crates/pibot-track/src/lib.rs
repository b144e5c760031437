//! Track rasters for the line-following robot simulator.
//!
//! A track is a grayscale image with a fixed pixels-per-meter scale. It is
//! read-only ground truth: the simulator samples it to produce line sensor
//! readings and uses its extent to detect a robot leaving the track.

pub mod error;
pub mod map;

pub use error::TrackError;
pub use map::{intensity_to_value, PixelPoint, TrackRaster, WorldPoint, MAX_SENSOR_VALUE};
