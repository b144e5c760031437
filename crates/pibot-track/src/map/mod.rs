//! Raster-related functionality for the track.
//!
//! This module provides the grayscale track raster and the pixel/world
//! point types used to address it.

pub mod point_types;
pub mod raster;

pub use point_types::{PixelPoint, WorldPoint};
pub use raster::{intensity_to_value, TrackRaster, MAX_SENSOR_VALUE, VALUE_PER_INTENSITY};
