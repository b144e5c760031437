//! This module defines the error types used by the `pibot-track` crate.

#![warn(missing_docs)]

use std::path::PathBuf;

/// Error type for track raster operations.
///
/// This enum covers invalid raster parameters, out-of-range pixel access and
/// failures while reading a track image from disk.
#[derive(Debug, PartialEq)]
pub enum TrackError {
    /// Error for an invalid pixel-per-meter scale.
    /// This variant is returned when the scale is not a positive, finite number.
    InvalidResolution(&'static str),
    /// Error for invalid raster dimensions.
    /// This variant is returned when width or height is zero or the pixel buffer has the wrong length.
    InvalidDimensions(&'static str),
    /// Error for out-of-bounds access.
    /// This variant is returned when reading a pixel outside the raster.
    OutOfBounds(&'static str),
    /// The track image does not exist.
    NotFound(PathBuf),
    /// The track image exists but could not be decoded.
    Decode {
        /// Path of the image that failed to decode.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },
}

impl core::fmt::Display for TrackError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TrackError::InvalidResolution(msg) => write!(f, "Invalid track resolution: {}", msg),
            TrackError::InvalidDimensions(msg) => write!(f, "Invalid track dimensions: {}", msg),
            TrackError::OutOfBounds(msg) => write!(f, "Track access out of bounds: {}", msg),
            TrackError::NotFound(path) => {
                write!(f, "Unable to find a track image: \"{}\"", path.display())
            }
            TrackError::Decode { path, reason } => {
                write!(f, "Unable to decode track image \"{}\": {}", path.display(), reason)
            }
        }
    }
}

impl core::error::Error for TrackError {}
