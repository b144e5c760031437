#![warn(missing_docs)]

use std::path::Path;

use image::GrayImage;
use tracing::{debug, info};

use crate::error::TrackError;
use super::{PixelPoint, WorldPoint};

/// Full-scale sensor value reported for a white (255) pixel.
pub const MAX_SENSOR_VALUE: u16 = 1024;

/// Linear factor mapping an 8-bit intensity onto `[0, MAX_SENSOR_VALUE]`.
pub const VALUE_PER_INTENSITY: f64 = MAX_SENSOR_VALUE as f64 / 255.0;

/// Rescales an 8-bit intensity to a sensor value, `round(p · 1024 / 255)`.
pub fn intensity_to_value(intensity: u8) -> u16 {
    (f64::from(intensity) * VALUE_PER_INTENSITY).round() as u16
}

/// An immutable grayscale track the robot drives over.
///
/// Pixel `(0, 0)` is the top-left corner of the image and the world frame
/// shares that origin: world meters map onto pixels through a single
/// pixels-per-meter scale, with y growing downwards.
#[derive(Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackRaster {
    /// Width of the raster in pixels
    width: u32,
    /// Height of the raster in pixels
    height: u32,
    /// Scale of the raster in pixels per meter
    pixels_per_meter: f64,
    /// Row-major 8-bit intensities
    data: Vec<u8>,
}

impl TrackRaster {
    /// Creates a new raster from row-major intensities.
    ///
    /// # Arguments
    /// * `width` - Width of the raster in pixels
    /// * `height` - Height of the raster in pixels
    /// * `pixels_per_meter` - Scale between world meters and pixels
    /// * `data` - `width * height` intensities, row by row
    ///
    /// # Returns
    /// * `Result<Self, TrackError>` - The raster or an error if parameters are invalid
    pub fn new(width: u32, height: u32, pixels_per_meter: f64, data: Vec<u8>) -> Result<Self, TrackError> {
        if !pixels_per_meter.is_finite() || pixels_per_meter <= 0.0 {
            return Err(TrackError::InvalidResolution("Pixels per meter must be positive"));
        }
        if width == 0 || height == 0 {
            return Err(TrackError::InvalidDimensions("Width and height must be non-zero"));
        }

        let expected = (width as usize)
            .checked_mul(height as usize)
            .ok_or(TrackError::InvalidDimensions("Track dimensions too large, would cause overflow"))?;
        if data.len() != expected {
            return Err(TrackError::InvalidDimensions("Pixel buffer length must equal width * height"));
        }

        Ok(TrackRaster {
            width,
            height,
            pixels_per_meter,
            data,
        })
    }

    /// Creates a raster by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: u32, height: u32, pixels_per_meter: f64, mut f: F) -> Result<Self, TrackError>
    where
        F: FnMut(u32, u32) -> u8,
    {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self::new(width, height, pixels_per_meter, data)
    }

    /// Creates a raster from an already decoded grayscale image.
    pub fn from_gray_image(image: GrayImage, pixels_per_meter: f64) -> Result<Self, TrackError> {
        let (width, height) = image.dimensions();
        Self::new(width, height, pixels_per_meter, image.into_raw())
    }

    /// Loads a track image from disk and converts it to 8-bit grayscale.
    ///
    /// # Errors
    /// * `TrackError::NotFound` if nothing exists at `path`
    /// * `TrackError::Decode` if the file is not a readable image
    pub fn load<P: AsRef<Path>>(path: P, pixels_per_meter: f64) -> Result<Self, TrackError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TrackError::NotFound(path.to_path_buf()));
        }

        let image = image::open(path)
            .map_err(|e| TrackError::Decode {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
            .into_luma8();

        let raster = Self::from_gray_image(image, pixels_per_meter)?;
        info!(path = %path.display(), width = raster.width, height = raster.height, "Loaded track image");
        Ok(raster)
    }

    /// Calculates the index in the data vector for an in-bounds pixel
    fn get_index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Width of the raster in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the raster in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixels per meter.
    pub fn pixels_per_meter(&self) -> f64 {
        self.pixels_per_meter
    }

    /// Converts world coordinates (meters) to the nearest pixel.
    /// The result is not clamped and may lie outside the raster.
    pub fn world_to_pixel(&self, world_p: WorldPoint) -> PixelPoint {
        PixelPoint::new(
            (world_p.x * self.pixels_per_meter).round() as i64,
            (world_p.y * self.pixels_per_meter).round() as i64,
        )
    }

    /// Converts pixel coordinates to world coordinates (meters).
    pub fn pixel_to_world(&self, pixel_p: PixelPoint) -> WorldPoint {
        WorldPoint::new(
            pixel_p.x as f64 / self.pixels_per_meter,
            pixel_p.y as f64 / self.pixels_per_meter,
        )
    }

    /// Clamps a pixel into `[0, width-1] × [0, height-1]`.
    pub fn clamp_pixel(&self, pixel_p: PixelPoint) -> (u32, u32) {
        let x = pixel_p.x.clamp(0, i64::from(self.width) - 1);
        let y = pixel_p.y.clamp(0, i64::from(self.height) - 1);
        (x as u32, y as u32)
    }

    /// Gets the intensity of a pixel.
    ///
    /// # Returns
    /// * `Result<u8, TrackError>` - The intensity or an error if out of bounds
    pub fn intensity(&self, x: u32, y: u32) -> Result<u8, TrackError> {
        if x < self.width && y < self.height {
            Ok(self.data[self.get_index(x, y)])
        } else {
            Err(TrackError::OutOfBounds("Track pixel index out of bounds"))
        }
    }

    /// Samples the intensity under a world point, clamping to the nearest edge
    /// pixel when the point lies off the raster.
    pub fn sample_clamped(&self, world_p: WorldPoint) -> u8 {
        let (x, y) = self.clamp_pixel(self.world_to_pixel(world_p));
        self.data[self.get_index(x, y)]
    }

    /// Checks whether a world point lies on the track extent `[0, width] × [0, height]`
    /// (in pixels, unrounded). Points exactly on the far edge are still inside.
    pub fn contains(&self, world_p: WorldPoint) -> bool {
        let px = world_p.x * self.pixels_per_meter;
        let py = world_p.y * self.pixels_per_meter;
        let inside = px >= 0.0 && py >= 0.0 && px <= f64::from(self.width) && py <= f64::from(self.height);
        if !inside {
            debug!(px, py, "World point outside track extent");
        }
        inside
    }

    /// Gets a reference to the underlying intensities.
    pub fn get_data(&self) -> &[u8] {
        &self.data
    }
}

impl std::fmt::Debug for TrackRaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackRaster")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pixels_per_meter", &self.pixels_per_meter)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for TrackRaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TrackRaster ({}x{} px, {:.1} px/m, {:.2}x{:.2} m)",
            self.width,
            self.height,
            self.pixels_per_meter,
            f64::from(self.width) / self.pixels_per_meter,
            f64::from(self.height) / self.pixels_per_meter,
        )
    }
}
