//! Rendering of the traversed path onto a copy of the track image.

use std::path::Path;

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut};
use pibot_track::{PixelPoint, TrackError, TrackRaster};
use tracing::info;

use crate::error::SimError;

pub const PATH_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);
pub const SENSOR_COLOR: Rgba<u8> = Rgba([0, 128, 0, 255]);
pub const OUTLINE_COLOR: Rgba<u8> = Rgba([0, 0, 255, 255]);
pub const BODY_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// What a single marked pixel represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// A position the robot center passed through.
    Path,
    /// A point a line sensor sampled.
    Sensor,
}

impl Marker {
    pub fn color(self) -> Rgba<u8> {
        match self {
            Marker::Path => PATH_COLOR,
            Marker::Sensor => SENSOR_COLOR,
        }
    }
}

/// Drawing surface observing the simulation.
pub trait Canvas {
    /// Mark one pixel. Pixels outside the image are ignored.
    fn mark(&mut self, at: PixelPoint, marker: Marker);

    /// Draw the robot body centred on `center` with its sensor points.
    fn draw_robot(&mut self, center: PixelPoint, radius: f64, sensors: &[PixelPoint]);

    /// Persist the drawing.
    fn save(&self, path: &Path) -> Result<(), SimError>;
}

/// Canvas that draws nothing, for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCanvas;

impl Canvas for NullCanvas {
    fn mark(&mut self, _at: PixelPoint, _marker: Marker) {}

    fn draw_robot(&mut self, _center: PixelPoint, _radius: f64, _sensors: &[PixelPoint]) {}

    fn save(&self, _path: &Path) -> Result<(), SimError> {
        Ok(())
    }
}

/// Canvas backed by a color copy of the track image.
#[derive(Debug, Clone)]
pub struct ImageCanvas {
    image: RgbaImage,
}

impl ImageCanvas {
    /// Opens the track image in color.
    pub fn open(path: &Path) -> Result<Self, SimError> {
        if !path.exists() {
            return Err(TrackError::NotFound(path.to_path_buf()).into());
        }
        let image = image::open(path)
            .map_err(|e| TrackError::Decode {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
            .into_rgba8();
        Ok(ImageCanvas { image })
    }

    /// Grey copy of an in-memory raster.
    pub fn from_raster(raster: &TrackRaster) -> Self {
        let data = raster.get_data();
        let image = RgbaImage::from_fn(raster.width(), raster.height(), |x, y| {
            let v = data[y as usize * raster.width() as usize + x as usize];
            Rgba([v, v, v, 255])
        });
        ImageCanvas { image }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    fn put(&mut self, at: PixelPoint, color: Rgba<u8>) {
        if at.x >= 0 && at.y >= 0 && at.x < i64::from(self.image.width()) && at.y < i64::from(self.image.height()) {
            self.image.put_pixel(at.x as u32, at.y as u32, color);
        }
    }
}

impl Canvas for ImageCanvas {
    fn mark(&mut self, at: PixelPoint, marker: Marker) {
        self.put(at, marker.color());
    }

    fn draw_robot(&mut self, center: PixelPoint, radius: f64, sensors: &[PixelPoint]) {
        let (width, height) = self.image.dimensions();
        let r = radius.round().clamp(0.0, f64::from(width.max(height))) as i64;
        // The disc is only drawn when some of it can land on the image.
        let near = center.x >= -r
            && center.y >= -r
            && center.x < i64::from(width) + r
            && center.y < i64::from(height) + r;
        if near {
            if let (Ok(x), Ok(y), Ok(r)) = (i32::try_from(center.x), i32::try_from(center.y), i32::try_from(r)) {
                draw_filled_circle_mut(&mut self.image, (x, y), r, BODY_COLOR);
                draw_hollow_circle_mut(&mut self.image, (x, y), r, OUTLINE_COLOR);
            }
        }
        self.put(center, PATH_COLOR);
        for &sensor in sensors {
            self.put(sensor, SENSOR_COLOR);
        }
    }

    fn save(&self, path: &Path) -> Result<(), SimError> {
        self.image.save(path).map_err(|e| SimError::Output {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        info!(path = %path.display(), "Saved robot path image");
        Ok(())
    }
}
