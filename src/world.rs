//! Simulation state: the robot pose on the track, its path and whether the
//! run is still going.

use std::fmt;
use std::path::Path;

use pibot_kinematics::{DifferentialDrive, Pose};
use pibot_track::{intensity_to_value, PixelPoint, TrackRaster, WorldPoint};
use tracing::{debug, info};

use crate::error::SimError;
use crate::geometry::RobotGeometry;
use crate::render::{Canvas, Marker};
use crate::sensors::{SensorId, SensorModel};

/// Lifecycle of a run. Every `Done*` state is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TerminationState {
    #[default]
    Running,
    DoneManual,
    DoneTimeout,
    DoneOutOfBounds,
}

impl TerminationState {
    pub fn is_running(self) -> bool {
        self == TerminationState::Running
    }

    pub fn is_terminal(self) -> bool {
        !self.is_running()
    }
}

impl fmt::Display for TerminationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TerminationState::Running => "running",
            TerminationState::DoneManual => "finished",
            TerminationState::DoneTimeout => "timed out",
            TerminationState::DoneOutOfBounds => "out of bounds",
        };
        f.write_str(name)
    }
}

/// The robot on its track.
///
/// Owns the pose, which only changes through [`World::move_wheels`], and
/// freezes it once the run has reached a terminal state.
pub struct World {
    raster: TrackRaster,
    drive: DifferentialDrive,
    sensors: SensorModel,
    marker_radius: f64,
    pose: Pose,
    path: Vec<PixelPoint>,
    state: TerminationState,
    canvas: Box<dyn Canvas>,
}

impl World {
    /// Places the robot on `raster` at pixel `start`, heading `orientation_deg`
    /// degrees (-90 points up the image).
    pub fn new(
        raster: TrackRaster,
        geometry: &RobotGeometry,
        start: PixelPoint,
        orientation_deg: f64,
        mut canvas: Box<dyn Canvas>,
    ) -> Result<Self, SimError> {
        let drive = geometry.drive()?;
        let start_world = raster.pixel_to_world(start);
        let pose = Pose::new(start_world.x, start_world.y, orientation_deg.to_radians());
        let start_pixel = raster.world_to_pixel(start_world);

        // The first point would otherwise only appear after the first move.
        canvas.mark(start_pixel, Marker::Path);

        info!(%raster, %drive, %pose, "Robot placed on track");
        Ok(World {
            raster,
            drive,
            sensors: SensorModel::new(geometry.sensors),
            marker_radius: geometry.marker_radius(),
            pose,
            path: vec![start_pixel],
            state: TerminationState::Running,
            canvas,
        })
    }

    /// Rolls the wheels by the given distances (m). Does nothing once the run
    /// has ended. Returns whether the pose changed state.
    pub fn move_wheels(&mut self, left_delta: f64, right_delta: f64) -> bool {
        if self.state.is_terminal() {
            return false;
        }

        self.pose = self.drive.step(self.pose, left_delta, right_delta);
        let pixel = self.pixel_position();
        self.path.push(pixel);
        self.canvas.mark(pixel, Marker::Path);
        debug!(left_delta, right_delta, x = self.pose.x, y = self.pose.y, phi = self.pose.phi, "Robot moved");
        true
    }

    /// Whether the robot center has left `[0, width] × [0, height]` (pixels, unrounded).
    pub fn is_out_of_bounds(&self) -> bool {
        !self.raster.contains(WorldPoint::new(self.pose.x, self.pose.y))
    }

    /// Samples one line sensor and marks the sampled pixel on the canvas.
    pub fn sensor_value(&mut self, id: SensorId) -> u16 {
        let point = SensorModel::world_point(&self.pose, self.sensors.offset(id));
        self.canvas.mark(self.raster.world_to_pixel(point), Marker::Sensor);
        intensity_to_value(self.raster.sample_clamped(point))
    }

    /// Moves to a terminal state. Returns `false`, leaving the state alone,
    /// when the run had already ended.
    pub fn terminate(&mut self, state: TerminationState) -> bool {
        if self.state.is_terminal() || state.is_running() {
            return false;
        }
        info!(%state, pose = %self.pose, "Simulation ended");
        self.state = state;
        true
    }

    /// Draws the robot body and its sensors at the current pose.
    pub fn draw_robot(&mut self) {
        let sensors = self
            .sensors
            .world_points(&self.pose)
            .map(|p| self.raster.world_to_pixel(p));
        let center = self.pixel_position();
        self.canvas.draw_robot(center, self.marker_radius, &sensors);
    }

    pub fn save_image(&self, path: &Path) -> Result<(), SimError> {
        self.canvas.save(path)
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Robot center rounded to the nearest pixel.
    pub fn pixel_position(&self) -> PixelPoint {
        self.raster.world_to_pixel(WorldPoint::new(self.pose.x, self.pose.y))
    }

    pub fn path(&self) -> &[PixelPoint] {
        &self.path
    }

    pub fn state(&self) -> TerminationState {
        self.state
    }

    pub fn raster(&self) -> &TrackRaster {
        &self.raster
    }

    pub fn drive(&self) -> &DifferentialDrive {
        &self.drive
    }
}
