//! Ground-truth line sensor model.
//!
//! Each sensor is a point sample of the track intensity at a fixed offset
//! from the robot center, taken in the robot's rotated frame.

use std::fmt;

use pibot_kinematics::Pose;
use pibot_track::{intensity_to_value, TrackRaster, WorldPoint};

use crate::geometry::SensorOffset;

/// One of the six line sensors, named by its position in the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorId {
    /// Innermost sensor on the left side.
    Left,
    SecondFromLeft,
    /// Outermost sensor on the left side.
    ThirdFromLeft,
    /// Innermost sensor on the right side.
    Right,
    SecondFromRight,
    /// Outermost sensor on the right side.
    ThirdFromRight,
}

impl SensorId {
    /// Left group, innermost first.
    pub const LEFT: [SensorId; 3] = [SensorId::Left, SensorId::SecondFromLeft, SensorId::ThirdFromLeft];
    /// Right group, innermost first.
    pub const RIGHT: [SensorId; 3] = [SensorId::Right, SensorId::SecondFromRight, SensorId::ThirdFromRight];
    /// Left group followed by the right group.
    pub const ALL: [SensorId; 6] = [
        SensorId::Left,
        SensorId::SecondFromLeft,
        SensorId::ThirdFromLeft,
        SensorId::Right,
        SensorId::SecondFromRight,
        SensorId::ThirdFromRight,
    ];

    /// Index of this sensor in the geometry's offset table.
    pub const fn table_index(self) -> usize {
        match self {
            SensorId::ThirdFromLeft => 0,
            SensorId::SecondFromLeft => 1,
            SensorId::Left => 2,
            SensorId::ThirdFromRight => 3,
            SensorId::SecondFromRight => 4,
            SensorId::Right => 5,
        }
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SensorId::Left => "left",
            SensorId::SecondFromLeft => "second from left",
            SensorId::ThirdFromLeft => "third from left",
            SensorId::Right => "right",
            SensorId::SecondFromRight => "second from right",
            SensorId::ThirdFromRight => "third from right",
        };
        f.write_str(name)
    }
}

/// Maps sensor offsets through the robot pose and samples the track.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorModel {
    offsets: [SensorOffset; 6],
}

impl SensorModel {
    pub fn new(offsets: [SensorOffset; 6]) -> Self {
        SensorModel { offsets }
    }

    pub fn offset(&self, id: SensorId) -> SensorOffset {
        self.offsets[id.table_index()]
    }

    /// World position of a robot-frame offset.
    ///
    /// The offset is rotated by `-φ` with sine and cosine swapped:
    /// `(-dx·sin φ + dy·cos φ, dx·cos φ + dy·sin φ)`. With the stock heading of
    /// -90° this puts positive `dy` ahead of the robot (towards the top of the
    /// image) and negative `dx` to its left.
    pub fn world_point(pose: &Pose, offset: SensorOffset) -> WorldPoint {
        let (sin_phi, cos_phi) = pose.phi.sin_cos();
        WorldPoint::new(
            pose.x - offset.dx * sin_phi + offset.dy * cos_phi,
            pose.y + offset.dx * cos_phi + offset.dy * sin_phi,
        )
    }

    /// World positions of all six sensors, in offset-table order.
    pub fn world_points(&self, pose: &Pose) -> [WorldPoint; 6] {
        self.offsets.map(|offset| Self::world_point(pose, offset))
    }

    /// Reading of a single offset, in `[0, 1024]`. Points off the raster read
    /// the nearest edge pixel.
    pub fn value_at(raster: &TrackRaster, pose: &Pose, offset: SensorOffset) -> u16 {
        intensity_to_value(raster.sample_clamped(Self::world_point(pose, offset)))
    }

    pub fn read(&self, raster: &TrackRaster, pose: &Pose, id: SensorId) -> u16 {
        Self::value_at(raster, pose, self.offset(id))
    }

    /// All six readings in [`SensorId::ALL`] order.
    pub fn read_all(&self, raster: &TrackRaster, pose: &Pose) -> [u16; 6] {
        SensorId::ALL.map(|id| self.read(raster, pose, id))
    }
}
