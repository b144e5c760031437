//! Physical description of the simulated robot.

use pibot_kinematics::{DifferentialDrive, KinematicsError};
use serde::{Deserialize, Serialize};

/// Wheel diameter of the stock robot (m).
pub const WHEEL_DIAMETER: f64 = 0.03;
/// Distance between the stock robot's wheels (m).
pub const AXIS_LENGTH: f64 = 0.14;
/// Wheel rotations per second gained for every percent of commanded speed.
pub const RPS_PER_PERCENTAGE: f64 = 0.083;
/// Scale of the stock track images.
pub const PIXELS_PER_METER: f64 = 100.0;

/// Position of a line sensor in the robot frame (m).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorOffset {
    pub dx: f64,
    pub dy: f64,
}

impl SensorOffset {
    pub const fn new(dx: f64, dy: f64) -> Self {
        SensorOffset { dx, dy }
    }
}

/// Stock sensor layout, outermost-left to innermost-left, then outermost-right
/// to innermost-right.
///
/// ```text
///           2    5
///         1        4
///       0            3
/// ```
pub const SENSOR_OFFSETS: [SensorOffset; 6] = [
    SensorOffset::new(-0.03, 0.01),
    SensorOffset::new(-0.02, 0.02),
    SensorOffset::new(-0.01, 0.03),
    SensorOffset::new(0.03, 0.01),
    SensorOffset::new(0.02, 0.02),
    SensorOffset::new(0.01, 0.03),
];

/// Immutable robot and track constants, injected into the simulation at
/// construction so tests can swap in other geometries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotGeometry {
    pub wheel_diameter: f64,
    pub axis_length: f64,
    pub rps_per_percentage: f64,
    pub pixels_per_meter: f64,
    pub sensors: [SensorOffset; 6],
}

impl Default for RobotGeometry {
    fn default() -> Self {
        RobotGeometry {
            wheel_diameter: WHEEL_DIAMETER,
            axis_length: AXIS_LENGTH,
            rps_per_percentage: RPS_PER_PERCENTAGE,
            pixels_per_meter: PIXELS_PER_METER,
            sensors: SENSOR_OFFSETS,
        }
    }
}

impl RobotGeometry {
    /// Builds the kinematics model for this geometry.
    pub fn drive(&self) -> Result<DifferentialDrive, KinematicsError> {
        DifferentialDrive::new(self.wheel_diameter, self.axis_length)
    }

    /// Radius of the marker drawn for the robot on the output image (px).
    pub fn marker_radius(&self) -> f64 {
        self.axis_length * self.pixels_per_meter / 3.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry() {
        let geometry = RobotGeometry::default();
        let drive = geometry.drive().unwrap();
        assert_eq!(drive.wheel_diameter(), 0.03);
        assert_eq!(drive.axis_length(), 0.14);
        assert!((geometry.marker_radius() - 14.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_sensor_layout_is_mirrored() {
        for i in 0..3 {
            let left = SENSOR_OFFSETS[i];
            let right = SENSOR_OFFSETS[i + 3];
            assert_eq!(left.dx, -right.dx);
            assert_eq!(left.dy, right.dy);
        }
    }

    #[test]
    fn test_invalid_geometry() {
        let geometry = RobotGeometry {
            axis_length: 0.0,
            ..RobotGeometry::default()
        };
        assert!(matches!(geometry.drive(), Err(KinematicsError::InvalidAxisLength(_))));
    }
}
