#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library for closed-form differential-drive arc kinematics."]
#![doc = ""]
#![doc = "This crate provides the robot pose, wheel speed and wheel travel types, and"]
#![doc = "the exact arc step that maps per-wheel travel distances onto a new pose."]

use core::f64::consts::PI;
use core::fmt;
use libm::{cos, fabs, sin};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod error;
pub use error::KinematicsError;

/// Wheel travel differences below this value (m) are treated as straight motion.
pub const STRAIGHT_EPSILON: f64 = 1e-6;

/// A 2‑D pose `(x, y, φ)` in meters and radians.
///
/// The heading is never normalized; it accumulates across turns.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// World‑frame x position (m).
    pub x: f64,
    /// World‑frame y position (m).
    pub y: f64,
    /// Heading (rad), unbounded.
    pub phi: f64,
}

impl Pose {
    /// Construct a new pose.
    ///
    /// # Arguments
    ///
    /// * `x`: World-frame x position in meters.
    /// * `y`: World-frame y position in meters.
    /// * `phi`: Heading in radians.
    pub const fn new(x: f64, y: f64, phi: f64) -> Self {
        Pose { x, y, phi }
    }

    /// Heading in degrees, without any wrapping.
    pub fn heading_degrees(&self) -> f64 {
        self.phi * 180.0 / PI
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x: {:.3}, y: {:.3}, φ: {:.3} rad)", self.x, self.y, self.phi)
    }
}

/// Left and right wheel speeds in rotations per second.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelSpeeds {
    /// Left wheel speed (rotations/s).
    pub left_rps: f64,
    /// Right wheel speed (rotations/s).
    pub right_rps: f64,
}

impl WheelSpeeds {
    /// Construct wheel speeds.
    ///
    /// # Arguments
    ///
    /// * `left_rps`: Left wheel speed in rotations per second.
    /// * `right_rps`: Right wheel speed in rotations per second.
    pub const fn new(left_rps: f64, right_rps: f64) -> Self {
        WheelSpeeds { left_rps, right_rps }
    }
}

impl fmt::Display for WheelSpeeds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(L: {:.3} rps, R: {:.3} rps)", self.left_rps, self.right_rps)
    }
}

/// Signed distance (m) each wheel has rolled during one step.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelTravel {
    /// Left wheel travel (m).
    pub left: f64,
    /// Right wheel travel (m).
    pub right: f64,
}

impl WheelTravel {
    /// Construct a wheel travel pair.
    pub const fn new(left: f64, right: f64) -> Self {
        WheelTravel { left, right }
    }
}

impl fmt::Display for WheelTravel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(L: {:.4} m, R: {:.4} m)", self.left, self.right)
    }
}

/// Differential‑drive kinematics helper.
///
/// This struct holds the physical parameters of a two-wheeled robot (wheel
/// diameter and axis length) and integrates wheel travel into poses using the
/// closed-form circular arc, which is exact for any step size.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferentialDrive {
    /// Wheel diameter (m).
    wheel_diameter: f64,
    /// Distance between the two wheel contact points (m).
    axis_length: f64,
}

impl DifferentialDrive {
    /// Construct a new differential‑drive kinematics helper.
    ///
    /// # Arguments
    ///
    /// * `wheel_diameter`: The diameter of the robot's wheels in meters.
    /// * `axis_length`: The distance between the two drive wheels in meters.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidWheelDiameter)` if `wheel_diameter` is not positive.
    /// Returns `Err(KinematicsError::InvalidAxisLength)` if `axis_length` is not positive.
    pub fn new(wheel_diameter: f64, axis_length: f64) -> Result<Self, KinematicsError> {
        if !wheel_diameter.is_finite() || wheel_diameter <= 0.0 {
            return Err(KinematicsError::InvalidWheelDiameter(
                "must be positive",
            ));
        }
        if !axis_length.is_finite() || axis_length <= 0.0 {
            return Err(KinematicsError::InvalidAxisLength(
                "must be positive",
            ));
        }
        Ok(DifferentialDrive {
            wheel_diameter,
            axis_length,
        })
    }

    /// Returns the wheel diameter.
    pub fn wheel_diameter(&self) -> f64 {
        self.wheel_diameter
    }

    /// Returns the axis length.
    pub fn axis_length(&self) -> f64 {
        self.axis_length
    }

    /// Converts wheel speeds held for `dt` seconds into the distance each
    /// wheel rolls (`rps * diameter * π * dt`).
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::NegativeTimeDelta)` if `dt` is negative.
    pub fn wheel_travel(&self, speeds: WheelSpeeds, dt: f64) -> Result<WheelTravel, KinematicsError> {
        if dt < 0.0 {
            return Err(KinematicsError::NegativeTimeDelta(
                "must be non-negative",
            ));
        }

        let circumference = self.wheel_diameter * PI;
        Ok(WheelTravel::new(
            speeds.left_rps * circumference * dt,
            speeds.right_rps * circumference * dt,
        ))
    }

    /// Moves `pose` along the arc described by the two wheel travel distances.
    ///
    /// Equal travel (within [`STRAIGHT_EPSILON`]) is a straight translation along
    /// the current heading by `left_delta`. Otherwise the robot pivots on a
    /// circle of signed radius
    /// `R = L·(left + right) / (2·(right − left))` through `dφ = (right − left) / L`.
    ///
    /// # Arguments
    ///
    /// * `pose`: The robot's current pose.
    /// * `left_delta`: Signed distance rolled by the left wheel (m).
    /// * `right_delta`: Signed distance rolled by the right wheel (m).
    ///
    /// # Returns
    ///
    /// The pose at the end of the arc.
    pub fn step(&self, pose: Pose, left_delta: f64, right_delta: f64) -> Pose {
        if fabs(left_delta - right_delta) < STRAIGHT_EPSILON {
            return Pose {
                x: pose.x + left_delta * cos(pose.phi),
                y: pose.y + left_delta * sin(pose.phi),
                phi: pose.phi,
            };
        }

        let radius =
            self.axis_length * (left_delta + right_delta) / (2.0 * (right_delta - left_delta));
        let delta_phi = (right_delta - left_delta) / self.axis_length;

        Pose {
            x: pose.x + radius * sin(delta_phi + pose.phi) - radius * sin(pose.phi),
            y: pose.y - radius * cos(delta_phi + pose.phi) + radius * cos(pose.phi),
            phi: pose.phi + delta_phi,
        }
    }

    /// Convenience wrapper around [`DifferentialDrive::step`] taking a [`WheelTravel`].
    pub fn step_wheels(&self, pose: Pose, travel: WheelTravel) -> Pose {
        self.step(pose, travel.left, travel.right)
    }
}

impl fmt::Display for DifferentialDrive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DifferentialDrive (d: {:.3} m, L: {:.3} m)", self.wheel_diameter, self.axis_length)
    }
}
