#![warn(missing_docs)]

//! Error types for the kinematics library.
//!
//! This module defines the errors that can occur while building a drive
//! model or converting wheel speeds into wheel travel.

use core::fmt;

/// Errors that can occur in kinematic calculations.
#[derive(Debug, Clone, PartialEq)]
pub enum KinematicsError {
    /// Error for invalid wheel diameter.
    /// This variant is returned when a wheel diameter is not a positive, finite number.
    InvalidWheelDiameter(&'static str),
    /// Error for invalid axis length.
    /// This variant is returned when the distance between the wheels is not a positive, finite number.
    InvalidAxisLength(&'static str),
    /// Error for negative time delta.
    /// This variant is returned when a negative time delta is used to integrate wheel speeds.
    NegativeTimeDelta(&'static str),
}

impl fmt::Display for KinematicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KinematicsError::InvalidWheelDiameter(msg) => write!(f, "Invalid wheel diameter: {}", msg),
            KinematicsError::InvalidAxisLength(msg) => write!(f, "Invalid axis length: {}", msg),
            KinematicsError::NegativeTimeDelta(msg) => write!(f, "Negative time delta: {}", msg),
        }
    }
}

impl core::error::Error for KinematicsError {}
