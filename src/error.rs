//! Error types for the simulator.

use std::path::PathBuf;

use pibot_kinematics::KinematicsError;
use pibot_track::TrackError;
use thiserror::Error;

/// Everything that can go wrong while building or driving a simulated robot.
///
/// `InvalidSpeed` is local: the previous command stays in effect and the
/// caller may retry. `Timeout` and `OutOfBounds` are terminal and reported
/// exactly once, on the call that ends the run.
#[derive(Debug, Error)]
pub enum SimError {
    /// The track could not be loaded.
    #[error("failed to initialize track: {0}")]
    Track(#[from] TrackError),

    /// The robot geometry is not physically valid.
    #[error("invalid robot geometry: {0}")]
    Geometry(#[from] KinematicsError),

    /// A wheel speed percentage outside `[-100, 100]`.
    #[error("robot wheel speed must be within -100%..=100%, got {pct}%")]
    InvalidSpeed { pct: f64 },

    /// Accumulated simulated time exceeded the configured budget.
    #[error("the robot timed out after {elapsed:.2}s of simulated time (limit {limit}s)")]
    Timeout { elapsed: f64, limit: f64 },

    /// The robot drove off the track image.
    #[error("the robot has moved out of bounds at pixel ({x:.1}, {y:.1})")]
    OutOfBounds { x: f64, y: f64 },

    /// Writing the rendered path image failed.
    #[error("failed to save path image {path}: {reason}")]
    Output { path: PathBuf, reason: String },
}

impl SimError {
    /// `true` for errors raised at construction time.
    pub fn is_initialization(&self) -> bool {
        matches!(self, SimError::Track(_) | SimError::Geometry(_))
    }

    /// `true` for the errors that end a run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SimError::Timeout { .. } | SimError::OutOfBounds { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(SimError::Track(TrackError::NotFound("track.png".into())).is_initialization());
        assert!(SimError::Geometry(KinematicsError::InvalidAxisLength("must be positive")).is_initialization());
        assert!(!SimError::InvalidSpeed { pct: 150.0 }.is_initialization());
        assert!(!SimError::InvalidSpeed { pct: 150.0 }.is_terminal());
        assert!(SimError::Timeout { elapsed: 30.5, limit: 30.0 }.is_terminal());
        assert!(SimError::OutOfBounds { x: -1.0, y: 3.0 }.is_terminal());
    }

    #[test]
    fn test_error_messages() {
        let missing = SimError::from(TrackError::NotFound("track.png".into()));
        assert_eq!(
            missing.to_string(),
            "failed to initialize track: Unable to find a track image: \"track.png\""
        );
        assert!(SimError::InvalidSpeed { pct: 150.0 }.to_string().contains("150%"));
    }
}
