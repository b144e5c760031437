//! Construction-time settings for a simulation run.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::geometry::RobotGeometry;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
const ENV_PREFIX: &str = "PIBOT";

/// Everything needed to set up a [`Robot`](crate::Robot). Every field has a
/// default, so a partial file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Grayscale track image the robot drives on.
    pub track_image: PathBuf,
    /// Starting heading in degrees. -90 points up the image.
    pub starting_orientation: f64,
    /// Starting position (px).
    pub start_x: i64,
    pub start_y: i64,
    /// Simulated-time budget (s).
    pub timeout: f64,
    /// Where the rendered path is written at the end of a run.
    pub output_image: PathBuf,
    pub count_steps: bool,
    pub geometry: RobotGeometry,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            track_image: PathBuf::from("track.png"),
            starting_orientation: -90.0,
            start_x: 250,
            start_y: 450,
            timeout: 30.0,
            output_image: PathBuf::from("robot_path.png"),
            count_steps: true,
            geometry: RobotGeometry::default(),
        }
    }
}

/// Loads settings from `config/default.toml` (if present), then `path` (if
/// given, must exist), then `PIBOT_*` environment variables. Nested keys use
/// `__`, e.g. `PIBOT_GEOMETRY__AXIS_LENGTH`.
pub fn load_config(path: Option<&Path>) -> Result<SimConfig, ConfigError> {
    info!("Attempting to load configuration from {}", DEFAULT_CONFIG_PATH);

    let mut builder = Config::builder().add_source(File::new(DEFAULT_CONFIG_PATH, FileFormat::Toml).required(false));
    if let Some(path) = path {
        info!("Overlaying configuration from {}", path.display());
        builder = builder.add_source(File::from(path).required(true));
    }
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    match builder.build().and_then(|settings| settings.try_deserialize::<SimConfig>()) {
        Ok(config) => {
            info!("Successfully loaded configuration: {:?}", config);
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_toml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = SimConfig::default();
        assert_eq!(config.track_image, PathBuf::from("track.png"));
        assert_eq!(config.starting_orientation, -90.0);
        assert_eq!((config.start_x, config.start_y), (250, 450));
        assert_eq!(config.timeout, 30.0);
        assert_eq!(config.output_image, PathBuf::from("robot_path.png"));
        assert!(config.count_steps);
        assert_eq!(config.geometry, RobotGeometry::default());
    }

    #[test]
    fn test_bundled_default_file_matches_defaults() {
        assert_eq!(load_config(None).unwrap(), SimConfig::default());
    }

    #[test]
    fn test_partial_file_overrides() {
        let file = write_toml(
            r#"
            track_image = "tracks/oval.png"
            timeout = 12.5
            start_x = 40

            [geometry]
            axis_length = 0.2
            "#,
        );
        let config = load_config(Some(file.path())).unwrap();

        assert_eq!(config.track_image, PathBuf::from("tracks/oval.png"));
        assert_eq!(config.timeout, 12.5);
        assert_eq!(config.start_x, 40);
        assert_eq!(config.start_y, 450);
        assert_eq!(config.geometry.axis_length, 0.2);
        assert_eq!(config.geometry.wheel_diameter, 0.03);
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_malformed_value() {
        let file = write_toml("timeout = \"soon\"\n");
        assert!(load_config(Some(file.path())).is_err());
    }
}
