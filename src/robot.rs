//! The control surface a line-following program drives.
//!
//! ```no_run
//! use pibot_sim::{Robot, SimConfig, SimError};
//!
//! fn main() -> Result<(), SimError> {
//!     let mut robot = Robot::new(&SimConfig::default())?;
//!     robot.set_wheels_speed(40.0)?;
//!     while robot.line_sensors().iter().any(|&v| v > 512) {
//!         robot.advance(0.1)?;
//!     }
//!     robot.finish()?;
//!     Ok(())
//! }
//! ```

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::time::Instant;

use pibot_kinematics::{Pose, WheelSpeeds};
use pibot_track::{PixelPoint, TrackRaster};
use tracing::{debug, info, warn};

use crate::config::SimConfig;
use crate::error::SimError;
use crate::geometry::RobotGeometry;
use crate::render::{Canvas, ImageCanvas};
use crate::report::RunReport;
use crate::sensors::SensorId;
use crate::world::{TerminationState, World};

/// Wheel selector for [`Robot::set_wheel_speed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Simulated two-wheeled robot with six downward line sensors.
///
/// Wheel speeds are commanded in percent and only take effect when simulated
/// time is advanced with [`Robot::advance`]. A run ends on [`Robot::finish`],
/// when the time budget is spent, or when the robot leaves the track image;
/// the rendered path is saved at that point.
pub struct Robot {
    world: World,
    geometry: RobotGeometry,
    speeds: WheelSpeeds,
    timeout: f64,
    sim_time: f64,
    output_image: PathBuf,
    count_steps: bool,
    steps: Cell<u64>,
    started: Instant,
    report: Option<RunReport>,
}

impl Robot {
    /// Loads the track image named in `config` and places the robot on it.
    pub fn new(config: &SimConfig) -> Result<Self, SimError> {
        let raster = TrackRaster::load(&config.track_image, config.geometry.pixels_per_meter)?;
        let canvas = ImageCanvas::open(&config.track_image)?;
        Self::from_parts(raster, Box::new(canvas), config)
    }

    /// Builds a robot on an already loaded raster. `config.track_image` is
    /// ignored.
    pub fn from_parts(raster: TrackRaster, canvas: Box<dyn Canvas>, config: &SimConfig) -> Result<Self, SimError> {
        let start = PixelPoint::new(config.start_x, config.start_y);
        let world = World::new(raster, &config.geometry, start, config.starting_orientation, canvas)?;
        info!(timeout = config.timeout, output = %config.output_image.display(), "Robot ready");

        Ok(Robot {
            world,
            geometry: config.geometry.clone(),
            speeds: WheelSpeeds::default(),
            timeout: config.timeout,
            sim_time: 0.0,
            output_image: config.output_image.clone(),
            count_steps: config.count_steps,
            steps: Cell::new(0),
            started: Instant::now(),
            report: None,
        })
    }

    fn count_step(&self) {
        if self.count_steps {
            self.steps.set(self.steps.get() + 1);
        }
    }

    fn percentage_to_rps(&self, pct: f64) -> Result<f64, SimError> {
        if (-100.0..=100.0).contains(&pct) {
            Ok(pct * self.geometry.rps_per_percentage)
        } else {
            warn!(pct, "Rejected wheel speed");
            Err(SimError::InvalidSpeed { pct })
        }
    }

    /// Sets the left wheel speed in percent of full speed, `-100..=100`.
    pub fn set_left_wheel_speed(&mut self, pct: f64) -> Result<(), SimError> {
        self.count_step();
        self.speeds.left_rps = self.percentage_to_rps(pct)?;
        Ok(())
    }

    /// Sets the right wheel speed in percent of full speed, `-100..=100`.
    pub fn set_right_wheel_speed(&mut self, pct: f64) -> Result<(), SimError> {
        self.count_step();
        self.speeds.right_rps = self.percentage_to_rps(pct)?;
        Ok(())
    }

    /// Sets the speed of the wheel on `side`, in percent.
    pub fn set_wheel_speed(&mut self, side: Side, pct: f64) -> Result<(), SimError> {
        self.count_step();
        let rps = self.percentage_to_rps(pct)?;
        match side {
            Side::Left => self.speeds.left_rps = rps,
            Side::Right => self.speeds.right_rps = rps,
        }
        Ok(())
    }

    /// Sets both wheels to the same speed.
    pub fn set_wheels_speed(&mut self, pct: f64) -> Result<(), SimError> {
        self.count_step();
        let rps = self.percentage_to_rps(pct)?;
        self.speeds = WheelSpeeds::new(rps, rps);
        Ok(())
    }

    /// Lets the robot drive at the current wheel speeds for `dt` simulated
    /// seconds.
    ///
    /// Non-positive or NaN `dt`, and any call after the run has ended, do
    /// nothing. The call that pushes simulated time past the timeout returns
    /// [`SimError::Timeout`]; otherwise a call that leaves the robot center off
    /// the image returns [`SimError::OutOfBounds`]. Either one ends the run and
    /// saves the path image.
    pub fn advance(&mut self, dt: f64) -> Result<(), SimError> {
        self.count_step();
        if dt.is_nan() || dt <= 0.0 || self.world.state().is_terminal() {
            return Ok(());
        }

        let travel = self.world.drive().wheel_travel(self.speeds, dt)?;
        self.world.move_wheels(travel.left, travel.right);
        self.sim_time += dt;
        debug!(dt, sim_time = self.sim_time, %travel, "Advanced simulation");

        if self.sim_time > self.timeout {
            let err = SimError::Timeout {
                elapsed: self.sim_time,
                limit: self.timeout,
            };
            return Err(self.end_run(TerminationState::DoneTimeout, err));
        }

        if self.world.is_out_of_bounds() {
            let pose = self.world.pose();
            let ppm = self.world.raster().pixels_per_meter();
            let err = SimError::OutOfBounds {
                x: pose.x * ppm,
                y: pose.y * ppm,
            };
            return Err(self.end_run(TerminationState::DoneOutOfBounds, err));
        }

        Ok(())
    }

    /// Moves to `state` and finalizes. Save failures are logged so they do not
    /// hide `err`.
    fn end_run(&mut self, state: TerminationState, err: SimError) -> SimError {
        warn!(error = %err, "Run ended");
        if self.world.terminate(state) {
            if let Err(e) = self.finalize() {
                warn!(error = %e, "Failed to write path image");
            }
        }
        err
    }

    /// Reading of one sensor, `0` (black) to `1024` (white).
    pub fn line_sensor(&mut self, id: SensorId) -> u16 {
        self.count_step();
        self.world.sensor_value(id)
    }

    /// Innermost left sensor, stock offset `(-0.01, 0.03)` m.
    pub fn left_line_sensor(&mut self) -> u16 {
        self.line_sensor(SensorId::Left)
    }

    /// Middle left sensor, stock offset `(-0.02, 0.02)` m.
    pub fn second_line_sensor_from_left(&mut self) -> u16 {
        self.line_sensor(SensorId::SecondFromLeft)
    }

    /// Outermost left sensor, stock offset `(-0.03, 0.01)` m.
    pub fn third_line_sensor_from_left(&mut self) -> u16 {
        self.line_sensor(SensorId::ThirdFromLeft)
    }

    /// Innermost right sensor, stock offset `(0.01, 0.03)` m.
    pub fn right_line_sensor(&mut self) -> u16 {
        self.line_sensor(SensorId::Right)
    }

    /// Middle right sensor, stock offset `(0.02, 0.02)` m.
    pub fn second_line_sensor_from_right(&mut self) -> u16 {
        self.line_sensor(SensorId::SecondFromRight)
    }

    /// Outermost right sensor, stock offset `(0.03, 0.01)` m.
    pub fn third_line_sensor_from_right(&mut self) -> u16 {
        self.line_sensor(SensorId::ThirdFromRight)
    }

    /// `[left, second from left, third from left]`.
    pub fn left_line_sensors(&mut self) -> [u16; 3] {
        self.count_step();
        SensorId::LEFT.map(|id| self.world.sensor_value(id))
    }

    /// `[right, second from right, third from right]`.
    pub fn right_line_sensors(&mut self) -> [u16; 3] {
        self.count_step();
        SensorId::RIGHT.map(|id| self.world.sensor_value(id))
    }

    /// Left group followed by the right group.
    pub fn line_sensors(&mut self) -> [u16; 6] {
        self.count_step();
        SensorId::ALL.map(|id| self.world.sensor_value(id))
    }

    /// Heading in whole degrees, truncated toward zero. Not normalized.
    pub fn rotation(&self) -> i32 {
        self.count_step();
        self.world.pose().heading_degrees() as i32
    }

    /// Robot center in pixels, rounded.
    pub fn position(&self) -> (i64, i64) {
        self.count_step();
        let p = self.world.pixel_position();
        (p.x, p.y)
    }

    /// Ends the run (if it is still going), draws the robot, saves the image
    /// and prints the report.
    ///
    /// Only the first finalization does any of that: later calls, and calls
    /// after a timeout or out-of-bounds stop, return the stored report.
    pub fn finish(&mut self) -> Result<RunReport, SimError> {
        self.count_step();
        self.world.terminate(TerminationState::DoneManual);
        self.finalize()
    }

    fn finalize(&mut self) -> Result<RunReport, SimError> {
        if let Some(report) = &self.report {
            return Ok(report.clone());
        }

        self.world.draw_robot();
        let report = RunReport {
            real_time: self.started.elapsed(),
            sim_time: self.sim_time,
            steps: self.steps.get(),
            outcome: self.world.state(),
        };
        println!("{report}");
        info!(
            outcome = %report.outcome,
            real_ms = report.real_time.as_millis() as u64,
            sim_time = report.sim_time,
            steps = report.steps,
            "Run finished"
        );
        self.report = Some(report.clone());

        self.world.save_image(&self.output_image)?;
        Ok(report)
    }

    /// Exact pose in meters and radians.
    pub fn pose(&self) -> Pose {
        self.world.pose()
    }

    /// Current wheel speeds in rotations per second.
    pub fn wheel_speeds(&self) -> WheelSpeeds {
        self.speeds
    }

    /// Whether the run is still going, and if not, how it ended.
    pub fn state(&self) -> TerminationState {
        self.world.state()
    }

    /// Simulated seconds accumulated by [`Robot::advance`].
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    /// Counted calls so far; always 0 when step counting is off.
    pub fn steps_taken(&self) -> u64 {
        self.steps.get()
    }

    /// Pixel positions visited so far, starting with the start point.
    pub fn path(&self) -> &[PixelPoint] {
        self.world.path()
    }

    /// Where the path image is saved when the run ends.
    pub fn output_image(&self) -> &Path {
        &self.output_image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::NullCanvas;
    use crate::world::tests::RecordingCanvas;
    use pibot_track::TrackError;
    use std::f64::consts::{FRAC_PI_2, PI};
    use std::rc::Rc;

    const EPSILON: f64 = 1e-9;

    fn white_raster() -> TrackRaster {
        TrackRaster::from_fn(500, 500, 100.0, |_, _| 255).unwrap()
    }

    fn robot_with(config: &SimConfig) -> Robot {
        Robot::from_parts(white_raster(), Box::new(NullCanvas), config).unwrap()
    }

    fn travel(pct: f64, dt: f64) -> f64 {
        pct * 0.083 * 0.03 * PI * dt
    }

    #[test]
    fn test_speed_validation() {
        let mut robot = robot_with(&SimConfig::default());
        robot.set_left_wheel_speed(50.0).unwrap();

        let result = robot.set_left_wheel_speed(150.0);
        assert!(matches!(result, Err(SimError::InvalidSpeed { pct }) if pct == 150.0));
        assert!((robot.wheel_speeds().left_rps - 50.0 * 0.083).abs() < EPSILON);

        assert!(robot.set_right_wheel_speed(100.0).is_ok());
        assert!(robot.set_wheel_speed(Side::Left, -100.0).is_ok());
        assert!(robot.set_wheels_speed(-100.5).is_err());
        assert!(robot.set_wheel_speed(Side::Right, f64::NAN).is_err());

        let speeds = robot.wheel_speeds();
        assert!((speeds.left_rps + 8.3).abs() < EPSILON);
        assert!((speeds.right_rps - 8.3).abs() < EPSILON);
    }

    #[test]
    fn test_initial_rotation_and_position() {
        let robot = robot_with(&SimConfig::default());
        assert_eq!(robot.rotation(), -90);
        assert_eq!(robot.position(), (250, 450));
        assert_eq!(robot.state(), TerminationState::Running);
    }

    #[test]
    fn test_advance_straight() {
        let mut robot = robot_with(&SimConfig::default());
        robot.set_wheels_speed(100.0).unwrap();
        robot.advance(1.0).unwrap();

        let pose = robot.pose();
        assert!((pose.x - 2.5).abs() < EPSILON);
        assert!((pose.y - (4.5 - travel(100.0, 1.0))).abs() < EPSILON);
        assert_eq!(robot.position(), (250, 372));
        assert_eq!(robot.rotation(), -90);
        assert_eq!(robot.path().len(), 2);
        assert_eq!(robot.sim_time(), 1.0);
    }

    #[test]
    fn test_advance_rotates_in_place() {
        let mut robot = robot_with(&SimConfig::default());
        robot.set_left_wheel_speed(-50.0).unwrap();
        robot.set_right_wheel_speed(50.0).unwrap();
        robot.advance(0.5).unwrap();

        let d = travel(50.0, 0.5);
        let pose = robot.pose();
        assert!((pose.x - 2.5).abs() < EPSILON);
        assert!((pose.y - 4.5).abs() < EPSILON);
        assert!((pose.phi - (-FRAC_PI_2 + 2.0 * d / 0.14)).abs() < EPSILON);
        assert_eq!(robot.rotation(), 70);
    }

    #[test]
    fn test_advance_ignores_non_positive_dt() {
        let mut robot = robot_with(&SimConfig::default());
        robot.set_wheels_speed(100.0).unwrap();
        robot.advance(0.0).unwrap();
        robot.advance(-1.0).unwrap();
        robot.advance(f64::NAN).unwrap();
        assert_eq!(robot.position(), (250, 450));
        assert_eq!(robot.sim_time(), 0.0);
        assert_eq!(robot.path().len(), 1);
    }

    #[test]
    fn test_timeout_on_crossing_call() {
        let config = SimConfig {
            timeout: 1.0,
            ..SimConfig::default()
        };
        let mut robot = robot_with(&config);

        robot.advance(0.5).unwrap();
        // Reaching the limit exactly is still allowed.
        robot.advance(0.5).unwrap();
        assert_eq!(robot.state(), TerminationState::Running);

        let result = robot.advance(0.25);
        assert!(matches!(result, Err(SimError::Timeout { elapsed, limit }) if elapsed == 1.25 && limit == 1.0));
        assert_eq!(robot.state(), TerminationState::DoneTimeout);

        // Terminal: further calls are silent no-ops.
        robot.set_wheels_speed(100.0).unwrap();
        assert!(robot.advance(5.0).is_ok());
        assert_eq!(robot.sim_time(), 1.25);
        assert_eq!(robot.position(), (250, 450));
        assert_eq!(robot.path().len(), 4);
    }

    #[test]
    fn test_out_of_bounds_vs_clamped_sensors() {
        let config = SimConfig {
            start_y: 10,
            ..SimConfig::default()
        };
        let mut robot = robot_with(&config);
        robot.set_wheels_speed(100.0).unwrap();

        let result = robot.advance(1.0);
        assert!(matches!(result, Err(SimError::OutOfBounds { y, .. }) if y < 0.0));
        assert_eq!(robot.state(), TerminationState::DoneOutOfBounds);
        let frozen = robot.pose();

        // Sensors still read the nearest edge pixel.
        assert_eq!(robot.line_sensors(), [1024; 6]);

        let path_len = robot.path().len();
        robot.advance(1.0).unwrap();
        assert_eq!(robot.pose(), frozen);
        assert_eq!(robot.sim_time(), 1.0);
        assert_eq!(robot.path().len(), path_len);
    }

    #[test]
    fn test_timeout_takes_precedence_over_out_of_bounds() {
        let config = SimConfig {
            start_y: 10,
            timeout: 0.5,
            ..SimConfig::default()
        };
        let mut robot = robot_with(&config);
        robot.set_wheels_speed(100.0).unwrap();

        assert!(matches!(robot.advance(1.0), Err(SimError::Timeout { .. })));
        assert_eq!(robot.state(), TerminationState::DoneTimeout);
    }

    #[test]
    fn test_huge_step_ends_with_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let config = SimConfig {
            output_image: dir.path().join("robot_path.png"),
            ..SimConfig::default()
        };
        let raster = white_raster();
        let canvas = ImageCanvas::from_raster(&raster);
        let mut robot = Robot::from_parts(raster, Box::new(canvas), &config).unwrap();
        robot.set_wheels_speed(100.0).unwrap();

        assert!(matches!(robot.advance(1e10), Err(SimError::Timeout { .. })));
        assert_eq!(robot.state(), TerminationState::DoneTimeout);
        assert_eq!(robot.finish().unwrap().outcome, TerminationState::DoneTimeout);
    }

    #[test]
    fn test_infinite_step_ends_with_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let config = SimConfig {
            output_image: dir.path().join("robot_path.png"),
            ..SimConfig::default()
        };
        let raster = white_raster();
        let canvas = ImageCanvas::from_raster(&raster);
        let mut robot = Robot::from_parts(raster, Box::new(canvas), &config).unwrap();
        robot.set_wheels_speed(100.0).unwrap();

        assert!(matches!(robot.advance(f64::INFINITY), Err(SimError::Timeout { .. })));
        assert_eq!(robot.state(), TerminationState::DoneTimeout);
    }

    #[test]
    fn test_sensor_groups() {
        // Black band under the left sensors only (pixels 246..=249).
        let raster = TrackRaster::from_fn(500, 500, 100.0, |x, _| if (246..250).contains(&x) { 0 } else { 255 }).unwrap();
        let mut robot = Robot::from_parts(raster, Box::new(NullCanvas), &SimConfig::default()).unwrap();

        assert_eq!(robot.left_line_sensors(), [0, 0, 0]);
        assert_eq!(robot.right_line_sensors(), [1024, 1024, 1024]);
        assert_eq!(robot.line_sensors(), [0, 0, 0, 1024, 1024, 1024]);
        assert_eq!(robot.third_line_sensor_from_left(), 0);
        assert_eq!(robot.second_line_sensor_from_right(), 1024);
    }

    #[test]
    fn test_step_counting() {
        let mut robot = robot_with(&SimConfig::default());
        robot.set_wheels_speed(10.0).unwrap();
        robot.advance(0.1).unwrap();
        robot.line_sensors();
        robot.left_line_sensor();
        let _ = robot.set_left_wheel_speed(300.0);
        robot.rotation();
        robot.position();

        // Plain accessors are free.
        robot.state();
        robot.pose();
        assert_eq!(robot.steps_taken(), 7);

        let report = robot.finish().unwrap();
        assert_eq!(report.steps, 8);
    }

    #[test]
    fn test_step_counting_disabled() {
        let config = SimConfig {
            count_steps: false,
            ..SimConfig::default()
        };
        let mut robot = robot_with(&config);
        robot.set_wheels_speed(10.0).unwrap();
        robot.line_sensors();
        assert_eq!(robot.finish().unwrap().steps, 0);
    }

    #[test]
    fn test_finish_is_idempotent() {
        let canvas = RecordingCanvas::default();
        let drawing = Rc::clone(&canvas.0);
        let mut robot = Robot::from_parts(white_raster(), Box::new(canvas), &SimConfig::default()).unwrap();
        robot.set_wheels_speed(20.0).unwrap();
        robot.advance(2.0).unwrap();

        let first = robot.finish().unwrap();
        assert_eq!(first.outcome, TerminationState::DoneManual);
        assert_eq!(first.sim_time, 2.0);

        let second = robot.finish().unwrap();
        assert_eq!(first, second);
        assert_eq!(robot.state(), TerminationState::DoneManual);

        let drawing = drawing.borrow();
        assert_eq!(drawing.robots.len(), 1);
        assert_eq!(drawing.saves, vec![PathBuf::from("robot_path.png")]);
    }

    #[test]
    fn test_terminal_error_finalizes_once() {
        let canvas = RecordingCanvas::default();
        let drawing = Rc::clone(&canvas.0);
        let config = SimConfig {
            timeout: 0.1,
            ..SimConfig::default()
        };
        let mut robot = Robot::from_parts(white_raster(), Box::new(canvas), &config).unwrap();

        assert!(robot.advance(0.2).is_err());
        let report = robot.finish().unwrap();
        assert_eq!(report.outcome, TerminationState::DoneTimeout);
        assert_eq!(drawing.borrow().robots.len(), 1);
        assert_eq!(drawing.borrow().saves.len(), 1);
    }

    #[test]
    fn test_missing_track_image() {
        let dir = tempfile::tempdir().unwrap();
        let config = SimConfig {
            track_image: dir.path().join("missing.png"),
            ..SimConfig::default()
        };
        let err = Robot::new(&config).err().unwrap();
        assert!(err.is_initialization());
        assert!(matches!(err, SimError::Track(TrackError::NotFound(_))));
    }

    #[test]
    fn test_run_writes_path_image() {
        let dir = tempfile::tempdir().unwrap();
        let track = dir.path().join("track.png");
        image::GrayImage::from_pixel(500, 500, image::Luma([255])).save(&track).unwrap();

        let config = SimConfig {
            track_image: track,
            output_image: dir.path().join("robot_path.png"),
            ..SimConfig::default()
        };
        let mut robot = Robot::new(&config).unwrap();
        robot.set_wheels_speed(50.0).unwrap();
        robot.advance(1.0).unwrap();
        robot.finish().unwrap();

        let output = image::open(robot.output_image()).unwrap().into_rgba8();
        assert_eq!(output.dimensions(), (500, 500));
        // The start point is marked red.
        assert_eq!(*output.get_pixel(250, 450), crate::render::PATH_COLOR);
    }
}
