//! SimWorld - The simulation harness container.

use crate::camera::PinholeCamera;
use crate::clock::SimClock;
use crate::feeds::{DepthFeed, DetectionFeed};
use crate::oracle::RoomOracle;
use crate::overlay::RectOverlay;

use nalgebra::Point3;
use roomscan_core::{CycleReport, FusionConfig, FusionEngine};
use roomscan_env::{EnvError, Orientation, ScanClock, ScreenGeometry};
use std::time::Duration;

/// Point the default camera looks at and orbits around.
pub const ROOM_CENTER: Point3<f64> = Point3::new(0.0, 1.2, 1.2);

/// Horizontal distance from the camera to `ROOM_CENTER` (meters).
pub const CAMERA_DISTANCE: f64 = 4.2;

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Master seed for determinism
    pub seed: u64,

    /// Frames per simulated second
    pub tick_rate_hz: u32,

    /// Surface samples per object per frame
    pub samples_per_object: usize,

    /// Point noise standard deviation (meters)
    pub point_noise_std: f64,

    /// Half-width of detector confidence jitter
    pub confidence_jitter: f64,

    /// Screen size in pixels (portrait)
    pub screen_width: f64,
    pub screen_height: f64,

    /// Camera focal length in pixels
    pub focal_length: f64,

    /// Engine configuration under test
    pub fusion: FusionConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tick_rate_hz: 30,
            samples_per_object: 60,
            point_noise_std: 0.01,
            confidence_jitter: 0.03,
            screen_width: 1080.0,
            screen_height: 1920.0,
            focal_length: 900.0,
            fusion: FusionConfig::default(),
        }
    }
}

/// The SimWorld - a room, a device looking at it, and the engine under
/// test, stepped one frame at a time.
pub struct SimWorld {
    pub config: SimConfig,

    /// Shared virtual clock
    pub clock: SimClock,

    /// Ground truth
    pub oracle: RoomOracle,

    pub camera: PinholeCamera,

    pub screen: ScreenGeometry,

    /// Stand-in for the device UI
    pub overlay: RectOverlay,

    pub engine: FusionEngine,

    detection_feed: DetectionFeed,
    depth_feed: DepthFeed,

    tick_count: u64,
}

impl SimWorld {
    /// Creates a world around `oracle` with the camera at its home pose.
    pub fn new(config: SimConfig, mut oracle: RoomOracle) -> Result<Self, EnvError> {
        let screen = ScreenGeometry::new(
            config.screen_width,
            config.screen_height,
            Orientation::Portrait,
        )?;
        let mut camera = PinholeCamera::new(ROOM_CENTER, 0.0, config.focal_length, &screen);
        camera.orbit(ROOM_CENTER, CAMERA_DISTANCE, 0.0);
        oracle.set_confidence_jitter(config.confidence_jitter);

        Ok(Self {
            engine: FusionEngine::new(config.fusion.clone()),
            overlay: RectOverlay::new(config.fusion.persistence_window_secs),
            clock: SimClock::new(),
            oracle,
            camera,
            screen,
            detection_feed: DetectionFeed::new(),
            depth_feed: DepthFeed::new(),
            tick_count: 0,
            config,
        })
    }

    /// Seconds per frame.
    pub fn dt(&self) -> f64 {
        1.0 / self.config.tick_rate_hz.max(1) as f64
    }

    /// Runs one frame: advance time, sense, fuse, expire, age the overlay.
    ///
    /// A feed failure skips fusion for this frame but still runs expiry.
    pub fn step(&mut self) -> Result<CycleReport, EnvError> {
        let dt = self.dt();
        self.clock.advance(Duration::from_secs_f64(dt));
        self.tick_count += 1;

        let points = self
            .oracle
            .generate_points(self.config.samples_per_object, self.config.point_noise_std);
        let detections = self.oracle.generate_detections(&self.camera, &self.screen);
        self.detection_feed.push(detections);
        self.depth_feed.push(points);

        let result = self.engine.poll_cycle(
            &mut self.detection_feed,
            &mut self.depth_feed,
            &self.camera,
            &self.screen,
            &mut self.overlay,
            &self.clock,
        );

        self.engine.tick(self.clock.now_secs(), &mut self.overlay);
        self.overlay.update(dt);
        result
    }

    /// Forget every detected object (user-triggered rescan).
    pub fn reset(&mut self) {
        self.engine.reset_room_detections(&mut self.overlay);
    }

    pub fn set_depth_online(&mut self, online: bool) {
        self.depth_feed.set_online(online);
    }

    pub fn set_detections_online(&mut self, online: bool) {
        self.detection_feed.set_online(online);
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn time(&self) -> f64 {
        self.clock.now_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn furnished_world() -> SimWorld {
        SimWorld::new(SimConfig::default(), RoomOracle::furnished(42)).unwrap()
    }

    #[test]
    fn test_camera_starts_at_home_pose() {
        let world = furnished_world();
        let position = world.camera.position();
        assert!((position.x - 0.0).abs() < 1e-12);
        assert!((position.y - 1.2).abs() < 1e-12);
        assert!((position.z + 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_first_step_creates_one_record_per_object() {
        let mut world = furnished_world();
        let report = world.step().unwrap();

        assert_eq!(report.detections_seen, 3);
        assert_eq!(report.created, 3);
        assert_eq!(world.engine.registry().len(), 3);
        assert_eq!(world.overlay.visible_count(), 1);
    }

    #[test]
    fn test_steady_state_merges() {
        let mut world = furnished_world();
        world.step().unwrap();
        let report = world.step().unwrap();

        assert_eq!(report.merged, 3);
        assert_eq!(report.created, 0);
        assert_eq!(world.engine.registry().len(), 3);
    }

    #[test]
    fn test_table_is_selected() {
        let mut world = furnished_world();
        let report = world.step().unwrap();
        let selected = report.selected.and_then(|id| world.engine.registry().get(&id)).unwrap();
        assert_eq!(selected.label(), "table");
    }

    #[test]
    fn test_depth_outage_skips_frame() {
        let mut world = furnished_world();
        world.set_depth_online(false);
        assert!(world.step().is_err());
        assert!(world.engine.registry().is_empty());

        world.set_depth_online(true);
        assert_eq!(world.step().unwrap().created, 3);
    }

    #[test]
    fn test_detector_outage_keeps_feeds_in_step() {
        let mut world = furnished_world();
        world.step().unwrap();

        world.set_detections_online(false);
        assert!(world.step().is_err());

        world.set_detections_online(true);
        for _ in 0..5 {
            world.step().unwrap();
        }
        assert_eq!(world.depth_feed.pending(), 0);
        assert_eq!(world.detection_feed.pending(), 0);
    }

    #[test]
    fn test_clock_advances_per_step() {
        let mut world = furnished_world();
        for _ in 0..30 {
            let _ = world.step();
        }
        assert_eq!(world.tick_count(), 30);
        assert!((world.time() - 1.0).abs() < 1e-6);
    }
}
