//! Pinhole camera: the simulated world-to-screen projector.

use nalgebra::{Point2, Point3, Vector3};
use roomscan_env::{Projector, ScreenGeometry};

/// Points closer than this along the view axis are not projected (meters).
pub const NEAR_PLANE: f64 = 0.05;

/// Upright pinhole camera with yaw-only rotation.
///
/// Yaw 0 looks down +z with +x to the right and +y up. Screen `v` grows
/// downward, matching detector rectangles.
#[derive(Debug, Clone, PartialEq)]
pub struct PinholeCamera {
    position: Point3<f64>,
    yaw: f64,
    focal_length: f64,
    screen_width: f64,
    screen_height: f64,
}

impl PinholeCamera {
    /// `focal_length` is in pixels.
    pub fn new(
        position: Point3<f64>,
        yaw: f64,
        focal_length: f64,
        screen: &ScreenGeometry,
    ) -> Self {
        Self {
            position,
            yaw,
            focal_length,
            screen_width: screen.width,
            screen_height: screen.height,
        }
    }

    pub fn position(&self) -> Point3<f64> {
        self.position
    }

    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    pub fn forward(&self) -> Vector3<f64> {
        Vector3::new(self.yaw.sin(), 0.0, self.yaw.cos())
    }

    pub fn right(&self) -> Vector3<f64> {
        Vector3::new(self.yaw.cos(), 0.0, -self.yaw.sin())
    }

    /// Place the camera on a horizontal circle around `center`, at the
    /// camera's current height, looking at `center` from `angle` radians.
    pub fn orbit(&mut self, center: Point3<f64>, radius: f64, angle: f64) {
        self.yaw = angle;
        let back = self.forward() * radius;
        self.position = Point3::new(center.x - back.x, self.position.y, center.z - back.z);
    }
}

impl Projector for PinholeCamera {
    fn project(&self, point: &Point3<f64>) -> Option<Point2<f64>> {
        let d = point - self.position;
        let depth = d.dot(&self.forward());
        if depth <= NEAR_PLANE {
            return None;
        }
        let lateral = d.dot(&self.right());
        let vertical = d.y;

        Some(Point2::new(
            self.screen_width / 2.0 + self.focal_length * lateral / depth,
            self.screen_height / 2.0 - self.focal_length * vertical / depth,
        ))
    }
}
