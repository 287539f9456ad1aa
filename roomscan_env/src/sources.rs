//! Collaborator seams: sensor sources, projection, and presentation.

use crate::error::EnvError;
use crate::types::{Color, Detection, Rect};
use nalgebra::{Point2, Point3};
use std::collections::VecDeque;

/// Per-frame pull interface for the 2D semantic detector.
///
/// # Frame Flow
///
/// ```text
/// Camera / Detector          Orchestrator              Fusion Engine
///   |                           |                          |
///   |<-- poll_detections() -----|                          |
///   |--- Vec<Detection> ------->|                          |
///   |                           |-- run_cycle(...) ------->|
/// ```
pub trait DetectionSource {
    /// Returns the detections for the current frame.
    ///
    /// An empty vector is a valid frame ("nothing seen"). An `Err` means the
    /// detector itself is unavailable.
    fn poll_detections(&mut self) -> Result<Vec<Detection>, EnvError>;
}

/// Per-frame pull interface for the depth / point-cloud sensor.
///
/// Points are in world space with no ordering guarantee.
pub trait PointCloudSource {
    /// Returns the point cloud for the current frame (may be empty).
    fn poll_points(&mut self) -> Result<Vec<Point3<f64>>, EnvError>;
}

/// World-to-screen projection.
///
/// Returns `None` for points the camera cannot see (behind the image
/// plane); those points never fall inside any region of interest.
pub trait Projector {
    /// Projects a world-space point to screen-space pixels.
    fn project(&self, point: &Point3<f64>) -> Option<Point2<f64>>;
}

impl<F> Projector for F
where
    F: Fn(&Point3<f64>) -> Option<Point2<f64>>,
{
    fn project(&self, point: &Point3<f64>) -> Option<Point2<f64>> {
        self(point)
    }
}

/// The external rectangle-rendering layer.
pub trait RectangleRenderer {
    /// Displays one labeled rectangle.
    fn draw_rectangle(&mut self, rect: Rect, color: Color, text: &str);

    /// Removes every rectangle currently displayed.
    fn clear_all_rectangles(&mut self);
}

/// A queue of recorded frames replays as a detection source.
///
/// Each poll pops one frame; an exhausted queue yields empty frames.
impl DetectionSource for VecDeque<Vec<Detection>> {
    fn poll_detections(&mut self) -> Result<Vec<Detection>, EnvError> {
        Ok(self.pop_front().unwrap_or_default())
    }
}

impl PointCloudSource for VecDeque<Vec<Point3<f64>>> {
    fn poll_points(&mut self) -> Result<Vec<Point3<f64>>, EnvError> {
        Ok(self.pop_front().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_is_projector() {
        let orthographic = |p: &Point3<f64>| Some(Point2::new(p.x * 10.0, p.y * 10.0));
        let projected = orthographic.project(&Point3::new(1.0, 2.0, 3.0));
        assert_eq!(projected, Some(Point2::new(10.0, 20.0)));
    }

    #[test]
    fn test_frame_queue_replays_then_runs_dry() {
        let mut frames: VecDeque<Vec<Detection>> = VecDeque::new();
        frames.push_back(vec![Detection::single("chair", 0.8, Rect::new(0.1, 0.1, 0.5, 0.5))]);

        assert_eq!(frames.poll_detections().unwrap().len(), 1);
        assert!(frames.poll_detections().unwrap().is_empty());
    }

    #[test]
    fn test_point_queue_replays() {
        let mut frames: VecDeque<Vec<Point3<f64>>> = VecDeque::new();
        frames.push_back(vec![Point3::origin(), Point3::new(1.0, 1.0, 1.0)]);

        assert_eq!(frames.poll_points().unwrap().len(), 2);
        assert!(frames.poll_points().unwrap().is_empty());
    }
}
