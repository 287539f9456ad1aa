//! Simulated sensor feeds.
//!
//! The world pushes one frame per step; the fusion engine pulls it through
//! the `roomscan_env` source traits. Either feed can be taken offline to
//! exercise source failures.

use nalgebra::Point3;
use roomscan_env::{Detection, DetectionSource, EnvError, PointCloudSource};
use std::collections::VecDeque;

/// Queue of per-frame detection sets.
#[derive(Debug, Clone)]
pub struct DetectionFeed {
    pending: VecDeque<Vec<Detection>>,
    online: bool,
}

impl DetectionFeed {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            online: true,
        }
    }

    pub fn push(&mut self, frame: Vec<Detection>) {
        self.pending.push_back(frame);
    }

    pub fn set_online(&mut self, online: bool) {
        self.online = online;
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl Default for DetectionFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionSource for DetectionFeed {
    fn poll_detections(&mut self) -> Result<Vec<Detection>, EnvError> {
        // An offline poll still consumes the frame
        let frame = self.pending.pop_front().unwrap_or_default();
        if !self.online {
            return Err(EnvError::unavailable("detection feed offline"));
        }
        Ok(frame)
    }
}

/// Queue of per-frame point clouds.
#[derive(Debug, Clone)]
pub struct DepthFeed {
    pending: VecDeque<Vec<Point3<f64>>>,
    online: bool,
}

impl DepthFeed {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            online: true,
        }
    }

    pub fn push(&mut self, frame: Vec<Point3<f64>>) {
        self.pending.push_back(frame);
    }

    pub fn set_online(&mut self, online: bool) {
        self.online = online;
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl Default for DepthFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl PointCloudSource for DepthFeed {
    fn poll_points(&mut self) -> Result<Vec<Point3<f64>>, EnvError> {
        let frame = self.pending.pop_front().unwrap_or_default();
        if !self.online {
            return Err(EnvError::unavailable("depth feed offline"));
        }
        Ok(frame)
    }
}
