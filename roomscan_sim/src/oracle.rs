//! Ground truth oracle for simulation.
//!
//! The RoomOracle knows where every piece of furniture really is and turns
//! that into the two noisy streams the fusion engine consumes:
//! - Point clouds sampled from box surfaces (with Gaussian noise)
//! - Detector output: projected rectangles with jittered confidence

use crate::camera::PinholeCamera;
use nalgebra::{Point3, Vector3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use roomscan_core::Bounds3;
use roomscan_env::{Categorization, Detection, Projector, Rect, ScreenGeometry};
use serde::{Deserialize, Serialize};

/// Label of the generic secondary category every detection carries.
pub const GENERIC_LABEL: &str = "furniture";

/// A ground truth object in the room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomObject {
    pub label: String,

    /// Box center in meters (world frame, y up)
    pub center: Point3<f64>,

    /// Box extent along each axis in meters
    pub size: Vector3<f64>,

    /// Mean detector confidence for this object
    pub confidence: f64,

    /// Per-frame probability that the detector reports it
    pub detectability: f64,

    /// Whether the detector can currently see it (points are unaffected)
    pub visible: bool,
}

impl RoomObject {
    pub fn new(label: &str, center: Point3<f64>, size: Vector3<f64>, confidence: f64) -> Self {
        Self {
            label: label.to_string(),
            center,
            size,
            confidence,
            detectability: 1.0,
            visible: true,
        }
    }

    pub fn bounds(&self) -> Bounds3 {
        Bounds3::from_center_size(self.center, self.size)
    }

    /// True volume in cubic meters.
    pub fn volume(&self) -> f64 {
        self.size.x * self.size.y * self.size.z
    }

    fn corners(&self) -> [Point3<f64>; 8] {
        let h = self.size / 2.0;
        let c = self.center;
        [
            Point3::new(c.x - h.x, c.y - h.y, c.z - h.z),
            Point3::new(c.x + h.x, c.y - h.y, c.z - h.z),
            Point3::new(c.x - h.x, c.y + h.y, c.z - h.z),
            Point3::new(c.x + h.x, c.y + h.y, c.z - h.z),
            Point3::new(c.x - h.x, c.y - h.y, c.z + h.z),
            Point3::new(c.x + h.x, c.y - h.y, c.z + h.z),
            Point3::new(c.x - h.x, c.y + h.y, c.z + h.z),
            Point3::new(c.x + h.x, c.y + h.y, c.z + h.z),
        ]
    }
}

/// The Oracle - holds the room and generates sensor frames from it.
pub struct RoomOracle {
    /// RNG for sampling and jitter
    rng: ChaCha8Rng,

    objects: Vec<RoomObject>,

    /// Half-width of the uniform confidence jitter
    confidence_jitter: f64,
}

impl RoomOracle {
    /// Creates an empty room.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            objects: Vec::new(),
            confidence_jitter: 0.03,
        }
    }

    /// A room with a chair, a table and a plant, laid out so that none of
    /// them overlap from the default camera.
    pub fn furnished(seed: u64) -> Self {
        let mut oracle = Self::new(seed);
        oracle.add_object(RoomObject::new(
            "chair",
            Point3::new(-0.9, 0.45, 0.5),
            Vector3::new(0.5, 0.9, 0.5),
            0.8,
        ));
        oracle.add_object(RoomObject::new(
            "table",
            Point3::new(0.9, 0.375, 0.8),
            Vector3::new(1.0, 0.75, 0.6),
            0.9,
        ));
        oracle.add_object(RoomObject::new(
            "plant",
            Point3::new(0.0, 0.3, 2.2),
            Vector3::new(0.4, 0.6, 0.4),
            0.7,
        ));
        oracle
    }

    /// Adds an object and returns its index.
    pub fn add_object(&mut self, object: RoomObject) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    pub fn objects(&self) -> &[RoomObject] {
        &self.objects
    }

    pub fn object_mut(&mut self, index: usize) -> Option<&mut RoomObject> {
        self.objects.get_mut(index)
    }

    /// Shows or hides every object from the detector.
    pub fn set_all_visible(&mut self, visible: bool) {
        for object in &mut self.objects {
            object.visible = visible;
        }
    }

    pub fn set_confidence_jitter(&mut self, jitter: f64) {
        self.confidence_jitter = jitter.max(0.0);
    }

    /// Samples `samples_per_object` points on the surface of every object.
    ///
    /// Faces are visited round-robin so that even six samples touch all six
    /// faces; position within a face is uniform.
    pub fn generate_points(
        &mut self,
        samples_per_object: usize,
        noise_std: f64,
    ) -> Vec<Point3<f64>> {
        let normal = Normal::new(0.0, noise_std.max(0.0)).ok();
        let mut points = Vec::with_capacity(samples_per_object * self.objects.len());

        for object in &self.objects {
            let h = object.size / 2.0;
            for i in 0..samples_per_object {
                let axis = (i % 6) / 2;
                let side = if i % 2 == 0 { -1.0 } else { 1.0 };

                let mut offset = Vector3::new(
                    self.rng.gen_range(-1.0..=1.0) * h.x,
                    self.rng.gen_range(-1.0..=1.0) * h.y,
                    self.rng.gen_range(-1.0..=1.0) * h.z,
                );
                offset[axis] = side * h[axis];

                if let Some(normal) = &normal {
                    offset += Vector3::new(
                        normal.sample(&mut self.rng),
                        normal.sample(&mut self.rng),
                        normal.sample(&mut self.rng),
                    );
                }
                points.push(object.center + offset);
            }
        }

        points
    }

    /// Detector output for the current camera pose.
    ///
    /// Each visible object is reported with probability `detectability` as
    /// the screen bounding box of its projected corners, normalized to
    /// [0, 1] and clamped to the screen. Objects with any corner behind the
    /// camera are not reported. The sim runs in portrait orientation, where
    /// normalized and screen axes coincide.
    pub fn generate_detections(
        &mut self,
        camera: &PinholeCamera,
        screen: &ScreenGeometry,
    ) -> Vec<Detection> {
        let mut detections = Vec::new();

        for object in &self.objects {
            if !object.visible {
                continue;
            }
            if self.rng.gen::<f64>() >= object.detectability {
                continue;
            }

            let projected: Option<Vec<_>> =
                object.corners().iter().map(|c| camera.project(c)).collect();
            let Some(projected) = projected else {
                continue;
            };

            let (mut u_min, mut v_min) = (f64::INFINITY, f64::INFINITY);
            let (mut u_max, mut v_max) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
            for p in &projected {
                u_min = u_min.min(p.x);
                u_max = u_max.max(p.x);
                v_min = v_min.min(p.y);
                v_max = v_max.max(p.y);
            }
            let u_min = u_min.clamp(0.0, screen.width) / screen.width;
            let u_max = u_max.clamp(0.0, screen.width) / screen.width;
            let v_min = v_min.clamp(0.0, screen.height) / screen.height;
            let v_max = v_max.clamp(0.0, screen.height) / screen.height;
            if u_max <= u_min || v_max <= v_min {
                continue;
            }

            let jitter = if self.confidence_jitter > 0.0 {
                self.rng.gen_range(-self.confidence_jitter..=self.confidence_jitter)
            } else {
                0.0
            };
            let confidence = (object.confidence + jitter).clamp(0.0, 1.0);

            detections.push(Detection {
                categorizations: vec![
                    Categorization {
                        label: object.label.clone(),
                        confidence,
                    },
                    Categorization {
                        label: GENERIC_LABEL.to_string(),
                        confidence: confidence / 2.0,
                    },
                ],
                rect: Rect::new(u_min, v_min, u_max - u_min, v_max - v_min),
            });
        }

        detections
    }
}
