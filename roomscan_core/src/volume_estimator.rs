//! The "VOLUME" Engine - Point-cloud bounding volumes from 2D regions
//!
//! Turns a detector rectangle plus the frame's raw depth points into a
//! world-space bounding box and a physical volume:
//! 1. Region widening (safety margin for detector localisation error)
//! 2. Screen-space point filtering (project, keep points inside the region)
//! 3. Evidence check (minimum surviving point count)
//! 4. AABB fit + padding (surface sampling is sparse)
//! 5. Unit conversion (m³ → reporting unit)

use crate::geometry::Bounds3;
use nalgebra::Point3;
use roomscan_env::{Projector, Rect};
use serde::{Deserialize, Serialize};

/// One cubic meter expressed in cubic feet.
pub const CUBIC_FEET_PER_CUBIC_METER: f64 = 35.3147;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Configuration for the VolumeEstimator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Region widening factor applied about the rect center (default: 1.2)
    pub expansion_factor: f64,

    /// Minimum in-region points required to trust a fit (default: 10)
    pub min_points: usize,

    /// Padding added to every side of the fitted box, in meters (default: 0.1)
    pub padding: f64,

    /// Multiplier from m³ to the reporting unit (default: ft³)
    pub volume_conversion: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            expansion_factor: 1.2,
            min_points: 10,
            padding: 0.1,
            volume_conversion: CUBIC_FEET_PER_CUBIC_METER,
        }
    }
}

/// Successful output of `VolumeEstimator::estimate`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeEstimate {
    /// Padded world-space bounding box
    pub bounds: Bounds3,

    /// Physical volume of `bounds` in the reporting unit
    pub volume: f64,

    /// Number of points that survived the screen-space filter
    pub points_used: usize,
}

impl VolumeEstimate {
    /// A zero volume (degenerate box, no padding) carries no usable estimate.
    pub fn is_usable(&self) -> bool {
        self.volume > 0.0
    }
}

// ============================================================================
// ESTIMATOR
// ============================================================================

/// Pure function object: same region, points and projector in, same
/// estimate out.
#[derive(Debug, Clone, Default)]
pub struct VolumeEstimator {
    config: EstimatorConfig,
}

impl VolumeEstimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// `rect` widened by the expansion factor about its center.
    pub fn region_of_interest(&self, rect: &Rect) -> Rect {
        rect.scaled_about_center(self.config.expansion_factor)
    }

    /// Estimate the bounding volume of whatever the region of interest
    /// covers in the point cloud.
    ///
    /// `region` is the raw detector rect in screen pixels, the same space
    /// `projector` maps into; it is widened before filtering.
    pub fn estimate<P>(
        &self,
        region: &Rect,
        points: &[Point3<f64>],
        projector: &P,
    ) -> Result<VolumeEstimate, EstimateError>
    where
        P: Projector + ?Sized,
    {
        // Stage 1: widen the region
        let region = self.region_of_interest(region);

        // Stage 2: keep points projecting inside it
        let retained: Vec<&Point3<f64>> = points
            .iter()
            .filter(|point| {
                projector
                    .project(point)
                    .is_some_and(|screen| region.contains(&screen))
            })
            .collect();

        // Stage 3: enough evidence?
        if retained.len() < self.config.min_points {
            return Err(EstimateError::InsufficientPoints {
                found: retained.len(),
                required: self.config.min_points,
            });
        }

        // Stage 4: fit + pad
        let bounds = Bounds3::from_points(retained.iter().copied())
            .ok_or(EstimateError::InsufficientPoints {
                found: 0,
                required: self.config.min_points,
            })?
            .padded(self.config.padding);

        // Stage 5: convert
        Ok(VolumeEstimate {
            bounds,
            volume: bounds.volume() * self.config.volume_conversion,
            points_used: retained.len(),
        })
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// Reasons an estimate could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EstimateError {
    #[error("Insufficient evidence: {found} points in region, {required} required")]
    InsufficientPoints { found: usize, required: usize },
}

// ============================================================================
// TESTS
// ============================================================================
