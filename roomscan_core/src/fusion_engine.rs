//! Fusion Engine - Per-frame orchestration of estimator, registry and overlay.
//!
//! # Cycle
//!
//! ```text
//!  detections ──┐
//!               ├─► best category ─► screen rect ─► VolumeEstimator ─┐
//!  points ──────┘                                                     │
//!                                                                     ▼
//!  renderer ◄── PresentationAdapter ◄── select_best ◄── ObjectRegistry::associate
//!                                                │
//!                                                └──► ListingHandle::publish
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use roomscan_core::{FusionConfig, FusionEngine};
//!
//! let mut engine = FusionEngine::new(FusionConfig::default());
//! loop {
//!     engine.poll_cycle(&mut detections, &mut points, &camera, &screen, &mut overlay, &clock)?;
//!     engine.tick(clock.now_secs(), &mut overlay);
//! }
//! ```

use crate::config::FusionConfig;
use crate::listing::{ListingHandle, RegistryListing};
use crate::object_record::Observation;
use crate::object_registry::{Association, ObjectRegistry, Rejection};
use crate::presentation::PresentationAdapter;
use crate::volume_estimator::{EstimateError, VolumeEstimator};

use nalgebra::Point3;
use roomscan_env::{
    Color, Detection, DetectionSource, EnvError, PointCloudSource, Projector, RectangleRenderer,
    ScanClock, ScreenGeometry,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// What one fusion cycle did with its input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    pub detections_seen: usize,
    /// No categorization at or above threshold, or rejected by the registry
    pub rejected: usize,
    /// Too few points inside the detection region
    pub insufficient_evidence: usize,
    /// Estimate or observation with zero volume
    pub degenerate: usize,
    pub created: usize,
    pub merged: usize,
    pub selected: Option<Uuid>,
}

impl CycleReport {
    /// Detections that ended up in the registry.
    pub fn associated(&self) -> usize {
        self.created + self.merged
    }
}

/// Owns the registry and drives it once per frame.
///
/// The registry is mutated only through `&mut self`; other threads read
/// the listing published through `shared_listing()`.
pub struct FusionEngine {
    config: FusionConfig,
    registry: ObjectRegistry,
    estimator: VolumeEstimator,
    adapter: PresentationAdapter,
    current_selection: Option<Uuid>,
    listing: ListingHandle,
}

impl FusionEngine {
    pub fn new(config: FusionConfig) -> Self {
        Self {
            registry: ObjectRegistry::new(config.registry_config()),
            estimator: VolumeEstimator::new(config.estimator_config()),
            adapter: PresentationAdapter::new(Color::PALETTE[0], config.unit_label.clone()),
            current_selection: None,
            listing: ListingHandle::new(),
            config,
        }
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    /// Record highlighted by the last cycle, if still selected.
    pub fn current_selection(&self) -> Option<Uuid> {
        self.current_selection
    }

    /// Fuse one frame of detections and points into the registry and
    /// present the best record.
    ///
    /// Never fails: every skipped detection is counted in the report.
    pub fn run_cycle<P, R>(
        &mut self,
        detections: &[Detection],
        points: &[Point3<f64>],
        projector: &P,
        screen: &ScreenGeometry,
        renderer: &mut R,
        now: f64,
    ) -> CycleReport
    where
        P: Projector + ?Sized,
        R: RectangleRenderer + ?Sized,
    {
        let mut report = CycleReport {
            detections_seen: detections.len(),
            ..Default::default()
        };

        self.registry.begin_cycle();
        renderer.clear_all_rectangles();

        for detection in detections {
            let Some(category) = detection.best_categorization(self.config.probability_threshold)
            else {
                report.rejected += 1;
                continue;
            };

            let screen_rect = screen.to_screen_rect(&detection.rect);
            let estimate = match self.estimator.estimate(&screen_rect, points, projector) {
                Ok(estimate) => estimate,
                Err(EstimateError::InsufficientPoints { found, required }) => {
                    debug!("{}: {}/{} points, skipped", category.label, found, required);
                    report.insufficient_evidence += 1;
                    continue;
                }
            };
            if !estimate.is_usable() {
                report.degenerate += 1;
                continue;
            }

            // The widened rect is what the record keeps and what gets drawn
            let region = self.estimator.region_of_interest(&screen_rect);
            let observation = Observation::new(
                category.label.clone(),
                category.confidence,
                region,
                estimate.bounds,
            );
            match self.registry.associate(observation, now) {
                Ok(association) => {
                    let center = estimate.bounds.center();
                    debug!(
                        "{} → Volume ≈ {:.2} {} @ ({:.2}, {:.2}, {:.2})",
                        category.label,
                        estimate.volume,
                        self.config.unit_label,
                        center.x,
                        center.y,
                        center.z
                    );
                    match association {
                        Association::Created(_) => report.created += 1,
                        Association::Merged(_) => report.merged += 1,
                    }
                }
                Err(Rejection::DegenerateBounds { .. }) => report.degenerate += 1,
                Err(rejection) => {
                    debug!("{}: {}", category.label, rejection);
                    report.rejected += 1;
                }
            }
        }

        self.registry
            .expire_stale(now, self.config.persistence_window_secs);
        self.current_selection = self.registry.select_best(now);
        self.adapter
            .present(self.current_selection.and_then(|id| self.registry.get(&id)), renderer);
        report.selected = self.current_selection;

        self.publish();
        report
    }

    /// Pull one frame from each source and fuse it at the clock's current
    /// time. Both sources are always polled, so a failure in one never
    /// leaves the other a frame behind; any failure aborts the frame before
    /// the registry is touched.
    pub fn poll_cycle<D, S, P, R, C>(
        &mut self,
        detection_source: &mut D,
        point_source: &mut S,
        projector: &P,
        screen: &ScreenGeometry,
        renderer: &mut R,
        clock: &C,
    ) -> Result<CycleReport, EnvError>
    where
        D: DetectionSource + ?Sized,
        S: PointCloudSource + ?Sized,
        P: Projector + ?Sized,
        R: RectangleRenderer + ?Sized,
        C: ScanClock + ?Sized,
    {
        let detections = detection_source.poll_detections();
        let points = point_source.poll_points();
        let (detections, points) = (detections?, points?);
        let now = clock.now_secs();
        Ok(self.run_cycle(&detections, &points, projector, screen, renderer, now))
    }

    /// Housekeeping independent of detections: expire stale records and
    /// drop the highlight if its record went inactive.
    pub fn tick<R>(&mut self, now: f64, renderer: &mut R)
    where
        R: RectangleRenderer + ?Sized,
    {
        self.registry
            .expire_stale(now, self.config.persistence_window_secs);

        if let Some(id) = self.current_selection {
            let still_active = self.registry.get(&id).is_some_and(|r| r.is_active());
            if !still_active {
                debug!("Selection {} expired", id);
                self.current_selection = None;
                renderer.clear_all_rectangles();
            }
        }

        self.publish();
    }

    /// Forget every detected object and clear the display.
    pub fn reset_room_detections<R>(&mut self, renderer: &mut R)
    where
        R: RectangleRenderer + ?Sized,
    {
        debug!("Resetting {} room detections", self.registry.len());
        self.registry.reset();
        self.current_selection = None;
        renderer.clear_all_rectangles();
        self.publish();
    }

    /// Listing of the registry as it is right now.
    pub fn listing(&self) -> RegistryListing {
        RegistryListing::from_registry(&self.registry, &self.config.unit_label)
    }

    /// Handle for readers on other threads; updated after every cycle,
    /// tick and reset.
    pub fn shared_listing(&self) -> ListingHandle {
        self.listing.clone()
    }

    fn publish(&self) {
        self.listing.publish(self.listing());
    }
}

impl Default for FusionEngine {
    fn default() -> Self {
        Self::new(FusionConfig::default())
    }
}
