//! ObjectRecord - one tracked real-world object in the room registry.

use crate::geometry::Bounds3;
use nalgebra::Point3;
use roomscan_env::Rect;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A candidate observation produced by one detection in one fusion cycle.
///
/// Carries the detector's label and confidence, the screen rectangle it was
/// seen in, and the 3D bounds recovered from the point cloud.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub label: String,
    pub confidence: f64,
    pub rect_2d: Rect,
    pub bounds_3d: Bounds3,
}

impl Observation {
    pub fn new(
        label: impl Into<String>,
        confidence: f64,
        rect_2d: Rect,
        bounds_3d: Bounds3,
    ) -> Self {
        Self {
            label: label.into(),
            confidence,
            rect_2d,
            bounds_3d,
        }
    }
}

/// Internal representation of one physical object in the room.
///
/// Records are owned by `ObjectRegistry`; everything outside the registry
/// only ever sees shared references or copies, so the invariants below are
/// upheld by `create` / `merge` / `refresh_activity` alone:
///
/// - `confidence` stays in [0, 1] and never decreases
/// - `times_seen >= 1`
/// - `bounds_3d` is a valid box and `volume` / `world_position` derive from it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectRecord {
    // === Identity ===
    id: Uuid,
    label: String,

    // === Evidence ===
    /// Best confidence ever observed for this object
    confidence: f64,
    times_seen: u32,

    // === Geometry ===
    /// Last-seen screen rectangle, display only
    bounding_rect_2d: Rect,
    /// Authoritative spatial extent used for association
    bounds_3d: Bounds3,
    world_position: Point3<f64>,
    /// Bounds volume in the configured physical unit
    volume: f64,

    // === Recency ===
    last_seen_time: f64,
    active: bool,
}

impl ObjectRecord {
    /// Create a new record from an observation with a fresh id.
    ///
    /// `volume_scale` converts native cubic length units (m³) into the
    /// reporting unit.
    pub fn create(observation: Observation, now: f64, volume_scale: f64) -> Self {
        let Observation {
            label,
            confidence,
            rect_2d,
            bounds_3d,
        } = observation;

        Self {
            id: Uuid::new_v4(),
            label,
            confidence: clamp_unit(confidence),
            times_seen: 1,
            bounding_rect_2d: rect_2d,
            bounds_3d,
            world_position: bounds_3d.center(),
            volume: bounds_3d.volume() * volume_scale,
            last_seen_time: now,
            active: true,
        }
    }

    /// Fold a new observation into this record.
    ///
    /// Geometry and label are replaced by the newest observation;
    /// confidence keeps the maximum seen so far.
    pub fn merge(&mut self, observation: Observation, now: f64, volume_scale: f64) {
        let Observation {
            label,
            confidence,
            rect_2d,
            bounds_3d,
        } = observation;

        self.label = label;
        self.confidence = self.confidence.max(clamp_unit(confidence));
        self.bounding_rect_2d = rect_2d;
        self.bounds_3d = bounds_3d;
        self.world_position = bounds_3d.center();
        self.volume = bounds_3d.volume() * volume_scale;
        self.times_seen = self.times_seen.saturating_add(1);
        self.last_seen_time = self.last_seen_time.max(now);
        self.active = true;
    }

    /// Mark the record inactive once it has gone unseen for longer than
    /// `persistence_window` seconds. Never re-activates.
    pub fn refresh_activity(&mut self, now: f64, persistence_window: f64) {
        if self.is_expired_at(now, persistence_window) {
            self.active = false;
        }
    }

    /// Whether `now` lies beyond the persistence window of the last merge.
    #[inline]
    pub fn is_expired_at(&self, now: f64, persistence_window: f64) -> bool {
        now - self.last_seen_time > persistence_window
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    #[inline]
    pub fn times_seen(&self) -> u32 {
        self.times_seen
    }

    #[inline]
    pub fn bounding_rect_2d(&self) -> Rect {
        self.bounding_rect_2d
    }

    #[inline]
    pub fn bounds_3d(&self) -> &Bounds3 {
        &self.bounds_3d
    }

    #[inline]
    pub fn world_position(&self) -> Point3<f64> {
        self.world_position
    }

    #[inline]
    pub fn volume(&self) -> f64 {
        self.volume
    }

    #[inline]
    pub fn last_seen_time(&self) -> f64 {
        self.last_seen_time
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }
}

fn clamp_unit(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use proptest::prelude::*;

    const FT3_PER_M3: f64 = 35.3147;

    fn chair(confidence: f64) -> Observation {
        Observation::new(
            "chair",
            confidence,
            Rect::new(10.0, 10.0, 50.0, 50.0),
            Bounds3::from_center_size(Point3::new(1.0, 0.5, 2.0), Vector3::new(0.5, 1.0, 0.5)),
        )
    }

    #[test]
    fn test_create_initialises_all_fields() {
        let record = ObjectRecord::create(chair(0.8), 3.0, FT3_PER_M3);

        assert_eq!(record.label(), "chair");
        assert_eq!(record.times_seen(), 1);
        assert!(record.is_active());
        assert_eq!(record.last_seen_time(), 3.0);
        assert_relative_eq!(record.confidence(), 0.8);
        assert_relative_eq!(record.world_position(), Point3::new(1.0, 0.5, 2.0), epsilon = 1e-12);
        assert_relative_eq!(record.volume(), 0.25 * FT3_PER_M3, epsilon = 1e-9);
    }

    #[test]
    fn test_create_assigns_unique_ids() {
        let a = ObjectRecord::create(chair(0.8), 0.0, 1.0);
        let b = ObjectRecord::create(chair(0.8), 0.0, 1.0);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_merge_overwrites_geometry_and_keeps_best_confidence() {
        let mut record = ObjectRecord::create(chair(0.9), 0.0, FT3_PER_M3);
        let id = record.id();

        let moved = Observation::new(
            "armchair",
            0.6,
            Rect::new(20.0, 20.0, 40.0, 40.0),
            Bounds3::from_center_size(Point3::new(1.2, 0.5, 2.0), Vector3::new(1.0, 1.0, 1.0)),
        );
        record.merge(moved, 1.5, FT3_PER_M3);

        assert_eq!(record.id(), id);
        assert_eq!(record.label(), "armchair");
        assert_relative_eq!(record.confidence(), 0.9);
        assert_eq!(record.times_seen(), 2);
        assert_eq!(record.last_seen_time(), 1.5);
        assert_eq!(record.bounding_rect_2d(), Rect::new(20.0, 20.0, 40.0, 40.0));
        assert_relative_eq!(record.world_position(), Point3::new(1.2, 0.5, 2.0), epsilon = 1e-12);
        assert_relative_eq!(record.volume(), FT3_PER_M3, epsilon = 1e-9);
    }

    #[test]
    fn test_confidence_is_clamped_to_unit_interval() {
        let record = ObjectRecord::create(chair(1.7), 0.0, 1.0);
        assert_eq!(record.confidence(), 1.0);

        let record = ObjectRecord::create(chair(f64::NAN), 0.0, 1.0);
        assert_eq!(record.confidence(), 0.0);
    }

    #[test]
    fn test_refresh_activity_expires_but_never_reactivates() {
        let mut record = ObjectRecord::create(chair(0.8), 0.0, 1.0);

        // Exactly at the window edge is still active
        record.refresh_activity(2.0, 2.0);
        assert!(record.is_active());

        record.refresh_activity(2.01, 2.0);
        assert!(!record.is_active());

        // Time passing (even "backwards") does not bring it back
        record.refresh_activity(0.5, 2.0);
        assert!(!record.is_active());

        // Only a merge does
        record.merge(chair(0.8), 3.0, 1.0);
        assert!(record.is_active());
    }

    proptest! {
        #[test]
        fn prop_confidence_never_decreases(
            confidences in prop::collection::vec(0.0f64..=1.0, 1..20)
        ) {
            let mut record = ObjectRecord::create(chair(confidences[0]), 0.0, 1.0);
            let mut previous = record.confidence();

            for (i, c) in confidences.iter().enumerate().skip(1) {
                record.merge(chair(*c), i as f64, 1.0);
                prop_assert!(record.confidence() >= previous);
                prop_assert!(record.confidence() <= 1.0);
                previous = record.confidence();
            }
            prop_assert_eq!(record.times_seen() as usize, confidences.len());
        }
    }
}
