//! The "TRACKING" Engine - Room object registry and data association
//!
//! Solves the "Duplicate Furniture" problem: the same chair is detected on
//! every frame, and each detection must land on the one record that already
//! describes it.
//!
//! Association is deliberately simple:
//! 1. Admission (reject degenerate boxes and low-confidence observations)
//! 2. Spatial matching (first record whose 3D bounds intersect the candidate)
//! 3. Merge into the match, or create a new record
//!
//! Step 2 is a single-candidate match, not a nearest-neighbour search. When a
//! candidate overlaps several records only the first in registry order
//! absorbs it.

use crate::object_record::{ObjectRecord, Observation};
use crate::volume_estimator::CUBIC_FEET_PER_CUBIC_METER;
use std::collections::HashMap;
use uuid::Uuid;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Configuration for the ObjectRegistry
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryConfig {
    /// Minimum observation confidence admitted (default: 0.5)
    pub probability_threshold: f64,

    /// Multiplier from m³ to the reporting unit (default: ft³)
    pub volume_scale: f64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            probability_threshold: 0.5,
            volume_scale: CUBIC_FEET_PER_CUBIC_METER,
        }
    }
}

/// Outcome of a successful `associate` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Association {
    /// No existing record overlapped; a new one was inserted
    Created(Uuid),
    /// The observation was merged into an existing record
    Merged(Uuid),
}

impl Association {
    pub fn id(&self) -> Uuid {
        match self {
            Association::Created(id) | Association::Merged(id) => *id,
        }
    }
}

// ============================================================================
// OBJECT REGISTRY (The Engine)
// ============================================================================

/// Owns every `ObjectRecord` and is the only place they are mutated.
///
/// Records live in a `Vec` in creation order (the association scan order)
/// with a side index for O(1) id lookup. Records are never removed one at a
/// time; `reset` drops them all, so indices stay valid.
#[derive(Debug, Clone)]
pub struct ObjectRegistry {
    /// Records in creation order
    records: Vec<ObjectRecord>,

    /// id → position in `records`
    index: HashMap<Uuid, usize>,

    config: RegistryConfig,
}

impl ObjectRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
            config,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(RegistryConfig::default())
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // ========================================================================
    // FUSION PASS
    // ========================================================================

    /// Marks the start of a fusion pass. Holds no per-cycle state; exists so
    /// callers can sequence presentation resets against it.
    pub fn begin_cycle(&mut self) {}

    /// Associate one observation with the registry.
    ///
    /// Returns which record absorbed it, or why it was turned away.
    /// Rejections are routine (detection noise) and leave the registry
    /// untouched.
    pub fn associate(
        &mut self,
        observation: Observation,
        now: f64,
    ) -> Result<Association, Rejection> {
        // Stage 1: Admission
        let volume = observation.bounds_3d.volume();
        if !(volume > 0.0) {
            return Err(Rejection::DegenerateBounds { volume });
        }
        if !(observation.confidence >= self.config.probability_threshold) {
            return Err(Rejection::BelowThreshold {
                confidence: observation.confidence,
                threshold: self.config.probability_threshold,
            });
        }

        // Stage 2: Spatial matching (first intersecting record, active or not)
        let matched = self
            .records
            .iter()
            .position(|record| record.bounds_3d().intersects(&observation.bounds_3d));

        // Stage 3: Merge or create
        match matched {
            Some(slot) => {
                let record = &mut self.records[slot];
                record.merge(observation, now, self.config.volume_scale);
                Ok(Association::Merged(record.id()))
            }
            None => {
                let record = ObjectRecord::create(observation, now, self.config.volume_scale);
                let id = record.id();
                self.index.insert(id, self.records.len());
                self.records.push(record);
                Ok(Association::Created(id))
            }
        }
    }

    /// Mark every record unseen for longer than `persistence_window` as
    /// inactive. Removes nothing.
    pub fn expire_stale(&mut self, now: f64, persistence_window: f64) {
        for record in &mut self.records {
            record.refresh_activity(now, persistence_window);
        }
    }

    /// The active record with the highest confidence, if any.
    ///
    /// Activity is whatever the last `expire_stale` left behind; the window
    /// lives with the caller. Exact ties keep the first record encountered.
    pub fn select_best(&self, _now: f64) -> Option<Uuid> {
        self.records
            .iter()
            .filter(|record| record.is_active())
            .fold(None, |best: Option<&ObjectRecord>, record| match best {
                Some(b) if b.confidence() >= record.confidence() => Some(b),
                _ => Some(record),
            })
            .map(ObjectRecord::id)
    }

    /// Forget everything. The only path by which records are deleted.
    pub fn reset(&mut self) {
        self.records.clear();
        self.index.clear();
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn get(&self, id: &Uuid) -> Option<&ObjectRecord> {
        self.index.get(id).map(|&slot| &self.records[slot])
    }

    /// All records, active and inactive, in creation order.
    pub fn records(&self) -> impl Iterator<Item = &ObjectRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_active()).count()
    }
}

impl Default for ObjectRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// Why an observation was not admitted into the registry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Rejection {
    #[error("Degenerate bounds: volume {volume}")]
    DegenerateBounds { volume: f64 },

    #[error("Confidence {confidence} below threshold {threshold}")]
    BelowThreshold { confidence: f64, threshold: f64 },
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Bounds3;
    use nalgebra::{Point3, Vector3};
    use roomscan_env::Rect;

    fn observation_at(label: &str, confidence: f64, x: f64) -> Observation {
        Observation::new(
            label,
            confidence,
            Rect::new(10.0, 10.0, 50.0, 50.0),
            Bounds3::from_center_size(Point3::new(x, 0.5, 2.0), Vector3::new(0.5, 0.5, 0.5)),
        )
    }

    #[test]
    fn test_registry_creation() {
        let registry = ObjectRegistry::with_defaults();
        assert_eq!(registry.len(), 0);
        assert!(registry.is_empty());
        assert_eq!(registry.select_best(0.0), None);
    }

    #[test]
    fn test_associate_creates_record() {
        let mut registry = ObjectRegistry::with_defaults();

        let association = registry.associate(observation_at("chair", 0.8, 0.0), 0.0).unwrap();
        assert!(matches!(association, Association::Created(_)));

        let record = registry.get(&association.id()).unwrap();
        assert_eq!(record.times_seen(), 1);
        assert!(record.is_active());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_identical_observation_twice_merges() {
        let mut registry = ObjectRegistry::with_defaults();

        let first = registry.associate(observation_at("chair", 0.8, 0.0), 0.0).unwrap();
        let second = registry.associate(observation_at("chair", 0.8, 0.0), 0.1).unwrap();

        assert_eq!(second, Association::Merged(first.id()));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&first.id()).unwrap().times_seen(), 2);
    }

    #[test]
    fn test_disjoint_observations_create_distinct_records() {
        let mut registry = ObjectRegistry::with_defaults();

        let a = registry.associate(observation_at("chair", 0.8, 0.0), 0.0).unwrap();
        let b = registry.associate(observation_at("table", 0.9, 3.0), 0.0).unwrap();

        assert_ne!(a.id(), b.id());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_first_intersecting_record_wins() {
        let mut registry = ObjectRegistry::with_defaults();

        // Two records 0.6 m apart; a wide candidate between them overlaps both
        let left = registry.associate(observation_at("chair", 0.8, 0.0), 0.0).unwrap();
        let right = registry.associate(observation_at("stool", 0.8, 0.6), 0.0).unwrap();
        assert_eq!(registry.len(), 2);

        let wide = Observation::new(
            "bench",
            0.7,
            Rect::default(),
            Bounds3::from_center_size(Point3::new(0.3, 0.5, 2.0), Vector3::new(1.0, 0.5, 0.5)),
        );
        let merged = registry.associate(wide, 1.0).unwrap();

        assert_eq!(merged, Association::Merged(left.id()));
        assert_eq!(registry.get(&left.id()).unwrap().label(), "bench");
        assert_eq!(registry.get(&right.id()).unwrap().times_seen(), 1);
    }

    #[test]
    fn test_rejects_degenerate_bounds() {
        let mut registry = ObjectRegistry::with_defaults();
        let flat = Observation::new(
            "poster",
            0.9,
            Rect::default(),
            Bounds3::from_center_size(Point3::origin(), Vector3::new(1.0, 1.0, 0.0)),
        );

        let result = registry.associate(flat, 0.0);
        assert_eq!(result, Err(Rejection::DegenerateBounds { volume: 0.0 }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_rejects_low_confidence() {
        let mut registry = ObjectRegistry::with_defaults();

        let result = registry.associate(observation_at("chair", 0.3, 0.0), 0.0);
        assert!(matches!(result, Err(Rejection::BelowThreshold { .. })));

        let result = registry.associate(observation_at("chair", f64::NAN, 0.0), 0.0);
        assert!(matches!(result, Err(Rejection::BelowThreshold { .. })));
        assert!(registry.is_empty());

        // Exactly at the threshold is admitted
        assert!(registry.associate(observation_at("chair", 0.5, 0.0), 0.0).is_ok());
    }

    #[test]
    fn test_expiry_and_reactivation_keep_id() {
        let mut registry = ObjectRegistry::with_defaults();
        let id = registry.associate(observation_at("chair", 0.8, 0.0), 0.0).unwrap().id();

        registry.expire_stale(1.0, 2.0);
        assert!(registry.get(&id).unwrap().is_active());

        registry.expire_stale(2.5, 2.0);
        assert!(!registry.get(&id).unwrap().is_active());
        assert_eq!(registry.active_count(), 0);
        assert_eq!(registry.len(), 1);

        // Inactive records still take part in matching
        let again = registry.associate(observation_at("chair", 0.6, 0.0), 3.0).unwrap();
        assert_eq!(again, Association::Merged(id));
        let record = registry.get(&id).unwrap();
        assert!(record.is_active());
        assert_eq!(record.times_seen(), 2);
    }

    #[test]
    fn test_select_best_picks_highest_confidence() {
        let mut registry = ObjectRegistry::with_defaults();
        registry.associate(observation_at("chair", 0.6, 0.0), 0.0).unwrap();
        let table = registry.associate(observation_at("table", 0.95, 3.0), 0.0).unwrap();
        registry.associate(observation_at("lamp", 0.7, 6.0), 0.0).unwrap();

        assert_eq!(registry.select_best(0.5), Some(table.id()));
    }

    #[test]
    fn test_select_best_ignores_inactive() {
        let mut registry = ObjectRegistry::with_defaults();
        let id = registry.associate(observation_at("chair", 0.8, 0.0), 0.0).unwrap().id();

        registry.expire_stale(5.0, 2.0);
        assert_eq!(registry.select_best(5.0), None);
        assert!(registry.get(&id).is_some());
    }

    #[test]
    fn test_select_best_follows_window_given_to_expire_stale() {
        let mut registry = ObjectRegistry::with_defaults();
        let old = registry.associate(observation_at("chair", 0.99, 0.0), 0.0).unwrap();
        let fresh = registry.associate(observation_at("table", 0.6, 3.0), 4.0).unwrap();

        // A 10 s window keeps the chair alive at 4.5 s
        registry.expire_stale(4.5, 10.0);
        assert!(registry.get(&old.id()).unwrap().is_active());
        assert_eq!(registry.select_best(4.5), Some(old.id()));

        // A 2 s window retires it, and selection agrees
        registry.expire_stale(4.5, 2.0);
        assert!(!registry.get(&old.id()).unwrap().is_active());
        assert_eq!(registry.select_best(4.5), Some(fresh.id()));
    }

    #[test]
    fn test_reset_is_total() {
        let mut registry = ObjectRegistry::with_defaults();
        let id = registry.associate(observation_at("chair", 0.8, 0.0), 0.0).unwrap().id();
        registry.associate(observation_at("table", 0.9, 3.0), 0.0).unwrap();

        registry.reset();

        assert_eq!(registry.len(), 0);
        assert_eq!(registry.select_best(0.0), None);
        assert!(registry.get(&id).is_none());

        // Ids are not reused after a reset
        let new_id = registry.associate(observation_at("chair", 0.8, 0.0), 1.0).unwrap().id();
        assert_ne!(new_id, id);
    }
}
