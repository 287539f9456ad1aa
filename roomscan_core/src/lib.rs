//! RoomScan Core - Detection and Point-Cloud Fusion
//!
//! This library turns two noisy per-frame streams into a persistent,
//! deduplicated registry of room objects:
//! 1. **Volume Estimation**: 3D points projecting inside a 2D detection are
//!    boxed, padded and converted into a physical volume
//! 2. **Association**: each new observation merges into the first record
//!    whose box it touches, or becomes a new record
//! 3. **Expiry**: records unseen for longer than the persistence window turn
//!    inactive and stop being surfaced, but keep their identity
//!
//! The engine is synchronous and owns its registry. Time, sensors and the
//! display are injected through the traits in `roomscan_env`.

pub mod config;
pub mod fusion_engine;
pub mod geometry;
pub mod listing;
pub mod object_record;
pub mod object_registry;
pub mod presentation;
pub mod volume_estimator;

#[cfg(test)]
mod testing;

// Re-export key types for convenience
pub use config::{ConfigError, FusionConfig};
pub use fusion_engine::{CycleReport, FusionEngine};
pub use geometry::Bounds3;
pub use listing::{ListingHandle, RecordSummary, RegistryListing};
pub use object_record::{ObjectRecord, Observation};
pub use object_registry::{Association, ObjectRegistry, RegistryConfig, Rejection};
pub use presentation::PresentationAdapter;
pub use volume_estimator::{
    EstimateError, EstimatorConfig, VolumeEstimate, VolumeEstimator, CUBIC_FEET_PER_CUBIC_METER,
};
