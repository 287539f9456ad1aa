//! RoomScan Environment Abstraction Layer
//!
//! This crate provides the "Sans-IO" seams that let the RoomScan fusion
//! engine run against a real device (camera, depth sensor, screen) or a
//! deterministic simulation.
//!
//! # Core Concept: Pull, Don't Subscribe
//!
//! The fusion engine never registers callbacks. Once per frame the
//! orchestrator pulls:
//! - Time (`ScanClock::now()`)
//! - Detections (`DetectionSource::poll_detections()`)
//! - Points (`PointCloudSource::poll_points()`)
//!
//! and pushes presentation through `RectangleRenderer`. Swapping the
//! implementations swaps the world the engine lives in.
//!
//! # Example
//!
//! ```ignore
//! use roomscan_env::{DetectionSource, PointCloudSource, ScanClock};
//!
//! fn frame<C: ScanClock, D: DetectionSource, P: PointCloudSource>(
//!     clock: &C,
//!     detections: &mut D,
//!     points: &mut P,
//! ) {
//!     let now = clock.now_secs();
//!     let frame_detections = detections.poll_detections()?;
//!     let frame_points = points.poll_points()?;
//!     // ... fuse
//! }
//! ```

mod clock;
mod error;
mod sources;
mod system_clock;
mod types;

pub use clock::ScanClock;
pub use error::EnvError;
pub use sources::{DetectionSource, PointCloudSource, Projector, RectangleRenderer};
pub use system_clock::SystemClock;
pub use types::{Categorization, Color, Detection, Orientation, Rect, ScreenGeometry};
