//! RoomScan Deterministic Simulation Harness
//!
//! This crate provides a controlled room in which the fusion engine runs
//! deterministically, frame by frame.
//!
//! # Core Principle: Everything Is Injected
//!
//! All sources of non-determinism are replaced:
//! - **Time**: `SimClock` advances only when the world steps
//! - **Sensors**: `RoomOracle` renders detections and point clouds from
//!   ground truth boxes with seeded noise
//! - **Display**: `RectOverlay` records what the device would draw
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         SimWorld                            │
//! │  ┌──────────────┐   ┌───────────────┐   ┌───────────────┐   │
//! │  │  RoomOracle  │──►│ DetectionFeed │──►│               │   │
//! │  │ (ground truth│   └───────────────┘   │ FusionEngine  │   │
//! │  │  + noise)    │   ┌───────────────┐   │               │   │
//! │  │              │──►│   DepthFeed   │──►│               │   │
//! │  └──────▲───────┘   └───────────────┘   └───────┬───────┘   │
//! │         │                                       │           │
//! │  ┌──────┴───────┐   ┌───────────────┐   ┌───────▼───────┐   │
//! │  │PinholeCamera │   │   SimClock    │   │  RectOverlay  │   │
//! │  └──────────────┘   └───────────────┘   └───────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use roomscan_sim::{ScenarioRunner, scenarios::ScenarioId};
//!
//! let result = ScenarioRunner::new(42).with_duration(10.0).run(ScenarioId::Flicker);
//! assert!(result.passed);
//! ```

mod camera;
mod clock;
mod error;
mod exporter;
mod feeds;
mod live;
mod oracle;
mod overlay;
mod runner;
mod world;
pub mod scenarios;

pub use camera::PinholeCamera;
pub use clock::SimClock;
pub use error::SimError;
pub use exporter::{GroundTruthBox, RecordFrame, SimEvent, SimExport, SimFrame};
pub use feeds::{DepthFeed, DetectionFeed};
pub use live::{run_live, LiveSummary};
pub use oracle::{RoomObject, RoomOracle};
pub use overlay::{OverlayRect, RectOverlay};
pub use runner::{ScenarioMetrics, ScenarioResult, ScenarioRunner};
pub use world::{SimConfig, SimWorld, CAMERA_DISTANCE, ROOM_CENTER};
