//! JSON exporter for offline inspection of a run.
//!
//! Exports ground truth and the engine's records frame by frame.

use crate::error::SimError;
use crate::oracle::RoomObject;
use crate::runner::ScenarioMetrics;
use roomscan_core::ObjectRecord;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// A single frame of simulation data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimFrame {
    /// Simulation time in seconds
    pub time_sec: f64,

    /// Ground truth objects
    pub ground_truth: Vec<GroundTruthBox>,

    /// Registry contents after the frame
    pub records: Vec<RecordFrame>,

    /// Highlighted record id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,

    /// Events (resets, blackouts, etc.)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<SimEvent>,
}

/// Ground truth box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundTruthBox {
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// m³
    pub volume: f64,
    pub visible: bool,
}

impl From<&RoomObject> for GroundTruthBox {
    fn from(object: &RoomObject) -> Self {
        Self {
            label: object.label.clone(),
            x: object.center.x,
            y: object.center.y,
            z: object.center.z,
            volume: object.volume(),
            visible: object.visible,
        }
    }
}

/// Record state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordFrame {
    pub id: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// In the engine's reporting unit
    pub volume: f64,
    pub confidence: f64,
    pub times_seen: u32,
    pub active: bool,
}

impl From<&ObjectRecord> for RecordFrame {
    fn from(record: &ObjectRecord) -> Self {
        let position = record.world_position();
        Self {
            id: record.id().to_string(),
            label: record.label().to_string(),
            x: position.x,
            y: position.y,
            z: position.z,
            volume: record.volume(),
            confidence: record.confidence(),
            times_seen: record.times_seen(),
            active: record.is_active(),
        }
    }
}

/// Simulation event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimEvent {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl SimEvent {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: None,
        }
    }
}

/// Complete simulation export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Duration in seconds
    pub duration_sec: f64,

    /// All frames
    pub frames: Vec<SimFrame>,

    /// Final results
    pub passed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ScenarioMetrics>,
}

impl SimExport {
    /// Creates a new export container.
    pub fn new(scenario: &str, seed: u64) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            duration_sec: 0.0,
            frames: Vec::new(),
            passed: false,
            failure_reason: None,
            metrics: None,
        }
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: SimFrame) {
        self.duration_sec = frame.time_sec;
        self.frames.push(frame);
    }

    /// Finalizes the export.
    pub fn finalize(
        &mut self,
        passed: bool,
        failure_reason: Option<String>,
        metrics: ScenarioMetrics,
    ) {
        self.passed = passed;
        self.failure_reason = failure_reason;
        self.metrics = Some(metrics);
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), SimError> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::RoomOracle;

    #[test]
    fn test_export_tracks_duration() {
        let mut export = SimExport::new("static_room", 42);
        let oracle = RoomOracle::furnished(42);
        for i in 1..=3 {
            export.add_frame(SimFrame {
                time_sec: i as f64 * 0.5,
                ground_truth: oracle.objects().iter().map(GroundTruthBox::from).collect(),
                records: Vec::new(),
                selected: None,
                events: Vec::new(),
            });
        }
        export.finalize(true, None, ScenarioMetrics::default());

        assert_eq!(export.frames.len(), 3);
        assert_eq!(export.duration_sec, 1.5);

        let json = serde_json::to_value(&export).unwrap();
        assert_eq!(json["frames"][0]["ground_truth"][0]["label"], "chair");
        assert!(json["frames"][0].get("events").is_none());
        assert!(json.get("failure_reason").is_none());
    }

    #[test]
    fn test_write_to_file() {
        let path = std::env::temp_dir()
            .join(format!("roomscan-export-{}.json", std::process::id()));
        let export = SimExport::new("flicker", 7);
        export.write_to_file(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let back: SimExport = serde_json::from_str(&text).unwrap();
        assert_eq!(back.scenario, "flicker");
        assert_eq!(back.seed, 7);
        let _ = std::fs::remove_file(&path);
    }
}
