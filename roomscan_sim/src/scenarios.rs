//! Named room scenarios for the simulation harness.

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// SIM-001: Furnished room, steady camera
    StaticRoom,

    /// SIM-002: Detector goes blind mid-run; records must expire
    Flicker,

    /// SIM-003: Touching objects collapse into one record
    Crowded,

    /// SIM-004: Too few depth samples to estimate anything
    SparseCloud,

    /// SIM-005: User resets the room mid-run
    Reset,

    /// SIM-006: Camera sweeps around the room
    Orbit,

    /// SIM-007: Depth sensor drops frames
    SensorDropout,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::StaticRoom,
            ScenarioId::Flicker,
            ScenarioId::Crowded,
            ScenarioId::SparseCloud,
            ScenarioId::Reset,
            ScenarioId::Orbit,
            ScenarioId::SensorDropout,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::StaticRoom => "static_room",
            ScenarioId::Flicker => "flicker",
            ScenarioId::Crowded => "crowded",
            ScenarioId::SparseCloud => "sparse_cloud",
            ScenarioId::Reset => "reset",
            ScenarioId::Orbit => "orbit",
            ScenarioId::SensorDropout => "sensor_dropout",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::StaticRoom => "3 objects, steady camera: one active record per object",
            ScenarioId::Flicker => {
                "Detections stop after 1/3 of the run: records expire, selection clears"
            }
            ScenarioId::Crowded => {
                "2 touching objects merge into a single record (first-match association)"
            }
            ScenarioId::SparseCloud => {
                "6 samples per object: every detection lacks evidence, no records"
            }
            ScenarioId::Reset => {
                "Reset at half time: registry cleared, objects re-acquired under new ids"
            }
            ScenarioId::Orbit => {
                "Camera sweeps ±0.08 rad around the room: still one record per object"
            }
            ScenarioId::SensorDropout => {
                "Depth feed offline on 1 frame in 7: frames skipped, records survive"
            }
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "static_room" | "staticroom" | "sim-001" => Ok(ScenarioId::StaticRoom),
            "flicker" | "sim-002" => Ok(ScenarioId::Flicker),
            "crowded" | "sim-003" => Ok(ScenarioId::Crowded),
            "sparse_cloud" | "sparsecloud" | "sim-004" => Ok(ScenarioId::SparseCloud),
            "reset" | "sim-005" => Ok(ScenarioId::Reset),
            "orbit" | "sim-006" => Ok(ScenarioId::Orbit),
            "sensor_dropout" | "sensordropout" | "sim-007" => Ok(ScenarioId::SensorDropout),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}
