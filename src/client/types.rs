//! Core types for the visualization client
//!
//! These are standalone types that don't depend on Bevy. The serde structs
//! mirror the JSON bodies the simulation server sends.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier the server assigns to a car or traffic light
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A 3D position in the scene
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Linear interpolation towards `other`.
    ///
    /// `t = 0` and `t = 1` return the endpoints exactly.
    pub fn lerp(&self, other: &Position, t: f32) -> Position {
        if t <= 0.0 {
            return *self;
        }
        if t >= 1.0 {
            return *other;
        }
        Position {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }

    /// Component-wise difference `self - other`
    pub fn sub(&self, other: &Position) -> Position {
        Position::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    /// Whether the XZ-plane component is too small to define a heading
    pub fn is_near_zero(&self) -> bool {
        self.x.abs() < f32::EPSILON && self.z.abs() < f32::EPSILON
    }

    /// Calculate the angle from this position to another (Y-axis rotation)
    pub fn angle_to(&self, other: &Position) -> f32 {
        let dx = other.x - self.x;
        let dz = other.z - self.z;
        let direction_len = (dx * dx + dz * dz).sqrt();
        if direction_len > 0.0 {
            (dx / direction_len).atan2(dz / direction_len)
        } else {
            0.0
        }
    }

    /// Same position moved down by `offset` on the Y axis
    pub fn lowered(&self, offset: f32) -> Position {
        Position::new(self.x, self.y - offset, self.z)
    }
}

/// One record in a server payload.
///
/// Scenery endpoints may omit `id`; traffic lights add `state` and `direction`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AgentRecord {
    #[serde(default)]
    pub id: AgentId,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

impl AgentRecord {
    pub fn new(id: impl Into<String>, x: f32, y: f32, z: f32) -> Self {
        Self {
            id: AgentId::new(id),
            x,
            y,
            z,
            state: None,
            direction: None,
        }
    }

    pub fn with_state(mut self, state: bool) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_direction(mut self, direction: impl Into<String>) -> Self {
        self.direction = Some(direction.into());
        self
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y, self.z)
    }

    /// Light colour implied by `state`; a missing state reads as red
    pub fn light_state(&self) -> LightState {
        LightState::from(self.state.unwrap_or(false))
    }
}

/// Body of every list endpoint: `{"positions": [...]}`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AgentsPayload {
    #[serde(default)]
    pub positions: Vec<AgentRecord>,
}

/// Body of `/init`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InitReport {
    #[serde(default)]
    pub message: String,
}

/// Body of `/update`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StepReport {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "currentStep", default, skip_serializing_if = "Option::is_none")]
    pub current_step: Option<u64>,
}

/// State of a traffic light
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LightState {
    #[default]
    Red,
    Green,
}

impl From<bool> for LightState {
    fn from(green: bool) -> Self {
        if green {
            LightState::Green
        } else {
            LightState::Red
        }
    }
}

impl LightState {
    /// sRGB colour of the lamp
    pub fn rgb(&self) -> [u8; 3] {
        match self {
            LightState::Green => [61, 161, 27],
            LightState::Red => [255, 0, 0],
        }
    }
}

/// Category of entity a list endpoint describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotKind {
    Cars,
    TrafficLights,
    Roads,
    Destinations,
    ArrivedCars,
    Obstacles,
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SnapshotKind::Cars => "cars",
            SnapshotKind::TrafficLights => "traffic lights",
            SnapshotKind::Roads => "roads",
            SnapshotKind::Destinations => "destinations",
            SnapshotKind::ArrivedCars => "arrived cars",
            SnapshotKind::Obstacles => "obstacles",
        };
        f.write_str(name)
    }
}

/// Simulation step number reported by `/update`
pub type Step = u64;
