//! Client configuration
//!
//! Values come from an optional TOML file and are then overridden by the
//! command line. Every field has a default so an empty file is valid.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::rig::Axis;
use super::types::SnapshotKind;

/// Longest accepted polling interval, in seconds
pub const MAX_UPDATE_INTERVAL: f32 = 3600.0;

/// Endpoint paths on the simulation server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub init: String,
    pub update: String,
    pub cars: String,
    pub traffic_lights: String,
    pub roads: String,
    pub destinations: String,
    pub arrived_cars: String,
    pub obstacles: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            init: "/init".to_string(),
            update: "/update".to_string(),
            cars: "/getCars".to_string(),
            traffic_lights: "/getTrafficLights".to_string(),
            roads: "/getRoads".to_string(),
            destinations: "/getDestinations".to_string(),
            arrived_cars: "/getArrivedCars".to_string(),
            obstacles: "/getObstacles".to_string(),
        }
    }
}

impl Endpoints {
    /// Path of the list endpoint for a snapshot kind
    pub fn snapshot_path(&self, kind: SnapshotKind) -> &str {
        match kind {
            SnapshotKind::Cars => &self.cars,
            SnapshotKind::TrafficLights => &self.traffic_lights,
            SnapshotKind::Roads => &self.roads,
            SnapshotKind::Destinations => &self.destinations,
            SnapshotKind::ArrivedCars => &self.arrived_cars,
            SnapshotKind::Obstacles => &self.obstacles,
        }
    }
}

/// Full client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the simulation server
    pub server_url: String,
    pub endpoints: Endpoints,
    /// Seconds between simulation steps (also the interpolation window)
    pub time_to_update: f32,
    pub request_timeout_secs: u64,
    /// World units per map tile
    pub tile_size: f32,
    /// How far below a scenery record its floor tile sits
    pub floor_offset: f32,
    /// Number of building variants to pick from
    pub building_variants: usize,
    /// Wheel spin rate in degrees per second
    pub wheel_spin_degrees: f32,
    pub wheel_axis: Axis,
    /// Seed for scenery variant choice; random when unset
    pub seed: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8585".to_string(),
            endpoints: Endpoints::default(),
            time_to_update: 5.0,
            request_timeout_secs: 10,
            tile_size: 1.0,
            floor_offset: 0.04,
            building_variants: 4,
            wheel_spin_degrees: 360.0,
            wheel_axis: Axis::X,
            seed: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: ClientConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the client cannot run with
    pub fn validate(&self) -> Result<()> {
        if !(self.time_to_update > 0.0 && self.time_to_update <= MAX_UPDATE_INTERVAL) {
            anyhow::bail!(
                "time_to_update must be in (0, {}] seconds, got {}",
                MAX_UPDATE_INTERVAL,
                self.time_to_update
            );
        }
        if self.building_variants == 0 {
            anyhow::bail!("building_variants must be at least 1");
        }
        if self.server_url.trim().is_empty() {
            anyhow::bail!("server_url must not be empty");
        }
        Ok(())
    }

    /// Join the server URL and an endpoint path
    pub fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.server_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs_f32(self.time_to_update)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
