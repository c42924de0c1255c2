//! Standalone visualization client core
//!
//! Everything needed to poll the simulation server, track its entities and
//! compute interpolated car poses, without any Bevy dependency. It can be
//! exercised headless from the console or from tests.

mod api;
mod config;
mod layout;
mod lights;
mod poller;
mod rig;
mod scenery;
mod state;
mod tracker;
mod types;

pub use api::{ApiError, HttpSimulationApi, SimulationApi};
pub use config::{ClientConfig, Endpoints, MAX_UPDATE_INTERVAL};
pub use layout::{CityLayout, Tile, TileKind, BUILDING_HEIGHT_RANGE};
pub use lights::{LightChanges, TrafficLight, TrafficLightBoard};
pub use poller::{PollTask, Poller, ServerEvent, SCENERY_KINDS};
pub use rig::{rotation, to_cols_array, transform_vertices, translation, Axis, CarRig, WHEEL_OFFSETS};
pub use scenery::{ScenePlacement, SceneryBuilder, SceneryPiece};
pub use state::{ClientState, SceneSink};
pub use tracker::{AgentFrame, AgentTracker, TrackedAgent};
pub use types::{
    AgentId, AgentRecord, AgentsPayload, InitReport, LightState, Position, SnapshotKind, Step,
    StepReport,
};
