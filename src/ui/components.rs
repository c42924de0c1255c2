//! UI components and resources for linking Bevy entities to client state

use bevy::prelude::*;
use crossbeam::channel::Receiver;

use crate::client::{AgentId, CarRig, CityLayout, ClientConfig, ClientState, Poller, ServerEvent};

/// Resource wrapper for the client configuration
#[derive(Resource, Clone)]
pub struct ClientConfigResource(pub ClientConfig);

/// Optional city map laid out at start-up
#[derive(Resource, Default)]
pub struct LayoutResource(pub Option<CityLayout>);

/// Client state; proxies are Bevy entities (car bodies and signal lamps)
#[derive(Resource)]
pub struct ClientStateResource(pub ClientState<Entity, Entity>);

/// Queue of server events, drained once per frame
#[derive(Resource)]
pub struct ServerEvents(pub Receiver<ServerEvent>);

/// Keeps the polling thread alive for the lifetime of the app
#[derive(Resource)]
pub struct PollerResource(pub Poller);

/// Car body and wheel transform parameters
#[derive(Resource, Clone, Copy)]
pub struct RigResource(pub CarRig);

/// Marker component for ground plane
#[derive(Component)]
pub struct Ground;

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Resource to control camera movement settings
#[derive(Resource)]
pub struct CameraSettings {
    pub movement_speed: f32,
    pub rotation_speed: f32,
    pub zoom_speed: f32,
    /// Point the camera orbits around
    pub focus: Vec3,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            movement_speed: 20.0,
            rotation_speed: 1.0,
            zoom_speed: 15.0,
            focus: Vec3::new(12.0, 0.0, 12.0),
        }
    }
}

/// Marker for entities created from server state
#[derive(Component)]
pub struct SimSynced;

/// Links a Bevy entity to a server car
#[derive(Component)]
pub struct CarLink(pub AgentId);

/// Wheel of a car, by index into the rig's wheel offsets
#[derive(Component)]
pub struct Wheel(pub usize);

/// Links a traffic light post to a server traffic light
#[derive(Component)]
pub struct TrafficLightLink(pub AgentId);

/// The lamp of a traffic light, recoloured on state changes
#[derive(Component)]
pub struct SignalLamp;

/// Marker for static scenery from the server
#[derive(Component)]
pub struct Scenery;

/// Marker for tiles placed from the city map
#[derive(Component)]
pub struct LayoutTile;

/// Shared meshes and materials
#[derive(Resource)]
pub struct Palette {
    pub car_body: Handle<Mesh>,
    pub car_material: Handle<StandardMaterial>,
    pub wheel: Handle<Mesh>,
    pub wheel_material: Handle<StandardMaterial>,
    pub floor: Handle<Mesh>,
    pub floor_material: Handle<StandardMaterial>,
    pub road: Handle<Mesh>,
    pub road_material: Handle<StandardMaterial>,
    /// One mesh, height and material per building variant
    pub buildings: Vec<BuildingModel>,
    pub destination_material: Handle<StandardMaterial>,
    pub pole: Handle<Mesh>,
    pub pole_material: Handle<StandardMaterial>,
    pub lamp: Handle<Mesh>,
    pub lamp_red: Handle<StandardMaterial>,
    pub lamp_green: Handle<StandardMaterial>,
    pub lamp_off: Handle<StandardMaterial>,
}

/// A building variant
#[derive(Clone)]
pub struct BuildingModel {
    pub mesh: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
    pub height: f32,
}
