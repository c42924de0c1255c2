//! UI module that renders the client state using Bevy
//!
//! Server state lives in `ClientState`; this module only turns its changes
//! into entities and animates them each frame.

mod components;
mod input;
pub mod spawner;
mod sync;
mod world;

use bevy::prelude::*;

use crate::client::{CarRig, CityLayout, ClientConfig, ClientState};

pub use components::{ClientConfigResource, ClientStateResource, LayoutResource};

use components::*;
use input::{handle_camera_movement, handle_input};
use spawner::spawn_layout;
use sync::{animate_cars, drain_server_events, spin_wheels, start_polling};
use world::{setup_palette, setup_world};

/// Plugin to register all UI systems
pub struct TrafficVizUIPlugin {
    config: ClientConfig,
    layout: Option<CityLayout>,
}

impl TrafficVizUIPlugin {
    pub fn new(config: ClientConfig, layout: Option<CityLayout>) -> Self {
        Self { config, layout }
    }
}

impl Plugin for TrafficVizUIPlugin {
    fn build(&self, app: &mut App) {
        let rig = CarRig::new(self.config.wheel_spin_degrees, self.config.wheel_axis);
        app.insert_resource(ClientConfigResource(self.config.clone()))
            .insert_resource(LayoutResource(self.layout.clone()))
            .insert_resource(ClientStateResource(ClientState::new(&self.config)))
            .insert_resource(RigResource(rig))
            .init_resource::<CameraSettings>()
            .add_systems(
                Startup,
                (
                    setup_world,
                    setup_palette,
                    spawn_layout.after(setup_palette),
                    start_polling,
                ),
            )
            .add_systems(
                Update,
                (
                    (drain_server_events, animate_cars).chain(),
                    spin_wheels,
                    handle_input,
                    handle_camera_movement,
                ),
            );
    }
}
