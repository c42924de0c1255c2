//! Systems for syncing Bevy entities with server state

use bevy::prelude::*;

use super::components::{
    CarLink, ClientConfigResource, ClientStateResource, Palette, PollerResource, RigResource,
    ServerEvents, Wheel,
};
use super::spawner::{transform_from_rig, wheel_transform, BevySceneSink};
use crate::client::{HttpSimulationApi, Poller};

/// System to start the background poller
pub fn start_polling(mut commands: Commands, config: Res<ClientConfigResource>) {
    let api = HttpSimulationApi::new(config.0.clone());
    match Poller::spawn(api, config.0.update_interval()) {
        Ok((poller, events)) => {
            info!("Polling {} every {}s", config.0.server_url, config.0.time_to_update);
            commands.insert_resource(PollerResource(poller));
            commands.insert_resource(ServerEvents(events));
        }
        Err(err) => error!("Failed to start poller thread: {}", err),
    }
}

/// System to apply queued server events to the client state and scene
pub fn drain_server_events(
    mut commands: Commands,
    palette: Res<Palette>,
    rig: Res<RigResource>,
    mut state: ResMut<ClientStateResource>,
    events: Option<Res<ServerEvents>>,
) {
    let Some(events) = events else {
        return;
    };
    let mut sink = BevySceneSink {
        commands: &mut commands,
        palette: &palette,
        rig: &rig.0,
    };
    state.0.drain(&events.0, &mut sink);
}

/// System to move car bodies between their last two snapshots
pub fn animate_cars(
    time: Res<Time>,
    rig: Res<RigResource>,
    mut state: ResMut<ClientStateResource>,
    mut cars: Query<&mut Transform, With<CarLink>>,
) {
    let state = &mut state.0;
    state.advance(time.delta_secs());
    for frame in state.car_frames() {
        // Entity may not exist yet if it was spawned this frame
        if let Ok(mut transform) = cars.get_mut(*frame.proxy) {
            *transform = transform_from_rig(&rig.0.body_matrix(&frame.position, frame.heading));
        }
    }
}

/// System to spin car wheels about their axle
pub fn spin_wheels(
    time: Res<Time>,
    rig: Res<RigResource>,
    mut wheels: Query<(&Wheel, &mut Transform)>,
) {
    let t = time.elapsed_secs();
    for (wheel, mut transform) in wheels.iter_mut() {
        *transform = wheel_transform(&rig.0, wheel.0, t);
    }
}
