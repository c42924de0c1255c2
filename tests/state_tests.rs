mod common;

use approx::assert_relative_eq;
use crossbeam::channel::unbounded;

use common::RecordingSink;
use traffic_viz::client::{
    AgentId, AgentRecord, ClientConfig, ClientState, LightState, Position, SceneryPiece,
    ServerEvent, SnapshotKind,
};

fn config() -> ClientConfig {
    ClientConfig {
        time_to_update: 2.0,
        seed: Some(3),
        ..ClientConfig::default()
    }
}

fn car(id: &str, x: f32, z: f32) -> AgentRecord {
    AgentRecord::new(id, x, 0.0, z)
}

fn light(id: &str, green: bool) -> AgentRecord {
    AgentRecord::new(id, 1.0, 0.0, 1.0)
        .with_state(green)
        .with_direction("Up")
}

#[test]
fn test_fraction_is_zero_before_first_cars() {
    let mut state: ClientState<u32, u32> = ClientState::new(&config());

    assert_eq!(state.advance(10.0), 0.0);
    assert!(!state.is_started());
}

#[test]
fn test_car_snapshot_resets_interpolation() {
    let mut state = ClientState::new(&config());
    let mut sink = RecordingSink::default();

    state.apply(
        ServerEvent::Cars {
            step: 0,
            records: vec![car("1", 0.0, 0.0)],
        },
        &mut sink,
    );
    assert_relative_eq!(state.advance(0.5), 0.25);
    assert_relative_eq!(state.advance(5.0), 1.0);

    state.apply(
        ServerEvent::Cars {
            step: 1,
            records: vec![car("1", 2.0, 0.0)],
        },
        &mut sink,
    );
    assert_eq!(state.fraction(), 0.0);
    assert_relative_eq!(state.advance(1.0), 0.5);

    let frames = state.car_frames();
    assert_eq!(frames.len(), 1);
    assert_relative_eq!(frames[0].position.x, 1.0);
    assert_eq!(sink.spawned_cars.len(), 1);
}

#[test]
fn test_stale_snapshots_are_dropped() {
    let mut state = ClientState::new(&config());
    let mut sink = RecordingSink::default();

    state.apply(
        ServerEvent::Cars {
            step: 2,
            records: vec![car("1", 5.0, 5.0)],
        },
        &mut sink,
    );
    state.apply(
        ServerEvent::Cars {
            step: 1,
            records: vec![car("1", 0.0, 0.0), car("late", 1.0, 1.0)],
        },
        &mut sink,
    );

    assert_eq!(state.last_step(), 2);
    assert_eq!(state.stats().stale_snapshots, 1);
    assert_eq!(state.cars().len(), 1);
    let tracked = state.cars().get(&AgentId::from("1")).unwrap();
    assert_eq!(tracked.current, Position::new(5.0, 0.0, 5.0));
}

#[test]
fn test_arrivals_despawn_once() {
    let mut state = ClientState::new(&config());
    let mut sink = RecordingSink::default();

    state.apply(
        ServerEvent::Cars {
            step: 1,
            records: vec![car("1", 0.0, 0.0), car("2", 3.0, 3.0)],
        },
        &mut sink,
    );
    let arrived = vec![car("2", 3.0, 3.0), car("2", 3.0, 3.0), car("ghost", 0.0, 0.0)];
    state.apply(
        ServerEvent::Arrived {
            step: 1,
            records: arrived.clone(),
        },
        &mut sink,
    );
    state.apply(
        ServerEvent::Arrived {
            step: 2,
            records: arrived,
        },
        &mut sink,
    );

    assert_eq!(sink.despawned_cars, vec![(AgentId::from("2"), 2)]);
    assert_eq!(state.stats().total_cars_spawned, 2);
    assert_eq!(state.stats().total_cars_arrived, 1);
    assert_eq!(state.stats().active_cars, 1);
    assert_relative_eq!(state.stats().arrival_rate(), 50.0);
}

#[test]
fn test_lights_only_recoloured_on_change() {
    let mut state = ClientState::new(&config());
    let mut sink = RecordingSink::default();

    state.apply(
        ServerEvent::TrafficLights {
            step: 1,
            records: vec![light("red", false), light("green", true)],
        },
        &mut sink,
    );
    assert_eq!(sink.spawned_lights.len(), 2);
    // Lights first seen in an update start red, so only the green one is
    // recoloured
    assert_eq!(sink.light_updates, vec![(2, LightState::Green)]);

    state.apply(
        ServerEvent::TrafficLights {
            step: 2,
            records: vec![light("red", true), light("green", true)],
        },
        &mut sink,
    );
    assert_eq!(
        sink.light_updates,
        vec![(2, LightState::Green), (1, LightState::Green)]
    );

    let board = state.lights();
    assert_eq!(board.count_in_state(LightState::Green), 2);
    assert_eq!(
        board.get(&AgentId::from("red")).unwrap().direction.as_deref(),
        Some("Up")
    );
    assert_eq!(state.stats().traffic_lights, 2);
}

#[test]
fn test_initial_lights_placed_red() {
    let mut state = ClientState::new(&config());
    let mut sink = RecordingSink::default();

    state.apply(
        ServerEvent::InitialTrafficLights {
            records: vec![light("a", true), light("b", false)],
        },
        &mut sink,
    );

    assert_eq!(sink.spawned_lights.len(), 2);
    assert!(sink.light_updates.is_empty());
    assert_eq!(state.lights().count_in_state(LightState::Red), 2);
    assert_eq!(state.stats().traffic_lights, 2);

    // The first update applies the reported state
    state.apply(
        ServerEvent::TrafficLights {
            step: 1,
            records: vec![light("a", true), light("b", false)],
        },
        &mut sink,
    );
    assert_eq!(sink.light_updates, vec![(1, LightState::Green)]);
    assert_eq!(sink.spawned_lights.len(), 2);
}

#[test]
fn test_scenery_placements() {
    let mut state: ClientState<u32, u32> = ClientState::new(&config());
    let mut sink = RecordingSink::default();

    state.apply(
        ServerEvent::Scenery {
            kind: SnapshotKind::Obstacles,
            records: vec![car("", 1.0, 1.0), car("", 2.0, 1.0)],
        },
        &mut sink,
    );
    state.apply(
        ServerEvent::Scenery {
            kind: SnapshotKind::Destinations,
            records: vec![car("", 4.0, 4.0)],
        },
        &mut sink,
    );
    state.apply(
        ServerEvent::Scenery {
            kind: SnapshotKind::Roads,
            records: vec![car("", 0.0, 0.0), car("", 0.0, 1.0)],
        },
        &mut sink,
    );

    assert_eq!(sink.scenery.len(), 8);
    assert_eq!(state.stats().scenery_pieces, 8);

    let buildings: Vec<_> = sink
        .scenery
        .iter()
        .filter_map(|p| match p.piece {
            SceneryPiece::Building {
                variant,
                destination,
            } => Some((variant, destination)),
            SceneryPiece::Floor => None,
        })
        .collect();
    assert_eq!(buildings.len(), 3);
    assert!(buildings.iter().all(|(variant, _)| *variant < 4));
    assert_eq!(buildings.iter().filter(|(_, dest)| *dest).count(), 1);

    let floor = sink
        .scenery
        .iter()
        .find(|p| p.piece == SceneryPiece::Floor)
        .unwrap();
    assert_relative_eq!(floor.position.y, -0.04);
}

#[test]
fn test_failures_and_ticks_are_counted() {
    let mut state: ClientState<u32, u32> = ClientState::new(&config());
    let mut sink = RecordingSink::default();

    state.apply(
        ServerEvent::Initialized {
            message: "ok".to_string(),
        },
        &mut sink,
    );
    state.apply(
        ServerEvent::RequestFailed {
            endpoint: "update".to_string(),
            error: "HTTP 500".to_string(),
        },
        &mut sink,
    );
    state.apply(ServerEvent::TickComplete { step: None }, &mut sink);
    state.apply(ServerEvent::TickComplete { step: Some(1) }, &mut sink);

    assert!(state.is_initialized());
    assert_eq!(state.stats().failed_requests, 1);
    assert_eq!(state.stats().ticks_polled, 2);
}

#[test]
fn test_drain_applies_queued_events_in_order() {
    let mut state = ClientState::new(&config());
    let mut sink = RecordingSink::default();
    let (tx, rx) = unbounded();

    tx.send(ServerEvent::Cars {
        step: 1,
        records: vec![car("1", 0.0, 0.0)],
    })
    .unwrap();
    tx.send(ServerEvent::Cars {
        step: 2,
        records: vec![car("1", 1.0, 0.0)],
    })
    .unwrap();
    tx.send(ServerEvent::TickComplete { step: Some(2) }).unwrap();

    assert_eq!(state.drain(&rx, &mut sink), 3);
    assert_eq!(state.drain(&rx, &mut sink), 0);

    let tracked = state.cars().get(&AgentId::from("1")).unwrap();
    assert_eq!(tracked.previous, Position::new(0.0, 0.0, 0.0));
    assert_eq!(tracked.current, Position::new(1.0, 0.0, 0.0));
    assert_eq!(state.stats().ticks_polled, 1);
}
