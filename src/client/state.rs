//! Client-side view of the simulation
//!
//! `ClientState` is owned by the frame loop, which is its only writer. Server
//! responses reach it as `ServerEvent`s drained once per frame; the renderer
//! is reached through the `SceneSink` trait.

use crossbeam::channel::Receiver;
use log::{debug, info, warn};

use super::config::ClientConfig;
use super::lights::TrafficLightBoard;
use super::poller::ServerEvent;
use super::scenery::{ScenePlacement, SceneryBuilder};
use super::tracker::{AgentFrame, AgentTracker};
use super::types::{AgentId, AgentRecord, LightState, Position, Step};
use crate::stats::ClientStats;

/// Renderer operations driven by server state
pub trait SceneSink {
    /// Visual proxy of a car
    type Car;
    /// Visual proxy of a traffic light
    type Light;

    fn spawn_car(&mut self, id: &AgentId, position: Position) -> Self::Car;
    fn despawn_car(&mut self, id: &AgentId, car: Self::Car);
    fn spawn_light(&mut self, id: &AgentId, position: Position) -> Self::Light;
    fn set_light(&mut self, light: &Self::Light, state: LightState);
    fn place_scenery(&mut self, placement: &ScenePlacement);
}

/// Everything the frame loop knows about the simulation
pub struct ClientState<C, L> {
    cars: AgentTracker<C>,
    lights: TrafficLightBoard<L>,
    scenery: SceneryBuilder,
    /// Seconds between snapshots
    interval: f32,
    /// Seconds since the last car snapshot
    elapsed: f32,
    last_step: Step,
    initialized: bool,
    started: bool,
    stats: ClientStats,
}

impl<C, L> ClientState<C, L> {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            cars: AgentTracker::new(),
            lights: TrafficLightBoard::new(),
            scenery: SceneryBuilder::new(
                config.building_variants,
                config.floor_offset,
                config.seed,
            ),
            interval: config.time_to_update.max(f32::EPSILON),
            elapsed: 0.0,
            last_step: 0,
            initialized: false,
            started: false,
            stats: ClientStats::default(),
        }
    }

    pub fn cars(&self) -> &AgentTracker<C> {
        &self.cars
    }

    pub fn lights(&self) -> &TrafficLightBoard<L> {
        &self.lights
    }

    pub fn stats(&self) -> &ClientStats {
        &self.stats
    }

    pub fn last_step(&self) -> Step {
        self.last_step
    }

    /// Whether `/init` succeeded
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Whether any car snapshot has been applied
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Snapshots older than the last applied one are ignored
    fn accept_step(&mut self, step: Step, what: &str) -> bool {
        if step < self.last_step {
            debug!(
                "Dropping stale {} snapshot for step {} (at step {})",
                what, step, self.last_step
            );
            self.stats.stale_snapshots += 1;
            return false;
        }
        self.last_step = step;
        true
    }

    /// Apply one event from the poller
    pub fn apply<S>(&mut self, event: ServerEvent, sink: &mut S)
    where
        S: SceneSink<Car = C, Light = L>,
    {
        match event {
            ServerEvent::Initialized { message } => {
                debug!("Server initialized: {}", message);
                self.initialized = true;
            }
            ServerEvent::Scenery { kind, records } => {
                let placements = self.scenery.placements(kind, &records);
                for placement in &placements {
                    sink.place_scenery(placement);
                }
                info!("Placed {} scenery pieces for {} {}", placements.len(), records.len(), kind);
                self.stats.scenery_pieces += placements.len() as u32;
            }
            ServerEvent::InitialTrafficLights { records } => {
                let added = self
                    .lights
                    .place(&records, |id, position| sink.spawn_light(id, position));
                debug!("Placed {} traffic lights", added.len());
            }
            ServerEvent::TrafficLights { step, records } => {
                if self.accept_step(step, "traffic light") {
                    self.apply_lights(&records, sink);
                }
            }
            ServerEvent::Cars { step, records } => {
                if self.accept_step(step, "car") {
                    self.apply_cars(&records, sink);
                }
            }
            ServerEvent::Arrived { step, records } => {
                if self.accept_step(step, "arrival") {
                    self.apply_arrivals(&records, sink);
                }
            }
            ServerEvent::Stepped { step, message } => {
                debug!("Step {}: {}", step, message);
            }
            ServerEvent::RequestFailed { endpoint, error } => {
                warn!("Request to {} failed: {}", endpoint, error);
                self.stats.failed_requests += 1;
            }
            ServerEvent::TickComplete { .. } => {
                self.stats.ticks_polled += 1;
            }
        }
        self.stats.active_cars = self.cars.len() as u32;
        self.stats.traffic_lights = self.lights.len() as u32;
    }

    fn apply_cars<S>(&mut self, records: &[AgentRecord], sink: &mut S)
    where
        S: SceneSink<Car = C, Light = L>,
    {
        let spawned = self
            .cars
            .apply_snapshot(records, |id, position| sink.spawn_car(id, position));
        if !spawned.is_empty() {
            debug!("Spawned {} cars", spawned.len());
        }
        self.stats.total_cars_spawned += spawned.len() as u32;
        self.elapsed = 0.0;
        self.started = true;
    }

    fn apply_arrivals<S>(&mut self, records: &[AgentRecord], sink: &mut S)
    where
        S: SceneSink<Car = C, Light = L>,
    {
        for (id, car) in self.cars.remove_arrived(records) {
            debug!("Car {} arrived", id);
            sink.despawn_car(&id, car);
            self.stats.total_cars_arrived += 1;
        }
    }

    fn apply_lights<S>(&mut self, records: &[AgentRecord], sink: &mut S)
    where
        S: SceneSink<Car = C, Light = L>,
    {
        let changes = self
            .lights
            .apply_snapshot(records, |id, position| sink.spawn_light(id, position));
        for (id, state) in &changes.switched {
            if let Some(light) = self.lights.get(id) {
                sink.set_light(&light.proxy, *state);
            }
        }
        if !changes.added.is_empty() {
            debug!("Added {} traffic lights", changes.added.len());
        }
    }

    /// Apply every queued event; returns how many were applied
    pub fn drain<S>(&mut self, events: &Receiver<ServerEvent>, sink: &mut S) -> usize
    where
        S: SceneSink<Car = C, Light = L>,
    {
        let mut applied = 0;
        for event in events.try_iter() {
            self.apply(event, sink);
            applied += 1;
        }
        applied
    }

    /// Advance the interpolation timer by `dt` seconds and return the fraction
    pub fn advance(&mut self, dt: f32) -> f32 {
        if self.started {
            self.elapsed += dt;
        }
        self.fraction()
    }

    /// Elapsed time since the last car snapshot over the polling interval,
    /// clamped to [0, 1]; 0 until the first car snapshot
    pub fn fraction(&self) -> f32 {
        if !self.started {
            return 0.0;
        }
        (self.elapsed / self.interval).clamp(0.0, 1.0)
    }

    /// Interpolated car poses at the current fraction
    pub fn car_frames(&mut self) -> Vec<AgentFrame<'_, C>> {
        let fraction = self.fraction();
        self.cars.interpolate(fraction)
    }
}
