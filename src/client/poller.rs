//! Timer-driven polling of the simulation server
//!
//! The poller runs on its own thread and owns the `SimulationApi`. It never
//! touches visual state: every response becomes a `ServerEvent` pushed onto
//! a channel that the frame loop drains once per frame.

use crossbeam::channel::{bounded, select, tick, unbounded, Receiver, Sender, TryRecvError};
use log::{debug, info, warn};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::api::{ApiError, SimulationApi};
use super::types::{AgentRecord, SnapshotKind, Step};

/// Scenery fetched once after `/init`, in request order
pub const SCENERY_KINDS: [SnapshotKind; 3] = [
    SnapshotKind::Obstacles,
    SnapshotKind::Destinations,
    SnapshotKind::Roads,
];

/// Messages from the poller to the frame loop
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// `/init` succeeded
    Initialized { message: String },
    /// Static scenery (obstacles, destinations or roads)
    Scenery {
        kind: SnapshotKind,
        records: Vec<AgentRecord>,
    },
    /// Lights fetched after `/init`; placed red whatever their reported state
    InitialTrafficLights { records: Vec<AgentRecord> },
    TrafficLights {
        step: Step,
        records: Vec<AgentRecord>,
    },
    Cars {
        step: Step,
        records: Vec<AgentRecord>,
    },
    Arrived {
        step: Step,
        records: Vec<AgentRecord>,
    },
    /// `/update` succeeded
    Stepped { step: Step, message: String },
    RequestFailed { endpoint: String, error: String },
    /// All requests of one polling tick were issued; `step` is `None` when
    /// `/update` failed
    TickComplete { step: Option<Step> },
}

/// The request sequence run on the poller thread.
///
/// Exposed so the sequence can be driven synchronously.
pub struct PollTask<A: SimulationApi> {
    api: A,
    events: Sender<ServerEvent>,
    /// Disconnects when the task should stop
    shutdown: Option<Receiver<()>>,
    step: Step,
}

impl<A: SimulationApi> PollTask<A> {
    pub fn new(api: A, events: Sender<ServerEvent>) -> Self {
        Self {
            api,
            events,
            shutdown: None,
            step: 0,
        }
    }

    /// Stop between requests once `shutdown` disconnects
    pub fn with_shutdown(mut self, shutdown: Receiver<()>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    fn stop_requested(&self) -> bool {
        match &self.shutdown {
            Some(shutdown) => !matches!(shutdown.try_recv(), Err(TryRecvError::Empty)),
            None => false,
        }
    }

    /// Last step number reported by the server
    pub fn step(&self) -> Step {
        self.step
    }

    /// Returns false once the receiving side is gone.
    ///
    /// The sequences below share this meaning: false stops the task.
    fn send(&self, event: ServerEvent) -> bool {
        self.events.send(event).is_ok()
    }

    fn report_failure(&self, endpoint: String, error: ApiError) -> bool {
        warn!("Request to {} failed: {}", endpoint, error);
        self.send(ServerEvent::RequestFailed {
            endpoint,
            error: error.to_string(),
        })
    }

    /// Fetch one snapshot and wrap it with `wrap`; failures are reported and
    /// otherwise ignored. Returns false without a request once shutdown was
    /// requested.
    fn fetch_into(
        &mut self,
        kind: SnapshotKind,
        wrap: impl FnOnce(Vec<AgentRecord>) -> ServerEvent,
    ) -> bool {
        if self.stop_requested() {
            return false;
        }
        match self.api.fetch(kind) {
            Ok(records) => {
                debug!("Fetched {} {}", records.len(), kind);
                self.send(wrap(records))
            }
            Err(e) => {
                let endpoint = self.api.endpoint_name(kind);
                self.report_failure(endpoint, e)
            }
        }
    }

    /// Send `/init`, then load lights, cars and scenery.
    ///
    /// If `/init` fails nothing else is requested; polling still starts.
    pub fn initialize(&mut self) -> bool {
        let message = match self.api.init() {
            Ok(report) => report.message,
            Err(e) => return self.report_failure("init".to_string(), e),
        };
        info!("Simulation initialized: {}", message);
        if !self.send(ServerEvent::Initialized { message }) {
            return false;
        }

        let step = self.step;
        if !self.fetch_into(SnapshotKind::TrafficLights, |records| {
            ServerEvent::InitialTrafficLights { records }
        }) {
            return false;
        }
        if !self.fetch_into(SnapshotKind::Cars, |records| ServerEvent::Cars {
            step,
            records,
        }) {
            return false;
        }
        for kind in SCENERY_KINDS {
            if !self.fetch_into(kind, |records| ServerEvent::Scenery { kind, records }) {
                return false;
            }
        }
        true
    }

    /// One polling tick: `/update`, then cars, arrivals and lights
    pub fn poll_tick(&mut self) -> bool {
        let report = match self.api.step() {
            Ok(report) => report,
            Err(e) => {
                return self.report_failure("update".to_string(), e)
                    && self.send(ServerEvent::TickComplete { step: None });
            }
        };

        self.step = report.current_step.unwrap_or(self.step + 1);
        let step = self.step;
        debug!("Server stepped to {}: {}", step, report.message);
        if !self.send(ServerEvent::Stepped {
            step,
            message: report.message,
        }) {
            return false;
        }

        self.fetch_into(SnapshotKind::Cars, |records| ServerEvent::Cars {
            step,
            records,
        }) && self.fetch_into(SnapshotKind::ArrivedCars, |records| {
            ServerEvent::Arrived { step, records }
        }) && self.fetch_into(SnapshotKind::TrafficLights, |records| {
            ServerEvent::TrafficLights { step, records }
        }) && self.send(ServerEvent::TickComplete { step: Some(step) })
    }

    /// Initialize, then tick every `interval` until `shutdown` disconnects
    pub fn run(mut self, interval: Duration, shutdown: Receiver<()>) {
        self.shutdown = Some(shutdown.clone());
        if !self.initialize() {
            return;
        }
        let ticker = tick(interval);
        loop {
            select! {
                recv(shutdown) -> _ => break,
                recv(ticker) -> _ => {
                    if !self.poll_tick() {
                        break;
                    }
                }
            }
        }
        debug!("Poller stopped at step {}", self.step);
    }
}

/// Handle to the background polling thread
pub struct Poller {
    shutdown: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Start polling `api` every `interval` on a new thread
    pub fn spawn<A: SimulationApi>(
        api: A,
        interval: Duration,
    ) -> std::io::Result<(Self, Receiver<ServerEvent>)> {
        let (events_tx, events_rx) = unbounded();
        let (shutdown_tx, shutdown_rx) = bounded::<()>(0);

        let handle = thread::Builder::new()
            .name("sim-poller".to_string())
            .spawn(move || PollTask::new(api, events_tx).run(interval, shutdown_rx))?;

        Ok((
            Self {
                shutdown: Some(shutdown_tx),
                handle: Some(handle),
            },
            events_rx,
        ))
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Stop the thread and wait for it to exit
    pub fn shutdown(&mut self) {
        // Disconnecting the channel wakes the select loop
        self.shutdown.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Poller thread panicked");
            }
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.shutdown();
    }
}
