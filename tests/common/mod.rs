//! Shared helpers for integration tests: a scripted simulation server and a
//! scene sink that records every call.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tiny_http::{Header, Response, Server};
use traffic_viz::client::{AgentId, ClientConfig, LightState, Position, SceneSink, ScenePlacement};

/// Local HTTP server that scripts a tiny city.
///
/// Car "1" moves one unit along +x per step. Car "2" moves along +z and is
/// reported as arrived from step 2 onwards. Light "L1" is green on even steps,
/// including the start-up snapshot.
pub struct MockServer {
    url: String,
    requests: Arc<Mutex<Vec<String>>>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl MockServer {
    /// Start the server; `None` if no local port can be bound
    pub fn start() -> Option<Self> {
        Self::start_with_failures(&[])
    }

    /// Start the server with `failing` paths answering HTTP 500
    pub fn start_with_failures(failing: &[&str]) -> Option<Self> {
        let server = Server::http("127.0.0.1:0").ok()?;
        let port = server.server_addr().to_ip()?.port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let stop = Arc::new(AtomicBool::new(false));
        let failing: Vec<String> = failing.iter().map(|p| p.to_string()).collect();

        let handle = thread::spawn({
            let requests = requests.clone();
            let stop = stop.clone();
            move || {
                let step = AtomicU64::new(0);
                while !stop.load(Ordering::SeqCst) {
                    let request = match server.recv_timeout(Duration::from_millis(20)) {
                        Ok(Some(request)) => request,
                        Ok(None) => continue,
                        Err(_) => break,
                    };
                    let path = request.url().to_string();
                    requests
                        .lock()
                        .unwrap()
                        .push(format!("{} {}", request.method(), path));

                    let response = if failing.contains(&path) {
                        Response::from_string("boom").with_status_code(500)
                    } else {
                        match route(&path, &step) {
                            Some(body) => Response::from_string(body).with_header(
                                Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                                    .unwrap(),
                            ),
                            None => Response::from_string("not found").with_status_code(404),
                        }
                    };
                    let _ = request.respond(response);
                }
            }
        });

        Some(Self {
            url: format!("http://127.0.0.1:{port}"),
            requests,
            stop,
            handle: Some(handle),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Requests seen so far as "METHOD /path"
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Client configuration pointed at this server
    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            server_url: self.url.clone(),
            time_to_update: 0.05,
            request_timeout_secs: 2,
            seed: Some(42),
            ..ClientConfig::default()
        }
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn route(path: &str, step: &AtomicU64) -> Option<String> {
    let body = match path {
        "/init" => r#"{"message": "Model initialized"}"#.to_string(),
        "/update" => {
            let current = step.fetch_add(1, Ordering::SeqCst) + 1;
            format!(r#"{{"message": "Step advanced", "currentStep": {current}}}"#)
        }
        "/getCars" => {
            let current = step.load(Ordering::SeqCst);
            let mut cars = vec![format!(r#"{{"id": "1", "x": {current}, "y": 0, "z": 0}}"#)];
            if current < 2 {
                cars.push(format!(r#"{{"id": "2", "x": 5, "y": 0, "z": {current}}}"#));
            }
            format!(r#"{{"positions": [{}]}}"#, cars.join(", "))
        }
        "/getArrivedCars" => {
            if step.load(Ordering::SeqCst) >= 2 {
                r#"{"positions": [{"id": "2", "x": 5, "y": 0, "z": 2}]}"#.to_string()
            } else {
                r#"{"positions": []}"#.to_string()
            }
        }
        "/getTrafficLights" => {
            let green = step.load(Ordering::SeqCst) % 2 == 0;
            format!(
                r#"{{"positions": [{{"id": "L1", "x": 3, "y": 0, "z": 3, "state": {green}, "direction": "Left"}}]}}"#
            )
        }
        "/getObstacles" => {
            r#"{"positions": [{"x": 0, "y": 0, "z": 4}, {"x": 1, "y": 0, "z": 4}]}"#.to_string()
        }
        "/getDestinations" => r#"{"positions": [{"x": 6, "y": 0, "z": 6}]}"#.to_string(),
        "/getRoads" => {
            r#"{"positions": [{"x": 0, "y": 0, "z": 0}, {"x": 1, "y": 0, "z": 0}, {"x": 2, "y": 0, "z": 0}]}"#
                .to_string()
        }
        "/garbage" => "this is not json".to_string(),
        _ => return None,
    };
    Some(body)
}

/// A scene sink that hands out numbered proxies and records every call
#[derive(Debug, Default)]
pub struct RecordingSink {
    next_proxy: u32,
    pub spawned_cars: Vec<(AgentId, Position)>,
    pub despawned_cars: Vec<(AgentId, u32)>,
    pub spawned_lights: Vec<(AgentId, Position)>,
    pub light_updates: Vec<(u32, LightState)>,
    pub scenery: Vec<ScenePlacement>,
}

impl RecordingSink {
    fn next(&mut self) -> u32 {
        self.next_proxy += 1;
        self.next_proxy
    }
}

impl SceneSink for RecordingSink {
    type Car = u32;
    type Light = u32;

    fn spawn_car(&mut self, id: &AgentId, position: Position) -> u32 {
        self.spawned_cars.push((id.clone(), position));
        self.next()
    }

    fn despawn_car(&mut self, id: &AgentId, car: u32) {
        self.despawned_cars.push((id.clone(), car));
    }

    fn spawn_light(&mut self, id: &AgentId, position: Position) -> u32 {
        self.spawned_lights.push((id.clone(), position));
        self.next()
    }

    fn set_light(&mut self, light: &u32, state: LightState) {
        self.light_updates.push((*light, state));
    }

    fn place_scenery(&mut self, placement: &ScenePlacement) {
        self.scenery.push(*placement);
    }
}
