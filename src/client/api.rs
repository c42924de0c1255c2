//! HTTP interface to the simulation server
//!
//! `SimulationApi` is the seam between the poller and the network so the
//! poller can be driven by a scripted server in tests.

use log::debug;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::config::ClientConfig;
use super::types::{AgentRecord, AgentsPayload, InitReport, SnapshotKind, StepReport};

/// Errors raised while talking to the simulation server
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Operations the client needs from the simulation server
pub trait SimulationApi: Send + 'static {
    /// Create the simulation model (one-time)
    fn init(&mut self) -> Result<InitReport, ApiError>;

    /// Advance the simulation by one step
    fn step(&mut self) -> Result<StepReport, ApiError>;

    /// Fetch the current records for one category of entity
    fn fetch(&mut self, kind: SnapshotKind) -> Result<Vec<AgentRecord>, ApiError>;

    /// Human readable name of the endpoint used for a snapshot kind
    fn endpoint_name(&self, kind: SnapshotKind) -> String {
        kind.to_string()
    }
}

/// Blocking HTTP implementation backed by `ureq`
pub struct HttpSimulationApi {
    agent: ureq::Agent,
    config: ClientConfig,
}

impl HttpSimulationApi {
    pub fn new(config: ClientConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.request_timeout())
            .build();
        Self { agent, config }
    }

    fn read_body(url: &str, response: Result<ureq::Response, ureq::Error>) -> Result<String, ApiError> {
        let response = response.map_err(|e| match e {
            ureq::Error::Status(status, _) => ApiError::Status {
                url: url.to_string(),
                status,
            },
            ureq::Error::Transport(transport) => ApiError::Transport {
                url: url.to_string(),
                message: transport.to_string(),
            },
        })?;
        response.into_string().map_err(|source| ApiError::Body {
            url: url.to_string(),
            source,
        })
    }

    fn get_text(&self, path: &str) -> Result<(String, String), ApiError> {
        let url = self.config.endpoint_url(path);
        debug!("GET {}", url);
        let body = Self::read_body(&url, self.agent.get(&url).call())?;
        Ok((url, body))
    }

    fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, ApiError> {
        serde_json::from_str(body).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

impl SimulationApi for HttpSimulationApi {
    fn init(&mut self) -> Result<InitReport, ApiError> {
        let url = self.config.endpoint_url(&self.config.endpoints.init);
        debug!("POST {}", url);
        let response = self
            .agent
            .post(&url)
            .set("Content-Type", "application/x-www-form-urlencoded")
            .send_string("");
        let body = Self::read_body(&url, response)?;
        // Only success matters here; an unexpected body is kept as the message
        Ok(serde_json::from_str(&body).unwrap_or(InitReport { message: body }))
    }

    fn step(&mut self) -> Result<StepReport, ApiError> {
        let (_, body) = self.get_text(&self.config.endpoints.update)?;
        Ok(serde_json::from_str(&body).unwrap_or(StepReport {
            message: body,
            current_step: None,
        }))
    }

    fn fetch(&mut self, kind: SnapshotKind) -> Result<Vec<AgentRecord>, ApiError> {
        let (url, body) = self.get_text(self.config.endpoints.snapshot_path(kind))?;
        let payload: AgentsPayload = Self::decode(&url, &body)?;
        Ok(payload.positions)
    }

    fn endpoint_name(&self, kind: SnapshotKind) -> String {
        self.config.endpoints.snapshot_path(kind).to_string()
    }
}
