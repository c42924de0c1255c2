//! Snapshot diffing and interpolation for moving agents
//!
//! Each tracked id owns its previous position, current position, last
//! heading and visual proxy in a single entry, so an id can never be missing
//! from one of them.

use log::debug;
use std::collections::{BTreeMap, HashSet};

use super::types::{AgentId, AgentRecord, Position};

/// One agent known to the client
#[derive(Debug, Clone)]
pub struct TrackedAgent<P> {
    pub previous: Position,
    pub current: Position,
    /// Last Y-axis heading derived from a non-zero direction
    pub heading: f32,
    pub proxy: P,
}

/// Interpolated pose of one agent for the current frame
#[derive(Debug)]
pub struct AgentFrame<'a, P> {
    pub id: &'a AgentId,
    pub proxy: &'a P,
    pub position: Position,
    /// Remaining displacement towards the current snapshot
    pub direction: Position,
    pub heading: f32,
}

/// Tracks agents across snapshots, keyed by server id
#[derive(Debug)]
pub struct AgentTracker<P> {
    agents: BTreeMap<AgentId, TrackedAgent<P>>,
}

impl<P> Default for AgentTracker<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> AgentTracker<P> {
    pub fn new() -> Self {
        Self {
            agents: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn contains(&self, id: &AgentId) -> bool {
        self.agents.contains_key(id)
    }

    pub fn get(&self, id: &AgentId) -> Option<&TrackedAgent<P>> {
        self.agents.get(id)
    }

    /// Apply a car snapshot.
    ///
    /// Known ids shift current into previous. New ids start with previous
    /// equal to their first position and get a proxy from `spawn`.
    /// Returns the ids that were spawned.
    pub fn apply_snapshot(
        &mut self,
        records: &[AgentRecord],
        mut spawn: impl FnMut(&AgentId, Position) -> P,
    ) -> Vec<AgentId> {
        let mut spawned = Vec::new();
        for record in records {
            let position = record.position();
            match self.agents.get_mut(&record.id) {
                Some(agent) => {
                    agent.previous = agent.current;
                    agent.current = position;
                }
                None => {
                    let proxy = spawn(&record.id, position);
                    self.agents.insert(
                        record.id.clone(),
                        TrackedAgent {
                            previous: position,
                            current: position,
                            heading: 0.0,
                            proxy,
                        },
                    );
                    spawned.push(record.id.clone());
                }
            }
        }
        spawned
    }

    /// Remove every id reported as arrived and hand back its proxy.
    ///
    /// Unknown ids are skipped and duplicates are removed once.
    pub fn remove_arrived(&mut self, records: &[AgentRecord]) -> Vec<(AgentId, P)> {
        let mut seen = HashSet::new();
        let mut removed = Vec::new();
        for record in records {
            if !seen.insert(&record.id) {
                continue;
            }
            match self.agents.remove(&record.id) {
                Some(agent) => removed.push((record.id.clone(), agent.proxy)),
                None => debug!("Arrived car {} is not tracked", record.id),
            }
        }
        removed
    }

    /// Interpolated poses for `fraction` of the way from previous to current.
    ///
    /// The fraction is clamped to [0, 1]. Headings are kept when an agent has
    /// no remaining displacement.
    pub fn interpolate(&mut self, fraction: f32) -> Vec<AgentFrame<'_, P>> {
        let fraction = fraction.clamp(0.0, 1.0);
        self.agents
            .iter_mut()
            .map(|(id, agent)| {
                let position = agent.previous.lerp(&agent.current, fraction);
                let direction = agent.current.sub(&position);
                if !direction.is_near_zero() {
                    agent.heading = position.angle_to(&agent.current);
                } else if !agent.current.sub(&agent.previous).is_near_zero() {
                    agent.heading = agent.previous.angle_to(&agent.current);
                }
                AgentFrame {
                    id,
                    proxy: &agent.proxy,
                    position,
                    direction,
                    heading: agent.heading,
                }
            })
            .collect()
    }
}
