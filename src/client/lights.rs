//! Traffic light tracking

use std::collections::BTreeMap;

use super::types::{AgentId, AgentRecord, LightState, Position};

/// A traffic light and its visual proxy
#[derive(Debug, Clone)]
pub struct TrafficLight<L> {
    pub position: Position,
    pub state: LightState,
    /// Facing reported by the server ("Left", "Up", ...)
    pub direction: Option<String>,
    pub proxy: L,
}

/// Result of applying a traffic light snapshot
#[derive(Debug, Default, PartialEq)]
pub struct LightChanges {
    /// Lights seen for the first time
    pub added: Vec<AgentId>,
    /// Lights whose state differs from the previous snapshot
    pub switched: Vec<(AgentId, LightState)>,
}

/// All traffic lights in the scene, keyed by server id
#[derive(Debug)]
pub struct TrafficLightBoard<L> {
    lights: BTreeMap<AgentId, TrafficLight<L>>,
}

impl<L> Default for TrafficLightBoard<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L> TrafficLightBoard<L> {
    pub fn new() -> Self {
        Self {
            lights: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn get(&self, id: &AgentId) -> Option<&TrafficLight<L>> {
        self.lights.get(id)
    }

    pub fn count_in_state(&self, state: LightState) -> usize {
        self.lights.values().filter(|l| l.state == state).count()
    }

    /// Register lights from the start-up snapshot, all red.
    ///
    /// Reported states are ignored; lights already on the board are left as
    /// they are. Returns the ids that were added.
    pub fn place(
        &mut self,
        records: &[AgentRecord],
        mut spawn: impl FnMut(&AgentId, Position) -> L,
    ) -> Vec<AgentId> {
        let mut added = Vec::new();
        for record in records {
            if self.lights.contains_key(&record.id) {
                continue;
            }
            self.lights.insert(
                record.id.clone(),
                TrafficLight {
                    position: record.position(),
                    state: LightState::Red,
                    direction: record.direction.clone(),
                    proxy: spawn(&record.id, record.position()),
                },
            );
            added.push(record.id.clone());
        }
        added
    }

    /// Apply a traffic light snapshot.
    ///
    /// New lights start red and are created with `spawn`, then take the
    /// reported state. Lights whose state changed, including new lights
    /// reported green, are listed in `switched`.
    pub fn apply_snapshot(
        &mut self,
        records: &[AgentRecord],
        mut spawn: impl FnMut(&AgentId, Position) -> L,
    ) -> LightChanges {
        let mut changes = LightChanges::default();
        for record in records {
            let state = record.light_state();
            let light = self.lights.entry(record.id.clone()).or_insert_with(|| {
                changes.added.push(record.id.clone());
                TrafficLight {
                    position: record.position(),
                    state: LightState::Red,
                    direction: record.direction.clone(),
                    proxy: spawn(&record.id, record.position()),
                }
            });
            if record.direction.is_some() {
                light.direction = record.direction.clone();
            }
            if light.state != state {
                light.state = state;
                changes.switched.push((record.id.clone(), state));
            }
        }
        changes
    }
}
