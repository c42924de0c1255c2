//! Static scenery built from the server's obstacle, destination and road
//! snapshots. Placed once at start-up and never changed afterwards.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::types::{AgentRecord, Position, SnapshotKind};

/// What a scenery placement draws
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneryPiece {
    /// A building, `variant` indexes the available building models
    Building { variant: usize, destination: bool },
    /// A floor tile
    Floor,
}

/// One piece of scenery to instantiate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenePlacement {
    pub piece: SceneryPiece,
    pub position: Position,
}

/// Turns server scenery records into placements
pub struct SceneryBuilder {
    building_variants: usize,
    floor_offset: f32,
    rng: StdRng,
}

impl SceneryBuilder {
    pub fn new(building_variants: usize, floor_offset: f32, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            building_variants: building_variants.max(1),
            floor_offset,
            rng,
        }
    }

    fn building(&mut self, position: Position, destination: bool) -> ScenePlacement {
        let variant = self.rng.random_range(0..self.building_variants);
        ScenePlacement {
            piece: SceneryPiece::Building {
                variant,
                destination,
            },
            position,
        }
    }

    fn floor(&self, position: Position) -> ScenePlacement {
        ScenePlacement {
            piece: SceneryPiece::Floor,
            position: position.lowered(self.floor_offset),
        }
    }

    /// Placements for one scenery snapshot.
    ///
    /// Obstacles and destinations get a building plus a floor tile, roads only
    /// a floor tile. Other kinds are not scenery and yield nothing.
    pub fn placements(&mut self, kind: SnapshotKind, records: &[AgentRecord]) -> Vec<ScenePlacement> {
        let mut placements = Vec::new();
        for record in records {
            let position = record.position();
            match kind {
                SnapshotKind::Obstacles => {
                    placements.push(self.building(position, false));
                    placements.push(self.floor(position));
                }
                SnapshotKind::Destinations => {
                    placements.push(self.building(position, true));
                    placements.push(self.floor(position));
                }
                SnapshotKind::Roads => placements.push(self.floor(position)),
                SnapshotKind::Cars | SnapshotKind::TrafficLights | SnapshotKind::ArrivedCars => {}
            }
        }
        placements
    }
}
