//! City layout parsing
//!
//! Reads the character map the simulation's city is built from and turns it
//! into tile placements. Row 0 is the bottom line of the map, matching the
//! server's grid where y grows upwards.

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;

use super::types::Position;

/// Height range for plain buildings
pub const BUILDING_HEIGHT_RANGE: std::ops::Range<f32> = 0.5..2.0;

/// What a map character places
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TileKind {
    /// Road segment; `rotated` roads run along Z
    Road { rotated: bool },
    /// Road segment with a traffic light post on it
    TrafficLight { rotated: bool },
    /// Destination building, tinted red
    Destination { variant: usize },
    /// Plain building scaled vertically by `height_scale`
    Building { variant: usize, height_scale: f32 },
}

impl TileKind {
    /// Classify a map character.
    ///
    /// Returns `None` for characters that place nothing. Building variants
    /// are filled in by the parser.
    fn from_char(c: char) -> Option<TileKind> {
        match c {
            '>' | '<' | 'C' => Some(TileKind::Road { rotated: false }),
            'v' | '^' | 'g' | 'h' | 'n' | 'b' => Some(TileKind::Road { rotated: true }),
            'r' | 'u' | 'l' | 'd' => Some(TileKind::TrafficLight { rotated: false }),
            'R' | 'U' | 'L' | 'D' => Some(TileKind::TrafficLight { rotated: true }),
            'T' => Some(TileKind::Destination { variant: 0 }),
            '#' => Some(TileKind::Building {
                variant: 0,
                height_scale: 1.0,
            }),
            _ => None,
        }
    }
}

/// One placed map tile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    pub kind: TileKind,
    pub column: usize,
    pub row: usize,
    pub position: Position,
    /// Source character
    pub symbol: char,
}

/// A parsed city map
#[derive(Debug, Clone, Default)]
pub struct CityLayout {
    pub tiles: Vec<Tile>,
    pub width: usize,
    pub height: usize,
    /// Characters that did not map to a tile
    pub skipped: usize,
}

impl CityLayout {
    /// Read and parse a map file
    pub fn load(
        path: &Path,
        tile_size: f32,
        building_variants: usize,
        seed: Option<u64>,
    ) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read layout file {}", path.display()))?;
        Ok(Self::parse(&text, tile_size, building_variants, seed))
    }

    /// Parse map text.
    ///
    /// Every character except `\r` occupies one column, so unknown characters
    /// place nothing but keep the following tiles aligned with the server grid.
    pub fn parse(
        text: &str,
        tile_size: f32,
        building_variants: usize,
        seed: Option<u64>,
    ) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::parse_with_rng(text, tile_size, &mut rng, building_variants)
    }

    /// Parse map text with an explicit RNG and number of building variants
    pub fn parse_with_rng(
        text: &str,
        tile_size: f32,
        rng: &mut impl Rng,
        building_variants: usize,
    ) -> Self {
        let building_variants = building_variants.max(1);
        let lines: Vec<&str> = text.lines().collect();
        // A trailing blank line is not a row
        let height = lines
            .iter()
            .rposition(|line| !line.trim_end_matches('\r').is_empty())
            .map(|last| last + 1)
            .unwrap_or(0);

        let mut layout = CityLayout {
            height,
            ..Default::default()
        };

        for (line_index, line) in lines.iter().take(height).enumerate() {
            let row = height - line_index - 1;
            let mut column = 0;
            for symbol in line.chars() {
                if symbol == '\r' {
                    continue;
                }
                match TileKind::from_char(symbol) {
                    Some(kind) => {
                        let kind = match kind {
                            TileKind::Destination { .. } => TileKind::Destination {
                                variant: rng.random_range(0..building_variants),
                            },
                            TileKind::Building { .. } => TileKind::Building {
                                variant: rng.random_range(0..building_variants),
                                height_scale: rng.random_range(BUILDING_HEIGHT_RANGE),
                            },
                            other => other,
                        };
                        layout.tiles.push(Tile {
                            kind,
                            column,
                            row,
                            position: Position::new(
                                column as f32 * tile_size,
                                0.0,
                                row as f32 * tile_size,
                            ),
                            symbol,
                        });
                    }
                    None => layout.skipped += 1,
                }
                column += 1;
            }
            layout.width = layout.width.max(column);
        }

        layout
    }

    pub fn tile_at(&self, column: usize, row: usize) -> Option<&Tile> {
        self.tiles
            .iter()
            .find(|tile| tile.column == column && tile.row == row)
    }

    pub fn count(&self, predicate: impl Fn(&TileKind) -> bool) -> usize {
        self.tiles.iter().filter(|tile| predicate(&tile.kind)).count()
    }
}
