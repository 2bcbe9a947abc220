//! Scenario Files
//!
//! A scenario is a fixed map plus the factions that start on it, loaded from
//! TOML:
//!
//! ```toml
//! spawn_phase_ticks = 300
//! difficulty = "medium"
//! map = [
//!     "~~~~~~~~",
//!     "~..hh..~",
//!     "~~~~~~~~",
//! ]
//!
//! [[nations]]
//! identity = "nation_1"
//! name = "Atlantis"
//! spawn = [2, 1]
//! troops = 20000
//! gold = 500000
//!
//! [[humans]]
//! identity = "player_1"
//! name = "Alice"
//! territory = [5, 1, 6, 1]
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use nation_ai::grid::terrain_from_glyph;
use nation_ai::{GameView, GridWorld, Nation};
use nation_commands::{Cell, Difficulty, Gold, PlayerType};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("scenario map is empty")]
    EmptyMap,
    #[error("unknown terrain glyph {glyph:?} at ({x}, {y})")]
    UnknownTerrain { glyph: char, x: usize, y: usize },
    #[error("{0} is placed outside the map")]
    OffMap(String),
    #[error("identity {0} is used more than once")]
    DuplicateIdentity(String),
}

/// A computer-controlled nation
#[derive(Debug, Clone, Deserialize)]
pub struct NationSetup {
    pub identity: String,
    pub name: String,
    /// Preferred spawn cell `[x, y]`
    pub spawn: [i32; 2],
    #[serde(default)]
    pub troops: u64,
    #[serde(default)]
    pub gold: Gold,
}

/// A human faction with pre-claimed territory
#[derive(Debug, Clone, Deserialize)]
pub struct HumanSetup {
    pub identity: String,
    pub name: String,
    /// Inclusive rectangle `[x0, y0, x1, y1]`
    pub territory: [i64; 4],
    #[serde(default)]
    pub troops: u64,
    #[serde(default)]
    pub gold: Gold,
    #[serde(default)]
    pub traitor: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub map: Vec<String>,
    #[serde(default)]
    pub spawn_phase_ticks: u64,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub nations: Vec<NationSetup>,
    #[serde(default)]
    pub humans: Vec<HumanSetup>,
}

impl Scenario {
    pub fn from_file(path: &Path) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse and validate
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = toml::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        if self.map.iter().all(|row| row.is_empty()) {
            return Err(ScenarioError::EmptyMap);
        }
        for (y, row) in self.map.iter().enumerate() {
            for (x, glyph) in row.chars().enumerate() {
                if terrain_from_glyph(glyph).is_none() {
                    return Err(ScenarioError::UnknownTerrain { glyph, x, y });
                }
            }
        }

        let width = self.map.iter().map(|r| r.chars().count()).max().unwrap_or(0) as i64;
        let height = self.map.len() as i64;
        let on_map = |x: i64, y: i64| x >= 0 && y >= 0 && x < width && y < height;

        let mut seen = HashSet::new();
        for nation in &self.nations {
            if !seen.insert(nation.identity.as_str()) {
                return Err(ScenarioError::DuplicateIdentity(nation.identity.clone()));
            }
            if !on_map(nation.spawn[0] as i64, nation.spawn[1] as i64) {
                return Err(ScenarioError::OffMap(nation.identity.clone()));
            }
        }
        for human in &self.humans {
            if !seen.insert(human.identity.as_str()) {
                return Err(ScenarioError::DuplicateIdentity(human.identity.clone()));
            }
            let [x0, y0, x1, y1] = human.territory;
            if !on_map(x0, y0) || !on_map(x1, y1) {
                return Err(ScenarioError::OffMap(human.identity.clone()));
            }
        }
        Ok(())
    }

    /// Map with humans placed; nations join through their spawn commands
    pub fn build_world(&self) -> GridWorld {
        let rows: Vec<&str> = self.map.iter().map(String::as_str).collect();
        let mut world = GridWorld::from_rows(&rows);
        world.set_difficulty(self.difficulty);
        world.set_spawn_phase_length(self.spawn_phase_ticks);

        for human in &self.humans {
            let id = world.add_player(&human.identity, &human.name, PlayerType::Human);
            let [x0, y0, x1, y1] = human.territory;
            world.claim_rect(id, x0, y0, x1, y1);
            world.set_troops(id, human.troops);
            world.set_gold(id, human.gold);
            world.set_traitor(id, human.traitor);
        }
        world
    }

    pub fn nations(&self) -> Vec<Nation> {
        self.nations
            .iter()
            .map(|n| Nation::new(&n.identity, &n.name, Cell::new(n.spawn[0], n.spawn[1])))
            .collect()
    }

    /// Hand a freshly spawned nation its starting army and treasury
    pub fn provision(&self, world: &mut GridWorld, identity: &str) -> bool {
        let Some(setup) = self.nations.iter().find(|n| n.identity == identity) else {
            return false;
        };
        let Some(id) = world.find_player(identity) else {
            return false;
        };
        world.set_troops(id, setup.troops);
        world.set_gold(id, setup.gold);
        true
    }
}
