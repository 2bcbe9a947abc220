//! Map and Entity Types
//!
//! Identifiers, coordinates and the closed enumerations shared by the engine
//! and the simulation that hosts it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One discrete simulation step
pub type Tick = u64;

/// Gold balance or cost
pub type Gold = u64;

/// Row-major index of a map tile (`y * width + x`)
pub type TileRef = u32;

/// Compact handle for a faction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player_{}", self.0)
    }
}

impl From<u32> for PlayerId {
    fn from(id: u32) -> Self {
        PlayerId(id)
    }
}

/// Map coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Units and structures a faction can own or launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitType {
    City,
    Port,
    Warship,
    Factory,
    MissileSilo,
    DefensePost,
    SamLauncher,
    AtomBomb,
    TransportShip,
}

impl UnitType {
    /// Returns true for units that occupy a tile permanently
    pub fn is_structure(&self) -> bool {
        matches!(
            self,
            UnitType::City
                | UnitType::Port
                | UnitType::Factory
                | UnitType::MissileSilo
                | UnitType::DefensePost
                | UnitType::SamLauncher
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UnitType::City => "city",
            UnitType::Port => "port",
            UnitType::Warship => "warship",
            UnitType::Factory => "factory",
            UnitType::MissileSilo => "missile_silo",
            UnitType::DefensePost => "defense_post",
            UnitType::SamLauncher => "sam_launcher",
            UnitType::AtomBomb => "atom_bomb",
            UnitType::TransportShip => "transport_ship",
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who controls a faction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerType {
    /// A person at a keyboard
    Human,
    /// A computer-controlled nation (what this engine drives)
    Nation,
    /// Non-player tribes that only expand
    Bot,
}

/// Session difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Impossible,
}

/// Terrain classification of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainType {
    Plains,
    Highland,
    Mountain,
    Lake,
    Ocean,
}

impl TerrainType {
    pub fn is_land(&self) -> bool {
        matches!(self, TerrainType::Plains | TerrainType::Highland | TerrainType::Mountain)
    }

    pub fn is_water(&self) -> bool {
        !self.is_land()
    }
}

/// Named relation tiers, ordered from worst to best
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Hostile,
    Distrustful,
    Neutral,
    Friendly,
}

impl Relation {
    /// Lowest representable relation score
    pub const MIN_SCORE: i32 = -100;
    /// Highest representable relation score
    pub const MAX_SCORE: i32 = 100;

    /// Bucket a raw relation score into a tier
    pub fn from_score(score: i32) -> Self {
        if score <= -50 {
            Relation::Hostile
        } else if score < 0 {
            Relation::Distrustful
        } else if score < 50 {
            Relation::Neutral
        } else {
            Relation::Friendly
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_tiers() {
        assert_eq!(Relation::from_score(-100), Relation::Hostile);
        assert_eq!(Relation::from_score(-50), Relation::Hostile);
        assert_eq!(Relation::from_score(-49), Relation::Distrustful);
        assert_eq!(Relation::from_score(0), Relation::Neutral);
        assert_eq!(Relation::from_score(49), Relation::Neutral);
        assert_eq!(Relation::from_score(50), Relation::Friendly);
    }

    #[test]
    fn test_relation_ordering() {
        assert!(Relation::Hostile < Relation::Distrustful);
        assert!(Relation::Distrustful < Relation::Neutral);
        assert!(Relation::Neutral < Relation::Friendly);
    }

    #[test]
    fn test_terrain_classes() {
        assert!(TerrainType::Mountain.is_land());
        assert!(TerrainType::Lake.is_water());
        assert!(!TerrainType::Ocean.is_land());
    }

    #[test]
    fn test_unit_type_serialization() {
        assert_eq!(
            serde_json::to_string(&UnitType::MissileSilo).unwrap(),
            r#""missile_silo""#
        );
        assert_eq!(
            serde_json::to_string(&UnitType::SamLauncher).unwrap(),
            r#""sam_launcher""#
        );
        assert!(UnitType::DefensePost.is_structure());
        assert!(!UnitType::AtomBomb.is_structure());
    }

    #[test]
    fn test_player_id_is_transparent() {
        assert_eq!(serde_json::to_string(&PlayerId(7)).unwrap(), "7");
        assert_eq!(PlayerId(7).to_string(), "player_7");
    }
}
