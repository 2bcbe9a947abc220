//! Configuration
//!
//! Two layers: `AgentProfile` is rolled once per nation from its seeded
//! source and gives each nation its own rhythm and temperament.
//! `EngineTuning` holds the shared constants and can be loaded from TOML.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::rng::PseudoRandom;

/// Per-nation temperament, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Heavy decision logic runs once every `attack_rate` ticks
    pub attack_rate: u64,
    /// Phase offset within the cadence, in `[0, attack_rate)`
    pub attack_tick: u64,
    /// Fraction of max troops before attacking
    pub trigger_ratio: f64,
    /// Fraction of troops kept home as a reserve
    pub reserve_ratio: f64,
    /// Fraction of troops spent expanding into unclaimed land
    pub expand_ratio: f64,
}

impl AgentProfile {
    /// Roll a profile. Draw order is part of the replay contract.
    pub fn roll(rng: &mut PseudoRandom) -> Self {
        let attack_rate = rng.next_int(40, 80) as u64;
        let attack_tick = rng.next_int(0, attack_rate as i64) as u64;
        let trigger_ratio = rng.next_int(60, 90) as f64 / 100.0;
        let reserve_ratio = rng.next_int(30, 60) as f64 / 100.0;
        let expand_ratio = rng.next_int(15, 25) as f64 / 100.0;
        Self {
            attack_rate,
            attack_tick,
            trigger_ratio,
            reserve_ratio,
            expand_ratio,
        }
    }

    /// Rate gate: true only on this nation's cadence slot
    pub fn is_turn(&self, tick: u64) -> bool {
        tick % self.attack_rate.max(1) == self.attack_tick
    }
}

/// Shared engine constants
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineTuning {
    #[serde(default)]
    pub diplomacy: DiplomacyTuning,
    #[serde(default)]
    pub attack: AttackTuning,
    #[serde(default)]
    pub strike: StrikeTuning,
    #[serde(default)]
    pub structures: StructureTuning,
    #[serde(default)]
    pub naval: NavalTuning,
    #[serde(default)]
    pub spawn: SpawnTuning,
}

impl EngineTuning {
    /// Loads tuning from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses tuning from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Serializes the tuning as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Embargo and taunt constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiplomacyTuning {
    /// Relation delta applied while another faction embargoes us
    pub embargo_malus: i32,
    /// Minimum ticks between taunts to the same faction
    pub emoji_cooldown_ticks: u64,
}

impl Default for DiplomacyTuning {
    fn default() -> Self {
        Self {
            embargo_malus: -20,
            emoji_cooldown_ticks: 300,
        }
    }
}

/// "1 in N" odds used by the attack target selector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackTuning {
    /// Raid odds when there is no land border at all
    pub landlocked_raid_chance: u32,
    /// Raid odds that preempt a land decision
    pub raid_chance: u32,
    pub alliance_proposal_chance: u32,
    /// Odds of picking the weakest neighbour rather than a random one
    pub weakest_target_chance: u32,
    pub friendly_attack_chance: u32,
    pub friendly_discouraged_attack_chance: u32,
    pub hostile_discouraged_attack_chance: u32,
}

impl Default for AttackTuning {
    fn default() -> Self {
        Self {
            landlocked_raid_chance: 10,
            raid_chance: 20,
            alliance_proposal_chance: 20,
            weakest_target_chance: 2,
            friendly_attack_chance: 50,
            friendly_discouraged_attack_chance: 200,
            hostile_discouraged_attack_chance: 4,
        }
    }
}

/// Strategic strike planning constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrikeTuning {
    /// Strikes older than this no longer block nearby targets
    pub memory_window_ticks: u64,
    pub random_candidates: usize,
    pub territory_sample_attempts: usize,
    /// Manhattan radius that must lie entirely inside the target
    pub depth_radius: u32,
    /// Euclidean radius counted as blast damage
    pub damage_radius: u32,
    /// Euclidean radius inside which enemy SAMs are penalised
    pub sam_radius: u32,
    pub city_value: f64,
    pub defense_post_value: f64,
    pub silo_value: f64,
    pub port_value: f64,
    pub sam_penalty: f64,
    pub silo_distance_weight: f64,
    pub recent_strike_penalty: f64,
}

impl Default for StrikeTuning {
    fn default() -> Self {
        Self {
            memory_window_ticks: 500,
            random_candidates: 10,
            territory_sample_attempts: 100,
            depth_radius: 15,
            damage_radius: 25,
            sam_radius: 50,
            city_value: 25_000.0,
            defense_post_value: 5_000.0,
            silo_value: 50_000.0,
            port_value: 10_000.0,
            sam_penalty: 50_000.0,
            silo_distance_weight: 30.0,
            recent_strike_penalty: 1_000_000.0,
        }
    }
}

/// Structure placement constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureTuning {
    /// Cap on the perceived cost multiplier (defense posts get +1 on top)
    pub max_cost_multiplier: u64,
    /// Candidate tiles evaluated per structure per tick
    pub sample_size: usize,
    /// Fear required before a defense post is commissioned
    pub defense_fear_threshold: f64,
}

impl Default for StructureTuning {
    fn default() -> Self {
        Self {
            max_cost_multiplier: 5,
            sample_size: 50,
            defense_fear_threshold: 50.0,
        }
    }
}

/// Boats and warships
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavalTuning {
    pub warship_chance: u32,
    pub warship_radius: i64,
    pub warship_attempts: usize,
    pub raid_radius: i64,
    pub raid_attempts: usize,
    /// Transports carry `troops / troop_divisor`
    pub troop_divisor: u64,
}

impl Default for NavalTuning {
    fn default() -> Self {
        Self {
            warship_chance: 50,
            warship_radius: 250,
            warship_attempts: 50,
            raid_radius: 150,
            raid_attempts: 500,
            troop_divisor: 5,
        }
    }
}

/// Initial territory search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    pub delta: i64,
    pub attempts: usize,
    /// Odds of rejecting a mountain tile on each attempt
    pub mountain_reject_chance: u32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            delta: 25,
            attempts: 50,
            mountain_reject_chance: 2,
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Generates a default tuning file content.
pub fn default_tuning_toml() -> String {
    r#"# Nation AI tuning

[diplomacy]
embargo_malus = -20
emoji_cooldown_ticks = 300

[attack]
landlocked_raid_chance = 10
raid_chance = 20
alliance_proposal_chance = 20
weakest_target_chance = 2
friendly_attack_chance = 50
friendly_discouraged_attack_chance = 200
hostile_discouraged_attack_chance = 4

[strike]
memory_window_ticks = 500
random_candidates = 10
territory_sample_attempts = 100
depth_radius = 15
damage_radius = 25
sam_radius = 50
city_value = 25000.0
defense_post_value = 5000.0
silo_value = 50000.0
port_value = 10000.0
sam_penalty = 50000.0
silo_distance_weight = 30.0
recent_strike_penalty = 1000000.0

[structures]
max_cost_multiplier = 5
sample_size = 50
defense_fear_threshold = 50.0

[naval]
warship_chance = 50
warship_radius = 250
warship_attempts = 50
raid_radius = 150
raid_attempts = 500
troop_divisor = 5

[spawn]
delta = 25
attempts = 50
mountain_reject_chance = 2
"#
    .to_string()
}
