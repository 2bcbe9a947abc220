//! Command Types
//!
//! Everything a nation can ask the execution scheduler to do. Commands are
//! one-way: the engine pushes them and never observes their result directly.

use serde::{Deserialize, Serialize};

use crate::types::{PlayerId, Tick, TileRef, UnitType};

/// Whether an embargo is being imposed or lifted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbargoAction {
    Start,
    Stop,
}

/// A single effect requested by a nation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Claim initial territory around a tile
    Spawn { tile: TileRef },
    /// Send troops across the land border. `target: None` means unclaimed land.
    Attack {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<PlayerId>,
        troops: u64,
    },
    /// Begin constructing a unit or structure
    Construct { unit: UnitType, tile: TileRef },
    /// Launch a strategic strike
    Nuke { unit: UnitType, tile: TileRef },
    /// Ship troops over water toward a tile
    TransportShip {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<PlayerId>,
        dst: TileRef,
        troops: u64,
    },
    /// Symbolic gesture aimed at another faction
    Emoji { recipient: PlayerId, emoji: usize },
    /// Shift the issuer's relation toward another faction
    UpdateRelation { other: PlayerId, delta: i32 },
    /// Start or stop an embargo
    Embargo {
        target: PlayerId,
        action: EmbargoAction,
    },
    /// Ask another faction for an alliance
    AllianceRequest { recipient: PlayerId },
    /// Answer a pending alliance request
    AllianceReply { requestor: PlayerId, accept: bool },
    /// Vote to extend an expiring alliance
    AllianceExtension { ally: PlayerId },
    /// Decay the issuer's accumulated fear by a factor
    AttenuateFear { factor: f64 },
}

impl Command {
    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Command::Spawn { .. } => "spawn",
            Command::Attack { .. } => "attack",
            Command::Construct { .. } => "construct",
            Command::Nuke { .. } => "nuke",
            Command::TransportShip { .. } => "transport_ship",
            Command::Emoji { .. } => "emoji",
            Command::UpdateRelation { .. } => "update_relation",
            Command::Embargo { .. } => "embargo",
            Command::AllianceRequest { .. } => "alliance_request",
            Command::AllianceReply { .. } => "alliance_reply",
            Command::AllianceExtension { .. } => "alliance_extension",
            Command::AttenuateFear { .. } => "attenuate_fear",
        }
    }

    /// Returns true for commands that project force onto another faction
    pub fn is_hostile(&self) -> bool {
        matches!(
            self,
            Command::Attack { .. } | Command::Nuke { .. } | Command::TransportShip { .. }
        )
    }
}

/// A command stamped with the tick and the issuing nation's identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub tick: Tick,
    /// Stable identity of the issuing nation (known before its faction exists)
    pub issuer: String,
    #[serde(flatten)]
    pub command: Command,
}

impl CommandRecord {
    pub fn new(tick: Tick, issuer: impl Into<String>, command: Command) -> Self {
        Self {
            tick,
            issuer: issuer.into(),
            command,
        }
    }

    /// Serialize to a single JSONL line
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from a single JSONL line
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}
