//! Shared command and map types for the nation AI.
//!
//! This crate contains pure data structures with no decision logic.
//! It is a dependency for all other crates in the workspace.

pub mod command;
pub mod log;
pub mod types;

// Re-export map and entity types
pub use types::{
    Cell, Difficulty, Gold, PlayerId, PlayerType, Relation, TerrainType, Tick, TileRef, UnitType,
};

// Re-export command types
pub use command::{Command, CommandRecord, EmbargoAction};

// Re-export log types
pub use log::{CommandLog, CommandLogError, read_command_log};
