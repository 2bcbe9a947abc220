//! Deterministic decision engine for computer-controlled nations.
//!
//! One [`NationAgent`] per nation. Each tick it reads the simulation through
//! [`GameView`] and pushes [`nation_commands::CommandRecord`]s onto a queue.

pub mod attack;
pub mod behavior;
pub mod config;
pub mod context;
pub mod diplomacy;
pub mod engine;
pub mod error;
pub mod game;
pub mod helper;
pub mod naval;
pub mod nuke;
pub mod rng;
pub mod structures;

#[cfg(any(test, feature = "grid-world"))]
pub mod grid;

pub use behavior::{ReferenceBehavior, ReferenceFactory};
pub use config::{AgentProfile, ConfigError, EngineTuning};
pub use context::DecisionContext;
pub use diplomacy::Diplomacy;
pub use engine::{Nation, NationAgent};
pub use error::EngineError;
pub use game::{GameView, UnitView};
pub use helper::{HelperFactory, TacticalHelper};
pub use nuke::StrikeLog;
pub use rng::PseudoRandom;

#[cfg(any(test, feature = "grid-world"))]
pub use grid::{GridError, GridWorld};
