use nation_commands::PlayerId;
use thiserror::Error;

/// Failures surfaced from `NationAgent::tick`
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("nation agent ticked before init")]
    Uninitialized,

    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),
}
