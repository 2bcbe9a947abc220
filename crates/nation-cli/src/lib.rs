//! Scenario runner for the nation AI: TOML scenarios in, JSONL command
//! streams out.

pub mod runner;
pub mod scenario;

pub use runner::{RunError, RunSummary, Runner};
pub use scenario::{Scenario, ScenarioError};
