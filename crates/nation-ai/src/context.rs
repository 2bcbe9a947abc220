//! Decision Context
//!
//! Everything a planner needs for one tick: the read-only game, the nation's
//! seeded source, its tuning, and the outgoing command queue.

use nation_commands::{Command, CommandRecord, PlayerId, Tick};

use crate::config::{AgentProfile, EngineTuning};
use crate::game::GameView;
use crate::rng::PseudoRandom;

/// Borrowed per-tick state shared by all planners and the tactical helper
pub struct DecisionContext<'a, G: GameView + ?Sized> {
    pub game: &'a G,
    /// The controlled faction
    pub player: PlayerId,
    pub rng: &'a mut PseudoRandom,
    pub profile: &'a AgentProfile,
    pub tuning: &'a EngineTuning,
    issuer: &'a str,
    tick: Tick,
    queue: &'a mut Vec<CommandRecord>,
}

impl<'a, G: GameView + ?Sized> DecisionContext<'a, G> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        game: &'a G,
        player: PlayerId,
        rng: &'a mut PseudoRandom,
        profile: &'a AgentProfile,
        tuning: &'a EngineTuning,
        issuer: &'a str,
        tick: Tick,
        queue: &'a mut Vec<CommandRecord>,
    ) -> Self {
        Self {
            game,
            player,
            rng,
            profile,
            tuning,
            issuer,
            tick,
            queue,
        }
    }

    /// Tick this context was built for
    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn issuer(&self) -> &str {
        self.issuer
    }

    /// Push a command onto the scheduler queue
    pub fn emit(&mut self, command: Command) {
        tracing::debug!(
            nation = self.issuer,
            tick = self.tick,
            kind = command.kind(),
            "emit command"
        );
        self.queue
            .push(CommandRecord::new(self.tick, self.issuer, command));
    }

    /// Number of commands queued so far this tick
    pub fn emitted(&self) -> usize {
        self.queue.len()
    }
}
