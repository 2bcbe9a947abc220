//! Tick Dispatcher
//!
//! `NationAgent` drives one computer-controlled nation. The host calls
//! [`NationAgent::tick`] once per simulation tick; heavy work only happens on
//! the nation's own cadence slot, and everything the agent decides leaves as
//! commands on the host's queue.
//!
//! Lifecycle:
//!
//! ```text
//! Uninitialized -> Spawning -> AwaitingFaction -> AwaitingHelper -> Active -> Inactive
//! ```

use nation_commands::{Cell, Command, CommandRecord, PlayerId, Tick};

use crate::attack::maybe_attack;
use crate::behavior::{ReferenceBehavior, ReferenceFactory};
use crate::config::{AgentProfile, EngineTuning};
use crate::context::DecisionContext;
use crate::diplomacy::{handle_embargoes_to_hostile_nations, Diplomacy};
use crate::error::EngineError;
use crate::game::GameView;
use crate::helper::{HelperFactory, TacticalHelper};
use crate::naval::random_land;
use crate::nuke::StrikeLog;
use crate::rng::PseudoRandom;
use crate::structures::handle_units;

/// Static description of a computer-controlled nation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nation {
    /// Stable identity, also the faction lookup key
    pub identity: String,
    pub name: String,
    /// Preferred spawn location
    pub spawn_cell: Cell,
}

impl Nation {
    pub fn new(identity: impl Into<String>, name: impl Into<String>, spawn_cell: Cell) -> Self {
        Self {
            identity: identity.into(),
            name: name.into(),
            spawn_cell,
        }
    }
}

enum Phase<H> {
    Uninitialized,
    Spawning,
    AwaitingFaction,
    AwaitingHelper { player: PlayerId },
    Active { player: PlayerId, helper: H },
    Inactive,
}

impl<H> Phase<H> {
    fn name(&self) -> &'static str {
        match self {
            Phase::Uninitialized => "uninitialized",
            Phase::Spawning => "spawning",
            Phase::AwaitingFaction => "awaiting_faction",
            Phase::AwaitingHelper { .. } => "awaiting_helper",
            Phase::Active { .. } => "active",
            Phase::Inactive => "inactive",
        }
    }

    fn player(&self) -> Option<PlayerId> {
        match self {
            Phase::AwaitingHelper { player } | Phase::Active { player, .. } => Some(*player),
            _ => None,
        }
    }
}

/// Decision engine for one nation
pub struct NationAgent<F: HelperFactory = ReferenceFactory> {
    nation: Nation,
    rng: PseudoRandom,
    profile: AgentProfile,
    tuning: EngineTuning,
    factory: F,
    phase: Phase<F::Helper>,
    diplomacy: Diplomacy,
    strikes: StrikeLog,
}

impl NationAgent<ReferenceFactory> {
    /// Agent backed by the built-in [`ReferenceBehavior`]
    pub fn with_reference_behavior(nation: Nation, game_id: &str, tuning: EngineTuning) -> Self {
        Self::new(nation, game_id, ReferenceBehavior::new as ReferenceFactory, tuning)
    }
}

impl<F: HelperFactory> NationAgent<F> {
    /// The seeded source and profile are fixed here; the profile is the
    /// first thing drawn from the source.
    pub fn new(nation: Nation, game_id: &str, factory: F, tuning: EngineTuning) -> Self {
        let mut rng = PseudoRandom::for_nation(&nation.identity, game_id);
        let profile = AgentProfile::roll(&mut rng);
        Self {
            nation,
            rng,
            profile,
            tuning,
            factory,
            phase: Phase::Uninitialized,
            diplomacy: Diplomacy::new(),
            strikes: StrikeLog::new(),
        }
    }

    /// Mark the simulation queryable. Idempotent.
    pub fn init(&mut self) {
        if matches!(self.phase, Phase::Uninitialized) {
            tracing::debug!(nation = %self.nation.name, profile = ?self.profile, "nation agent initialised");
            self.phase = Phase::Spawning;
        }
    }

    pub fn nation(&self) -> &Nation {
        &self.nation
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    pub fn strike_log(&self) -> &StrikeLog {
        &self.strikes
    }

    pub fn diplomacy(&self) -> &Diplomacy {
        &self.diplomacy
    }

    /// False once the nation has been eliminated
    pub fn is_active(&self) -> bool {
        !matches!(self.phase, Phase::Inactive)
    }

    pub fn phase_name(&self) -> &'static str {
        self.phase.name()
    }

    /// Bound faction, once known
    pub fn player(&self) -> Option<PlayerId> {
        self.phase.player()
    }

    pub fn helper(&self) -> Option<&F::Helper> {
        match &self.phase {
            Phase::Active { helper, .. } => Some(helper),
            _ => None,
        }
    }

    pub fn active_during_spawn_phase(&self) -> bool {
        true
    }

    /// Run one simulation tick, appending any decisions to `queue`
    pub fn tick<G: GameView + ?Sized>(
        &mut self,
        game: &G,
        ticks: Tick,
        queue: &mut Vec<CommandRecord>,
    ) -> Result<(), EngineError> {
        if matches!(self.phase, Phase::Uninitialized) {
            return Err(EngineError::Uninitialized);
        }
        if !self.profile.is_turn(ticks) || matches!(self.phase, Phase::Inactive) {
            return Ok(());
        }

        if game.in_spawn_phase() {
            // A bound faction keeps its helper; only the unbound fall back to spawning
            if matches!(self.phase, Phase::AwaitingFaction) {
                self.phase = Phase::Spawning;
            }
            self.spawn(game, ticks, queue);
            return Ok(());
        }

        if matches!(self.phase, Phase::Spawning | Phase::AwaitingFaction) {
            match game.find_player(&self.nation.identity) {
                Some(player) => {
                    tracing::debug!(nation = %self.nation.name, %player, "faction bound");
                    self.phase = Phase::AwaitingHelper { player };
                }
                None => {
                    self.phase = Phase::AwaitingFaction;
                    return Ok(());
                }
            }
        }

        let Some(player) = self.phase.player() else {
            return Err(EngineError::Uninitialized);
        };
        if !game.player_ids().contains(&player) {
            return Err(EngineError::UnknownPlayer(player));
        }
        if !game.is_alive(player) {
            tracing::info!(nation = %self.nation.name, tick = ticks, "nation eliminated");
            self.phase = Phase::Inactive;
            return Ok(());
        }

        let mut ctx = DecisionContext::new(
            game,
            player,
            &mut self.rng,
            &self.profile,
            &self.tuning,
            &self.nation.identity,
            ticks,
            queue,
        );

        if let Phase::AwaitingHelper { .. } = self.phase {
            let mut helper = self.factory.create(player, &self.profile);
            tracing::debug!(nation = %self.nation.name, "tactical helper ready");
            // Opening move: grab unclaimed land, nothing else this tick
            helper.send_attack(&mut ctx, None);
            self.phase = Phase::Active { player, helper };
            return Ok(());
        }

        if let Phase::Active { helper, .. } = &mut self.phase {
            helper.attenuate_fear(&mut ctx);
            self.diplomacy.update_relations_from_embargoes(&mut ctx);
            helper.handle_alliance_requests(&mut ctx);
            helper.handle_alliance_extension_requests(&mut ctx);
            handle_units(&mut ctx);
            handle_embargoes_to_hostile_nations(&mut ctx);
            maybe_attack(&mut ctx, helper, &mut self.diplomacy, &mut self.strikes);
        }
        Ok(())
    }

    fn spawn<G: GameView + ?Sized>(&mut self, game: &G, ticks: Tick, queue: &mut Vec<CommandRecord>) {
        let Some(tile) = random_land(game, &mut self.rng, &self.tuning.spawn, self.nation.spawn_cell)
        else {
            tracing::warn!(nation = %self.nation.name, "cannot spawn");
            return;
        };
        tracing::debug!(nation = %self.nation.name, tile, "spawn claimed");
        queue.push(CommandRecord::new(
            ticks,
            &self.nation.identity,
            Command::Spawn { tile },
        ));
    }
}
