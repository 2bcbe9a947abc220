//! Reference Tactical Helper
//!
//! A complete, self-contained `TacticalHelper` for hosts that do not bring
//! their own. Troop commitments follow the nation's profile: expansions spend
//! `expand_ratio` of the army, attacks keep `reserve_ratio` at home and only
//! go out when the remaining force outweighs the defender by `trigger_ratio`.

use nation_commands::{Command, PlayerId, PlayerType, Relation, Tick};

use crate::config::AgentProfile;
use crate::context::DecisionContext;
use crate::game::GameView;
use crate::helper::TacticalHelper;

/// Multiplier applied to fear each active tick
pub const FEAR_DECAY: f64 = 0.9;
/// Ticks a grudge survives without being refreshed
pub const ENEMY_MEMORY_TICKS: u64 = 600;

/// Remembered rival and when it became one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Grudge {
    enemy: PlayerId,
    since: Tick,
}

/// Default tactical helper
#[derive(Debug, Clone)]
pub struct ReferenceBehavior {
    player: PlayerId,
    profile: AgentProfile,
    grudge: Option<Grudge>,
}

/// Factory signature accepted by `NationAgent`
pub type ReferenceFactory = fn(PlayerId, &AgentProfile) -> ReferenceBehavior;

impl ReferenceBehavior {
    pub fn new(player: PlayerId, profile: &AgentProfile) -> Self {
        Self {
            player,
            profile: *profile,
            grudge: None,
        }
    }

    /// Faction currently held as an enemy
    pub fn enemy(&self) -> Option<PlayerId> {
        self.grudge.map(|g| g.enemy)
    }

    fn remember<G: GameView + ?Sized>(&mut self, ctx: &DecisionContext<'_, G>, enemy: PlayerId) {
        if self.enemy() != Some(enemy) {
            tracing::debug!(nation = ctx.issuer(), %enemy, "new enemy");
        }
        self.grudge = Some(Grudge {
            enemy,
            since: ctx.tick(),
        });
    }

    fn is_valid_enemy<G: GameView + ?Sized>(&self, game: &G, other: PlayerId) -> bool {
        other != self.player
            && game.is_alive(other)
            && !game.is_friendly(self.player, other)
    }
}

impl TacticalHelper for ReferenceBehavior {
    fn send_attack<G: GameView + ?Sized>(
        &mut self,
        ctx: &mut DecisionContext<'_, G>,
        target: Option<PlayerId>,
    ) {
        let game = ctx.game;
        let troops = game.troops(self.player) as f64;

        let committed = match target {
            None => troops * self.profile.expand_ratio,
            Some(other) => {
                if !self.is_valid_enemy(game, other) {
                    return;
                }
                let committed = troops * (1.0 - self.profile.reserve_ratio);
                let defenders = game.troops(other) as f64;
                if committed * self.profile.trigger_ratio < defenders * (1.0 - self.profile.trigger_ratio) {
                    return;
                }
                committed
            }
        };

        let committed = committed.floor() as u64;
        if committed == 0 {
            return;
        }
        ctx.emit(Command::Attack {
            target,
            troops: committed,
        });
    }

    fn attenuate_fear<G: GameView + ?Sized>(&mut self, ctx: &mut DecisionContext<'_, G>) {
        if ctx.game.fear(self.player) > 0.0 {
            ctx.emit(Command::AttenuateFear {
                factor: FEAR_DECAY,
            });
        }
    }

    fn handle_alliance_requests<G: GameView + ?Sized>(&mut self, ctx: &mut DecisionContext<'_, G>) {
        let game = ctx.game;
        for requestor in game.pending_alliance_requests(self.player) {
            let accept = !game.is_traitor(requestor)
                && game.relation(self.player, requestor) >= Relation::Neutral
                && self.enemy() != Some(requestor);
            ctx.emit(Command::AllianceReply { requestor, accept });
        }
    }

    fn handle_alliance_extension_requests<G: GameView + ?Sized>(
        &mut self,
        ctx: &mut DecisionContext<'_, G>,
    ) {
        let game = ctx.game;
        for ally in game.expiring_alliances(self.player) {
            if game.relation(self.player, ally) >= Relation::Neutral {
                ctx.emit(Command::AllianceExtension { ally });
            }
        }
    }

    fn forget_old_enemies<G: GameView + ?Sized>(&mut self, ctx: &mut DecisionContext<'_, G>) {
        if let Some(grudge) = self.grudge {
            let stale = ctx.tick().saturating_sub(grudge.since) > ENEMY_MEMORY_TICKS;
            if stale || !self.is_valid_enemy(ctx.game, grudge.enemy) {
                tracing::debug!(nation = ctx.issuer(), enemy = %grudge.enemy, "forgetting enemy");
                self.grudge = None;
            }
        }
    }

    fn assist_allies<G: GameView + ?Sized>(&mut self, ctx: &mut DecisionContext<'_, G>) {
        if self.grudge.is_some() {
            return;
        }
        let game = ctx.game;
        let allies: Vec<PlayerId> = game
            .player_ids()
            .into_iter()
            .filter(|&p| p != self.player && game.is_alive(p) && game.is_allied(self.player, p))
            .collect();

        for ally in allies {
            let quarrel = game
                .neighbors_of(self.player)
                .into_iter()
                .find(|&n| {
                    n != ally
                        && self.is_valid_enemy(game, n)
                        && game.relation(ally, n) == Relation::Hostile
                });
            if let Some(enemy) = quarrel {
                self.remember(ctx, enemy);
                return;
            }
        }
    }

    fn select_enemy<G: GameView + ?Sized>(
        &mut self,
        ctx: &mut DecisionContext<'_, G>,
    ) -> Option<PlayerId> {
        if let Some(enemy) = self.enemy() {
            if self.is_valid_enemy(ctx.game, enemy) {
                return Some(enemy);
            }
        }

        let game = ctx.game;
        let me = self.player;

        // Bordering rivals first: worst relation, then fewest troops
        let bordering = game
            .neighbors_of(me)
            .into_iter()
            .filter(|&n| self.is_valid_enemy(game, n) && game.player_type(n) != PlayerType::Bot)
            .min_by_key(|&n| (game.relation_score(me, n), game.troops(n), n));

        let choice = bordering.or_else(|| {
            game.player_ids()
                .into_iter()
                .filter(|&p| self.is_valid_enemy(game, p) && game.relation(me, p) < Relation::Neutral)
                .min_by_key(|&p| (game.relation_score(me, p), p))
        });

        if let Some(enemy) = choice {
            self.remember(ctx, enemy);
        }
        choice
    }
}
