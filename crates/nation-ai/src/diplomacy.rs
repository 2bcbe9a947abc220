//! Diplomacy Manager
//!
//! Embargo bookkeeping and taunts. Relation changes and embargoes are emitted
//! as commands; the malus set records which embargo penalties are in force so
//! each one is applied exactly once and reversed exactly once.

use std::collections::{HashMap, HashSet};

use nation_commands::{Command, EmbargoAction, PlayerId, PlayerType, Relation, Tick};

use crate::context::DecisionContext;
use crate::game::GameView;

/// Emoji table shared with clients; commands carry indices into it
pub const EMOJI_TABLE: &[&str] = &[
    "😀", "😊", "🥰", "😇", "😎", "😞", "🥺", "😭", "😱", "😡", "😈", "🤡", "🖕", "🥱", "🤦‍♂️",
    "👋", "👏", "✋", "🙏", "💪", "👍", "👎", "🫡", "🤝", "🆘", "🕊️", "🏳️", "⏳", "🔥", "💥",
    "💀", "☢️", "⚠️", "❤️", "💰", "⚓", "⛵", "🏡", "🛡️", "🏭",
];

/// Taunts a nation sends to its rivals
const TAUNTS: &[&str] = &["🤡", "😡"];

/// Per-nation diplomatic memory
#[derive(Debug, Clone)]
pub struct Diplomacy {
    /// Factions whose embargo against us is currently reflected in our relation
    embargo_malus_applied: HashSet<PlayerId>,
    /// Last taunt tick per faction
    last_emoji_sent: HashMap<PlayerId, Tick>,
    /// Indices into `EMOJI_TABLE`, resolved once
    taunts: Vec<usize>,
}

impl Default for Diplomacy {
    fn default() -> Self {
        Self::new()
    }
}

impl Diplomacy {
    pub fn new() -> Self {
        let taunts = TAUNTS
            .iter()
            .filter_map(|t| EMOJI_TABLE.iter().position(|e| e == t))
            .collect();
        Self {
            embargo_malus_applied: HashSet::new(),
            last_emoji_sent: HashMap::new(),
            taunts,
        }
    }

    pub fn has_embargo_malus(&self, other: PlayerId) -> bool {
        self.embargo_malus_applied.contains(&other)
    }

    pub fn last_emoji_sent(&self, other: PlayerId) -> Option<Tick> {
        self.last_emoji_sent.get(&other).copied()
    }

    /// Mirror other factions' embargoes against us into our relations
    pub fn update_relations_from_embargoes<G: GameView + ?Sized>(
        &mut self,
        ctx: &mut DecisionContext<'_, G>,
    ) {
        let game = ctx.game;
        let me = ctx.player;
        let malus = ctx.tuning.diplomacy.embargo_malus;

        for other in game.player_ids().into_iter().filter(|&p| p != me) {
            let embargoed = game.has_embargo_against(other, me);
            let applied = self.embargo_malus_applied.contains(&other);
            if embargoed && !applied {
                ctx.emit(Command::UpdateRelation {
                    other,
                    delta: malus,
                });
                self.embargo_malus_applied.insert(other);
            } else if !embargoed && applied {
                ctx.emit(Command::UpdateRelation {
                    other,
                    delta: -malus,
                });
                self.embargo_malus_applied.remove(&other);
            }
        }
    }

    /// Taunt a human rival, at most once per cooldown window
    pub fn maybe_send_emoji<G: GameView + ?Sized>(
        &mut self,
        ctx: &mut DecisionContext<'_, G>,
        enemy: PlayerId,
    ) {
        if ctx.game.player_type(enemy) != PlayerType::Human {
            return;
        }
        let cooldown = ctx.tuning.diplomacy.emoji_cooldown_ticks as i64;
        let now = ctx.tick() as i64;
        let last = self
            .last_emoji_sent
            .get(&enemy)
            .map_or(-cooldown, |&t| t as i64);
        if now - last <= cooldown {
            return;
        }
        let Some(&emoji) = ctx.rng.rand_element(&self.taunts) else {
            return;
        };
        self.last_emoji_sent.insert(enemy, ctx.tick());
        ctx.emit(Command::Emoji {
            recipient: enemy,
            emoji,
        });
    }
}

/// Embargo anyone we have come to hate; lift it once they are tolerable again.
/// Between the two thresholds an existing embargo stays in place.
pub fn handle_embargoes_to_hostile_nations<G: GameView + ?Sized>(ctx: &mut DecisionContext<'_, G>) {
    let game = ctx.game;
    let me = ctx.player;

    for other in game.player_ids().into_iter().filter(|&p| p != me) {
        let relation = game.relation(me, other);
        let embargoing = game.has_embargo_against(me, other);
        if relation <= Relation::Hostile && !embargoing && !game.is_on_same_team(me, other) {
            ctx.emit(Command::Embargo {
                target: other,
                action: EmbargoAction::Start,
            });
        } else if relation >= Relation::Neutral && embargoing {
            ctx.emit(Command::Embargo {
                target: other,
                action: EmbargoAction::Stop,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AgentProfile, EngineTuning};
    use crate::grid::GridWorld;
    use crate::rng::PseudoRandom;
    use nation_commands::CommandRecord;

    fn profile() -> AgentProfile {
        AgentProfile {
            attack_rate: 60,
            attack_tick: 0,
            trigger_ratio: 0.7,
            reserve_ratio: 0.4,
            expand_ratio: 0.2,
        }
    }

    fn world() -> (GridWorld, PlayerId, PlayerId) {
        let mut w = GridWorld::from_rows(&["~~~~~~", "~....~", "~....~", "~~~~~~"]);
        let me = w.add_player("me", "Me", PlayerType::Nation);
        let other = w.add_player("other", "Other", PlayerType::Human);
        w.claim_rect(me, 1, 1, 2, 2);
        w.claim_rect(other, 3, 1, 4, 2);
        (w, me, other)
    }

    fn run<F>(w: &GridWorld, me: PlayerId, tick: Tick, f: F) -> Vec<CommandRecord>
    where
        F: FnOnce(&mut DecisionContext<'_, GridWorld>),
    {
        let mut rng = PseudoRandom::new(5);
        let prof = profile();
        let tuning = EngineTuning::default();
        let mut out = Vec::new();
        let mut ctx = DecisionContext::new(w, me, &mut rng, &prof, &tuning, "me", tick, &mut out);
        f(&mut ctx);
        out
    }

    #[test]
    fn test_taunt_vocabulary_resolved() {
        let d = Diplomacy::new();
        assert_eq!(d.taunts.len(), 2);
        assert_eq!(EMOJI_TABLE[d.taunts[0]], "🤡");
        assert_eq!(EMOJI_TABLE[d.taunts[1]], "😡");
    }

    #[test]
    fn test_embargo_malus_is_idempotent() {
        let (mut w, me, other) = world();
        w.set_embargo(other, me, true);
        let mut d = Diplomacy::new();

        let first = run(&w, me, 0, |ctx| d.update_relations_from_embargoes(ctx));
        assert_eq!(
            first.iter().map(|r| r.command.clone()).collect::<Vec<_>>(),
            vec![Command::UpdateRelation { other, delta: -20 }]
        );
        assert!(d.has_embargo_malus(other));

        let second = run(&w, me, 1, |ctx| d.update_relations_from_embargoes(ctx));
        assert!(second.is_empty());
    }

    #[test]
    fn test_embargo_malus_reversed_on_exit() {
        let (mut w, me, other) = world();
        w.set_embargo(other, me, true);
        let mut d = Diplomacy::new();
        run(&w, me, 0, |ctx| d.update_relations_from_embargoes(ctx));

        w.set_embargo(other, me, false);
        let out = run(&w, me, 1, |ctx| d.update_relations_from_embargoes(ctx));
        assert_eq!(out[0].command, Command::UpdateRelation { other, delta: 20 });
        assert!(!d.has_embargo_malus(other));

        assert!(run(&w, me, 2, |ctx| d.update_relations_from_embargoes(ctx)).is_empty());
    }

    #[test]
    fn test_hostile_nation_gets_embargoed() {
        let (mut w, me, other) = world();
        w.set_relation(me, other, -60);
        let out = run(&w, me, 0, |ctx| handle_embargoes_to_hostile_nations(ctx));
        assert_eq!(
            out[0].command,
            Command::Embargo {
                target: other,
                action: EmbargoAction::Start
            }
        );
    }

    #[test]
    fn test_teammates_never_embargoed() {
        let (mut w, me, other) = world();
        w.set_relation(me, other, -100);
        w.set_team(me, 1);
        w.set_team(other, 1);
        assert!(run(&w, me, 0, |ctx| handle_embargoes_to_hostile_nations(ctx)).is_empty());
    }

    #[test]
    fn test_embargo_locked_in_until_neutral() {
        let (mut w, me, other) = world();
        w.set_embargo(me, other, true);

        // Distrustful: keep the embargo
        w.set_relation(me, other, -20);
        assert!(run(&w, me, 0, |ctx| handle_embargoes_to_hostile_nations(ctx)).is_empty());

        // Neutral: lift it
        w.set_relation(me, other, 0);
        let out = run(&w, me, 0, |ctx| handle_embargoes_to_hostile_nations(ctx));
        assert_eq!(
            out[0].command,
            Command::Embargo {
                target: other,
                action: EmbargoAction::Stop
            }
        );
    }

    #[test]
    fn test_taunt_rate_limited() {
        let (w, me, other) = world();
        let mut d = Diplomacy::new();

        let first = run(&w, me, 1000, |ctx| d.maybe_send_emoji(ctx, other));
        assert_eq!(first.len(), 1);
        assert!(matches!(first[0].command, Command::Emoji { recipient, .. } if recipient == other));

        let again = run(&w, me, 1300, |ctx| d.maybe_send_emoji(ctx, other));
        assert!(again.is_empty());

        let later = run(&w, me, 1301, |ctx| d.maybe_send_emoji(ctx, other));
        assert_eq!(later.len(), 1);
        assert_eq!(d.last_emoji_sent(other), Some(1301));
    }

    #[test]
    fn test_no_taunts_for_non_humans() {
        let (mut w, me, _) = world();
        let bot = w.add_player("bot", "Bot", PlayerType::Nation);
        let mut d = Diplomacy::new();
        assert!(run(&w, me, 1000, |ctx| d.maybe_send_emoji(ctx, bot)).is_empty());
    }
}
