//! Attack Target Selector
//!
//! Picks what the nation fights this tick: unclaimed land, a bordering
//! faction, a sea raid, or, failing those, a longer-term rival reached by
//! strike, land or sea.

use nation_commands::{Command, Difficulty, PlayerId, PlayerType, TileRef};

use crate::context::DecisionContext;
use crate::diplomacy::Diplomacy;
use crate::game::GameView;
use crate::helper::TacticalHelper;
use crate::naval::{maybe_send_boat_attack, send_boat_randomly};
use crate::nuke::{maybe_send_nuke, StrikeLog};

/// Land next to our border that we do not own. Duplicates are kept, so a
/// faction with a longer shared border is proportionally more likely to be drawn.
pub fn enemy_border<G: GameView + ?Sized>(game: &G, me: PlayerId) -> Vec<TileRef> {
    game.border_tiles(me)
        .into_iter()
        .flat_map(|t| game.neighbors(t))
        .filter(|&t| game.is_land(t) && game.owner(t) != Some(me))
        .collect()
}

/// Offensive step for one active tick
pub fn maybe_attack<G, H>(
    ctx: &mut DecisionContext<'_, G>,
    helper: &mut H,
    diplomacy: &mut Diplomacy,
    strikes: &mut StrikeLog,
) where
    G: GameView + ?Sized,
    H: TacticalHelper,
{
    let game = ctx.game;
    let me = ctx.player;
    let tuning = ctx.tuning;
    let chances = &tuning.attack;

    let border = enemy_border(game, me);
    if border.is_empty() {
        if ctx.rng.chance(chances.landlocked_raid_chance) {
            send_boat_randomly(ctx);
        }
        return;
    }
    if ctx.rng.chance(chances.raid_chance) {
        send_boat_randomly(ctx);
        return;
    }

    let owners: Vec<Option<PlayerId>> = border.iter().map(|&t| game.owner(t)).collect();
    if owners.iter().any(Option::is_none) {
        helper.send_attack(ctx, None);
        return;
    }

    let mut enemies: Vec<PlayerId> = owners.into_iter().flatten().collect();
    enemies.sort_by_key(|&p| game.troops(p));

    if ctx.rng.chance(chances.alliance_proposal_chance) {
        if let Some(&to_ally) = ctx.rng.rand_element(&enemies) {
            if game.can_send_alliance_request(me, to_ally) {
                ctx.emit(Command::AllianceRequest { recipient: to_ally });
                return;
            }
        }
    }

    let candidate = if ctx.rng.chance(chances.weakest_target_chance) {
        enemies.first().copied()
    } else {
        ctx.rng.rand_element(&enemies).copied()
    };
    if let Some(target) = candidate {
        if should_attack(ctx, target) {
            helper.send_attack(ctx, Some(target));
            return;
        }
    }

    helper.forget_old_enemies(ctx);
    helper.assist_allies(ctx);
    let Some(enemy) = helper.select_enemy(ctx) else {
        return;
    };
    diplomacy.maybe_send_emoji(ctx, enemy);
    maybe_send_nuke(ctx, strikes, enemy);
    if game.shares_border_with(me, enemy) {
        helper.send_attack(ctx, Some(enemy));
    } else {
        maybe_send_boat_attack(ctx, enemy);
    }
}

/// Willingness to attack `other` right now
pub fn should_attack<G: GameView + ?Sized>(ctx: &mut DecisionContext<'_, G>, other: PlayerId) -> bool {
    let game = ctx.game;
    let me = ctx.player;
    let tuning = ctx.tuning;
    let chances = &tuning.attack;
    if game.is_on_same_team(me, other) {
        return false;
    }
    let discouraged = should_discourage_attack(game, other);
    let one_in = if game.is_friendly(me, other) {
        if discouraged {
            chances.friendly_discouraged_attack_chance
        } else {
            chances.friendly_attack_chance
        }
    } else if discouraged {
        chances.hostile_discouraged_attack_chance
    } else {
        return true;
    };
    ctx.rng.chance(one_in)
}

/// Go easy on honest human players below hard difficulty
pub fn should_discourage_attack<G: GameView + ?Sized>(game: &G, other: PlayerId) -> bool {
    if game.is_traitor(other) {
        return false;
    }
    if matches!(game.difficulty(), Difficulty::Hard | Difficulty::Impossible) {
        return false;
    }
    game.player_type(other) == PlayerType::Human
}
