//! Tactical Helper
//!
//! Common behaviour primitives the engine delegates to rather than
//! reimplementing. The helper is built on the first tick after the faction
//! exists, since the faction record is not available before spawning ends.

use nation_commands::PlayerId;

use crate::config::AgentProfile;
use crate::context::DecisionContext;
use crate::game::GameView;

/// Shared attack, fear, alliance and enemy-memory primitives
pub trait TacticalHelper {
    /// Dispatch an attack. `None` targets unclaimed land.
    fn send_attack<G: GameView + ?Sized>(
        &mut self,
        ctx: &mut DecisionContext<'_, G>,
        target: Option<PlayerId>,
    );

    /// Let recent threat decay
    fn attenuate_fear<G: GameView + ?Sized>(&mut self, ctx: &mut DecisionContext<'_, G>);

    /// Answer pending alliance requests
    fn handle_alliance_requests<G: GameView + ?Sized>(&mut self, ctx: &mut DecisionContext<'_, G>);

    /// Vote on alliances that are about to expire
    fn handle_alliance_extension_requests<G: GameView + ?Sized>(
        &mut self,
        ctx: &mut DecisionContext<'_, G>,
    );

    /// Drop grudges that are stale or whose target is gone
    fn forget_old_enemies<G: GameView + ?Sized>(&mut self, ctx: &mut DecisionContext<'_, G>);

    /// Take up allies' quarrels
    fn assist_allies<G: GameView + ?Sized>(&mut self, ctx: &mut DecisionContext<'_, G>);

    /// Longer-term rival, if any
    fn select_enemy<G: GameView + ?Sized>(
        &mut self,
        ctx: &mut DecisionContext<'_, G>,
    ) -> Option<PlayerId>;
}

/// Builds the helper once the controlled faction exists
pub trait HelperFactory {
    type Helper: TacticalHelper;

    fn create(&mut self, player: PlayerId, profile: &AgentProfile) -> Self::Helper;
}

impl<H, F> HelperFactory for F
where
    H: TacticalHelper,
    F: FnMut(PlayerId, &AgentProfile) -> H,
{
    type Helper = H;

    fn create(&mut self, player: PlayerId, profile: &AgentProfile) -> H {
        self(player, profile)
    }
}
