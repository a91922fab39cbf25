//! TemporaryBlindness: движение отключено на фиксированную длительность
//!
//! Melee-урон в слепоте летален — этот переход выполняет cross-cutting
//! проверка FSM (на границе тика), не сам state. По истечении — поиск
//! от последней известной позиции.

use crate::ai::state::AgentState;
use crate::ai::transitions::StateCtx;

pub fn update(ctx: &mut StateCtx, timer: &mut f32) -> Option<AgentState> {
    *timer -= ctx.dt;
    if *timer > 0.0 {
        return None;
    }

    let search_from = ctx
        .awareness
        .last_seen
        .unwrap_or(ctx.transform.translation);
    Some(AgentState::lost_player(&ctx.profile.search, search_from))
}
