//! Aggressive: сближение в melee-полосу и атаки по каденсу оружия
//!
//! Между атаками доворачиваемся лицом к цели; grace-таймер без LOS
//! выталкивает в LostPlayer.

use crate::ai::state::AgentState;
use crate::ai::transitions::StateCtx;
use crate::combat::MeleeAttackIntent;
use crate::nav::FacingIntent;

pub fn update(ctx: &mut StateCtx, lost_sight_timer: &mut f32) -> Option<AgentState> {
    let profile = ctx.profile;
    let Some(cfg) = profile.aggressive.as_ref() else {
        return Some(AgentState::patrol());
    };

    let Some(target) = ctx.target_alive() else {
        if ctx.target.is_none() {
            return None; // Цель ещё не найдена — ждём
        }
        return Some(AgentState::patrol()); // Цель мертва
    };

    ctx.awareness.alert = None;
    ctx.awareness.damaged_by = None;

    // Grace без line of sight
    if ctx.sees_target() {
        *lost_sight_timer = 0.0;
        ctx.awareness.last_seen = Some(target.position);
    } else {
        *lost_sight_timer += ctx.dt;
        if *lost_sight_timer >= cfg.lost_sight_grace {
            let last = ctx.awareness.last_seen.unwrap_or(target.position);
            return Some(AgentState::lost_player(&profile.search, last));
        }
    }

    let distance = ctx.distance_to(target.position);
    if distance > cfg.melee_band {
        // Сближение
        ctx.nav.set_destination(target.position);
        ctx.nav.face = FacingIntent::Movement;
    } else {
        // В полосе: стоим, доворачиваемся, бьём когда оружие готово
        ctx.nav.clear_destination();
        ctx.nav.face = FacingIntent::At(target.position);

        let weapon_ready = ctx.weapon.map(|w| w.can_swing()).unwrap_or(false);
        if weapon_ready && ctx.facing_dot(target.position) >= cfg.strike_facing_min {
            ctx.out.melee.push(MeleeAttackIntent {
                attacker: ctx.entity,
            });
        }
    }

    None
}
