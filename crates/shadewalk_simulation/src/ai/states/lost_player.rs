//! LostPlayer: к последней известной позиции, затем ограниченный осмотр
//!
//! Свежие сигналы (alert, шум, удар) перенацеливают точку поиска.
//! Осмотр истёк без обнаружения → обратно в Patrol.

use bevy::prelude::*;
use rand::Rng;

use crate::ai::state::AgentState;
use crate::ai::transitions::StateCtx;
use crate::nav::{FacingIntent, ARRIVE_EPSILON};

pub fn update(
    ctx: &mut StateCtx,
    search_point: &mut Vec3,
    reached: &mut bool,
    look_timer: &mut f32,
    glance_timer: &mut f32,
) -> Option<AgentState> {
    let profile = ctx.profile;

    // Обнаружили → в бой по политике архетипа
    if ctx.sees_target() {
        if let Some(target) = ctx.target_alive() {
            ctx.awareness.last_seen = Some(target.position);
        }
        if let Some(next) = profile.engage_state(ctx.rng) {
            return Some(next);
        }
    }

    // Свежий сигнал перенацеливает поиск
    let retarget = ctx
        .awareness
        .alert
        .take()
        .or_else(|| ctx.awareness.noise.take())
        .or_else(|| ctx.awareness.damaged_by.take().map(|m| m.position));
    if let Some(position) = retarget {
        *search_point = position;
        *reached = false;
        ctx.nav.set_destination(position);
        ctx.nav.face = FacingIntent::Movement;
    }

    if !*reached {
        if ctx.nav.destination().is_none() {
            ctx.nav.set_destination(*search_point);
        }
        if ctx.nav.arrived(ARRIVE_EPSILON) {
            *reached = true;
            *glance_timer = 0.0;
            ctx.nav.clear_destination();
        }
        return None;
    }

    // Ограниченный случайный осмотр на точке
    *look_timer -= ctx.dt;
    *glance_timer -= ctx.dt;
    if *glance_timer <= 0.0 {
        *glance_timer = profile.search.glance_interval;
        let angle = ctx.rng.gen_range(0.0..std::f32::consts::TAU);
        let dir = Vec3::new(angle.cos(), 0.0, angle.sin());
        ctx.nav.face = FacingIntent::At(ctx.transform.translation + dir * 3.0);
    }

    if *look_timer <= 0.0 {
        return Some(AgentState::patrol());
    }

    None
}
