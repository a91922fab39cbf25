//! Patrol: обход маршрута с ожиданием на точках
//!
//! Начальное состояние каждого агента. Конус обзора пересчитывается
//! только когда цель в пределах vision_wake_range (cost control).

use bevy::prelude::*;
use rand::Rng;

use crate::ai::state::AgentState;
use crate::ai::transitions::StateCtx;
use crate::nav::{FacingIntent, ARRIVE_EPSILON};

pub fn update(ctx: &mut StateCtx, wait_timer: &mut Option<f32>) -> Option<AgentState> {
    // Обнаружение цели: alert соседям + вступление в бой по политике архетипа
    let wake_range = ctx.profile.patrol.vision_wake_range;
    if ctx.sees_target_within(wake_range) {
        if let Some(target) = ctx.target_alive() {
            ctx.awareness.last_seen = Some(target.position);
            ctx.broadcast_alert(target.position);
            if let Some(next) = ctx.profile.engage_state(ctx.rng) {
                return Some(next);
            }
            // Боевых состояний не сконфигурировано — держим патруль
        }
    }

    // Ally alert → расследуем последнюю известную позицию цели
    if let Some(position) = ctx.awareness.alert.take() {
        ctx.awareness.last_seen = Some(position);
        return Some(AgentState::lost_player(&ctx.profile.search, position));
    }

    // Услышали шум → к источнику с разбросом (неуверенность в позиции)
    if let Some(position) = ctx.awareness.noise.take() {
        let angle = ctx.rng.gen_range(0.0..std::f32::consts::TAU);
        let radius = ctx.rng.gen_range(0.0..ctx.profile.search.noise_jitter);
        let offset = Vec3::new(angle.cos(), 0.0, angle.sin()) * radius;
        return Some(AgentState::lost_player(
            &ctx.profile.search,
            position + offset,
        ));
    }

    // Ударили (цель не видна — со спины) → к позиции атакующего
    if let Some(memory) = ctx.awareness.damaged_by.take() {
        return Some(AgentState::lost_player(&ctx.profile.search, memory.position));
    }

    // Обход маршрута
    match wait_timer {
        Some(timer) => {
            *timer -= ctx.dt;
            if *timer <= 0.0 {
                *wait_timer = None;
                ctx.route.advance();
            }
        }
        None => {
            // Пустой маршрут терпим: стоим на месте
            let Some(point) = ctx.route.current().copied() else {
                return None;
            };
            if ctx.nav.destination().is_none() {
                ctx.nav.set_destination(point.position);
                ctx.nav.face = FacingIntent::Movement;
            }
            if ctx.nav.arrived(ARRIVE_EPSILON) {
                ctx.nav.clear_destination();
                // Стоим лицом в сконфигурированный yaw точки
                let face_dir = Vec3::new(-point.face_yaw.sin(), 0.0, -point.face_yaw.cos());
                ctx.nav.face = FacingIntent::At(ctx.transform.translation + face_dir * 2.0);
                *wait_timer = Some(point.wait_secs);
            }
        }
    }

    None
}
