//! Defense: удержание рандомизированной stand-off дистанции
//!
//! Стрейфим по окружности вокруг цели, стоим лицом к ней, harass-выстрелы
//! по каденсу. Melee-размен оправдан (цель близко) → Aggressive.

use bevy::prelude::*;
use rand::Rng;

use crate::ai::state::AgentState;
use crate::ai::transitions::StateCtx;
use crate::combat::RangedAttackIntent;
use crate::nav::FacingIntent;

pub fn update(
    ctx: &mut StateCtx,
    standoff: &mut f32,
    relocate_timer: &mut f32,
    harass_timer: &mut f32,
) -> Option<AgentState> {
    let profile = ctx.profile;
    let Some(cfg) = profile.defense.as_ref() else {
        // Defense без конфига недостижим через engage; защитный отбой
        return Some(AgentState::patrol());
    };

    let Some(target) = ctx.target_alive() else {
        if ctx.target.is_none() {
            return None; // Цель ещё не заспавнена — держим позицию
        }
        return Some(AgentState::patrol()); // Цель мертва — отбой
    };

    // В бою сигналы awareness не нужны — потребляем молча
    ctx.awareness.alert = None;
    ctx.awareness.damaged_by = None;

    // Потеря line of sight → поиск
    if !ctx.sees_target() {
        let last = ctx.awareness.last_seen.unwrap_or(target.position);
        return Some(AgentState::lost_player(&profile.search, last));
    }
    ctx.awareness.last_seen = Some(target.position);

    // Цель в упор — melee-размен оправдан
    let distance = ctx.distance_to(target.position);
    if distance <= cfg.engage_range && profile.aggressive.is_some() {
        return Some(AgentState::aggressive());
    }

    // Удержание stand-off: перестановка по таймеру или при сходе с дистанции
    *relocate_timer -= ctx.dt;
    if *relocate_timer <= 0.0 || (distance - *standoff).abs() > cfg.standoff_slack {
        *relocate_timer = cfg.strafe_interval;
        let away = away_from(target.position, ctx.transform.translation);
        let strafe_angle = ctx.rng.gen_range(-0.7_f32..0.7);
        let dir = Quat::from_rotation_y(strafe_angle) * away;
        ctx.nav.set_destination(target.position + dir * *standoff);
    }
    ctx.nav.face = FacingIntent::At(target.position);

    // Ranged harassment: только лицом к цели
    *harass_timer -= ctx.dt;
    if *harass_timer <= 0.0 && ctx.facing_dot(target.position) >= cfg.harass_facing_min {
        *harass_timer = cfg.harass_interval;
        ctx.out.ranged.push(RangedAttackIntent {
            attacker: ctx.entity,
            target: target.entity,
        });
    }

    None
}

/// Горизонтальное направление от цели к агенту (куда отходить)
fn away_from(target: Vec3, me: Vec3) -> Vec3 {
    let delta = Vec3::new(me.x - target.x, 0.0, me.z - target.z);
    if delta.length_squared() < 1e-6 {
        Vec3::Z
    } else {
        delta.normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_away_from_direction() {
        let dir = away_from(Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0));
        assert!((dir - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn test_away_from_degenerate() {
        let dir = away_from(Vec3::ONE, Vec3::ONE);
        assert_eq!(dir, Vec3::Z);
    }
}
