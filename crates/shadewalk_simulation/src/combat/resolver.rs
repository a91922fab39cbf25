//! Melee resolver: hit-test удара и судейство исхода
//!
//! Чистая геометрия/логика без мутаций мира: melee-система вызывает
//! судейство на hit frame, урон уходит через DamageRequest/StealthKill.

use bevy::prelude::*;

use crate::components::PlayerPosture;

/// Блок засчитывается если жертва смотрит на атакующего:
/// dot(victim_fwd, направление на атакующего) ≥ порога
pub const BLOCK_FACING_MIN: f32 = 0.5;

/// Stealth kill: forwards атакующего и жертвы сонаправлены
/// (атакующий за спиной) не меньше порога
pub const STEALTH_FACING_MIN: f32 = 0.6;

/// Окно переката: dodge засчитан если перекат начат не раньше
/// этого времени до hit frame
pub const DODGE_WINDOW_SECS: f32 = 0.25;

/// Приёмник melee-ударов (child-collider entity)
///
/// Удар попадает в hurtbox, урон получает owner — разрешение
/// "коллайдер ребёнка → damageable родитель" в одном поле.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Hurtbox {
    pub owner: Entity,
}

/// Исход melee-удара по конкретной жертве
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeleeOutcome {
    /// Мгновенная смерть: незаметивший, атакован со спины крадущимся
    StealthKill,
    /// Перекат в окно удара: урона нет, можно запросить slow-motion
    Dodged,
    /// Блок лицом к атакующему: урон 0, block-reflect feedback
    Blocked,
    /// Обычное попадание лёгким уроном
    Hit(u32),
}

/// Точка оружия в момент удара
pub fn weapon_point(attacker_pos: Vec3, attacker_fwd: Vec3, reach: f32) -> Vec3 {
    attacker_pos + attacker_fwd * reach
}

/// Всё, что судейству нужно знать об ударе
#[derive(Debug, Clone, Copy)]
pub struct StrikeContext {
    pub attacker_pos: Vec3,
    pub attacker_fwd: Vec3,
    /// Posture атакующего, если это игрок (None для NPC)
    pub attacker_sneaking: bool,
    pub victim_pos: Vec3,
    pub victim_fwd: Vec3,
    /// Posture жертвы, если это игрок (None для NPC)
    pub victim_posture: Option<PlayerPosture>,
    pub damage: u32,
}

/// Судейство удара. Приоритет: stealth kill → dodge → block → hit.
pub fn judge_strike(ctx: &StrikeContext) -> MeleeOutcome {
    if judge_stealth_kill(ctx.attacker_sneaking, ctx.attacker_fwd, ctx.victim_fwd) {
        return MeleeOutcome::StealthKill;
    }

    if let Some(posture) = ctx.victim_posture {
        if judge_dodge(posture.dodging, posture.dodge_elapsed) {
            return MeleeOutcome::Dodged;
        }
        if judge_block(posture.blocking, ctx.victim_pos, ctx.victim_fwd, ctx.attacker_pos) {
            return MeleeOutcome::Blocked;
        }
    }

    MeleeOutcome::Hit(ctx.damage)
}

/// Stealth kill: атакующий крадётся и стоит за спиной жертвы
/// (forwards сонаправлены выше порога)
pub fn judge_stealth_kill(attacker_sneaking: bool, attacker_fwd: Vec3, victim_fwd: Vec3) -> bool {
    attacker_sneaking && attacker_fwd.dot(victim_fwd) > STEALTH_FACING_MIN
}

/// Блок: жертва блокирует И развёрнута к атакующему
pub fn judge_block(blocking: bool, victim_pos: Vec3, victim_fwd: Vec3, attacker_pos: Vec3) -> bool {
    if !blocking {
        return false;
    }
    let to_attacker = Vec3::new(
        attacker_pos.x - victim_pos.x,
        0.0,
        attacker_pos.z - victim_pos.z,
    );
    if to_attacker.length_squared() < 1e-6 {
        return true;
    }
    victim_fwd.dot(to_attacker.normalize()) >= BLOCK_FACING_MIN
}

/// Dodge: перекат начался внутри окна относительно hit frame
///
/// Проверка по полям "performing + elapsed" В МОМЕНТ удара — Aggressive
/// не подписывается на перекаты задним числом.
pub fn judge_dodge(dodging: bool, dodge_elapsed: f32) -> bool {
    dodging && dodge_elapsed <= DODGE_WINDOW_SECS
}
