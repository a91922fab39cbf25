//! Combat подсистема
//!
//! ECS ответственность:
//! - Game state: Health, оружие, фазы атак, knockback
//! - Combat rules: судейство (block/dodge/stealth kill), damage-вход
//! - События: DamageDealt, EntityDied, LootDropRequested
//!
//! Внешние слои: анимация swing'а, VFX попаданий, slow-motion —
//! получают AnimationCue / SlowMotionRequested и ничего не возвращают.

use bevy::prelude::*;

pub mod damage;
pub mod melee;
pub mod ranged;
pub mod resolver;
pub mod weapon;

// Re-export основных типов
pub use damage::{
    apply_damage, DamageDealt, DamageKind, DamageRequest, Dead, DespawnAfter, EntityDied,
    KnockbackState, LootDropRequested, StealthKill, KNOCKBACK_SECS, KNOCKBACK_SPEED,
};
pub use melee::{AttackPhase, MeleeAttackIntent, MeleeAttackState};
pub use ranged::RangedAttackIntent;
pub use resolver::{Hurtbox, MeleeOutcome, StrikeContext};
pub use weapon::{MeleeWeapon, RangedAttack};

use crate::SimSet;

/// Combat Plugin
///
/// Порядок внутри тика:
/// - Act: старт атак из интентов → фазы/hit frame → harass-выстрелы →
///   тик cooldown'ов
/// - Resolve: применение урона (один вход) → тик knockback'ов →
///   отложенный despawn мёртвых
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<MeleeAttackIntent>()
            .add_event::<RangedAttackIntent>()
            .add_event::<DamageRequest>()
            .add_event::<StealthKill>()
            .add_event::<DamageDealt>()
            .add_event::<EntityDied>()
            .add_event::<LootDropRequested>();

        // После интегратора навигации: удары резолвятся по свежим позициям
        app.add_systems(
            FixedUpdate,
            (
                melee::start_melee_attacks,
                melee::update_melee_attack_phases,
                ranged::fire_ranged_attacks,
                weapon::tick_weapon_cooldowns,
            )
                .chain()
                .in_set(SimSet::Act)
                .after(crate::nav::drive_nav_agents),
        );

        app.add_systems(
            FixedUpdate,
            (
                damage::apply_damage,
                damage::update_knockbacks,
                damage::despawn_after_timeout,
            )
                .chain()
                .in_set(SimSet::Resolve),
        );
    }
}
