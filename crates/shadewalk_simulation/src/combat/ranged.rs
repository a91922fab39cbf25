//! Harass-выстрел из Defense: hitscan с валидацией дальности и LOS
//!
//! Полёт снаряда и VFX — внешние слои; ядро проводит урон через общий
//! damage-вход и шлёт RangedShot cue.

use bevy::prelude::*;

use crate::combat::damage::{DamageKind, DamageRequest};
use crate::combat::weapon::RangedAttack;
use crate::components::Health;
use crate::cues::{AnimationCue, CueKind};
use crate::spatial::{layers, WorldGeometry};

/// Интент harass-выстрела (пишет Defense state)
#[derive(Event, Debug, Clone)]
pub struct RangedAttackIntent {
    pub attacker: Entity,
    pub target: Entity,
}

/// Система: валидация и исполнение harass-выстрелов
///
/// Интент отбрасывается молча, если стрелок не готов (cooldown),
/// цель вне дальности, мертва или перекрыта стеной.
pub fn fire_ranged_attacks(
    mut intents: EventReader<RangedAttackIntent>,
    mut shooters: Query<(&Transform, &mut RangedAttack)>,
    targets: Query<(&Transform, &Health)>,
    geometry: Res<WorldGeometry>,
    mut damage: EventWriter<DamageRequest>,
    mut cues: EventWriter<AnimationCue>,
) {
    for intent in intents.read() {
        let Ok((shooter_tf, mut weapon)) = shooters.get_mut(intent.attacker) else {
            continue;
        };
        if !weapon.ready() {
            continue;
        }
        let Ok((target_tf, target_health)) = targets.get(intent.target) else {
            continue;
        };
        if !target_health.is_alive() {
            continue;
        }

        let distance = shooter_tf.translation.distance(target_tf.translation);
        if distance > weapon.range {
            continue;
        }
        if geometry.occluded(
            shooter_tf.translation,
            target_tf.translation,
            layers::SIGHT_BLOCKERS,
        ) {
            continue;
        }

        weapon.start_cooldown();
        cues.write(AnimationCue {
            entity: intent.attacker,
            kind: CueKind::RangedShot,
        });
        damage.write(DamageRequest {
            attacker: intent.attacker,
            target: intent.target,
            amount: weapon.damage,
            kind: DamageKind::Ranged,
        });

        crate::log(&format!(
            "🔫 Harass shot: {:?} → {:?} ({:.1}m)",
            intent.attacker, intent.target, distance
        ));
    }
}
