//! Melee-атака: фазы замах → удар → восстановление
//!
//! Каденс атаки живёт в явных таймерах компонента (никаких suspended
//! wait'ов): фазовый таймер тикается раз в тик, hit frame — момент
//! перехода Windup → Strike, там и вызывается resolver.

use bevy::prelude::*;

use crate::combat::damage::{DamageKind, DamageRequest, KnockbackState, StealthKill};
use crate::combat::resolver::{self, Hurtbox, MeleeOutcome, StrikeContext};
use crate::combat::weapon::MeleeWeapon;
use crate::components::{Health, PlayerPosture};
use crate::cues::{AnimationCue, CueKind, SlowMotionRequested};

/// Фазы melee-атаки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum AttackPhase {
    /// Замах (телеграф, урона ещё нет)
    Windup,
    /// Окно удара (hit frame на входе в фазу)
    Strike,
    /// Восстановление (уязвим, не атакует)
    Recovery,
}

/// Текущая атака (висит на attacker'е от замаха до конца recovery)
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct MeleeAttackState {
    pub phase: AttackPhase,
    /// Остаток текущей фазы (секунды)
    pub timer: f32,
}

impl MeleeAttackState {
    pub fn windup(weapon: &MeleeWeapon) -> Self {
        Self {
            phase: AttackPhase::Windup,
            timer: weapon.windup_secs,
        }
    }
}

/// Интент melee-атаки (пишет Aggressive state или input layer игрока)
#[derive(Event, Debug, Clone)]
pub struct MeleeAttackIntent {
    pub attacker: Entity,
}

/// Система: старт атак из интентов
///
/// Отбрасывает интенты, если attacker уже атакует, в knockback'е,
/// мёртв или cooldown не готов.
pub fn start_melee_attacks(
    mut intents: EventReader<MeleeAttackIntent>,
    mut ready: Query<
        (&mut MeleeWeapon, &Health),
        (Without<MeleeAttackState>, Without<KnockbackState>),
    >,
    mut cues: EventWriter<AnimationCue>,
    mut commands: Commands,
) {
    for intent in intents.read() {
        let Ok((mut weapon, health)) = ready.get_mut(intent.attacker) else {
            continue;
        };
        if !health.is_alive() || !weapon.can_swing() {
            continue;
        }

        commands
            .entity(intent.attacker)
            .insert(MeleeAttackState::windup(&weapon));
        weapon.start_cooldown();
        cues.write(AnimationCue {
            entity: intent.attacker,
            kind: CueKind::AttackWindup,
        });

        crate::log(&format!(
            "⚔️ Melee windup: {:?} ({:.2}s)",
            intent.attacker, weapon.windup_secs
        ));
    }
}

/// Система: фазы атаки + разрешение удара на hit frame
///
/// Windup → Strike: cue + hit-test по hurtbox'ам, судейство исхода,
/// урон через DamageRequest/StealthKill. Recovery истекло → снимаем
/// компонент, attacker снова свободен.
pub fn update_melee_attack_phases(
    mut attacks: Query<(
        Entity,
        &mut MeleeAttackState,
        &MeleeWeapon,
        &Transform,
        Option<&PlayerPosture>,
    )>,
    hurtboxes: Query<&Hurtbox>,
    victims: Query<(&Transform, &Health, Option<&PlayerPosture>)>,
    time: Res<Time<Fixed>>,
    mut damage: EventWriter<DamageRequest>,
    mut stealth: EventWriter<StealthKill>,
    mut slowmo: EventWriter<SlowMotionRequested>,
    mut cues: EventWriter<AnimationCue>,
    mut commands: Commands,
) {
    let delta = time.delta_secs();

    for (attacker, mut attack, weapon, attacker_tf, attacker_posture) in attacks.iter_mut() {
        attack.timer -= delta;
        if attack.timer > 0.0 {
            continue;
        }

        match attack.phase {
            AttackPhase::Windup => {
                attack.phase = AttackPhase::Strike;
                attack.timer = weapon.strike_secs;
                cues.write(AnimationCue {
                    entity: attacker,
                    kind: CueKind::AttackSwing,
                });

                resolve_hit_frame(
                    attacker,
                    attacker_tf,
                    attacker_posture,
                    weapon,
                    &hurtboxes,
                    &victims,
                    &mut damage,
                    &mut stealth,
                    &mut slowmo,
                    &mut cues,
                );
            }
            AttackPhase::Strike => {
                attack.phase = AttackPhase::Recovery;
                attack.timer = weapon.recovery_secs;
            }
            AttackPhase::Recovery => {
                commands.entity(attacker).remove::<MeleeAttackState>();
            }
        }
    }
}

/// Hit frame: ближайший валидный damageable в overlap-сфере оружия
///
/// Попадание ищем по hurtbox'ам; урон получает owner hurtbox'а
/// (разрешение child-collider → родитель). Мёртвые и сам attacker
/// отбрасываются.
#[allow(clippy::too_many_arguments)]
fn resolve_hit_frame(
    attacker: Entity,
    attacker_tf: &Transform,
    attacker_posture: Option<&PlayerPosture>,
    weapon: &MeleeWeapon,
    hurtboxes: &Query<&Hurtbox>,
    victims: &Query<(&Transform, &Health, Option<&PlayerPosture>)>,
    damage: &mut EventWriter<DamageRequest>,
    stealth: &mut EventWriter<StealthKill>,
    slowmo: &mut EventWriter<SlowMotionRequested>,
    cues: &mut EventWriter<AnimationCue>,
) {
    let attacker_fwd = *attacker_tf.forward();
    let strike_point = resolver::weapon_point(attacker_tf.translation, attacker_fwd, weapon.reach);

    // Ближайшая валидная жертва в радиусе удара
    let mut nearest: Option<(Entity, f32)> = None;
    for hurtbox in hurtboxes.iter() {
        if hurtbox.owner == attacker {
            continue;
        }
        let Ok((victim_tf, victim_health, _)) = victims.get(hurtbox.owner) else {
            continue;
        };
        if !victim_health.is_alive() {
            continue;
        }
        let distance = strike_point.distance(victim_tf.translation);
        if distance > weapon.strike_radius {
            continue;
        }
        let closer = nearest.map(|(_, d)| distance < d).unwrap_or(true);
        if closer {
            nearest = Some((hurtbox.owner, distance));
        }
    }

    let Some((victim, _)) = nearest else {
        return; // Промах — только анимация
    };
    let Ok((victim_tf, _, victim_posture)) = victims.get(victim) else {
        return;
    };

    let ctx = StrikeContext {
        attacker_pos: attacker_tf.translation,
        attacker_fwd,
        attacker_sneaking: attacker_posture.map(|p| p.sneaking).unwrap_or(false),
        victim_pos: victim_tf.translation,
        victim_fwd: *victim_tf.forward(),
        victim_posture: victim_posture.copied(),
        damage: weapon.damage,
    };

    match resolver::judge_strike(&ctx) {
        MeleeOutcome::StealthKill => {
            stealth.write(StealthKill {
                attacker,
                target: victim,
            });
        }
        MeleeOutcome::Dodged => {
            slowmo.write(SlowMotionRequested {
                attacker,
                dodger: victim,
            });
            crate::log(&format!("🤸 Dodged: {:?} evaded {:?}", victim, attacker));
        }
        MeleeOutcome::Blocked => {
            damage.write(DamageRequest {
                attacker,
                target: victim,
                amount: 0,
                kind: DamageKind::BlockReflect,
            });
            cues.write(AnimationCue {
                entity: victim,
                kind: CueKind::BlockReflected,
            });
        }
        MeleeOutcome::Hit(amount) => {
            damage.write(DamageRequest {
                attacker,
                target: victim,
                amount,
                kind: DamageKind::Melee,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windup_phase_from_weapon() {
        let weapon = MeleeWeapon::guard_blade();
        let attack = MeleeAttackState::windup(&weapon);
        assert_eq!(attack.phase, AttackPhase::Windup);
        assert_eq!(attack.timer, weapon.windup_secs);
    }

    #[test]
    fn test_phase_order() {
        // Фазовый порядок фиксирован: Windup → Strike → Recovery
        let weapon = MeleeWeapon::guard_blade();
        let mut attack = MeleeAttackState::windup(&weapon);

        attack.timer = 0.0;
        attack.phase = AttackPhase::Strike;
        assert_ne!(attack.phase, AttackPhase::Windup);
    }
}
