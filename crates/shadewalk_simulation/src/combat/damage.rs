//! Применение урона: единственная точка мутации Health
//!
//! Resolver и ranged-система не трогают Health напрямую — они пишут
//! DamageRequest/StealthKill события, а apply_damage сериализует все
//! мутации за тик (никакого double-counting одновременных попаданий).

use bevy::prelude::*;

use crate::components::Health;
use crate::nav::NavAgent;

/// Вид урона (для UI/VFX и для реакций AI)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum DamageKind {
    Melee,
    Ranged,
    /// Удар принят в блок: урон 0, только feedback
    BlockReflect,
    None,
}

/// Запрос на урон (пишут resolver / ranged)
#[derive(Event, Debug, Clone)]
pub struct DamageRequest {
    pub attacker: Entity,
    pub target: Entity,
    pub amount: u32,
    pub kind: DamageKind,
}

/// Запрос stealth kill: мимо damage-математики, сразу летально
#[derive(Event, Debug, Clone)]
pub struct StealthKill {
    pub attacker: Entity,
    pub target: Entity,
}

/// Урон применён (UI health bar, звуки, реакции AI)
#[derive(Event, Debug, Clone)]
pub struct DamageDealt {
    pub attacker: Entity,
    pub target: Entity,
    pub amount: u32,
    pub kind: DamageKind,
    pub lethal: bool,
}

/// Entity умер (health == 0)
#[derive(Event, Debug, Clone)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Запрос спавна лута на месте убитого (внешний collaborator)
#[derive(Event, Debug, Clone)]
pub struct LootDropRequested {
    pub position: Vec3,
}

/// Маркер: entity мертво (ставит Death state при входе)
#[derive(Component, Debug, Default, Reflect)]
#[reflect(Component)]
pub struct Dead;

/// Отложенный despawn (death-sequence delay)
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct DespawnAfter {
    pub remaining: f32,
}

impl DespawnAfter {
    pub fn new(secs: f32) -> Self {
        Self { remaining: secs }
    }
}

/// Knockback: принудительный сдвиг от атакующего, владеет движением
///
/// Пока компонент висит на entity, навигация не двигает и не доворачивает
/// тело (см. nav::drive_nav_agents); по истечении нав. возобновляется.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct KnockbackState {
    /// Направление сдвига (от атакующего к жертве, normalized)
    pub direction: Vec3,
    /// Скорость сдвига (м/с)
    pub speed: f32,
    /// Сколько осталось (секунды)
    pub remaining: f32,
}

/// Длительность knockback (секунды)
pub const KNOCKBACK_SECS: f32 = 0.25;
/// Скорость knockback-сдвига (м/с)
pub const KNOCKBACK_SPEED: f32 = 4.0;

impl KnockbackState {
    /// Knockback от позиции атакующего к жертве
    pub fn away_from(attacker_pos: Vec3, victim_pos: Vec3) -> Self {
        let flat = Vec3::new(
            victim_pos.x - attacker_pos.x,
            0.0,
            victim_pos.z - attacker_pos.z,
        );
        let direction = if flat.length_squared() > 1e-6 {
            flat.normalize()
        } else {
            Vec3::ZERO
        };
        Self {
            direction,
            speed: KNOCKBACK_SPEED,
            remaining: KNOCKBACK_SECS,
        }
    }
}

/// Система: применение урона (единственный вход мутации Health)
///
/// 1. StealthKill → Health::kill, события, без knockback
/// 2. DamageRequest → take_damage, события, knockback жертве
///
/// Жертва без Health (despawned, декорация) молча пропускается.
pub fn apply_damage(
    mut stealth_kills: EventReader<StealthKill>,
    mut requests: EventReader<DamageRequest>,
    mut healths: Query<&mut Health>,
    mut navs: Query<&mut NavAgent>,
    transforms: Query<&Transform>,
    mut dealt: EventWriter<DamageDealt>,
    mut died: EventWriter<EntityDied>,
    mut commands: Commands,
) {
    for kill in stealth_kills.read() {
        let Ok(mut health) = healths.get_mut(kill.target) else {
            continue;
        };
        if !health.is_alive() {
            continue;
        }
        let amount = health.current;
        health.kill();

        dealt.write(DamageDealt {
            attacker: kill.attacker,
            target: kill.target,
            amount,
            kind: DamageKind::Melee,
            lethal: true,
        });
        died.write(EntityDied {
            entity: kill.target,
            killer: Some(kill.attacker),
        });
        crate::log_info(&format!(
            "🗡️ Stealth kill: {:?} → {:?}",
            kill.attacker, kill.target
        ));
    }

    for request in requests.read() {
        let Ok(mut health) = healths.get_mut(request.target) else {
            continue;
        };
        if !health.is_alive() {
            continue;
        }

        let was_alive = health.is_alive();
        health.take_damage(request.amount);
        let lethal = was_alive && !health.is_alive();

        dealt.write(DamageDealt {
            attacker: request.attacker,
            target: request.target,
            amount: request.amount,
            kind: request.kind,
            lethal,
        });
        if lethal {
            died.write(EntityDied {
                entity: request.target,
                killer: Some(request.attacker),
            });
        }

        // Knockback на любой ненулевой урон: движение забираем сразу
        if request.amount > 0 {
            if let (Ok(attacker_tf), Ok(victim_tf)) = (
                transforms.get(request.attacker),
                transforms.get(request.target),
            ) {
                commands.entity(request.target).insert(KnockbackState::away_from(
                    attacker_tf.translation,
                    victim_tf.translation,
                ));
                if let Ok(mut nav) = navs.get_mut(request.target) {
                    nav.stop();
                }
            }
        }

        crate::log(&format!(
            "💥 Damage {:?}: {:?} → {:?} ({} dmg, lethal: {})",
            request.kind, request.attacker, request.target, request.amount, lethal
        ));
    }
}

/// Система: тик knockback'ов, возврат движения навигации
pub fn update_knockbacks(
    mut knocked: Query<(Entity, &mut KnockbackState, Option<&mut NavAgent>)>,
    time: Res<Time<Fixed>>,
    mut commands: Commands,
) {
    let delta = time.delta_secs();

    for (entity, mut knockback, nav) in knocked.iter_mut() {
        knockback.remaining -= delta;
        if knockback.remaining <= 0.0 {
            commands.entity(entity).remove::<KnockbackState>();
            if let Some(mut nav) = nav {
                nav.resume();
            }
        }
    }
}

/// Система: отложенный despawn мёртвых + запрос лута
///
/// Вместе с телом убираем его hurtbox-приёмники.
pub fn despawn_after_timeout(
    mut pending: Query<(Entity, &mut DespawnAfter, &Transform)>,
    hurtboxes: Query<(Entity, &crate::combat::Hurtbox)>,
    time: Res<Time<Fixed>>,
    mut loot: EventWriter<LootDropRequested>,
    mut commands: Commands,
) {
    let delta = time.delta_secs();

    for (entity, mut timer, transform) in pending.iter_mut() {
        timer.remaining -= delta;
        if timer.remaining <= 0.0 {
            loot.write(LootDropRequested {
                position: transform.translation,
            });
            for (hurtbox_entity, hurtbox) in hurtboxes.iter() {
                if hurtbox.owner == entity {
                    commands.entity(hurtbox_entity).despawn();
                }
            }
            commands.entity(entity).despawn();
            crate::log_info(&format!("⚰️ Removed dead entity {:?}", entity));
        }
    }
}
