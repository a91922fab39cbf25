//! Awareness blackboard: централизованная доставка сигналов в states
//!
//! Вместо подписки/отписки обработчиков на каждом OnEnter/OnExit — одна
//! таблица флагов на агента. Реакционные системы пишут флаги, активный
//! state опрашивает и сбрасывает на своём тике. Двойных подписок и
//! утечек обработчиков нет по построению.

use bevy::prelude::*;

use crate::combat::{DamageDealt, DamageKind};
use crate::components::Agent;

/// Сигнальная доска агента (пишут системы реакции, читают states)
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct Awareness {
    /// Ally alert: последняя известная позиция цели
    pub alert: Option<Vec3>,
    /// Услышанный шум (origin)
    pub noise: Option<Vec3>,
    /// Память о полученном уроне
    pub damaged_by: Option<DamageMemory>,
    /// Последняя позиция, где state видел цель
    pub last_seen: Option<Vec3>,
    /// Ослепление ожидает применения (длительность)
    pub blind_pending: Option<f32>,
}

/// Кто и откуда нас ударил
#[derive(Debug, Clone, Copy, Reflect)]
pub struct DamageMemory {
    pub attacker: Entity,
    /// Позиция атакующего в момент удара
    pub position: Vec3,
    /// Удар был melee (важно для летальности в слепоте)
    pub melee: bool,
}

/// Громкий шум в мире (шаги, бросок предмета, выстрел)
#[derive(Event, Debug, Clone)]
pub struct NoiseEvent {
    pub position: Vec3,
    /// Радиус слышимости
    pub radius: f32,
}

/// Агент ослеплён внешним эффектом (flash-предмет игрока)
#[derive(Event, Debug, Clone)]
pub struct BlindedEvent {
    pub target: Entity,
    pub duration: f32,
}

/// Система: слышим шумы в радиусе
pub fn hear_noises(
    mut noises: EventReader<NoiseEvent>,
    mut listeners: Query<(&Transform, &mut Awareness), With<Agent>>,
) {
    for noise in noises.read() {
        for (transform, mut awareness) in listeners.iter_mut() {
            let distance = transform.translation.distance(noise.position);
            if distance > noise.radius {
                continue;
            }
            awareness.noise = Some(noise.position);
        }
    }
}

/// Система: запоминаем полученный урон
///
/// BlockReflect (урон 0) память не оставляет — это feedback, не попадание.
pub fn remember_damage(
    mut hits: EventReader<DamageDealt>,
    attackers: Query<&Transform>,
    mut victims: Query<&mut Awareness, With<Agent>>,
) {
    for hit in hits.read() {
        if hit.kind == DamageKind::BlockReflect {
            continue;
        }
        let Ok(mut awareness) = victims.get_mut(hit.target) else {
            continue; // Жертва — игрок или уже despawned
        };
        let position = attackers
            .get(hit.attacker)
            .map(|tf| tf.translation)
            .unwrap_or_default();

        awareness.damaged_by = Some(DamageMemory {
            attacker: hit.attacker,
            position,
            melee: hit.kind == DamageKind::Melee,
        });
    }
}

/// Система: отметить ослепление (переход выполнит FSM на границе тика)
pub fn apply_blindness(
    mut events: EventReader<BlindedEvent>,
    mut victims: Query<&mut Awareness, With<Agent>>,
) {
    for event in events.read() {
        if let Ok(mut awareness) = victims.get_mut(event.target) {
            awareness.blind_pending = Some(event.duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_awareness_starts_clean() {
        let awareness = Awareness::default();
        assert!(awareness.alert.is_none());
        assert!(awareness.noise.is_none());
        assert!(awareness.damaged_by.is_none());
        assert!(awareness.last_seen.is_none());
        assert!(awareness.blind_pending.is_none());
    }

    #[test]
    fn test_damage_memory_flags() {
        let memory = DamageMemory {
            attacker: Entity::PLACEHOLDER,
            position: Vec3::ONE,
            melee: true,
        };
        assert!(memory.melee);
    }
}
