//! Alert Propagator: "цель обнаружена" для одно-фракционных соседей
//!
//! One-shot и нерекурсивно: получатель только ставит флаг в Awareness,
//! сам ре-broadcast не делает — alert-штормов нет.

use bevy::prelude::*;

use crate::ai::Awareness;
use crate::components::Agent;

/// Радиус broadcast'а по умолчанию
pub const ALERT_RADIUS: f32 = 20.0;

/// Broadcast "я вижу цель" (пишет обнаруживший state)
#[derive(Event, Debug, Clone)]
pub struct AlertEvent {
    pub origin: Entity,
    /// Позиция отправителя (от неё меряется радиус)
    pub origin_pos: Vec3,
    /// Фракция отправителя (слышат только свои)
    pub faction_id: u64,
    /// Последняя известная позиция цели
    pub target_pos: Vec3,
    pub radius: f32,
}

/// Система: разослать alert одно-фракционным агентам в радиусе
pub fn propagate_alerts(
    mut alerts: EventReader<AlertEvent>,
    mut receivers: Query<(Entity, &Agent, &Transform, &mut Awareness)>,
) {
    for alert in alerts.read() {
        for (entity, agent, transform, mut awareness) in receivers.iter_mut() {
            if entity == alert.origin {
                continue;
            }
            if agent.faction_id != alert.faction_id {
                continue;
            }
            if transform.translation.distance(alert.origin_pos) > alert.radius {
                continue;
            }

            awareness.alert = Some(alert.target_pos);
            crate::log(&format!(
                "📢 Alert: {:?} → {:?} (faction {}, target at {:?})",
                alert.origin, entity, alert.faction_id, alert.target_pos
            ));
        }
    }
}
