//! Fire-and-forget сигналы внешним слоям (анимация, звук, камера)
//!
//! Ядро пишет события и не ждёт ответа; слои движка читают их как хотят.

use bevy::prelude::*;

/// Дискретный триггер анимации/звука
#[derive(Event, Debug, Clone, Copy)]
pub struct AnimationCue {
    pub entity: Entity,
    pub kind: CueKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueKind {
    /// Замах melee-атаки (телеграф)
    AttackWindup,
    /// Удар (hit frame)
    AttackSwing,
    /// Удар принят в блок (искры/звон, урона нет)
    BlockReflected,
    /// Агент заметил цель
    Alerted,
    /// Агент ослеплён
    Blinded,
    /// Смерть (коллапс)
    DeathCollapse,
    /// Выстрел harass-атаки
    RangedShot,
}

/// Перекат в окно удара — внешний слой может включить slow-motion
#[derive(Event, Debug, Clone, Copy)]
pub struct SlowMotionRequested {
    pub attacker: Entity,
    pub dodger: Entity,
}
