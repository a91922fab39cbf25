//! Базовые компоненты агента: Agent, Health

use bevy::prelude::*;

/// Агент (враждебный NPC) — aggregate root живого противника
///
/// Автоматически добавляет Health, Awareness и NavAgent через Required Components.
/// StateMachine не required: его собирает `spawn_agent` из AiProfile.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(Health, crate::ai::Awareness, crate::nav::NavAgent)]
pub struct Agent {
    /// Stable ID фракции (alert'ы слышат только одно-фракционники)
    pub faction_id: u64,
    /// Текущая цель (игрок); None пока цель не заспавнена/не найдена
    pub target: Option<Entity>,
}

impl Agent {
    pub fn new(faction_id: u64) -> Self {
        Self {
            faction_id,
            target: None,
        }
    }
}

/// Здоровье агента
///
/// Инвариант: 0 ≤ current ≤ max.
/// Мутация только через combat::apply_damage (один вход, без double-counting).
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    /// Мгновенная смерть (stealth kill) — мимо обычной damage-математики
    pub fn kill(&mut self) {
        self.current = 0;
    }
}
