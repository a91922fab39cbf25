//! Read-only интерфейс цели (игрока) для AI
//!
//! Симуляция НЕ управляет игроком: transform, health и posture-флаги
//! пишет внешний контроллер (input layer движка), AI их только читает.

use bevy::prelude::*;

/// Marker цели. Автоматически тянет Health и posture.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(crate::components::Health, PlayerPosture)]
pub struct Player;

/// Stealth/combat posture игрока (пишет внешний input layer)
///
/// `dodge_elapsed` — секунды с начала текущего переката; валиден
/// только пока `dodging == true`. Resolver сверяет его с dodge-окном
/// атаки В МОМЕНТ strike-кадра, а не подпиской задним числом.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct PlayerPosture {
    /// Крадётся (walking posture) — условие stealth kill
    pub sneaking: bool,
    /// Держит блок
    pub blocking: bool,
    /// Выполняет перекат
    pub dodging: bool,
    /// Сколько секунд длится текущий перекат
    pub dodge_elapsed: f32,
    /// Прижат к стене (уменьшает условия обнаружения)
    pub wall_hugging: bool,
}

impl Default for PlayerPosture {
    fn default() -> Self {
        Self {
            sneaking: false,
            blocking: false,
            dodging: false,
            dodge_elapsed: 0.0,
            wall_hugging: false,
        }
    }
}

impl PlayerPosture {
    pub fn sneaking() -> Self {
        Self {
            sneaking: true,
            ..Self::default()
        }
    }
}
