//! Маршрут патруля: упорядоченные точки с ожиданием, циклический обход

use bevy::prelude::*;

/// Точка маршрута: позиция + ориентация на месте + пауза
#[derive(Debug, Clone, Copy, Reflect)]
pub struct PatrolPoint {
    pub position: Vec3,
    /// Yaw (радианы), в который агент довернётся стоя на точке
    pub face_yaw: f32,
    /// Сколько секунд стоять на точке перед следующей
    pub wait_secs: f32,
}

impl PatrolPoint {
    pub fn new(position: Vec3, wait_secs: f32) -> Self {
        Self {
            position,
            face_yaw: 0.0,
            wait_secs,
        }
    }
}

/// Последовательность точек патруля, обходится по кругу
///
/// Инварианты:
/// - index всегда в границах points (если points непуст)
/// - advance никогда не уходит в минус и не выходит за len-1
/// - одноточечный маршрут перенацеливается на ту же точку (idempotent)
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct PatrolRoute {
    pub points: Vec<PatrolPoint>,
    pub index: usize,
}

impl PatrolRoute {
    pub fn new(points: Vec<PatrolPoint>) -> Self {
        Self { points, index: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Текущая точка маршрута (None для пустого маршрута)
    pub fn current(&self) -> Option<&PatrolPoint> {
        self.points.get(self.index)
    }

    /// Сдвиг на следующую точку, с wrap last → 0
    pub fn advance(&mut self) {
        if self.points.is_empty() {
            return;
        }
        self.index = (self.index + 1) % self.points.len();
    }
}
