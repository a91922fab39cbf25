//! Pathfinding Agent Facade
//!
//! Архитектура:
//! - State пишет в NavAgent high-level intent (destination/speed/facing)
//! - Внешний pathfinder движка читает NavAgent и ведёт тело по navmesh
//! - Для headless прогонов и тестов крейт несёт reference-интегратор:
//!   прямолинейное движение + доворот по yaw в FixedUpdate
//!
//! Владение: destination/speed пишет ТОЛЬКО активный state агента;
//! на время knockback движение целиком забирает KnockbackState.

use bevy::prelude::*;

use crate::combat::KnockbackState;
use crate::SimSet;

/// Фасад навигационного агента (контракт внешнего pathfinder'а)
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct NavAgent {
    /// Куда идём (None = стоим)
    destination: Option<Vec3>,
    /// Навигация на паузе (stop/resume)
    paused: bool,
    /// Крейсерская скорость (м/с), пишет активный state
    pub speed: f32,
    /// Фактическая скорость за последний тик (пишет интегратор)
    pub velocity: Vec3,
    /// Остаток пути по прямой (пишет интегратор)
    remaining: f32,
    /// Куда смотреть (доворот выполняет интегратор)
    pub face: FacingIntent,
    /// Скорость доворота (рад/с)
    pub turn_speed: f32,
}

impl Default for NavAgent {
    fn default() -> Self {
        Self {
            destination: None,
            paused: false,
            speed: 2.0, // базовая скорость ходьбы
            velocity: Vec3::ZERO,
            remaining: f32::INFINITY,
            face: FacingIntent::Movement,
            turn_speed: 8.0,
        }
    }
}

/// Интент ориентации агента
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum FacingIntent {
    /// Смотреть по направлению движения
    Movement,
    /// Смотреть на точку (бой: лицом к цели)
    At(Vec3),
    /// Не доворачивать
    Hold,
}

impl NavAgent {
    /// Фасад с заданной крейсерской скоростью (остальное по умолчанию)
    pub fn with_speed(speed: f32) -> Self {
        Self {
            speed,
            ..Self::default()
        }
    }

    pub fn set_destination(&mut self, point: Vec3) {
        if self.destination != Some(point) {
            self.destination = Some(point);
            self.remaining = f32::INFINITY;
        }
    }

    pub fn clear_destination(&mut self) {
        self.destination = None;
        self.velocity = Vec3::ZERO;
        self.remaining = f32::INFINITY;
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    /// Остановить движение (destination сохраняется)
    pub fn stop(&mut self) {
        self.paused = true;
        self.velocity = Vec3::ZERO;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Остаток пути; INFINITY пока destination не задан или путь не посчитан
    pub fn remaining_distance(&self) -> f32 {
        if self.destination.is_none() {
            f32::INFINITY
        } else {
            self.remaining
        }
    }

    pub fn arrived(&self, threshold: f32) -> bool {
        self.destination.is_some() && self.remaining <= threshold
    }
}

/// Reference-интегратор: движение к destination + доворот по yaw
///
/// Внешний pathfinder заменяет эту систему целиком; контракт NavAgent
/// (destination/stop/resume/remaining/velocity) остаётся тем же.
pub fn drive_nav_agents(
    mut agents: Query<(&mut NavAgent, &mut Transform, Option<&KnockbackState>)>,
    time: Res<Time<Fixed>>,
) {
    let dt = time.delta_secs();

    for (mut nav, mut transform, knockback) in agents.iter_mut() {
        // Knockback владеет движением целиком: навигация не ведёт и не доворачивает
        if let Some(push) = knockback {
            let shove = push.direction * push.speed * dt;
            transform.translation += shove;
            nav.velocity = push.direction * push.speed;
            continue;
        }

        // Движение
        if nav.paused || nav.destination.is_none() {
            nav.velocity = Vec3::ZERO;
        } else if let Some(destination) = nav.destination {
            let to_dest = destination - transform.translation;
            let distance = to_dest.length();

            if distance <= ARRIVE_EPSILON {
                nav.velocity = Vec3::ZERO;
                nav.remaining = 0.0;
            } else {
                let step = (nav.speed * dt).min(distance);
                let dir = to_dest / distance;
                transform.translation += dir * step;
                nav.velocity = dir * nav.speed;
                nav.remaining = distance - step;
            }
        }

        // Доворот
        let face_dir = match nav.face {
            FacingIntent::Movement => {
                let flat = Vec3::new(nav.velocity.x, 0.0, nav.velocity.z);
                (flat.length_squared() > 1e-6).then(|| flat.normalize())
            }
            FacingIntent::At(point) => {
                let flat = Vec3::new(
                    point.x - transform.translation.x,
                    0.0,
                    point.z - transform.translation.z,
                );
                (flat.length_squared() > 1e-6).then(|| flat.normalize())
            }
            FacingIntent::Hold => None,
        };

        if let Some(dir) = face_dir {
            let target_yaw = yaw_of(dir);
            let current_yaw = yaw_of(*transform.forward());
            let new_yaw = turn_towards(current_yaw, target_yaw, nav.turn_speed * dt);
            transform.rotation = Quat::from_rotation_y(new_yaw);
        }
    }
}

/// Порог прибытия (совпадает с waypoint-порогом патруля)
pub const ARRIVE_EPSILON: f32 = 0.25;

/// Yaw направления (forward = -Z при yaw 0)
pub fn yaw_of(dir: Vec3) -> f32 {
    (-dir.x).atan2(-dir.z)
}

/// Кратчайший доворот current → target, не быстрее max_step за тик
fn turn_towards(current: f32, target: f32, max_step: f32) -> f32 {
    let mut diff = target - current;
    // Нормализация в [-PI, PI]
    while diff > std::f32::consts::PI {
        diff -= std::f32::consts::TAU;
    }
    while diff < -std::f32::consts::PI {
        diff += std::f32::consts::TAU;
    }
    current + diff.clamp(-max_step, max_step)
}

/// Plugin reference-интегратора (Act-фаза, после решений FSM)
pub struct NavPlugin;

impl Plugin for NavPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, drive_nav_agents.in_set(SimSet::Act));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_and_remaining() {
        let mut nav = NavAgent::default();
        assert_eq!(nav.remaining_distance(), f32::INFINITY);

        nav.set_destination(Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(nav.destination(), Some(Vec3::new(10.0, 0.0, 0.0)));
        // Пока интегратор не прошёлся — остаток неизвестен
        assert_eq!(nav.remaining_distance(), f32::INFINITY);

        nav.clear_destination();
        assert_eq!(nav.remaining_distance(), f32::INFINITY);
    }

    #[test]
    fn test_stop_resume() {
        let mut nav = NavAgent::default();
        nav.set_destination(Vec3::X);
        nav.stop();
        assert!(nav.is_paused());
        assert_eq!(nav.velocity, Vec3::ZERO);
        // Destination переживает паузу
        assert_eq!(nav.destination(), Some(Vec3::X));
        nav.resume();
        assert!(!nav.is_paused());
    }

    #[test]
    fn test_yaw_convention() {
        // forward -Z → yaw 0
        assert!(yaw_of(-Vec3::Z).abs() < 1e-6);
        // forward +X → yaw -PI/2
        assert!((yaw_of(Vec3::X) + std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_turn_towards_clamps() {
        let stepped = turn_towards(0.0, 1.0, 0.25);
        assert!((stepped - 0.25).abs() < 1e-6);
        // Кратчайшая дуга через -PI
        let wrapped = turn_towards(3.0, -3.0, 10.0);
        assert!((wrapped - (3.0 + (std::f32::consts::TAU - 6.0))).abs() < 1e-4);
    }
}
