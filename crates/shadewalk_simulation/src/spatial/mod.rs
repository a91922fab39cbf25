//! Пространственный слой: collision layers, статическая геометрия, raycast
//!
//! Rapier используем как словарь коллизий (RigidBody/Collider/CollisionGroups
//! на entity), но сами queries (occlusion ray для зрения) считаем закрытой
//! формой по AABB-препятствиям — детерминированно и без physics step.

use bevy::prelude::*;
use bevy_rapier3d::prelude::{CollisionGroups, Group};

/// Collision layers мира (Group bitmask, общий словарь с rapier)
pub mod layers {
    use super::Group;

    /// Статическая геометрия уровня (стены, ящики)
    pub const WORLD: Group = Group::GROUP_1;
    /// Тела агентов
    pub const AGENT: Group = Group::GROUP_2;
    /// Тело игрока
    pub const PLAYER: Group = Group::GROUP_3;
    /// Hurtbox'ы (приёмники melee-ударов)
    pub const HURTBOX: Group = Group::GROUP_4;

    /// Маска occlusion для зрения: видимость перекрывают только стены
    pub const SIGHT_BLOCKERS: Group = WORLD;
}

/// CollisionGroups для тела агента (агенты коллайдят со стенами и друг другом)
pub fn agent_groups() -> CollisionGroups {
    CollisionGroups::new(layers::AGENT, layers::WORLD | layers::AGENT | layers::PLAYER)
}

/// CollisionGroups для тела игрока
pub fn player_groups() -> CollisionGroups {
    CollisionGroups::new(layers::PLAYER, layers::WORLD | layers::AGENT)
}

/// Одно статическое препятствие уровня (AABB + его layer)
#[derive(Debug, Clone, Copy)]
pub struct Obstacle {
    pub min: Vec3,
    pub max: Vec3,
    pub layer: Group,
}

impl Obstacle {
    pub fn wall(min: Vec3, max: Vec3) -> Self {
        Self {
            min,
            max,
            layer: layers::WORLD,
        }
    }
}

/// Статическая геометрия уровня (загружается level-кодом при спавне)
#[derive(Resource, Debug, Clone, Default)]
pub struct WorldGeometry {
    pub obstacles: Vec<Obstacle>,
}

impl WorldGeometry {
    pub fn with_obstacles(obstacles: Vec<Obstacle>) -> Self {
        Self { obstacles }
    }

    /// Ближайшее пересечение луча с препятствием из маски
    ///
    /// `dir` должен быть нормализован. Возвращает дистанцию до входа в AABB.
    pub fn raycast_first_hit(
        &self,
        origin: Vec3,
        dir: Vec3,
        max_dist: f32,
        mask: Group,
    ) -> Option<RayHit> {
        let mut nearest: Option<RayHit> = None;

        for obstacle in &self.obstacles {
            if !mask.intersects(obstacle.layer) {
                continue;
            }
            let Some(distance) = ray_aabb_entry(origin, dir, obstacle.min, obstacle.max) else {
                continue;
            };
            if distance > max_dist {
                continue;
            }
            let closer = nearest.map(|h| distance < h.distance).unwrap_or(true);
            if closer {
                nearest = Some(RayHit {
                    distance,
                    layer: obstacle.layer,
                });
            }
        }

        nearest
    }

    /// Перекрыт ли отрезок origin→target чем-то из маски
    ///
    /// Препятствие считается только если оно СТРОГО ближе цели
    /// (эпсилон защищает от попадания в AABB, касающийся самой цели).
    pub fn occluded(&self, origin: Vec3, target: Vec3, mask: Group) -> bool {
        let to_target = target - origin;
        let distance = to_target.length();
        if distance <= f32::EPSILON {
            return false;
        }
        let dir = to_target / distance;
        self.raycast_first_hit(origin, dir, distance - 1e-3, mask)
            .is_some()
    }
}

/// Результат raycast (вход в первое препятствие)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub layer: Group,
}

/// Slab-метод: дистанция входа луча в AABB (None если мимо или AABB позади)
fn ray_aabb_entry(origin: Vec3, dir: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let mut t_enter = 0.0_f32;
    let mut t_exit = f32::INFINITY;

    for axis in 0..3 {
        let o = origin[axis];
        let d = dir[axis];
        let (lo, hi) = (min[axis], max[axis]);

        if d.abs() < 1e-8 {
            // Луч параллелен слэбу: либо внутри по этой оси, либо мимо
            if o < lo || o > hi {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let mut t1 = (lo - o) * inv;
        let mut t2 = (hi - o) * inv;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        t_enter = t_enter.max(t1);
        t_exit = t_exit.min(t2);
        if t_enter > t_exit {
            return None;
        }
    }

    Some(t_enter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall_x5() -> Obstacle {
        // Стена поперёк оси X на x ∈ [5, 6]
        Obstacle::wall(Vec3::new(5.0, -1.0, -5.0), Vec3::new(6.0, 3.0, 5.0))
    }

    #[test]
    fn test_ray_hits_wall() {
        let geometry = WorldGeometry::with_obstacles(vec![wall_x5()]);
        let hit = geometry.raycast_first_hit(Vec3::ZERO, Vec3::X, 20.0, layers::WORLD);
        let hit = hit.expect("стена на пути");
        assert!((hit.distance - 5.0).abs() < 1e-4);
        assert_eq!(hit.layer, layers::WORLD);
    }

    #[test]
    fn test_ray_misses_behind() {
        let geometry = WorldGeometry::with_obstacles(vec![wall_x5()]);
        // Смотрим в противоположную сторону
        let hit = geometry.raycast_first_hit(Vec3::ZERO, -Vec3::X, 20.0, layers::WORLD);
        assert!(hit.is_none());
    }

    #[test]
    fn test_ray_respects_mask() {
        let geometry = WorldGeometry::with_obstacles(vec![wall_x5()]);
        let hit = geometry.raycast_first_hit(Vec3::ZERO, Vec3::X, 20.0, layers::HURTBOX);
        assert!(hit.is_none());
    }

    #[test]
    fn test_ray_respects_max_dist() {
        let geometry = WorldGeometry::with_obstacles(vec![wall_x5()]);
        let hit = geometry.raycast_first_hit(Vec3::ZERO, Vec3::X, 4.0, layers::WORLD);
        assert!(hit.is_none());
    }

    #[test]
    fn test_occluded_segment() {
        let geometry = WorldGeometry::with_obstacles(vec![wall_x5()]);
        // Цель за стеной
        assert!(geometry.occluded(
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
            layers::SIGHT_BLOCKERS
        ));
        // Цель перед стеной
        assert!(!geometry.occluded(
            Vec3::ZERO,
            Vec3::new(4.0, 0.0, 0.0),
            layers::SIGHT_BLOCKERS
        ));
        // Сбоку стена не мешает
        assert!(!geometry.occluded(
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, 10.0),
            layers::SIGHT_BLOCKERS
        ));
    }

    #[test]
    fn test_nearest_of_two_walls() {
        let near = Obstacle::wall(Vec3::new(3.0, -1.0, -1.0), Vec3::new(3.5, 2.0, 1.0));
        let geometry = WorldGeometry::with_obstacles(vec![wall_x5(), near]);
        let hit = geometry
            .raycast_first_hit(Vec3::ZERO, Vec3::X, 20.0, layers::WORLD)
            .expect("обе стены на пути");
        assert!((hit.distance - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_ray_starting_inside_aabb() {
        let geometry = WorldGeometry::with_obstacles(vec![wall_x5()]);
        let origin = Vec3::new(5.5, 0.0, 0.0);
        let hit = geometry
            .raycast_first_hit(origin, Vec3::X, 20.0, layers::WORLD)
            .expect("старт внутри AABB — вход на t=0");
        assert_eq!(hit.distance, 0.0);
    }
}
