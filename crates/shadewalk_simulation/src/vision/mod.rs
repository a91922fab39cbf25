//! Зрение: конус обзора + occlusion raycast + wall-hug правило
//!
//! Модуль — чистая геометрия, состояния AI он не знает. Политика
//! "что делать при обнаружении" (alert broadcast и т.п.) — решение
//! вызывающего state, не зрения.

use bevy::prelude::*;
use bevy_rapier3d::prelude::Group;

use crate::spatial::{layers, WorldGeometry};

/// Порог wall-hug правила: обнаружение прижатого к стене требует
/// dot(observer_fwd, target_fwd) не больше этого значения — наблюдатель
/// должен видеть лицо/фланг, а не спину вдоль стены.
pub const WALL_HUG_FACING_MAX: f32 = 0.0;

/// Конус обзора агента
///
/// Verdict пересчитывается с кэдансом check_interval (не каждый тик) —
/// cost control; между пересчётами states читают кэш.
#[derive(Component, Debug, Clone)]
pub struct VisionCone {
    /// Дальность обзора (метры)
    pub range: f32,
    /// Полуугол конуса (радианы)
    pub half_angle: f32,
    /// Occlusion-маска (что перекрывает взгляд)
    pub mask: Group,
    /// Кэданс пересчёта (секунды)
    pub check_interval: f32,
    check_timer: f32,
    last_verdict: bool,
}

impl Default for VisionCone {
    fn default() -> Self {
        Self::new(10.0, std::f32::consts::FRAC_PI_4)
    }
}

impl VisionCone {
    pub fn new(range: f32, half_angle: f32) -> Self {
        Self {
            range,
            half_angle,
            mask: layers::SIGHT_BLOCKERS,
            check_interval: 0.2,
            check_timer: 0.0,
            last_verdict: false,
        }
    }

    /// Тикнуть кэданс; true = пора пересчитать
    pub fn due(&mut self, dt: f32) -> bool {
        self.check_timer -= dt;
        if self.check_timer <= 0.0 {
            self.check_timer = self.check_interval;
            true
        } else {
            false
        }
    }

    /// Сброс кэданса и кэша (на OnEnter state'а — первый тик пересчитывает)
    pub fn reset(&mut self) {
        self.check_timer = 0.0;
        self.last_verdict = false;
    }

    pub fn record(&mut self, verdict: bool) {
        self.last_verdict = verdict;
    }

    pub fn last_verdict(&self) -> bool {
        self.last_verdict
    }
}

/// Что зрение знает о цели в момент проверки
#[derive(Debug, Clone, Copy)]
pub struct SightTarget {
    pub position: Vec3,
    pub forward: Vec3,
    pub wall_hugging: bool,
}

/// Геометрический тест видимости
///
/// true ⇔ дистанция ≤ range ∧ угол ≤ half_angle ∧ луч не перекрыт
/// ∧ (цель не wall-hug, или наблюдатель во фланге/лицом).
pub fn can_see(
    observer_pos: Vec3,
    observer_fwd: Vec3,
    target: SightTarget,
    cone: &VisionCone,
    geometry: &WorldGeometry,
) -> bool {
    let to_target = target.position - observer_pos;
    let distance = to_target.length();

    if distance > cone.range {
        return false;
    }

    if distance > 1e-3 {
        let dir = to_target / distance;
        let cos_to_target = observer_fwd.dot(dir);
        if cos_to_target < cone.half_angle.cos() {
            return false;
        }
    }

    if geometry.occluded(observer_pos, target.position, cone.mask) {
        return false;
    }

    if target.wall_hugging && observer_fwd.dot(target.forward) > WALL_HUG_FACING_MAX {
        return false;
    }

    true
}
