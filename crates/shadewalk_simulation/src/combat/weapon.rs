//! Параметры оружия: melee-клинок и harass-выстрел
//!
//! ECS хранит stats и cooldown (game state); визуальный swing и VFX —
//! забота внешних слоёв через AnimationCue.

use bevy::prelude::*;

/// Melee-оружие агента или игрока
///
/// Каденс атаки = windup (attack delay) + strike + recovery (recovery
/// delay), cooldown поверх — пауза между замахами.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct MeleeWeapon {
    /// Лёгкий урон удара (до block/dodge модификаторов)
    pub damage: u32,
    /// Замах (секунды) — телеграф, удар ещё не нанесён
    pub windup_secs: f32,
    /// Окно удара (секунды) — hit frame в его начале
    pub strike_secs: f32,
    /// Восстановление после удара (секунды)
    pub recovery_secs: f32,
    /// Насколько впереди тела точка оружия (метры)
    pub reach: f32,
    /// Радиус overlap-сферы удара (метры)
    pub strike_radius: f32,
    /// Пауза между замахами (секунды)
    pub cooldown: f32,
    /// Текущий cooldown timer (0 = можно замахиваться)
    pub cooldown_timer: f32,
}

impl Default for MeleeWeapon {
    fn default() -> Self {
        Self::guard_blade()
    }
}

impl MeleeWeapon {
    /// Клинок рядового стража
    pub fn guard_blade() -> Self {
        Self {
            damage: 15,
            windup_secs: 0.3,
            strike_secs: 0.15,
            recovery_secs: 0.4,
            reach: 1.0,
            strike_radius: 1.2,
            cooldown: 1.2,
            cooldown_timer: 0.0,
        }
    }

    /// Нож игрока (быстрее, для stealth-подхода)
    pub fn player_knife() -> Self {
        Self {
            damage: 20,
            windup_secs: 0.15,
            strike_secs: 0.1,
            recovery_secs: 0.25,
            reach: 0.8,
            strike_radius: 1.0,
            cooldown: 0.6,
            cooldown_timer: 0.0,
        }
    }

    pub fn can_swing(&self) -> bool {
        self.cooldown_timer <= 0.0
    }

    pub fn start_cooldown(&mut self) {
        self.cooldown_timer = self.cooldown;
    }
}

/// Harass-выстрел (Defense state), hitscan
///
/// Полёт снаряда/трассер — забота внешних слоёв; ядро валидирует
/// дальность+LOS и проводит урон через общий damage-вход.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct RangedAttack {
    pub damage: u32,
    /// Дальность выстрела (метры)
    pub range: f32,
    pub cooldown: f32,
    pub cooldown_timer: f32,
}

impl Default for RangedAttack {
    fn default() -> Self {
        Self {
            damage: 5,
            range: 14.0,
            cooldown: 2.0,
            cooldown_timer: 0.0,
        }
    }
}

impl RangedAttack {
    pub fn ready(&self) -> bool {
        self.cooldown_timer <= 0.0
    }

    pub fn start_cooldown(&mut self) {
        self.cooldown_timer = self.cooldown;
    }
}

/// Система: тик cooldown'ов оружия
pub fn tick_weapon_cooldowns(
    mut melee: Query<&mut MeleeWeapon>,
    mut ranged: Query<&mut RangedAttack>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for mut weapon in melee.iter_mut() {
        if weapon.cooldown_timer > 0.0 {
            weapon.cooldown_timer = (weapon.cooldown_timer - delta).max(0.0);
        }
    }
    for mut weapon in ranged.iter_mut() {
        if weapon.cooldown_timer > 0.0 {
            weapon.cooldown_timer = (weapon.cooldown_timer - delta).max(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_melee_cooldown_cycle() {
        let mut weapon = MeleeWeapon::guard_blade();
        assert!(weapon.can_swing());

        weapon.start_cooldown();
        assert!(!weapon.can_swing());
        assert_eq!(weapon.cooldown_timer, 1.2);

        weapon.cooldown_timer -= 1.2;
        assert!(weapon.can_swing());
    }

    #[test]
    fn test_ranged_defaults() {
        let ranged = RangedAttack::default();
        assert!(ranged.ready());
        assert!(ranged.range > 0.0);
        assert!(ranged.damage > 0);
    }

    #[test]
    fn test_player_knife_is_quicker() {
        let knife = MeleeWeapon::player_knife();
        let blade = MeleeWeapon::guard_blade();
        assert!(knife.windup_secs < blade.windup_secs);
        assert!(knife.cooldown < blade.cooldown);
    }
}
