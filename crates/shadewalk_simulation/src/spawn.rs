//! Spawn-хелперы: полный агент и игрок одним вызовом
//!
//! Агент собирается целиком при спавне: профиль, машина состояний
//! (Initialize — Patrol активен до первого тика), фасад навигации,
//! конус обзора, оружие, rapier-тело и hurtbox-приёмник ударов.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::ai::{AiProfile, StateMachine};
use crate::combat::{Hurtbox, MeleeWeapon, RangedAttack};
use crate::components::{Agent, PatrolRoute, Player};
use crate::spatial::{self, layers};
use crate::vision::VisionCone;

/// Радиус hurtbox-сферы (приёмник melee-ударов)
const HURTBOX_RADIUS: f32 = 0.6;

/// Spawn агента: возвращает entity агрегата
///
/// Required components Agent'а дотягивают Health, Awareness и NavAgent.
pub fn spawn_agent(
    commands: &mut Commands,
    position: Vec3,
    faction_id: u64,
    profile: AiProfile,
    route: PatrolRoute,
) -> Entity {
    let has_ranged = profile.defense.is_some();
    let patrol_speed = profile.patrol.move_speed;

    let agent = commands
        .spawn((
            Transform::from_translation(position),
            Agent::new(faction_id),
            StateMachine::patrolling(),
            // Стартовое состояние — Patrol, enter для него не звался:
            // скорость фасада задаём при сборке
            crate::nav::NavAgent::with_speed(patrol_speed),
            profile,
            route,
            VisionCone::default(),
            MeleeWeapon::guard_blade(),
            // Rapier-тело (коллизии ведёт движок; queries считаем сами)
            RigidBody::KinematicPositionBased,
            Collider::capsule_y(0.5, 0.4),
            spatial::agent_groups(),
        ))
        .id();

    // Harass-оружие только у архетипов с Defense
    if has_ranged {
        commands.entity(agent).insert(RangedAttack::default());
    }

    spawn_hurtbox(commands, agent);
    agent
}

/// Spawn игрока (транспорт/ввод — внешние слои, AI его только читает)
pub fn spawn_player(commands: &mut Commands, position: Vec3) -> Entity {
    let player = commands
        .spawn((
            Transform::from_translation(position),
            Player,
            MeleeWeapon::player_knife(),
            RigidBody::KinematicPositionBased,
            Collider::capsule_y(0.5, 0.4),
            spatial::player_groups(),
        ))
        .id();

    spawn_hurtbox(commands, player);
    player
}

/// Hurtbox-приёмник: child-collider, удар разрешается в owner'а
fn spawn_hurtbox(commands: &mut Commands, owner: Entity) -> Entity {
    commands
        .spawn((
            Hurtbox { owner },
            Collider::ball(HURTBOX_RADIUS),
            Sensor,
            CollisionGroups::new(layers::HURTBOX, Group::ALL),
        ))
        .id()
}
