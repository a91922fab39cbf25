//! Сценарные тесты AI: патруль, обнаружение, stealth kill, knockback,
//! alert propagation, слепота, терминальность смерти.
//!
//! Каждый тест строит headless app (один update == один fixed тик 60Гц)
//! и гоняет симуляцию тик за тиком, проверяя наблюдаемое поведение.

use bevy::prelude::*;
use shadewalk_simulation::ai::{AiProfile, BlindedEvent, NoiseEvent, StateKind, StateMachine};
use shadewalk_simulation::combat::{Dead, DespawnAfter, KnockbackState, MeleeAttackIntent, MeleeAttackState};
use shadewalk_simulation::components::{Health, PatrolPoint, PatrolRoute, PlayerPosture};
use shadewalk_simulation::nav::NavAgent;
use shadewalk_simulation::{
    create_headless_app, spawn_agent, spawn_player, SimulationPlugin, WorldGeometry,
};

/// Полный combat app (все подсистемы, пустая геометрия)
fn sim_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.insert_resource(WorldGeometry::default());
    app.add_plugins(SimulationPlugin);
    app
}

fn tick(app: &mut App, n: usize) {
    for _ in 0..n {
        app.update();
    }
}

fn kind_of(app: &App, agent: Entity) -> StateKind {
    app.world()
        .get::<StateMachine>(agent)
        .expect("agent has StateMachine")
        .kind()
}

fn set_posture(app: &mut App, player: Entity, posture: PlayerPosture) {
    *app.world_mut()
        .get_mut::<PlayerPosture>(player)
        .expect("player has posture") = posture;
}

/// Поставить entity в позицию, лицом по направлению dir
fn place(app: &mut App, entity: Entity, position: Vec3, facing: Vec3) {
    let mut transform = app
        .world_mut()
        .get_mut::<Transform>(entity)
        .expect("entity has Transform");
    *transform = Transform::from_translation(position).looking_to(facing, Vec3::Y);
}

// ============================================================================
// Scenario A: маршрут из 3 точек, ожидание 2s на каждой
// ============================================================================

#[test]
fn test_patrol_traverses_route_with_waits() {
    let mut app = sim_app(42);

    let p0 = Vec3::new(0.0, 0.0, 0.0);
    let p1 = Vec3::new(5.0, 0.0, 0.0);
    let p2 = Vec3::new(5.0, 0.0, 5.0);
    let route = PatrolRoute::new(vec![
        PatrolPoint::new(p0, 2.0),
        PatrolPoint::new(p1, 2.0),
        PatrolPoint::new(p2, 2.0),
    ]);

    // Игрока в сцене нет — агент обязан терпеть отсутствие цели
    let agent = {
        let world = app.world_mut();
        let mut commands = world.commands();
        spawn_agent(&mut commands, p0, 1, AiProfile::guard(), route)
    };
    app.world_mut().flush();

    let mut reached_p1 = false;
    let mut wait_ticks_at_p1 = 0_u32;
    let mut headed_to_p2 = false;

    for _ in 0..1500 {
        app.update();

        let nav = app.world().get::<NavAgent>(agent).expect("agent nav");
        let pos = app
            .world()
            .get::<Transform>(agent)
            .expect("agent transform")
            .translation;

        if !reached_p1 && pos.distance(p1) < 0.4 {
            reached_p1 = true;
        }
        if reached_p1 && !headed_to_p2 && nav.destination().is_none() {
            wait_ticks_at_p1 += 1;
        }
        if reached_p1 && nav.destination() == Some(p2) {
            headed_to_p2 = true;
            break;
        }
    }

    assert!(reached_p1, "агент должен дойти до точки 1");
    assert!(headed_to_p2, "после ожидания destination должен стать точкой 2");
    // Ожидание на точке ≈ 2s (120 тиков при 60Гц), допускаем разброс
    assert!(
        (100..=145).contains(&wait_ticks_at_p1),
        "ожидание на точке 1 = {} тиков, ждали ~120",
        wait_ticks_at_p1
    );
    assert_eq!(kind_of(&app, agent), StateKind::Patrol);
}

// ============================================================================
// Scenario B: обнаружение → Defense, либо Aggressive без Defense
// ============================================================================

#[test]
fn test_detection_engages_defense() {
    let mut app = sim_app(42);

    let (agent, _player) = {
        let world = app.world_mut();
        let mut commands = world.commands();
        let agent = spawn_agent(
            &mut commands,
            Vec3::ZERO,
            1,
            AiProfile::guard(),
            PatrolRoute::default(),
        );
        // В 5м впереди (агент смотрит в -Z), без wall-hug — видим
        let player = spawn_player(&mut commands, Vec3::new(0.0, 0.0, -5.0));
        (agent, player)
    };
    app.world_mut().flush();

    tick(&mut app, 10);
    assert_eq!(
        kind_of(&app, agent),
        StateKind::Defense,
        "guard при обнаружении уходит в Defense"
    );
}

#[test]
fn test_detection_falls_back_to_aggressive() {
    let mut app = sim_app(42);

    let agent = {
        let world = app.world_mut();
        let mut commands = world.commands();
        let agent = spawn_agent(
            &mut commands,
            Vec3::ZERO,
            1,
            AiProfile::brute(), // Defense не сконфигурирован
            PatrolRoute::default(),
        );
        spawn_player(&mut commands, Vec3::new(0.0, 0.0, -5.0));
        agent
    };
    app.world_mut().flush();

    tick(&mut app, 10);
    assert_eq!(
        kind_of(&app, agent),
        StateKind::Aggressive,
        "архетип без Defense вступает в бой через Aggressive"
    );
}

#[test]
fn test_wall_blocks_detection() {
    let mut app = create_headless_app(42);
    // Стена между агентом и игроком
    app.insert_resource(WorldGeometry::with_obstacles(vec![
        shadewalk_simulation::Obstacle::wall(
            Vec3::new(-2.0, -1.0, -3.5),
            Vec3::new(2.0, 3.0, -3.0),
        ),
    ]));
    app.add_plugins(SimulationPlugin);

    let agent = {
        let world = app.world_mut();
        let mut commands = world.commands();
        let agent = spawn_agent(
            &mut commands,
            Vec3::ZERO,
            1,
            AiProfile::guard(),
            PatrolRoute::default(),
        );
        spawn_player(&mut commands, Vec3::new(0.0, 0.0, -5.0));
        agent
    };
    app.world_mut().flush();

    tick(&mut app, 30);
    assert_eq!(
        kind_of(&app, agent),
        StateKind::Patrol,
        "перекрытый стеной игрок не обнаруживается"
    );
}

// ============================================================================
// Scenario C: stealth kill со спины
// ============================================================================

#[test]
fn test_stealth_kill_from_behind() {
    let mut app = sim_app(42);

    let (agent, player) = {
        let world = app.world_mut();
        let mut commands = world.commands();
        let agent = spawn_agent(
            &mut commands,
            Vec3::ZERO,
            1,
            AiProfile::guard(),
            PatrolRoute::default(),
        );
        let player = spawn_player(&mut commands, Vec3::new(0.0, 0.0, 1.0));
        (agent, player)
    };
    app.world_mut().flush();

    // Агент смотрит в -Z; игрок за спиной (+Z), смотрит туда же,
    // крадётся: forwards сонаправлены (dot = 1.0 > порога)
    place(&mut app, player, Vec3::new(0.0, 0.0, 1.0), -Vec3::Z);
    set_posture(&mut app, player, PlayerPosture::sneaking());

    app.world_mut().send_event(MeleeAttackIntent { attacker: player });

    // Windup ножа 0.15s ≈ 9 тиков + разрешение + переход на границе тика
    tick(&mut app, 30);

    assert_eq!(
        kind_of(&app, agent),
        StateKind::Dead,
        "крадущийся удар со спины мгновенно летален"
    );
    let health = app.world().get::<Health>(agent).expect("agent health");
    assert_eq!(health.current, 0);
    assert!(app.world().get::<Dead>(agent).is_some());
    assert!(app.world().get::<DespawnAfter>(agent).is_some());
}

#[test]
fn test_no_stealth_kill_when_upright() {
    let mut app = sim_app(42);

    let (agent, player) = {
        let world = app.world_mut();
        let mut commands = world.commands();
        let agent = spawn_agent(
            &mut commands,
            Vec3::ZERO,
            1,
            AiProfile::guard(),
            PatrolRoute::default(),
        );
        let player = spawn_player(&mut commands, Vec3::new(0.0, 0.0, 1.0));
        (agent, player)
    };
    app.world_mut().flush();

    // Та же позиция со спины, но игрок НЕ крадётся — обычный урон
    place(&mut app, player, Vec3::new(0.0, 0.0, 1.0), -Vec3::Z);
    app.world_mut().send_event(MeleeAttackIntent { attacker: player });

    tick(&mut app, 30);

    let health = app.world().get::<Health>(agent).expect("agent health");
    assert!(health.is_alive(), "обычный удар не должен убить со 100 HP");
    assert!(health.current < health.max, "но урон должен пройти");
    assert_ne!(kind_of(&app, agent), StateKind::Dead);
}

// ============================================================================
// Scenario D: не-летальный melee в патруле → knockback, без перехода
// ============================================================================

#[test]
fn test_knockback_holds_patrol_then_resumes() {
    let mut app = sim_app(42);

    let far_point = Vec3::new(20.0, 0.0, 0.0);
    let (agent, player) = {
        let world = app.world_mut();
        let mut commands = world.commands();
        let agent = spawn_agent(
            &mut commands,
            Vec3::ZERO,
            1,
            AiProfile::guard(),
            PatrolRoute::new(vec![PatrolPoint::new(far_point, 1.0)]),
        );
        let player = spawn_player(&mut commands, Vec3::new(0.0, 0.0, 1.0));
        (agent, player)
    };
    app.world_mut().flush();

    // Игрок за спиной, НЕ крадётся — не-летальный удар
    place(&mut app, player, Vec3::new(0.0, 0.0, 1.0), -Vec3::Z);
    app.world_mut().send_event(MeleeAttackIntent { attacker: player });

    // Ждём появления knockback
    let mut knocked_tick = None;
    for t in 0..40 {
        app.update();
        if app.world().get::<KnockbackState>(agent).is_some() {
            knocked_tick = Some(t);
            break;
        }
    }
    assert!(knocked_tick.is_some(), "удар должен вызвать knockback");

    // Во время knockback: навигация на паузе, состояние не меняется
    let nav = app.world().get::<NavAgent>(agent).expect("agent nav");
    assert!(nav.is_paused(), "pathfinding приостановлен на knockback");
    assert_eq!(kind_of(&app, agent), StateKind::Patrol);

    // Knockback истекает за ~0.25s (15 тиков), движение возвращается
    let mut released_after = None;
    for t in 1..40 {
        app.update();
        if app.world().get::<KnockbackState>(agent).is_none() {
            released_after = Some(t);
            break;
        }
        assert_eq!(
            kind_of(&app, agent),
            StateKind::Patrol,
            "во время knockback переходов нет"
        );
    }
    let released_after = released_after.expect("knockback обязан истечь");
    assert!(
        (10..=25).contains(&released_after),
        "knockback длился {} тиков, ждали ~15",
        released_after
    );

    // На тике снятия: всё ещё Patrol, навигация возобновлена
    assert_eq!(kind_of(&app, agent), StateKind::Patrol);
    let nav = app.world().get::<NavAgent>(agent).expect("agent nav");
    assert!(!nav.is_paused(), "после knockback pathfinding возобновлён");

    // Дальше агент волен расследовать удар (политика Patrol)
    tick(&mut app, 2);
    assert_eq!(
        kind_of(&app, agent),
        StateKind::LostPlayer,
        "после knockback удар со спины ведёт к расследованию"
    );
}

// ============================================================================
// Scenario E: alert слышат только свои и только в радиусе
// ============================================================================

#[test]
fn test_alert_reaches_same_faction_in_radius() {
    let mut app = sim_app(42);

    let (detector, ally_near, ally_far, stranger) = {
        let world = app.world_mut();
        let mut commands = world.commands();
        let detector = spawn_agent(
            &mut commands,
            Vec3::ZERO,
            1,
            AiProfile::guard(),
            PatrolRoute::default(),
        );
        // Свой в радиусе (смотрит от игрока — сам не увидит)
        let ally_near = spawn_agent(
            &mut commands,
            Vec3::new(8.0, 0.0, 8.0),
            1,
            AiProfile::guard(),
            PatrolRoute::default(),
        );
        // Свой вне радиуса 20м
        let ally_far = spawn_agent(
            &mut commands,
            Vec3::new(60.0, 0.0, 0.0),
            1,
            AiProfile::guard(),
            PatrolRoute::default(),
        );
        // Чужая фракция рядом с отправителем, но далеко от игрока
        let stranger = spawn_agent(
            &mut commands,
            Vec3::new(12.0, 0.0, 8.0),
            2,
            AiProfile::guard(),
            PatrolRoute::default(),
        );
        spawn_player(&mut commands, Vec3::new(0.0, 0.0, -5.0));
        (detector, ally_near, ally_far, stranger)
    };
    app.world_mut().flush();

    // Союзников разворачиваем от игрока, чтобы не увидели сами
    place(&mut app, ally_near, Vec3::new(8.0, 0.0, 8.0), Vec3::Z);
    place(&mut app, ally_far, Vec3::new(60.0, 0.0, 0.0), Vec3::Z);
    place(&mut app, stranger, Vec3::new(12.0, 0.0, 8.0), Vec3::Z);

    tick(&mut app, 12);

    // Обнаруживший — в бою
    assert!(matches!(
        kind_of(&app, detector),
        StateKind::Defense | StateKind::Aggressive
    ));
    // Свой в радиусе получил сигнал и покинул патруль
    assert_ne!(
        kind_of(&app, ally_near),
        StateKind::Patrol,
        "одно-фракционный сосед в радиусе должен отреагировать на alert"
    );
    // Вне радиуса и чужая фракция — не затронуты
    assert_eq!(kind_of(&app, ally_far), StateKind::Patrol);
    assert_eq!(kind_of(&app, stranger), StateKind::Patrol);
}

// ============================================================================
// Шум: патрульный идёт расследовать источник
// ============================================================================

#[test]
fn test_noise_sends_patrol_investigating() {
    let mut app = sim_app(42);

    let agent = {
        let world = app.world_mut();
        let mut commands = world.commands();
        spawn_agent(
            &mut commands,
            Vec3::ZERO,
            1,
            AiProfile::guard(),
            PatrolRoute::default(),
        )
    };
    app.world_mut().flush();
    tick(&mut app, 2);

    let noise_pos = Vec3::new(6.0, 0.0, 6.0);
    app.world_mut().send_event(NoiseEvent {
        position: noise_pos,
        radius: 15.0,
    });
    tick(&mut app, 3);

    assert_eq!(kind_of(&app, agent), StateKind::LostPlayer);
    let nav = app.world().get::<NavAgent>(agent).expect("agent nav");
    let destination = nav.destination().expect("расследование задаёт destination");
    // Точка поиска — источник шума с разбросом noise_jitter
    assert!(destination.distance(noise_pos) <= 2.0);
}

// ============================================================================
// Слепота: движение отключено; melee в слепоте летален
// ============================================================================

#[test]
fn test_blindness_freezes_then_searches() {
    let mut app = sim_app(42);

    let agent = {
        let world = app.world_mut();
        let mut commands = world.commands();
        spawn_agent(
            &mut commands,
            Vec3::ZERO,
            1,
            AiProfile::guard(),
            PatrolRoute::new(vec![PatrolPoint::new(Vec3::new(10.0, 0.0, 0.0), 1.0)]),
        )
    };
    app.world_mut().flush();
    tick(&mut app, 2);

    app.world_mut().send_event(BlindedEvent {
        target: agent,
        duration: 1.0,
    });
    tick(&mut app, 3);

    assert_eq!(kind_of(&app, agent), StateKind::Blinded);
    let nav = app.world().get::<NavAgent>(agent).expect("agent nav");
    assert!(nav.is_paused(), "в слепоте движение отключено");

    // 1s слепоты ≈ 60 тиков → осмотр
    tick(&mut app, 75);
    assert_eq!(
        kind_of(&app, agent),
        StateKind::LostPlayer,
        "слепота истекла без ударов → поиск"
    );
    let nav = app.world().get::<NavAgent>(agent).expect("agent nav");
    assert!(!nav.is_paused());
}

#[test]
fn test_melee_while_blind_is_lethal() {
    let mut app = sim_app(42);

    let (agent, player) = {
        let world = app.world_mut();
        let mut commands = world.commands();
        let agent = spawn_agent(
            &mut commands,
            Vec3::ZERO,
            1,
            AiProfile::guard(),
            PatrolRoute::default(),
        );
        let player = spawn_player(&mut commands, Vec3::new(0.0, 0.0, 1.0));
        (agent, player)
    };
    app.world_mut().flush();

    place(&mut app, player, Vec3::new(0.0, 0.0, 1.0), -Vec3::Z);
    app.world_mut().send_event(BlindedEvent {
        target: agent,
        duration: 5.0,
    });
    tick(&mut app, 3);
    assert_eq!(kind_of(&app, agent), StateKind::Blinded);

    // Обычный (не stealth) удар: 15 урона из 100 HP — но агент слеп
    app.world_mut().send_event(MeleeAttackIntent { attacker: player });
    tick(&mut app, 30);

    assert_eq!(
        kind_of(&app, agent),
        StateKind::Dead,
        "melee-урон в слепоте летален"
    );
}

// ============================================================================
// Терминальность Death + отложенное удаление
// ============================================================================

#[test]
fn test_death_is_terminal_and_agent_despawns() {
    let mut app = sim_app(42);

    let agent = {
        let world = app.world_mut();
        let mut commands = world.commands();
        spawn_agent(
            &mut commands,
            Vec3::ZERO,
            1,
            AiProfile::guard(),
            PatrolRoute::default(),
        )
    };
    app.world_mut().flush();
    tick(&mut app, 2);

    // Летальный исход напрямую через Health (единый вход уже покрыт выше)
    app.world_mut()
        .get_mut::<Health>(agent)
        .expect("agent health")
        .kill();
    tick(&mut app, 2);
    assert_eq!(kind_of(&app, agent), StateKind::Dead);

    // Никакие сигналы больше не меняют состояние
    app.world_mut().send_event(NoiseEvent {
        position: Vec3::new(5.0, 0.0, 5.0),
        radius: 50.0,
    });
    app.world_mut().send_event(BlindedEvent {
        target: agent,
        duration: 2.0,
    });
    tick(&mut app, 30);
    assert_eq!(kind_of(&app, agent), StateKind::Dead);

    // removal_delay 4s = 240 тиков → агент удалён из мира
    tick(&mut app, 260);
    assert!(
        app.world().get::<StateMachine>(agent).is_none(),
        "после death-sequence агент удаляется из симуляции"
    );
}

// ============================================================================
// Dodge coupling: перекат в окно удара обнуляет урон
// ============================================================================

#[test]
fn test_dodge_negates_melee_damage() {
    let mut app = sim_app(42);

    let (agent, player) = {
        let world = app.world_mut();
        let mut commands = world.commands();
        let agent = spawn_agent(
            &mut commands,
            Vec3::ZERO,
            1,
            AiProfile::brute(), // сразу в melee
            PatrolRoute::default(),
        );
        let player = spawn_player(&mut commands, Vec3::new(0.0, 0.0, -1.5));
        (agent, player)
    };
    app.world_mut().flush();

    // Игрок в перманентном перекате внутри окна (полями управляет
    // внешний input layer; для теста фиксируем значения)
    set_posture(
        &mut app,
        player,
        PlayerPosture {
            dodging: true,
            dodge_elapsed: 0.1,
            ..PlayerPosture::default()
        },
    );

    // 3 секунды боя: brute успевает на несколько замахов
    let mut agent_attacked = false;
    for _ in 0..180 {
        app.update();
        if app.world().get::<MeleeAttackState>(agent).is_some() {
            agent_attacked = true;
        }
    }

    assert!(agent_attacked, "brute должен атаковать цель в melee-полосе");
    let health = app.world().get::<Health>(player).expect("player health");
    assert_eq!(
        health.current, health.max,
        "все удары в окно переката обнулены"
    );
}
