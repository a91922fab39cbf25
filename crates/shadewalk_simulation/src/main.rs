//! Headless-прогон SHADEWALK
//!
//! Небольшая демо-сцена: стена, патрульные стражи, миньон и игрок.
//! Печатает перепись состояний по ходу симуляции.

use bevy::prelude::*;
use shadewalk_simulation::ai::AiProfile;
use shadewalk_simulation::components::{PatrolPoint, PatrolRoute};
use shadewalk_simulation::{
    create_headless_app, spawn_agent, spawn_player, Obstacle, SimulationPlugin, StateKind,
    StateMachine, WorldGeometry,
};

fn main() {
    let seed = 42;
    println!("Starting SHADEWALK headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);

    // Геометрия: одна стена посреди сцены
    app.insert_resource(WorldGeometry::with_obstacles(vec![Obstacle::wall(
        Vec3::new(-6.0, 0.0, -1.0),
        Vec3::new(-2.0, 2.5, 0.0),
    )]));
    app.add_plugins(SimulationPlugin);

    {
        let world = app.world_mut();
        let mut commands = world.commands();

        let route_a = PatrolRoute::new(vec![
            PatrolPoint::new(Vec3::new(0.0, 0.0, 0.0), 2.0),
            PatrolPoint::new(Vec3::new(8.0, 0.0, 0.0), 2.0),
            PatrolPoint::new(Vec3::new(8.0, 0.0, 8.0), 2.0),
        ]);
        let route_b = PatrolRoute::new(vec![
            PatrolPoint::new(Vec3::new(-8.0, 0.0, 6.0), 1.5),
            PatrolPoint::new(Vec3::new(-8.0, 0.0, -6.0), 1.5),
        ]);

        spawn_agent(
            &mut commands,
            Vec3::new(0.0, 0.0, 0.0),
            1,
            AiProfile::guard(),
            route_a,
        );
        spawn_agent(
            &mut commands,
            Vec3::new(-8.0, 0.0, 6.0),
            1,
            AiProfile::guard(),
            route_b,
        );
        spawn_agent(
            &mut commands,
            Vec3::new(4.0, 0.0, -4.0),
            1,
            AiProfile::brute(),
            PatrolRoute::default(),
        );

        spawn_player(&mut commands, Vec3::new(2.0, 0.0, 6.0));
    }
    app.world_mut().flush();

    // 900 тиков = 15 секунд симуляции
    for tick in 0..900 {
        app.update();

        if tick % 150 == 0 {
            print_census(&mut app, tick);
        }
    }

    println!("Simulation complete!");
}

/// Перепись активных состояний агентов
fn print_census(app: &mut App, tick: usize) {
    let world = app.world_mut();
    let mut query = world.query::<&StateMachine>();

    let mut patrol = 0;
    let mut combat = 0;
    let mut search = 0;
    let mut other = 0;
    for machine in query.iter(world) {
        match machine.kind() {
            StateKind::Patrol => patrol += 1,
            StateKind::Defense | StateKind::Aggressive => combat += 1,
            StateKind::LostPlayer => search += 1,
            _ => other += 1,
        }
    }

    println!(
        "Tick {}: patrol={} combat={} search={} other={}",
        tick, patrol, combat, search, other
    );
}
