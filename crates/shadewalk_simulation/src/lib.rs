//! SHADEWALK Simulation Core
//!
//! Headless ECS-симуляция AI противников для action-stealth (Bevy 0.16):
//! конус обзора, FSM patrol/defense/aggressive/lost-player/blindness/death,
//! melee с блоком/перекатом/stealth kill, knockback, alert соседям.
//!
//! HYBRID ARCHITECTURE:
//! - ECS = strategic layer (решения AI, combat rules, game state)
//! - Движок-хост = tactical layer (рендер, анимация, реальный pathfinder
//!   за фасадом NavAgent, ввод игрока)

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod components;
pub mod cues;
pub mod logger;
pub mod nav;
pub mod spatial;
pub mod spawn;
pub mod vision;

// Re-export базовых типов для удобства
pub use ai::{AIPlugin, AgentState, AiProfile, Awareness, StateKind, StateMachine};
pub use combat::{CombatPlugin, DamageDealt, DamageKind, EntityDied, MeleeWeapon};
pub use components::*;
pub use cues::{AnimationCue, CueKind, SlowMotionRequested};
pub use logger::{
    init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger,
    set_logger_if_needed, LogLevel, LogPrinter,
};
pub use nav::{NavAgent, NavPlugin};
pub use spatial::{Obstacle, WorldGeometry};
pub use spawn::{spawn_agent, spawn_player};
pub use vision::VisionCone;

/// Частота simulation tick (Гц)
pub const SIM_TICK_HZ: f64 = 60.0;

/// Фазы одного fixed-тика (строгий порядок — детерминизм)
///
/// Decide: FSM-решения → Act: навигация, фазы атак, выстрелы →
/// Resolve: урон/knockback/despawn → React: awareness-флаги на след. тик
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    Decide,
    Act,
    Resolve,
    React,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(SIM_TICK_HZ));

        // Seed по умолчанию; уже вставленный (create_headless_app) не трогаем
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }
        // Геометрию уровня может вставить level-код до plugin'а
        if !app.world().contains_resource::<WorldGeometry>() {
            app.init_resource::<WorldGeometry>();
        }

        app.configure_sets(
            FixedUpdate,
            (SimSet::Decide, SimSet::Act, SimSet::Resolve, SimSet::React).chain(),
        );

        app.add_event::<AnimationCue>()
            .add_event::<SlowMotionRequested>();

        app.add_plugins((AIPlugin, NavPlugin, CombatPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Minimal Bevy App для headless симуляции
///
/// TimeUpdateStrategy::ManualDuration: один app.update() == ровно один
/// fixed тик, независимо от wall clock — прогоны воспроизводимы.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();

    let tick = std::time::Duration::from_secs_f64(1.0 / SIM_TICK_HZ);
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(SIM_TICK_HZ))
        .insert_resource(TimeUpdateStrategy::ManualDuration(tick));

    app
}

/// Snapshot мира для сравнения детерминизма
///
/// Компоненты сортируются по Entity и сериализуются через Debug —
/// достаточно для побайтового сравнения прогонов.
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
