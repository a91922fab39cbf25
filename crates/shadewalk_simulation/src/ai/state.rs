//! FSM агента: состояния, машина, archetype-профиль
//!
//! Состояние — enum-вариант с полями активации (таймеры, суб-фазы);
//! конструктор варианта = OnEnter-сброс, поля умирают вместе с вариантом
//! на выходе — stale-таймеры невозможны по построению. Состояния
//! per-agent по построению (значение в компоненте агента), никакого
//! шаринга между агентами.

use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Активное состояние агента с полями активации
#[derive(Debug, Clone, PartialEq, Reflect)]
pub enum AgentState {
    /// Обход маршрута; wait_timer = Some пока стоим на точке
    Patrol { wait_timer: Option<f32> },

    /// Держим дистанцию от цели, стрейфим, harass-выстрелы
    Defense {
        /// Рандомизированная stand-off дистанция (фиксируется на вход)
        standoff: f32,
        /// До следующей перестановки/стрейфа
        relocate_timer: f32,
        /// До следующего harass-выстрела
        harass_timer: f32,
    },

    /// Сближение в melee-полосу, атаки по каденсу оружия
    Aggressive {
        /// Сколько секунд цель не видна (grace → LostPlayer)
        lost_sight_timer: f32,
    },

    /// Идём к последней известной позиции, потом осматриваемся
    LostPlayer {
        search_point: Vec3,
        /// Дошли до точки поиска
        reached: bool,
        /// Остаток осмотра (после reached)
        look_timer: f32,
        /// До следующего случайного поворота головы
        glance_timer: f32,
    },

    /// Ослеплён: движение отключено; melee в слепоте летален
    Blinded { timer: f32 },

    /// Терминальное состояние: FSM агента больше не тикается
    Dead,
}

impl AgentState {
    pub fn patrol() -> Self {
        Self::Patrol { wait_timer: None }
    }

    pub fn defense(cfg: &DefenseConfig, rng: &mut ChaCha8Rng) -> Self {
        Self::Defense {
            standoff: rng.gen_range(cfg.standoff_min..=cfg.standoff_max),
            relocate_timer: 0.0,
            harass_timer: cfg.harass_interval,
        }
    }

    pub fn aggressive() -> Self {
        Self::Aggressive {
            lost_sight_timer: 0.0,
        }
    }

    pub fn lost_player(cfg: &SearchConfig, search_point: Vec3) -> Self {
        Self::LostPlayer {
            search_point,
            reached: false,
            look_timer: cfg.look_duration,
            glance_timer: 0.0,
        }
    }

    pub fn blinded(duration: f32) -> Self {
        Self::Blinded { timer: duration }
    }

    pub fn dead() -> Self {
        Self::Dead
    }

    pub fn kind(&self) -> StateKind {
        match self {
            Self::Patrol { .. } => StateKind::Patrol,
            Self::Defense { .. } => StateKind::Defense,
            Self::Aggressive { .. } => StateKind::Aggressive,
            Self::LostPlayer { .. } => StateKind::LostPlayer,
            Self::Blinded { .. } => StateKind::Blinded,
            Self::Dead => StateKind::Dead,
        }
    }
}

/// Дискриминант состояния (для логов, сравнений, тестов)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum StateKind {
    Patrol,
    Defense,
    Aggressive,
    LostPlayer,
    Blinded,
    Dead,
}

/// Машина состояний агента: ровно одно активное состояние
///
/// Переходы применяет только transitions::agent_fsm и только на границе
/// тика; решение "тот же kind" трактуется как stay (без exit/enter).
/// Dead — терминальная защёлка: set() в ней игнорируется.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct StateMachine {
    current: AgentState,
}

impl StateMachine {
    pub fn new(initial: AgentState) -> Self {
        Self { current: initial }
    }

    /// Стандартный старт: патруль
    pub fn patrolling() -> Self {
        Self::new(AgentState::patrol())
    }

    pub fn current(&self) -> &AgentState {
        &self.current
    }

    pub(crate) fn current_mut(&mut self) -> &mut AgentState {
        &mut self.current
    }

    pub fn kind(&self) -> StateKind {
        self.current.kind()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.current, AgentState::Dead)
    }

    /// Экспозиция для camera/targeting системы
    pub fn targeting_active(&self) -> bool {
        matches!(self.kind(), StateKind::Defense | StateKind::Aggressive)
    }

    pub(crate) fn set(&mut self, next: AgentState) {
        if self.is_terminal() {
            return;
        }
        self.current = next;
    }
}

// ============================================================================
// Archetype-конфигурация (immutable, states строятся из неё на вход)
// ============================================================================

#[derive(Debug, Clone, Reflect, Serialize, Deserialize)]
pub struct PatrolConfig {
    pub move_speed: f32,
    /// Порог cost-control: конус пересчитываем только когда цель ближе
    pub vision_wake_range: f32,
}

impl Default for PatrolConfig {
    fn default() -> Self {
        Self {
            move_speed: 1.4,
            vision_wake_range: 16.0,
        }
    }
}

#[derive(Debug, Clone, Reflect, Serialize, Deserialize)]
pub struct DefenseConfig {
    pub move_speed: f32,
    pub standoff_min: f32,
    pub standoff_max: f32,
    /// Допуск удержания дистанции до перестановки
    pub standoff_slack: f32,
    /// Интервал стрейфа по окружности stand-off
    pub strafe_interval: f32,
    pub harass_interval: f32,
    /// Минимальный dot(fwd, на цель) для выстрела
    pub harass_facing_min: f32,
    /// Ближе этого melee-размен оправдан → Aggressive
    pub engage_range: f32,
}

impl Default for DefenseConfig {
    fn default() -> Self {
        Self {
            move_speed: 2.6,
            standoff_min: 5.0,
            standoff_max: 7.5,
            standoff_slack: 0.75,
            strafe_interval: 1.6,
            harass_interval: 2.0,
            harass_facing_min: 0.85,
            engage_range: 3.0,
        }
    }
}

#[derive(Debug, Clone, Reflect, Serialize, Deserialize)]
pub struct AggressiveConfig {
    pub move_speed: f32,
    /// Melee-полоса: ближе — стоим и бьём, дальше — сближаемся
    pub melee_band: f32,
    /// Минимальный dot(fwd, на цель) для замаха
    pub strike_facing_min: f32,
    /// Сколько секунд без LOS до ухода в LostPlayer
    pub lost_sight_grace: f32,
}

impl Default for AggressiveConfig {
    fn default() -> Self {
        Self {
            move_speed: 3.4,
            melee_band: 1.8,
            strike_facing_min: 0.8,
            lost_sight_grace: 2.0,
        }
    }
}

#[derive(Debug, Clone, Reflect, Serialize, Deserialize)]
pub struct SearchConfig {
    pub move_speed: f32,
    /// Длительность осмотра на точке поиска
    pub look_duration: f32,
    /// Интервал случайных поворотов головы
    pub glance_interval: f32,
    /// Разброс вокруг источника звука (неуверенность)
    pub noise_jitter: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            move_speed: 2.8,
            look_duration: 4.0,
            glance_interval: 1.0,
            noise_jitter: 1.5,
        }
    }
}

#[derive(Debug, Clone, Reflect, Serialize, Deserialize)]
pub struct BlindnessConfig {
    pub duration: f32,
}

impl Default for BlindnessConfig {
    fn default() -> Self {
        Self { duration: 3.0 }
    }
}

#[derive(Debug, Clone, Reflect, Serialize, Deserialize)]
pub struct DeathConfig {
    /// Задержка до удаления тела (death-sequence)
    pub removal_delay: f32,
}

impl Default for DeathConfig {
    fn default() -> Self {
        Self { removal_delay: 4.0 }
    }
}

/// Порядок вступления в бой, разрешается один раз при сборке профиля
/// (вместо ad-hoc цепочек fallback'ов на каждом переходе)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub enum EngagePolicy {
    /// Сначала держим дистанцию (Defense)
    DefenseFirst,
    /// Сразу в melee (архетип без Defense)
    AggressiveOnly,
    /// Боевых состояний нет — держим патруль
    HoldPatrol,
}

/// Immutable archetype-профиль агента
///
/// Агент владеет копией; состояния строятся из конфига на каждый вход.
#[derive(Component, Debug, Clone, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct AiProfile {
    pub patrol: PatrolConfig,
    pub defense: Option<DefenseConfig>,
    pub aggressive: Option<AggressiveConfig>,
    pub search: SearchConfig,
    pub blindness: BlindnessConfig,
    pub death: DeathConfig,
    engage: EngagePolicy,
}

impl AiProfile {
    pub fn new(
        patrol: PatrolConfig,
        defense: Option<DefenseConfig>,
        aggressive: Option<AggressiveConfig>,
        search: SearchConfig,
        blindness: BlindnessConfig,
        death: DeathConfig,
    ) -> Self {
        // Fallback Defense → Aggressive → Patrol решаем здесь, один раз
        let engage = if defense.is_some() {
            EngagePolicy::DefenseFirst
        } else if aggressive.is_some() {
            EngagePolicy::AggressiveOnly
        } else {
            EngagePolicy::HoldPatrol
        };
        Self {
            patrol,
            defense,
            aggressive,
            search,
            blindness,
            death,
            engage,
        }
    }

    /// Полный страж: Defense + Aggressive
    pub fn guard() -> Self {
        Self::new(
            PatrolConfig::default(),
            Some(DefenseConfig::default()),
            Some(AggressiveConfig::default()),
            SearchConfig::default(),
            BlindnessConfig::default(),
            DeathConfig::default(),
        )
    }

    /// Миньон без Defense: из патруля сразу в melee
    pub fn brute() -> Self {
        Self::new(
            PatrolConfig::default(),
            None,
            Some(AggressiveConfig::default()),
            SearchConfig::default(),
            BlindnessConfig::default(),
            DeathConfig::default(),
        )
    }

    pub fn engage_policy(&self) -> EngagePolicy {
        self.engage
    }

    /// Состояние вступления в бой по политике архетипа
    ///
    /// None = боевых состояний не сконфигурировано, вызывающий state
    /// держит позицию (деградация вместо падения).
    pub fn engage_state(&self, rng: &mut ChaCha8Rng) -> Option<AgentState> {
        match self.engage {
            EngagePolicy::DefenseFirst => {
                self.defense.as_ref().map(|cfg| AgentState::defense(cfg, rng))
            }
            EngagePolicy::AggressiveOnly => {
                self.aggressive.as_ref().map(|_| AgentState::aggressive())
            }
            EngagePolicy::HoldPatrol => None,
        }
    }
}

impl Default for AiProfile {
    fn default() -> Self {
        Self::guard()
    }
}
