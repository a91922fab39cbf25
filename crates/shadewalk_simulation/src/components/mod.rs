//! ECS components игровых entity
//!
//! Организация по доменам:
//! - actor: агент и его характеристики (faction, target, health)
//! - player: read-only интерфейс цели (marker + stealth posture)
//! - patrol: маршрут патруля (точки, ожидание, циклический обход)

pub mod actor;
pub mod patrol;
pub mod player;

// Re-exports для удобного импорта
pub use actor::*;
pub use patrol::*;
pub use player::*;
