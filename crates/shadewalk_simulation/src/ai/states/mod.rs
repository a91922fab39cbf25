//! Конкретные состояния агента
//!
//! Каждый модуль — одна функция решения `update(ctx, ...поля варианта)`,
//! возвращающая Some(следующее состояние) или None (остаёмся).
//! Side effects входа/выхода применяет transitions, не сами состояния.

pub mod aggressive;
pub mod blinded;
pub mod death;
pub mod defense;
pub mod lost_player;
pub mod patrol;
