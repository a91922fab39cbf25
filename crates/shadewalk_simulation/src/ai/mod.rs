//! AI подсистема: FSM агентов, awareness, alert propagation
//!
//! Порядок внутри тика:
//! - Decide: agent_fsm (решения состояний, переходы на границе тика)
//! - React: реакции на события этого тика (урон, шум, ослепление,
//!   alert broadcast) → флаги Awareness, которые states опросят на
//!   СЛЕДУЮЩЕМ тике

use bevy::prelude::*;

pub mod alert;
pub mod awareness;
pub mod state;
pub mod states;
pub mod transitions;

// Re-export основных типов
pub use alert::{propagate_alerts, AlertEvent, ALERT_RADIUS};
pub use awareness::{Awareness, BlindedEvent, DamageMemory, NoiseEvent};
pub use state::{
    AgentState, AggressiveConfig, AiProfile, BlindnessConfig, DeathConfig, DefenseConfig,
    EngagePolicy, PatrolConfig, SearchConfig, StateKind, StateMachine,
};
pub use transitions::{agent_fsm, FsmOutput, StateCtx, TargetView};

use crate::SimSet;

/// AI Plugin
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<AlertEvent>()
            .add_event::<NoiseEvent>()
            .add_event::<BlindedEvent>();

        app.add_systems(FixedUpdate, transitions::agent_fsm.in_set(SimSet::Decide));

        app.add_systems(
            FixedUpdate,
            (
                awareness::remember_damage,
                awareness::hear_noises,
                awareness::apply_blindness,
                alert::propagate_alerts,
            )
                .chain()
                .in_set(SimSet::React),
        );
    }
}
