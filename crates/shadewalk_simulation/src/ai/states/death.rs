//! Death: терминальное состояние и removal-последовательность
//!
//! Вход: коллизия и навигация отключаются, вешается DespawnAfter.
//! Спавн лута и сам despawn выполняет combat::despawn_after_timeout;
//! FSM мёртвого агента больше не тикается (терминальная защёлка).

use bevy::prelude::*;
use bevy_rapier3d::prelude::ColliderDisabled;

use crate::ai::transitions::StateCtx;
use crate::combat::{Dead, DespawnAfter, MeleeAttackState};
use crate::cues::{AnimationCue, CueKind};

/// OnEnter Death (вызывается из transitions::enter_state)
pub fn enter(ctx: &mut StateCtx, commands: &mut Commands) {
    ctx.nav.stop();
    ctx.nav.clear_destination();

    // Незавершённый замах умирает вместе с агентом
    commands.entity(ctx.entity).remove::<MeleeAttackState>();
    commands.entity(ctx.entity).insert((
        Dead,
        DespawnAfter::new(ctx.profile.death.removal_delay),
        ColliderDisabled,
    ));

    ctx.out.cues.push(AnimationCue {
        entity: ctx.entity,
        kind: CueKind::DeathCollapse,
    });

    crate::log_info(&format!(
        "💀 Agent {:?} died (removal in {:.1}s)",
        ctx.entity, ctx.profile.death.removal_delay
    ));
}
