//! FSM tick: решения состояний и применение переходов
//!
//! Инварианты:
//! - у агента ровно одно активное состояние на любом тике
//! - не больше одного перехода за тик, только на границе тика
//! - при переходе exit старого ВСЕГДА раньше enter нового
//! - решение "тот же kind" = stay-сигнал, без повторного exit/enter
//! - Dead — терминальная защёлка, FSM пропускает агента целиком
//!
//! Cross-cutting реакции (летальный урон, melee в слепоте, ослепление)
//! проверяются до state-решения — удар срабатывает в любом состоянии.

use bevy::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::ai::alert::{AlertEvent, ALERT_RADIUS};
use crate::ai::states;
use crate::ai::{AgentState, AiProfile, Awareness, StateKind, StateMachine};
use crate::combat::{KnockbackState, MeleeAttackIntent, MeleeWeapon, RangedAttackIntent};
use crate::components::{Agent, Health, PatrolRoute, Player, PlayerPosture};
use crate::cues::{AnimationCue, CueKind};
use crate::nav::{FacingIntent, NavAgent};
use crate::spatial::WorldGeometry;
use crate::vision::{self, SightTarget, VisionCone};
use crate::DeterministicRng;

/// Снимок цели на текущий тик (read-only взгляд AI на игрока)
#[derive(Debug, Clone, Copy)]
pub struct TargetView {
    pub entity: Entity,
    pub position: Vec3,
    pub forward: Vec3,
    pub posture: PlayerPosture,
    pub alive: bool,
}

/// Буфер исходящих событий одного FSM-тика (flush после решения)
#[derive(Default)]
pub struct FsmOutput {
    pub melee: Vec<MeleeAttackIntent>,
    pub ranged: Vec<RangedAttackIntent>,
    pub alerts: Vec<AlertEvent>,
    pub cues: Vec<AnimationCue>,
}

/// Всё, что state видит и трогает на своём тике
///
/// destination/speed пишет только активный state через ctx.nav —
/// эксклюзивное владение фасадом на тик.
pub struct StateCtx<'a> {
    pub entity: Entity,
    pub faction_id: u64,
    pub profile: &'a AiProfile,
    pub transform: &'a Transform,
    pub nav: &'a mut NavAgent,
    pub route: &'a mut PatrolRoute,
    pub vision: &'a mut VisionCone,
    pub awareness: &'a mut Awareness,
    pub weapon: Option<&'a MeleeWeapon>,
    pub target: Option<TargetView>,
    pub geometry: &'a WorldGeometry,
    pub rng: &'a mut ChaCha8Rng,
    pub out: &'a mut FsmOutput,
    pub dt: f32,
}

impl StateCtx<'_> {
    /// Цель, если она задана и жива
    pub fn target_alive(&self) -> Option<TargetView> {
        self.target.filter(|t| t.alive)
    }

    /// Видимость цели с кэдансом конуса (между пересчётами — кэш)
    pub fn sees_target(&mut self) -> bool {
        let Some(target) = self.target_alive() else {
            self.vision.record(false);
            return false;
        };
        if self.vision.due(self.dt) {
            let verdict = vision::can_see(
                self.transform.translation,
                *self.transform.forward(),
                SightTarget {
                    position: target.position,
                    forward: target.forward,
                    wall_hugging: target.posture.wall_hugging,
                },
                self.vision,
                self.geometry,
            );
            self.vision.record(verdict);
        }
        self.vision.last_verdict()
    }

    /// Видимость с cost-control порогом: вдали от цели конус не считаем
    pub fn sees_target_within(&mut self, wake_range: f32) -> bool {
        let Some(target) = self.target_alive() else {
            return false;
        };
        if self.transform.translation.distance(target.position) > wake_range {
            return false;
        }
        self.sees_target()
    }

    /// Горизонтальная дистанция до точки
    pub fn distance_to(&self, point: Vec3) -> f32 {
        let delta = point - self.transform.translation;
        Vec3::new(delta.x, 0.0, delta.z).length()
    }

    /// dot(forward, направление на точку) — "насколько лицом"
    pub fn facing_dot(&self, point: Vec3) -> f32 {
        let to_point = Vec3::new(
            point.x - self.transform.translation.x,
            0.0,
            point.z - self.transform.translation.z,
        );
        if to_point.length_squared() < 1e-6 {
            return 1.0;
        }
        (*self.transform.forward()).dot(to_point.normalize())
    }

    /// Broadcast "цель обнаружена" (политика обнаружившего state)
    pub fn broadcast_alert(&mut self, target_pos: Vec3) {
        self.out.alerts.push(AlertEvent {
            origin: self.entity,
            origin_pos: self.transform.translation,
            faction_id: self.faction_id,
            target_pos,
            radius: ALERT_RADIUS,
        });
        self.out.cues.push(AnimationCue {
            entity: self.entity,
            kind: CueKind::Alerted,
        });
    }
}

/// Система: FSM-тик всех агентов (Decide-фаза)
#[allow(clippy::type_complexity, clippy::too_many_arguments)]
pub fn agent_fsm(
    mut agents: Query<
        (
            Entity,
            &mut Agent,
            &AiProfile,
            &mut StateMachine,
            &Health,
            &mut NavAgent,
            &mut PatrolRoute,
            &mut VisionCone,
            &mut Awareness,
            &Transform,
            Option<&MeleeWeapon>,
            Option<&KnockbackState>,
        ),
        Without<Player>,
    >,
    players: Query<(Entity, &Transform, &PlayerPosture, &Health), With<Player>>,
    geometry: Res<WorldGeometry>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time<Fixed>>,
    mut commands: Commands,
    mut melee_events: EventWriter<MeleeAttackIntent>,
    mut ranged_events: EventWriter<RangedAttackIntent>,
    mut alert_events: EventWriter<AlertEvent>,
    mut cue_events: EventWriter<AnimationCue>,
) {
    let dt = time.delta_secs();

    // Цель: единственный игрок сцены; отсутствие терпим (re-acquire позже)
    let target_view = players
        .iter()
        .next()
        .map(|(entity, transform, posture, health)| TargetView {
            entity,
            position: transform.translation,
            forward: *transform.forward(),
            posture: *posture,
            alive: health.is_alive(),
        });

    for (
        entity,
        mut agent,
        profile,
        mut machine,
        health,
        mut nav,
        mut route,
        mut vision_cone,
        mut awareness,
        transform,
        weapon,
        knockback,
    ) in agents.iter_mut()
    {
        if machine.is_terminal() {
            continue;
        }

        agent.target = target_view.map(|t| t.entity);
        let alive = health.is_alive();
        let knocked_back = knockback.is_some();

        let mut output = FsmOutput::default();
        {
            let mut ctx = StateCtx {
                entity,
                faction_id: agent.faction_id,
                profile,
                transform,
                nav: &mut nav,
                route: &mut route,
                vision: &mut vision_cone,
                awareness: &mut awareness,
                weapon,
                target: target_view,
                geometry: &geometry,
                rng: &mut rng.rng,
                out: &mut output,
                dt,
            };

            // Cross-cutting переходы: работают в любом не-терминальном state
            let forced = forced_transition(&machine, alive, &mut ctx);

            let decision = if forced.is_some() {
                forced
            } else if knocked_back {
                // Knockback владеет агентом: policy-переходы приостановлены
                None
            } else {
                match machine.current_mut() {
                    AgentState::Patrol { wait_timer } => states::patrol::update(&mut ctx, wait_timer),
                    AgentState::Defense {
                        standoff,
                        relocate_timer,
                        harass_timer,
                    } => states::defense::update(&mut ctx, standoff, relocate_timer, harass_timer),
                    AgentState::Aggressive { lost_sight_timer } => {
                        states::aggressive::update(&mut ctx, lost_sight_timer)
                    }
                    AgentState::LostPlayer {
                        search_point,
                        reached,
                        look_timer,
                        glance_timer,
                    } => states::lost_player::update(
                        &mut ctx,
                        search_point,
                        reached,
                        look_timer,
                        glance_timer,
                    ),
                    AgentState::Blinded { timer } => states::blinded::update(&mut ctx, timer),
                    AgentState::Dead => None,
                }
            };

            if let Some(next) = decision {
                let old_kind = machine.kind();
                let next_kind = next.kind();
                if next_kind != old_kind {
                    // Порядок фиксирован: exit старого → enter нового
                    exit_state(old_kind, &mut ctx);
                    enter_state(&next, &mut ctx, &mut commands);
                    machine.set(next);
                    crate::log_info(&format!(
                        "AI: {:?} {:?} → {:?}",
                        entity, old_kind, next_kind
                    ));
                }
                // Тот же kind — stay-сигнал, без re-entry
            }
        }

        for intent in output.melee.drain(..) {
            melee_events.write(intent);
        }
        for intent in output.ranged.drain(..) {
            ranged_events.write(intent);
        }
        for alert in output.alerts.drain(..) {
            alert_events.write(alert);
        }
        for cue in output.cues.drain(..) {
            cue_events.write(cue);
        }
    }
}

/// Cross-cutting переходы (до state-решения, в любом состоянии)
///
/// 1. Летальный урон → Dead (в том числе после stealth kill)
/// 2. Melee, полученный в слепоте → Dead
/// 3. Ожидающее ослепление → Blinded
fn forced_transition(
    machine: &StateMachine,
    alive: bool,
    ctx: &mut StateCtx,
) -> Option<AgentState> {
    if !alive {
        return Some(AgentState::dead());
    }

    if machine.kind() == StateKind::Blinded {
        // Флаг ослепления в слепоте не стакается
        ctx.awareness.blind_pending = None;

        if ctx.awareness.damaged_by.map(|m| m.melee).unwrap_or(false) {
            return Some(AgentState::dead());
        }
        return None;
    }

    ctx.awareness
        .blind_pending
        .take()
        .map(AgentState::blinded)
}

/// OnExit: отмена in-flight действий старого состояния
///
/// Таймеры активации умирают вместе с вариантом; здесь гасим то, что
/// живёт вне варианта (destination фасада, пауза слепоты).
fn exit_state(old: StateKind, ctx: &mut StateCtx) {
    ctx.nav.clear_destination();
    if old == StateKind::Blinded {
        ctx.nav.resume();
    }
}

/// OnEnter: side effects нового состояния
fn enter_state(next: &AgentState, ctx: &mut StateCtx, commands: &mut Commands) {
    match next {
        AgentState::Patrol { .. } => {
            ctx.vision.reset();
            ctx.nav.resume();
            ctx.nav.speed = ctx.profile.patrol.move_speed;
            ctx.nav.face = FacingIntent::Movement;
        }
        AgentState::Defense { .. } => {
            ctx.vision.reset();
            ctx.nav.resume();
            if let Some(cfg) = ctx.profile.defense.as_ref() {
                ctx.nav.speed = cfg.move_speed;
            }
            if let Some(target) = ctx.target {
                ctx.nav.face = FacingIntent::At(target.position);
            }
        }
        AgentState::Aggressive { .. } => {
            ctx.vision.reset();
            ctx.nav.resume();
            if let Some(cfg) = ctx.profile.aggressive.as_ref() {
                ctx.nav.speed = cfg.move_speed;
            }
            if let Some(target) = ctx.target {
                ctx.nav.face = FacingIntent::At(target.position);
            }
        }
        AgentState::LostPlayer { search_point, .. } => {
            ctx.vision.reset();
            ctx.nav.resume();
            ctx.nav.speed = ctx.profile.search.move_speed;
            ctx.nav.face = FacingIntent::Movement;
            ctx.nav.set_destination(*search_point);
        }
        AgentState::Blinded { .. } => {
            ctx.nav.stop();
            // Считаем только удары, полученные ВО ВРЕМЯ слепоты
            ctx.awareness.damaged_by = None;
            ctx.out.cues.push(AnimationCue {
                entity: ctx.entity,
                kind: CueKind::Blinded,
            });
        }
        AgentState::Dead => states::death::enter(ctx, commands),
    }
}
