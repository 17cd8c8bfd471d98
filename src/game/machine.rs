use std::collections::HashMap;

use bevy::prelude::*;

use super::components::{
    ActionBuffer, ActionInput, AttackArsenal, AttackCooldown, Controllable, Facing, Grounded,
    Intent, MoveProfile, OffenseControl, Perception, Velocity,
};
use super::stats::EntityStats;
use crate::config::tuning::Tuning;

/// Everything a state may read or mutate during one tick. Borrows the
/// owning entity's components; states never reach across to another
/// entity.
pub struct StateCtx<'a> {
    pub dt: f32,
    pub tuning: &'a Tuning,
    pub stats: &'a EntityStats,
    pub profile: &'a MoveProfile,
    pub velocity: &'a mut Vec2,
    pub grounded: bool,
    pub facing: &'a mut Facing,
    pub intent: &'a Intent,
    pub offense: &'a mut OffenseControl,
    pub arsenal: Option<&'a AttackArsenal>,
    pub perception: Perception,
    pub cooldown: Option<&'a mut AttackCooldown>,
}

/// One behavior state. States own their timers as plain countdown fields
/// and must reset them in `exit` so nothing stale fires into the next
/// state.
pub trait State: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    fn enter(&mut self, _ctx: &mut StateCtx<'_>) {}

    fn exit(&mut self, _ctx: &mut StateCtx<'_>) {}

    /// Runs once per fixed tick while active. Returns the name of the
    /// state to transition to, if any.
    fn physics_update(&mut self, _ctx: &mut StateCtx<'_>) -> Option<&'static str> {
        None
    }

    /// Handles one discrete action while active.
    fn handle_input(
        &mut self,
        _ctx: &mut StateCtx<'_>,
        _action: ActionInput,
    ) -> Option<&'static str> {
        None
    }
}

/// Per-entity finite-state machine. Holds no transition table beyond name
/// lookup; states request their own exits.
#[derive(Component)]
pub struct StateMachine {
    states: HashMap<&'static str, Box<dyn State>>,
    current: Option<&'static str>,
    initial: &'static str,
    pending: Option<&'static str>,
}

impl StateMachine {
    pub fn new(initial: &'static str) -> Self {
        Self {
            states: HashMap::new(),
            current: None,
            initial,
            pending: None,
        }
    }

    pub fn with_state(mut self, state: impl State) -> Self {
        self.states.insert(state.name(), Box::new(state));
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.current.is_some()
    }

    /// Current state name, for debug/UI display.
    pub fn current_name(&self) -> Option<&'static str> {
        self.current
    }

    /// Enter the designated initial state. Idempotent.
    pub fn initialize(&mut self, ctx: &mut StateCtx<'_>) {
        if self.current.is_some() {
            return;
        }
        match self.states.get_mut(self.initial) {
            Some(state) => {
                self.current = Some(self.initial);
                state.enter(ctx);
            }
            None => error!("state machine: initial state '{}' not registered", self.initial),
        }
    }

    /// Queue a transition from outside the machine (hurt wiring, AI
    /// perception). Applied at the start of the next update so Enter and
    /// Exit always run with a full context.
    pub fn request(&mut self, name: &'static str) {
        self.pending = Some(name);
    }

    /// Dispatch one buffered action to the current state.
    pub fn handle_input(&mut self, ctx: &mut StateCtx<'_>, action: ActionInput) {
        let Some(current) = self.current else {
            return;
        };
        let next = self
            .states
            .get_mut(current)
            .and_then(|state| state.handle_input(ctx, action));
        if let Some(next) = next {
            self.transition_to(next, ctx);
        }
    }

    /// Per-tick update of the current state.
    pub fn physics_update(&mut self, ctx: &mut StateCtx<'_>) {
        if !self.is_initialized() {
            return;
        }
        if let Some(pending) = self.pending.take() {
            self.transition_to(pending, ctx);
        }
        let Some(current) = self.current else {
            return;
        };
        let next = self
            .states
            .get_mut(current)
            .and_then(|state| state.physics_update(ctx));
        if let Some(next) = next {
            self.transition_to(next, ctx);
        }
    }

    /// Transition by name. Unknown names are logged and leave the current
    /// state unchanged; transitioning to the current state is a no-op.
    pub fn transition_to(&mut self, name: &'static str, ctx: &mut StateCtx<'_>) {
        if !self.states.contains_key(name) {
            error!("state machine: unknown state '{name}'");
            return;
        }
        let Some(current) = self.current else {
            return;
        };
        if current == name {
            return;
        }
        if let Some(old) = self.states.get_mut(current) {
            old.exit(ctx);
        }
        debug!("state machine: {current} -> {name}");
        self.current = Some(name);
        if let Some(new) = self.states.get_mut(name) {
            new.enter(ctx);
        }
    }
}

/// StateUpdateSet: drain buffered actions into the current state, then
/// run its per-tick update. One system drives every machine so input is
/// always applied before movement within the same tick.
pub fn drive_state_machines(
    tuning: Res<Tuning>,
    mut query: Query<(
        &mut StateMachine,
        &mut Velocity,
        &mut Facing,
        &mut OffenseControl,
        &mut ActionBuffer,
        &Grounded,
        &Intent,
        &EntityStats,
        &MoveProfile,
        Option<&AttackArsenal>,
        Option<&Perception>,
        Option<&mut AttackCooldown>,
        &Controllable,
    )>,
) {
    for (
        mut machine,
        mut velocity,
        mut facing,
        mut offense,
        mut buffer,
        grounded,
        intent,
        stats,
        profile,
        arsenal,
        perception,
        mut cooldown,
        controllable,
    ) in &mut query
    {
        let mut ctx = StateCtx {
            dt: tuning.dt,
            tuning: &tuning,
            stats,
            profile,
            velocity: &mut velocity.0,
            grounded: grounded.0,
            facing: &mut facing,
            intent,
            offense: &mut offense,
            arsenal,
            perception: perception.copied().unwrap_or_default(),
            cooldown: cooldown.as_deref_mut(),
        };
        machine.initialize(&mut ctx);
        if controllable.0 {
            let actions: Vec<ActionInput> = buffer.drain().collect();
            for action in actions {
                machine.handle_input(&mut ctx, action);
            }
        } else {
            buffer.clear();
        }
        machine.physics_update(&mut ctx);
    }
}
