use bevy::prelude::*;

use crate::game::components::{ActionInput, AttackSlot};
use crate::game::machine::{State, StateCtx};
use crate::game::movement;
use crate::game::types::Seconds;

/// Bind the chosen attack to the offense control and hand over to the
/// Attack state. Logged no-op when no attack definitions are assigned.
fn queue_attack(ctx: &mut StateCtx<'_>, slot: AttackSlot) -> Option<&'static str> {
    let Some(arsenal) = ctx.arsenal else {
        error!("attack requested with no attack definitions assigned");
        return None;
    };
    ctx.offense.set_attack(arsenal.get(slot).clone());
    Some("Attack")
}

fn update_facing(ctx: &mut StateCtx<'_>) {
    if ctx.intent.move_dir != 0.0 {
        ctx.facing.right = ctx.intent.move_dir > 0.0;
    }
}

/// Horizontal control shared by the grounded and airborne states.
fn steer(ctx: &mut StateCtx<'_>) {
    if ctx.intent.move_dir != 0.0 {
        movement::apply_horizontal(
            ctx.velocity,
            ctx.intent.move_dir,
            ctx.stats.speed,
            ctx.profile.accel,
            ctx.dt,
        );
        update_facing(ctx);
    } else {
        movement::apply_friction(ctx.velocity, ctx.profile.friction, ctx.dt);
    }
}

// ── Idle ────────────────────────────────────────────────────────────

pub struct Idle;

impl State for Idle {
    fn name(&self) -> &'static str {
        "Idle"
    }

    fn physics_update(&mut self, ctx: &mut StateCtx<'_>) -> Option<&'static str> {
        movement::apply_gravity(ctx.velocity, ctx.grounded, ctx.tuning, ctx.profile, ctx.dt);
        movement::apply_friction(ctx.velocity, ctx.profile.friction, ctx.dt);

        if !ctx.grounded {
            return Some("Fall");
        }
        if ctx.intent.move_dir != 0.0 {
            return Some("Run");
        }
        None
    }

    fn handle_input(
        &mut self,
        ctx: &mut StateCtx<'_>,
        action: ActionInput,
    ) -> Option<&'static str> {
        match action {
            ActionInput::JumpPressed if ctx.grounded => Some("Jump"),
            ActionInput::Attack(slot) => queue_attack(ctx, slot),
            _ => None,
        }
    }
}

// ── Run ─────────────────────────────────────────────────────────────

pub struct Run;

impl State for Run {
    fn name(&self) -> &'static str {
        "Run"
    }

    fn physics_update(&mut self, ctx: &mut StateCtx<'_>) -> Option<&'static str> {
        movement::apply_gravity(ctx.velocity, ctx.grounded, ctx.tuning, ctx.profile, ctx.dt);
        steer(ctx);

        if !ctx.grounded {
            return Some("Fall");
        }
        if ctx.intent.move_dir == 0.0 {
            return Some("Idle");
        }
        None
    }

    fn handle_input(
        &mut self,
        ctx: &mut StateCtx<'_>,
        action: ActionInput,
    ) -> Option<&'static str> {
        match action {
            ActionInput::JumpPressed if ctx.grounded => Some("Jump"),
            ActionInput::Attack(slot) => queue_attack(ctx, slot),
            _ => None,
        }
    }
}

// ── Jump ────────────────────────────────────────────────────────────

pub struct Jump;

impl State for Jump {
    fn name(&self) -> &'static str {
        "Jump"
    }

    fn enter(&mut self, ctx: &mut StateCtx<'_>) {
        ctx.velocity.y = ctx.profile.jump_velocity;
    }

    fn physics_update(&mut self, ctx: &mut StateCtx<'_>) -> Option<&'static str> {
        movement::apply_gravity(ctx.velocity, ctx.grounded, ctx.tuning, ctx.profile, ctx.dt);
        steer(ctx);

        // Ascent over: hand off to Fall.
        if ctx.velocity.y <= 0.0 {
            return Some("Fall");
        }
        None
    }

    fn handle_input(
        &mut self,
        ctx: &mut StateCtx<'_>,
        action: ActionInput,
    ) -> Option<&'static str> {
        match action {
            // Variable jump height: release early for a shorter arc.
            ActionInput::JumpReleased => {
                if ctx.velocity.y > 0.0 {
                    ctx.velocity.y *= ctx.profile.jump_cut_multiplier;
                }
                None
            }
            ActionInput::Attack(slot) => queue_attack(ctx, slot),
            _ => None,
        }
    }
}

// ── Fall ────────────────────────────────────────────────────────────

pub struct Fall;

impl State for Fall {
    fn name(&self) -> &'static str {
        "Fall"
    }

    fn physics_update(&mut self, ctx: &mut StateCtx<'_>) -> Option<&'static str> {
        movement::apply_gravity(ctx.velocity, ctx.grounded, ctx.tuning, ctx.profile, ctx.dt);
        steer(ctx);

        if ctx.grounded {
            if ctx.intent.move_dir != 0.0 {
                return Some("Run");
            }
            return Some("Idle");
        }
        None
    }

    fn handle_input(
        &mut self,
        ctx: &mut StateCtx<'_>,
        action: ActionInput,
    ) -> Option<&'static str> {
        match action {
            ActionInput::Attack(slot) => queue_attack(ctx, slot),
            _ => None,
        }
    }
}

// ── Attack ──────────────────────────────────────────────────────────

/// One swing: the offense region is live for the attack window and shut
/// off on exit, however the state is left.
pub struct Attack {
    remaining: Seconds,
}

impl Attack {
    pub fn new() -> Self {
        Self {
            remaining: Seconds::default(),
        }
    }
}

impl State for Attack {
    fn name(&self) -> &'static str {
        "Attack"
    }

    fn enter(&mut self, ctx: &mut StateCtx<'_>) {
        self.remaining = Seconds::new(ctx.tuning.player_attack_duration);
        let Some(attack) = &ctx.offense.attack else {
            error!("attack state entered with no attack assigned");
            return;
        };
        debug!("swing: {}", attack.name);
        ctx.offense.set_active(true);
    }

    fn exit(&mut self, ctx: &mut StateCtx<'_>) {
        ctx.offense.set_active(false);
        self.remaining = Seconds::default();
    }

    fn physics_update(&mut self, ctx: &mut StateCtx<'_>) -> Option<&'static str> {
        movement::apply_gravity(ctx.velocity, ctx.grounded, ctx.tuning, ctx.profile, ctx.dt);
        steer(ctx);

        self.remaining = self.remaining.dec(ctx.dt);
        if self.remaining.is_expired() {
            if !ctx.grounded {
                return Some("Fall");
            }
            if ctx.intent.move_dir != 0.0 {
                return Some("Run");
            }
            return Some("Idle");
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::components::AttackArsenal;
    use crate::game::machine::testing::CtxParts;
    use crate::game::machine::StateMachine;
    use crate::game::stats::AttackSpec;

    fn arsenal() -> AttackArsenal {
        AttackArsenal {
            slash: AttackSpec {
                name: "Slash",
                base_damage: 1,
                ..AttackSpec::default()
            },
            thrust: AttackSpec {
                name: "Thrust",
                base_damage: 2,
                ..AttackSpec::default()
            },
            heavy: AttackSpec {
                name: "Heavy Swing",
                base_damage: 3,
                ..AttackSpec::default()
            },
        }
    }

    fn player_machine() -> StateMachine {
        StateMachine::new("Idle")
            .with_state(Idle)
            .with_state(Run)
            .with_state(Jump)
            .with_state(Fall)
            .with_state(Attack::new())
    }

    fn parts() -> CtxParts {
        CtxParts {
            arsenal: Some(arsenal()),
            ..CtxParts::default()
        }
    }

    #[test]
    fn idle_starts_running_on_input() {
        let mut machine = player_machine();
        let mut parts = parts();
        machine.initialize(&mut parts.ctx());

        parts.intent.move_dir = 1.0;
        machine.physics_update(&mut parts.ctx());
        assert_eq!(machine.current_name(), Some("Run"));

        parts.intent.move_dir = 0.0;
        machine.physics_update(&mut parts.ctx());
        assert_eq!(machine.current_name(), Some("Idle"));
    }

    #[test]
    fn running_left_flips_facing() {
        let mut machine = player_machine();
        let mut parts = parts();
        machine.initialize(&mut parts.ctx());

        parts.intent.move_dir = -1.0;
        machine.physics_update(&mut parts.ctx());
        machine.physics_update(&mut parts.ctx());
        assert!(!parts.facing.right);
        assert!(parts.velocity.x < 0.0);
    }

    #[test]
    fn jump_launches_then_falls_then_lands() {
        let mut machine = player_machine();
        let mut parts = parts();
        machine.initialize(&mut parts.ctx());

        machine.handle_input(&mut parts.ctx(), ActionInput::JumpPressed);
        assert_eq!(machine.current_name(), Some("Jump"));
        assert_eq!(parts.velocity.y, parts.profile.jump_velocity);

        parts.grounded = false;
        // Gravity eventually turns the arc over.
        for _ in 0..2000 {
            machine.physics_update(&mut parts.ctx());
            if machine.current_name() == Some("Fall") {
                break;
            }
        }
        assert_eq!(machine.current_name(), Some("Fall"));

        parts.grounded = true;
        parts.velocity.y = 0.0;
        machine.physics_update(&mut parts.ctx());
        assert_eq!(machine.current_name(), Some("Idle"));
    }

    #[test]
    fn jump_cut_shortens_the_ascent() {
        let mut machine = player_machine();
        let mut parts = parts();
        machine.initialize(&mut parts.ctx());

        machine.handle_input(&mut parts.ctx(), ActionInput::JumpPressed);
        let full = parts.velocity.y;
        machine.handle_input(&mut parts.ctx(), ActionInput::JumpReleased);
        assert_eq!(parts.velocity.y, full * parts.profile.jump_cut_multiplier);
    }

    #[test]
    fn jump_requires_the_ground() {
        let mut machine = player_machine();
        let mut parts = parts();
        machine.initialize(&mut parts.ctx());

        parts.grounded = false;
        machine.handle_input(&mut parts.ctx(), ActionInput::JumpPressed);
        assert_eq!(machine.current_name(), Some("Idle"));
    }

    #[test]
    fn attack_opens_and_closes_the_offense_window() {
        let mut machine = player_machine();
        let mut parts = parts();
        machine.initialize(&mut parts.ctx());

        machine.handle_input(&mut parts.ctx(), ActionInput::Attack(AttackSlot::Three));
        assert_eq!(machine.current_name(), Some("Attack"));
        assert!(parts.offense.active);
        assert_eq!(parts.offense.attack.as_ref().unwrap().base_damage, 3);

        // Ride the countdown out.
        let ticks = (parts.tuning.player_attack_duration / parts.tuning.dt).ceil() as u32 + 1;
        for _ in 0..ticks {
            machine.physics_update(&mut parts.ctx());
        }
        assert_eq!(machine.current_name(), Some("Idle"));
        assert!(!parts.offense.active);
    }

    #[test]
    fn attack_without_arsenal_is_a_logged_no_op() {
        let mut machine = player_machine();
        let mut parts = CtxParts::default();
        machine.initialize(&mut parts.ctx());

        machine.handle_input(&mut parts.ctx(), ActionInput::Attack(AttackSlot::One));
        assert_eq!(machine.current_name(), Some("Idle"));
        assert!(!parts.offense.active);
    }

    #[test]
    fn interrupted_attack_still_closes_the_window() {
        let mut machine = player_machine();
        let mut parts = parts();
        machine.initialize(&mut parts.ctx());

        machine.handle_input(&mut parts.ctx(), ActionInput::Attack(AttackSlot::One));
        assert!(parts.offense.active);
        machine.transition_to("Fall", &mut parts.ctx());
        assert!(!parts.offense.active);
    }
}
