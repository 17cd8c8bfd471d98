use bevy::prelude::*;

use crate::game::machine::{State, StateCtx};
use crate::game::movement;
use crate::game::types::Seconds;

fn cooldown_ready(ctx: &StateCtx<'_>) -> bool {
    ctx.cooldown.as_ref().map_or(true, |c| c.ready())
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

        if ctx.perception.player_in_range {
            return Some("Chase");
        }
        None
    }
}

// ── Chase ───────────────────────────────────────────────────────────

pub struct Chase;

impl State for Chase {
    fn name(&self) -> &'static str {
        "Chase"
    }

    fn physics_update(&mut self, ctx: &mut StateCtx<'_>) -> Option<&'static str> {
        movement::apply_gravity(ctx.velocity, ctx.grounded, ctx.tuning, ctx.profile, ctx.dt);

        if !ctx.perception.player_in_range {
            return Some("Idle");
        }

        let dx = ctx.perception.to_player.x;
        let dir = if dx == 0.0 { 0.0 } else { dx.signum() };
        if dir != 0.0 {
            ctx.facing.right = dir > 0.0;
        }
        movement::apply_horizontal(ctx.velocity, dir, ctx.stats.speed, ctx.profile.accel, ctx.dt);

        if ctx.perception.distance <= ctx.tuning.slime_attack_range && cooldown_ready(ctx) {
            return Some("Attack");
        }
        None
    }
}

// ── Attack ──────────────────────────────────────────────────────────

/// One bump: arms the cooldown, holds the offense region live for the
/// attack window, and shuts it off on exit.
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
        self.remaining = Seconds::new(ctx.tuning.slime_attack_duration);
        if let Some(cooldown) = ctx.cooldown.as_mut() {
            cooldown.arm();
        }
        ctx.velocity.x = 0.0;
        if ctx.offense.attack.is_none() {
            error!("attack state entered with no attack assigned");
            return;
        }
        ctx.offense.set_active(true);
    }

    fn exit(&mut self, ctx: &mut StateCtx<'_>) {
        ctx.offense.set_active(false);
        self.remaining = Seconds::default();
    }

    fn physics_update(&mut self, ctx: &mut StateCtx<'_>) -> Option<&'static str> {
        movement::apply_gravity(ctx.velocity, ctx.grounded, ctx.tuning, ctx.profile, ctx.dt);

        self.remaining = self.remaining.dec(ctx.dt);
        if self.remaining.is_expired() {
            if ctx.perception.player_in_range {
                return Some("Chase");
            }
            return Some("Idle");
        }
        None
    }
}

// ── Hurt ────────────────────────────────────────────────────────────

/// Knockback recovery. Control is suspended while the impulse decays; an
/// interrupted swing is shut off on entry.
pub struct Hurt {
    remaining: Seconds,
}

impl Hurt {
    pub fn new() -> Self {
        Self {
            remaining: Seconds::default(),
        }
    }
}

impl State for Hurt {
    fn name(&self) -> &'static str {
        "Hurt"
    }

    fn enter(&mut self, ctx: &mut StateCtx<'_>) {
        self.remaining = Seconds::new(ctx.tuning.slime_hurt_duration);
        ctx.offense.set_active(false);
    }

    fn exit(&mut self, ctx: &mut StateCtx<'_>) {
        self.remaining = Seconds::default();
    }

    fn physics_update(&mut self, ctx: &mut StateCtx<'_>) -> Option<&'static str> {
        movement::apply_gravity(ctx.velocity, ctx.grounded, ctx.tuning, ctx.profile, ctx.dt);
        movement::apply_friction(ctx.velocity, ctx.profile.friction, ctx.dt);

        self.remaining = self.remaining.dec(ctx.dt);
        if self.remaining.is_expired() {
            if ctx.perception.player_in_range {
                return Some("Chase");
            }
            return Some("Idle");
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::components::AttackCooldown;
    use crate::game::machine::testing::CtxParts;
    use crate::game::machine::StateMachine;
    use crate::game::stats::AttackSpec;

    fn slime_machine() -> StateMachine {
        StateMachine::new("Idle")
            .with_state(Idle)
            .with_state(Chase)
            .with_state(Attack::new())
            .with_state(Hurt::new())
    }

    fn parts_with_player_at(x: f32) -> CtxParts {
        let mut parts = CtxParts::default();
        parts.offense.set_attack(AttackSpec {
            name: "Slime Bump",
            base_damage: 1,
            can_crit: false,
            knockback_force: 100.0,
            ..AttackSpec::default()
        });
        parts.cooldown = Some(AttackCooldown::new(parts.tuning.slime_attack_cooldown));
        parts.perception.player_in_range = true;
        parts.perception.to_player = Vec2::new(x, 0.0);
        parts.perception.distance = x.abs();
        parts
    }

    #[test]
    fn idle_chases_once_the_player_is_in_range() {
        let mut machine = slime_machine();
        let mut parts = CtxParts::default();
        machine.initialize(&mut parts.ctx());
        machine.physics_update(&mut parts.ctx());
        assert_eq!(machine.current_name(), Some("Idle"));

        parts.perception.player_in_range = true;
        parts.perception.to_player = Vec2::new(80.0, 0.0);
        parts.perception.distance = 80.0;
        machine.physics_update(&mut parts.ctx());
        assert_eq!(machine.current_name(), Some("Chase"));
    }

    #[test]
    fn chase_moves_and_faces_toward_the_player() {
        let mut machine = slime_machine();
        let mut parts = parts_with_player_at(-80.0);
        machine.initialize(&mut parts.ctx());
        machine.physics_update(&mut parts.ctx()); // Idle -> Chase
        machine.physics_update(&mut parts.ctx());

        assert_eq!(machine.current_name(), Some("Chase"));
        assert!(parts.velocity.x < 0.0);
        assert!(!parts.facing.right);
    }

    #[test]
    fn chase_gives_up_when_the_player_leaves() {
        let mut machine = slime_machine();
        let mut parts = parts_with_player_at(80.0);
        machine.initialize(&mut parts.ctx());
        machine.physics_update(&mut parts.ctx()); // Idle -> Chase

        parts.perception.player_in_range = false;
        machine.physics_update(&mut parts.ctx());
        assert_eq!(machine.current_name(), Some("Idle"));
    }

    #[test]
    fn attack_arms_cooldown_and_respects_it() {
        let mut machine = slime_machine();
        let mut parts = parts_with_player_at(10.0);
        machine.initialize(&mut parts.ctx());
        machine.physics_update(&mut parts.ctx()); // Idle -> Chase
        machine.physics_update(&mut parts.ctx()); // Chase -> Attack

        assert_eq!(machine.current_name(), Some("Attack"));
        assert!(parts.offense.active);
        assert!(!parts.cooldown.as_ref().unwrap().ready());

        // Ride out the swing: offense closes, and with the cooldown still
        // armed the slime keeps chasing instead of swinging again.
        let ticks = (parts.tuning.slime_attack_duration / parts.tuning.dt).ceil() as u32 + 1;
        for _ in 0..ticks {
            machine.physics_update(&mut parts.ctx());
        }
        assert_eq!(machine.current_name(), Some("Chase"));
        assert!(!parts.offense.active);
        machine.physics_update(&mut parts.ctx());
        assert_eq!(machine.current_name(), Some("Chase"));
    }

    #[test]
    fn hurt_interrupts_a_swing_and_recovers() {
        let mut machine = slime_machine();
        let mut parts = parts_with_player_at(10.0);
        machine.initialize(&mut parts.ctx());
        machine.physics_update(&mut parts.ctx()); // Idle -> Chase
        machine.physics_update(&mut parts.ctx()); // Chase -> Attack
        assert!(parts.offense.active);

        machine.request("Hurt");
        machine.physics_update(&mut parts.ctx());
        assert_eq!(machine.current_name(), Some("Hurt"));
        assert!(!parts.offense.active);

        let ticks = (parts.tuning.slime_hurt_duration / parts.tuning.dt).ceil() as u32 + 1;
        for _ in 0..ticks {
            machine.physics_update(&mut parts.ctx());
        }
        assert_eq!(machine.current_name(), Some("Chase"));
    }
}
