use bevy::prelude::*;

use super::events::HealthEvent;
use super::types::Seconds;
use crate::config::tuning::Tuning;

/// Whether an `apply_damage` call changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageApplied {
    /// Target was dead, invincible, or the amount was not positive.
    Ignored,
    Applied { died: bool },
}

/// Per-entity health and invincibility state.
///
/// Three states: alive-vulnerable, alive-invincible, dead. All operations
/// are defensive no-ops on irrelevant input (negative amounts, already
/// dead) — damage and heal calls coming out of combat events must never
/// crash the tick loop. Callers turn the returned outcomes into
/// [`HealthEvent`] messages.
#[derive(Component, Debug, Clone)]
pub struct Health {
    max_hp: i32,
    current_hp: i32,
    invincible: bool,
    invincibility_remaining: Seconds,
    invincibility_duration: f32,
}

#[allow(dead_code)] // heal/set_hp/invincibility toggles are collaborator entry points
impl Health {
    /// Spawn at full health.
    pub fn new(max_hp: i32, invincibility_duration: f32) -> Self {
        let max_hp = max_hp.max(1);
        Self {
            max_hp,
            current_hp: max_hp,
            invincible: false,
            invincibility_remaining: Seconds::default(),
            invincibility_duration: invincibility_duration.max(0.0),
        }
    }

    /// One-time override for restoring persisted state.
    pub fn initialize(&mut self, max_hp: i32, current_hp: i32, invincibility_duration: f32) {
        self.max_hp = max_hp.max(1);
        self.current_hp = current_hp.clamp(0, self.max_hp);
        self.invincibility_duration = invincibility_duration.max(0.0);
    }

    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    pub fn current_hp(&self) -> i32 {
        self.current_hp
    }

    pub fn is_dead(&self) -> bool {
        self.current_hp <= 0
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible
    }

    /// Apply damage. No-op while dead or invincible; starting the
    /// configured invincibility window on a landed hit.
    pub fn apply_damage(&mut self, amount: i32) -> DamageApplied {
        if self.is_dead() || self.invincible || amount <= 0 {
            return DamageApplied::Ignored;
        }

        self.current_hp = (self.current_hp - amount).max(0);

        if self.invincibility_duration > 0.0 && !self.is_dead() {
            self.invincible = true;
            self.invincibility_remaining = Seconds::new(self.invincibility_duration);
        }

        DamageApplied::Applied {
            died: self.is_dead(),
        }
    }

    /// Heal up to max. Returns the amount actually applied, which may be
    /// less than requested when clamped (and 0 when dead).
    pub fn heal(&mut self, amount: i32) -> i32 {
        if self.is_dead() || amount <= 0 {
            return 0;
        }
        let previous = self.current_hp;
        self.current_hp = (self.current_hp + amount).min(self.max_hp);
        self.current_hp - previous
    }

    /// Set HP directly, bypassing invincibility. Used for save/load and
    /// scripted effects. Returns true when this crossed into death.
    pub fn set_hp(&mut self, value: i32) -> bool {
        let was_dead = self.is_dead();
        self.current_hp = value.clamp(0, self.max_hp);
        !was_dead && self.is_dead()
    }

    /// Start invincibility with the given or configured duration.
    /// No-op if the resulting duration is not positive.
    pub fn start_invincibility(&mut self, custom_duration: Option<f32>) -> bool {
        let duration = custom_duration.unwrap_or(self.invincibility_duration);
        if duration <= 0.0 {
            return false;
        }
        self.invincible = true;
        self.invincibility_remaining = Seconds::new(duration);
        true
    }

    /// End invincibility early. No-op if not invincible.
    pub fn end_invincibility(&mut self) -> bool {
        if !self.invincible {
            return false;
        }
        self.invincible = false;
        self.invincibility_remaining = Seconds::default();
        true
    }

    /// Per-tick countdown. Returns true on the tick invincibility ends.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.invincible {
            return false;
        }
        self.invincibility_remaining = self.invincibility_remaining.dec(dt);
        if self.invincibility_remaining.is_expired() {
            self.invincible = false;
            return true;
        }
        false
    }
}

/// PhysicsSet: count down invincibility windows.
pub fn tick_invincibility(
    tuning: Res<Tuning>,
    mut query: Query<(Entity, &mut Health)>,
    mut events: MessageWriter<HealthEvent>,
) {
    for (entity, mut health) in &mut query {
        if health.tick(tuning.dt) {
            events.write(HealthEvent::InvincibilityEnded { entity });
        }
    }
}
