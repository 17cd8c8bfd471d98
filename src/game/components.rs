use std::collections::VecDeque;

use bevy::prelude::*;

use super::stats::AttackSpec;
use super::types::Seconds;

// ── Marker components ───────────────────────────────────────────────

#[derive(Component)]
pub struct Player;

#[derive(Component)]
pub struct Enemy;

// ── Game phase state ────────────────────────────────────────────────

#[derive(States, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum GamePhase {
    #[default]
    Playing,
    GameOver,
}

// ── Movement state ──────────────────────────────────────────────────

#[derive(Component, Default)]
pub struct Velocity(pub Vec2);

impl Velocity {
    /// Instantaneous impulse, e.g. knockback.
    pub fn impulse(&mut self, v: Vec2) {
        self.0 += v;
    }
}

#[derive(Component, Default)]
pub struct Grounded(pub bool);

#[derive(Component)]
pub struct Facing {
    pub right: bool,
}

impl Default for Facing {
    fn default() -> Self {
        Self { right: true }
    }
}

/// Per-entity movement parameters outside of [`super::stats::EntityStats`].
#[derive(Component, Clone)]
pub struct MoveProfile {
    pub accel: f32,
    pub friction: f32,
    /// Upward launch speed of a jump.
    pub jump_velocity: f32,
    /// Multiplier applied to upward velocity when jump is released early.
    pub jump_cut_multiplier: f32,
    /// Gravity multiplier while descending.
    pub fall_gravity_multiplier: f32,
}

impl Default for MoveProfile {
    fn default() -> Self {
        Self {
            accel: 1500.0,
            friction: 1200.0,
            jump_velocity: 400.0,
            jump_cut_multiplier: 0.5,
            fall_gravity_multiplier: 2.5,
        }
    }
}

// ── Input ───────────────────────────────────────────────────────────

/// Continuous input intent: written in Update, consumed in FixedUpdate.
#[derive(Component, Default)]
pub struct Intent {
    /// Desired horizontal direction in [-1, 1].
    pub move_dir: f32,
}

/// Discrete action events delivered to the active state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionInput {
    JumpPressed,
    JumpReleased,
    Attack(AttackSlot),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackSlot {
    One,
    Two,
    Three,
}

/// Buffered discrete actions: pushed in Update, drained at the start of
/// the next fixed tick so input lands before movement resolution.
#[derive(Component, Default)]
pub struct ActionBuffer {
    actions: VecDeque<ActionInput>,
}

impl ActionBuffer {
    pub fn push(&mut self, action: ActionInput) {
        self.actions.push_back(action);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = ActionInput> + '_ {
        self.actions.drain(..)
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }
}

/// Input gate, cleared on death.
#[derive(Component)]
pub struct Controllable(pub bool);

// ── Combat control ──────────────────────────────────────────────────

/// Owner-side switch for the entity's offense region. States flip this;
/// the sync system mirrors it onto the region entity.
#[derive(Component, Default)]
pub struct OffenseControl {
    pub active: bool,
    pub attack: Option<AttackSpec>,
}

impl OffenseControl {
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn set_attack(&mut self, attack: AttackSpec) {
        self.attack = Some(attack);
    }
}

/// The player's three attacks, bound to the attack-1/2/3 actions.
#[derive(Component, Clone)]
pub struct AttackArsenal {
    pub slash: AttackSpec,
    pub thrust: AttackSpec,
    pub heavy: AttackSpec,
}

impl AttackArsenal {
    pub fn get(&self, slot: AttackSlot) -> &AttackSpec {
        match slot {
            AttackSlot::One => &self.slash,
            AttackSlot::Two => &self.thrust,
            AttackSlot::Three => &self.heavy,
        }
    }
}

/// Handles to the region entities this entity constructed, so they are
/// torn down together with their owner.
#[derive(Component)]
pub struct RegionHandles {
    pub offense: Entity,
    pub defense: Entity,
}

// ── AI perception ───────────────────────────────────────────────────

/// Radius within which a hostile entity notices the player.
#[derive(Component)]
pub struct DetectionRegion {
    pub radius: f32,
}

/// What the entity currently knows about the player. Refreshed every
/// tick before state updates run.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Perception {
    pub player_in_range: bool,
    /// Vector from this entity to the player.
    pub to_player: Vec2,
    pub distance: f32,
}

/// Attack cooldown for AI attackers.
#[derive(Component)]
pub struct AttackCooldown {
    remaining: Seconds,
    pub cooldown: f32,
}

impl AttackCooldown {
    pub fn new(cooldown: f32) -> Self {
        Self {
            remaining: Seconds::default(),
            cooldown,
        }
    }

    pub fn ready(&self) -> bool {
        self.remaining.is_expired()
    }

    pub fn arm(&mut self) {
        self.remaining = Seconds::new(self.cooldown);
    }

    pub fn tick(&mut self, dt: f32) {
        self.remaining = self.remaining.dec(dt);
    }
}
