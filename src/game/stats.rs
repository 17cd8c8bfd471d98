use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Combat and movement parameters for an entity.
///
/// Cloned from the session profile (player) or a template (enemies) at
/// spawn, so mutating one instance never leaks into another.
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct EntityStats {
    pub attack: i32,
    pub defense: i32,
    /// Max horizontal speed in pixels per second.
    pub speed: f32,
    /// Chance in [0, 1] that an attack that can crit does crit.
    pub crit_chance: f32,
    /// Damage multiplier applied on a critical hit. >= 1.
    pub crit_multiplier: f32,
    /// Fraction of incoming knockback absorbed, in [0, 1].
    pub knockback_resistance: f32,
}

impl Default for EntityStats {
    fn default() -> Self {
        Self {
            attack: 10,
            defense: 5,
            speed: 100.0,
            crit_chance: 0.05,
            crit_multiplier: 1.5,
            knockback_resistance: 0.0,
        }
    }
}

// ── Attacks ─────────────────────────────────────────────────────────

/// How a hit decides its knockback direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KnockbackPolicy {
    /// Push the target along the attacker-to-target vector.
    AttackerFacing,
    /// Push along a fixed direction regardless of relative positions.
    /// Bound by hazard-style attacks; none of the stock attacks use it.
    #[allow(dead_code)]
    Fixed(Vec2),
}

/// Immutable description of a single attack. Shared by value across hits.
#[derive(Debug, Clone)]
pub struct AttackSpec {
    pub name: &'static str,
    pub base_damage: i32,
    pub damage_multiplier: f32,
    pub can_crit: bool,
    pub knockback_force: f32,
    pub knockback: KnockbackPolicy,
    /// Informational only; damage resolution does not read it.
    #[allow(dead_code)]
    pub stun_duration: f32,
}

impl Default for AttackSpec {
    fn default() -> Self {
        Self {
            name: "Basic Attack",
            base_damage: 10,
            damage_multiplier: 1.0,
            can_crit: true,
            knockback_force: 200.0,
            knockback: KnockbackPolicy::AttackerFacing,
            stun_duration: 0.0,
        }
    }
}

// ── Damage outcome ──────────────────────────────────────────────────

/// Result of one damage resolution. Never mutated after construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    pub final_damage: i32,
    pub was_critical: bool,
    pub was_blocked: bool,
    pub knockback: Vec2,
}

impl DamageOutcome {
    pub const fn blocked() -> Self {
        Self {
            final_damage: 0,
            was_critical: false,
            was_blocked: true,
            knockback: Vec2::ZERO,
        }
    }
}
