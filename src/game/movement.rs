use bevy::prelude::*;

use super::components::{AttackCooldown, Grounded, MoveProfile, Velocity};
use crate::config::tuning::Tuning;

/// Step `from` toward `to` by at most `delta`.
pub fn move_toward(from: f32, to: f32, delta: f32) -> f32 {
    if (to - from).abs() <= delta {
        to
    } else {
        from + (to - from).signum() * delta
    }
}

/// Gravity, with a heavier pull while descending for a snappier arc.
pub fn apply_gravity(
    velocity: &mut Vec2,
    grounded: bool,
    tuning: &Tuning,
    profile: &MoveProfile,
    dt: f32,
) {
    if grounded {
        return;
    }
    let multiplier = if velocity.y < 0.0 {
        profile.fall_gravity_multiplier
    } else {
        1.0
    };
    velocity.y += tuning.gravity * multiplier * dt;
}

/// Accelerate horizontally toward `dir * max_speed`.
pub fn apply_horizontal(velocity: &mut Vec2, dir: f32, max_speed: f32, accel: f32, dt: f32) {
    velocity.x = move_toward(velocity.x, dir * max_speed, accel * dt);
}

/// Decelerate horizontally toward rest.
pub fn apply_friction(velocity: &mut Vec2, friction: f32, dt: f32) {
    velocity.x = move_toward(velocity.x, 0.0, friction * dt);
}

/// PhysicsSet: integrate velocity into position and resolve the floor.
pub fn integrate_movement(
    tuning: Res<Tuning>,
    mut query: Query<(&mut Transform, &mut Velocity, &mut Grounded)>,
) {
    let dt = tuning.dt;
    for (mut transform, mut velocity, mut grounded) in &mut query {
        transform.translation.x += velocity.0.x * dt;
        transform.translation.y += velocity.0.y * dt;

        if transform.translation.y <= tuning.floor_y {
            transform.translation.y = tuning.floor_y;
            if velocity.0.y < 0.0 {
                velocity.0.y = 0.0;
            }
            grounded.0 = true;
        } else {
            grounded.0 = false;
        }
    }
}

/// PhysicsSet: count down AI attack cooldowns.
pub fn tick_attack_cooldowns(tuning: Res<Tuning>, mut query: Query<&mut AttackCooldown>) {
    let dt = tuning.dt;
    for mut cooldown in &mut query {
        cooldown.tick(dt);
    }
}
