use bevy::prelude::*;

use super::components::{
    ActionBuffer, ActionInput, AttackArsenal, AttackSlot, Controllable, Facing, Grounded, Intent,
    MoveProfile, OffenseControl, Player, RegionHandles, Velocity,
};
use super::health::Health;
use super::machine::StateMachine;
use super::regions::{spawn_defense_region, spawn_offense_region};
use super::session::Session;
use super::states::player::{Attack, Fall, Idle, Jump, Run};
use super::stats::AttackSpec;
use crate::config::tuning::Tuning;

const BODY_HALF_EXTENTS: Vec2 = Vec2::new(12.0, 16.0);
const SWING_HALF_EXTENTS: Vec2 = Vec2::new(18.0, 12.0);

/// The three attacks bound to attack-1/2/3.
pub fn default_arsenal() -> AttackArsenal {
    AttackArsenal {
        slash: AttackSpec {
            name: "Slash",
            base_damage: 1,
            knockback_force: 200.0,
            ..AttackSpec::default()
        },
        thrust: AttackSpec {
            name: "Thrust",
            base_damage: 2,
            knockback_force: 100.0,
            ..AttackSpec::default()
        },
        heavy: AttackSpec {
            name: "Heavy Swing",
            base_damage: 3,
            knockback_force: 350.0,
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

/// Spawn the player with stats and health seeded from the session
/// profile, plus its offense/defense region pair.
pub fn spawn_player(
    commands: &mut Commands,
    tuning: &Tuning,
    session: &Session,
    position: Vec2,
) -> Entity {
    let profile = &session.profile;
    let mut health = Health::new(profile.max_hp, profile.invincibility_duration);
    health.initialize(
        profile.max_hp,
        profile.current_hp,
        profile.invincibility_duration,
    );

    let entity = commands
        .spawn((
            Player,
            profile.stats.clone(),
            health,
            player_machine(),
            Velocity::default(),
            Grounded(false),
            Facing::default(),
            Intent::default(),
            ActionBuffer::default(),
            Controllable(true),
            MoveProfile {
                jump_velocity: tuning.player_jump_velocity,
                ..MoveProfile::default()
            },
            OffenseControl::default(),
            default_arsenal(),
            Transform::from_translation(position.extend(0.0)),
        ))
        .id();

    let offense = spawn_offense_region(
        commands,
        entity,
        Vec2::new(tuning.attack_reach, 0.0),
        SWING_HALF_EXTENTS,
    );
    let defense = spawn_defense_region(commands, entity, BODY_HALF_EXTENTS);
    commands
        .entity(entity)
        .insert(RegionHandles { offense, defense });

    entity
}

/// Update: read the keyboard into intent and the action buffer. Runs at
/// frame rate; the fixed tick drains the buffer before moving anything.
pub fn gather_player_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut query: Query<(&mut Intent, &mut ActionBuffer, &Controllable), With<Player>>,
) {
    for (mut intent, mut buffer, controllable) in &mut query {
        if !controllable.0 {
            intent.move_dir = 0.0;
            continue;
        }

        let mut dir = 0.0;
        if keyboard.pressed(KeyCode::ArrowLeft) || keyboard.pressed(KeyCode::KeyA) {
            dir -= 1.0;
        }
        if keyboard.pressed(KeyCode::ArrowRight) || keyboard.pressed(KeyCode::KeyD) {
            dir += 1.0;
        }
        intent.move_dir = dir;

        if keyboard.just_pressed(KeyCode::Space) {
            buffer.push(ActionInput::JumpPressed);
        }
        if keyboard.just_released(KeyCode::Space) {
            buffer.push(ActionInput::JumpReleased);
        }
        if keyboard.just_pressed(KeyCode::KeyJ) {
            buffer.push(ActionInput::Attack(AttackSlot::One));
        }
        if keyboard.just_pressed(KeyCode::KeyK) {
            buffer.push(ActionInput::Attack(AttackSlot::Two));
        }
        if keyboard.just_pressed(KeyCode::KeyL) {
            buffer.push(ActionInput::Attack(AttackSlot::Three));
        }
    }
}
