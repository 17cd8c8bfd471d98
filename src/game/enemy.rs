use bevy::prelude::*;

use super::components::{
    ActionBuffer, AttackCooldown, Controllable, DetectionRegion, Enemy, Facing, Grounded, Intent,
    MoveProfile, OffenseControl, Perception, Player, RegionHandles, Velocity,
};
use super::events::HealthEvent;
use super::health::Health;
use super::machine::StateMachine;
use super::regions::{spawn_defense_region, spawn_offense_region};
use super::states::enemy::{Attack, Chase, Hurt, Idle};
use super::stats::{AttackSpec, EntityStats};
use crate::config::tuning::Tuning;

const BODY_HALF_EXTENTS: Vec2 = Vec2::new(10.0, 8.0);
const BUMP_HALF_EXTENTS: Vec2 = Vec2::new(12.0, 8.0);

fn slime_stats(tuning: &Tuning) -> EntityStats {
    EntityStats {
        attack: 3,
        defense: 1,
        speed: tuning.slime_chase_speed,
        crit_chance: 0.0,
        crit_multiplier: 1.0,
        knockback_resistance: 0.3,
    }
}

fn slime_attack() -> AttackSpec {
    AttackSpec {
        name: "Slime Bump",
        base_damage: 1,
        can_crit: false,
        knockback_force: 100.0,
        ..AttackSpec::default()
    }
}

fn slime_machine() -> StateMachine {
    StateMachine::new("Idle")
        .with_state(Idle)
        .with_state(Chase)
        .with_state(Attack::new())
        .with_state(Hurt::new())
}

/// Spawn a slime at the given position, with its bump attack pre-bound
/// to the offense control.
pub fn spawn_slime(commands: &mut Commands, tuning: &Tuning, position: Vec2) -> Entity {
    let entity = commands
        .spawn((
            Enemy,
            slime_stats(tuning),
            Health::new(tuning.slime_max_hp, tuning.slime_invincibility),
            slime_machine(),
            Velocity::default(),
            Grounded(false),
            Facing::default(),
            Intent::default(),
            ActionBuffer::default(),
            Controllable(true),
            MoveProfile::default(),
            OffenseControl {
                active: false,
                attack: Some(slime_attack()),
            },
            Transform::from_translation(position.extend(0.0)),
        ))
        .insert((
            AttackCooldown::new(tuning.slime_attack_cooldown),
            DetectionRegion {
                radius: tuning.slime_detection_radius,
            },
            Perception::default(),
        ))
        .id();

    let offense = spawn_offense_region(
        commands,
        entity,
        Vec2::new(tuning.slime_attack_range * 0.5, 0.0),
        BUMP_HALF_EXTENTS,
    );
    let defense = spawn_defense_region(commands, entity, BODY_HALF_EXTENTS);
    commands
        .entity(entity)
        .insert(RegionHandles { offense, defense });

    entity
}

/// InputApplySet: refresh what every hostile entity knows about the
/// player. Enter/exit edges of the detection region drive the Idle/Chase
/// handoff; states handle everything in between.
pub fn update_perception(
    players: Query<&Transform, With<Player>>,
    mut enemies: Query<
        (&Transform, &DetectionRegion, &mut Perception, &mut StateMachine),
        With<Enemy>,
    >,
) {
    let Ok(player_tf) = players.single() else {
        return;
    };
    let player_pos = player_tf.translation.truncate();

    for (transform, region, mut perception, mut machine) in &mut enemies {
        let own_pos = transform.translation.truncate();
        let to_player = player_pos - own_pos;
        let distance = to_player.length();
        let in_range = distance <= region.radius;

        if in_range && !perception.player_in_range {
            // Only interrupt an idling enemy; Hurt and Attack finish on
            // their own and re-check perception.
            if machine.current_name() == Some("Idle") {
                machine.request("Chase");
            }
        } else if !in_range && perception.player_in_range {
            machine.request("Idle");
        }

        perception.player_in_range = in_range;
        perception.to_player = to_player;
        perception.distance = distance;
    }
}

/// NotifySet: a landed hit sends the enemy into its Hurt state.
pub fn react_to_damage(
    mut events: MessageReader<HealthEvent>,
    mut enemies: Query<&mut StateMachine, With<Enemy>>,
) {
    for event in events.read() {
        if let HealthEvent::DamageTaken { entity, .. } = event {
            if let Ok(mut machine) = enemies.get_mut(*entity) {
                machine.request("Hurt");
            }
        }
    }
}

/// CleanupSet: remove dead enemies together with the regions they own.
pub fn despawn_dead_enemies(
    mut commands: Commands,
    enemies: Query<(Entity, &Health, Option<&RegionHandles>), With<Enemy>>,
) {
    for (entity, health, regions) in &enemies {
        if !health.is_dead() {
            continue;
        }
        if let Some(regions) = regions {
            commands.entity(regions.offense).despawn();
            commands.entity(regions.defense).despawn();
        }
        commands.entity(entity).despawn();
    }
}
