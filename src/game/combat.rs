use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::damage;
use super::events::{HealthEvent, HitConnected};
use super::health::{DamageApplied, Health};
use super::regions::{aabb_overlap, region_center, DefenseRegion, OffenseRegion};
use super::components::{Facing, Velocity};
use super::stats::{AttackSpec, DamageOutcome, EntityStats};

/// Random source for critical rolls. Seedable so simulations and tests
/// are reproducible.
#[derive(Resource)]
pub struct CritRng(pub StdRng);

impl Default for CritRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl CritRng {
    #[allow(dead_code)] // deterministic runs: simulations and tests
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

/// Direct damage entry point for collaborators outside the region
/// protocol (scripted hits, hazards). Unlike the protocol, which skips
/// non-qualifying targets silently, this reports a blocked outcome for
/// an invincible or dead target.
#[allow(dead_code)]
pub fn take_damage(
    attack: &AttackSpec,
    attacker_stats: &EntityStats,
    attacker_pos: Vec2,
    target_stats: &EntityStats,
    target_health: &mut Health,
    target_pos: Vec2,
    rng: &mut impl rand::Rng,
) -> DamageOutcome {
    if target_health.is_dead() || target_health.is_invincible() {
        return DamageOutcome::blocked();
    }
    let outcome = damage::resolve(
        attack,
        attacker_stats,
        target_stats,
        attacker_pos,
        target_pos,
        rng,
    );
    target_health.apply_damage(outcome.final_damage);
    outcome
}

/// HitDetectSet: the hit-detection protocol.
///
/// The defense side pulls: every defense region scans the active offense
/// regions for overlap, resolves damage with the attacker's stats, and
/// commits the result to its owner immediately — damage and knockback
/// land in the same tick the overlap is discovered. Self-hits and hits
/// against dead or invincible targets are expected, frequent occurrences
/// and stay silent.
pub fn resolve_hits(
    mut commands: Commands,
    mut rng: ResMut<CritRng>,
    mut offense: Query<&mut OffenseRegion>,
    defense: Query<(Entity, &DefenseRegion)>,
    owners: Query<(&Transform, &Facing)>,
    stats: Query<&EntityStats>,
    mut healths: Query<&mut Health>,
    mut velocities: Query<&mut Velocity>,
    mut health_events: MessageWriter<HealthEvent>,
    mut hits: MessageWriter<HitConnected>,
    mut knockback_warned: Local<bool>,
) {
    for (region_entity, region) in &defense {
        // A defense region whose owner is missing required components is
        // misconfigured: log it and retire the region.
        let Ok((target_tf, target_facing)) = owners.get(region.owner) else {
            error!("defense region owner has no transform; removing region");
            commands.entity(region_entity).despawn();
            continue;
        };
        if healths.get(region.owner).is_err() {
            error!("defense region owner has no health tracker; removing region");
            commands.entity(region_entity).despawn();
            continue;
        }
        let target_center = region_center(
            target_tf.translation.truncate(),
            target_facing.right,
            region.offset,
        );

        for mut offense_region in &mut offense {
            if !offense_region.active {
                continue;
            }
            // Never register a hit against the region's own owner.
            if offense_region.owner == region.owner {
                continue;
            }
            let Some(attack) = offense_region.attack.clone() else {
                error!("offense region active with no attack assigned");
                continue;
            };
            let Ok((attacker_tf, attacker_facing)) = owners.get(offense_region.owner) else {
                continue;
            };
            let attacker_center = region_center(
                attacker_tf.translation.truncate(),
                attacker_facing.right,
                offense_region.offset,
            );

            if !aabb_overlap(
                attacker_center,
                offense_region.half_extents,
                target_center,
                region.half_extents,
            ) {
                continue;
            }
            // One outcome per target per activation cycle, however long
            // the shapes stay overlapped.
            if offense_region.already_struck(region.owner) {
                continue;
            }
            {
                let Ok(health) = healths.get(region.owner) else {
                    continue;
                };
                if health.is_dead() || health.is_invincible() {
                    continue;
                }
            }

            let Ok(attacker_stats) = stats.get(offense_region.owner) else {
                error!("offense region owner has no stats; skipping hit");
                continue;
            };
            let Ok(target_stats) = stats.get(region.owner) else {
                error!("defense region owner has no stats; skipping hit");
                continue;
            };

            let outcome = damage::resolve(
                &attack,
                attacker_stats,
                target_stats,
                attacker_center,
                target_center,
                &mut rng.0,
            );

            let Ok(mut health) = healths.get_mut(region.owner) else {
                continue;
            };
            let applied = health.apply_damage(outcome.final_damage);
            let DamageApplied::Applied { died } = applied else {
                continue;
            };
            offense_region.register_strike(region.owner);

            health_events.write(HealthEvent::DamageTaken {
                entity: region.owner,
                amount: outcome.final_damage,
                was_critical: outcome.was_critical,
            });
            health_events.write(HealthEvent::HealthChanged {
                entity: region.owner,
                current_hp: health.current_hp(),
                max_hp: health.max_hp(),
            });
            if health.is_invincible() {
                health_events.write(HealthEvent::InvincibilityStarted {
                    entity: region.owner,
                });
            }
            if died {
                health_events.write(HealthEvent::Died {
                    entity: region.owner,
                });
            }

            if !outcome.was_blocked {
                match velocities.get_mut(region.owner) {
                    Ok(mut velocity) => velocity.impulse(outcome.knockback),
                    Err(_) => {
                        if !*knockback_warned {
                            warn!("knockback target has no velocity; knockback disabled");
                            *knockback_warned = true;
                        }
                    }
                }
            }

            hits.write(HitConnected {
                attacker: offense_region.owner,
                target: region.owner,
                damage: outcome.final_damage,
                was_critical: outcome.was_critical,
            });
        }
    }
}
