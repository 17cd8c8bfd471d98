use bevy::prelude::*;
use rand::Rng;

use super::stats::{AttackSpec, DamageOutcome, EntityStats, KnockbackPolicy};

/// Resolve one attack into a damage outcome.
///
/// `final = max(1, round(attack * base_damage * damage_multiplier - defense))`,
/// then the crit multiplier on a successful roll. Defense can never push a
/// landed hit below 1 damage.
///
/// Pure apart from the injected generator; safe to call any number of times
/// per tick.
pub fn resolve(
    attack: &AttackSpec,
    attacker: &EntityStats,
    target: &EntityStats,
    attacker_pos: Vec2,
    target_pos: Vec2,
    rng: &mut impl Rng,
) -> DamageOutcome {
    let raw = attacker.attack as f32 * attack.base_damage as f32 * attack.damage_multiplier;
    let after_defense = raw - target.defense as f32;
    let mut final_damage = (after_defense.round() as i32).max(1);

    let mut was_critical = false;
    if attack.can_crit && rng.gen_range(0.0..1.0f32) < attacker.crit_chance {
        final_damage = (final_damage as f32 * attacker.crit_multiplier).round() as i32;
        was_critical = true;
    }

    let direction = match attack.knockback {
        KnockbackPolicy::AttackerFacing => (target_pos - attacker_pos).normalize_or_zero(),
        KnockbackPolicy::Fixed(dir) => dir.normalize_or_zero(),
    };
    // Coincident positions (or a zero fixed direction) fall back to a
    // deterministic axis instead of a zero/NaN vector.
    let direction = if direction == Vec2::ZERO {
        Vec2::X
    } else {
        direction
    };

    let magnitude = attack.knockback_force * (1.0 - target.knockback_resistance);

    DamageOutcome {
        final_damage,
        was_critical,
        was_blocked: false,
        knockback: direction * magnitude,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    fn stats(attack: i32, defense: i32) -> EntityStats {
        EntityStats {
            attack,
            defense,
            crit_chance: 0.0,
            ..EntityStats::default()
        }
    }

    #[test]
    fn formula_applies_defense() {
        // 10 * 10 * 1.0 - 5 = 95
        let attack = AttackSpec {
            base_damage: 10,
            ..AttackSpec::default()
        };
        let outcome = resolve(
            &attack,
            &stats(10, 0),
            &stats(0, 5),
            Vec2::ZERO,
            Vec2::X * 30.0,
            &mut test_rng(),
        );
        assert_eq!(outcome.final_damage, 95);
        assert!(!outcome.was_critical);
        assert!(!outcome.was_blocked);
    }

    #[test]
    fn damage_never_below_one() {
        // 3 * 1 * 1.0 - 5 = -2 -> floored to 1
        let attack = AttackSpec {
            base_damage: 1,
            ..AttackSpec::default()
        };
        let outcome = resolve(
            &attack,
            &stats(3, 0),
            &stats(0, 5),
            Vec2::ZERO,
            Vec2::X * 30.0,
            &mut test_rng(),
        );
        assert_eq!(outcome.final_damage, 1);
    }

    #[test]
    fn guaranteed_crit_multiplies_damage() {
        let attack = AttackSpec {
            base_damage: 10,
            ..AttackSpec::default()
        };
        let attacker = EntityStats {
            attack: 10,
            crit_chance: 1.0,
            crit_multiplier: 1.5,
            ..EntityStats::default()
        };
        let outcome = resolve(
            &attack,
            &attacker,
            &stats(0, 5),
            Vec2::ZERO,
            Vec2::X * 30.0,
            &mut test_rng(),
        );
        // round(95 * 1.5) = 143
        assert_eq!(outcome.final_damage, 143);
        assert!(outcome.was_critical);
    }

    #[test]
    fn crit_never_rolls_when_attack_cannot_crit() {
        let attack = AttackSpec {
            base_damage: 10,
            can_crit: false,
            ..AttackSpec::default()
        };
        let attacker = EntityStats {
            attack: 10,
            crit_chance: 1.0,
            ..EntityStats::default()
        };
        let outcome = resolve(
            &attack,
            &attacker,
            &stats(0, 5),
            Vec2::ZERO,
            Vec2::X * 30.0,
            &mut test_rng(),
        );
        assert_eq!(outcome.final_damage, 95);
        assert!(!outcome.was_critical);
    }

    #[test]
    fn knockback_points_from_attacker_to_target() {
        let attack = AttackSpec {
            knockback_force: 100.0,
            ..AttackSpec::default()
        };
        let outcome = resolve(
            &attack,
            &stats(10, 0),
            &stats(0, 0),
            Vec2::new(10.0, 0.0),
            Vec2::new(50.0, 0.0),
            &mut test_rng(),
        );
        assert_eq!(outcome.knockback, Vec2::new(100.0, 0.0));
    }

    #[test]
    fn knockback_resistance_scales_magnitude() {
        let attack = AttackSpec {
            knockback_force: 100.0,
            ..AttackSpec::default()
        };
        let target = EntityStats {
            knockback_resistance: 0.3,
            crit_chance: 0.0,
            ..EntityStats::default()
        };
        let outcome = resolve(
            &attack,
            &stats(10, 0),
            &target,
            Vec2::ZERO,
            Vec2::X * 40.0,
            &mut test_rng(),
        );
        assert!((outcome.knockback.length() - 70.0).abs() < 1e-4);
    }

    #[test]
    fn coincident_positions_fall_back_to_default_axis() {
        let attack = AttackSpec {
            knockback_force: 50.0,
            ..AttackSpec::default()
        };
        let pos = Vec2::new(7.0, -3.0);
        let outcome = resolve(
            &attack,
            &stats(10, 0),
            &stats(0, 0),
            pos,
            pos,
            &mut test_rng(),
        );
        assert_eq!(outcome.knockback, Vec2::X * 50.0);
        assert!(outcome.knockback.is_finite());
    }

    #[test]
    fn fixed_policy_ignores_positions() {
        let attack = AttackSpec {
            knockback_force: 80.0,
            knockback: KnockbackPolicy::Fixed(Vec2::new(0.0, 2.0)),
            ..AttackSpec::default()
        };
        let outcome = resolve(
            &attack,
            &stats(10, 0),
            &stats(0, 0),
            Vec2::new(100.0, 0.0),
            Vec2::new(-100.0, 0.0),
            &mut test_rng(),
        );
        assert_eq!(outcome.knockback, Vec2::new(0.0, 80.0));
    }
}
