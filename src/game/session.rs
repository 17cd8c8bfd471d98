use bevy::prelude::*;

use super::components::{Controllable, Enemy, GamePhase, Player};
use super::events::{GameEvent, HealthEvent};
use super::health::Health;
use super::stats::EntityStats;

/// Initial player state, loaded from the profile store or built in.
#[derive(Debug, Clone)]
pub struct PlayerProfile {
    pub stats: EntityStats,
    pub max_hp: i32,
    pub current_hp: i32,
    pub invincibility_duration: f32,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self {
            stats: EntityStats {
                speed: 300.0,
                ..EntityStats::default()
            },
            max_hp: 100,
            current_hp: 100,
            invincibility_duration: 0.5,
        }
    }
}

/// Session-wide context, constructed at startup and passed to whichever
/// system needs it. Replaces any ambient global.
#[derive(Resource, Debug, Clone, Default)]
pub struct Session {
    pub profile: PlayerProfile,
    coins: i32,
}

impl Session {
    pub fn new(profile: PlayerProfile) -> Self {
        Self { profile, coins: 0 }
    }

    pub fn coins(&self) -> i32 {
        self.coins
    }

    /// Coin boundary for pickup/scoring collaborators. Returns the new
    /// total; the bridge broadcasts the change on the bus.
    #[allow(dead_code)]
    pub fn add_coins(&mut self, amount: i32) -> i32 {
        self.coins += amount.max(0);
        self.coins
    }
}

/// NotifySet: translate health notifications into the outward bus, flip
/// off player control on death, and broadcast coin changes.
pub fn publish_game_events(
    session: Res<Session>,
    mut last_coins: Local<Option<i32>>,
    mut health_events: MessageReader<HealthEvent>,
    mut bus: MessageWriter<GameEvent>,
    player_health: Query<&Health, With<Player>>,
    mut player_control: Query<&mut Controllable, With<Player>>,
    players: Query<(), With<Player>>,
    enemies: Query<(), With<Enemy>>,
) {
    if *last_coins != Some(session.coins()) {
        *last_coins = Some(session.coins());
        bus.write(GameEvent::CoinsChanged {
            total: session.coins(),
        });
    }

    for event in health_events.read() {
        match *event {
            HealthEvent::DamageTaken {
                entity,
                amount,
                was_critical,
            } => {
                bus.write(GameEvent::EntityDamaged {
                    entity,
                    amount,
                    was_critical,
                });
                if players.get(entity).is_ok() {
                    if let Ok(health) = player_health.get(entity) {
                        bus.write(GameEvent::PlayerDamaged {
                            amount,
                            current_hp: health.current_hp(),
                            max_hp: health.max_hp(),
                        });
                    }
                }
            }
            HealthEvent::Died { entity } => {
                bus.write(GameEvent::EntityDied { entity });
                if players.get(entity).is_ok() {
                    bus.write(GameEvent::PlayerDied);
                    if let Ok(mut control) = player_control.get_mut(entity) {
                        control.0 = false;
                    }
                } else if enemies.get(entity).is_ok() {
                    bus.write(GameEvent::EnemyKilled { enemy: entity });
                }
            }
            _ => {}
        }
    }
}

/// Update: the run ends when the player is dead.
pub fn check_game_over(
    players: Query<&Health, With<Player>>,
    mut next_phase: ResMut<NextState<GamePhase>>,
) {
    for health in &players {
        if health.is_dead() {
            next_phase.set(GamePhase::GameOver);
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coins_accumulate_and_ignore_negative_grants() {
        let mut session = Session::default();
        assert_eq!(session.add_coins(3), 3);
        assert_eq!(session.add_coins(2), 5);
        assert_eq!(session.add_coins(-10), 5);
    }

    #[test]
    fn default_profile_is_usable() {
        let profile = PlayerProfile::default();
        assert!(profile.max_hp > 0);
        assert_eq!(profile.current_hp, profile.max_hp);
        assert!(profile.stats.attack > 0);
    }
}
