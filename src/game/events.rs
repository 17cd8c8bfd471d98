use bevy::prelude::*;

/// Per-entity health notifications, written by whichever system performed
/// the health operation.
#[derive(Message, Debug, Clone)]
pub enum HealthEvent {
    DamageTaken {
        entity: Entity,
        amount: i32,
        was_critical: bool,
    },
    // Emitted by collaborator systems (pickups, scripted effects).
    #[allow(dead_code)]
    Healed {
        entity: Entity,
        amount: i32,
    },
    HealthChanged {
        entity: Entity,
        current_hp: i32,
        max_hp: i32,
    },
    Died {
        entity: Entity,
    },
    InvincibilityStarted {
        entity: Entity,
    },
    InvincibilityEnded {
        entity: Entity,
    },
}

/// Attacker-side feedback when a swing lands (combo/feedback consumers).
#[derive(Message, Debug, Clone)]
pub struct HitConnected {
    pub attacker: Entity,
    pub target: Entity,
    pub damage: i32,
    pub was_critical: bool,
}

/// Outward notification bus. Consumed by UI and scoring collaborators,
/// never read back by the combat core.
#[derive(Message, Debug, Clone)]
pub enum GameEvent {
    CoinsChanged {
        total: i32,
    },
    EntityDamaged {
        entity: Entity,
        amount: i32,
        was_critical: bool,
    },
    EntityDied {
        entity: Entity,
    },
    PlayerDamaged {
        amount: i32,
        current_hp: i32,
        max_hp: i32,
    },
    PlayerDied,
    EnemyKilled {
        enemy: Entity,
    },
}
