use bevy::prelude::*;

use crate::config::tuning::Tuning;
use crate::game::{
    combat::{self, CritRng},
    components::GamePhase,
    enemy, health,
    events::{GameEvent, HealthEvent, HitConnected},
    machine, movement, player, regions,
    session::{self, Session},
};

// ── SystemSets (strict FixedUpdate ordering, play-phase only) ───────

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FixedGameSet {
    InputApplySet,
    StateUpdateSet,
    PhysicsSet,
    HitDetectSet,
    NotifySet,
    CleanupSet,
}

/// Spawn coordinates handed over by the level loader.
#[derive(Resource, Debug, Clone)]
pub struct LevelLayout {
    pub player_spawn: Vec2,
    pub slime_spawns: Vec<Vec2>,
}

impl Default for LevelLayout {
    fn default() -> Self {
        Self {
            player_spawn: Vec2::new(-150.0, 40.0),
            slime_spawns: vec![Vec2::new(150.0, 0.0), Vec2::new(260.0, 0.0)],
        }
    }
}

pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<HealthEvent>();
        app.add_message::<HitConnected>();
        app.add_message::<GameEvent>();
        app.init_state::<GamePhase>();
        app.init_resource::<CritRng>();
        app.init_resource::<LevelLayout>();
        // Placeholder session; the storage plugin replaces it with the
        // persisted profile before the level spawns.
        app.init_resource::<Session>();

        // Configure FixedUpdate set ordering (each set gated to the play
        // phase). One tick runs input, state updates, movement, hit
        // detection, notifications, and cleanup in that order.
        app.configure_sets(
            FixedUpdate,
            (
                FixedGameSet::InputApplySet.run_if(in_state(GamePhase::Playing)),
                FixedGameSet::StateUpdateSet.run_if(in_state(GamePhase::Playing)),
                FixedGameSet::PhysicsSet.run_if(in_state(GamePhase::Playing)),
                FixedGameSet::HitDetectSet.run_if(in_state(GamePhase::Playing)),
                FixedGameSet::NotifySet.run_if(in_state(GamePhase::Playing)),
                FixedGameSet::CleanupSet.run_if(in_state(GamePhase::Playing)),
            )
                .chain(),
        );

        // InputApplySet: AI signals land before any state runs.
        app.add_systems(
            FixedUpdate,
            enemy::update_perception.in_set(FixedGameSet::InputApplySet),
        );

        // StateUpdateSet: drain buffered input into the machines, then
        // run each machine's per-tick update.
        app.add_systems(
            FixedUpdate,
            machine::drive_state_machines.in_set(FixedGameSet::StateUpdateSet),
        );

        // PhysicsSet — chained to keep Transform/Velocity access ordered.
        app.add_systems(
            FixedUpdate,
            (
                movement::integrate_movement,
                movement::tick_attack_cooldowns,
                health::tick_invincibility,
                regions::sync_offense_regions,
            )
                .chain()
                .in_set(FixedGameSet::PhysicsSet),
        );

        // HitDetectSet: overlap discovery and damage commit.
        app.add_systems(
            FixedUpdate,
            combat::resolve_hits.in_set(FixedGameSet::HitDetectSet),
        );

        // NotifySet — chained to fix MessageWriter conflicts.
        app.add_systems(
            FixedUpdate,
            (enemy::react_to_damage, session::publish_game_events)
                .chain()
                .in_set(FixedGameSet::NotifySet),
        );

        // CleanupSet
        app.add_systems(
            FixedUpdate,
            enemy::despawn_dead_enemies.in_set(FixedGameSet::CleanupSet),
        );

        // ── Startup ─────────────────────────────────────────────────────
        app.add_systems(Startup, setup_game);

        // ── Frame-rate input + run-over check ───────────────────────────
        app.add_systems(
            Update,
            (player::gather_player_input, session::check_game_over)
                .run_if(in_state(GamePhase::Playing)),
        );

        // ── Always-on ───────────────────────────────────────────────────
        app.add_systems(Update, tuning_reload_input);
    }
}

// ── Startup ─────────────────────────────────────────────────────────

fn setup_game(
    mut commands: Commands,
    tuning: Res<Tuning>,
    session: Res<Session>,
    layout: Res<LevelLayout>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut health_events: MessageWriter<HealthEvent>,
) {
    commands.spawn(Camera2d);

    // Floor line, purely visual; the floor plane itself lives in tuning.
    let floor_mesh = meshes.add(Rectangle::new(2000.0, 4.0));
    commands.spawn((
        Mesh2d(floor_mesh),
        MeshMaterial2d(materials.add(Color::srgb(0.25, 0.25, 0.3))),
        Transform::from_translation(Vec3::new(0.0, tuning.floor_y - 18.0, -1.0)),
    ));

    let player = player::spawn_player(&mut commands, &tuning, &session, layout.player_spawn);
    let player_mesh = meshes.add(Rectangle::new(24.0, 32.0));
    commands.entity(player).insert((
        Mesh2d(player_mesh),
        MeshMaterial2d(materials.add(Color::srgb(0.2, 0.6, 1.0))),
    ));
    // Seed the initial health display for UI consumers.
    health_events.write(HealthEvent::HealthChanged {
        entity: player,
        current_hp: session.profile.current_hp,
        max_hp: session.profile.max_hp,
    });

    for &spawn in &layout.slime_spawns {
        let slime = enemy::spawn_slime(&mut commands, &tuning, spawn);
        let slime_mesh = meshes.add(Circle::new(10.0));
        commands.entity(slime).insert((
            Mesh2d(slime_mesh),
            MeshMaterial2d(materials.add(Color::srgb(0.3, 0.9, 0.4))),
        ));
    }
}

// ── Always-on ───────────────────────────────────────────────────────

/// Reload tuning with F5.
fn tuning_reload_input(keyboard: Res<ButtonInput<KeyCode>>, mut tuning: ResMut<Tuning>) {
    if keyboard.just_pressed(KeyCode::F5) {
        tuning.reload();
    }
}
