use bevy::prelude::*;

use crate::config::tuning::Tuning;
use crate::game::session::{PlayerProfile, Session};
use crate::storage::repo::ProfileRepository;
use crate::storage::sqlite_repo::SqliteRepo;

/// Persisted tokio runtime for sync DB calls after startup.
#[derive(Resource)]
pub struct TokioRuntime(#[allow(dead_code)] pub tokio::runtime::Runtime);

const PROFILE_SLOT: &str = "default";

pub struct StoragePlugin;

impl Plugin for StoragePlugin {
    fn build(&self, app: &mut App) {
        // PreStartup: the session profile must exist before the level
        // spawns the player.
        app.add_systems(PreStartup, init_storage);
    }
}

fn init_storage(world: &mut World) {
    let db_path = Tuning::data_dir().join("dungeon_slash.db");
    info!("Initializing SQLite at {:?}", db_path);

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    match rt.block_on(SqliteRepo::new(&db_path, rt.handle().clone())) {
        Ok(repo) => {
            let profile = match repo.load_profile(PROFILE_SLOT) {
                Some(profile) => profile,
                None => {
                    info!("No saved profile; seeding built-in defaults");
                    let profile = PlayerProfile::default();
                    if let Err(e) = repo.save_profile(PROFILE_SLOT, &profile) {
                        warn!("Failed to seed profile row: {e}");
                    }
                    profile
                }
            };
            world.insert_resource(Session::new(profile));
            world.insert_resource(repo);
        }
        Err(e) => {
            error!("Failed to initialize SQLite: {e}");
            world.insert_resource(Session::default());
        }
    }
    // Keep runtime alive for sync DB calls during play
    world.insert_resource(TokioRuntime(rt));
}
