use bevy::prelude::*;
use sha2::{Digest, Sha256};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::PathBuf;

use super::repo::ProfileRepository;
use crate::game::session::PlayerProfile;

/// SQLite-backed profile store (Bevy Resource).
#[derive(Resource)]
pub struct SqliteRepo {
    pool: SqlitePool,
    handle: tokio::runtime::Handle,
}

fn stats_hash(stats_json: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(stats_json.as_bytes());
    hex::encode(hasher.finalize())
}

impl SqliteRepo {
    pub async fn new(
        db_path: &PathBuf,
        handle: tokio::runtime::Handle,
    ) -> Result<Self, sqlx::Error> {
        if let Some(parent) = db_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool, handle })
    }

    pub async fn save_profile_async(
        &self,
        slot: &str,
        profile: &PlayerProfile,
    ) -> Result<(), sqlx::Error> {
        let stats_json = serde_json::to_string(&profile.stats).unwrap_or_default();
        let hash = stats_hash(&stats_json);
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;

        sqlx::query(
            r#"INSERT OR REPLACE INTO profiles (slot, stats_json, max_hp, current_hp, invincibility_duration, hash, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(slot)
        .bind(&stats_json)
        .bind(profile.max_hp as i64)
        .bind(profile.current_hp as i64)
        .bind(profile.invincibility_duration as f64)
        .bind(&hash)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn load_profile_async(
        &self,
        slot: &str,
    ) -> Result<Option<PlayerProfile>, sqlx::Error> {
        let row: Option<(String, i64, i64, f64, String)> = sqlx::query_as(
            r#"SELECT stats_json, max_hp, current_hp, invincibility_duration, hash
               FROM profiles WHERE slot = ?"#,
        )
        .bind(slot)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(
            |(stats_json, max_hp, current_hp, invincibility_duration, hash)| {
                if stats_hash(&stats_json) != hash {
                    warn!("profile row for '{slot}' failed its integrity check; ignoring");
                    return None;
                }
                let stats = serde_json::from_str(&stats_json).ok()?;
                Some(PlayerProfile {
                    stats,
                    max_hp: max_hp as i32,
                    current_hp: current_hp as i32,
                    invincibility_duration: invincibility_duration as f32,
                })
            },
        ))
    }
}

impl ProfileRepository for SqliteRepo {
    fn load_profile(&self, slot: &str) -> Option<PlayerProfile> {
        match self.handle.block_on(self.load_profile_async(slot)) {
            Ok(profile) => profile,
            Err(e) => {
                error!("Failed to load profile '{slot}': {e}");
                None
            }
        }
    }

    fn save_profile(&self, slot: &str, profile: &PlayerProfile) -> Result<(), String> {
        self.handle
            .block_on(self.save_profile_async(slot, profile))
            .map_err(|e| e.to_string())
    }
}
