use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All tunable simulation parameters, loaded from tuning.ron.
#[derive(Debug, Clone, Resource, Serialize, Deserialize)]
pub struct Tuning {
    /// Fixed simulation step in seconds.
    pub dt: f32,
    /// Downward acceleration in pixels per second squared (negative).
    pub gravity: f32,
    /// World-space height of the floor plane.
    pub floor_y: f32,
    /// How long one player swing stays live.
    pub player_attack_duration: f32,
    /// Upward launch speed of the player's jump.
    pub player_jump_velocity: f32,
    /// Horizontal offset of the player's swing region.
    pub attack_reach: f32,
    pub slime_max_hp: i32,
    pub slime_invincibility: f32,
    pub slime_chase_speed: f32,
    pub slime_detection_radius: f32,
    pub slime_attack_range: f32,
    pub slime_attack_duration: f32,
    pub slime_attack_cooldown: f32,
    pub slime_hurt_duration: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            dt: 1.0 / 60.0,
            gravity: -980.0,
            floor_y: 0.0,
            player_attack_duration: 0.3,
            player_jump_velocity: 400.0,
            attack_reach: 20.0,
            slime_max_hp: 20,
            slime_invincibility: 0.3,
            slime_chase_speed: 60.0,
            slime_detection_radius: 120.0,
            slime_attack_range: 20.0,
            slime_attack_duration: 0.2,
            slime_attack_cooldown: 1.5,
            slime_hurt_duration: 0.25,
        }
    }
}

impl Tuning {
    /// Get the data directory for tuning files.
    pub fn data_dir() -> PathBuf {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("dungeon_slash")
    }

    /// Path to the tuning file.
    pub fn file_path() -> PathBuf {
        Self::data_dir().join("tuning.ron")
    }

    /// Load from file, or create default if not found.
    pub fn load_or_default() -> Self {
        let path = Self::file_path();
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match ron::from_str(&contents) {
                    Ok(tuning) => return tuning,
                    Err(e) => {
                        warn!("Failed to parse tuning.ron: {e}, using defaults");
                    }
                },
                Err(e) => {
                    warn!("Failed to read tuning.ron: {e}, using defaults");
                }
            }
        }
        let tuning = Self::default();
        tuning.save();
        tuning
    }

    /// Save current tuning to file.
    pub fn save(&self) {
        let path = Self::file_path();
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let pretty = ron::ser::PrettyConfig::default();
        match ron::ser::to_string_pretty(self, pretty) {
            Ok(s) => {
                if let Err(e) = std::fs::write(&path, s) {
                    warn!("Failed to write tuning.ron: {e}");
                }
            }
            Err(e) => {
                warn!("Failed to serialize tuning: {e}");
            }
        }
    }

    /// Reload from file (called by key press).
    pub fn reload(&mut self) {
        *self = Self::load_or_default();
        info!("Tuning reloaded");
    }
}
